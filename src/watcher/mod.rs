// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device watcher: the background polling loop over an event source.
//!
//! The watcher owns an [`crate::source::EventSource`], runs a dedicated
//! background thread that polls it, decodes raw records into
//! [`crate::event::DeviceEvent`]s, and fans them out to registered
//! listeners in registration order. Its lifecycle is a strict state
//! machine: `start()` is only valid from idle, `stop()` only while
//! running, and shutdown is cooperative with a bounded grace period.

mod device_watcher;

pub use device_watcher::{DeviceWatcher, WatcherState};
