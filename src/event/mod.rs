// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.
//!
//! A [`DeviceEvent`] is the decoded form of a raw record emitted by the
//! kernel-level event source: the identifier of the USB device involved
//! plus whether it was attached or detached. Events are constructed only
//! by the decode step in the watcher and consumed by listeners; they are
//! never persisted.

mod device_event;
mod device_id;

pub use device_event::{DeviceEvent, DeviceEventKind};
pub use device_id::DeviceId;
