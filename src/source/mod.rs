// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event source bindings.
//!
//! An event source is the watcher's view of the kernel-level capture
//! mechanism: an opaque handle that, once activated, yields raw
//! attach/detach records. The capture logic itself lives in a separate,
//! pre-compiled companion program; this module only consumes its record
//! stream.
//!
//! - [`EventSource`] - the binding seam the watcher polls
//! - [`RawRecord`] - the fixed-layout wire record
//! - [`CompanionSource`] - production binding over the capture companion
//! - [`ScriptedSource`] - deterministic in-memory binding for tests

mod companion;
mod record;
mod scripted;

use std::time::Duration;

pub use companion::{CompanionSource, DEFAULT_COMPANION_PATH};
pub use record::{DEVICE_ID_LEN, RAW_RECORD_LEN, RawRecord};
pub use scripted::{ScriptHandle, ScriptedSource};

use crate::error::SourceError;

/// An activatable, pollable binding to a kernel-level event source.
///
/// A binding is exclusively owned by the watcher it is handed to; two
/// watchers must never share one binding. `activate` is called once by
/// [`crate::watcher::DeviceWatcher::start`] before the polling loop is
/// spawned, on the caller's thread, so activation failures surface
/// synchronously from `start()`.
pub trait EventSource: Send {
    /// Activates the binding so that records start being captured.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying capture mechanism could not be
    /// brought up. The binding must remain safe to drop afterwards.
    fn activate(&mut self) -> Result<(), SourceError>;

    /// Waits up to `timeout` for new records and drains whatever arrived.
    ///
    /// An empty vector means the timeout elapsed without records, which
    /// is the common case and not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the binding failed or was closed underneath
    /// the caller.
    fn poll(&mut self, timeout: Duration) -> Result<Vec<RawRecord>, SourceError>;
}
