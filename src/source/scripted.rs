// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic in-memory event source.
//!
//! `ScriptedSource` stands in for the capture companion in tests and
//! demos: records are injected through a [`ScriptHandle`] and come out of
//! `poll` in injection order. The handle can also make activation fail or
//! slow every poll down, to exercise the watcher's failure paths.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::SourceError;
use crate::event::DeviceEventKind;

use super::record::RawRecord;
use super::EventSource;

#[derive(Default)]
struct Shared {
    activations: AtomicUsize,
    fail_next_activation: AtomicBool,
    poll_delay: Mutex<Option<Duration>>,
}

/// In-memory event source fed by a [`ScriptHandle`].
pub struct ScriptedSource {
    records: mpsc::Receiver<RawRecord>,
    shared: Arc<Shared>,
    activated: bool,
}

/// Controller for a [`ScriptedSource`].
///
/// Cloneable; dropping every handle closes the source's record stream.
#[derive(Clone)]
pub struct ScriptHandle {
    tx: mpsc::Sender<RawRecord>,
    shared: Arc<Shared>,
}

impl ScriptedSource {
    /// Creates a scripted source and the handle that feeds it.
    #[must_use]
    pub fn new() -> (Self, ScriptHandle) {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::new(Shared::default());
        let source = Self {
            records: rx,
            shared: Arc::clone(&shared),
            activated: false,
        };
        (source, ScriptHandle { tx, shared })
    }
}

impl ScriptHandle {
    /// Injects a raw record; it is delivered on the next poll.
    ///
    /// Returns `false` if the source has been dropped.
    pub fn inject_record(&self, record: RawRecord) -> bool {
        self.tx.send(record).is_ok()
    }

    /// Injects an attach/detach record for the given identifier.
    pub fn inject(&self, device_id: &[u8], kind: DeviceEventKind) -> bool {
        self.inject_record(RawRecord::new(device_id, kind))
    }

    /// Makes the next `activate` call fail.
    pub fn fail_next_activation(&self) {
        self.shared.fail_next_activation.store(true, Ordering::SeqCst);
    }

    /// Returns how many times the source has been activated.
    #[must_use]
    pub fn activations(&self) -> usize {
        self.shared.activations.load(Ordering::SeqCst)
    }

    /// Adds a fixed delay to every poll, simulating a wedged binding.
    pub fn set_poll_delay(&self, delay: Duration) {
        *self.shared.poll_delay.lock() = Some(delay);
    }

    /// Removes the poll delay again.
    pub fn clear_poll_delay(&self) {
        *self.shared.poll_delay.lock() = None;
    }
}

impl EventSource for ScriptedSource {
    fn activate(&mut self) -> Result<(), SourceError> {
        if self.shared.fail_next_activation.swap(false, Ordering::SeqCst) {
            return Err(SourceError::Closed(
                "scripted activation failure".to_string(),
            ));
        }
        self.shared.activations.fetch_add(1, Ordering::SeqCst);
        self.activated = true;
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> Result<Vec<RawRecord>, SourceError> {
        if !self.activated {
            return Err(SourceError::NotActivated(
                "scripted source has not been activated".to_string(),
            ));
        }

        let delay = *self.shared.poll_delay.lock();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        let mut records = Vec::new();
        match self.records.recv_timeout(timeout) {
            Ok(record) => records.push(record),
            Err(mpsc::RecvTimeoutError::Timeout) => return Ok(records),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(SourceError::Closed("script handle dropped".to_string()));
            }
        }
        while let Ok(record) = self.records.try_recv() {
            records.push(record);
        }
        Ok(records)
    }
}
