// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Production event source over the capture companion.
//!
//! The kernel-level capture logic lives in a pre-compiled companion
//! program installed alongside this crate. The companion attaches to the
//! kernel's USB attach/detach paths and writes one fixed-size raw record
//! per event to its stdout. `CompanionSource` spawns it, reassembles the
//! frames on a dedicated reader thread, and hands the records to the
//! watcher through `poll`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::SourceError;

use super::record::{RAW_RECORD_LEN, RawRecord};
use super::EventSource;

/// Default install location of the capture companion executable.
pub const DEFAULT_COMPANION_PATH: &str = "/usr/libexec/presence-lock/capture-companion";

/// Event source binding that consumes the capture companion's record
/// stream.
///
/// The binding is inert until [`EventSource::activate`] is called (the
/// watcher does this inside `start()`). On drop the companion process is
/// killed and reaped.
///
/// # Examples
///
/// ```no_run
/// use presence_lock::source::CompanionSource;
/// use presence_lock::watcher::DeviceWatcher;
///
/// let watcher = DeviceWatcher::new(CompanionSource::default());
/// ```
pub struct CompanionSource {
    path: PathBuf,
    active: Option<ActiveCompanion>,
}

struct ActiveCompanion {
    child: Child,
    records: mpsc::Receiver<RawRecord>,
    reader: Option<thread::JoinHandle<()>>,
}

impl CompanionSource {
    /// Creates a binding over the companion at the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            active: None,
        }
    }

    /// Returns the companion executable path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for CompanionSource {
    /// Creates a binding over the companion at
    /// [`DEFAULT_COMPANION_PATH`].
    fn default() -> Self {
        Self::new(DEFAULT_COMPANION_PATH)
    }
}

impl EventSource for CompanionSource {
    fn activate(&mut self) -> Result<(), SourceError> {
        if self.active.is_some() {
            return Err(SourceError::NotActivated(
                "companion already activated".to_string(),
            ));
        }

        let mut child = Command::new(&self.path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| SourceError::Spawn {
                path: self.path.clone(),
                source,
            })?;

        // Piped stdout is always present after a successful spawn.
        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SourceError::Closed(
                "companion spawned without a stdout pipe".to_string(),
            ));
        };

        tracing::debug!(path = %self.path.display(), pid = child.id(), "capture companion started");

        let (tx, rx) = mpsc::channel();
        let reader = thread::Builder::new()
            .name("companion-reader".to_string())
            .spawn(move || read_frames(stdout, &tx))
            .map_err(SourceError::Io)?;

        self.active = Some(ActiveCompanion {
            child,
            records: rx,
            reader: Some(reader),
        });
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> Result<Vec<RawRecord>, SourceError> {
        let Some(active) = self.active.as_mut() else {
            return Err(SourceError::NotActivated(
                "companion has not been activated".to_string(),
            ));
        };

        let mut records = Vec::new();
        match active.records.recv_timeout(timeout) {
            Ok(record) => records.push(record),
            Err(mpsc::RecvTimeoutError::Timeout) => return Ok(records),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(SourceError::Closed(
                    "capture companion stopped emitting records".to_string(),
                ));
            }
        }
        // Drain whatever else arrived in the meantime.
        while let Ok(record) = active.records.try_recv() {
            records.push(record);
        }
        Ok(records)
    }
}

impl Drop for CompanionSource {
    fn drop(&mut self) {
        if let Some(mut active) = self.active.take() {
            if let Err(err) = active.child.kill() {
                tracing::warn!(error = %err, "failed to kill capture companion");
            }
            let _ = active.child.wait();
            if let Some(reader) = active.reader.take() {
                let _ = reader.join();
            }
        }
    }
}

/// Reassembles fixed-size frames from the companion's stdout until the
/// pipe closes or the receiving side goes away.
fn read_frames(mut stdout: impl Read, tx: &mpsc::Sender<RawRecord>) {
    let mut frame = [0u8; RAW_RECORD_LEN];
    loop {
        if let Err(err) = stdout.read_exact(&mut frame) {
            if err.kind() != std::io::ErrorKind::UnexpectedEof {
                tracing::warn!(error = %err, "error reading from capture companion");
            }
            break;
        }
        match RawRecord::from_frame(&frame) {
            Ok(record) => {
                if tx.send(record).is_err() {
                    break;
                }
            }
            Err(err) => {
                // Cannot happen with exact-size reads, but never let a bad
                // frame kill the reader silently.
                tracing::warn!(error = %err, "skipping malformed companion frame");
            }
        }
    }
    tracing::debug!("companion reader exiting");
}
