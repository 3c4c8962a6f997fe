// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session lock/unlock actions.
//!
//! Locking and unlocking the interactive session is delegated to an
//! external session-control command. The actions are fire-and-forget:
//! failures are logged but never propagated, so a misbehaving session
//! manager cannot take down the daemon.

use std::process::Command;

/// Something that can lock and unlock the current session.
///
/// Implemented by [`LoginctlSession`] for production; tests substitute a
/// recording fake. Both methods are best-effort and must not block for
/// long, since monitor mode calls them from the watcher's event
/// delivery thread.
pub trait SessionControl: Send + Sync {
    /// Unlocks the current session.
    fn unlock(&self);

    /// Locks the current session.
    fn lock(&self);
}

/// Session control via `loginctl`.
#[derive(Debug, Clone, Default)]
pub struct LoginctlSession;

impl LoginctlSession {
    fn run(action: &str) {
        match Command::new("loginctl").arg(action).status() {
            Ok(status) if status.success() => {
                tracing::debug!(action, "session command succeeded");
            }
            Ok(status) => {
                tracing::warn!(action, %status, "session command failed");
            }
            Err(err) => {
                tracing::warn!(action, error = %err, "failed to run loginctl");
            }
        }
    }
}

impl SessionControl for LoginctlSession {
    fn unlock(&self) {
        Self::run("unlock-session");
    }

    fn lock(&self) {
        Self::run("lock-session");
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSession;
    use super::*;

    #[test]
    fn recording_session_captures_order() {
        let session = RecordingSession::default();
        session.lock();
        session.unlock();
        session.lock();
        assert_eq!(session.actions(), vec!["lock", "unlock", "lock"]);
    }
}
