// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Monitor mode: the presence-lock daemon.
//!
//! Watches for attach/detach events of the configured device and drives
//! the session controller: attach unlocks the session, detach locks it.
//! Events for any other device are ignored. Runs until interrupted.

use std::sync::Arc;

use crate::config::ConfigStore;
use crate::error::{ConfigError, Result};
use crate::event::{DeviceEvent, DeviceEventKind};
use crate::session::SessionControl;
use crate::source::EventSource;
use crate::watcher::DeviceWatcher;

/// Builds the monitor listener: filters on the configured identifier
/// and maps attach/detach to unlock/lock.
///
/// Session command failures are logged by the controller and otherwise
/// ignored; delivery of later events is never affected.
fn monitor_listener(
    device_id: String,
    session: Arc<dyn SessionControl>,
) -> impl Fn(&DeviceEvent) + Send + Sync + 'static {
    move |event| {
        if !event.device_id().matches_str(&device_id) {
            tracing::debug!(?event, "ignoring event for non-configured device");
            return;
        }
        match event.kind() {
            DeviceEventKind::Attached => {
                tracing::info!(%device_id, "configured device attached; unlocking session");
                session.unlock();
            }
            DeviceEventKind::Detached => {
                tracing::info!(%device_id, "configured device detached; locking session");
                session.lock();
            }
        }
    }
}

/// Runs the daemon until Ctrl-C.
///
/// # Errors
///
/// Returns [`ConfigError::DeviceNotConfigured`] if no device identifier
/// has been set up yet, any config/source error from startup, or
/// [`crate::error::WatcherError::StopTimeout`] if the watcher could not
/// be stopped on shutdown.
pub async fn run(
    store: &ConfigStore,
    source: impl EventSource + 'static,
    session: Arc<dyn SessionControl>,
) -> Result<()> {
    let device_id = store
        .device_id()?
        .ok_or(ConfigError::DeviceNotConfigured)?;

    let watcher = Arc::new(DeviceWatcher::new(source));
    watcher.add_listener(monitor_listener(device_id, session));
    watcher.start()?;
    println!("Daemon started; press Ctrl + C to exit");

    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to wait for interrupt signal; shutting down");
    }

    // stop() blocks for up to the grace period, so keep it off the
    // async runtime.
    let stopper = Arc::clone(&watcher);
    match tokio::task::spawn_blocking(move || stopper.stop()).await {
        Ok(result) => result?,
        Err(err) => tracing::error!(error = %err, "watcher stop task failed"),
    }
    println!("Daemon stopped");
    Ok(())
}
