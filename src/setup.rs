// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Setup mode: learn the trigger device interactively.
//!
//! Watches for the next attach/detach event of any USB device, persists
//! that device's identifier to the config store, and exits. The user
//! picks the device simply by plugging or un-plugging it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::config::ConfigStore;
use crate::error::Result;
use crate::source::EventSource;
use crate::watcher::{DeviceWatcher, WatcherState};

/// Runs setup mode until a device is learned or Ctrl-C is received.
///
/// # Errors
///
/// Returns config/source errors from startup, or
/// [`crate::error::WatcherError::StopTimeout`] if the watcher could not
/// be stopped after an interrupt.
pub async fn run(store: &ConfigStore, source: impl EventSource + 'static) -> Result<()> {
    match store.device_id()? {
        Some(id) => println!("Currently configured device ID is '{id}'"),
        None => println!("Currently device ID is not configured"),
    }

    let watcher = Arc::new(DeviceWatcher::new(source));

    let captured = AtomicBool::new(false);
    let listener_store = store.clone();
    let listener_watcher = Arc::downgrade(&watcher);
    watcher.add_listener(move |event| {
        // Only the first event wins; a bouncing device must not persist
        // (and announce) the identifier several times.
        if captured.swap(true, Ordering::SeqCst) {
            return;
        }
        let device_id = event.device_id().to_string();
        match listener_store.set_device_id(&device_id) {
            Ok(()) => println!("Configured new device ID '{device_id}'"),
            Err(err) => tracing::error!(error = %err, "failed to persist device ID"),
        }
        // This listener runs on the watcher's own delivery thread, so
        // the stop request has to come from somewhere else.
        if let Some(watcher) = listener_watcher.upgrade() {
            thread::spawn(move || {
                if let Err(err) = watcher.stop() {
                    tracing::error!(error = %err, "failed to stop watcher after capture");
                }
            });
        }
    });

    watcher.start()?;
    println!("Specify a new USB device by plugging or un-plugging it; press Ctrl + C to exit");

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    tracing::error!(error = %err, "failed to wait for interrupt signal; shutting down");
                }
                println!("Exiting; currently configured device ID is not changed");
                let stopper = Arc::clone(&watcher);
                match tokio::task::spawn_blocking(move || stopper.stop()).await {
                    // The listener-side stop may have won the race.
                    Ok(Err(crate::Error::Watcher(crate::error::WatcherError::NotRunning))) => {}
                    Ok(result) => result?,
                    Err(err) => tracing::error!(error = %err, "watcher stop task failed"),
                }
                return Ok(());
            }
            _ = ticker.tick() => {
                if !watcher.running() {
                    break;
                }
            }
        }
    }

    // The listener-side stop flipped the state; give it a moment to
    // finish joining the loop thread before the watcher is dropped.
    let settle_deadline = tokio::time::Instant::now() + Duration::from_secs(60);
    while watcher.state() == WatcherState::Stopping {
        if tokio::time::Instant::now() >= settle_deadline {
            tracing::error!("watcher never confirmed its exit; giving up");
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DeviceEventKind;
    use crate::source::ScriptedSource;

    #[tokio::test]
    async fn persists_first_seen_device_and_exits() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        let (source, handle) = ScriptedSource::new();

        handle.inject(b"0xDEADBEEF", DeviceEventKind::Attached);
        handle.inject(b"other-device", DeviceEventKind::Detached);

        run(&store, source).await.unwrap();

        // Only the first event's identifier must have been persisted.
        assert_eq!(store.device_id().unwrap().as_deref(), Some("0xDEADBEEF"));
    }

    #[tokio::test]
    async fn detach_event_also_configures() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        let (source, handle) = ScriptedSource::new();

        handle.inject(b"serial-42", DeviceEventKind::Detached);

        run(&store, source).await.unwrap();
        assert_eq!(store.device_id().unwrap().as_deref(), Some("serial-42"));
    }

    #[tokio::test]
    async fn reconfiguring_overwrites_previous_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        store.set_device_id("old-device").unwrap();

        let (source, handle) = ScriptedSource::new();
        handle.inject(b"new-device", DeviceEventKind::Attached);

        run(&store, source).await.unwrap();
        assert_eq!(store.device_id().unwrap().as_deref(), Some("new-device"));
    }
}
