// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device watcher and its lifecycle state machine.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use crate::error::{Error, Result, WatcherError};
use crate::event::DeviceEvent;
use crate::source::EventSource;

/// How long one background-loop iteration waits on the source.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long `stop()` waits for the background loop to exit.
const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(30);

/// How often `stop()` checks whether the loop has exited.
const DEFAULT_STOP_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Lifecycle state of a [`DeviceWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// No background loop is active; `start()` is valid.
    Idle,
    /// Exactly one background loop is polling the source.
    Running,
    /// A stop has been requested; the loop exits at its next wake-up.
    Stopping,
}

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_STOPPING: u8 = 2;

impl WatcherState {
    fn from_u8(value: u8) -> Self {
        match value {
            STATE_RUNNING => Self::Running,
            STATE_STOPPING => Self::Stopping,
            _ => Self::Idle,
        }
    }
}

type Listener = Arc<dyn Fn(&DeviceEvent) + Send + Sync>;

/// Watches an event source for device attach/detach events and fans
/// them out to registered listeners.
///
/// Listeners run **on the background thread**, synchronously and in
/// registration order, before the next raw record is processed; a slow
/// listener delays subsequent event delivery. A panicking listener is
/// caught and logged so it cannot kill delivery for the others.
///
/// The watcher exclusively owns its event source binding for the
/// binding's lifetime. All methods take `&self`, so the watcher can be
/// shared via [`Arc`] between the controlling thread and listener-side
/// helpers (setup mode stops the watcher from a separate thread this
/// way).
///
/// # Examples
///
/// ```
/// use presence_lock::source::ScriptedSource;
/// use presence_lock::watcher::DeviceWatcher;
///
/// let (source, _handle) = ScriptedSource::new();
/// let watcher = DeviceWatcher::new(source);
/// watcher.add_listener(|event| {
///     println!("{:?} {:?}", event.kind(), event.device_id());
/// });
/// watcher.start().unwrap();
/// assert!(watcher.running());
/// watcher.stop().unwrap();
/// ```
pub struct DeviceWatcher {
    state: Arc<AtomicU8>,
    listeners: Arc<RwLock<Vec<Listener>>>,
    source: Arc<Mutex<Box<dyn EventSource>>>,
    loop_thread: Mutex<Option<thread::JoinHandle<()>>>,
    poll_interval: Duration,
    stop_grace: Duration,
    stop_check_interval: Duration,
}

impl DeviceWatcher {
    /// Creates an idle watcher over the given source with no listeners.
    #[must_use]
    pub fn new(source: impl EventSource + 'static) -> Self {
        Self {
            state: Arc::new(AtomicU8::new(STATE_IDLE)),
            listeners: Arc::new(RwLock::new(Vec::new())),
            source: Arc::new(Mutex::new(Box::new(source))),
            loop_thread: Mutex::new(None),
            poll_interval: DEFAULT_POLL_INTERVAL,
            stop_grace: DEFAULT_STOP_GRACE,
            stop_check_interval: DEFAULT_STOP_CHECK_INTERVAL,
        }
    }

    /// Overrides the per-iteration poll timeout (default 100 ms).
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Overrides the stop grace period (default 30 s).
    #[must_use]
    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    /// Overrides the liveness check interval used by `stop()`
    /// (default 1 s).
    #[must_use]
    pub fn with_stop_check_interval(mut self, interval: Duration) -> Self {
        self.stop_check_interval = interval;
        self
    }

    /// Registers a listener; listeners are invoked in registration
    /// order for every event and are never deduplicated.
    ///
    /// Registration is append-only; there is no removal. Register
    /// listeners before `start()` — events delivered during a
    /// registration racing the loop may or may not reach the new
    /// listener.
    pub fn add_listener<F>(&self, listener: F)
    where
        F: Fn(&DeviceEvent) + Send + Sync + 'static,
    {
        self.listeners.write().push(Arc::new(listener));
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> WatcherState {
        WatcherState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Returns `true` if the background loop is active.
    ///
    /// Safe to call concurrently from any thread.
    #[must_use]
    pub fn running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == STATE_RUNNING
    }

    /// Activates the event source and starts the background loop.
    ///
    /// The source is activated on the calling thread, so activation
    /// failures surface here and leave the watcher idle. On success the
    /// watcher is running by the time this returns.
    ///
    /// # Errors
    ///
    /// - [`WatcherError::AlreadyStarted`] if the watcher is not idle
    ///   (double start, or start while a stop is still pending).
    /// - [`crate::error::SourceError`] if the source could not be
    ///   activated.
    pub fn start(&self) -> Result<()> {
        if self
            .state
            .compare_exchange(
                STATE_IDLE,
                STATE_RUNNING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return Err(WatcherError::AlreadyStarted.into());
        }

        if let Err(err) = self.source.lock().activate() {
            self.state.store(STATE_IDLE, Ordering::SeqCst);
            return Err(Error::Source(err));
        }

        let state = Arc::clone(&self.state);
        let listeners = Arc::clone(&self.listeners);
        let source = Arc::clone(&self.source);
        let poll_interval = self.poll_interval;

        let handle = thread::Builder::new()
            .name("device-watcher".to_string())
            .spawn(move || run_loop(&state, &listeners, &source, poll_interval))
            .map_err(|err| {
                self.state.store(STATE_IDLE, Ordering::SeqCst);
                Error::Source(err.into())
            })?;

        *self.loop_thread.lock() = Some(handle);
        tracing::debug!("device watcher started");
        Ok(())
    }

    /// Requests the background loop to exit and waits for it, bounded
    /// by the grace period.
    ///
    /// The stop request is a shared flag; the loop observes it at its
    /// next wake-up and exits without polling again. This method then
    /// checks loop liveness once per check interval. If the loop exits
    /// in time the watcher returns to idle; otherwise the watcher stays
    /// in the stopping state (the loop may still be running) and the
    /// timeout is reported rather than swallowed.
    ///
    /// # Errors
    ///
    /// - [`WatcherError::NotRunning`] if the watcher is not running
    ///   (double stop, or stop while idle).
    /// - [`WatcherError::StopTimeout`] if the loop did not exit within
    ///   the grace period; recommended recovery is terminating the
    ///   process.
    pub fn stop(&self) -> Result<()> {
        if self
            .state
            .compare_exchange(
                STATE_RUNNING,
                STATE_STOPPING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return Err(WatcherError::NotRunning.into());
        }

        let mut slot = self.loop_thread.lock();
        let Some(handle) = slot.take() else {
            // A running watcher always has a loop thread; nothing to wait for.
            self.state.store(STATE_IDLE, Ordering::SeqCst);
            return Ok(());
        };

        let checks = checks_for(self.stop_grace, self.stop_check_interval);
        for _ in 0..checks {
            thread::sleep(self.stop_check_interval);
            if handle.is_finished() {
                if handle.join().is_err() {
                    tracing::error!("watcher loop thread panicked");
                }
                self.state.store(STATE_IDLE, Ordering::SeqCst);
                tracing::debug!("device watcher stopped");
                return Ok(());
            }
        }

        // Keep the handle so the thread is not detached; state stays
        // Stopping to record that the loop never confirmed its exit.
        *slot = Some(handle);
        Err(WatcherError::StopTimeout {
            grace_secs: self.stop_grace.as_secs(),
        }
        .into())
    }
}

impl Drop for DeviceWatcher {
    fn drop(&mut self) {
        let state = self.state();
        if state != WatcherState::Idle {
            tracing::error!(
                ?state,
                "device watcher dropped while its loop may still be active; \
                 stop() must complete before dropping"
            );
        }
    }
}

impl std::fmt::Debug for DeviceWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceWatcher")
            .field("state", &self.state())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Number of liveness checks that fit into the grace period.
fn checks_for(grace: Duration, check_interval: Duration) -> u64 {
    let interval_ms = check_interval.as_millis().max(1);
    u64::try_from(grace.as_millis() / interval_ms).unwrap_or(u64::MAX).max(1)
}

/// The background polling loop.
///
/// Holds the source lock for the whole run, so a second loop can never
/// bind the same source concurrently. Exits when the shared state
/// leaves Running, or if the source fails.
fn run_loop(
    state: &AtomicU8,
    listeners: &RwLock<Vec<Listener>>,
    source: &Mutex<Box<dyn EventSource>>,
    poll_interval: Duration,
) {
    let mut source = source.lock();
    while state.load(Ordering::SeqCst) == STATE_RUNNING {
        match source.poll(poll_interval) {
            Ok(records) => {
                for record in records {
                    match record.decode() {
                        Ok(event) => dispatch(listeners, &event),
                        Err(err) => {
                            tracing::warn!(error = %err, "skipping undecodable raw record");
                        }
                    }
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "event source failed; watcher loop exiting");
                break;
            }
        }
    }
    tracing::debug!("watcher loop exited");
}

/// Invokes every listener for one event, in registration order.
///
/// A panicking listener is logged and does not prevent later listeners
/// from seeing the event.
fn dispatch(listeners: &RwLock<Vec<Listener>>, event: &DeviceEvent) {
    let listeners = listeners.read();
    for listener in listeners.iter() {
        let call = AssertUnwindSafe(|| listener(event));
        if std::panic::catch_unwind(call).is_err() {
            tracing::error!(?event, "event listener panicked; continuing with remaining listeners");
        }
    }
}
