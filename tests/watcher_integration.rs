// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end scenarios for the device watcher over a scripted source.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use presence_lock::event::{DeviceEvent, DeviceEventKind};
use presence_lock::source::ScriptedSource;
use presence_lock::watcher::DeviceWatcher;
use presence_lock::{Error, WatcherError};

fn quick_watcher(source: ScriptedSource) -> DeviceWatcher {
    DeviceWatcher::new(source)
        .with_poll_interval(Duration::from_millis(5))
        .with_stop_grace(Duration::from_millis(500))
        .with_stop_check_interval(Duration::from_millis(10))
}

fn wait_for<F: Fn() -> bool>(condition: F) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not met in time");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn events_preserve_injection_order_and_payload() {
    let (source, handle) = ScriptedSource::new();
    let watcher = quick_watcher(source);

    let seen: Arc<Mutex<Vec<DeviceEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    watcher.add_listener(move |event| {
        seen_clone.lock().push(event.clone());
    });

    // Mixed identifiers, including non-UTF8 bytes; payloads must come
    // through byte-for-byte and enum-for-enum.
    let script: Vec<(&[u8], DeviceEventKind)> = vec![
        (b"X1", DeviceEventKind::Attached),
        (b"Y2", DeviceEventKind::Detached),
        (b"\xFF\xFEserial", DeviceEventKind::Attached),
        (b"X1", DeviceEventKind::Detached),
        (b"", DeviceEventKind::Attached),
        (b"0123456789ABCDEF", DeviceEventKind::Detached),
    ];

    watcher.start().unwrap();
    for (id, kind) in &script {
        handle.inject(id, *kind);
    }
    wait_for(|| seen.lock().len() == script.len());
    watcher.stop().unwrap();

    let seen = seen.lock();
    for (event, (id, kind)) in seen.iter().zip(&script) {
        assert_eq!(event.device_id().as_bytes(), *id);
        assert_eq!(event.kind(), *kind);
    }
}

#[test]
fn matching_listener_fires_exactly_once_for_configured_attach() {
    let (source, handle) = ScriptedSource::new();
    let watcher = quick_watcher(source);

    let unlocks = Arc::new(AtomicU32::new(0));
    let unlocks_clone = Arc::clone(&unlocks);
    watcher.add_listener(move |event| {
        if event.device_id().matches_str("X1") && event.is_attached() {
            unlocks_clone.fetch_add(1, Ordering::SeqCst);
        }
    });

    watcher.start().unwrap();
    handle.inject(b"X1", DeviceEventKind::Attached);
    wait_for(|| unlocks.load(Ordering::SeqCst) == 1);

    // Give the loop a few more iterations: the count must stay at one.
    thread::sleep(Duration::from_millis(50));
    watcher.stop().unwrap();
    assert_eq!(unlocks.load(Ordering::SeqCst), 1);
}

#[test]
fn filtering_listener_ignores_other_devices() {
    let (source, handle) = ScriptedSource::new();
    let watcher = quick_watcher(source);

    let fired = Arc::new(AtomicU32::new(0));
    let fired_clone = Arc::clone(&fired);
    let all_events = Arc::new(AtomicU32::new(0));
    let all_clone = Arc::clone(&all_events);
    watcher.add_listener(move |event| {
        all_clone.fetch_add(1, Ordering::SeqCst);
        if event.device_id().matches_str("X1") {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }
    });

    watcher.start().unwrap();
    handle.inject(b"Y2", DeviceEventKind::Detached);
    wait_for(|| all_events.load(Ordering::SeqCst) == 1);
    watcher.stop().unwrap();

    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn multiple_listeners_all_see_every_event_in_registration_order() {
    let (source, handle) = ScriptedSource::new();
    let watcher = quick_watcher(source);

    let log: Arc<Mutex<Vec<(u8, DeviceEventKind)>>> = Arc::new(Mutex::new(Vec::new()));
    for tag in 0u8..3 {
        let log_clone = Arc::clone(&log);
        watcher.add_listener(move |event| {
            log_clone.lock().push((tag, event.kind()));
        });
    }

    watcher.start().unwrap();
    handle.inject(b"X1", DeviceEventKind::Attached);
    handle.inject(b"X1", DeviceEventKind::Detached);
    wait_for(|| log.lock().len() == 6);
    watcher.stop().unwrap();

    let log = log.lock();
    assert_eq!(
        *log,
        vec![
            (0, DeviceEventKind::Attached),
            (1, DeviceEventKind::Attached),
            (2, DeviceEventKind::Attached),
            (0, DeviceEventKind::Detached),
            (1, DeviceEventKind::Detached),
            (2, DeviceEventKind::Detached),
        ]
    );
}

#[test]
fn restart_cycle_delivers_in_both_runs() {
    let (source, handle) = ScriptedSource::new();
    let watcher = quick_watcher(source);

    let count = Arc::new(AtomicU32::new(0));
    let count_clone = Arc::clone(&count);
    watcher.add_listener(move |_event| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    watcher.start().unwrap();
    handle.inject(b"X1", DeviceEventKind::Attached);
    wait_for(|| count.load(Ordering::SeqCst) == 1);
    watcher.stop().unwrap();
    assert!(!watcher.running());

    watcher.start().unwrap();
    assert!(watcher.running());
    handle.inject(b"X1", DeviceEventKind::Detached);
    wait_for(|| count.load(Ordering::SeqCst) == 2);
    watcher.stop().unwrap();
}

#[test]
fn lifecycle_misuse_is_reported_without_corrupting_state() {
    let (source, _handle) = ScriptedSource::new();
    let watcher = quick_watcher(source);

    // Stop before start.
    assert!(matches!(
        watcher.stop().unwrap_err(),
        Error::Watcher(WatcherError::NotRunning)
    ));

    watcher.start().unwrap();

    // Double start leaves the watcher running.
    assert!(matches!(
        watcher.start().unwrap_err(),
        Error::Watcher(WatcherError::AlreadyStarted)
    ));
    assert!(watcher.running());

    watcher.stop().unwrap();

    // Double stop.
    assert!(matches!(
        watcher.stop().unwrap_err(),
        Error::Watcher(WatcherError::NotRunning)
    ));
    assert!(!watcher.running());
}
