// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `presence-lock` - lock and unlock the interactive session with a USB
//! device.
//!
//! A kernel-level capture companion reports USB attach/detach events;
//! the [`watcher::DeviceWatcher`] polls that source on a background
//! thread and fans decoded [`event::DeviceEvent`]s out to listeners.
//! Monitor mode filters on the configured device identifier and drives
//! `loginctl`; setup mode captures the next seen identifier and
//! persists it.
//!
//! # Quick Start
//!
//! ```no_run
//! use presence_lock::source::CompanionSource;
//! use presence_lock::watcher::DeviceWatcher;
//!
//! fn main() -> presence_lock::Result<()> {
//!     let watcher = DeviceWatcher::new(CompanionSource::default());
//!     watcher.add_listener(|event| {
//!         println!("{:?}: {}", event.kind(), event.device_id());
//!     });
//!     watcher.start()?;
//!     std::thread::sleep(std::time::Duration::from_secs(10));
//!     watcher.stop()?;
//!     Ok(())
//! }
//! ```
//!
//! # Lifecycle guarantees
//!
//! - A running watcher has exactly one background loop bound to one
//!   live event source.
//! - `start()` is only valid from idle, `stop()` only while running;
//!   misuse is a typed error, not undefined behavior.
//! - Shutdown is cooperative: `stop()` signals the loop and waits up to
//!   a grace period, reporting a timeout instead of hanging forever.
//! - Listeners see events in source order, each listener in
//!   registration order.

pub mod config;
pub mod error;
pub mod event;
pub mod monitor;
pub mod session;
pub mod setup;
pub mod source;
pub mod watcher;

pub use config::{Config, ConfigStore};
pub use error::{ConfigError, Error, Result, SourceError, WatcherError};
pub use event::{DeviceEvent, DeviceEventKind, DeviceId};
pub use source::{CompanionSource, EventSource, RawRecord, ScriptHandle, ScriptedSource};
pub use watcher::{DeviceWatcher, WatcherState};
