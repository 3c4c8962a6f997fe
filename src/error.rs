// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for `presence-lock`.
//!
//! This module provides the error hierarchy for failures across the crate:
//! watcher lifecycle misuse, configuration persistence, and the event
//! source binding.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Watcher lifecycle error.
    #[error("watcher error: {0}")]
    Watcher(#[from] WatcherError),

    /// Configuration store error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Event source binding error.
    #[error("event source error: {0}")]
    Source(#[from] SourceError),
}

/// Errors related to the device watcher lifecycle.
///
/// `AlreadyStarted` and `NotRunning` are usage errors: they indicate the
/// caller violated the watcher's state machine (double start, stop while
/// idle) rather than a runtime fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WatcherError {
    /// `start()` was called while the watcher was not idle.
    #[error("watcher has already been started or is still stopping")]
    AlreadyStarted,

    /// `stop()` was called while the watcher was not running.
    #[error("watcher has already been stopped or was never started")]
    NotRunning,

    /// The background loop did not exit within the grace period.
    ///
    /// The loop may still be running, likely wedged inside the underlying
    /// poll call. Consider terminating the process.
    #[error(
        "failed to gracefully stop the watcher within {grace_secs} s; \
         consider terminating the process"
    )]
    StopTimeout {
        /// The grace period that elapsed, in seconds.
        grace_secs: u64,
    },
}

/// Errors related to the configuration store.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the config file failed.
    #[error("failed to access config file {}: {source}", .path.display())]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file contains invalid JSON.
    #[error("failed to parse config file {}: {source}", .path.display())]
    Json {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// No device identifier has been configured yet.
    #[error("no device ID configured; run `presence-lock setup` first")]
    DeviceNotConfigured,

    /// No home directory could be determined for the default config path.
    #[error("cannot determine home directory for default config path")]
    NoHomeDir,
}

/// Errors related to the event source binding.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Spawning the capture companion failed.
    #[error("failed to spawn capture companion {}: {source}", .path.display())]
    Spawn {
        /// Path of the companion executable.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Reading from the binding failed.
    #[error("I/O error on event source: {0}")]
    Io(#[from] std::io::Error),

    /// The binding is no longer delivering records.
    #[error("event source closed: {0}")]
    Closed(String),

    /// A raw record could not be decoded.
    #[error("malformed raw record: {0}")]
    MalformedRecord(String),

    /// The source was polled before activation, or activated twice.
    #[error("event source not in a pollable state: {0}")]
    NotActivated(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
