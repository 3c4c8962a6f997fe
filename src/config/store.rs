// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! File-backed configuration store.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the default config file, relative to the home directory.
pub const DEFAULT_CONFIG_FILE_NAME: &str = ".presence-lock-config.json";

/// The persisted configuration mapping.
///
/// Unknown keys are preserved across load/save cycles so that older or
/// newer versions of the tool can share one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Identifier of the USB device that locks/unlocks the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    /// Whether debug logging is enabled by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    /// Any keys this version does not know about.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Read-modify-write store for [`Config`].
///
/// Each mutation loads the full file, applies the change in memory, and
/// rewrites the full file. There is no file locking: concurrent writers
/// can lose updates. This is a known limitation carried over from the
/// original behavior, kept deliberately rather than silently changed.
///
/// # Examples
///
/// ```no_run
/// use presence_lock::config::ConfigStore;
///
/// let store = ConfigStore::at_default_path()?;
/// store.set_device_id("0123456789ABCDEF")?;
/// assert_eq!(store.load()?.device_id.as_deref(), Some("0123456789ABCDEF"));
/// # Ok::<(), presence_lock::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store over the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store over `~/.presence-lock-config.json`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDir`] if no home directory can be
    /// determined.
    pub fn at_default_path() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::new(home.join(DEFAULT_CONFIG_FILE_NAME)))
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration, creating an empty file first if none
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid
    /// JSON.
    pub fn load(&self) -> Result<Config, ConfigError> {
        self.ensure_exists()?;
        let text = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes the full configuration back to the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let text = serde_json::to_string(config).map_err(|source| ConfigError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Persists a new device identifier (read-modify-write).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn set_device_id(&self, device_id: impl Into<String>) -> Result<(), ConfigError> {
        let mut config = self.load()?;
        config.device_id = Some(device_id.into());
        self.save(&config)
    }

    /// Returns the configured device identifier, if any.
    ///
    /// An empty string counts as unconfigured.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn device_id(&self) -> Result<Option<String>, ConfigError> {
        Ok(self.load()?.device_id.filter(|id| !id.is_empty()))
    }

    fn ensure_exists(&self) -> Result<(), ConfigError> {
        if self.path.exists() {
            return Ok(());
        }
        fs::write(&self.path, "{}").map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
