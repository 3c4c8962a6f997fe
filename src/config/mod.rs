// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration persistence.
//!
//! The configuration is a flat JSON object in a single file (by default
//! `~/.presence-lock-config.json`): the trigger device's identifier and
//! a debug flag. The store reads the whole file, mutates in memory, and
//! writes the whole file back.

mod store;

pub use store::{Config, ConfigStore, DEFAULT_CONFIG_FILE_NAME};
