// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Locks and unlocks the interactive session when a configured USB
/// device is detached or attached.
#[derive(Debug, Parser)]
#[command(name = "presence-lock", version)]
pub struct Cli {
    /// Override debug mode (`true` or `false`).
    #[arg(long, value_name = "BOOL")]
    pub debug: Option<bool>,

    /// Override the default config path (~/.presence-lock-config.json).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub action: Action,
}

/// What to run.
#[derive(Debug, Subcommand)]
pub enum Action {
    /// Start the presence-lock daemon.
    Monitor,
    /// Set up presence-lock by plugging or un-plugging the trigger device.
    Setup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_monitor() {
        let cli = Cli::try_parse_from(["presence-lock", "monitor"]).unwrap();
        assert!(matches!(cli.action, Action::Monitor));
        assert_eq!(cli.debug, None);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn parses_global_flags_with_setup() {
        let cli = Cli::try_parse_from([
            "presence-lock",
            "--debug",
            "true",
            "--config",
            "/tmp/other.json",
            "setup",
        ])
        .unwrap();
        assert!(matches!(cli.action, Action::Setup));
        assert_eq!(cli.debug, Some(true));
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/other.json")));
    }

    #[test]
    fn debug_false_parses() {
        let cli = Cli::try_parse_from(["presence-lock", "--debug", "false", "monitor"]).unwrap();
        assert_eq!(cli.debug, Some(false));
    }

    #[test]
    fn rejects_missing_action() {
        assert!(Cli::try_parse_from(["presence-lock"]).is_err());
    }

    #[test]
    fn rejects_bad_debug_value() {
        assert!(Cli::try_parse_from(["presence-lock", "--debug", "maybe", "monitor"]).is_err());
    }
}
