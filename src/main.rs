// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `presence-lock` binary entry point.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use presence_lock::config::ConfigStore;
use presence_lock::error::{ConfigError, Error};
use presence_lock::session::LoginctlSession;
use presence_lock::source::CompanionSource;
use presence_lock::{monitor, setup};

use cli::{Action, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let store = match &cli.config {
        Some(path) => ConfigStore::new(path.clone()),
        None => match ConfigStore::at_default_path() {
            Ok(store) => store,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        },
    };

    let config = match store.load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    // CLI flag wins over the persisted debug key; default is off.
    let debug = cli.debug.or(config.debug).unwrap_or(false);
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let result = match cli.action {
        Action::Monitor => {
            monitor::run(
                &store,
                CompanionSource::default(),
                Arc::new(LoginctlSession),
            )
            .await
        }
        Action::Setup => setup::run(&store, CompanionSource::default()).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Config(ConfigError::DeviceNotConfigured)) => {
            eprintln!(
                "Cannot find configured device ID; please run `sudo presence-lock setup` \
                 to set up before first run"
            );
            ExitCode::FAILURE
        }
        Err(err) => {
            tracing::error!(error = %err, "fatal error");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
