// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blattwerk — local PDF page toolkit with an undoable annotation canvas
//
// Entry point. Initialises logging, resolves the data directory and config,
// then dispatches the requested subcommand.

mod cli;
mod commands;
mod data_dir;

use std::process::ExitCode;

use blattwerk_core::human_errors::humanize_error;
use blattwerk_core::{AppConfig, BlattwerkError};
use clap::Parser;

use cli::Cli;
use commands::AppContext;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = data_dir::data_dir(cli.data_dir.as_deref());
    let config = AppConfig::load_or_default(&data_dir);
    tracing::debug!(dir = %data_dir.display(), "Blattwerk starting");

    let ctx = AppContext { data_dir, config };
    match commands::run(cli.command, &ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<BlattwerkError>() {
                Some(known) => eprintln!("{}", humanize_error(known)),
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
