// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Kupu: lasso regions of a photo and erase them with a remote inpainting
//! service.
//!
//! The editing core (viewport, lasso masks, undo history) is a plain reducer
//! in [`editing`], image processing lives in [`pipeline`], the service client
//! in [`inpaint`], and [`data::AppState`] ties them together for a front end.
//! The bundled binary is a headless front end driven from the command line.

pub mod cli;
pub mod config;
pub mod data;
pub mod editing;
pub mod inpaint;
pub mod pipeline;
pub mod settings;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

pub use config::Config;
pub use data::AppState;

/// Entry point for the `kupu` binary
pub fn run() -> ExitCode {
    // Initialize tracing subscriber (can be controlled via RUST_LOG env var)
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "kupu=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
