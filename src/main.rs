// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! fpga-intent - Pipeline Intent Loader
//!
//! Load YAML pipeline descriptions and build a validated stage graph IR.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fpga_intent::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    fpga_intent::utils::init_colors();

    // Initialize tracing; stdout is reserved for command output
    let default_filter = if cli.verbose {
        "fpga_intent=debug"
    } else {
        "fpga_intent=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Init {
            name,
            template,
            output,
            force,
        } => fpga_intent::cli::init::run(name, template, output, force, cli.verbose).await,
        Commands::Validate { pipeline } => {
            fpga_intent::cli::validate::run(pipeline, cli.max_bytes, cli.verbose).await
        }
        Commands::Compile { pipeline, out } => {
            fpga_intent::cli::compile::run(pipeline, out, cli.max_bytes, cli.verbose).await
        }
        Commands::Graph { pipeline, format } => {
            fpga_intent::cli::graph::run(pipeline, format, cli.max_bytes, cli.verbose).await
        }
        Commands::Watch { pipeline, debounce } => {
            fpga_intent::cli::watch::run(pipeline, debounce, cli.max_bytes, cli.verbose).await
        }
    }
}
