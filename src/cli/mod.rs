// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for fpga-intent.

pub mod compile;
pub mod graph;
pub mod init;
pub mod validate;
pub mod watch;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::errors::{IntentError, IntentResult};

/// Pipeline intent loader
///
/// Validate pipeline descriptions and build the IR for the FPGA compiler.
#[derive(Parser, Debug)]
#[clap(
    name = "fpga-intent",
    version,
    about = "Validate pipeline descriptions and build the IR for FPGA compilation",
    long_about = None,
    after_help = "Examples:\n\
        fpga-intent init                              Write a starter pipeline.yaml\n\
        fpga-intent validate pipeline.yaml            Check a pipeline description\n\
        fpga-intent compile -p pipeline.yaml -o ir.json  Write the IR as JSON\n\
        fpga-intent graph --format mermaid            Show the connection graph\n\n\
        See 'fpga-intent <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Refuse pipeline files larger than this many bytes
    #[clap(long, global = true, env = "FPGA_INTENT_MAX_BYTES", value_name = "BYTES")]
    pub max_bytes: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter pipeline description
    Init {
        /// Pipeline name (defaults to current directory name)
        name: Option<String>,

        /// Use a template (passthrough, feedback)
        #[clap(short, long)]
        template: Option<String>,

        /// Output file
        #[clap(short, long, default_value = "pipeline.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[clap(long)]
        force: bool,
    },

    /// Validate a pipeline description
    Validate {
        /// Pipeline file to validate
        #[clap(env = "FPGA_INTENT_PIPELINE", default_value = "pipeline.yaml")]
        pipeline: PathBuf,
    },

    /// Build the IR and write it as JSON
    Compile {
        /// Pipeline file
        #[clap(short, long, env = "FPGA_INTENT_PIPELINE", default_value = "pipeline.yaml")]
        pipeline: PathBuf,

        /// Output file for the IR
        #[clap(short, long)]
        out: PathBuf,
    },

    /// Show the pipeline's connection graph
    Graph {
        /// Pipeline file
        #[clap(env = "FPGA_INTENT_PIPELINE", default_value = "pipeline.yaml")]
        pipeline: PathBuf,

        /// Output format
        #[clap(short, long, value_enum, default_value_t = GraphFormat::Text)]
        format: GraphFormat,
    },

    /// Watch mode - reload the pipeline on every change
    Watch {
        /// Pipeline file
        #[clap(env = "FPGA_INTENT_PIPELINE", default_value = "pipeline.yaml")]
        pipeline: PathBuf,

        /// Debounce delay in milliseconds
        #[clap(long, default_value = "300")]
        debounce: u64,
    },
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

/// Read a pipeline file, enforcing the optional size limit
pub async fn read_pipeline(path: &Path, max_bytes: Option<u64>) -> IntentResult<String> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IntentError::PipelineNotFound {
            path: path.to_path_buf(),
        },
        _ => IntentError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        },
    })?;

    if let Some(limit) = max_bytes {
        if metadata.len() > limit {
            return Err(IntentError::InputTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit,
            });
        }
    }

    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| IntentError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_graph_format() {
        assert_eq!(GraphFormat::from_str("mermaid", false), Ok(GraphFormat::Mermaid));
        assert!(GraphFormat::from_str("svg", false).is_err());
    }

    #[test]
    fn test_read_pipeline_limits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.yaml");
        std::fs::write(&path, "name: p\n").unwrap();

        let content = tokio_test::block_on(read_pipeline(&path, Some(100))).unwrap();
        assert_eq!(content, "name: p\n");

        let err = tokio_test::block_on(read_pipeline(&path, Some(3))).unwrap_err();
        assert!(matches!(err, IntentError::InputTooLarge { size: 8, limit: 3, .. }));

        let err = tokio_test::block_on(read_pipeline(&dir.path().join("missing.yaml"), None))
            .unwrap_err();
        assert!(matches!(err, IntentError::PipelineNotFound { .. }));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
