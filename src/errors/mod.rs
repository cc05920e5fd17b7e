// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Error types
//!
//! Load diagnostics are accumulated in an [`ErrorSet`]; [`IntentError`] wraps
//! everything that can go wrong around a load (file access, serialization)
//! and carries the error set when a description is rejected.

mod diagnostics;
mod recovery;

pub use diagnostics::{ErrorKind, ErrorSet, LoadError, Location};
pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for fpga-intent operations
pub type IntentResult<T> = Result<T, IntentError>;

/// Main error type for fpga-intent
#[derive(Error, Debug, Diagnostic)]
pub enum IntentError {
    // ─────────────────────────────────────────────────────────────────────────
    // Pipeline Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Pipeline file not found: {path}")]
    #[diagnostic(
        code(fpga_intent::pipeline_not_found),
        help("Create a pipeline with 'fpga-intent init' or pass its path explicitly")
    )]
    PipelineNotFound { path: PathBuf },

    #[error("Pipeline description is invalid ({} error(s))", .errors.len())]
    #[diagnostic(code(fpga_intent::invalid_pipeline))]
    InvalidPipeline {
        #[related]
        errors: Vec<LoadError>,
    },

    #[error("Pipeline file '{path}' is {size} bytes, above the {limit} byte limit")]
    #[diagnostic(
        code(fpga_intent::input_too_large),
        help("Raise the limit with --max-bytes")
    )]
    InputTooLarge { path: PathBuf, size: u64, limit: u64 },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(fpga_intent::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(fpga_intent::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(fpga_intent::io_error))]
    Io { message: String },

    #[error("YAML serialization error: {message}")]
    #[diagnostic(code(fpga_intent::yaml_error))]
    Yaml { message: String },

    #[error("JSON serialization error: {message}")]
    #[diagnostic(code(fpga_intent::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for IntentError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for IntentError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for IntentError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<ErrorSet> for IntentError {
    fn from(errors: ErrorSet) -> Self {
        Self::InvalidPipeline {
            errors: errors.into_vec(),
        }
    }
}

impl IntentError {
    /// Diagnostics carried by a rejected pipeline, empty for other errors
    pub fn load_errors(&self) -> &[LoadError] {
        match self {
            Self::InvalidPipeline { errors } => errors,
            _ => &[],
        }
    }
}
