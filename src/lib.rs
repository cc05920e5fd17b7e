// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! # fpga-intent - Pipeline Intent Loader
//!
//! `fpga-intent` turns a YAML pipeline description into a validated,
//! immutable IR for the downstream FPGA compiler.
//!
//! ## Features
//!
//! - **Schema checking** - Every structural problem is reported at once, with a location
//! - **Graph checks** - Port direction, type, fan-in and cycle rules on the stage graph
//! - **Deterministic order** - Stages are linearized with declaration order as tie-break
//! - **Feedback stages** - Registers may close loops and are ordered last
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a starter pipeline
//! fpga-intent init
//!
//! # Check it
//! fpga-intent validate pipeline.yaml
//!
//! # Emit the IR
//! fpga-intent compile -p pipeline.yaml -o ir.json
//! ```
//!
//! ## Library use
//!
//! ```
//! let ir = fpga_intent::load(
//!     "name: demo\nstages:\n  - { id: src, kind: source }\n",
//! )
//! .unwrap();
//! assert_eq!(ir.order(), ["src"]);
//! ```

pub mod cli;
pub mod errors;
pub mod intent;
pub mod utils;

// Re-export commonly used types
pub use errors::{ErrorKind, ErrorSet, IntentError, IntentResult, LoadError, Location};
pub use intent::{build, load, load_file, parse, PipelineIr, StageSpec};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
