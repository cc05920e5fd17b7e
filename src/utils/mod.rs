// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Utility modules
//!
//! Common utilities for the fpga-intent CLI.

pub mod colors;

pub use colors::*;
