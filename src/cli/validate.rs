// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Validate command - check a pipeline description

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::read_pipeline;
use crate::errors::{ErrorSet, RecoverySuggestion};
use crate::intent::{load, PipelineIr};
use crate::utils::{print_error, print_section, print_success};

/// Run the validate command
pub async fn run(pipeline_path: PathBuf, max_bytes: Option<u64>, verbose: bool) -> Result<()> {
    println!("{}", "Validating pipeline...".bold());
    println!();

    let content = read_pipeline(&pipeline_path, max_bytes).await?;

    match load(&content) {
        Ok(ir) => {
            print_success(&pipeline_path.display().to_string());
            if verbose {
                print_summary(&ir);
            }
            println!();
            println!("{}", "Pipeline is valid!".green().bold());
            Ok(())
        }
        Err(errors) => {
            report_errors(&errors, verbose);
            Err(miette::miette!(
                "Pipeline validation failed with {} error(s)",
                errors.len()
            ))
        }
    }
}

/// Print every error, one per line
pub fn report_errors(errors: &ErrorSet, verbose: bool) {
    eprintln!("{}:", "Errors".red().bold());
    for error in errors {
        print_error(&error.to_string());
    }

    if verbose {
        let mut shown = Vec::new();
        for error in errors {
            if shown.contains(&error.kind) {
                continue;
            }
            shown.push(error.kind);
            eprintln!();
            eprint!("{}", RecoverySuggestion::for_error(error));
        }
    }
    eprintln!();
}

fn print_summary(ir: &PipelineIr) {
    print_section("Pipeline summary");
    println!("  Name: {}", ir.name());
    println!("  Stages: {}", ir.stages().len());
    for stage in ir.ordered_stages() {
        let flags = match (stage.feedback_capable, stage.width_reducing) {
            (true, true) => " [feedback, width-reducing]",
            (true, false) => " [feedback]",
            (false, true) => " [width-reducing]",
            (false, false) => "",
        };
        println!(
            "    - {} ({}, {} ports){}",
            stage.id,
            stage.kind,
            stage.ports.len(),
            flags.dimmed()
        );
    }
    println!("  Connections: {}", ir.connections().len());
    for connection in ir.connections() {
        println!("    - {}", connection);
    }
}
