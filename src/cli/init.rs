// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Init command - write a starter pipeline description

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::errors::{IntentError, IntentResult};
use crate::utils::print_success;

/// Run the init command
pub async fn run(
    name: Option<String>,
    template: Option<String>,
    output: PathBuf,
    force: bool,
    verbose: bool,
) -> Result<()> {
    let pipeline_name = name.unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|s| s.to_string_lossy().to_string()))
            .unwrap_or_else(|| "my_pipeline".to_string())
    });

    println!("{}", "Initializing pipeline description...".bold());
    println!();

    if output.exists() && !force {
        return Err(miette::miette!(
            "{} already exists. Use --force to overwrite.",
            output.display()
        ));
    }

    // Generate pipeline based on template
    let content = match template.as_deref() {
        None | Some("passthrough") => generate_passthrough_template(&pipeline_name)?,
        Some("feedback") => generate_feedback_template(&pipeline_name)?,
        Some(t) => {
            return Err(miette::miette!(
                "Unknown template: '{}'\n\nAvailable templates:\n\
                 • passthrough  - source → transform → sink\n\
                 • feedback     - accumulator loop closed by a register",
                t
            ));
        }
    };

    tokio::fs::write(&output, &content)
        .await
        .map_err(|e| IntentError::FileWriteError {
            path: output.clone(),
            error: e.to_string(),
        })?;

    print_success(&format!("Created {}", output.display()));
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to describe your pipeline", output.display().to_string().cyan());
    println!(
        "  2. Run {} to check it",
        format!("fpga-intent validate {}", output.display()).cyan()
    );
    println!();

    if verbose {
        println!("{}", "Generated pipeline:".dimmed());
        println!("{}", "─".repeat(50).dimmed());
        println!("{}", content.dimmed());
    }

    Ok(())
}

/// The name as a YAML scalar, quoted and escaped when needed
fn yaml_name(name: &str) -> IntentResult<String> {
    Ok(serde_yaml::to_string(name)?.trim_end().to_string())
}

fn generate_passthrough_template(name: &str) -> IntentResult<String> {
    let name = yaml_name(name)?;
    Ok(format!(
        r#"# fpga-intent pipeline description
version: "1"
name: {name}

stages:
  - id: adc
    kind: source
    ports:
      samples: {{ direction: output, dtype: int, width: 16 }}

  - id: fir
    kind: transform
    parameters:
      taps: 32
    ports:
      x: {{ direction: input, dtype: int, width: 16 }}
      y: {{ direction: output, dtype: int, width: 16 }}

  - id: dac
    kind: sink
    ports:
      samples: {{ direction: input, dtype: int, width: 16 }}

connections:
  - from: adc.samples
    to: fir.x
  - from: fir.y
    to: dac.samples
"#
    ))
}

fn generate_feedback_template(name: &str) -> IntentResult<String> {
    let name = yaml_name(name)?;
    Ok(format!(
        r#"# fpga-intent pipeline description - accumulator with feedback
version: "1"
name: {name}

stages:
  - id: src
    kind: source
    ports:
      out: {{ direction: output, dtype: uint, width: 32 }}

  - id: add
    kind: transform
    ports:
      a: {{ direction: input, dtype: uint, width: 32 }}
      b: {{ direction: input, dtype: uint, width: 32 }}
      sum: {{ direction: output, dtype: uint, width: 32 }}

  # Registers may close a loop; they are ordered after feed-forward stages
  - id: acc
    kind: register
    feedback_capable: true
    ports:
      d: {{ direction: input, dtype: uint, width: 32 }}
      q: {{ direction: output, dtype: uint, width: 32 }}

  # Keeps the low byte of the running sum
  - id: out
    kind: sink
    width_reducing: true
    ports:
      low: {{ direction: input, dtype: uint, width: 8 }}

connections:
  - {{ from: src.out, to: add.a }}
  - {{ from: acc.q, to: add.b }}
  - {{ from: add.sum, to: acc.d }}
  - {{ from: add.sum, to: out.low }}
"#
    ))
}
