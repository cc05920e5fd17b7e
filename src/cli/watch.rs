// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Watch command - reload the pipeline on file changes

use colored::Colorize;
use miette::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

use super::read_pipeline;
use super::validate::report_errors;
use crate::errors::IntentError;
use crate::intent::load;
use crate::utils::print_info;

/// Run the watch command
pub async fn run(
    pipeline_path: PathBuf,
    debounce_ms: u64,
    max_bytes: Option<u64>,
    verbose: bool,
) -> Result<()> {
    if !pipeline_path.exists() {
        return Err(IntentError::PipelineNotFound {
            path: pipeline_path,
        }
        .into());
    }

    println!("{}", "Starting watch mode...".bold());
    println!(
        "Watching {} for changes (debounce: {}ms)",
        pipeline_path.display(),
        debounce_ms
    );
    println!("Press {} to exit.", "Ctrl+C".cyan());
    println!();

    // Create channel for receiving events
    let (tx, rx) = channel();

    // Create debounced watcher
    let mut debouncer = new_debouncer(Duration::from_millis(debounce_ms), tx)
        .map_err(|e| miette::miette!("Failed to create file watcher: {}", e))?;

    // Editors often replace the file, so watch its directory
    let watch_dir = match pipeline_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    debouncer
        .watcher()
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(|e| miette::miette!("Failed to start watching: {}", e))?;

    // Initial load
    reload(&pipeline_path, max_bytes, verbose).await;

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed = events.iter().any(|e| {
                    matches!(e.kind, DebouncedEventKind::Any) && same_file(&e.path, &pipeline_path)
                });

                if changed {
                    println!();
                    println!("{}", "─".repeat(50).dimmed());
                    println!("{}", "Change detected".yellow());
                    reload(&pipeline_path, max_bytes, verbose).await;
                }
            }
            Ok(Err(e)) => {
                eprintln!("{}: {:?}", "Watch error".red(), e);
            }
            Err(e) => {
                // Channel closed
                eprintln!("{}: {}", "Channel error".red(), e);
                break;
            }
        }
    }

    Ok(())
}

fn same_file(event_path: &Path, pipeline_path: &Path) -> bool {
    event_path.file_name().is_some() && event_path.file_name() == pipeline_path.file_name()
}

/// Load the pipeline from scratch and report the outcome
async fn reload(pipeline_path: &Path, max_bytes: Option<u64>, verbose: bool) {
    let start = std::time::Instant::now();

    let content = match read_pipeline(pipeline_path, max_bytes).await {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}: {}", "Failed to read pipeline".red(), e);
            return;
        }
    };

    match load(&content) {
        Ok(ir) => {
            println!(
                "{} '{}': {} stages, {} connections ({:.2}ms)",
                "Pipeline is valid".green(),
                ir.name(),
                ir.stages().len(),
                ir.connections().len(),
                start.elapsed().as_secs_f64() * 1000.0
            );
            if verbose {
                print_info(&format!("Order: {}", ir.order().join(" → ")));
            }
        }
        Err(errors) => report_errors(&errors, verbose),
    }
}
