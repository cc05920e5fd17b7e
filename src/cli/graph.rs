// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Graph command - visualize the pipeline's connection graph

use miette::Result;
use std::path::PathBuf;
use tracing::debug;

use super::validate::report_errors;
use super::{read_pipeline, GraphFormat};
use crate::intent::{load, ConnectionGraph};

/// Run the graph command
pub async fn run(
    pipeline_path: PathBuf,
    format: GraphFormat,
    max_bytes: Option<u64>,
    verbose: bool,
) -> Result<()> {
    let content = read_pipeline(&pipeline_path, max_bytes).await?;

    let ir = load(&content).map_err(|errors| {
        report_errors(&errors, verbose);
        miette::miette!("Cannot draw an invalid pipeline ({} error(s))", errors.len())
    })?;

    let graph = ConnectionGraph::from_ir(&ir);
    debug!(
        stages = graph.stage_count(),
        connections = graph.connection_count(),
        "rendering connection graph"
    );

    // Output in requested format
    let output = match format {
        GraphFormat::Text => graph.to_text(&ir),
        GraphFormat::Dot => graph.to_dot(),
        GraphFormat::Mermaid => graph.to_mermaid(),
    };

    print!("{}", output);

    Ok(())
}
