// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Compile command - build the IR and write it as JSON

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::read_pipeline;
use super::validate::report_errors;
use crate::errors::IntentError;
use crate::intent::load;
use crate::utils::{print_info, print_success};

/// Run the compile command
pub async fn run(
    pipeline_path: PathBuf,
    out: PathBuf,
    max_bytes: Option<u64>,
    verbose: bool,
) -> Result<()> {
    let content = read_pipeline(&pipeline_path, max_bytes).await?;

    let ir = match load(&content) {
        Ok(ir) => ir,
        Err(errors) => {
            report_errors(&errors, verbose);
            return Err(miette::miette!(
                "Compilation failed with {} error(s)",
                errors.len()
            ));
        }
    };

    println!("{}", "Parsed IR successfully".green());

    let json = ir.to_json()?;
    tokio::fs::write(&out, json)
        .await
        .map_err(|e| IntentError::FileWriteError {
            path: out.clone(),
            error: e.to_string(),
        })?;

    if verbose {
        print_info(&format!("Fingerprint: {}", ir.fingerprint()?.dimmed()));
    }
    print_success(&format!("Wrote {}", out.display()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_writes_ir() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = dir.path().join("pipeline.yaml");
        let out = dir.path().join("ir.json");
        std::fs::write(
            &pipeline,
            "name: tiny\nstages:\n  - { id: only, kind: source }\n",
        )
        .unwrap();

        tokio_test::block_on(run(pipeline, out.clone(), None, false)).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(json["name"], "tiny");
        assert_eq!(json["order"][0], "only");
    }

    #[test]
    fn test_compile_rejects_invalid_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = dir.path().join("pipeline.yaml");
        let out = dir.path().join("ir.json");
        std::fs::write(&pipeline, "name: broken\n").unwrap();

        assert!(tokio_test::block_on(run(pipeline, out.clone(), None, false)).is_err());
        assert!(!out.exists());
    }
}
