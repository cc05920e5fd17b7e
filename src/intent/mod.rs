// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Pipeline intent loading
//!
//! A load runs in one direction: raw text is decoded and checked against
//! the schema ([`parse`]), then the schema-valid tree is turned into a typed
//! IR ([`build`]). A phase that records any error stops the load and hands
//! back its whole [`ErrorSet`].

mod builder;
mod definition;
mod fingerprint;
mod graph;
mod schema;
mod tree;

pub use builder::IrBuilder;
pub use definition::*;
pub use fingerprint::IrHasher;
pub use graph::ConnectionGraph;
pub use schema::{SchemaValidator, ValidatedTree};
pub use tree::{Mapping, Node, Scalar};

use std::path::Path;
use tracing::{debug, info};

use crate::errors::{ErrorSet, IntentError, IntentResult};

/// Decode and schema-check a pipeline description
pub fn parse(text: &str) -> Result<ValidatedTree, ErrorSet> {
    SchemaValidator::parse(text)
}

/// Build the IR from a schema-valid tree
pub fn build(tree: &ValidatedTree) -> Result<PipelineIr, ErrorSet> {
    IrBuilder::build(tree)
}

/// Parse and build in one step
pub fn load(text: &str) -> Result<PipelineIr, ErrorSet> {
    let tree = parse(text).map_err(|errors| {
        debug!(errors = errors.len(), "pipeline rejected during parsing");
        errors
    })?;
    let ir = build(&tree)?;

    info!(
        pipeline = ir.name(),
        stages = ir.stages().len(),
        connections = ir.connections().len(),
        "built pipeline IR"
    );
    Ok(ir)
}

/// Read a pipeline file and load it
pub fn load_file(path: &Path) -> IntentResult<PipelineIr> {
    let content = std::fs::read_to_string(path).map_err(|e| IntentError::FileReadError {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    load(&content).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_schema_errors_block_building() {
        // The duplicate id would be a builder error; the schema error stops first
        let yaml = r#"
name: p
stages:
  - { id: a, kind: source }
  - { id: a, kind: nonsense }
"#;
        let errors = load(yaml).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.iter().next().unwrap().kind, ErrorKind::SchemaError);
    }

    #[test]
    fn test_load_file_missing() {
        let err = load_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, IntentError::FileReadError { .. }));
    }

    #[test]
    fn test_load_file_invalid_carries_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(&path, "name: p\nstages:\n  - { id: a, kind: source }\n  - { id: a, kind: sink }\n")
            .unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, IntentError::InvalidPipeline { .. }));
        let kinds: Vec<_> = err.load_errors().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::DuplicateStageId]);

        let missing = load_file(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(missing.load_errors().is_empty());
    }

    #[test]
    fn test_ir_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PipelineIr>();
    }
}
