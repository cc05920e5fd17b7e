// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! IR fingerprinting
//!
//! BLAKE3 over the IR's fields (stages in their JSON form), so downstream
//! compiler stages can key their caches on a loaded pipeline.

use blake3::Hasher;

use super::definition::PipelineIr;
use crate::errors::IntentError;

/// Content hasher for pipeline IRs
pub struct IrHasher {
    hasher: Hasher,
}

impl IrHasher {
    pub fn new() -> Self {
        Self {
            hasher: Hasher::new(),
        }
    }

    /// Hash an IR and return the hex digest
    pub fn hash_ir(mut self, ir: &PipelineIr) -> Result<String, IntentError> {
        self.hasher.update(ir.name().as_bytes());
        self.hasher.update(&[0]);
        self.hasher.update(ir.version().as_bytes());
        self.hasher.update(&[0]);

        for stage in ir.stages() {
            let stage_json = serde_json::to_string(stage).map_err(|e| IntentError::Json {
                message: format!("Failed to serialize stage '{}': {}", stage.id, e),
            })?;
            self.hasher.update(stage_json.as_bytes());
        }

        for connection in ir.connections() {
            self.hasher.update(connection.to_string().as_bytes());
            self.hasher.update(&[0]);
        }

        for id in ir.order() {
            self.hasher.update(id.as_bytes());
            self.hasher.update(&[0]);
        }

        Ok(self.hasher.finalize().to_hex().to_string())
    }
}

impl Default for IrHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineIr {
    /// BLAKE3 digest of the IR, equal for structurally equal IRs
    pub fn fingerprint(&self) -> Result<String, IntentError> {
        IrHasher::new().hash_ir(self)
    }
}
