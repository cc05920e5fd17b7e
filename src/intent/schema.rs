// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Schema validation
//!
//! Checks a decoded document against the pipeline schema. Every violation
//! is recorded and validation keeps going, so one pass reports all
//! structural problems.

use tracing::debug;

use super::definition::{is_identifier, DType, Direction, Endpoint, StageKind};
use super::tree::{display_path, index_path, key_path, Mapping, Node};
use crate::errors::{ErrorKind, ErrorSet};

const PIPELINE_KEYS: &[&str] = &["version", "name", "description", "stages", "connections"];
const STAGE_KEYS: &[&str] = &[
    "id",
    "kind",
    "description",
    "ports",
    "parameters",
    "feedback_capable",
    "width_reducing",
];
const PORT_KEYS: &[&str] = &["direction", "dtype", "width"];
const CONNECTION_KEYS: &[&str] = &["from", "to"];

/// A document that passed schema validation
///
/// Only [`SchemaValidator`] creates values of this type, so holding one
/// proves the tree is schema-valid.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTree {
    root: Node,
}

impl ValidatedTree {
    pub fn root(&self) -> &Node {
        &self.root
    }
}

/// Pipeline schema validator
#[derive(Default)]
pub struct SchemaValidator {
    errors: ErrorSet,
}

impl SchemaValidator {
    /// Decode raw text and validate it against the schema
    pub fn parse(text: &str) -> Result<ValidatedTree, ErrorSet> {
        let root = Node::from_yaml(text).map_err(ErrorSet::from)?;
        debug!("decoded pipeline document");
        Self::validate(root)
    }

    /// Validate an already decoded document
    pub fn validate(root: Node) -> Result<ValidatedTree, ErrorSet> {
        let mut validator = Self::default();
        validator.check_pipeline(&root);

        debug!(errors = validator.errors.len(), "schema validation finished");
        validator.errors.into_result(ValidatedTree { root })
    }

    fn check_pipeline(&mut self, root: &Node) {
        let Some(map) = self.expect_mapping(root, "") else {
            return;
        };
        self.check_keys(map, PIPELINE_KEYS, "");

        if let Some(name) = self.required(map, "name", "") {
            if let Some(name) = self.expect_str(name, "name") {
                if name.trim().is_empty() {
                    self.errors.at(ErrorKind::SchemaError, "name", "pipeline name is empty");
                }
            }
        }

        if let Some(version) = optional(map, "version") {
            if version.as_str().is_none() && version.as_int().is_none() {
                self.type_error(version, "string or integer", "version");
            }
        }

        if let Some(description) = optional(map, "description") {
            self.expect_str(description, "description");
        }

        if let Some(stages) = self.required(map, "stages", "") {
            if let Some(items) = self.expect_sequence(stages, "stages") {
                if items.is_empty() {
                    self.errors
                        .at(ErrorKind::SchemaError, "stages", "pipeline has no stages defined");
                }
                for (i, stage) in items.iter().enumerate() {
                    self.check_stage(stage, &index_path("stages", i));
                }
            }
        }

        if let Some(connections) = optional(map, "connections") {
            if let Some(items) = self.expect_sequence(connections, "connections") {
                for (i, connection) in items.iter().enumerate() {
                    self.check_connection(connection, &index_path("connections", i));
                }
            }
        }
    }

    fn check_stage(&mut self, node: &Node, path: &str) {
        let Some(map) = self.expect_mapping(node, path) else {
            return;
        };
        self.check_keys(map, STAGE_KEYS, path);

        if let Some(id) = self.required(map, "id", path) {
            let id_path = key_path(path, "id");
            if let Some(id) = self.expect_str(id, &id_path) {
                self.check_identifier(id, "stage id", &id_path);
            }
        }

        if let Some(kind) = self.required(map, "kind", path) {
            let kind_path = key_path(path, "kind");
            if let Some(kind) = self.expect_str(kind, &kind_path) {
                if let Err(reason) = kind.parse::<StageKind>() {
                    self.errors.at(
                        ErrorKind::SchemaError,
                        &kind_path,
                        format!("{} (expected one of: {})", reason, kind_list()),
                    );
                }
            }
        }

        if let Some(description) = optional(map, "description") {
            self.expect_str(description, &key_path(path, "description"));
        }

        for flag in ["feedback_capable", "width_reducing"] {
            if let Some(value) = optional(map, flag) {
                if value.as_bool().is_none() {
                    self.type_error(value, "boolean", &key_path(path, flag));
                }
            }
        }

        if let Some(ports) = optional(map, "ports") {
            let ports_path = key_path(path, "ports");
            if let Some(ports) = self.expect_mapping(ports, &ports_path) {
                for (name, port) in ports.iter() {
                    let port_path = key_path(&ports_path, name);
                    self.check_identifier(name, "port name", &port_path);
                    self.check_port(port, &port_path);
                }
            }
        }

        if let Some(parameters) = optional(map, "parameters") {
            let params_path = key_path(path, "parameters");
            if let Some(parameters) = self.expect_mapping(parameters, &params_path) {
                for (name, value) in parameters.iter() {
                    let param_path = key_path(&params_path, name);
                    self.check_identifier(name, "parameter name", &param_path);
                    if value.as_scalar().is_none() || value.is_null() {
                        self.type_error(value, "boolean, number or string", &param_path);
                    } else if value.as_int().is_some() && value.as_i64().is_none() {
                        self.errors.at(
                            ErrorKind::SchemaError,
                            &param_path,
                            format!("integer parameter '{}' does not fit in 64 bits", name),
                        );
                    }
                }
            }
        }
    }

    fn check_port(&mut self, node: &Node, path: &str) {
        let Some(map) = self.expect_mapping(node, path) else {
            return;
        };
        self.check_keys(map, PORT_KEYS, path);

        if let Some(direction) = self.required(map, "direction", path) {
            let direction_path = key_path(path, "direction");
            if let Some(direction) = self.expect_str(direction, &direction_path) {
                if let Err(reason) = direction.parse::<Direction>() {
                    self.errors.at(
                        ErrorKind::SchemaError,
                        &direction_path,
                        format!("{} (expected input or output)", reason),
                    );
                }
            }
        }

        let dtype = self.required(map, "dtype", path).and_then(|dtype| {
            let dtype_path = key_path(path, "dtype");
            let dtype = self.expect_str(dtype, &dtype_path)?;
            match dtype.parse::<DType>() {
                Ok(dtype) => Some(dtype),
                Err(reason) => {
                    self.errors.at(
                        ErrorKind::SchemaError,
                        &dtype_path,
                        format!("{} (expected one of: {})", reason, dtype_list()),
                    );
                    None
                }
            }
        });

        let width_path = key_path(path, "width");
        let width = self.required(map, "width", path).and_then(|width| {
            let Some(value) = width.as_int() else {
                self.type_error(width, "positive integer", &width_path);
                return None;
            };
            match u32::try_from(value) {
                Ok(w) if w > 0 => Some(w),
                _ => {
                    self.errors.at(
                        ErrorKind::SchemaError,
                        &width_path,
                        format!("width must be between 1 and {}, found {}", u32::MAX, value),
                    );
                    None
                }
            }
        });

        if let (Some(dtype), Some(width)) = (dtype, width) {
            if let Err(reason) = dtype.check_width(width) {
                self.errors.at(ErrorKind::SchemaError, &width_path, reason);
            }
        }
    }

    fn check_connection(&mut self, node: &Node, path: &str) {
        let Some(map) = self.expect_mapping(node, path) else {
            return;
        };
        self.check_keys(map, CONNECTION_KEYS, path);

        for end in CONNECTION_KEYS {
            if let Some(value) = self.required(map, end, path) {
                let end_path = key_path(path, end);
                if let Some(reference) = self.expect_str(value, &end_path) {
                    if let Err(reason) = reference.parse::<Endpoint>() {
                        self.errors.at(ErrorKind::SchemaError, &end_path, reason);
                    }
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn required<'a>(&mut self, map: &'a Mapping, key: &str, path: &str) -> Option<&'a Node> {
        let value = map.get(key);
        if value.is_none() {
            self.errors.at(
                ErrorKind::SchemaError,
                display_path(path),
                format!("missing required field '{}'", key),
            );
        }
        value
    }

    fn check_keys(&mut self, map: &Mapping, allowed: &[&str], path: &str) {
        for key in map.keys() {
            if !allowed.contains(&key) {
                self.errors.at(
                    ErrorKind::SchemaError,
                    &key_path(path, key),
                    format!(
                        "unknown field '{}' (expected one of: {})",
                        key,
                        allowed.join(", ")
                    ),
                );
            }
        }
    }

    fn check_identifier(&mut self, name: &str, what: &str, path: &str) {
        if !is_identifier(name) {
            self.errors.at(
                ErrorKind::SchemaError,
                path,
                format!("{} '{}' must match ^[A-Za-z_][A-Za-z0-9_]*$", what, name),
            );
        }
    }

    fn expect_mapping<'a>(&mut self, node: &'a Node, path: &str) -> Option<&'a Mapping> {
        let map = node.as_mapping();
        if map.is_none() {
            self.type_error(node, "mapping", path);
        }
        map
    }

    fn expect_sequence<'a>(&mut self, node: &'a Node, path: &str) -> Option<&'a [Node]> {
        let items = node.as_sequence();
        if items.is_none() {
            self.type_error(node, "sequence", path);
        }
        items
    }

    fn expect_str<'a>(&mut self, node: &'a Node, path: &str) -> Option<&'a str> {
        let s = node.as_str();
        if s.is_none() {
            self.type_error(node, "string", path);
        }
        s
    }

    fn type_error(&mut self, node: &Node, expected: &str, path: &str) {
        self.errors.at(
            ErrorKind::SchemaError,
            display_path(path),
            format!("expected {}, found {}", expected, node.type_name()),
        );
    }
}

/// Optional fields treat an explicit null like an absent key
fn optional<'a>(map: &'a Mapping, key: &str) -> Option<&'a Node> {
    map.get(key).filter(|v| !v.is_null())
}

fn kind_list() -> String {
    StageKind::ALL.map(|k| k.as_str()).join(", ")
}

fn dtype_list() -> String {
    DType::ALL.map(|d| d.as_str()).join(", ")
}
