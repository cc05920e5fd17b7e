// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! IR construction
//!
//! Turns a schema-valid document into a [`PipelineIr`]. Stage resolution,
//! connection resolution and the graph checks all report into one error
//! set; an IR is only returned when that set is empty.

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use super::definition::{
    ConnectionSpec, DType, Direction, Endpoint, ParamValue, PipelineIr, PortSpec, StageKind,
    StageSpec,
};
use super::graph::ConnectionGraph;
use super::schema::ValidatedTree;
use super::tree::{index_path, key_path, Mapping, Node, Scalar};
use crate::errors::{ErrorKind, ErrorSet, LoadError, Location};

/// Builder for the pipeline IR
#[derive(Default)]
pub struct IrBuilder {
    errors: ErrorSet,
    stages: Vec<StageSpec>,
    /// Position in the `stages` sequence of each kept stage
    declared_at: Vec<usize>,
    stage_index: HashMap<String, usize>,
}

/// A connection whose stages and ports all exist
struct ResolvedConnection {
    path: String,
    spec: ConnectionSpec,
    /// Runs from an output port to an input port
    directed: bool,
}

impl IrBuilder {
    /// Build the IR of a schema-valid document
    pub fn build(tree: &ValidatedTree) -> Result<PipelineIr, ErrorSet> {
        let mut builder = Self::default();

        // The schema guarantees a mapping root
        let Some(root) = tree.root().as_mapping() else {
            return Err(ErrorSet::from(LoadError::new(
                ErrorKind::SchemaError,
                "pipeline description must be a mapping",
                None,
            )));
        };

        builder.resolve_stages(root);
        debug!(stages = builder.stages.len(), "resolved stages");

        let connections = builder.resolve_connections(root);
        debug!(connections = connections.len(), "resolved connections");

        builder.check_fan_in(&connections);

        // A reversed wire is already reported and must not fake a cycle
        let wired: Vec<ConnectionSpec> = connections
            .iter()
            .filter(|c| c.directed)
            .map(|c| c.spec.clone())
            .collect();
        let order = builder.order_stages(&wired);
        let connections: Vec<ConnectionSpec> = connections.into_iter().map(|c| c.spec).collect();

        let Self { errors, stages, .. } = builder;
        if !errors.is_empty() {
            debug!(errors = errors.len(), "IR construction failed");
            return Err(errors);
        }

        let name = str_field(root, "name").unwrap_or_default().to_string();
        let version = match root.get("version").and_then(Node::as_scalar) {
            Some(Scalar::Str(s)) => s.clone(),
            Some(Scalar::Int(i)) => i.to_string(),
            _ => "1".to_string(),
        };
        let description = str_field(root, "description").map(String::from);

        Ok(PipelineIr::new(
            name,
            version,
            description,
            stages,
            connections,
            order.unwrap_or_default(),
        ))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Stage resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stages(&mut self, root: &Mapping) {
        let items = root.get("stages").and_then(Node::as_sequence).unwrap_or_default();
        let mut reported = HashSet::new();

        for (i, item) in items.iter().enumerate() {
            let path = index_path("stages", i);
            let Some(stage) = item.as_mapping().and_then(stage_spec) else {
                continue;
            };

            if let Some(&first) = self.stage_index.get(&stage.id) {
                if reported.insert(stage.id.clone()) {
                    self.errors.at(
                        ErrorKind::DuplicateStageId,
                        &key_path(&path, "id"),
                        format!(
                            "duplicate stage id '{}' (first defined at {}); the first definition is used",
                            stage.id,
                            index_path("stages", self.declared_at[first])
                        ),
                    );
                }
                continue;
            }

            self.stage_index.insert(stage.id.clone(), self.stages.len());
            self.declared_at.push(i);
            self.stages.push(stage);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Connection resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_connections(&mut self, root: &Mapping) -> Vec<ResolvedConnection> {
        let items = root
            .get("connections")
            .and_then(Node::as_sequence)
            .unwrap_or_default();
        let mut resolved = Vec::new();

        for (i, item) in items.iter().enumerate() {
            let path = index_path("connections", i);
            let Some(map) = item.as_mapping() else {
                continue;
            };
            let (Some(from), Some(to)) = (endpoint_field(map, "from"), endpoint_field(map, "to"))
            else {
                continue;
            };
            let spec = ConnectionSpec { from, to };

            let from_port = self.lookup(&spec, &spec.from, &key_path(&path, "from"));
            let to_port = self.lookup(&spec, &spec.to, &key_path(&path, "to"));
            let (Some(from_port), Some(to_port)) = (from_port, to_port) else {
                continue;
            };

            let mut directions_ok = true;
            if from_port.direction != Direction::Output {
                directions_ok = false;
                self.errors.at(
                    ErrorKind::DirectionMismatch,
                    &key_path(&path, "from"),
                    format!(
                        "connection '{}' starts at '{}', which is an {} port",
                        spec, spec.from, from_port.direction
                    ),
                );
            }
            if to_port.direction != Direction::Input {
                directions_ok = false;
                self.errors.at(
                    ErrorKind::DirectionMismatch,
                    &key_path(&path, "to"),
                    format!(
                        "connection '{}' ends at '{}', which is an {} port",
                        spec, spec.to, to_port.direction
                    ),
                );
            }

            if directions_ok {
                let width_reducing = self.stage(&spec.to.stage).is_some_and(|s| s.width_reducing);
                if !ports_compatible(&from_port, &to_port, width_reducing) {
                    self.errors.at(
                        ErrorKind::PortTypeMismatch,
                        &path,
                        type_mismatch_message(&spec, &from_port, &to_port, width_reducing),
                    );
                }
            }

            resolved.push(ResolvedConnection {
                path,
                spec,
                directed: directions_ok,
            });
        }

        resolved
    }

    fn stage(&self, id: &str) -> Option<&StageSpec> {
        self.stage_index.get(id).map(|&i| &self.stages[i])
    }

    /// Resolve one endpoint, recording `UnknownStageOrPort` when it dangles
    fn lookup(&mut self, spec: &ConnectionSpec, endpoint: &Endpoint, path: &str) -> Option<PortSpec> {
        let message = match self.stage(&endpoint.stage) {
            None => format!(
                "connection '{}' references unknown stage '{}'",
                spec, endpoint.stage
            ),
            Some(stage) => match stage.port(&endpoint.port) {
                Some(port) => return Some(*port),
                None => format!(
                    "connection '{}' references unknown port '{}' on stage '{}'",
                    spec, endpoint.port, endpoint.stage
                ),
            },
        };
        self.errors.at(ErrorKind::UnknownStageOrPort, path, message);
        None
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Graph checks
    // ─────────────────────────────────────────────────────────────────────────

    /// Every input port may be driven by one connection at most
    fn check_fan_in(&mut self, connections: &[ResolvedConnection]) {
        let mut targets: Vec<(&Endpoint, Vec<&ResolvedConnection>)> = Vec::new();

        for connection in connections {
            let is_input = self
                .stage(&connection.spec.to.stage)
                .and_then(|s| s.port(&connection.spec.to.port))
                .is_some_and(|p| p.direction == Direction::Input);
            if !is_input {
                continue;
            }
            match targets.iter_mut().find(|(to, _)| **to == connection.spec.to) {
                Some((_, drivers)) => drivers.push(connection),
                None => targets.push((&connection.spec.to, vec![connection])),
            }
        }

        for (to, drivers) in targets {
            if drivers.len() < 2 {
                continue;
            }
            let named: Vec<String> = drivers
                .iter()
                .map(|c| format!("'{}' ({})", c.spec, c.path))
                .collect();
            self.errors.at(
                ErrorKind::PortFanInViolation,
                &drivers[1].path,
                format!(
                    "input port '{}' is driven by {} connections: {}",
                    to,
                    drivers.len(),
                    named.join(", ")
                ),
            );
        }
    }

    fn order_stages(&mut self, connections: &[ConnectionSpec]) -> Option<Vec<String>> {
        let graph = ConnectionGraph::new(&self.stages, connections);
        match graph.feedback_order() {
            Ok(order) => Some(order),
            Err(unresolved) => {
                self.errors.push(LoadError::new(
                    ErrorKind::CycleDetected,
                    format!(
                        "feed-forward stages form a cycle; unresolved stages: {} \
                         (mark a stage feedback_capable to allow the loop)",
                        unresolved.join(", ")
                    ),
                    Some(Location::path("connections")),
                ));
                None
            }
        }
    }
}

/// Equal dtype and width, or the width-reducing rule: same dtype and a
/// source width that is an exact multiple of the input width
fn ports_compatible(from: &PortSpec, to: &PortSpec, width_reducing: bool) -> bool {
    if from.dtype != to.dtype {
        return false;
    }
    from.width == to.width || (width_reducing && to.width > 0 && from.width % to.width == 0)
}

fn type_mismatch_message(
    spec: &ConnectionSpec,
    from: &PortSpec,
    to: &PortSpec,
    width_reducing: bool,
) -> String {
    let mut message = format!(
        "connection '{}' joins {}<{}> to {}<{}>",
        spec, from.dtype, from.width, to.dtype, to.width
    );
    if from.dtype == to.dtype && from.width > to.width {
        if width_reducing {
            message.push_str(&format!(
                "; {} is not a multiple of {}",
                from.width, to.width
            ));
        } else {
            message.push_str(&format!(
                "; stage '{}' is not width_reducing",
                spec.to.stage
            ));
        }
    }
    message
}

fn str_field<'a>(map: &'a Mapping, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Node::as_str)
}

fn endpoint_field(map: &Mapping, key: &str) -> Option<Endpoint> {
    str_field(map, key)?.parse().ok()
}

fn stage_spec(map: &Mapping) -> Option<StageSpec> {
    let id = str_field(map, "id")?.to_string();
    let kind: StageKind = str_field(map, "kind")?.parse().ok()?;
    let flag = |key: &str| map.get(key).and_then(Node::as_bool).unwrap_or(false);

    let mut ports = BTreeMap::new();
    if let Some(declared) = map.get("ports").and_then(Node::as_mapping) {
        for (name, port) in declared.iter() {
            if let Some(port) = port.as_mapping().and_then(port_spec) {
                ports.insert(name.to_string(), port);
            }
        }
    }

    let mut parameters = BTreeMap::new();
    if let Some(declared) = map.get("parameters").and_then(Node::as_mapping) {
        for (name, value) in declared.iter() {
            let value = match value.as_scalar() {
                Some(Scalar::Bool(b)) => ParamValue::Bool(*b),
                Some(Scalar::Int(i)) => match i64::try_from(*i) {
                    Ok(i) => ParamValue::Int(i),
                    Err(_) => continue,
                },
                Some(Scalar::Float(x)) => ParamValue::Float(*x),
                Some(Scalar::Str(s)) => ParamValue::Str(s.clone()),
                Some(Scalar::Null) | None => continue,
            };
            parameters.insert(name.to_string(), value);
        }
    }

    Some(StageSpec {
        id,
        kind,
        description: str_field(map, "description").map(String::from),
        ports,
        parameters,
        feedback_capable: flag("feedback_capable"),
        width_reducing: flag("width_reducing"),
    })
}

fn port_spec(map: &Mapping) -> Option<PortSpec> {
    let direction: Direction = str_field(map, "direction")?.parse().ok()?;
    let dtype: DType = str_field(map, "dtype")?.parse().ok()?;
    let width = u32::try_from(map.get("width")?.as_int()?).ok()?;
    Some(PortSpec {
        direction,
        dtype,
        width,
    })
}
