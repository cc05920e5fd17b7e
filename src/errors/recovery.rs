// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for fixing a pipeline description.

use super::{ErrorKind, LoadError, Location};

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Pick the suggestion that fits a load diagnostic
    pub fn for_error(error: &LoadError) -> Self {
        match error.kind {
            ErrorKind::SyntaxError => match &error.location {
                Some(Location::Source { line, column, .. }) => {
                    Self::fix_yaml_syntax(Some(*line), Some(*column))
                }
                _ => Self::fix_yaml_syntax(None, None),
            },
            ErrorKind::SchemaError => Self::fix_schema(),
            ErrorKind::DuplicateStageId => Self::rename_duplicate_stage(),
            ErrorKind::UnknownStageOrPort => Self::fix_unknown_reference(),
            ErrorKind::DirectionMismatch => Self::fix_direction(),
            ErrorKind::PortTypeMismatch => Self::fix_port_types(),
            ErrorKind::PortFanInViolation => Self::insert_merge_stage(),
            ErrorKind::CycleDetected => Self::break_cycle(),
        }
    }

    /// Suggest fixing invalid YAML
    pub fn fix_yaml_syntax(line: Option<usize>, column: Option<usize>) -> Self {
        let location = match (line, column) {
            (Some(l), Some(c)) => format!(" at line {}, column {}", l, c),
            (Some(l), None) => format!(" at line {}", l),
            _ => String::new(),
        };

        Self {
            action: format!("Fix YAML syntax error{}", location),
            steps: vec![
                "Check for common YAML issues:".into(),
                "  • Incorrect indentation (use spaces, not tabs)".into(),
                "  • Missing colons after keys".into(),
                "  • Keys repeated inside one mapping".into(),
            ],
            commands: vec![],
        }
    }

    pub fn fix_schema() -> Self {
        Self {
            action: "Match the pipeline schema".into(),
            steps: vec![
                "A pipeline needs 'name' and a non-empty 'stages' list".into(),
                "Every stage needs 'id' and 'kind'; ports need 'direction', 'dtype' and 'width'"
                    .into(),
                "Connections are written 'stage.port'".into(),
            ],
            commands: vec![
                "# Generate a starter description:".into(),
                "fpga-intent init".into(),
            ],
        }
    }

    pub fn rename_duplicate_stage() -> Self {
        Self {
            action: "Give every stage a unique id".into(),
            steps: vec![
                "Only the first stage with a given id is used".into(),
                "Rename the later definitions or remove them".into(),
            ],
            commands: vec![],
        }
    }

    pub fn fix_unknown_reference() -> Self {
        Self {
            action: "Point the connection at an existing stage and port".into(),
            steps: vec![
                "Check the spelling of the stage id and port name".into(),
                "Declare the port under the stage's 'ports' mapping".into(),
            ],
            commands: vec![],
        }
    }

    pub fn fix_direction() -> Self {
        Self {
            action: "Connect an output port to an input port".into(),
            steps: vec![
                "'from' must name a port with direction: output".into(),
                "'to' must name a port with direction: input".into(),
            ],
            commands: vec![],
        }
    }

    pub fn fix_port_types() -> Self {
        Self {
            action: "Make both ends agree on dtype and width".into(),
            steps: vec![
                "Connected ports must share dtype and width".into(),
                "A wider source is accepted only by a stage marked 'width_reducing: true', \
                 and only when its width is a multiple of the input width"
                    .into(),
            ],
            commands: vec![],
        }
    }

    pub fn insert_merge_stage() -> Self {
        Self {
            action: "Insert a merge stage".into(),
            steps: vec![
                "An input port accepts a single connection".into(),
                "Route the sources into separate inputs of a 'kind: merge' stage".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest fixing a feed-forward cycle
    pub fn break_cycle() -> Self {
        Self {
            action: "Break the cycle or mark a stage feedback-capable".into(),
            steps: vec![
                "Feed-forward stages must form a directed acyclic graph".into(),
                "Registers and accumulators may close a loop with 'feedback_capable: true'".into(),
            ],
            commands: vec![
                "# Visualize your pipeline:".into(),
                "fpga-intent graph --format mermaid".into(),
            ],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}
