// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Pipeline IR structures
//!
//! Typed, validated form of a pipeline description. Values of
//! [`PipelineIr`] are only produced by the IR builder and cannot be
//! modified afterwards.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::IntentResult;

/// Check a stage, port or parameter name against `^[A-Za-z_][A-Za-z0-9_]*$`
pub fn is_identifier(name: &str) -> bool {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid identifier pattern"))
        .is_match(name)
}

/// Semantic role of a stage
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    /// Produces data (ADC, stream reader, ...)
    Source,
    /// Processes data
    Transform,
    /// Consumes data
    Sink,
    /// Combines several inputs into one stream
    Merge,
    /// Holds state across cycles
    Register,
}

impl StageKind {
    pub const ALL: [StageKind; 5] = [
        Self::Source,
        Self::Transform,
        Self::Sink,
        Self::Merge,
        Self::Register,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Transform => "transform",
            Self::Sink => "sink",
            Self::Merge => "merge",
            Self::Register => "register",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown stage kind '{}'", s))
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Self::Input),
            "output" => Ok(Self::Output),
            _ => Err(format!("unknown direction '{}'", s)),
        }
    }
}

/// Wire-level data types
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// Untyped bit vector
    Bits,
    /// Single bit
    Bool,
    /// Unsigned integer
    Uint,
    /// Two's complement integer
    Int,
    /// Fixed point
    Fixed,
    /// IEEE 754 floating point
    Float,
}

impl DType {
    pub const ALL: [DType; 6] = [
        Self::Bits,
        Self::Bool,
        Self::Uint,
        Self::Int,
        Self::Fixed,
        Self::Float,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bits => "bits",
            Self::Bool => "bool",
            Self::Uint => "uint",
            Self::Int => "int",
            Self::Fixed => "fixed",
            Self::Float => "float",
        }
    }

    /// Range rule for a declared width, `Err` describes the violation
    pub fn check_width(&self, width: u32) -> Result<(), String> {
        match self {
            Self::Bool if width != 1 => Err(format!("bool ports are 1 bit wide, not {}", width)),
            Self::Float if !matches!(width, 16 | 32 | 64) => Err(format!(
                "float ports are 16, 32 or 64 bits wide, not {}",
                width
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown dtype '{}'", s))
    }
}

/// A named interface point on a stage
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PortSpec {
    pub direction: Direction,
    pub dtype: DType,
    /// Bit width, always > 0
    pub width: u32,
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}<{}>", self.direction, self.dtype, self.width)
    }
}

/// Typed stage parameter
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// One pipeline node
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StageSpec {
    /// Stage id (unique within the pipeline)
    pub id: String,

    pub kind: StageKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub ports: BTreeMap<String, PortSpec>,

    pub parameters: BTreeMap<String, ParamValue>,

    /// May close a loop (registers, accumulators)
    pub feedback_capable: bool,

    /// Accepts inputs narrower than the driving output
    pub width_reducing: bool,
}

impl StageSpec {
    pub fn port(&self, name: &str) -> Option<&PortSpec> {
        self.ports.get(name)
    }

    pub fn inputs(&self) -> impl Iterator<Item = (&str, &PortSpec)> {
        self.ports_in(Direction::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&str, &PortSpec)> {
        self.ports_in(Direction::Output)
    }

    fn ports_in(&self, direction: Direction) -> impl Iterator<Item = (&str, &PortSpec)> {
        self.ports
            .iter()
            .filter(move |(_, p)| p.direction == direction)
            .map(|(n, p)| (n.as_str(), p))
    }
}

/// `stage.port` reference
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub stage: String,
    pub port: String,
}

impl Endpoint {
    pub fn new(stage: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.stage, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((stage, port)) if is_identifier(stage) && is_identifier(port) => {
                Ok(Self::new(stage, port))
            }
            _ => Err(format!("'{}' is not of the form 'stageId.portName'", s)),
        }
    }
}

/// Directed edge between two ports
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub struct ConnectionSpec {
    pub from: Endpoint,
    pub to: Endpoint,
}

impl fmt::Display for ConnectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Validated pipeline, ready for the hardware compiler
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PipelineIr {
    name: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    stages: Vec<StageSpec>,
    connections: Vec<ConnectionSpec>,
    order: Vec<String>,
}

impl PipelineIr {
    pub(crate) fn new(
        name: String,
        version: String,
        description: Option<String>,
        stages: Vec<StageSpec>,
        connections: Vec<ConnectionSpec>,
        order: Vec<String>,
    ) -> Self {
        Self {
            name,
            version,
            description,
            stages,
            connections,
            order,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Stages in declaration order
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    pub fn connections(&self) -> &[ConnectionSpec] {
        &self.connections
    }

    /// Stage ids in topological order, feedback-capable stages last
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Get a stage by id
    pub fn stage(&self, id: &str) -> Option<&StageSpec> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// Stages in topological order
    pub fn ordered_stages(&self) -> impl Iterator<Item = &StageSpec> {
        self.order.iter().filter_map(|id| self.stage(id))
    }

    /// Serialize the IR for the downstream compiler
    pub fn to_json(&self) -> IntentResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }
}
