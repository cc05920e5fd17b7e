// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Load diagnostics
//!
//! Every phase of a load collects its findings into an [`ErrorSet`] instead
//! of stopping at the first problem, so one invocation reports everything
//! that is wrong with a pipeline description.

use serde::Serialize;
use std::fmt;

use super::RecoverySuggestion;

/// Category of a load diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The text is not well-formed YAML
    SyntaxError,
    /// A field is missing, unknown, or has the wrong type or range
    SchemaError,
    /// Two or more stages share an id
    DuplicateStageId,
    /// A connection endpoint names a stage or port that does not exist
    UnknownStageOrPort,
    /// A connection leaves an input port or enters an output port
    DirectionMismatch,
    /// Connected ports disagree on dtype or width
    PortTypeMismatch,
    /// An input port is driven by more than one connection
    PortFanInViolation,
    /// Feed-forward stages form a cycle
    CycleDetected,
}

impl ErrorKind {
    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            Self::SyntaxError => "fpga_intent::syntax",
            Self::SchemaError => "fpga_intent::schema",
            Self::DuplicateStageId => "fpga_intent::duplicate_stage_id",
            Self::UnknownStageOrPort => "fpga_intent::unknown_stage_or_port",
            Self::DirectionMismatch => "fpga_intent::direction_mismatch",
            Self::PortTypeMismatch => "fpga_intent::port_type_mismatch",
            Self::PortFanInViolation => "fpga_intent::port_fan_in",
            Self::CycleDetected => "fpga_intent::cycle_detected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SyntaxError => "SyntaxError",
            Self::SchemaError => "SchemaError",
            Self::DuplicateStageId => "DuplicateStageId",
            Self::UnknownStageOrPort => "UnknownStageOrPort",
            Self::DirectionMismatch => "DirectionMismatch",
            Self::PortTypeMismatch => "PortTypeMismatch",
            Self::PortFanInViolation => "PortFanInViolation",
            Self::CycleDetected => "CycleDetected",
        };
        f.write_str(name)
    }
}

/// Where a diagnostic points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Location {
    /// Position in the raw text (1-based line and column, 0-based byte offset)
    Source {
        offset: usize,
        line: usize,
        column: usize,
    },
    /// Path into the document, e.g. `stages[1].ports.out.width`
    Path { path: String },
}

impl Location {
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path { path: path.into() }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source { line, column, .. } => write!(f, "line {}, column {}", line, column),
            Self::Path { path } => f.write_str(path),
        }
    }
}

/// A single finding produced while loading a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<Location>,
}

impl LoadError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {}: {}", self.kind, location, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for LoadError {}

impl miette::Diagnostic for LoadError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(RecoverySuggestion::for_error(self).action))
    }
}

/// Ordered collection of load diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorSet {
    errors: Vec<LoadError>,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding
    pub fn push(&mut self, error: LoadError) {
        self.errors.push(error);
    }

    /// Record a finding located by document path
    pub fn at(&mut self, kind: ErrorKind, path: &str, message: impl Into<String>) {
        self.push(LoadError::new(kind, message, Some(Location::path(path))));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LoadError> {
        self.errors.iter()
    }

    /// Findings of one kind, in recording order
    pub fn of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &LoadError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    pub fn count(&self, kind: ErrorKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    /// `Ok(value)` when nothing was recorded, otherwise the whole set
    pub fn into_result<T>(self, value: T) -> Result<T, ErrorSet> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    pub fn into_vec(self) -> Vec<LoadError> {
        self.errors
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorSet {}

impl From<LoadError> for ErrorSet {
    fn from(error: LoadError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for ErrorSet {
    type Item = LoadError;
    type IntoIter = std::vec::IntoIter<LoadError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorSet {
    type Item = &'a LoadError;
    type IntoIter = std::slice::Iter<'a, LoadError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_location() {
        let err = LoadError::new(
            ErrorKind::SchemaError,
            "missing required field 'id'",
            Some(Location::path("stages[0]")),
        );
        assert_eq!(
            err.to_string(),
            "SchemaError at stages[0]: missing required field 'id'"
        );
    }

    #[test]
    fn test_display_source_location() {
        let err = LoadError::new(
            ErrorKind::SyntaxError,
            "did not find expected key",
            Some(Location::Source {
                offset: 12,
                line: 3,
                column: 5,
            }),
        );
        assert_eq!(
            err.to_string(),
            "SyntaxError at line 3, column 5: did not find expected key"
        );
    }

    #[test]
    fn test_error_set_one_per_line() {
        let mut set = ErrorSet::new();
        set.at(ErrorKind::DuplicateStageId, "stages[1].id", "duplicate stage id 'a'");
        set.push(LoadError::new(ErrorKind::CycleDetected, "cycle", None));

        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string().lines().count(), 2);
        assert_eq!(set.count(ErrorKind::CycleDetected), 1);
        assert!(!set.contains(ErrorKind::SyntaxError));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ErrorSet::new().into_result(7), Ok(7));

        let mut set = ErrorSet::new();
        set.at(ErrorKind::SchemaError, "name", "missing");
        assert!(set.into_result(7).is_err());
    }

    #[test]
    fn test_diagnostic_code() {
        use miette::Diagnostic;

        let err = LoadError::new(ErrorKind::PortFanInViolation, "fan-in", None);
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("fpga_intent::port_fan_in"));
        assert!(err.help().is_some());
    }
}
