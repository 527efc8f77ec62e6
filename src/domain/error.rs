//! Domain error types.
//!
//! Validation failures are data, not control flow: every defect found in a
//! document becomes a [`PathError`] and the full list travels back to the
//! caller as [`ValidationErrors`]. Operational failures (I/O, configuration,
//! malformed JSON) are [`TradelangError`].

use serde::Serialize;
use std::fmt;

/// One step in the location of a node inside a strategy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Location of a node, from the document root down to the offending value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn field(mut self, name: &str) -> Self {
        self.push(PathSegment::Field(name.to_string()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.push(PathSegment::Index(index));
        self
    }

    /// Descends in place. The validator keeps one path for the whole walk,
    /// pushing on the way down and popping on the way back up.
    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    pub(crate) fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    UnknownFunction,
    MissingRequiredField,
    WrongFieldType,
    EnumValueNotAllowed,
    ArrayLengthMismatch,
    WrongTopLevelShape,
    RecursionLimitExceeded,
    /// Only produced when the validator runs in strict mode.
    UnexpectedField,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownFunction => "UnknownFunction",
            ErrorKind::MissingRequiredField => "MissingRequiredField",
            ErrorKind::WrongFieldType => "WrongFieldType",
            ErrorKind::EnumValueNotAllowed => "EnumValueNotAllowed",
            ErrorKind::ArrayLengthMismatch => "ArrayLengthMismatch",
            ErrorKind::WrongTopLevelShape => "WrongTopLevelShape",
            ErrorKind::RecursionLimitExceeded => "RecursionLimitExceeded",
            ErrorKind::UnexpectedField => "UnexpectedField",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure tagged with where it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{path}: {kind}: {message}")]
pub struct PathError {
    pub path: FieldPath,
    pub kind: ErrorKind,
    pub message: String,
}

/// Every failure found in one document, in depth-first document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("document failed validation with {} error(s)", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<PathError>,
}

impl ValidationErrors {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathError> {
        self.errors.iter()
    }

    /// Kinds in report order; handy for assertions.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.errors.iter().map(|e| e.kind).collect()
    }
}

/// Top-level error type for tradelang.
#[derive(Debug, thiserror::Error)]
pub enum TradelangError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid JSON in {source_name}: {reason}")]
    DocumentParse { source_name: String, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradelangError {
    pub fn exit_status(&self) -> u8 {
        match self {
            TradelangError::Io(_) | TradelangError::Report { .. } => 1,
            TradelangError::ConfigParse { .. } | TradelangError::ConfigInvalid { .. } => 2,
            TradelangError::DocumentParse { .. } => 3,
            TradelangError::Validation(_) => 4,
            TradelangError::UnknownFunction { .. } => 5,
        }
    }
}
