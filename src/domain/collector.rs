//! Accumulates path-qualified failures across one validation walk.

use crate::domain::error::{ErrorKind, FieldPath, PathError, ValidationErrors};

#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<PathError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: FieldPath, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(PathError {
            path,
            kind,
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of errors recorded so far; compare against a later
    /// [`ErrorCollector::failed_since`] to see whether a subtree failed.
    pub fn mark(&self) -> usize {
        self.errors.len()
    }

    pub fn failed_since(&self, mark: usize) -> bool {
        self.errors.len() > mark
    }

    /// Turns the walk's result into the final verdict. Any recorded error
    /// wins over a produced value.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(ValidationErrors {
                errors: self.errors,
            }),
        }
    }
}
