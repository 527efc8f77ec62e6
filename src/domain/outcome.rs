//! The discriminated verdict handed to callers: `{ok: true, value}` or
//! `{ok: false, errors}`.

use crate::domain::error::{PathError, ValidationErrors};
use crate::domain::expression::Strategy;
use serde::ser::Serializer;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Valid(Strategy),
    Invalid(ValidationErrors),
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Valid(_))
    }

    pub fn strategy(&self) -> Option<&Strategy> {
        match self {
            Outcome::Valid(strategy) => Some(strategy),
            Outcome::Invalid(_) => None,
        }
    }

    pub fn errors(&self) -> &[PathError] {
        match self {
            Outcome::Valid(_) => &[],
            Outcome::Invalid(errors) => &errors.errors,
        }
    }

    pub fn into_result(self) -> Result<Strategy, ValidationErrors> {
        match self {
            Outcome::Valid(strategy) => Ok(strategy),
            Outcome::Invalid(errors) => Err(errors),
        }
    }
}

impl From<Result<Strategy, ValidationErrors>> for Outcome {
    fn from(result: Result<Strategy, ValidationErrors>) -> Self {
        match result {
            Ok(strategy) => Outcome::Valid(strategy),
            Err(errors) => Outcome::Invalid(errors),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Verdict<'a> {
    Valid { ok: bool, value: &'a Strategy },
    Invalid { ok: bool, errors: &'a [PathError] },
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let verdict = match self {
            Outcome::Valid(value) => Verdict::Valid { ok: true, value },
            Outcome::Invalid(errors) => Verdict::Invalid {
                ok: false,
                errors: &errors.errors,
            },
        };
        verdict.serialize(serializer)
    }
}
