//! Validator policy and its configuration loading.
//!
//! INI layout:
//!
//! ```ini
//! [validator]
//! ; reject fields the catalog does not declare
//! strict = false
//! ; deepest expression nesting accepted
//! max_depth = 128
//! ; accept `then: []` and `else: []`
//! allow_empty_branches = true
//! ```

use crate::domain::error::TradelangError;
use crate::ports::config_port::ConfigPort;
use serde::Serialize;

pub const SECTION: &str = "validator";
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Policy {
    /// Report undeclared fields as `UnexpectedField` instead of dropping them.
    pub strict: bool,
    pub max_depth: usize,
    pub allow_empty_branches: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            allow_empty_branches: true,
        }
    }
}

impl Policy {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_empty_branches(mut self, allow: bool) -> Self {
        self.allow_empty_branches = allow;
        self
    }
}

/// Builds a policy from the `[validator]` section, defaulting absent keys.
pub fn load_policy(config: &dyn ConfigPort) -> Result<Policy, TradelangError> {
    let defaults = Policy::default();

    let strict = config
        .get_bool(SECTION, "strict")
        .map_err(|reason| invalid("strict", reason))?
        .unwrap_or(defaults.strict);

    let allow_empty_branches = config
        .get_bool(SECTION, "allow_empty_branches")
        .map_err(|reason| invalid("allow_empty_branches", reason))?
        .unwrap_or(defaults.allow_empty_branches);

    let max_depth = match config
        .get_uint(SECTION, "max_depth")
        .map_err(|reason| invalid("max_depth", reason))?
    {
        None => defaults.max_depth,
        Some(0) => {
            return Err(invalid("max_depth", "max_depth must be at least 1".to_string()));
        }
        Some(n) => usize::try_from(n)
            .map_err(|_| invalid("max_depth", format!("max_depth {} is too large", n)))?,
    };

    Ok(Policy {
        strict,
        max_depth,
        allow_empty_branches,
    })
}

fn invalid(key: &str, reason: String) -> TradelangError {
    TradelangError::ConfigInvalid {
        section: SECTION.to_string(),
        key: key.to_string(),
        reason,
    }
}
