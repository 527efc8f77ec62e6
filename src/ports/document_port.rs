//! Strategy document source port trait.

use crate::domain::error::TradelangError;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub trait DocumentPort {
    /// Every document reachable from `location`, in a stable order.
    fn discover(&self, location: &Path) -> Result<Vec<PathBuf>, TradelangError>;

    fn load(&self, path: &Path) -> Result<Value, TradelangError>;
}
