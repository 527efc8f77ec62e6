//! Report rendering port trait.

use crate::domain::error::TradelangError;
use crate::domain::outcome::Outcome;

/// Port for turning a validation outcome into printable output.
pub trait ReportPort {
    /// Renders the outcome of one document. `source` names the document
    /// (usually its file path).
    fn render(&self, source: &str, outcome: &Outcome) -> Result<String, TradelangError>;

    /// Default implementation: one rendered document per line group.
    fn render_all(&self, outcomes: &[(String, Outcome)]) -> Result<String, TradelangError> {
        let mut out = String::new();
        for (source, outcome) in outcomes {
            out.push_str(&self.render(source, outcome)?);
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
        Ok(out)
    }
}
