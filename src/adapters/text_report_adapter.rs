//! Human-readable report adapter.

use crate::domain::error::TradelangError;
use crate::domain::outcome::Outcome;
use crate::ports::report_port::ReportPort;
use std::fmt::Write;

#[derive(Debug, Default)]
pub struct TextReportAdapter {
    /// Also print the validated strategy tree for valid documents.
    pub show_tree: bool,
}

impl TextReportAdapter {
    pub fn new(show_tree: bool) -> Self {
        Self { show_tree }
    }
}

impl ReportPort for TextReportAdapter {
    fn render(&self, source: &str, outcome: &Outcome) -> Result<String, TradelangError> {
        let mut out = String::new();
        let fmt_err = |e: std::fmt::Error| TradelangError::Report {
            reason: e.to_string(),
        };
        match outcome {
            Outcome::Valid(strategy) => {
                writeln!(
                    out,
                    "OK    {}: '{}' by {}",
                    source, strategy.name, strategy.author
                )
                .map_err(fmt_err)?;
                if self.show_tree {
                    writeln!(out, "      {}", strategy.strategy).map_err(fmt_err)?;
                    let instruments: Vec<String> =
                        strategy.instruments().iter().map(|i| i.to_string()).collect();
                    if !instruments.is_empty() {
                        writeln!(out, "      instruments: {}", instruments.join(", "))
                            .map_err(fmt_err)?;
                    }
                }
            }
            Outcome::Invalid(errors) => {
                writeln!(out, "FAIL  {}: {} error(s)", source, errors.len()).map_err(fmt_err)?;
                for error in errors.iter() {
                    writeln!(out, "      {}", error).map_err(fmt_err)?;
                }
            }
        }
        Ok(out)
    }
}
