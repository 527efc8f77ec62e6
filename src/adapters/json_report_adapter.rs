//! JSON report adapter: one verdict object per document.

use crate::domain::error::TradelangError;
use crate::domain::outcome::Outcome;
use crate::ports::report_port::ReportPort;
use serde::Serialize;

#[derive(Serialize)]
struct DocumentReport<'a> {
    source: &'a str,
    #[serde(flatten)]
    outcome: &'a Outcome,
}

#[derive(Debug, Default)]
pub struct JsonReportAdapter {
    pub pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl ReportPort for JsonReportAdapter {
    fn render(&self, source: &str, outcome: &Outcome) -> Result<String, TradelangError> {
        let report = DocumentReport { source, outcome };
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        rendered.map_err(|e| TradelangError::Report {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{ErrorKind, FieldPath, PathError, ValidationErrors};
    use serde_json::{json, Value};

    #[test]
    fn invalid_outcome_is_flattened_with_source() {
        let outcome = Outcome::Invalid(ValidationErrors {
            errors: vec![PathError {
                path: FieldPath::root().field("strategy").field("then"),
                kind: ErrorKind::WrongFieldType,
                message: "expected an array, found a string".into(),
            }],
        });
        let text = JsonReportAdapter::default().render("s.json", &outcome).unwrap();
        assert!(!text.contains('\n'));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["source"], "s.json");
        assert_eq!(value["ok"], false);
        assert_eq!(value["errors"][0]["kind"], "WrongFieldType");
        assert_eq!(value["errors"][0]["path"], json!(["strategy", "then"]));
    }

    #[test]
    fn pretty_output_is_multiline() {
        let outcome = Outcome::Invalid(ValidationErrors { errors: vec![] });
        let text = JsonReportAdapter::new(true).render("s.json", &outcome).unwrap();
        assert!(text.contains('\n'));
    }

    #[test]
    fn render_all_is_one_object_per_line() {
        let outcome = Outcome::Invalid(ValidationErrors { errors: vec![] });
        let outcomes = vec![
            ("a.json".to_string(), outcome.clone()),
            ("b.json".to_string(), outcome),
        ];
        let text = JsonReportAdapter::default().render_all(&outcomes).unwrap();
        let sources: Vec<String> = text
            .lines()
            .map(|line| serde_json::from_str::<Value>(line).unwrap()["source"].to_string())
            .collect();
        assert_eq!(sources, vec!["\"a.json\"", "\"b.json\""]);
    }
}
