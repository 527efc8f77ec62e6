//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_document_adapter::JsonDocumentAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::catalog;
use crate::domain::error::TradelangError;
use crate::domain::outcome::Outcome;
use crate::domain::policy::{load_policy, Policy};
use crate::domain::validator::Validator;
use crate::ports::config_port::ConfigPort;
use crate::ports::document_port::DocumentPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradelang", about = "Structural validator for trading-strategy documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate strategy documents (files or directories of *.json)
    Validate {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// INI file with a [validator] section
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Reject fields the function contracts do not declare
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        max_depth: Option<usize>,
        #[arg(long)]
        allow_empty_branches: Option<bool>,
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Print the validated strategy tree (text format only)
        #[arg(long)]
        tree: bool,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// List the function catalog, or the contract of one function
    Functions { name: Option<String> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyOverrides {
    pub strict: bool,
    pub max_depth: Option<usize>,
    pub allow_empty_branches: Option<bool>,
}

pub fn run(cli: Cli) -> ExitCode {
    ExitCode::from(run_status(cli))
}

/// Runs a parsed command and returns its process exit status.
pub fn run_status(cli: Cli) -> u8 {
    match cli.command {
        Command::Validate {
            paths,
            config,
            strict,
            max_depth,
            allow_empty_branches,
            format,
            tree,
            pretty,
        } => {
            let overrides = PolicyOverrides {
                strict,
                max_depth,
                allow_empty_branches,
            };
            let report: Box<dyn ReportPort> = match format {
                Format::Text => Box::new(TextReportAdapter::new(tree)),
                Format::Json => Box::new(JsonReportAdapter::new(pretty)),
            };
            run_validate(&paths, config.as_ref(), overrides, report.as_ref())
        }
        Command::Functions { name } => run_functions(name.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TradelangError> {
    FileConfigAdapter::from_file(path).map_err(|e| TradelangError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Config file values first, then command-line overrides on top.
pub fn resolve_policy(
    config: Option<&dyn ConfigPort>,
    overrides: PolicyOverrides,
) -> Result<Policy, TradelangError> {
    let mut policy = match config {
        Some(config) => load_policy(config)?,
        None => Policy::default(),
    };
    if overrides.strict {
        policy.strict = true;
    }
    match overrides.max_depth {
        Some(0) => {
            return Err(TradelangError::ConfigInvalid {
                section: "cli".to_string(),
                key: "max-depth".to_string(),
                reason: "max-depth must be at least 1".to_string(),
            });
        }
        Some(depth) => policy.max_depth = depth,
        None => {}
    }
    if let Some(allow) = overrides.allow_empty_branches {
        policy.allow_empty_branches = allow;
    }
    Ok(policy)
}

/// Result of validating a batch of documents.
#[derive(Debug, Default)]
pub struct Summary {
    pub outcomes: Vec<(String, Outcome)>,
    /// Documents that could not be read or parsed.
    pub failures: Vec<(String, TradelangError)>,
}

impl Summary {
    pub fn valid_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_ok()).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.outcomes.len() - self.valid_count()
    }

    /// 0 when every document is valid; otherwise the highest exit status
    /// among load failures, or 4 for validation failures alone.
    pub fn exit_status(&self) -> u8 {
        let load = self
            .failures
            .iter()
            .map(|(_, e)| e.exit_status())
            .max()
            .unwrap_or(0);
        let validation = if self.invalid_count() > 0 { 4 } else { 0 };
        load.max(validation)
    }
}

pub fn validate_documents(
    documents: &dyn DocumentPort,
    locations: &[PathBuf],
    validator: &Validator,
) -> Summary {
    let mut summary = Summary::default();
    for location in locations {
        let paths = match documents.discover(location) {
            Ok(paths) => paths,
            Err(e) => {
                summary.failures.push((location.display().to_string(), e));
                continue;
            }
        };
        debug!(location = %location.display(), documents = paths.len(), "discovered documents");

        for path in paths {
            let source = path.display().to_string();
            match documents.load(&path) {
                Ok(document) => {
                    let outcome = Outcome::from(validator.validate_strategy(&document));
                    summary.outcomes.push((source, outcome));
                }
                Err(e) => summary.failures.push((source, e)),
            }
        }
    }
    info!(
        valid = summary.valid_count(),
        invalid = summary.invalid_count(),
        unreadable = summary.failures.len(),
        "validation finished"
    );
    summary
}

fn run_validate(
    paths: &[PathBuf],
    config_path: Option<&PathBuf>,
    overrides: PolicyOverrides,
    report: &dyn ReportPort,
) -> u8 {
    let adapter = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            match load_config(path) {
                Ok(a) => Some(a),
                Err(e) => {
                    eprintln!("error: {e}");
                    return e.exit_status();
                }
            }
        }
        None => None,
    };

    let policy = match resolve_policy(adapter.as_ref().map(|a| a as &dyn ConfigPort), overrides) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return e.exit_status();
        }
    };
    debug!(?policy, "resolved validator policy");

    let validator = Validator::new(policy);
    let summary = validate_documents(&JsonDocumentAdapter::new(), paths, &validator);

    for (source, e) in &summary.failures {
        eprintln!("error: {source}: {e}");
    }
    match report.render_all(&summary.outcomes) {
        Ok(text) => print!("{text}"),
        Err(e) => {
            eprintln!("error: {e}");
            return e.exit_status();
        }
    }

    eprintln!(
        "\n{} valid, {} invalid, {} unreadable",
        summary.valid_count(),
        summary.invalid_count(),
        summary.failures.len()
    );
    summary.exit_status()
}

/// Every catalog entry grouped under its section heading.
pub fn describe_catalog() -> String {
    let mut out = String::new();
    let mut current = None;
    for descriptor in catalog::all() {
        if current != Some(descriptor.group) {
            if current.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("# {}\n", descriptor.group));
            current = Some(descriptor.group);
        }
        out.push_str(&descriptor.to_string());
    }
    out
}

pub fn describe_function(name: &str) -> Result<String, TradelangError> {
    if name == catalog::CONDITIONAL {
        return Ok(format!(
            "{} (conditional)\n  \
             if: expression\n  \
             then: [expression, ...]\n  \
             else: optional [expression, ...]\n",
            catalog::CONDITIONAL
        ));
    }
    catalog::lookup(name)
        .map(|descriptor| descriptor.to_string())
        .ok_or_else(|| TradelangError::UnknownFunction {
            name: name.to_string(),
        })
}

fn run_functions(name: Option<&str>) -> u8 {
    match name {
        None => {
            print!("{}", describe_catalog());
            0
        }
        Some(name) => match describe_function(name) {
            Ok(text) => {
                print!("{text}");
                0
            }
            Err(e) => {
                eprintln!("error: {e}");
                e.exit_status()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_validate() {
        let cli = Cli::try_parse_from([
            "tradelang",
            "validate",
            "a.json",
            "dir",
            "--strict",
            "--max-depth",
            "12",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Command::Validate {
                paths,
                strict,
                max_depth,
                format,
                allow_empty_branches,
                ..
            } => {
                assert_eq!(paths, vec![PathBuf::from("a.json"), PathBuf::from("dir")]);
                assert!(strict);
                assert_eq!(max_depth, Some(12));
                assert_eq!(format, Format::Json);
                assert_eq!(allow_empty_branches, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_requires_a_path() {
        assert!(Cli::try_parse_from(["tradelang", "validate"]).is_err());
    }

    #[test]
    fn cli_parses_functions() {
        let cli = Cli::try_parse_from(["tradelang", "functions", "Get Candle"]).unwrap();
        assert!(matches!(cli.command, Command::Functions { name: Some(n) } if n == "Get Candle"));
    }

    #[test]
    fn describe_single_function() {
        let text = describe_function("Place Limit Order").unwrap();
        assert!(text.starts_with("Place Limit Order (orders)\n"));
        assert!(text.contains("  currency: one of INR\n"));
    }

    #[test]
    fn describe_conditional() {
        let text = describe_function("ifthen").unwrap();
        assert!(text.contains("else: optional"));
    }

    #[test]
    fn describe_unknown_function() {
        let err = describe_function("SMMAAAA").unwrap_err();
        assert_eq!(err.exit_status(), 5);
    }

    #[test]
    fn catalog_listing_has_group_headings() {
        let text = describe_catalog();
        assert!(text.starts_with("# user data\n"));
        assert!(text.contains("\n# momentum\n"));
        assert_eq!(text.matches("\n# ").count() + 1, 14);
    }
}
