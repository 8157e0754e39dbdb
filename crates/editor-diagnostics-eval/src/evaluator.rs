//! Evaluator and report source seams.

use std::fmt;
use std::str::FromStr;

use editor_diagnostics::{Document, Report};
use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::failure::FailureList;

/// Format the evaluator renders its value in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output.
    #[default]
    Json,
    /// YAML output.
    Yaml,
    /// TOML output.
    Toml,
}

impl OutputFormat {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Toml => "toml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "toml" => Ok(OutputFormat::Toml),
            other => Err(EvalError::UnknownFormat(other.to_string())),
        }
    }
}

/// Evaluates source text into a value, or fails with positioned failures.
pub trait SourceEvaluator {
    /// Value produced on success.
    type Value;

    /// Evaluate `text`, identified as `source_id`, rendering the value in `format`.
    fn evaluate(
        &mut self,
        text: &str,
        source_id: &str,
        format: OutputFormat,
    ) -> Result<Self::Value, FailureList>;
}

impl<F, V> SourceEvaluator for F
where
    F: FnMut(&str, &str, OutputFormat) -> Result<V, FailureList>,
{
    type Value = V;

    fn evaluate(
        &mut self,
        text: &str,
        source_id: &str,
        format: OutputFormat,
    ) -> Result<V, FailureList> {
        self(text, source_id, format)
    }
}

/// An additional source of reports (a linter, say) run alongside the evaluator.
///
/// Reports use character offsets into `doc`.
pub trait ReportSource {
    /// Reports for the current document text.
    fn reports(&mut self, doc: &Document) -> Vec<Report>;
}

impl<F> ReportSource for F
where
    F: FnMut(&Document) -> Vec<Report>,
{
    fn reports(&mut self, doc: &Document) -> Vec<Report> {
        self(doc)
    }
}
