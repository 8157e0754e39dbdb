//! Session configuration.

use std::time::Duration;

use editor_diagnostics::{DiagnosticsOptions, GutterOptions};
use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::evaluator::OutputFormat;

/// Serializable session settings. Missing fields take their defaults.
///
/// ```rust
/// use editor_diagnostics_eval::{OutputFormat, SessionConfig};
///
/// let config = SessionConfig::from_json(r#"{ "delay_ms": 250, "format": "yaml" }"#).unwrap();
/// assert_eq!(config.delay_ms, 250);
/// assert_eq!(config.hover_time_ms, 300);
/// assert_eq!(config.format, OutputFormat::Yaml);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quiet period after an edit before evaluation, in milliseconds.
    pub delay_ms: u64,
    /// Time the pointer rests on a gutter marker before its tooltip opens, in milliseconds.
    pub hover_time_ms: u64,
    /// Distance in pixels the pointer may stray from a marker and keep its tooltip.
    pub hover_margin: f32,
    /// Output format passed to the evaluator.
    pub format: OutputFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            delay_ms: 750,
            hover_time_ms: 300,
            hover_margin: 10.0,
            format: OutputFormat::default(),
        }
    }
}

impl SessionConfig {
    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, EvalError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Engine options for this configuration; filters and theme keep their defaults.
    pub fn options(&self) -> DiagnosticsOptions {
        DiagnosticsOptions {
            eval_delay: Duration::from_millis(self.delay_ms),
            gutter: GutterOptions {
                hover_time: Duration::from_millis(self.hover_time_ms),
                hover_margin: self.hover_margin,
                ..GutterOptions::default()
            },
            ..DiagnosticsOptions::default()
        }
    }
}
