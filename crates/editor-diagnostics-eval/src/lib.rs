#![warn(missing_docs)]
//! Editor Diagnostics Eval - Evaluator Integration for `editor-diagnostics`
//!
//! # Overview
//!
//! Connects a source evaluator (text in, value or failure list out) to the diagnostics engine:
//! failures are decoded, converted from byte to character offsets and placed as error reports,
//! and an [`EvalSession`] runs the evaluator whenever the engine's debounce timer fires.
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use editor_diagnostics::Document;
//! use editor_diagnostics_eval::{
//!     EvalSession, Failure, FailureList, FailureSpan, OutputFormat, SessionConfig,
//! };
//!
//! let evaluate = |text: &str, source_id: &str, _format: OutputFormat| {
//!     if text.trim_end().ends_with('+') {
//!         Err(FailureList::from(vec![Failure::new(
//!             FailureSpan::new(source_id, 0, text.len()),
//!             "unexpected end of input",
//!         )]))
//!     } else {
//!         Ok(text.to_string())
//!     }
//! };
//!
//! let start = Instant::now();
//! let mut values = Vec::new();
//! let mut session = EvalSession::new(
//!     Document::new("playground", "1 + "),
//!     evaluate,
//!     |value: String| values.push(value),
//!     &SessionConfig::default(),
//!     start,
//! );
//!
//! session.tick(start + Duration::from_millis(750)).unwrap();
//! assert_eq!(session.diagnostics().report_count(), 1);
//! ```

pub mod config;
pub mod error;
pub mod evaluator;
pub mod failure;
pub mod session;
pub mod translate;

pub use config::SessionConfig;
pub use error::EvalError;
pub use evaluator::{OutputFormat, ReportSource, SourceEvaluator};
pub use failure::{Failure, FailureLabel, FailureList, FailureSpan};
pub use session::EvalSession;
pub use translate::translate_failures;
