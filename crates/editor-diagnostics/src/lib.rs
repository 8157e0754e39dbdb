#![warn(missing_docs)]
//! Editor Diagnostics - Headless Report Engine for Live-Evaluated Documents
//!
//! # Overview
//!
//! `editor-diagnostics` turns the output of an evaluator (or any other report source) into
//! editor-facing state: inline marks, gutter markers, hover tooltips and a keyboard-navigable
//! report panel. It renders nothing itself; the host draws what the engine describes and feeds
//! back edits, pointer and key events, and the current time.
//!
//! # Core Features
//!
//! - **Change-set remapping**: report positions follow edits without re-evaluation
//! - **Debounced evaluation**: one run per quiet period, stale results discarded
//! - **Report store**: a reducer over transactions, with selection continuity
//! - **Panel synchronization**: minimal list edits with stable item identity
//! - **Gutter aggregation**: one marker per line with the most severe report
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Diagnostics engine & commands              │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Panel / Gutter / Tooltip / Decorations     │  ← View state
//! ├─────────────────────────────────────────────┤
//! │  Report store (reducer) & Scheduler         │  ← Core state
//! ├─────────────────────────────────────────────┤
//! │  ChangeSet remapping & Document mirror      │  ← Positions
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//! use editor_diagnostics::{
//!     Diagnostics, DiagnosticsOptions, Document, Report, ReportBatch, RunOutcome, Span,
//! };
//!
//! let start = Instant::now();
//! let mut diagnostics =
//!     Diagnostics::attach(Document::new("main", "1 + "), DiagnosticsOptions::default(), start);
//!
//! // Nothing runs before the quiet period is over.
//! assert!(diagnostics.poll(start).is_none());
//!
//! let request = diagnostics.poll(start + Duration::from_millis(750)).unwrap();
//! let report = Report::error(Span::new("main", 0, 4), "unexpected end of input");
//! let batch = ReportBatch::from(vec![Arc::new(report)]);
//!
//! assert!(matches!(
//!     diagnostics.complete_run(request.ticket, [batch]),
//!     RunOutcome::Applied(_)
//! ));
//! assert_eq!(diagnostics.report_count(), 1);
//! assert_eq!(diagnostics.gutter().markers().len(), 1);
//! ```

pub mod access_keys;
pub mod change;
pub mod commands;
pub mod decorations;
pub mod delta;
pub mod document;
pub mod engine;
pub mod geometry;
pub mod gutter;
pub mod host;
pub mod ingest;
pub mod panel;
pub mod render;
pub mod report;
pub mod scheduler;
pub mod state;
pub mod tooltip;

pub use access_keys::assign_access_keys;
pub use change::{Bias, ChangeError, ChangeSet, ChangeSpec};
pub use commands::{DiagnosticsCommand, KeyBinding, default_keymap};
pub use decorations::{DiagnosticTheme, InlineDecoration};
pub use delta::{TextDelta, TextDeltaEdit};
pub use document::{Document, Line};
pub use engine::{Diagnostics, DiagnosticsOptions, EvalRequest, RunOutcome, ViewUpdate};
pub use geometry::{Point, Rect};
pub use gutter::{Gutter, GutterMarker, GutterOptions, GutterTooltip};
pub use host::{EditorHandle, FocusTarget};
pub use ingest::{Ingest, MALFORMED_REPORT_MESSAGE, ReportBatch};
pub use panel::{PanelItem, PanelItemId, PanelKey, PanelUpdate, PanelView};
pub use render::{RenderedAction, RenderedReport};
pub use report::{Action, Report, ReportFilter, Severity, Span, min_severity};
pub use scheduler::{DEFAULT_EVAL_DELAY, EvalScheduler, PendingRun, RunTicket, TIMER_TOLERANCE};
pub use state::{
    Effect, RangeKind, ReportRange, ReportState, SelectedReport, SelectionPolicy, Transaction,
};
pub use tooltip::{Side, Tooltip};
