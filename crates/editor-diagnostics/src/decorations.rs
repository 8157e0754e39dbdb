//! Inline decorations derived from the report store.
//!
//! Decorations are UI-facing annotations anchored to character offsets. The host renders them;
//! this module only decides what they are:
//!
//! - a mark over the text of every report with a non-empty range
//! - a point widget for zero-width reports
//! - an extra highlight over the selected report while the panel is open
//!
//! Each decoration carries its colour from the [`DiagnosticTheme`] next to its classes, so hosts
//! without a stylesheet can draw it directly.

use std::sync::Arc;

use crate::report::{Report, ReportFilter, Severity, Visible};
use crate::state::{RangeKind, ReportState};

/// Base class of report marks.
pub const RANGE_CLASS: &str = "cm-diagnosticRange";
/// Base class of point widgets.
pub const POINT_CLASS: &str = "cm-diagnosticPoint";
/// Class of the selected-report highlight.
pub const ACTIVE_CLASS: &str = "cm-diagnosticRange-active";

/// One inline decoration.
#[derive(Debug, Clone)]
pub enum InlineDecoration {
    /// Highlight over `from..to`.
    Mark {
        /// Start offset.
        from: usize,
        /// End offset.
        to: usize,
        /// CSS classes.
        class: String,
        /// Underline colour.
        color: String,
        /// Report being highlighted.
        report: Arc<Report>,
    },
    /// Zero-width widget at `at`.
    Point {
        /// Anchor offset.
        at: usize,
        /// CSS classes.
        class: String,
        /// Widget colour.
        color: String,
        /// Report being marked.
        report: Arc<Report>,
    },
    /// Highlight over the selected report.
    Active {
        /// Start offset.
        from: usize,
        /// End offset.
        to: usize,
        /// Background colour.
        background: String,
    },
}

impl InlineDecoration {
    /// Start offset.
    pub fn from(&self) -> usize {
        match self {
            InlineDecoration::Mark { from, .. } | InlineDecoration::Active { from, .. } => *from,
            InlineDecoration::Point { at, .. } => *at,
        }
    }

    /// CSS classes.
    pub fn class(&self) -> &str {
        match self {
            InlineDecoration::Mark { class, .. } | InlineDecoration::Point { class, .. } => class,
            InlineDecoration::Active { .. } => ACTIVE_CLASS,
        }
    }

    /// Colour to draw with: the severity colour, or the background of the active highlight.
    pub fn color(&self) -> &str {
        match self {
            InlineDecoration::Mark { color, .. } | InlineDecoration::Point { color, .. } => color,
            InlineDecoration::Active { background, .. } => background,
        }
    }
}

/// Classes of the mark for `report`.
pub fn mark_class(report: &Report) -> String {
    let mut class = format!("{RANGE_CLASS} {RANGE_CLASS}-{}", report.severity);
    if let Some(extra) = &report.mark_class {
        class.push(' ');
        class.push_str(extra);
    }
    class
}

/// Classes of the point widget for `severity`.
pub fn point_class(severity: Severity) -> String {
    format!("{POINT_CLASS} {POINT_CLASS}-{severity}")
}

/// Decorations for `state`, in range order, coloured by `theme`. `filter` narrows which reports
/// are drawn.
pub fn inline_decorations(
    state: &ReportState,
    filter: Option<&ReportFilter>,
    theme: &DiagnosticTheme,
) -> Vec<InlineDecoration> {
    let visible = Visible::new(filter, state.reports());
    let mut decorations: Vec<InlineDecoration> = state
        .ranges()
        .iter()
        .filter(|range| visible.contains(&range.report))
        .map(|range| {
            let color = theme.color(range.report.severity).to_string();
            match range.kind {
                RangeKind::Mark => InlineDecoration::Mark {
                    from: range.from,
                    to: range.to,
                    class: mark_class(&range.report),
                    color,
                    report: range.report.clone(),
                },
                RangeKind::Point => InlineDecoration::Point {
                    at: range.from,
                    class: point_class(range.report.severity),
                    color,
                    report: range.report.clone(),
                },
            }
        })
        .collect();

    if let Some((from, to)) = active_range(state) {
        decorations.push(InlineDecoration::Active {
            from,
            to,
            background: theme.active_background.clone(),
        });
    }
    decorations
}

/// Range of the active highlight: the selected report while the panel is open.
pub fn active_range(state: &ReportState) -> Option<(usize, usize)> {
    if !state.panel_open() {
        return None;
    }
    state
        .selected()
        .filter(|selected| selected.from < selected.to)
        .map(|selected| (selected.from, selected.to))
}

/// Colours used to draw reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticTheme {
    /// Error colour.
    pub error: String,
    /// Warning colour.
    pub warning: String,
    /// Info colour.
    pub info: String,
    /// Hint colour.
    pub hint: String,
    /// Background of the active highlight.
    pub active_background: String,
}

impl Default for DiagnosticTheme {
    fn default() -> Self {
        Self {
            error: "#d11".to_string(),
            warning: "orange".to_string(),
            info: "#999".to_string(),
            hint: "#66d".to_string(),
            active_background: "#ffdd9980".to_string(),
        }
    }
}

impl DiagnosticTheme {
    /// Colour for `severity`.
    pub fn color(&self, severity: Severity) -> &str {
        match severity {
            Severity::Error => &self.error,
            Severity::Warning => &self.warning,
            Severity::Info => &self.info,
            Severity::Hint => &self.hint,
        }
    }
}
