//! Report data model.
//!
//! A [`Report`] is one problem found by an evaluator or another report source: a span, a
//! severity, a message and optional quick-fix actions. Reports are shared as `Arc<Report>`;
//! the engine uses pointer identity to follow a report across edits and report-set
//! replacements, so clone the `Arc`, never the report, when passing one back.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::host::EditorHandle;

/// Character span of a report inside one source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    /// Source the offsets refer to.
    pub source_id: String,
    /// Start offset (inclusive).
    pub from: usize,
    /// End offset (exclusive). Expected to be `>= from`; checked at ingestion.
    pub to: usize,
}

impl Span {
    /// Create a span.
    pub fn new(source_id: impl Into<String>, from: usize, to: usize) -> Self {
        Self {
            source_id: source_id.into(),
            from,
            to,
        }
    }

    /// Returns `true` for a zero-width span.
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// Report severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// A suggestion.
    Hint,
    /// Informational.
    Info,
    /// Something likely wrong.
    Warning,
    /// Evaluation failed.
    Error,
}

impl Severity {
    /// Lower-case name, also used as a CSS class suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Hint => "hint",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type ActionFn = dyn Fn(&mut dyn EditorHandle, usize, usize) + Send + Sync;

/// A named quick fix attached to a report.
///
/// The callback receives the report's **current** `from..to`, not the span it was created with.
#[derive(Clone)]
pub struct Action {
    /// Label shown to the user. Its first free ASCII letter becomes the access key.
    pub name: String,
    apply: Arc<ActionFn>,
}

impl Action {
    /// Create an action.
    pub fn new(
        name: impl Into<String>,
        apply: impl Fn(&mut dyn EditorHandle, usize, usize) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            apply: Arc::new(apply),
        }
    }

    /// Run the action against `from..to`.
    pub fn apply(&self, handle: &mut dyn EditorHandle, from: usize, to: usize) {
        (self.apply)(handle, from, to);
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("name", &self.name).finish()
    }
}

type MessageRenderer = dyn Fn() -> String + Send + Sync;

/// One report.
#[derive(Clone)]
pub struct Report {
    /// Where the problem is.
    pub span: Span,
    /// How bad it is.
    pub severity: Severity,
    /// Plain-text message.
    pub message: String,
    /// Extra class for the inline mark.
    pub mark_class: Option<String>,
    /// Quick fixes.
    pub actions: Vec<Action>,
    render_message: Option<Arc<MessageRenderer>>,
}

impl Report {
    /// Create a report without actions.
    pub fn new(span: Span, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            span,
            severity,
            message: message.into(),
            mark_class: None,
            actions: Vec::new(),
            render_message: None,
        }
    }

    /// Shorthand for an [`Severity::Error`] report.
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self::new(span, Severity::Error, message)
    }

    /// Add an extra class to the inline mark.
    pub fn with_mark_class(mut self, class: impl Into<String>) -> Self {
        self.mark_class = Some(class.into());
        self
    }

    /// Attach a quick fix.
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Replace the plain message with custom rendered content.
    pub fn with_renderer(mut self, render: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.render_message = Some(Arc::new(render));
        self
    }

    /// Message content for display: the custom renderer if one is set, the message otherwise.
    pub fn rendered_message(&self) -> String {
        match &self.render_message {
            Some(render) => render(),
            None => self.message.clone(),
        }
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Report")
            .field("span", &self.span)
            .field("severity", &self.severity)
            .field("message", &self.message)
            .field("mark_class", &self.mark_class)
            .field("actions", &self.actions)
            .field("custom_render", &self.render_message.is_some())
            .finish()
    }
}

/// Narrows a report list, e.g. for markers or tooltips.
pub type ReportFilter = Arc<dyn Fn(&[Arc<Report>]) -> Vec<Arc<Report>> + Send + Sync>;

/// Filter keeping reports at or above `min`.
pub fn min_severity(min: Severity) -> ReportFilter {
    Arc::new(move |reports: &[Arc<Report>]| {
        reports
            .iter()
            .filter(|report| report.severity >= min)
            .cloned()
            .collect()
    })
}

pub(crate) fn apply_filter(
    filter: Option<&ReportFilter>,
    reports: Vec<Arc<Report>>,
) -> Vec<Arc<Report>> {
    match filter {
        Some(filter) => filter(&reports),
        None => reports,
    }
}

/// Identity set of the reports a filter lets through. `None` when there is no filter.
pub(crate) struct Visible(Option<HashSet<*const Report>>);

impl Visible {
    pub(crate) fn new(filter: Option<&ReportFilter>, reports: Vec<Arc<Report>>) -> Self {
        Self(filter.map(|filter| filter(&reports).iter().map(Arc::as_ptr).collect()))
    }

    pub(crate) fn contains(&self, report: &Arc<Report>) -> bool {
        self.0
            .as_ref()
            .is_none_or(|visible| visible.contains(&Arc::as_ptr(report)))
    }
}
