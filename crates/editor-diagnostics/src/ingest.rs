//! Validation of incoming report sets.

use std::sync::Arc;

use tracing::warn;

use crate::document::Document;
use crate::report::{Report, Span};

/// Message of the report substituted for malformed input.
pub const MALFORMED_REPORT_MESSAGE: &str = "malformed report from evaluator";

/// Reports produced by one source for one evaluation run.
///
/// `malformed` counts results the source could not turn into a report at all (for example an
/// offset that is not a character boundary).
#[derive(Debug, Clone, Default)]
pub struct ReportBatch {
    /// Translated reports.
    pub reports: Vec<Arc<Report>>,
    /// Results the source dropped.
    pub malformed: usize,
}

impl ReportBatch {
    /// A batch with no reports, as produced by a successful evaluation.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<Vec<Arc<Report>>> for ReportBatch {
    fn from(reports: Vec<Arc<Report>>) -> Self {
        Self {
            reports,
            malformed: 0,
        }
    }
}

impl From<Vec<Report>> for ReportBatch {
    fn from(reports: Vec<Report>) -> Self {
        reports.into_iter().map(Arc::new).collect::<Vec<_>>().into()
    }
}

/// Collects reports for one document, dropping any that cannot be placed in it.
///
/// If anything was dropped, [`Ingest::finish`] appends a single error report at the start of
/// the document so the failure stays visible.
#[derive(Debug)]
pub struct Ingest<'a> {
    doc: &'a Document,
    accepted: Vec<Arc<Report>>,
    rejected: usize,
}

impl<'a> Ingest<'a> {
    /// Start collecting reports for `doc`.
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            accepted: Vec::new(),
            rejected: 0,
        }
    }

    /// Validate and keep `report`. Returns `false` if it was dropped.
    pub fn push(&mut self, report: impl Into<Arc<Report>>) -> bool {
        let report = report.into();
        let reason = check_span(&report.span, self.doc);
        match reason {
            None => {
                self.accepted.push(report);
                true
            }
            Some(reason) => {
                warn!(
                    reason,
                    source_id = %report.span.source_id,
                    from = report.span.from,
                    to = report.span.to,
                    "dropping malformed report"
                );
                self.rejected += 1;
                false
            }
        }
    }

    /// Add every report of `batch`, counting what its source already dropped.
    pub fn extend(&mut self, batch: ReportBatch) {
        self.rejected += batch.malformed;
        for report in batch.reports {
            self.push(report);
        }
    }

    /// Number of dropped reports so far.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// The accepted reports, plus the substitute report if anything was dropped.
    pub fn finish(mut self) -> Vec<Arc<Report>> {
        if self.rejected > 0 {
            self.accepted.push(Arc::new(malformed_report(self.doc)));
        }
        self.accepted
    }
}

/// The error report standing in for dropped input.
pub fn malformed_report(doc: &Document) -> Report {
    Report::error(Span::new(doc.source_id(), 0, 0), MALFORMED_REPORT_MESSAGE)
}

fn check_span(span: &Span, doc: &Document) -> Option<&'static str> {
    if span.from > span.to {
        Some("span ends before it starts")
    } else if span.to > doc.len_chars() {
        Some("span exceeds document")
    } else if span.source_id != doc.source_id() {
        Some("span refers to another source")
    } else {
        None
    }
}
