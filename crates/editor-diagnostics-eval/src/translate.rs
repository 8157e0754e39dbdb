//! Translation of evaluation failures into reports.

use std::sync::Arc;

use editor_diagnostics::{Document, Report, ReportBatch, Severity, Span};
use tracing::warn;

use crate::failure::{Failure, FailureList};

/// Turn `failures` into error reports placed in `doc`.
///
/// Byte offsets are converted to character offsets. A failure whose offsets do not land on
/// character boundaries within the document, or whose span is inverted, is counted as malformed
/// instead of being placed.
pub fn translate_failures(doc: &Document, failures: &FailureList) -> ReportBatch {
    let mut batch = ReportBatch::empty();
    for failure in failures {
        match translate(doc, failure) {
            Some(report) => batch.reports.push(Arc::new(report)),
            None => {
                warn!(
                    source_id = %failure.span.source_id,
                    start = failure.span.start,
                    end = failure.span.end,
                    "failure span does not fit the document"
                );
                batch.malformed += 1;
            }
        }
    }
    batch
}

fn translate(doc: &Document, failure: &Failure) -> Option<Report> {
    let span = &failure.span;
    if span.start > span.end {
        return None;
    }
    let from = doc.byte_to_char(span.start)?;
    let to = doc.byte_to_char(span.end)?;
    Some(Report::new(
        Span::new(span.source_id.clone(), from, to),
        Severity::Error,
        failure.full_message(),
    ))
}
