//! An evaluator driven by a diagnostics engine.
//!
//! [`EvalSession`] owns the [`Diagnostics`] of one document together with the evaluator that
//! checks it. The host forwards edits and calls [`EvalSession::tick`] whenever
//! [`EvalSession::next_deadline`] passes; when a run is due the session evaluates the text,
//! hands a successful value to the sink and replaces the report set.

use std::time::Instant;

use editor_diagnostics::{
    ChangeSet, Diagnostics, Document, EvalRequest, ReportBatch, RunOutcome, ViewUpdate,
};
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::EvalError;
use crate::evaluator::{OutputFormat, ReportSource, SourceEvaluator};
use crate::translate::translate_failures;

/// A document, its diagnostics and the evaluator that produces them.
pub struct EvalSession<E, S>
where
    E: SourceEvaluator,
    S: FnMut(E::Value),
{
    diagnostics: Diagnostics,
    evaluator: E,
    sink: S,
    format: OutputFormat,
    sources: Vec<Box<dyn ReportSource>>,
}

impl<E, S> EvalSession<E, S>
where
    E: SourceEvaluator,
    S: FnMut(E::Value),
{
    /// Attach `evaluator` to `doc`. Successful values are passed to `sink`.
    pub fn new(doc: Document, evaluator: E, sink: S, config: &SessionConfig, now: Instant) -> Self {
        Self {
            diagnostics: Diagnostics::attach(doc, config.options(), now),
            evaluator,
            sink,
            format: config.format,
            sources: Vec::new(),
        }
    }

    /// Run `source` alongside the evaluator on every run.
    pub fn with_source(mut self, source: impl ReportSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// The engine.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The engine, for panel and pointer handling.
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Current output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Switch the output format. A different format re-schedules evaluation.
    pub fn set_format(&mut self, format: OutputFormat, now: Instant) {
        if format != self.format {
            debug!(%format, "output format changed");
            self.format = format;
            self.diagnostics.note_config_change(now);
        }
    }

    /// Apply an edit to the document.
    pub fn on_edit(&mut self, changes: ChangeSet, now: Instant) -> Result<ViewUpdate, EvalError> {
        Ok(self.diagnostics.on_edit(changes, now)?)
    }

    /// Earliest time [`EvalSession::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.diagnostics.next_deadline()
    }

    /// Evaluate if a run is due.
    pub fn tick(&mut self, now: Instant) -> Option<RunOutcome> {
        let request = self.diagnostics.poll(now)?;
        Some(self.run(request))
    }

    /// Evaluate now if anything changed since the last run.
    pub fn force(&mut self, now: Instant) -> Option<RunOutcome> {
        let request = self.diagnostics.force(now)?;
        Some(self.run(request))
    }

    fn run(&mut self, request: EvalRequest) -> RunOutcome {
        let EvalRequest {
            ticket,
            source_id,
            text,
        } = request;
        debug!(
            run = ticket.run,
            version = ticket.version,
            %source_id,
            format = %self.format,
            "evaluating"
        );

        let mut batches = Vec::with_capacity(self.sources.len() + 1);
        match self.evaluator.evaluate(&text, &source_id, self.format) {
            Ok(value) => {
                (self.sink)(value);
                batches.push(ReportBatch::empty());
            }
            Err(failures) => {
                debug!(run = ticket.run, failures = failures.len(), "evaluation failed");
                batches.push(translate_failures(self.diagnostics.document(), &failures));
            }
        }
        let doc = self.diagnostics.document();
        for source in &mut self.sources {
            batches.push(ReportBatch::from(source.reports(doc)));
        }

        self.diagnostics.complete_run(ticket, batches)
    }
}
