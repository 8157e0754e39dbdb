//! Per-document diagnostics engine.
//!
//! [`Diagnostics`] owns everything attached to one document: the document mirror, the report
//! store, the evaluation scheduler, the panel, the gutter and the hover tooltip. The host feeds
//! it edits, pointer and key events plus the current time, and renders what it returns.
//!
//! Evaluation itself happens outside: [`Diagnostics::poll`] hands out an [`EvalRequest`] when a
//! run is due and [`Diagnostics::complete_run`] takes the resulting reports back. Results for a
//! document version that has since changed are discarded.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::change::{ChangeError, ChangeSet};
use crate::commands::{DiagnosticsCommand, next_range, previous_range};
use crate::decorations::{DiagnosticTheme, InlineDecoration, inline_decorations};
use crate::document::Document;
use crate::geometry::{Point, Rect};
use crate::gutter::{Gutter, GutterMarker, GutterOptions, GutterTooltip};
use crate::host::{EditorHandle, FocusTarget};
use crate::ingest::{Ingest, ReportBatch};
use crate::panel::{PanelKey, PanelKeyAction, PanelUpdate, PanelView};
use crate::report::{Report, ReportFilter};
use crate::scheduler::{DEFAULT_EVAL_DELAY, EvalScheduler, PendingRun, RunTicket};
use crate::state::{Effect, ReportRange, ReportState, SelectedReport, Transaction};
use crate::tooltip::{Side, Tooltip, reports_at};

/// Engine configuration.
#[derive(Clone)]
pub struct DiagnosticsOptions {
    /// Quiet period after an edit before evaluation runs.
    pub eval_delay: Duration,
    /// Narrows which reports get inline decorations.
    pub marker_filter: Option<ReportFilter>,
    /// Narrows which reports the hover tooltip lists.
    pub tooltip_filter: Option<ReportFilter>,
    /// Gutter configuration.
    pub gutter: GutterOptions,
    /// Colours.
    pub theme: DiagnosticTheme,
}

impl Default for DiagnosticsOptions {
    fn default() -> Self {
        Self {
            eval_delay: DEFAULT_EVAL_DELAY,
            marker_filter: None,
            tooltip_filter: None,
            gutter: GutterOptions::default(),
            theme: DiagnosticTheme::default(),
        }
    }
}

impl fmt::Debug for DiagnosticsOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticsOptions")
            .field("eval_delay", &self.eval_delay)
            .field("marker_filter", &self.marker_filter.is_some())
            .field("tooltip_filter", &self.tooltip_filter.is_some())
            .field("gutter", &self.gutter)
            .field("theme", &self.theme)
            .finish()
    }
}

/// Text to evaluate, handed out when a run is due.
#[derive(Debug, Clone)]
pub struct EvalRequest {
    /// Pass back to [`Diagnostics::complete_run`].
    pub ticket: RunTicket,
    /// Source being evaluated.
    pub source_id: String,
    /// Full document text at `ticket.version`.
    pub text: String,
}

/// What happened to the results of a run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The reports replaced the current set.
    Applied(ViewUpdate),
    /// The document changed while the run was in flight; the results were dropped.
    Stale {
        /// The run.
        ticket: RunTicket,
        /// Document version at completion time.
        current_version: u64,
    },
    /// The engine was detached; the results were dropped.
    Detached,
}

/// View changes the host has to render after a transaction.
#[derive(Debug, Clone, Default)]
pub struct ViewUpdate {
    /// Store version after the transaction.
    pub version: u64,
    /// The document text changed.
    pub doc_changed: bool,
    /// The report set was replaced; decorations and gutter must be redrawn.
    pub reports_replaced: bool,
    /// Panel changes, while the panel is open.
    pub panel: Option<PanelUpdate>,
    /// The panel was closed.
    pub panel_closed: bool,
    /// The hover tooltip was closed.
    pub hover_dismissed: bool,
    /// The gutter tooltip was closed.
    pub gutter_tooltip_dismissed: bool,
}

/// Diagnostics attached to one document.
#[derive(Debug)]
pub struct Diagnostics {
    doc: Document,
    state: ReportState,
    scheduler: EvalScheduler,
    panel: Option<PanelView>,
    gutter: Gutter,
    hover: Option<Tooltip>,
    options: DiagnosticsOptions,
}

impl Diagnostics {
    /// Attach to `doc` at `now`. The first evaluation becomes due after `options.eval_delay`.
    pub fn attach(doc: Document, options: DiagnosticsOptions, now: Instant) -> Self {
        debug!(source_id = doc.source_id(), "attaching diagnostics");
        Self {
            scheduler: EvalScheduler::attach(options.eval_delay, now),
            doc,
            state: ReportState::new(),
            panel: None,
            gutter: Gutter::new(),
            hover: None,
            options,
        }
    }

    /// Stop scheduling evaluations and cancel hover timers. Results of runs still in flight will
    /// be dropped.
    pub fn detach(&mut self) {
        debug!(source_id = self.doc.source_id(), "detaching diagnostics");
        self.scheduler.detach();
        self.gutter.cancel_timers();
        self.hover = None;
    }

    /// Returns `true` until [`Diagnostics::detach`].
    pub fn is_attached(&self) -> bool {
        self.scheduler.is_attached()
    }

    /// The document mirror.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The report store.
    pub fn state(&self) -> &ReportState {
        &self.state
    }

    /// The scheduler.
    pub fn scheduler(&self) -> &EvalScheduler {
        &self.scheduler
    }

    /// Current options.
    pub fn options(&self) -> &DiagnosticsOptions {
        &self.options
    }

    /// Replace the options. Counts as a change: the next evaluation is pushed back.
    pub fn set_options(&mut self, options: DiagnosticsOptions, now: Instant) {
        self.scheduler.set_delay(options.eval_delay, now);
        self.options = options;
    }

    /// Record a configuration change that affects evaluation output.
    pub fn note_config_change(&mut self, now: Instant) {
        self.scheduler.note_change(now);
    }

    /// Number of reports.
    pub fn report_count(&self) -> usize {
        self.state.len()
    }

    /// Visit every report with its current range, in range order.
    pub fn for_each_report(&self, mut f: impl FnMut(&Arc<Report>, usize, usize)) {
        for range in self.state.ranges() {
            f(&range.report, range.from, range.to);
        }
    }

    /// Build a transaction replacing the report set, dropping reports that do not fit the
    /// document.
    pub fn set_reports(&self, reports: impl IntoIterator<Item = Arc<Report>>) -> Transaction {
        let mut ingest = Ingest::new(&self.doc);
        for report in reports {
            ingest.push(report);
        }
        Transaction::set_reports(ingest.finish())
    }

    /// Apply a transaction. Fails only if its change set does not fit the document.
    pub fn dispatch(&mut self, tr: Transaction, now: Instant) -> Result<ViewUpdate, ChangeError> {
        let doc_before = match &tr.changes {
            Some(changes) if !changes.is_empty() => {
                let before = self.doc.clone();
                self.doc.apply(changes)?;
                Some(before)
            }
            _ => None,
        };
        if doc_before.is_some() {
            self.scheduler.note_change(now);
        }
        Ok(self.commit(&tr, doc_before.as_ref()))
    }

    /// Apply a host edit.
    pub fn on_edit(&mut self, changes: ChangeSet, now: Instant) -> Result<ViewUpdate, ChangeError> {
        self.dispatch(Transaction::from_changes(changes), now)
    }

    /// Fire the evaluation timer if it is due.
    pub fn poll(&mut self, now: Instant) -> Option<EvalRequest> {
        let ticket = self.scheduler.poll(now, self.doc.version())?;
        Some(self.request(ticket))
    }

    /// Start the pending evaluation now instead of waiting for the timer.
    pub fn force(&mut self, now: Instant) -> Option<EvalRequest> {
        let ticket = self.scheduler.force(now, self.doc.version())?;
        Some(self.request(ticket))
    }

    fn request(&self, ticket: RunTicket) -> EvalRequest {
        EvalRequest {
            ticket,
            source_id: self.doc.source_id().to_string(),
            text: self.doc.to_text(),
        }
    }

    /// Apply the results of a run: one batch per report source.
    pub fn complete_run(
        &mut self,
        ticket: RunTicket,
        batches: impl IntoIterator<Item = ReportBatch>,
    ) -> RunOutcome {
        if !self.scheduler.is_attached() {
            debug!(run = ticket.run, "dropping results of detached run");
            return RunOutcome::Detached;
        }
        if ticket.version != self.doc.version() {
            debug!(
                run = ticket.run,
                evaluated = ticket.version,
                current = self.doc.version(),
                "dropping stale evaluation results"
            );
            return RunOutcome::Stale {
                ticket,
                current_version: self.doc.version(),
            };
        }

        let mut ingest = Ingest::new(&self.doc);
        for batch in batches {
            ingest.extend(batch);
        }
        let tr = Transaction::set_reports(ingest.finish());
        let update = self.commit(&tr, None);
        debug!(
            run = ticket.run,
            reports = self.state.len(),
            "applied evaluation results"
        );
        RunOutcome::Applied(update)
    }

    /// Apply a fan-in once every source has resolved; hands it back otherwise.
    pub fn complete_pending(
        &mut self,
        pending: PendingRun<ReportBatch>,
    ) -> Result<RunOutcome, PendingRun<ReportBatch>> {
        let ticket = pending.ticket();
        let batches = pending.into_results()?;
        Ok(self.complete_run(ticket, batches))
    }

    /// Earliest time the host should call back: the evaluation timer or a gutter hover timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.scheduler.timer_deadline(), self.gutter.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn commit(&mut self, tr: &Transaction, doc_before: Option<&Document>) -> ViewUpdate {
        let next = self.state.reduce(tr, &self.doc);
        let reports_replaced = tr.sets_reports();
        let mut update = ViewUpdate {
            version: next.version(),
            doc_changed: doc_before.is_some(),
            reports_replaced,
            ..ViewUpdate::default()
        };

        let changes = tr.changes.as_ref().filter(|changes| !changes.is_empty());
        if let (Some(changes), Some(before)) = (changes, doc_before) {
            update.gutter_tooltip_dismissed |= self.gutter.map(changes, before, &self.doc);
        }
        if reports_replaced {
            update.gutter_tooltip_dismissed |= self.gutter.rebuild(
                &next,
                &self.doc,
                self.options.gutter.marker_filter.as_ref(),
            );
        }

        if let Some(tooltip) = self.hover.take() {
            let before = doc_before.unwrap_or(&self.doc);
            if tooltip.hidden_by(changes, reports_replaced, before) {
                update.hover_dismissed = true;
            } else {
                self.hover = Some(match changes {
                    Some(changes) => tooltip.map(changes),
                    None => tooltip,
                });
            }
        }

        match (next.panel_open(), self.panel.as_mut()) {
            (true, Some(panel)) => update.panel = Some(panel.sync(&next)),
            (true, None) => {
                let (panel, panel_update) = PanelView::open(&next);
                self.panel = Some(panel);
                update.panel = Some(panel_update);
            }
            (false, Some(_)) => {
                self.panel = None;
                update.panel_closed = true;
            }
            (false, None) => {}
        }

        self.state = next;
        update
    }

    fn apply_effect(&mut self, effect: Effect) -> ViewUpdate {
        self.commit(&Transaction::new().with_effect(effect), None)
    }

    /// Inline decorations for the current state.
    pub fn decorations(&self) -> Vec<InlineDecoration> {
        inline_decorations(
            &self.state,
            self.options.marker_filter.as_ref(),
            &self.options.theme,
        )
    }

    /// Hover over text at `pos`. Opens (or replaces) the hover tooltip when reports cover the
    /// position; closes it otherwise.
    pub fn hover(&mut self, pos: usize, side: Side) -> Option<&Tooltip> {
        self.hover = reports_at(
            &self.state,
            &self.doc,
            pos,
            side,
            self.options.tooltip_filter.as_ref(),
        );
        self.hover.as_ref()
    }

    /// The open hover tooltip.
    pub fn hover_tooltip(&self) -> Option<&Tooltip> {
        self.hover.as_ref()
    }

    /// Close the hover tooltip.
    pub fn clear_hover(&mut self) {
        self.hover = None;
    }

    /// Gutter markers and tooltip.
    pub fn gutter(&self) -> &Gutter {
        &self.gutter
    }

    /// Colour of `marker` under the configured theme.
    pub fn marker_color(&self, marker: &GutterMarker) -> &str {
        marker.color(&self.options.theme)
    }

    /// Pointer entered the gutter marker of the line starting at `line_from`.
    pub fn gutter_pointer_over(&mut self, line_from: usize, now: Instant) -> bool {
        if !self.is_attached() {
            return false;
        }
        self.gutter.pointer_over(line_from, now, &self.options.gutter)
    }

    /// Pointer moved over the gutter marker of the line starting at `line_from`.
    pub fn gutter_pointer_move(&mut self, line_from: usize, now: Instant) {
        self.gutter.pointer_move(line_from, now, &self.options.gutter);
    }

    /// Pointer left the gutter marker of the line starting at `line_from`.
    pub fn gutter_pointer_out(&mut self, line_from: usize) {
        self.gutter.pointer_out(line_from);
    }

    /// Fire due gutter hover timers. Returns the tooltip if one opened.
    pub fn poll_gutter(&mut self, now: Instant) -> Option<&GutterTooltip> {
        self.gutter.poll(now, &self.options.gutter)
    }

    /// Track the pointer while the gutter tooltip is open. Returns `true` if it closed.
    pub fn gutter_pointer_moved(
        &mut self,
        pointer: Point,
        marker: Rect,
        over_tooltip: bool,
    ) -> bool {
        self.gutter
            .pointer_moved(pointer, marker, over_tooltip, &self.options.gutter)
    }

    /// The open panel.
    pub fn panel(&self) -> Option<&PanelView> {
        self.panel.as_ref()
    }

    /// Open the panel if needed and focus it.
    pub fn open_panel(&mut self, handle: &mut dyn EditorHandle) -> Option<PanelUpdate> {
        let update = if self.state.panel_open() {
            None
        } else {
            self.apply_effect(Effect::TogglePanel(true)).panel
        };
        handle.focus(FocusTarget::Panel);
        update
    }

    /// Close the panel. Returns `false` if it was not open.
    pub fn close_panel(&mut self) -> bool {
        if !self.state.panel_open() {
            return false;
        }
        self.apply_effect(Effect::TogglePanel(false));
        true
    }

    /// Move the editor selection to the next report. Returns `false` if there is none.
    pub fn select_next(&mut self, handle: &mut dyn EditorHandle) -> bool {
        let target = next_range(self.state.ranges(), handle.selection()).cloned();
        self.move_to(target, handle)
    }

    /// Move the editor selection to the previous report. Returns `false` if there is none.
    pub fn select_previous(&mut self, handle: &mut dyn EditorHandle) -> bool {
        let target = previous_range(self.state.ranges(), handle.selection()).cloned();
        self.move_to(target, handle)
    }

    fn move_to(&mut self, target: Option<ReportRange>, handle: &mut dyn EditorHandle) -> bool {
        let Some(target) = target else {
            return false;
        };
        handle.set_selection(target.from, target.to);
        self.apply_effect(Effect::MoveSelection(SelectedReport::from(&target)));
        true
    }

    /// Run a command. Returns whether it did anything.
    pub fn execute(&mut self, command: DiagnosticsCommand, handle: &mut dyn EditorHandle) -> bool {
        trace!(?command, "executing diagnostics command");
        match command {
            DiagnosticsCommand::OpenPanel => {
                self.open_panel(handle);
                true
            }
            DiagnosticsCommand::ClosePanel => self.close_panel(),
            DiagnosticsCommand::NextReport => self.select_next(handle),
            DiagnosticsCommand::PreviousReport => self.select_previous(handle),
        }
    }

    /// Handle a key press on the panel list. Returns whether the key was consumed.
    pub fn panel_key(&mut self, key: PanelKey, handle: &mut dyn EditorHandle) -> bool {
        let Some(action) = self.panel.as_ref().and_then(|panel| panel.key_action(key)) else {
            return false;
        };
        match action {
            PanelKeyAction::Close => {
                self.close_panel();
                handle.focus(FocusTarget::Document);
            }
            PanelKeyAction::Select(index) => {
                self.panel_select(index, handle);
            }
            PanelKeyAction::FocusDocument => handle.focus(FocusTarget::Document),
            PanelKeyAction::InvokeAction { item, action } => {
                let report = self
                    .panel
                    .as_ref()
                    .and_then(|panel| panel.items().get(item))
                    .map(|item| item.report().clone());
                if let Some(report) = report {
                    self.invoke_action(&report, action, handle);
                }
            }
            PanelKeyAction::Consume => {}
        }
        true
    }

    /// Click on the panel item at `index`.
    pub fn panel_click(&mut self, index: usize, handle: &mut dyn EditorHandle) -> bool {
        self.panel_select(index, handle)
    }

    fn panel_select(&mut self, index: usize, handle: &mut dyn EditorHandle) -> bool {
        let Some(panel) = self.panel.as_ref() else {
            return false;
        };
        if panel.selected_index().is_none() {
            return false;
        }
        let Some(selection) = panel
            .items()
            .get(index)
            .and_then(|item| self.state.find(Some(item.report()), 0))
        else {
            return false;
        };
        handle.set_selection(selection.from, selection.to);
        self.apply_effect(Effect::MoveSelection(selection));
        true
    }

    /// Run action `action` of `report` against the report's current range. Returns `false` if
    /// the report is no longer in the store or has no such action.
    pub fn invoke_action(
        &self,
        report: &Arc<Report>,
        action: usize,
        handle: &mut dyn EditorHandle,
    ) -> bool {
        let Some(found) = self.state.find(Some(report), 0) else {
            return false;
        };
        let Some(action) = report.actions.get(action) else {
            return false;
        };
        debug!(action = %action.name, from = found.from, to = found.to, "invoking report action");
        action.apply(handle, found.from, found.to);
        true
    }
}
