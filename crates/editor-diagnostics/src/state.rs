//! Report Store
//!
//! Holds the current report set of one document as positioned ranges, plus the selected report
//! and whether the panel is open.
//!
//! # Overview
//!
//! The store is a value: [`ReportState::reduce`] takes a [`Transaction`] (an optional document
//! change plus effects) and returns the next state. It supports:
//!
//! - **Remapping**: ranges follow document edits without re-evaluation
//! - **Replacement**: a [`Effect::SetReports`] swaps the whole set in one step
//! - **Selection continuity**: the selected report survives edits and, optionally, replacements
//! - **Version Tracking**: every reduction that does something bumps the version
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use editor_diagnostics::{Document, Report, ReportState, Span, Transaction};
//!
//! let doc = Document::new("main", "1 + ");
//! let report = Arc::new(Report::error(Span::new("main", 0, 4), "unexpected end"));
//!
//! let state = ReportState::new().reduce(&Transaction::set_reports(vec![report]), &doc);
//! assert_eq!(state.len(), 1);
//! assert_eq!(state.selected().map(|s| (s.from, s.to)), Some((0, 4)));
//! ```

use std::sync::Arc;

use tracing::{trace, warn};

use crate::change::{Bias, ChangeSet};
use crate::document::Document;
use crate::report::Report;

/// How a report occupies the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// A highlighted run of text.
    Mark,
    /// A zero-width marker (empty span, or a span covering only a line break).
    Point,
}

/// A report placed in the current document.
#[derive(Debug, Clone)]
pub struct ReportRange {
    /// Current start offset.
    pub from: usize,
    /// Current end offset. Equal to `from` for points.
    pub to: usize,
    /// Mark or point.
    pub kind: RangeKind,
    /// The report.
    pub report: Arc<Report>,
}

/// The report the panel and navigation consider current.
#[derive(Debug, Clone)]
pub struct SelectedReport {
    /// Current start offset.
    pub from: usize,
    /// Current end offset.
    pub to: usize,
    /// The report.
    pub report: Arc<Report>,
}

impl SelectedReport {
    /// Returns `true` if this selection refers to `report`.
    pub fn is(&self, report: &Arc<Report>) -> bool {
        Arc::ptr_eq(&self.report, report)
    }
}

impl From<&ReportRange> for SelectedReport {
    fn from(range: &ReportRange) -> Self {
        Self {
            from: range.from,
            to: range.to,
            report: range.report.clone(),
        }
    }
}

/// Which report becomes selected when the report set is replaced.
#[derive(Debug, Clone, Default)]
pub enum SelectionPolicy {
    /// The first report of the new set.
    #[default]
    First,
    /// The given report if it is part of the new set, the first report otherwise.
    Preserve(Arc<Report>),
    /// The new report at the previous selection's position, the next one after it, or the first.
    MatchPosition,
}

/// Store effects carried by a transaction.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Replace the whole report set.
    SetReports {
        /// New reports, in any order.
        reports: Vec<Arc<Report>>,
        /// How to pick the selected report.
        selection: SelectionPolicy,
    },
    /// Open (`true`) or close (`false`) the panel.
    TogglePanel(bool),
    /// Select a report that is part of the current set.
    MoveSelection(SelectedReport),
}

/// An optional document change plus store effects, applied atomically.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    /// Document change, applied before the effects.
    pub changes: Option<ChangeSet>,
    /// Effects, applied in order.
    pub effects: Vec<Effect>,
}

impl Transaction {
    /// An empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transaction carrying only a document change.
    pub fn from_changes(changes: ChangeSet) -> Self {
        Self {
            changes: Some(changes),
            effects: Vec::new(),
        }
    }

    /// A transaction replacing the report set, selecting the first report.
    pub fn set_reports(reports: Vec<Arc<Report>>) -> Self {
        Self::new().with_effect(Effect::SetReports {
            reports,
            selection: SelectionPolicy::First,
        })
    }

    /// Append an effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Returns `true` if the transaction modifies the document.
    pub fn doc_changed(&self) -> bool {
        self.changes.as_ref().is_some_and(|changes| !changes.is_empty())
    }

    /// Returns `true` if the transaction replaces the report set.
    pub fn sets_reports(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect, Effect::SetReports { .. }))
    }
}

/// Report store state.
#[derive(Debug, Clone, Default)]
pub struct ReportState {
    ranges: Vec<ReportRange>,
    selected: Option<SelectedReport>,
    panel_open: bool,
    version: u64,
}

impl ReportState {
    /// An empty store with the panel closed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranges in ascending `(from, to)` order.
    pub fn ranges(&self) -> &[ReportRange] {
        &self.ranges
    }

    /// Reports in range order.
    pub fn reports(&self) -> Vec<Arc<Report>> {
        self.ranges.iter().map(|range| range.report.clone()).collect()
    }

    /// The selected report.
    pub fn selected(&self) -> Option<&SelectedReport> {
        self.selected.as_ref()
    }

    /// Whether the panel is open.
    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    /// Incremented by every reduction that changes something.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of reports.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns `true` if there are no reports.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// First range starting at or after `after`, restricted to `report` when given.
    pub fn find(&self, report: Option<&Arc<Report>>, after: usize) -> Option<SelectedReport> {
        find_in(&self.ranges, report, after)
    }

    /// Apply `tr` on top of this state. `doc` is the document **after** `tr.changes`.
    pub fn reduce(&self, tr: &Transaction, doc: &Document) -> ReportState {
        let mut next = match &tr.changes {
            Some(changes) if !changes.is_empty() => self.map(changes),
            _ => self.clone(),
        };

        for effect in &tr.effects {
            match effect {
                Effect::SetReports { reports, selection } => {
                    next = next.replace(reports, selection, doc);
                }
                Effect::TogglePanel(open) => next.panel_open = *open,
                Effect::MoveSelection(selected) => next.selected = Some(selected.clone()),
            }
        }

        if tr.doc_changed() || !tr.effects.is_empty() {
            next.version = self.version + 1;
        }
        next.assert_invariants(doc.len_chars());
        next
    }

    fn map(&self, changes: &ChangeSet) -> ReportState {
        let mut ranges = Vec::with_capacity(self.ranges.len());
        for range in &self.ranges {
            match range.kind {
                RangeKind::Point => {
                    if let Some(at) = changes.map_pos(range.from, Bias::Left) {
                        ranges.push(ReportRange {
                            from: at,
                            to: at,
                            ..range.clone()
                        });
                    }
                }
                RangeKind::Mark => {
                    let from = changes.map_pos_lossy(range.from, Bias::Right);
                    let to = changes.map_pos_lossy(range.to, Bias::Left);
                    if from < to {
                        ranges.push(ReportRange {
                            from,
                            to,
                            ..range.clone()
                        });
                    }
                }
            }
        }
        ranges.sort_by_key(|range| (range.from, range.to));

        let selected = self.selected.as_ref().and_then(|old| {
            let pos = changes.map_pos_lossy(old.from, Bias::Right);
            find_in(&ranges, Some(&old.report), 0).or_else(|| find_in(&ranges, None, pos))
        });

        trace!(
            before = self.ranges.len(),
            after = ranges.len(),
            "remapped report ranges"
        );

        ReportState {
            ranges,
            selected,
            panel_open: self.panel_open,
            version: self.version,
        }
    }

    fn replace(
        &self,
        reports: &[Arc<Report>],
        selection: &SelectionPolicy,
        doc: &Document,
    ) -> ReportState {
        let ranges = place(reports, doc);
        let selected = match selection {
            SelectionPolicy::First => find_in(&ranges, None, 0),
            SelectionPolicy::Preserve(report) => {
                find_in(&ranges, Some(report), 0).or_else(|| find_in(&ranges, None, 0))
            }
            SelectionPolicy::MatchPosition => self
                .selected
                .as_ref()
                .and_then(|old| {
                    ranges
                        .iter()
                        .find(|range| range.from == old.from && range.to == old.to)
                        .map(SelectedReport::from)
                        .or_else(|| find_in(&ranges, None, old.from))
                })
                .or_else(|| find_in(&ranges, None, 0)),
        };

        ReportState {
            ranges,
            selected,
            panel_open: self.panel_open,
            version: self.version,
        }
    }

    /// Check the store invariants against a document of `doc_len` characters.
    ///
    /// # Panics
    ///
    /// Panics if ranges are unordered or out of bounds, a point has width, or the selected
    /// report is not part of the set.
    pub fn assert_invariants(&self, doc_len: usize) {
        assert!(
            self.ranges
                .windows(2)
                .all(|w| (w[0].from, w[0].to) <= (w[1].from, w[1].to)),
            "report ranges out of order"
        );
        for range in &self.ranges {
            assert!(
                range.from <= range.to && range.to <= doc_len,
                "report range {}..{} outside document of length {doc_len}",
                range.from,
                range.to
            );
            if range.kind == RangeKind::Point {
                assert_eq!(range.from, range.to, "point report with width");
            }
        }
        if let Some(selected) = &self.selected {
            assert!(
                self.ranges
                    .iter()
                    .any(|range| Arc::ptr_eq(&range.report, &selected.report)),
                "selected report is not in the store"
            );
        }
    }
}

fn place(reports: &[Arc<Report>], doc: &Document) -> Vec<ReportRange> {
    let len = doc.len_chars();
    let mut ranges = Vec::with_capacity(reports.len());
    for report in reports {
        let (from, to) = (report.span.from, report.span.to);
        if from > to || to > len {
            warn!(from, to, len, "report span outside document");
            continue;
        }
        let point = from == to || (from + 1 == to && doc.line_at(from).to == from);
        ranges.push(ReportRange {
            from,
            to: if point { from } else { to },
            kind: if point { RangeKind::Point } else { RangeKind::Mark },
            report: report.clone(),
        });
    }
    ranges.sort_by_key(|range| (range.from, range.to));
    ranges
}

fn find_in(
    ranges: &[ReportRange],
    report: Option<&Arc<Report>>,
    after: usize,
) -> Option<SelectedReport> {
    ranges
        .iter()
        .find(|range| {
            range.from >= after && report.is_none_or(|report| Arc::ptr_eq(&range.report, report))
        })
        .map(SelectedReport::from)
}
