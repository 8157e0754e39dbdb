//! Inline hover tooltips.
//!
//! Hovering text shows every report whose range covers the hovered position, merged into one
//! tooltip spanning all of them.

use std::sync::Arc;

use crate::change::{Bias, ChangeSet};
use crate::document::Document;
use crate::render::{RenderedReport, render_tooltip};
use crate::report::{Report, ReportFilter, apply_filter};
use crate::state::ReportState;

/// Class of the tooltip container.
pub const TOOLTIP_CLASS: &str = "cm-tooltip-diagnostic";

/// Which side of the hovered position the pointer is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Pointer over the character before the position.
    Before,
    /// Pointer over the character after the position.
    After,
}

/// A hover tooltip.
#[derive(Debug, Clone)]
pub struct Tooltip {
    /// Anchor: start of the first stacked report.
    pub pos: usize,
    /// End of the furthest-reaching stacked report.
    pub end: usize,
    /// Show above the anchor (the reports run past the anchor line).
    pub above: bool,
    /// Stacked reports, in range order.
    pub reports: Vec<Arc<Report>>,
}

impl Tooltip {
    /// Display content.
    pub fn render(&self) -> Vec<RenderedReport> {
        render_tooltip(&self.reports)
    }

    /// Whether the transaction described by `changes` and `reports_replaced` hides this tooltip.
    ///
    /// `doc_before` is the document the change applies to.
    pub fn hidden_by(
        &self,
        changes: Option<&ChangeSet>,
        reports_replaced: bool,
        doc_before: &Document,
    ) -> bool {
        if reports_replaced {
            return true;
        }
        changes.is_some_and(|changes| {
            let line = doc_before.line_at(self.pos);
            changes.touches_range(line.from, line.to)
        })
    }

    /// Move the tooltip through `changes`.
    pub fn map(self, changes: &ChangeSet) -> Tooltip {
        let pos = changes.map_pos_lossy(self.pos, Bias::Right);
        Tooltip {
            pos,
            end: changes.map_pos_lossy(self.end, Bias::Left).max(pos),
            ..self
        }
    }
}

/// Tooltip for a hover at `pos` on `side`, if any report covers it.
pub fn reports_at(
    state: &ReportState,
    doc: &Document,
    pos: usize,
    side: Side,
    filter: Option<&ReportFilter>,
) -> Option<Tooltip> {
    let mut found = Vec::new();
    let mut start = usize::MAX;
    let mut end = 0;
    for range in state.ranges() {
        let (from, to) = (range.from, range.to);
        let covers = pos >= from
            && pos <= to
            && (from == to
                || ((pos > from || side == Side::After) && (pos < to || side == Side::Before)));
        if covers {
            found.push(range.report.clone());
            start = start.min(from);
            end = end.max(to);
        }
    }

    let reports = apply_filter(filter, found);
    if reports.is_empty() {
        return None;
    }
    Some(Tooltip {
        pos: start,
        end,
        above: doc.line_at(start).to < end,
        reports,
    })
}
