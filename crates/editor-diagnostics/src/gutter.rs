//! Gutter markers.
//!
//! One marker per line that has reports, showing the most severe of them. Hovering a marker for
//! `hover_time` opens a tooltip listing the line's reports; it stays open while the pointer is
//! over the marker (grown by `hover_margin`) or over the tooltip itself.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::change::{Bias, ChangeSet};
use crate::decorations::DiagnosticTheme;
use crate::document::Document;
use crate::geometry::{Point, Rect};
use crate::render::{RenderedReport, render_tooltip};
use crate::report::{Report, ReportFilter, Severity, Visible, apply_filter};
use crate::state::ReportState;

/// Hover time before the marker tooltip opens.
pub const DEFAULT_HOVER_TIME: Duration = Duration::from_millis(300);
/// Slack around a marker before the pointer counts as having left it.
pub const DEFAULT_HOVER_MARGIN: f32 = 10.0;

/// Class of the gutter.
pub const GUTTER_CLASS: &str = "cm-gutter-diagnostic";
/// Base class of a marker.
pub const MARKER_CLASS: &str = "cm-diagnostic-marker";

/// Gutter configuration.
#[derive(Clone)]
pub struct GutterOptions {
    /// Hover time before the tooltip opens.
    pub hover_time: Duration,
    /// Margin around the marker that keeps the tooltip open.
    pub hover_margin: f32,
    /// Narrows which reports get markers.
    pub marker_filter: Option<ReportFilter>,
    /// Narrows which reports the marker tooltip lists.
    pub tooltip_filter: Option<ReportFilter>,
}

impl Default for GutterOptions {
    fn default() -> Self {
        Self {
            hover_time: DEFAULT_HOVER_TIME,
            hover_margin: DEFAULT_HOVER_MARGIN,
            marker_filter: None,
            tooltip_filter: None,
        }
    }
}

impl fmt::Debug for GutterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GutterOptions")
            .field("hover_time", &self.hover_time)
            .field("hover_margin", &self.hover_margin)
            .field("marker_filter", &self.marker_filter.is_some())
            .field("tooltip_filter", &self.tooltip_filter.is_some())
            .finish()
    }
}

/// Marker of one line.
#[derive(Debug, Clone)]
pub struct GutterMarker {
    line_from: usize,
    severity: Severity,
    reports: Vec<Arc<Report>>,
    hover_due: Option<Instant>,
}

impl GutterMarker {
    fn new(line_from: usize, reports: Vec<Arc<Report>>) -> Self {
        let severity = max_severity(&reports);
        Self {
            line_from,
            severity,
            reports,
            hover_due: None,
        }
    }

    /// Offset of the start of the marked line.
    pub fn line_from(&self) -> usize {
        self.line_from
    }

    /// Most severe report on the line.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Reports on the line.
    pub fn reports(&self) -> &[Arc<Report>] {
        &self.reports
    }

    /// CSS classes.
    pub fn class(&self) -> String {
        format!("{MARKER_CLASS} {MARKER_CLASS}-{}", self.severity)
    }

    /// Colour of the marker under `theme`.
    pub fn color<'t>(&self, theme: &'t DiagnosticTheme) -> &'t str {
        theme.color(self.severity)
    }

    /// When the hover timer fires, if armed.
    pub fn hover_due(&self) -> Option<Instant> {
        self.hover_due
    }

    fn absorb(&mut self, other: GutterMarker) {
        self.reports.extend(other.reports);
        self.severity = self.severity.max(other.severity);
        self.hover_due = self.hover_due.or(other.hover_due);
    }
}

/// Open marker tooltip.
#[derive(Debug, Clone)]
pub struct GutterTooltip {
    /// Line the tooltip belongs to.
    pub line_from: usize,
    /// Listed reports.
    pub reports: Vec<Arc<Report>>,
}

impl GutterTooltip {
    /// Display content.
    pub fn render(&self) -> Vec<RenderedReport> {
        render_tooltip(&self.reports)
    }
}

/// Markers and the marker tooltip of one document.
#[derive(Debug, Clone, Default)]
pub struct Gutter {
    markers: Vec<GutterMarker>,
    tooltip: Option<GutterTooltip>,
}

impl Gutter {
    /// An empty gutter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Markers in line order.
    pub fn markers(&self) -> &[GutterMarker] {
        &self.markers
    }

    /// Marker of the line starting at `line_from`.
    pub fn marker(&self, line_from: usize) -> Option<&GutterMarker> {
        self.markers.iter().find(|m| m.line_from == line_from)
    }

    /// The open tooltip.
    pub fn tooltip(&self) -> Option<&GutterTooltip> {
        self.tooltip.as_ref()
    }

    /// Recompute every marker for a new report set. Hover timers are dropped and the tooltip is
    /// closed. Returns `true` if a tooltip was open.
    pub fn rebuild(
        &mut self,
        state: &ReportState,
        doc: &Document,
        filter: Option<&ReportFilter>,
    ) -> bool {
        let visible = Visible::new(filter, state.reports());
        let mut lines: BTreeMap<usize, Vec<Arc<Report>>> = BTreeMap::new();
        for range in state.ranges() {
            if !visible.contains(&range.report) {
                continue;
            }
            let first = doc.line_at(range.from).number;
            let last = if range.to > range.from {
                doc.line_at(range.to - 1).number
            } else {
                first
            };
            for line in first..=last {
                lines.entry(line).or_default().push(range.report.clone());
            }
        }

        self.markers = lines
            .into_iter()
            .map(|(line, reports)| GutterMarker::new(doc.line(line).from, reports))
            .collect();
        trace!(markers = self.markers.len(), "rebuilt gutter markers");
        self.tooltip.take().is_some()
    }

    /// Carry markers through an edit. `doc_before` and `doc_after` are the documents on either
    /// side of `changes`. Returns `true` if the tooltip was closed.
    pub fn map(
        &mut self,
        changes: &ChangeSet,
        doc_before: &Document,
        doc_after: &Document,
    ) -> bool {
        let mut mapped: Vec<GutterMarker> = Vec::with_capacity(self.markers.len());
        for mut marker in self.markers.drain(..) {
            let Some(pos) = changes.map_pos(marker.line_from, Bias::Right) else {
                trace!(line_from = marker.line_from, "gutter marker deleted");
                continue;
            };
            marker.line_from = doc_after.line_at(pos).from;
            match mapped.last_mut() {
                Some(prev) if prev.line_from == marker.line_from => prev.absorb(marker),
                _ => mapped.push(marker),
            }
        }
        self.markers = mapped;

        let Some(tooltip) = self.tooltip.as_mut() else {
            return false;
        };
        let line = doc_before.line_at(tooltip.line_from);
        if changes.touches_range(line.from, line.to) {
            self.tooltip = None;
            return true;
        }
        let pos = changes.map_pos_lossy(tooltip.line_from, Bias::Right);
        tooltip.line_from = doc_after.line_at(pos).from;
        false
    }

    /// Pointer entered the marker at `line_from`. Arms its hover timer if it has reports to
    /// show; returns whether it did.
    pub fn pointer_over(
        &mut self,
        line_from: usize,
        now: Instant,
        options: &GutterOptions,
    ) -> bool {
        let Some(marker) = self.markers.iter_mut().find(|m| m.line_from == line_from) else {
            return false;
        };
        if apply_filter(options.tooltip_filter.as_ref(), marker.reports.clone()).is_empty() {
            return false;
        }
        marker.hover_due = Some(now + options.hover_time);
        true
    }

    /// Pointer moved over the marker at `line_from`; restarts an armed hover timer.
    pub fn pointer_move(&mut self, line_from: usize, now: Instant, options: &GutterOptions) {
        if let Some(marker) = self
            .markers
            .iter_mut()
            .find(|m| m.line_from == line_from && m.hover_due.is_some())
        {
            marker.hover_due = Some(now + options.hover_time);
        }
    }

    /// Pointer left the marker at `line_from`; cancels its hover timer.
    pub fn pointer_out(&mut self, line_from: usize) {
        if let Some(marker) = self.markers.iter_mut().find(|m| m.line_from == line_from) {
            marker.hover_due = None;
        }
    }

    /// Fire due hover timers. Returns the tooltip if one opened.
    pub fn poll(&mut self, now: Instant, options: &GutterOptions) -> Option<&GutterTooltip> {
        let mut opened = None;
        for marker in &mut self.markers {
            if marker.hover_due.is_some_and(|due| due <= now) {
                marker.hover_due = None;
                let reports =
                    apply_filter(options.tooltip_filter.as_ref(), marker.reports.clone());
                if !reports.is_empty() {
                    opened = Some(GutterTooltip {
                        line_from: marker.line_from,
                        reports,
                    });
                }
            }
        }
        if opened.is_some() {
            self.tooltip = opened;
            return self.tooltip.as_ref();
        }
        None
    }

    /// Track the pointer while the tooltip is open. `marker` is the bounding box of the marker
    /// the tooltip belongs to. Returns `true` if the tooltip was closed.
    pub fn pointer_moved(
        &mut self,
        pointer: Point,
        marker: Rect,
        over_tooltip: bool,
        options: &GutterOptions,
    ) -> bool {
        if self.tooltip.is_none()
            || over_tooltip
            || marker.inflate(options.hover_margin).contains(pointer)
        {
            return false;
        }
        self.tooltip = None;
        true
    }

    /// Close the tooltip.
    pub fn dismiss_tooltip(&mut self) -> bool {
        self.tooltip.take().is_some()
    }

    /// Cancel every hover timer and close the tooltip. Returns `true` if a tooltip was open.
    pub fn cancel_timers(&mut self) -> bool {
        for marker in &mut self.markers {
            marker.hover_due = None;
        }
        trace!("gutter hover timers cancelled");
        self.tooltip.take().is_some()
    }

    /// Earliest armed hover timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.markers.iter().filter_map(|m| m.hover_due).min()
    }
}

fn max_severity(reports: &[Arc<Report>]) -> Severity {
    reports
        .iter()
        .map(|report| report.severity)
        .max()
        .unwrap_or(Severity::Hint)
}
