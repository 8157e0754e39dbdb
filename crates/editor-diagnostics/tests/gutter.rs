use std::sync::Arc;
use std::time::{Duration, Instant};

use editor_diagnostics::{
    ChangeSet, ChangeSpec, Document, Gutter, GutterOptions, Point, Rect, Report, ReportState,
    Severity, Span, Transaction, min_severity,
};
use pretty_assertions::assert_eq;

const TEXT: &str = "let a = 1\nlet b = 2\nlet c = 3\n";

fn report(from: usize, to: usize, severity: Severity, message: &str) -> Arc<Report> {
    Arc::new(Report::new(Span::new("main", from, to), severity, message))
}

fn gutter_for(doc: &Document, reports: Vec<Arc<Report>>) -> (Gutter, ReportState) {
    let state = ReportState::new().reduce(&Transaction::set_reports(reports), doc);
    let mut gutter = Gutter::new();
    gutter.rebuild(&state, doc, None);
    (gutter, state)
}

fn lines(gutter: &Gutter) -> Vec<(usize, Severity)> {
    gutter
        .markers()
        .iter()
        .map(|m| (m.line_from(), m.severity()))
        .collect()
}

#[test]
fn test_one_marker_per_line_with_max_severity() {
    let doc = Document::new("main", TEXT);
    let (gutter, _) = gutter_for(
        &doc,
        vec![
            report(4, 5, Severity::Warning, "unused"),
            report(8, 9, Severity::Error, "bad literal"),
            report(24, 25, Severity::Hint, "hint"),
        ],
    );
    assert_eq!(lines(&gutter), vec![(0, Severity::Error), (20, Severity::Hint)]);
    assert_eq!(gutter.markers()[0].reports().len(), 2);
    assert_eq!(
        gutter.markers()[0].class(),
        "cm-diagnostic-marker cm-diagnostic-marker-error"
    );
}

#[test]
fn test_multiline_report_marks_every_line() {
    let doc = Document::new("main", TEXT);
    let (gutter, _) = gutter_for(&doc, vec![report(4, 24, Severity::Info, "spans")]);
    assert_eq!(
        lines(&gutter),
        vec![(0, Severity::Info), (10, Severity::Info), (20, Severity::Info)]
    );

    // A range ending right at a line start does not reach that line.
    let (gutter, _) = gutter_for(&doc, vec![report(4, 20, Severity::Info, "spans")]);
    assert_eq!(lines(&gutter), vec![(0, Severity::Info), (10, Severity::Info)]);
}

#[test]
fn test_marker_filter_applies() {
    let doc = Document::new("main", TEXT);
    let state = ReportState::new().reduce(
        &Transaction::set_reports(vec![
            report(0, 3, Severity::Hint, "style"),
            report(14, 15, Severity::Error, "bad"),
        ]),
        &doc,
    );
    let mut gutter = Gutter::new();
    gutter.rebuild(&state, &doc, Some(&min_severity(Severity::Warning)));
    assert_eq!(lines(&gutter), vec![(10, Severity::Error)]);
}

#[test]
fn test_markers_follow_edits_and_merge() {
    let mut doc = Document::new("main", TEXT);
    let (mut gutter, _) = gutter_for(
        &doc,
        vec![
            report(0, 3, Severity::Warning, "first"),
            report(14, 15, Severity::Error, "second"),
        ],
    );

    let before = doc.clone();
    let changes = ChangeSet::single(doc.len_chars(), ChangeSpec::insert(0, "// x\n")).unwrap();
    doc.apply(&changes).unwrap();
    gutter.map(&changes, &before, &doc);
    assert_eq!(lines(&gutter), vec![(5, Severity::Warning), (15, Severity::Error)]);

    // Joining the two lines leaves one marker carrying both reports.
    let before = doc.clone();
    let changes = ChangeSet::single(doc.len_chars(), ChangeSpec::delete(14, 15)).unwrap();
    doc.apply(&changes).unwrap();
    gutter.map(&changes, &before, &doc);
    assert_eq!(lines(&gutter), vec![(5, Severity::Error)]);
    assert_eq!(gutter.markers()[0].reports().len(), 2);
}

#[test]
fn test_markers_inside_deleted_text_are_dropped() {
    let mut doc = Document::new("main", TEXT);
    let (mut gutter, _) = gutter_for(&doc, vec![report(14, 15, Severity::Error, "bad")]);

    let before = doc.clone();
    let changes = ChangeSet::single(doc.len_chars(), ChangeSpec::delete(5, 15)).unwrap();
    doc.apply(&changes).unwrap();
    gutter.map(&changes, &before, &doc);
    assert!(gutter.markers().is_empty());
}

#[test]
fn test_hover_opens_tooltip_after_delay() {
    let doc = Document::new("main", TEXT);
    let (mut gutter, _) = gutter_for(&doc, vec![report(14, 15, Severity::Error, "bad")]);
    let options = GutterOptions::default();
    let t0 = Instant::now();

    assert!(gutter.pointer_over(10, t0, &options));
    assert!(!gutter.pointer_over(0, t0, &options));
    assert_eq!(gutter.next_deadline(), Some(t0 + Duration::from_millis(300)));

    gutter.pointer_move(10, t0 + Duration::from_millis(200), &options);
    assert!(gutter.poll(t0 + Duration::from_millis(300), &options).is_none());

    let tooltip = gutter.poll(t0 + Duration::from_millis(500), &options).unwrap();
    assert_eq!(tooltip.line_from, 10);
    assert_eq!(tooltip.reports.len(), 1);
    assert_eq!(gutter.next_deadline(), None);
}

#[test]
fn test_leaving_marker_cancels_hover() {
    let doc = Document::new("main", TEXT);
    let (mut gutter, _) = gutter_for(&doc, vec![report(14, 15, Severity::Error, "bad")]);
    let options = GutterOptions::default();
    let t0 = Instant::now();

    gutter.pointer_over(10, t0, &options);
    gutter.pointer_out(10);
    assert!(gutter.poll(t0 + Duration::from_secs(1), &options).is_none());
    assert!(gutter.tooltip().is_none());
}

#[test]
fn test_tooltip_tracks_pointer_with_margin() {
    let doc = Document::new("main", TEXT);
    let (mut gutter, _) = gutter_for(&doc, vec![report(14, 15, Severity::Error, "bad")]);
    let options = GutterOptions::default();
    let t0 = Instant::now();
    gutter.pointer_over(10, t0, &options);
    gutter.poll(t0 + options.hover_time, &options).unwrap();

    let marker = Rect::new(0.0, 20.0, 16.0, 40.0);
    assert!(!gutter.pointer_moved(Point::new(24.0, 30.0), marker, false, &options));
    assert!(!gutter.pointer_moved(Point::new(100.0, 30.0), marker, true, &options));
    assert!(gutter.tooltip().is_some());
    assert!(gutter.pointer_moved(Point::new(100.0, 30.0), marker, false, &options));
    assert!(gutter.tooltip().is_none());
}

#[test]
fn test_tooltip_closes_on_edit_to_its_line() {
    let mut doc = Document::new("main", TEXT);
    let (mut gutter, _) = gutter_for(&doc, vec![report(14, 15, Severity::Error, "bad")]);
    let options = GutterOptions::default();
    let t0 = Instant::now();
    gutter.pointer_over(10, t0, &options);
    gutter.poll(t0 + options.hover_time, &options).unwrap();

    // An edit elsewhere keeps the tooltip and moves it along.
    let before = doc.clone();
    let changes = ChangeSet::single(doc.len_chars(), ChangeSpec::insert(0, "#")).unwrap();
    doc.apply(&changes).unwrap();
    assert!(!gutter.map(&changes, &before, &doc));
    assert_eq!(gutter.tooltip().map(|t| t.line_from), Some(11));

    let before = doc.clone();
    let changes = ChangeSet::single(doc.len_chars(), ChangeSpec::insert(15, "z")).unwrap();
    doc.apply(&changes).unwrap();
    assert!(gutter.map(&changes, &before, &doc));
    assert!(gutter.tooltip().is_none());
}

#[test]
fn test_cancelling_timers_closes_everything() {
    let doc = Document::new("main", TEXT);
    let (mut gutter, _) = gutter_for(
        &doc,
        vec![
            report(4, 5, Severity::Warning, "unused"),
            report(14, 15, Severity::Error, "bad"),
        ],
    );
    let options = GutterOptions::default();
    let t0 = Instant::now();
    gutter.pointer_over(10, t0, &options);
    gutter.poll(t0 + options.hover_time, &options).unwrap();
    gutter.pointer_over(0, t0 + options.hover_time, &options);
    assert!(gutter.next_deadline().is_some());

    assert!(gutter.cancel_timers());
    assert!(gutter.tooltip().is_none());
    assert_eq!(gutter.next_deadline(), None);
    assert!(gutter.poll(t0 + Duration::from_secs(5), &options).is_none());
    assert!(!gutter.cancel_timers());
}
