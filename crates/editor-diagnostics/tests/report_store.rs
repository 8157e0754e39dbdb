use std::sync::Arc;

use editor_diagnostics::{
    ChangeSet, ChangeSpec, Document, Effect, Ingest, MALFORMED_REPORT_MESSAGE, RangeKind, Report,
    ReportState, SelectedReport, SelectionPolicy, Severity, Span, Transaction,
};
use pretty_assertions::assert_eq;

fn report(from: usize, to: usize, message: &str) -> Arc<Report> {
    Arc::new(Report::error(Span::new("main", from, to), message))
}

fn spans(state: &ReportState) -> Vec<(usize, usize)> {
    state.ranges().iter().map(|r| (r.from, r.to)).collect()
}

fn edit(doc: &mut Document, spec: ChangeSpec) -> ChangeSet {
    let changes = ChangeSet::single(doc.len_chars(), spec).unwrap();
    doc.apply(&changes).unwrap();
    changes
}

#[test]
fn test_reports_are_ordered_and_classified() {
    let doc = Document::new("main", "let a = 1\nlet b = 2\n");
    let reports = vec![
        report(14, 15, "b"),
        report(4, 5, "a"),
        report(9, 10, "line end"),
        report(0, 0, "empty"),
    ];
    let state = ReportState::new().reduce(&Transaction::set_reports(reports), &doc);

    assert_eq!(spans(&state), vec![(0, 0), (4, 5), (9, 9), (14, 15)]);
    let kinds: Vec<RangeKind> = state.ranges().iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![RangeKind::Point, RangeKind::Mark, RangeKind::Point, RangeKind::Mark]
    );
    assert_eq!(state.selected().map(|s| s.report.message.as_str()), Some("empty"));
    assert_eq!(state.version(), 1);
}

#[test]
fn test_spans_outside_document_are_dropped() {
    let doc = Document::new("main", "abc");
    let state = ReportState::new().reduce(
        &Transaction::set_reports(vec![report(1, 2, "ok"), report(2, 9, "too long")]),
        &doc,
    );
    assert_eq!(state.len(), 1);
}

#[test]
fn test_ranges_follow_edits() {
    let mut doc = Document::new("main", "foo(bar, baz)");
    let state = ReportState::new().reduce(
        &Transaction::set_reports(vec![report(4, 7, "bar"), report(9, 12, "baz")]),
        &doc,
    );

    let changes = edit(&mut doc, ChangeSpec::insert(0, "  "));
    let state = state.reduce(&Transaction::from_changes(changes), &doc);
    assert_eq!(spans(&state), vec![(6, 9), (11, 14)]);

    // Typing right at a mark's edges does not grow it.
    let changes = edit(&mut doc, ChangeSpec::insert(9, "X"));
    let state = state.reduce(&Transaction::from_changes(changes), &doc);
    assert_eq!(spans(&state), vec![(6, 9), (12, 15)]);
}

#[test]
fn test_fully_deleted_marks_are_dropped() {
    let mut doc = Document::new("main", "foo(bar, baz)");
    let state = ReportState::new().reduce(
        &Transaction::set_reports(vec![report(4, 7, "bar"), report(9, 12, "baz")]),
        &doc,
    );
    let changes = edit(&mut doc, ChangeSpec::delete(3, 8));
    let state = state.reduce(&Transaction::from_changes(changes), &doc);
    assert_eq!(spans(&state), vec![(4, 7)]);
    assert_eq!(state.ranges()[0].report.message, "baz");
}

#[test]
fn test_points_inside_deletions_are_dropped() {
    let mut doc = Document::new("main", "abcdef");
    let state = ReportState::new().reduce(
        &Transaction::set_reports(vec![report(3, 3, "point"), report(5, 5, "later")]),
        &doc,
    );
    let changes = edit(&mut doc, ChangeSpec::delete(2, 4));
    let state = state.reduce(&Transaction::from_changes(changes), &doc);
    assert_eq!(spans(&state), vec![(3, 3)]);
    assert_eq!(state.ranges()[0].report.message, "later");
}

#[test]
fn test_selection_follows_its_report_across_edits() {
    let mut doc = Document::new("main", "one two three");
    let second = report(4, 7, "two");
    let state = ReportState::new().reduce(
        &Transaction::set_reports(vec![report(0, 3, "one"), second.clone()]).with_effect(
            Effect::MoveSelection(SelectedReport {
                from: 4,
                to: 7,
                report: second.clone(),
            }),
        ),
        &doc,
    );
    assert!(state.selected().is_some_and(|s| s.is(&second)));

    let changes = edit(&mut doc, ChangeSpec::insert(0, ">> "));
    let state = state.reduce(&Transaction::from_changes(changes), &doc);
    let selected = state.selected().unwrap();
    assert!(selected.is(&second));
    assert_eq!((selected.from, selected.to), (7, 10));
    assert_eq!(selected.report.message, "two");
}

#[test]
fn test_selection_falls_back_to_next_report() {
    let mut doc = Document::new("main", "one two three");
    let second = report(4, 7, "two");
    let state = ReportState::new().reduce(
        &Transaction::set_reports(vec![
            report(0, 3, "one"),
            second.clone(),
            report(8, 13, "three"),
        ])
        .with_effect(Effect::MoveSelection(SelectedReport {
            from: 4,
            to: 7,
            report: second,
        })),
        &doc,
    );

    let changes = edit(&mut doc, ChangeSpec::delete(3, 8));
    let state = state.reduce(&Transaction::from_changes(changes), &doc);
    assert_eq!(
        state.selected().map(|s| s.report.message.as_str()),
        Some("three")
    );
    assert_eq!(state.selected().map(|s| (s.from, s.to)), Some((3, 8)));
}

#[test]
fn test_selection_is_cleared_when_nothing_follows() {
    let mut doc = Document::new("main", "one two");
    let second = report(4, 7, "two");
    let state = ReportState::new().reduce(
        &Transaction::set_reports(vec![report(0, 3, "one"), second.clone()]).with_effect(
            Effect::MoveSelection(SelectedReport {
                from: 4,
                to: 7,
                report: second,
            }),
        ),
        &doc,
    );
    let changes = edit(&mut doc, ChangeSpec::delete(4, 7));
    let state = state.reduce(&Transaction::from_changes(changes), &doc);
    assert!(state.selected().is_none());
    assert_eq!(state.len(), 1);
}

#[test]
fn test_replacement_selection_policies() {
    let doc = Document::new("main", "one two three");
    let kept = report(4, 7, "two");
    let state = ReportState::new().reduce(
        &Transaction::set_reports(vec![report(0, 3, "one"), kept.clone()]).with_effect(
            Effect::MoveSelection(SelectedReport {
                from: 4,
                to: 7,
                report: kept.clone(),
            }),
        ),
        &doc,
    );

    let replace = |policy: SelectionPolicy, reports: Vec<Arc<Report>>| {
        state.reduce(
            &Transaction::new().with_effect(Effect::SetReports {
                reports,
                selection: policy,
            }),
            &doc,
        )
    };

    let first = replace(
        SelectionPolicy::First,
        vec![report(0, 3, "uno"), kept.clone()],
    );
    assert_eq!(first.selected().map(|s| s.report.message.as_str()), Some("uno"));

    let preserved = replace(
        SelectionPolicy::Preserve(kept.clone()),
        vec![report(0, 3, "uno"), kept.clone()],
    );
    assert!(preserved.selected().is_some_and(|s| s.is(&kept)));

    let matched = replace(
        SelectionPolicy::MatchPosition,
        vec![report(0, 3, "uno"), report(4, 7, "dos")],
    );
    assert_eq!(matched.selected().map(|s| s.report.message.as_str()), Some("dos"));

    let emptied = replace(SelectionPolicy::MatchPosition, Vec::new());
    assert!(emptied.selected().is_none());
}

#[test]
fn test_panel_toggle_survives_replacement() {
    let doc = Document::new("main", "abc");
    let state = ReportState::new().reduce(
        &Transaction::new().with_effect(Effect::TogglePanel(true)),
        &doc,
    );
    let state = state.reduce(&Transaction::set_reports(vec![report(0, 1, "a")]), &doc);
    assert!(state.panel_open());
    assert_eq!(state.version(), 2);
}

#[test]
fn test_empty_transaction_keeps_version() {
    let doc = Document::new("main", "abc");
    let state = ReportState::new().reduce(&Transaction::new(), &doc);
    assert_eq!(state.version(), 0);
}

#[test]
#[should_panic(expected = "selected report is not in the store")]
fn test_selecting_foreign_report_violates_invariants() {
    let doc = Document::new("main", "abc");
    let state = ReportState::new().reduce(&Transaction::set_reports(vec![report(0, 1, "a")]), &doc);
    let foreign = report(0, 1, "a");
    state.reduce(
        &Transaction::new().with_effect(Effect::MoveSelection(SelectedReport {
            from: 0,
            to: 1,
            report: foreign,
        })),
        &doc,
    );
}

#[test]
fn test_ingest_substitutes_single_malformed_report() {
    let doc = Document::new("main", "1 + ");
    let mut ingest = Ingest::new(&doc);
    assert!(ingest.push(Report::new(Span::new("main", 0, 4), Severity::Warning, "ok")));
    assert!(!ingest.push(Report::error(Span::new("main", 3, 1), "inverted")));
    assert!(!ingest.push(Report::error(Span::new("main", 0, 40), "too long")));
    assert!(!ingest.push(Report::error(Span::new("other", 0, 1), "foreign")));
    assert_eq!(ingest.rejected(), 3);

    let reports = ingest.finish();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].message, MALFORMED_REPORT_MESSAGE);
    assert_eq!(reports[1].severity, Severity::Error);
    assert_eq!((reports[1].span.from, reports[1].span.to), (0, 0));
}
