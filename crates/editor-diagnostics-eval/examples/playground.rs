//! Simulates a few keystrokes in a playground buffer and prints what the editor would show.
//!
//! Run with `RUST_LOG=editor_diagnostics=debug` to follow the scheduler.

use std::time::{Duration, Instant};

use editor_diagnostics::{ChangeSet, ChangeSpec, Document, RunOutcome};
use editor_diagnostics_eval::{
    EvalError, EvalSession, Failure, FailureList, FailureSpan, OutputFormat, SessionConfig,
};
use tracing_subscriber::EnvFilter;

fn evaluate(text: &str, source_id: &str, format: OutputFormat) -> Result<String, FailureList> {
    let mut total = 0i64;
    let mut offset = 0;
    for term in text.split('+') {
        let trimmed = term.trim();
        let start = offset + (term.len() - term.trim_start().len());
        match trimmed.parse::<i64>() {
            Ok(n) => total += n,
            Err(_) if trimmed.is_empty() => {
                return Err(FailureList::from(vec![Failure::new(
                    FailureSpan::new(source_id, 0, text.len()),
                    "unexpected end of input",
                )]));
            }
            Err(err) => {
                return Err(FailureList::from(vec![
                    Failure::new(
                        FailureSpan::new(source_id, start, start + trimmed.len()),
                        "not a number",
                    )
                    .with_label(FailureSpan::new(source_id, start, start), err.to_string()),
                ]));
            }
        }
        offset += term.len() + 1;
    }
    Ok(match format {
        OutputFormat::Json => format!("{{ \"value\": {total} }}"),
        OutputFormat::Yaml => format!("value: {total}"),
        OutputFormat::Toml => format!("value = {total}"),
    })
}

type Evaluator = fn(&str, &str, OutputFormat) -> Result<String, FailureList>;

/// Advance to each deadline until a run completes.
fn settle<S: FnMut(String)>(session: &mut EvalSession<Evaluator, S>, now: &mut Instant) {
    while let Some(deadline) = session.next_deadline() {
        *now = (*now).max(deadline);
        if let Some(outcome) = session.tick(*now) {
            if let RunOutcome::Applied(_) = outcome {
                print_reports(session);
            }
            return;
        }
    }
}

fn print_reports<S: FnMut(String)>(session: &EvalSession<Evaluator, S>) {
    let diagnostics = session.diagnostics();
    if diagnostics.report_count() == 0 {
        println!("  no reports");
    }
    diagnostics.for_each_report(|report, from, to| {
        println!("  {from}..{to} [{}] {}", report.severity, report.message.replace('\n', " "));
    });
    for marker in diagnostics.gutter().markers() {
        println!(
            "  gutter: line at {} -> {} ({})",
            marker.line_from(),
            marker.class(),
            diagnostics.marker_color(marker)
        );
    }
}

fn main() -> Result<(), EvalError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = SessionConfig::from_json(r#"{ "delay_ms": 500, "format": "yaml" }"#)?;
    let mut now = Instant::now();
    let evaluator: Evaluator = evaluate;
    let mut session = EvalSession::new(
        Document::new("playground", ""),
        evaluator,
        |output: String| println!("  output: {output}"),
        &config,
        now,
    );

    for key in ["1", " ", "+", " ", "x"] {
        now += Duration::from_millis(120);
        let len = session.diagnostics().document().len_chars();
        session.on_edit(ChangeSet::single(len, ChangeSpec::insert(len, key))?, now)?;
    }
    println!("typed {:?}", session.diagnostics().document().to_text());

    settle(&mut session, &mut now);

    now += Duration::from_millis(100);
    let len = session.diagnostics().document().len_chars();
    session.on_edit(ChangeSet::single(len, ChangeSpec::replace(len - 1, len, "2"))?, now)?;
    println!("typed {:?}", session.diagnostics().document().to_text());

    settle(&mut session, &mut now);

    session.set_format(OutputFormat::Toml, now);
    session.force(now);
    Ok(())
}
