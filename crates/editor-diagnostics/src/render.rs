//! Rendered report content, shared by the panel and both tooltips.

use std::sync::Arc;

use crate::access_keys::assign_access_keys;
use crate::report::Report;

/// Class of a rendered report.
pub const REPORT_CLASS: &str = "cm-report";
/// Class of the message text.
pub const TEXT_CLASS: &str = "cm-reportText";
/// Class of an action button.
pub const ACTION_CLASS: &str = "cm-reportAction";
/// Class of the source label.
pub const SOURCE_CLASS: &str = "cm-reportSource";

/// One action button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAction {
    /// Button label.
    pub name: String,
    /// Access key, when one was assigned and the report is shown in the panel.
    pub access_key: Option<char>,
    /// Character index of the access key in `name`, for underlining.
    pub key_index: Option<usize>,
    /// Accessible label suffix.
    pub aria_label: String,
}

/// Display content of one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// CSS classes.
    pub class: String,
    /// Message text.
    pub text: String,
    /// Action buttons.
    pub actions: Vec<RenderedAction>,
    /// Source label.
    pub source_id: Option<String>,
}

/// Render `report`. Access keys are only shown inside the panel.
pub fn render_report(report: &Report, in_panel: bool) -> RenderedReport {
    let keys = if in_panel {
        assign_access_keys(&report.actions)
    } else {
        vec![None; report.actions.len()]
    };

    let actions = report
        .actions
        .iter()
        .zip(keys)
        .map(|(action, key)| {
            let key_index = key.and_then(|key| action.name.chars().position(|c| c == key));
            let hint = key
                .map(|key| format!(" (access key \"{key}\")"))
                .unwrap_or_default();
            RenderedAction {
                name: action.name.clone(),
                access_key: key,
                key_index,
                aria_label: format!(" Action: {}{hint}.", action.name),
            }
        })
        .collect();

    RenderedReport {
        class: format!("{REPORT_CLASS} {REPORT_CLASS}-{}", report.severity),
        text: report.rendered_message(),
        actions,
        source_id: Some(report.span.source_id.clone()).filter(|id| !id.is_empty()),
    }
}

/// Render reports for a tooltip.
pub fn render_tooltip(reports: &[Arc<Report>]) -> Vec<RenderedReport> {
    reports.iter().map(|report| render_report(report, false)).collect()
}
