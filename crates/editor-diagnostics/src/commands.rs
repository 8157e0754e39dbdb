//! Editor commands and their default key bindings.

use crate::state::ReportRange;

/// Commands the engine exposes to the host's keymap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticsCommand {
    /// Open the panel (if closed) and focus it.
    OpenPanel,
    /// Close the panel.
    ClosePanel,
    /// Select the next report after the editor selection, wrapping around.
    NextReport,
    /// Select the previous report before the editor selection, wrapping around.
    PreviousReport,
}

/// A key bound to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    /// Key in `Mod-Shift-x` notation, `Mod` being Ctrl or Cmd.
    pub key: &'static str,
    /// Bound command.
    pub command: DiagnosticsCommand,
    /// Whether the host should suppress the default action even when the command does nothing.
    pub prevent_default: bool,
}

/// Default bindings: `Mod-Shift-m` opens the panel, `F8` jumps to the next report.
pub fn default_keymap() -> Vec<KeyBinding> {
    vec![
        KeyBinding {
            key: "Mod-Shift-m",
            command: DiagnosticsCommand::OpenPanel,
            prevent_default: true,
        },
        KeyBinding {
            key: "F8",
            command: DiagnosticsCommand::NextReport,
            prevent_default: false,
        },
    ]
}

/// First range ordered after `selection`, wrapping to the first range. `None` when there is
/// nothing to move to.
pub fn next_range(ranges: &[ReportRange], selection: (usize, usize)) -> Option<&ReportRange> {
    ranges
        .iter()
        .find(|range| (range.from, range.to) > selection)
        .or_else(|| {
            ranges
                .first()
                .filter(|first| (first.from, first.to) != selection)
        })
}

/// Last range ordered before `selection`, wrapping to the last range. `None` when there is
/// nothing to move to.
pub fn previous_range(ranges: &[ReportRange], selection: (usize, usize)) -> Option<&ReportRange> {
    ranges
        .iter()
        .rev()
        .find(|range| (range.from, range.to) < selection)
        .or_else(|| ranges.last().filter(|last| last.from != selection.0))
}
