//! The seam between the engine and the host editor.

/// Where keyboard focus should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// The text area.
    Document,
    /// The report panel's list.
    Panel,
}

/// Operations the engine needs from the host editor.
///
/// Commands and report actions receive a `&mut dyn EditorHandle`; they never hold on to it.
pub trait EditorHandle {
    /// Main selection as `(from, to)` with `from <= to`.
    fn selection(&self) -> (usize, usize);

    /// Select `anchor..head` and scroll it into view.
    fn set_selection(&mut self, anchor: usize, head: usize);

    /// Move keyboard focus.
    fn focus(&mut self, target: FocusTarget);

    /// Replace `from..to` with `text`.
    ///
    /// The host is expected to feed the resulting change back through
    /// [`crate::Diagnostics::on_edit`] like any other edit.
    fn replace(&mut self, from: usize, to: usize, text: &str);
}
