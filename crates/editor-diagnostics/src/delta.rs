//! Sequential text deltas.
//!
//! Some hosts describe an edit as an ordered list of operations, each expressed against the
//! document produced by the previous one, rather than as simultaneous replacements. This module
//! accepts that shape and converts it into a [`ChangeSet`] for remapping.
//!
//! Offsets are character offsets (Unicode scalar values).

use crate::change::{ChangeError, ChangeSet, ChangeSpec};

/// One operation of a sequential delta.
///
/// `start` is an offset into the document **as it is when this operation runs**, after every
/// earlier operation of the same [`TextDelta`] has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDeltaEdit {
    /// Character offset where the operation starts.
    pub start: usize,
    /// Text removed at `start`.
    pub deleted_text: String,
    /// Text inserted at `start`.
    pub inserted_text: String,
}

impl TextDeltaEdit {
    /// Character length of `deleted_text`.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    /// Exclusive end of the removed range.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.deleted_len())
    }

    fn to_spec(&self) -> ChangeSpec {
        ChangeSpec::replace(self.start, self.end(), self.inserted_text.clone())
    }
}

/// An edit described as ordered operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelta {
    /// Character count before the first operation.
    pub before_char_count: usize,
    /// Character count after the last operation.
    pub after_char_count: usize,
    /// Operations, in application order.
    pub edits: Vec<TextDeltaEdit>,
}

impl TextDelta {
    /// Returns `true` if the delta holds no operations.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Convert the delta into a change set. Each operation becomes its own step, so mapping
    /// through the result follows the operations in order.
    pub fn to_change_set(&self) -> Result<ChangeSet, ChangeError> {
        let mut changes = ChangeSet::empty(self.before_char_count);
        for edit in &self.edits {
            let step = ChangeSet::single(changes.len_after(), edit.to_spec())?;
            changes = changes.compose(step);
        }
        if changes.len_after() != self.after_char_count {
            return Err(ChangeError::LengthMismatch {
                expected: self.after_char_count,
                actual: changes.len_after(),
            });
        }
        Ok(changes)
    }
}
