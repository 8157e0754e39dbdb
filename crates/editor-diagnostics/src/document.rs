//! Document mirror.
//!
//! The engine keeps its own copy of the host document so it can answer line queries, hand text
//! to the evaluator and convert evaluator byte offsets without calling back into the host.

use ropey::{Rope, RopeSlice};

use crate::change::{ChangeError, ChangeSet};

/// A line of the document, excluding its line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// Zero-based line number.
    pub number: usize,
    /// Character offset of the first character of the line.
    pub from: usize,
    /// Character offset just before the line break (or end of document).
    pub to: usize,
}

/// Versioned text of one source.
#[derive(Debug, Clone)]
pub struct Document {
    text: Rope,
    source_id: String,
    version: u64,
}

impl Document {
    /// Create a document for `source_id` with initial `text`.
    pub fn new(source_id: impl Into<String>, text: &str) -> Self {
        Self {
            text: Rope::from_str(text),
            source_id: source_id.into(),
            version: 0,
        }
    }

    /// Identifier of the source this document holds.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Edit counter. Bumped by every non-empty change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Underlying rope.
    pub fn rope(&self) -> &Rope {
        &self.text
    }

    /// Full text as an owned string.
    pub fn to_text(&self) -> String {
        self.text.to_string()
    }

    /// Length in characters.
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    /// Number of lines. An empty document has one line.
    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    /// The line containing `offset` (clamped to the document).
    pub fn line_at(&self, offset: usize) -> Line {
        let offset = offset.min(self.len_chars());
        self.line(self.text.char_to_line(offset))
    }

    /// Line `number` (clamped to the last line).
    pub fn line(&self, number: usize) -> Line {
        let number = number.min(self.line_count().saturating_sub(1));
        let from = self.text.line_to_char(number);
        let slice = self.text.line(number);
        Line {
            number,
            from,
            to: from + slice.len_chars() - line_break_len(slice),
        }
    }

    /// Convert a UTF-8 byte offset into a character offset.
    ///
    /// Returns `None` when the offset is past the end or does not fall on a character boundary.
    pub fn byte_to_char(&self, byte: usize) -> Option<usize> {
        if byte > self.text.len_bytes() {
            return None;
        }
        let ch = self.text.byte_to_char(byte);
        (self.text.char_to_byte(ch) == byte).then_some(ch)
    }

    /// Apply `changes` and bump the version when they modify the text.
    pub fn apply(&mut self, changes: &ChangeSet) -> Result<(), ChangeError> {
        changes.apply(&mut self.text)?;
        if !changes.is_empty() {
            self.version += 1;
        }
        Ok(())
    }
}

fn line_break_len(line: RopeSlice<'_>) -> usize {
    let len = line.len_chars();
    if len == 0 {
        return 0;
    }
    match line.char(len - 1) {
        '\n' if len >= 2 && line.char(len - 2) == '\r' => 2,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}' => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeSpec;

    #[test]
    fn lines_exclude_their_break() {
        let doc = Document::new("main", "ab\r\ncd\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_at(1), Line { number: 0, from: 0, to: 2 });
        assert_eq!(doc.line_at(4), Line { number: 1, from: 4, to: 6 });
        assert_eq!(doc.line_at(7), Line { number: 2, from: 7, to: 7 });
    }

    #[test]
    fn byte_offsets_must_be_char_boundaries() {
        let doc = Document::new("main", "héllo");
        assert_eq!(doc.byte_to_char(0), Some(0));
        assert_eq!(doc.byte_to_char(3), Some(2));
        assert_eq!(doc.byte_to_char(2), None);
        assert_eq!(doc.byte_to_char(6), Some(5));
        assert_eq!(doc.byte_to_char(7), None);
    }

    #[test]
    fn version_tracks_real_edits_only() {
        let mut doc = Document::new("main", "abc");
        doc.apply(&ChangeSet::empty(3)).unwrap();
        assert_eq!(doc.version(), 0);
        doc.apply(&ChangeSet::single(3, ChangeSpec::insert(3, "d")).unwrap())
            .unwrap();
        assert_eq!(doc.version(), 1);
        assert_eq!(doc.to_text(), "abcd");
    }
}
