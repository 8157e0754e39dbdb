//! Change sets: position mapping through document edits.
//!
//! A [`ChangeSet`] describes how one version of a document becomes the next. Positioned derived
//! state (report ranges, gutter markers, tooltip anchors) is carried across edits by mapping its
//! offsets through the change set instead of being recomputed.
//!
//! Internally a change set is a sequence of *steps*. A step is a set of non-overlapping
//! replacements, expressed in the coordinates of the document before that step and applied
//! simultaneously. A change set built from one host edit has exactly one step;
//! [`ChangeSet::compose`] appends steps, so mapping through a composed change set is the same as
//! mapping through its parts one after another.
//!
//! All offsets are character offsets (Unicode scalar values).

use ropey::Rope;
use thiserror::Error;

/// How to map a position that sits exactly on an edit boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// Stay before text inserted at the position.
    Left,
    /// Move after text inserted at the position.
    Right,
}

/// One replacement requested by the host: replace `from..to` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSpec {
    /// Start offset (inclusive) in the pre-edit document.
    pub from: usize,
    /// End offset (exclusive) in the pre-edit document.
    pub to: usize,
    /// Inserted text (may be empty).
    pub insert: String,
}

impl ChangeSpec {
    /// Insert `text` at `at`.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            from: at,
            to: at,
            insert: text.into(),
        }
    }

    /// Delete `from..to`.
    pub fn delete(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            insert: String::new(),
        }
    }

    /// Replace `from..to` with `text`.
    pub fn replace(from: usize, to: usize, text: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: text.into(),
        }
    }
}

/// Errors produced while building or applying change sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeError {
    /// A change range ends before it starts.
    #[error("invalid change range {from}..{to}")]
    InvalidRange {
        /// Start offset.
        from: usize,
        /// End offset.
        to: usize,
    },
    /// A change range reaches past the end of the document.
    #[error("change range {from}..{to} exceeds document length {len}")]
    OutOfBounds {
        /// Start offset.
        from: usize,
        /// End offset.
        to: usize,
        /// Document length in characters.
        len: usize,
    },
    /// Two ranges of one edit overlap.
    #[error("overlapping changes at offset {offset}")]
    Overlap {
        /// Offset where the second range starts.
        offset: usize,
    },
    /// The change set was built for a document of a different length.
    #[error("change set expects a document of {expected} characters, found {actual}")]
    LengthMismatch {
        /// Length the change set was built for.
        expected: usize,
        /// Length of the document it was applied to.
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Replacement {
    from: usize,
    to: usize,
    text: String,
    text_len: usize,
}

impl Replacement {
    fn deleted_len(&self) -> usize {
        self.to - self.from
    }
}

/// Result of mapping one position through one step.
enum Mapped {
    Kept(usize),
    /// The position was strictly inside replaced text; it collapses to either side of the
    /// replacement.
    Deleted { before: usize, after: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    len_before: usize,
    len_after: usize,
    replacements: Vec<Replacement>,
}

impl Step {
    fn new(len: usize, mut specs: Vec<ChangeSpec>) -> Result<Self, ChangeError> {
        for spec in &specs {
            if spec.from > spec.to {
                return Err(ChangeError::InvalidRange {
                    from: spec.from,
                    to: spec.to,
                });
            }
            if spec.to > len {
                return Err(ChangeError::OutOfBounds {
                    from: spec.from,
                    to: spec.to,
                    len,
                });
            }
        }

        // Stable: insertions at one offset keep the order they were given in.
        specs.sort_by_key(|spec| (spec.from, spec.to));

        let mut replacements: Vec<Replacement> = Vec::with_capacity(specs.len());
        let mut len_after = len;
        for spec in specs {
            if spec.from == spec.to && spec.insert.is_empty() {
                continue;
            }
            let text_len = spec.insert.chars().count();

            if let Some(prev) = replacements.last_mut() {
                if spec.from < prev.to {
                    return Err(ChangeError::Overlap { offset: spec.from });
                }
                if prev.from == prev.to && spec.from == prev.from && spec.to == spec.from {
                    prev.text.push_str(&spec.insert);
                    prev.text_len += text_len;
                    len_after += text_len;
                    continue;
                }
            }

            len_after = len_after + text_len - (spec.to - spec.from);
            replacements.push(Replacement {
                from: spec.from,
                to: spec.to,
                text: spec.insert,
                text_len,
            });
        }

        Ok(Self {
            len_before: len,
            len_after,
            replacements,
        })
    }

    fn map(&self, pos: usize, bias: Bias) -> Mapped {
        let pos = pos.min(self.len_before);
        let mut removed = 0usize;
        let mut added = 0usize;

        for r in &self.replacements {
            if pos < r.from {
                break;
            }
            if pos > r.to || (pos == r.to && r.from < r.to) {
                removed += r.deleted_len();
                added += r.text_len;
                continue;
            }

            let before = r.from - removed + added;
            let after = before + r.text_len;
            if pos > r.from {
                return Mapped::Deleted { before, after };
            }
            return Mapped::Kept(match bias {
                Bias::Left => before,
                Bias::Right => after,
            });
        }

        Mapped::Kept(pos - removed + added)
    }

    fn map_lossy(&self, pos: usize, bias: Bias) -> usize {
        match self.map(pos, bias) {
            Mapped::Kept(pos) => pos,
            Mapped::Deleted { before, after } => match bias {
                Bias::Left => before,
                Bias::Right => after,
            },
        }
    }

    fn touches(&self, from: usize, to: usize) -> bool {
        self.replacements
            .iter()
            .any(|r| r.from <= to && r.to >= from)
    }

    fn apply(&self, rope: &mut Rope) {
        for r in self.replacements.iter().rev() {
            if r.from < r.to {
                rope.remove(r.from..r.to);
            }
            if !r.text.is_empty() {
                rope.insert(r.from, &r.text);
            }
        }
    }
}

/// A document edit, usable both to update text and to remap offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    steps: Vec<Step>,
    len_before: usize,
    len_after: usize,
}

impl ChangeSet {
    /// Build a change set from simultaneous replacements on a document of `len` characters.
    ///
    /// Ranges are given in pre-edit coordinates and may arrive in any order. Insertions at the
    /// same offset are concatenated in the order given; any other overlap is an error.
    pub fn new(
        len: usize,
        specs: impl IntoIterator<Item = ChangeSpec>,
    ) -> Result<Self, ChangeError> {
        let step = Step::new(len, specs.into_iter().collect())?;
        let len_after = step.len_after;
        let steps = if step.replacements.is_empty() {
            Vec::new()
        } else {
            vec![step]
        };
        Ok(Self {
            steps,
            len_before: len,
            len_after,
        })
    }

    /// Build a change set holding a single replacement.
    pub fn single(len: usize, spec: ChangeSpec) -> Result<Self, ChangeError> {
        Self::new(len, [spec])
    }

    /// A change set that leaves a document of `len` characters untouched.
    pub fn empty(len: usize) -> Self {
        Self {
            steps: Vec::new(),
            len_before: len,
            len_after: len,
        }
    }

    /// Document length the change set applies to.
    pub fn len_before(&self) -> usize {
        self.len_before
    }

    /// Document length after the change set is applied.
    pub fn len_after(&self) -> usize {
        self.len_after
    }

    /// Returns `true` if applying this change set leaves the document unchanged.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Map `pos` through the edit.
    ///
    /// Returns `None` when `pos` lies strictly inside replaced text. Positions exactly on the
    /// boundary of an insertion or replacement are resolved by `bias`; a position at the end of
    /// deleted text always lands after whatever replaced it.
    pub fn map_pos(&self, pos: usize, bias: Bias) -> Option<usize> {
        let mut pos = pos;
        for step in &self.steps {
            pos = match step.map(pos, bias) {
                Mapped::Kept(pos) => pos,
                Mapped::Deleted { .. } => return None,
            };
        }
        Some(pos)
    }

    /// Map `pos` through the edit, clamping positions inside replaced text to the side of the
    /// replacement chosen by `bias`.
    pub fn map_pos_lossy(&self, pos: usize, bias: Bias) -> usize {
        self.steps
            .iter()
            .fold(pos, |pos, step| step.map_lossy(pos, bias))
    }

    /// Returns `true` if any replaced range touches `from..=to` (pre-edit coordinates).
    pub fn touches_range(&self, from: usize, to: usize) -> bool {
        let (mut from, mut to) = (from, to);
        for step in &self.steps {
            if step.touches(from, to) {
                return true;
            }
            from = step.map_lossy(from, Bias::Left);
            to = step.map_lossy(to, Bias::Right);
        }
        false
    }

    /// Combine `self` followed by `other` into one change set.
    ///
    /// # Panics
    ///
    /// Panics if `other` was not built for the document `self` produces.
    pub fn compose(mut self, other: ChangeSet) -> ChangeSet {
        assert_eq!(
            self.len_after, other.len_before,
            "composed change sets must be adjacent"
        );
        self.steps.extend(other.steps);
        self.len_after = other.len_after;
        self
    }

    /// Apply the edit to `rope` in place.
    pub fn apply(&self, rope: &mut Rope) -> Result<(), ChangeError> {
        if rope.len_chars() != self.len_before {
            return Err(ChangeError::LengthMismatch {
                expected: self.len_before,
                actual: rope.len_chars(),
            });
        }
        for step in &self.steps {
            step.apply(rope);
        }
        Ok(())
    }

    /// Apply the edit to `text`, returning the new text.
    pub fn apply_to_str(&self, text: &str) -> Result<String, ChangeError> {
        let mut rope = Rope::from_str(text);
        self.apply(&mut rope)?;
        Ok(rope.to_string())
    }
}
