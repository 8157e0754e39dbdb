//! Evaluation failures as reported by a source evaluator.
//!
//! Failures arrive either as a JSON array or wrapped in a `{ "reports": [...] }` object, with
//! spans in UTF-8 byte offsets:
//!
//! ```json
//! [{
//!   "span": { "sourceId": "playground", "start": 0, "end": 4 },
//!   "message": "unexpected end of input",
//!   "labels": [{ "span": { "sourceId": "playground", "start": 2, "end": 3 }, "message": "operator here" }],
//!   "notes": []
//! }]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// Byte range of a failure within one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureSpan {
    /// Source the offsets refer to.
    pub source_id: String,
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl FailureSpan {
    /// Create a span.
    pub fn new(source_id: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            source_id: source_id.into(),
            start,
            end,
        }
    }
}

/// A secondary message attached to a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureLabel {
    /// Where the label points. Only the primary span is placed in the document.
    pub span: FailureSpan,
    /// Label text.
    pub message: String,
}

/// One evaluation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Primary location.
    pub span: FailureSpan,
    /// Main message.
    pub message: String,
    /// Secondary labels.
    #[serde(default)]
    pub labels: Vec<FailureLabel>,
    /// Free-form notes. Not shown.
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Failure {
    /// A failure with no labels or notes.
    pub fn new(span: FailureSpan, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Add a label.
    pub fn with_label(mut self, span: FailureSpan, message: impl Into<String>) -> Self {
        self.labels.push(FailureLabel {
            span,
            message: message.into(),
        });
        self
    }

    /// Add a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// The message shown for this failure: the main message followed by each label, separated
    /// by blank lines.
    pub fn full_message(&self) -> String {
        let mut message = self.message.clone();
        for label in &self.labels {
            message.push_str("\n\n");
            message.push_str(&label.message);
        }
        message
    }
}

/// Every failure of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureList(pub Vec<Failure>);

#[derive(Deserialize)]
#[serde(untagged)]
enum FailureListRepr {
    Bare(Vec<Failure>),
    Wrapped { reports: Vec<Failure> },
}

impl FailureList {
    /// Decode a failure list from JSON, bare or wrapped in `{ "reports": [...] }`.
    pub fn from_json(json: &str) -> Result<Self, EvalError> {
        let failures = match serde_json::from_str(json)? {
            FailureListRepr::Bare(failures) => failures,
            FailureListRepr::Wrapped { reports } => reports,
        };
        Ok(Self(failures))
    }

    /// Iterate the failures.
    pub fn iter(&self) -> std::slice::Iter<'_, Failure> {
        self.0.iter()
    }

    /// Number of failures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no failures.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Failure>> for FailureList {
    fn from(failures: Vec<Failure>) -> Self {
        Self(failures)
    }
}

impl FromIterator<Failure> for FailureList {
    fn from_iter<I: IntoIterator<Item = Failure>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FailureList {
    type Item = &'a Failure;
    type IntoIter = std::slice::Iter<'a, Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
