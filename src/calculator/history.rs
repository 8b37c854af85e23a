//! Calculation history.

use serde::Serialize;

use super::evaluation::{format_display, format_value};

/// A successful calculation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// The expression as typed, before any degree conversion.
    pub expression: String,
    /// The result in its raw textual form (what went back into the buffer).
    pub result: String,
    /// The result formatted for display (with thousand separators).
    pub display_result: String,
}

impl HistoryEntry {
    /// Create an entry from an expression and the value it evaluated to.
    pub fn new(expression: impl Into<String>, value: f64) -> Self {
        Self {
            expression: expression.into(),
            result: format_value(value),
            display_result: format_display(value),
        }
    }
}

/// Append-only log of successful calculations, oldest first.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the log as a JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
