//! Diagnostics collected while importing an incipit
//!
//! The importer never fails on malformed input; instead every anomaly is
//! logged through the `log` facade and recorded here so callers can show
//! it next to the incipit text.

use serde::{Deserialize, Serialize};

/// Severity level for diagnostic marks
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Debug,
}

/// A diagnostic mark pointing at a position in the incipit
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DiagnosticMark {
    /// Byte offset in the incipit string (0 for header-level issues)
    pub col: usize,
    /// Length of the highlight (default 1)
    pub len: usize,
    /// Severity level
    pub severity: DiagnosticSeverity,
    /// Kind identifier (e.g., "missing_duration", "empty_container_stack")
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

impl DiagnosticMark {
    /// Create a new diagnostic mark
    pub fn new(
        col: usize,
        severity: DiagnosticSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            col,
            len: 1,
            severity,
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create with custom length (for range highlights)
    pub fn with_len(mut self, len: usize) -> Self {
        self.len = len;
        self
    }
}

/// Collection of diagnostic marks for one import
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Diagnostics {
    /// All diagnostic marks, in the order they were raised
    pub marks: Vec<DiagnosticMark>,
}

impl Diagnostics {
    /// Create empty diagnostics
    pub fn new() -> Self {
        Self { marks: Vec::new() }
    }

    /// Add a mark, forwarding it to the logger
    pub fn add(&mut self, mark: DiagnosticMark) {
        match mark.severity {
            DiagnosticSeverity::Error => log::error!("{} (col {}): {}", mark.kind, mark.col, mark.message),
            DiagnosticSeverity::Warning => log::warn!("{} (col {}): {}", mark.kind, mark.col, mark.message),
            DiagnosticSeverity::Debug => log::debug!("{} (col {}): {}", mark.kind, mark.col, mark.message),
        }
        self.marks.push(mark);
    }

    pub fn error(&mut self, col: usize, kind: &str, message: impl Into<String>) {
        self.add(DiagnosticMark::new(col, DiagnosticSeverity::Error, kind, message));
    }

    pub fn warn(&mut self, col: usize, kind: &str, message: impl Into<String>) {
        self.add(DiagnosticMark::new(col, DiagnosticSeverity::Warning, kind, message));
    }

    pub fn debug(&mut self, col: usize, kind: &str, message: impl Into<String>) {
        self.add(DiagnosticMark::new(col, DiagnosticSeverity::Debug, kind, message));
    }

    /// Check if any mark of the given kind was raised
    pub fn has_kind(&self, kind: &str) -> bool {
        self.marks.iter().any(|m| m.kind == kind)
    }

    pub fn count_kind(&self, kind: &str) -> usize {
        self.marks.iter().filter(|m| m.kind == kind).count()
    }

    /// Check if there are any diagnostics
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
