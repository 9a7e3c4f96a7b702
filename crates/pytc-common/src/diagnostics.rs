//! Structured diagnostic records produced by the core.
//!
//! The core never raises for a user-facing type error (see spec §7): it
//! returns a best-effort type and emits one of these records. Identical
//! records from the same site within the same file are deduplicated by
//! `(file, line, column, code, message)`.

pub mod data;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_messages {
    pub use super::data::diagnostic_messages::*;
}

pub mod diagnostic_codes {
    pub use super::data::diagnostic_codes::*;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRelatedInformation {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message_text: String,
}

/// One structured diagnostic record, as produced by the core and handed to
/// an external error sink (spec §6: "There is no wire protocol; diagnostics
/// are structured records `(file, line, column, severity, code, message)`").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message_text: String,
    /// Up to `UNION_MEMBER_DIAGNOSTIC_LIMIT` supplementary notes, e.g.
    /// "Consider using 'Sequence' instead".
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    pub fn error(
        file: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            message_text: message.into(),
            code,
            file: file.into(),
            line,
            column,
            related_information: Vec::new(),
        }
    }

    /// An `internal_error` diagnostic: an invariant the core itself should
    /// maintain was violated (e.g. an unexpected IR variant survived
    /// normalisation). Never raised from user input.
    pub fn internal_error(file: impl Into<String>, line: u32, column: u32, what: &str) -> Self {
        Self::error(
            file,
            line,
            column,
            format!("internal error: {what}"),
            diagnostic_codes::INTERNAL_ERROR,
        )
    }

    pub fn with_related(
        mut self,
        file: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        if self.related_information.len() < crate::limits::UNION_MEMBER_DIAGNOSTIC_LIMIT {
            self.related_information.push(DiagnosticRelatedInformation {
                category: DiagnosticCategory::Message,
                code: 0,
                file: file.into(),
                line,
                column,
                message_text: message.into(),
            });
        }
        self
    }

    /// The `(file, line, column, code, message)` key diagnostics are
    /// deduplicated on within a file.
    pub fn dedup_key(&self) -> (String, u32, u32, u32, String) {
        (
            self.file.clone(),
            self.line,
            self.column,
            self.code,
            self.message_text.clone(),
        )
    }
}

pub fn get_message_template(code: u32) -> Option<&'static str> {
    use self::data::DIAGNOSTIC_MESSAGES;
    DIAGNOSTIC_MESSAGES
        .iter()
        .find(|m| m.code == code)
        .map(|m| m.message)
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A deduplicating sink for diagnostics emitted while checking one file.
/// The "single writer" resource described in spec §5.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    seen: rustc_hash::FxHashSet<(String, u32, u32, u32, String)>,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic, dropping it silently if an identical one (by
    /// dedup key) was already recorded for this file.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.seen.insert(diagnostic.dedup_key()) {
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_dedups_identical_site_and_message() {
        let mut sink = DiagnosticSink::new();
        sink.push(Diagnostic::error("a.py", 1, 0, "bad", 1001));
        sink.push(Diagnostic::error("a.py", 1, 0, "bad", 1001));
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn sink_keeps_distinct_sites() {
        let mut sink = DiagnosticSink::new();
        sink.push(Diagnostic::error("a.py", 1, 0, "bad", 1001));
        sink.push(Diagnostic::error("a.py", 2, 0, "bad", 1001));
        assert_eq!(sink.diagnostics().len(), 2);
    }

    #[test]
    fn related_information_is_capped() {
        let mut diag = Diagnostic::error("a.py", 1, 0, "bad", 1001);
        for i in 0..10 {
            diag = diag.with_related("a.py", i, 0, "note");
        }
        assert_eq!(
            diag.related_information.len(),
            crate::limits::UNION_MEMBER_DIAGNOSTIC_LIMIT
        );
    }
}
