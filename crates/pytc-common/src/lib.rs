//! Common types and utilities shared by every crate in the type-checking
//! engine.
//!
//! - String interning (`Atom`, `Interner`, `ShardedInterner`)
//! - Source spans (`Span`, `Spanned`, `SpanBuilder`, `ByteSpan`)
//! - Line/column position tracking (`LineMap`, `Position`, `Range`)
//! - Checking options (`Options`, `PythonVersion`, `TypingMode`)
//! - Structured diagnostics (`Diagnostic`, `DiagnosticSink`)
//! - Centralized recursion and capacity limits

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner, ShardedInterner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::{ByteSpan, Span, SpanBuilder, Spanned};

// Centralized limits and thresholds
pub mod limits;

// Position/Range types for line/column source locations
pub mod position;
pub use position::{LineMap, Location, Position, Range, SourceLocation};

// Checking options (the explicit `Options` bag threaded through the core)
pub mod checker_options;
pub use checker_options::{Options, PythonVersion, TypingMode};

// Structured diagnostics
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSink};
