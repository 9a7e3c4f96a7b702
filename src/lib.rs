//! `pytc`: the core static type-checking engine for a gradually-typed
//! Python checker, split across four crates:
//!
//! - `pytc-common` — interning, spans, options, diagnostics.
//! - `pytc-solver` — the Type IR and its pure lattice algebra (subtype,
//!   join/meet, constraints, inference, argument mapping, Tuple Normal
//!   Form).
//! - `pytc-binder` — the occurrence-typing binder, narrowing, and the
//!   enclosing-scope stack.
//! - `pytc-checker` — the `TypeChecker` composition root external callers
//!   use.
//!
//! This crate re-exports `pytc-checker`'s public surface as the single
//! entry point a driver depends on.

pub use pytc_checker::*;
