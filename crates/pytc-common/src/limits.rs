//! Centralized limits and thresholds for the type-checking engine.
//!
//! Recursion in this engine is driven by types, not source text, so a
//! pathological recursive type alias or a deeply nested generic instantiation
//! can otherwise blow the stack. These constants bound that recursion the
//! same way across every component instead of each one picking its own
//! number.

/// Maximum depth of `is_subtype`/`same_type` recursion through nested type
/// arguments before the engine gives up and reports `internal_error`.
pub const MAX_SUBTYPE_DEPTH: u32 = 100;

/// Maximum depth of `expand_type`/`erase_type` recursion through nested
/// composite types (unions, callables, tuples, generic instances).
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum recursion depth while generating constraints from a
/// template/actual pair (`infer_constraints`).
pub const MAX_CONSTRAINT_RECURSION_DEPTH: u32 = 100;

/// Maximum number of passes the constraint solver will take when a
/// variable's bounds mention other unsolved variables.
pub const MAX_CONSTRAINT_ITERATIONS: u32 = 100;

/// Maximum number of iterations the Tuple Normal Form combinators
/// (`combine_concat`, `combine_union`) will perform before bailing out on a
/// malformed or adversarially large tuple shape.
pub const MAX_TNF_UNWRAP_ITERATIONS: u32 = 1_000;

/// Maximum number of frame-stack `pop_frame` merges the binder will perform
/// for a single function body before it assumes a runaway loop in the driver
/// and stops refining (the function is still checked, just unrefined).
pub const MAX_FLOW_MERGE_ITERATIONS: u32 = 100_000;

/// Capacity hint for the number of distinct `Type` values interned over the
/// lifetime of a single file's checking pass.
pub const MAX_INTERNED_TYPES: usize = 500_000;

/// Inline capacity for small vectors of union/tuple members before they
/// spill to the heap. Most unions in real source have two or three members.
pub const TYPE_LIST_INLINE: usize = 4;

/// Number of supplementary notes attached to a single diagnostic before the
/// rest are summarized (e.g. "...and 2 more").
pub const UNION_MEMBER_DIAGNOSTIC_LIMIT: usize = 3;
