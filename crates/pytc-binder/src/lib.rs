//! The occurrence-typing binder and enclosing-scope stack (spec §2
//! components H, J): the mutable, per-traversal state layered on top of
//! `pytc-solver`'s pure type algebra.
//!
//! - [`key`] / [`frame`] — the `LiteralKey` fingerprint and the per-branch
//!   refinement map built from it (spec §3.3).
//! - [`state`] — [`state::BinderState`], the frame-stack proper (H).
//! - [`narrowing`] — `find_isinstance_check` and the `TypeMap` algebra it
//!   composes from (also H).
//! - [`scope`] — [`scope::Scope`], the enclosing module/class/function
//!   stack (J).
//!
//! Both components are single-traversal, non-thread-safe state (spec §5):
//! a fresh [`state::BinderState`] is built per function-body traversal,
//! and a fresh [`scope::Scope`] per file.

pub mod frame;
pub mod key;
pub mod narrowing;
pub mod scope;
pub mod state;

pub use frame::Frame;
pub use key::{KeyPart, LiteralKey};
pub use narrowing::{
    and_conditional_maps, false_only, find_isinstance_check, or_conditional_maps, partition_by_callable, true_only,
    BoolExpr, Operand, TypeMap,
};
pub use scope::{Scope, ScopeGuard};
pub use state::BinderState;
