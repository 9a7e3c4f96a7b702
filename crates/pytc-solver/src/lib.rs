//! Type IR, lattice operations (subtype/join/meet), and the constraint
//! solver that drives generic-function inference (spec §2 components
//! A–G, I–J).
//!
//! This crate is the closed algebra at the center of the engine: every
//! operation takes immutable [`TypeId`]s and a [`ctx::Ctx`] bundling the
//! interner, the read-only [`type_info::TypeInfoArena`], and the
//! [`pytc_common::Options`] bag — never a global (spec §9 "Global mutable
//! state"). Modules are organized one-per-algorithm, matching the
//! component table in spec §2:
//!
//! - [`types`] / [`intern`] / [`display`] — the Type IR, its interning
//!   arena, and canonical pretty-printing (A).
//! - [`erase`] / [`expand`] — erasure and capture-free substitution (B).
//! - [`same_type`] / [`subtype`] — structural equality and `<:` (C).
//! - [`join`] / [`meet`] — lattice bounds and the overlap test (D).
//! - [`constraints`] / [`solve`] — constraint generation and solving (E).
//! - [`inference`] — two-pass generic-call inference (F).
//! - [`argmap`] — actual-to-formal argument mapping (G).
//! - [`tnf`] — Tuple Normal Form (I).
//! - [`type_info`] — the read-only nominal-class graph this crate consumes.
//!
//! The occurrence-typing binder (component H) and the enclosing-scope
//! stack (component J) live in `pytc-binder`, since both are mutable,
//! per-traversal state layered on top of this crate's pure type algebra.

pub mod argmap;
pub mod constraints;
pub mod ctx;
pub mod display;
pub mod erase;
pub mod expand;
pub mod inference;
pub mod intern;
pub mod join;
pub mod meet;
pub mod same_type;
pub mod solve;
pub mod subtype;
pub mod tnf;
pub mod type_info;
pub mod types;

pub use argmap::{map_actuals_to_formals, ArgMapError, FormalToActual};
pub use constraints::{infer_constraints, Constraint, ConstraintOp, Direction};
pub use ctx::Ctx;
pub use display::format_type;
pub use erase::{erase_type, erase_typevars};
pub use expand::{expand_type, expand_type_by_instance, Substitution};
pub use inference::{
    apply_generic_arguments, infer_function_arguments, unify_generic_callable, InferenceDiagnostic, MetaVarSource,
};
pub use intern::TypeInterner;
pub use join::join_types;
pub use meet::{is_overlapping_types, meet_types};
pub use same_type::same_type;
pub use solve::{solve_constraints, Solution};
pub use subtype::{
    is_callable_subtype, is_subtype, is_subtype_with, map_instance_to_supertype, protocol_conformance, ParamChecker,
    ProtocolViolation,
};
pub use tnf::TupleNormalForm;
pub use type_info::{MemberInfo, TypeInfo, TypeInfoArena, TypeInfoId, TypeParamInfo, WellKnownTypeInfo};
pub use types::{
    AnyKind, CallableData, Kind, LiteralValue, TupleItem, TypeId, TypeKey, TypeVarLike, VarId, Variance,
};
