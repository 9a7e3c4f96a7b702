//! `find_isinstance_check` and the `TypeMap` algebra it builds on (spec
//! §4.H "Narrowing").
//!
//! Grounded on mypy's `checker.py` `find_isinstance_check` /
//! `conditional_type_map` / `and_conditional_maps` / `or_conditional_maps`
//! / `partition_by_callable`. The AST itself is out of scope for this
//! crate (spec §1), so where mypy pattern-matches on a real `Expression`
//! node, [`BoolExpr`] instead takes an already-classified shape: a caller
//! upstream (the expression checker) identifies "this is an `isinstance`
//! call", "this is an `is None` comparison", etc. and hands down the
//! already-resolved pieces (the tested expression's [`LiteralKey`] and
//! current type, the target type).
//!
//! `true_only`/`false_only` are a deliberate approximation of mypy's
//! truthiness narrowing: without a full `TypeInfo` query for truthiness
//! metadata (`__bool__`/`__len__` presence), this module only narrows the
//! shapes it can decide outright — `Literal[True]`/`Literal[False]` and
//! unions containing them — and leaves every other member unchanged.

use crate::frame::Frame;
use crate::key::LiteralKey;
use pytc_solver::{
    is_overlapping_types, is_subtype, join_types, meet_types, same_type, Ctx, LiteralValue, TypeId, TypeInterner, TypeKey,
};

/// `None` means the branch this map belongs to is unreachable.
pub type TypeMap = Option<Frame>;

/// An already-resolved operand of a narrowing test: its literal key (if
/// it has one worth tracking) and its statically-known type before the
/// test runs.
#[derive(Clone, Debug)]
pub struct Operand {
    pub key: Option<LiteralKey>,
    pub ty: TypeId,
}

/// A boolean expression in the shape `find_isinstance_check` knows how to
/// narrow on (spec §4.H bullet list).
#[derive(Clone, Debug)]
pub enum BoolExpr {
    IsInstance { operand: Operand, target: TypeId },
    IsSubclass { operand: Operand, target: TypeId },
    Callable { operand: Operand },
    IsNone { operand: Operand, negated: bool },
    Eq { operand: Operand, other: TypeId },
    In { operand: Operand, element: TypeId },
    And(Box<BoolExpr>, Box<BoolExpr>),
    Or(Box<BoolExpr>, Box<BoolExpr>),
    Not(Box<BoolExpr>),
    Truthy(Operand),
}

/// `restrict_subtype_away(t, away)`: the part of `t` known not to overlap
/// `away` — removes matching union members, or collapses to `Uninhabited`
/// if `t` itself is entirely within `away`.
fn restrict_subtype_away(ctx: &mut Ctx, ty: TypeId, away: TypeId) -> TypeId {
    if is_subtype(ctx, ty, away) {
        return TypeId::UNINHABITED;
    }
    if let TypeKey::Union(members) = ctx.interner.resolve(ty).clone() {
        let kept: Vec<TypeId> = members.into_iter().filter(|&m| !is_subtype(ctx, m, away)).collect();
        return TypeInterner::union_absorbed(ctx, kept);
    }
    ty
}

fn single(key: LiteralKey, ty: TypeId) -> Frame {
    let mut frame = Frame::default();
    frame.insert(key, ty);
    frame
}

/// `conditional_type_map(operand, proposed)`: splits `operand`'s current
/// type into the part consistent with `proposed` (the `if` branch) and
/// the part known not to be (the `else` branch).
fn conditional_type_map(ctx: &mut Ctx, operand: &Operand, proposed: TypeId) -> (TypeMap, TypeMap) {
    let Some(key) = &operand.key else {
        return (Some(Frame::default()), Some(Frame::default()));
    };
    if is_subtype(ctx, operand.ty, proposed) {
        return (Some(Frame::default()), None);
    }
    if !is_overlapping_types(ctx, operand.ty, proposed, false) {
        return (None, Some(Frame::default()));
    }
    let remaining = restrict_subtype_away(ctx, operand.ty, proposed);
    let if_map = Some(single(key.clone(), proposed));
    let else_map = if remaining.is_uninhabited() { None } else { Some(single(key.clone(), remaining)) };
    (if_map, else_map)
}

/// Both constraints must hold: union the two maps' keys, taking the
/// **meet** (more specific type) where they disagree.
#[must_use]
pub fn and_conditional_maps(ctx: &mut Ctx, a: TypeMap, b: TypeMap) -> TypeMap {
    let (a, b) = (a?, b?);
    let mut out = a;
    for (k, v) in b {
        match out.get(&k).copied() {
            Some(existing) => {
                out.insert(k, meet_types(ctx, existing, v));
            }
            None => {
                out.insert(k, v);
            }
        }
    }
    Some(out)
}

/// Either constraint may hold: only keys narrowed in *both* maps carry
/// over, joined, since a key narrowed in only one branch might not have
/// been narrowed at all.
#[must_use]
pub fn or_conditional_maps(ctx: &mut Ctx, a: TypeMap, b: TypeMap) -> TypeMap {
    match (a, b) {
        (None, None) => None,
        (None, Some(m)) | (Some(m), None) => Some(m),
        (Some(a), Some(b)) => {
            let mut out = Frame::default();
            for (k, &v) in &a {
                if let Some(&bv) = b.get(k) {
                    out.insert(k.clone(), join_types(ctx, v, bv));
                }
            }
            Some(out)
        }
    }
}

fn swap(maps: (TypeMap, TypeMap)) -> (TypeMap, TypeMap) {
    (maps.1, maps.0)
}

/// Splits a type into its callable and non-callable parts. Approximates
/// member lookup (no access to a `TypeInfoArena` class's `__call__` here)
/// by treating `Callable`, `Overloaded`, and `TypeType` shapes as callable
/// and every other concrete shape as not; `Any` is left in both halves.
#[must_use]
pub fn partition_by_callable(ctx: &mut Ctx, ty: TypeId) -> (TypeId, TypeId) {
    if ty.is_any() {
        return (ty, ty);
    }
    if let TypeKey::Union(members) = ctx.interner.resolve(ty).clone() {
        let mut callable = Vec::new();
        let mut uncallable = Vec::new();
        for m in members {
            let (c, u) = partition_by_callable(ctx, m);
            if !c.is_uninhabited() {
                callable.push(c);
            }
            if !u.is_uninhabited() {
                uncallable.push(u);
            }
        }
        return (TypeInterner::union_absorbed(ctx, callable), TypeInterner::union_absorbed(ctx, uncallable));
    }
    match ctx.interner.resolve(ty) {
        TypeKey::Callable(_) | TypeKey::Overloaded(_) | TypeKey::TypeType(_) => (ty, TypeId::UNINHABITED),
        _ => (TypeId::UNINHABITED, ty),
    }
}

/// Narrows away `Literal[False]` (and, recursively, any union member that
/// reduces to it) — the part of `ty` consistent with the expression
/// having been truthy.
#[must_use]
pub fn true_only(ctx: &mut Ctx, ty: TypeId) -> TypeId {
    match ctx.interner.resolve(ty).clone() {
        TypeKey::Literal { value: LiteralValue::Bool(false), .. } => TypeId::UNINHABITED,
        TypeKey::Union(members) => {
            let kept: Vec<TypeId> = members.into_iter().map(|m| true_only(ctx, m)).filter(|m| !m.is_uninhabited()).collect();
            TypeInterner::union_absorbed(ctx, kept)
        }
        _ => ty,
    }
}

/// Dual of [`true_only`]: the part of `ty` consistent with falsiness.
#[must_use]
pub fn false_only(ctx: &mut Ctx, ty: TypeId) -> TypeId {
    match ctx.interner.resolve(ty).clone() {
        TypeKey::Literal { value: LiteralValue::Bool(true), .. } => TypeId::UNINHABITED,
        TypeKey::Union(members) => {
            let kept: Vec<TypeId> = members.into_iter().map(|m| false_only(ctx, m)).filter(|m| !m.is_uninhabited()).collect();
            TypeInterner::union_absorbed(ctx, kept)
        }
        _ => ty,
    }
}

fn is_none_check(ctx: &mut Ctx, operand: &Operand, negated: bool) -> (TypeMap, TypeMap) {
    if !ctx.options.strict_optional {
        return (Some(Frame::default()), Some(Frame::default()));
    }
    let Some(key) = &operand.key else {
        return (Some(Frame::default()), Some(Frame::default()));
    };
    let without_none = restrict_subtype_away(ctx, operand.ty, TypeId::NONE);
    let is_map = if is_overlapping_types(ctx, operand.ty, TypeId::NONE, false) {
        Some(single(key.clone(), TypeId::NONE))
    } else {
        None
    };
    let is_not_map = if without_none.is_uninhabited() { None } else { Some(single(key.clone(), without_none)) };
    if negated { (is_not_map, is_map) } else { (is_map, is_not_map) }
}

fn eq_check(ctx: &mut Ctx, operand: &Operand, other: TypeId) -> (TypeMap, TypeMap) {
    if same_type(ctx.interner, other, TypeId::NONE) {
        return is_none_check(ctx, operand, false);
    }
    if !ctx.options.strict_optional || !is_overlapping_types(ctx, operand.ty, TypeId::NONE, false) {
        return (Some(Frame::default()), Some(Frame::default()));
    }
    let Some(key) = &operand.key else {
        return (Some(Frame::default()), Some(Frame::default()));
    };
    // `other` cannot itself be `None` here (handled above), so equality
    // holding rules out `None` on the `if` branch; the `else` branch
    // carries no extra information.
    let without_none = restrict_subtype_away(ctx, operand.ty, TypeId::NONE);
    let if_map = if without_none.is_uninhabited() { None } else { Some(single(key.clone(), without_none)) };
    (if_map, Some(Frame::default()))
}

fn in_check(ctx: &mut Ctx, operand: &Operand, element: TypeId) -> (TypeMap, TypeMap) {
    if !ctx.options.strict_optional || !is_overlapping_types(ctx, element, TypeId::NONE, false) {
        return (Some(Frame::default()), Some(Frame::default()));
    }
    let Some(key) = &operand.key else {
        return (Some(Frame::default()), Some(Frame::default()));
    };
    let without_none = restrict_subtype_away(ctx, operand.ty, TypeId::NONE);
    let if_map = if without_none.is_uninhabited() { None } else { Some(single(key.clone(), without_none)) };
    (if_map, Some(Frame::default()))
}

fn truthy_check(ctx: &mut Ctx, operand: &Operand) -> (TypeMap, TypeMap) {
    let Some(key) = &operand.key else {
        return (Some(Frame::default()), Some(Frame::default()));
    };
    let truthy = true_only(ctx, operand.ty);
    let falsy = false_only(ctx, operand.ty);
    let if_map = if truthy.is_uninhabited() { None } else { Some(single(key.clone(), truthy)) };
    let else_map = if falsy.is_uninhabited() { None } else { Some(single(key.clone(), falsy)) };
    (if_map, else_map)
}

/// `find_isinstance_check(expr) -> (if_map, else_map)` (spec §4.H).
pub fn find_isinstance_check(ctx: &mut Ctx, expr: &BoolExpr) -> (TypeMap, TypeMap) {
    match expr {
        BoolExpr::IsInstance { operand, target } => {
            let narrowed = meet_types(ctx, operand.ty, *target);
            conditional_type_map(ctx, operand, narrowed)
        }
        BoolExpr::IsSubclass { operand, target } => {
            let narrowed = meet_types(ctx, operand.ty, *target);
            conditional_type_map(ctx, operand, narrowed)
        }
        BoolExpr::Callable { operand } => {
            let (callable, uncallable) = partition_by_callable(ctx, operand.ty);
            let Some(key) = &operand.key else {
                return (Some(Frame::default()), Some(Frame::default()));
            };
            let if_map = if callable.is_uninhabited() { None } else { Some(single(key.clone(), callable)) };
            let else_map = if uncallable.is_uninhabited() { None } else { Some(single(key.clone(), uncallable)) };
            (if_map, else_map)
        }
        BoolExpr::IsNone { operand, negated } => is_none_check(ctx, operand, *negated),
        BoolExpr::Eq { operand, other } => eq_check(ctx, operand, *other),
        BoolExpr::In { operand, element } => in_check(ctx, operand, *element),
        BoolExpr::And(lhs, rhs) => {
            let (lhs_if, lhs_else) = find_isinstance_check(ctx, lhs);
            let (rhs_if, rhs_else) = find_isinstance_check(ctx, rhs);
            (and_conditional_maps(ctx, lhs_if, rhs_if), or_conditional_maps(ctx, lhs_else, rhs_else))
        }
        BoolExpr::Or(lhs, rhs) => {
            let (lhs_if, lhs_else) = find_isinstance_check(ctx, lhs);
            let (rhs_if, rhs_else) = find_isinstance_check(ctx, rhs);
            (or_conditional_maps(ctx, lhs_if, rhs_if), and_conditional_maps(ctx, lhs_else, rhs_else))
        }
        BoolExpr::Not(inner) => swap(find_isinstance_check(ctx, inner)),
        BoolExpr::Truthy(operand) => truthy_check(ctx, operand),
    }
}
