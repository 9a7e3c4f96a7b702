//! Same-type is `==`; subtype is `<:` — the asymmetric decision that
//! drives almost everything else in this crate (spec §4.C).
//!
//! The recursion here can run deep on pathological generic instantiations,
//! so every entry point threads an explicit `depth` counter and bails out
//! past `MAX_SUBTYPE_DEPTH` rather than risking a native stack overflow.

use crate::ctx::Ctx;
use crate::expand::{expand_type, expand_type_by_instance, Substitution};
use crate::type_info::TypeInfoId;
use crate::types::{CallableData, TypeId, TypeKey, Variance};
use pytc_common::limits::MAX_SUBTYPE_DEPTH;
use pytc_common::Atom;
use rustc_hash::FxHashSet;

/// How a single type-argument pair should be compared, given the
/// variance declared for that parameter. The default is
/// [`default_variance_checker`]; protocol/argument-invariance callers in
/// `§4.E` substitute their own to additionally record the *negation* of
/// each comparison.
pub type ParamChecker<'c> = &'c mut dyn FnMut(&mut Ctx, TypeId, TypeId, Variance) -> bool;

/// `left <: right`, using the default (structural) variance checker for
/// nested type-argument comparisons.
#[must_use]
pub fn is_subtype(ctx: &mut Ctx, left: TypeId, right: TypeId) -> bool {
    is_subtype_with(ctx, left, right, &mut default_variance_checker, 0)
}

fn default_variance_checker(ctx: &mut Ctx, l: TypeId, r: TypeId, variance: Variance) -> bool {
    match variance {
        Variance::Covariant => is_subtype(ctx, l, r),
        Variance::Contravariant => is_subtype(ctx, r, l),
        Variance::Invariant => is_subtype(ctx, l, r) && is_subtype(ctx, r, l),
    }
}

/// `is_subtype` parameterized by a custom comparison for nested type
/// arguments (spec: `is_subtype(left, right, param_checker = ...)`).
pub fn is_subtype_with(ctx: &mut Ctx, left: TypeId, right: TypeId, param_checker: ParamChecker<'_>, depth: u32) -> bool {
    if depth > MAX_SUBTYPE_DEPTH {
        return false;
    }
    if left == right {
        return true;
    }
    if matches!(ctx.interner.resolve(right), TypeKey::Any(_) | TypeKey::Unbound { .. } | TypeKey::Erased) {
        return true;
    }
    if let TypeKey::Union(right_items) = ctx.interner.resolve(right).clone() {
        if !matches!(ctx.interner.resolve(left), TypeKey::Union(_)) {
            return right_items.iter().any(|&r| is_subtype_with(ctx, left, r, param_checker, depth + 1));
        }
    }
    let left_key = ctx.interner.resolve(left).clone();
    match left_key {
        TypeKey::Any(_) | TypeKey::Unbound { .. } | TypeKey::Erased | TypeKey::Deleted { .. } => true,
        TypeKey::None => is_none_subtype(ctx, right),
        TypeKey::Uninhabited { .. } => true,
        TypeKey::Instance { type_info, args } => instance_is_subtype(ctx, type_info, &args, right, param_checker, depth),
        TypeKey::TypeVar { id, upper_bound, .. } => {
            if let TypeKey::TypeVar { id: right_id, .. } = ctx.interner.resolve(right) {
                if id == *right_id {
                    return true;
                }
            }
            is_subtype_with(ctx, upper_bound, right, param_checker, depth + 1)
        }
        TypeKey::TypeVarTuple { tuple_fallback, .. } => is_subtype_with(ctx, tuple_fallback, right, param_checker, depth + 1),
        TypeKey::ParamSpec { upper_bound, .. } => is_subtype_with(ctx, upper_bound, right, param_checker, depth + 1),
        TypeKey::Callable(left_data) => callable_is_subtype(ctx, &left_data, right, depth),
        TypeKey::Overloaded(items) => overloaded_is_subtype(ctx, &items, right, depth),
        TypeKey::Tuple { items, partial_fallback } => {
            tuple_is_subtype(ctx, &items, partial_fallback, right, param_checker, depth)
        }
        TypeKey::TypedDict { fallback, .. } => is_subtype_with(ctx, fallback, right, param_checker, depth + 1),
        TypeKey::Literal { fallback, .. } => is_subtype_with(ctx, fallback, right, param_checker, depth + 1),
        TypeKey::Union(items) => items.iter().all(|&m| is_subtype_with(ctx, m, right, param_checker, depth + 1)),
        TypeKey::TypeType(item) => type_type_is_subtype(ctx, item, right, depth),
        TypeKey::Unpack(inner) => is_subtype_with(ctx, inner, right, param_checker, depth + 1),
        TypeKey::Partial { .. } => false,
    }
}

fn is_none_subtype(ctx: &mut Ctx, right: TypeId) -> bool {
    if right.is_none() {
        return true;
    }
    if ctx.options.strict_optional {
        right == TypeId::OBJECT_FALLBACK
    } else {
        !matches!(ctx.interner.resolve(right), TypeKey::Uninhabited { .. })
    }
}

fn instance_is_subtype(
    ctx: &mut Ctx,
    type_info: crate::type_info::TypeInfoId,
    args: &[TypeId],
    right: TypeId,
    param_checker: ParamChecker<'_>,
    depth: u32,
) -> bool {
    let info = ctx.type_infos.get(type_info);
    if info.fallback_to_any {
        return true;
    }
    if let Some(promoted) = info.promotion {
        let promoted_instance = ctx.interner.instance(promoted, vec![]);
        if is_subtype_with(ctx, promoted_instance, right, param_checker, depth + 1) {
            return true;
        }
    }
    match ctx.interner.resolve(right).clone() {
        TypeKey::Instance { type_info: right_info, args: right_args } => {
            if !ctx.type_infos.is_subclass(type_info, right_info) {
                if ctx.type_infos.get(right_info).is_protocol {
                    return protocol_conformance(ctx, type_info, args, right_info, &right_args).is_empty();
                }
                return false;
            }
            let Some(mapped) = map_instance_to_supertype(ctx, type_info, args, right_info) else {
                return false;
            };
            let variances: Vec<Variance> = ctx
                .type_infos
                .get(right_info)
                .type_params
                .iter()
                .map(|p| p.variance)
                .collect();
            mapped.len() == right_args.len()
                && mapped
                    .iter()
                    .zip(right_args.iter())
                    .enumerate()
                    .all(|(i, (&l, &r))| {
                        let variance = variances.get(i).copied().unwrap_or(Variance::Invariant);
                        param_checker(ctx, l, r, variance)
                    })
        }
        TypeKey::Tuple { .. } => false,
        _ if right.is_any() => true,
        _ => false,
    }
}

/// One mismatch found while checking a concrete class against a
/// protocol's declared members (spec §4.C "Protocol structural check",
/// spec §7's "protocol member missing/type conflict/flag conflict").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtocolViolation {
    MissingMember(Atom),
    TypeConflict { member: Atom, expected: TypeId, got: TypeId },
    FlagConflict(Atom),
}

/// Compares every member a protocol declares (directly or via a base
/// protocol) against the equivalently-named member of `left`, rather than
/// requiring `left` to nominally inherit the protocol (spec §4.C).
/// `is_subtype` only consults whether the result is empty; a caller that
/// wants spec §7's diagnostics (scenario S7: `foo: int` vs `foo: str`)
/// inspects the returned violations itself.
#[must_use]
pub fn protocol_conformance(
    ctx: &mut Ctx,
    left_info: TypeInfoId,
    left_args: &[TypeId],
    protocol_info: TypeInfoId,
    protocol_args: &[TypeId],
) -> Vec<ProtocolViolation> {
    let mut violations = Vec::new();
    let mut seen: FxHashSet<Atom> = FxHashSet::default();
    let mro_chain: Vec<TypeInfoId> = std::iter::once(protocol_info)
        .chain(ctx.type_infos.get(protocol_info).mro.iter().copied())
        .collect();
    for pid in mro_chain {
        let names: Vec<Atom> = ctx.type_infos.get(pid).members.keys().copied().collect();
        for name in names {
            if !seen.insert(name) {
                continue;
            }
            let Some((_, proto_member)) = ctx.type_infos.resolve_member(protocol_info, name) else {
                continue;
            };
            let proto_member = proto_member.clone();
            let expected = expand_type_by_instance(ctx.interner, ctx.type_infos, proto_member.declared_type, protocol_info, protocol_args)
                .unwrap_or(proto_member.declared_type);
            match ctx.type_infos.resolve_member(left_info, name) {
                None => violations.push(ProtocolViolation::MissingMember(name)),
                Some((_, left_member)) => {
                    let left_member = left_member.clone();
                    let got = expand_type_by_instance(ctx.interner, ctx.type_infos, left_member.declared_type, left_info, left_args)
                        .unwrap_or(left_member.declared_type);
                    let compatible = if proto_member.is_method {
                        is_subtype(ctx, got, expected)
                    } else if proto_member.is_settable {
                        is_subtype(ctx, got, expected) && is_subtype(ctx, expected, got)
                    } else {
                        is_subtype(ctx, got, expected)
                    };
                    if !compatible {
                        violations.push(ProtocolViolation::TypeConflict { member: name, expected, got });
                        continue;
                    }
                    if proto_member.is_classvar != left_member.is_classvar
                        || proto_member.is_classmethod != left_member.is_classmethod
                        || proto_member.is_staticmethod != left_member.is_staticmethod
                        || (proto_member.is_settable && !left_member.is_settable)
                    {
                        violations.push(ProtocolViolation::FlagConflict(name));
                    }
                }
            }
        }
    }
    violations
}

/// Walks `base`'s MRO from `type_info`, composing each base's declared
/// `base_args` substitution, until it reaches `target`. Returns `None` if
/// `target` is not actually an ancestor. A missing substitution entry
/// (unparameterized generic ancestor) fills with `Any`, per the spec's
/// "degenerate case ... fills with Any".
#[must_use]
pub fn map_instance_to_supertype(
    ctx: &mut Ctx,
    type_info: crate::type_info::TypeInfoId,
    args: &[TypeId],
    target: crate::type_info::TypeInfoId,
) -> Option<Vec<TypeId>> {
    if type_info == target {
        return Some(args.to_vec());
    }
    if !ctx.type_infos.is_subclass(type_info, target) {
        return None;
    }
    let info = ctx.type_infos.get(type_info);
    let self_map = self_type_var_map(ctx, type_info, args);
    for (base, base_args) in info.bases.iter().zip(info.base_args.iter()) {
        if !ctx.type_infos.is_subclass(*base, target) {
            continue;
        }
        let substituted: Vec<TypeId> = base_args
            .iter()
            .map(|&arg| expand_type(ctx.interner, arg, &self_map))
            .collect();
        if let Some(mapped) = map_instance_to_supertype(ctx, *base, &substituted, target) {
            return Some(mapped);
        }
    }
    let arity = ctx.type_infos.get(target).type_params.len();
    Some(vec![TypeId::ANY; arity])
}

fn self_type_var_map(ctx: &Ctx, type_info: crate::type_info::TypeInfoId, args: &[TypeId]) -> Substitution {
    let mut map = Substitution::default();
    let self_type = ctx.type_infos.get(type_info).self_type;
    if let TypeKey::Instance { args: self_args, .. } = ctx.interner.resolve(self_type) {
        for (param, &actual) in self_args.iter().zip(args.iter()) {
            if let TypeKey::TypeVar { id, .. } = ctx.interner.resolve(*param) {
                map.insert(*id, actual);
            }
        }
    }
    map
}

fn callable_is_subtype(ctx: &mut Ctx, left: &CallableData, right: TypeId, depth: u32) -> bool {
    match ctx.interner.resolve(right).clone() {
        TypeKey::Callable(right_data) => is_callable_subtype(ctx, left, &right_data, false, false, depth),
        TypeKey::Overloaded(items) => items.iter().any(|&item| {
            if let TypeKey::Callable(right_data) = ctx.interner.resolve(item).clone() {
                is_callable_subtype(ctx, left, &right_data, false, false, depth)
            } else {
                false
            }
        }),
        _ if right.is_any() => true,
        _ => false,
    }
}

/// Whether `data` is the synthesized constructor signature of a class
/// object (e.g. `type[C]`'s `__call__`) rather than an ordinary function
/// or method — decided by whether its `fallback` resolves to the
/// `type_obj` well-known class, not by any property of its own
/// parameter list.
fn is_type_obj(ctx: &Ctx, data: &CallableData) -> bool {
    let TypeKey::Instance { type_info, .. } = ctx.interner.resolve(data.fallback) else {
        return false;
    };
    match ctx.type_infos.well_known() {
        Some(wk) => *type_info == wk.type_obj,
        None => false,
    }
}

/// `left <: right` for two `Callable`s (spec §4.C.2).
///
/// `names_matter` defaults to `false` at every call site in this module
/// (spec: "argument names are checked only when the caller requests
/// name-sensitive comparison") — it is exposed for callers such as a
/// method-override check, which must additionally reject a
/// positional-or-keyword parameter being renamed, matching mypy's
/// `is_callable_compatible`.
pub fn is_callable_subtype(
    ctx: &mut Ctx,
    left: &CallableData,
    right: &CallableData,
    ignore_return: bool,
    names_matter: bool,
    depth: u32,
) -> bool {
    if depth > MAX_SUBTYPE_DEPTH {
        return false;
    }
    if is_type_obj(ctx, right) && !is_type_obj(ctx, left) {
        return false;
    }
    if !left.variables.is_empty() {
        return match crate::inference::unify_generic_callable(ctx, left, right) {
            Some(instantiated) => is_callable_subtype(ctx, &instantiated, right, ignore_return, names_matter, depth + 1),
            None => false,
        };
    }
    if !ignore_return && !is_subtype(ctx, left.ret_type, right.ret_type) {
        return false;
    }
    if right.is_ellipsis_args {
        return true;
    }
    if left.min_args() > right.min_args() {
        return false;
    }
    let len = left.arg_types.len().min(right.arg_types.len());
    for i in 0..len {
        if !is_subtype(ctx, right.arg_types[i], left.arg_types[i]) {
            return false;
        }
        if names_matter && matches!(right.arg_kinds[i], crate::types::Kind::Named | crate::types::Kind::NamedOpt) && left.arg_names[i] != right.arg_names[i]
        {
            return false;
        }
    }
    true
}

fn overloaded_is_subtype(ctx: &mut Ctx, items: &[TypeId], right: TypeId, depth: u32) -> bool {
    match ctx.interner.resolve(right).clone() {
        TypeKey::Callable(_) => items.iter().any(|&item| is_subtype_with(ctx, item, right, &mut default_variance_checker, depth + 1)),
        TypeKey::Overloaded(right_items) => {
            items.len() == right_items.len()
                && items
                    .iter()
                    .zip(right_items.iter())
                    .all(|(&l, &r)| is_subtype_with(ctx, l, r, &mut default_variance_checker, depth + 1))
        }
        _ if right.is_any() => true,
        _ => false,
    }
}

fn tuple_item_id(item: &crate::types::TupleItem) -> TypeId {
    match *item {
        crate::types::TupleItem::Plain(id) | crate::types::TupleItem::Unpack(id) => id,
    }
}

fn tuple_is_subtype(
    ctx: &mut Ctx,
    items: &[crate::types::TupleItem],
    partial_fallback: TypeId,
    right: TypeId,
    param_checker: ParamChecker<'_>,
    depth: u32,
) -> bool {
    match ctx.interner.resolve(right).clone() {
        TypeKey::Tuple { items: right_items, .. } => {
            items.len() == right_items.len()
                && items
                    .iter()
                    .zip(right_items.iter())
                    .all(|(l, r)| param_checker(ctx, tuple_item_id(l), tuple_item_id(r), Variance::Invariant))
        }
        // Non-`Tuple` target: fall back to comparing against the tuple's
        // nominal fallback instance (e.g. `tuple[int, str]`'s fallback is
        // `Instance(tuple, [int | str])`), which already carries the
        // pointwise-joined element type as its sole type argument.
        TypeKey::Instance { .. } => is_subtype_with(ctx, partial_fallback, right, param_checker, depth + 1),
        _ if right.is_any() => true,
        _ => false,
    }
}

fn type_type_is_subtype(ctx: &mut Ctx, item: TypeId, right: TypeId, depth: u32) -> bool {
    let _ = depth;
    match ctx.interner.resolve(right).clone() {
        TypeKey::TypeType(right_item) => is_subtype(ctx, item, right_item),
        TypeKey::Callable(right_data) => is_type_obj(ctx, &right_data) && is_subtype(ctx, item, right_data.ret_type),
        TypeKey::Instance { type_info, .. } => match ctx.type_infos.well_known() {
            Some(wk) => type_info == wk.object || type_info == wk.type_obj,
            None => false,
        },
        _ if right.is_any() => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::TypeInterner;
    use crate::type_info::TypeInfoArena;
    use pytc_common::Options;

    fn ctx_fixture<'a>(interner: &'a mut TypeInterner, type_infos: &'a TypeInfoArena, options: &'a Options) -> Ctx<'a> {
        Ctx::new(interner, type_infos, options)
    }

    #[test]
    fn any_is_top_and_bottom() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let mut ctx = ctx_fixture(&mut interner, &type_infos, &options);
        assert!(is_subtype(&mut ctx, TypeId::NONE, TypeId::ANY));
        assert!(is_subtype(&mut ctx, TypeId::ANY, TypeId::NONE));
    }

    #[test]
    fn reflexive_for_none() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let mut ctx = ctx_fixture(&mut interner, &type_infos, &options);
        assert!(is_subtype(&mut ctx, TypeId::NONE, TypeId::NONE));
    }

    #[test]
    fn uninhabited_is_subtype_of_everything() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let mut ctx = ctx_fixture(&mut interner, &type_infos, &options);
        assert!(is_subtype(&mut ctx, TypeId::UNINHABITED, TypeId::NONE));
    }

    #[test]
    fn literal_is_subtype_of_its_fallback() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let lit = {
            let mut ctx = ctx_fixture(&mut interner, &type_infos, &options);
            ctx.interner.literal_int(1, TypeId::OBJECT_FALLBACK)
        };
        let mut ctx = ctx_fixture(&mut interner, &type_infos, &options);
        assert!(is_subtype(&mut ctx, lit, TypeId::OBJECT_FALLBACK));
    }

    #[test]
    fn union_member_is_subtype_of_its_union() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let union = interner.union(vec![TypeId::NONE, TypeId::OBJECT_FALLBACK]);
        let mut ctx = ctx_fixture(&mut interner, &type_infos, &options);
        assert!(is_subtype(&mut ctx, TypeId::NONE, union));
    }

    /// Spec §8 S7: protocol `P` requires `foo: int`; class `C` declares
    /// `foo: str`. `is_subtype(C, P)` is false, and the conformance check
    /// reports exactly one `TypeConflict` naming `foo`.
    #[test]
    fn protocol_member_type_conflict_is_detected_structurally() {
        use crate::type_info::{MemberInfo, TypeInfo};

        let mut interner = TypeInterner::new();
        let mut type_infos = TypeInfoArena::new();
        let mut strings = pytc_common::Interner::new();
        let foo = strings.intern("foo");
        let p_name = strings.intern("P");
        let c_name = strings.intern("C");
        let module = strings.intern("m");

        let str_lit_fallback = TypeId::OBJECT_FALLBACK;
        let str_member_ty = interner.literal_str(strings.intern("s"), str_lit_fallback);
        let int_member_ty = interner.literal_int(0, str_lit_fallback);

        let mut p_members = rustc_hash::FxHashMap::default();
        p_members.insert(
            foo,
            MemberInfo {
                declared_type: int_member_ty,
                is_method: false,
                is_classmethod: false,
                is_staticmethod: false,
                is_property: false,
                is_classvar: false,
                is_settable: true,
                is_abstract_declaration: true,
            },
        );
        let p_info = type_infos.insert(TypeInfo {
            name: p_name,
            module,
            bases: vec![],
            base_args: vec![],
            mro: vec![],
            is_protocol: true,
            is_abstract: false,
            fallback_to_any: false,
            promotion: None,
            type_params: vec![],
            members: p_members,
            self_type: TypeId::OBJECT_FALLBACK,
        });

        let mut c_members = rustc_hash::FxHashMap::default();
        c_members.insert(
            foo,
            MemberInfo {
                declared_type: str_member_ty,
                is_method: false,
                is_classmethod: false,
                is_staticmethod: false,
                is_property: false,
                is_classvar: false,
                is_settable: true,
                is_abstract_declaration: false,
            },
        );
        let c_info = type_infos.insert(TypeInfo {
            name: c_name,
            module,
            bases: vec![],
            base_args: vec![],
            mro: vec![],
            is_protocol: false,
            is_abstract: false,
            fallback_to_any: false,
            promotion: None,
            type_params: vec![],
            members: c_members,
            self_type: TypeId::OBJECT_FALLBACK,
        });

        let options = Options::default();
        let mut ctx = ctx_fixture(&mut interner, &type_infos, &options);
        let c_instance = ctx.interner.instance(c_info, vec![]);
        let p_instance = ctx.interner.instance(p_info, vec![]);
        assert!(!is_subtype(&mut ctx, c_instance, p_instance));

        let violations = protocol_conformance(&mut ctx, c_info, &[], p_info, &[]);
        assert_eq!(violations.len(), 1);
        assert!(matches!(&violations[0], ProtocolViolation::TypeConflict { member, .. } if *member == foo));
    }
}
