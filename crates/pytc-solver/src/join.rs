//! Least upper bound on the subtype lattice (spec §4.D).

use crate::ctx::Ctx;
use crate::intern::TypeInterner;
use crate::subtype::is_subtype;
use crate::types::{CallableData, TypeId, TypeKey, TupleItem, Variance};
use tracing::debug;

/// `join_types(s, t)`: the least upper bound of `s` and `t`.
#[must_use]
pub fn join_types(ctx: &mut Ctx, s: TypeId, t: TypeId) -> TypeId {
    if s == t {
        return s;
    }
    if s.is_any() || matches!(ctx.interner.resolve(s), TypeKey::Erased) {
        return s;
    }
    if t.is_any() || matches!(ctx.interner.resolve(t), TypeKey::Erased) {
        return t;
    }
    if s.is_none() && !t.is_none() && !matches!(ctx.interner.resolve(t), TypeKey::Uninhabited { .. }) {
        return join_with_none(ctx, t);
    }
    if t.is_none() && !s.is_none() && !matches!(ctx.interner.resolve(s), TypeKey::Uninhabited { .. }) {
        return join_with_none(ctx, s);
    }
    if is_subtype(ctx, s, t) {
        return t;
    }
    if is_subtype(ctx, t, s) {
        return s;
    }
    let s_key = ctx.interner.resolve(s).clone();
    let t_key = ctx.interner.resolve(t).clone();
    match (s_key, t_key) {
        (TypeKey::Instance { type_info: si, args: sa }, TypeKey::Instance { type_info: ti, args: ta }) => {
            join_instances(ctx, si, &sa, ti, &ta)
        }
        (TypeKey::Callable(sc), TypeKey::Callable(tc)) => join_callables(ctx, &sc, &tc),
        (TypeKey::Tuple { items: si, partial_fallback: sf }, TypeKey::Tuple { items: ti, .. }) if si.len() == ti.len() => {
            let items: Vec<TupleItem> = si
                .iter()
                .zip(ti.iter())
                .map(|(l, r)| TupleItem::Plain(join_types(ctx, tuple_item_id(l), tuple_item_id(r))))
                .collect();
            ctx.interner.tuple(items, sf)
        }
        (TypeKey::Union(items), _) => {
            let mut all = items;
            all.push(t);
            TypeInterner::union_absorbed(ctx, all)
        }
        (_, TypeKey::Union(items)) => {
            let mut all = items;
            all.push(s);
            TypeInterner::union_absorbed(ctx, all)
        }
        _ => fallback_join(ctx, s, t),
    }
}

fn tuple_item_id(item: &TupleItem) -> TypeId {
    match *item {
        TupleItem::Plain(id) | TupleItem::Unpack(id) => id,
    }
}

fn join_with_none(ctx: &mut Ctx, other: TypeId) -> TypeId {
    if ctx.options.strict_optional {
        TypeInterner::union_absorbed(ctx, vec![other, TypeId::NONE])
    } else {
        other
    }
}

fn join_instances(
    ctx: &mut Ctx,
    si: crate::type_info::TypeInfoId,
    sa: &[TypeId],
    ti: crate::type_info::TypeInfoId,
    ta: &[TypeId],
) -> TypeId {
    if si == ti {
        let params = ctx.type_infos.get(si).type_params.clone();
        let mut joined_args = Vec::with_capacity(sa.len());
        for (i, (&a, &b)) in sa.iter().zip(ta.iter()).enumerate() {
            let variance = params.get(i).map(|p| p.variance).unwrap_or(Variance::Invariant);
            let joined = match variance {
                Variance::Covariant => join_types(ctx, a, b),
                Variance::Contravariant => crate::meet::meet_types(ctx, a, b),
                Variance::Invariant => {
                    if crate::same_type::same_type(ctx.interner, a, b) {
                        a
                    } else {
                        return fallback_object(ctx);
                    }
                }
            };
            joined_args.push(joined);
        }
        return ctx.interner.instance(si, joined_args);
    }
    // No direct subtype relation in either direction (checked by the
    // caller before reaching here) and different classes: climb to the
    // nearest shared ancestor. Without a full common-ancestor search
    // structure, fall back to `object`, which the spec lists as the
    // ultimate fallback for the mixed case anyway.
    fallback_object(ctx)
}

fn join_callables(ctx: &mut Ctx, s: &CallableData, t: &CallableData) -> TypeId {
    let similar = s.arg_kinds == t.arg_kinds && s.min_args() == t.min_args() && s.is_ellipsis_args == t.is_ellipsis_args;
    if !similar {
        return s.fallback;
    }
    let arg_types: Vec<TypeId> = s
        .arg_types
        .iter()
        .zip(t.arg_types.iter())
        .map(|(&a, &b)| join_types(ctx, a, b))
        .collect();
    let ret_type = join_types(ctx, s.ret_type, t.ret_type);
    ctx.interner.simple_callable(arg_types, s.arg_kinds.clone(), ret_type, s.fallback)
}

fn fallback_object(ctx: &mut Ctx) -> TypeId {
    match ctx.type_infos.well_known() {
        Some(wk) => ctx.interner.instance(wk.object, vec![]),
        None => TypeId::OBJECT_FALLBACK,
    }
}

fn fallback_join(ctx: &mut Ctx, s: TypeId, t: TypeId) -> TypeId {
    debug!(?s, ?t, "join fell back to object, no shared ancestor found");
    fallback_object(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::TypeInterner;
    use crate::type_info::TypeInfoArena;
    use pytc_common::Options;

    #[test]
    fn join_is_upper_bound_for_literal_union() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let a = interner.literal_int(1, TypeId::OBJECT_FALLBACK);
        let b = interner.literal_int(2, TypeId::OBJECT_FALLBACK);
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let joined = join_types(&mut ctx, a, b);
        assert!(is_subtype(&mut ctx, a, joined));
        assert!(is_subtype(&mut ctx, b, joined));
    }

    #[test]
    fn join_any_is_any() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        assert_eq!(join_types(&mut ctx, TypeId::ANY, TypeId::NONE), TypeId::ANY);
    }

    #[test]
    fn join_none_under_strict_optional_makes_union() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default().apply_strict_defaults();
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let joined = join_types(&mut ctx, TypeId::NONE, TypeId::OBJECT_FALLBACK);
        assert!(is_subtype(&mut ctx, TypeId::NONE, joined));
        assert!(is_subtype(&mut ctx, TypeId::OBJECT_FALLBACK, joined));
    }
}
