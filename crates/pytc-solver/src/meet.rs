//! Greatest lower bound, and the overlap test it depends on (spec §4.D,
//! §4.D.1).

use crate::ctx::Ctx;
use crate::intern::TypeInterner;
use crate::subtype::is_subtype;
use crate::types::{CallableData, TypeId, TypeKey, TupleItem, Variance};
use tracing::debug;

/// `meet_types(s, t)`: the greatest lower bound of `s` and `t`.
#[must_use]
pub fn meet_types(ctx: &mut Ctx, s: TypeId, t: TypeId) -> TypeId {
    if s == t {
        return s;
    }
    if s.is_any() {
        return t;
    }
    if t.is_any() {
        return s;
    }
    if is_subtype(ctx, s, t) {
        return s;
    }
    if is_subtype(ctx, t, s) {
        return t;
    }
    if !is_overlapping_types(ctx, s, t, true) {
        debug!(?s, ?t, strict_optional = ctx.options.strict_optional, "meet of non-overlapping types collapsed to bottom");
        return if ctx.options.strict_optional { TypeId::UNINHABITED } else { TypeId::NONE };
    }
    let s_key = ctx.interner.resolve(s).clone();
    let t_key = ctx.interner.resolve(t).clone();
    match (s_key, t_key) {
        (TypeKey::Instance { type_info: si, args: sa }, TypeKey::Instance { type_info: ti, args: ta }) if si == ti => {
            meet_same_class(ctx, si, &sa, &ta)
        }
        (TypeKey::Tuple { items: si, partial_fallback: sf }, TypeKey::Tuple { items: ti, .. }) => {
            if si.len() != ti.len() {
                return TypeId::UNINHABITED;
            }
            let items: Vec<TupleItem> = si
                .iter()
                .zip(ti.iter())
                .map(|(l, r)| TupleItem::Plain(meet_types(ctx, tuple_item_id(l), tuple_item_id(r))))
                .collect();
            ctx.interner.tuple(items, sf)
        }
        (TypeKey::Union(items), _) => {
            let members: Vec<TypeId> = items.iter().map(|&m| meet_types(ctx, m, t)).collect();
            TypeInterner::union_absorbed(ctx, members)
        }
        (_, TypeKey::Union(items)) => {
            let members: Vec<TypeId> = items.iter().map(|&m| meet_types(ctx, s, m)).collect();
            TypeInterner::union_absorbed(ctx, members)
        }
        _ => {
            if ctx.options.strict_optional {
                TypeId::UNINHABITED
            } else {
                TypeId::NONE
            }
        }
    }
}

fn tuple_item_id(item: &TupleItem) -> TypeId {
    match *item {
        TupleItem::Plain(id) | TupleItem::Unpack(id) => id,
    }
}

fn meet_same_class(ctx: &mut Ctx, type_info: crate::type_info::TypeInfoId, sa: &[TypeId], ta: &[TypeId]) -> TypeId {
    let params = ctx.type_infos.get(type_info).type_params.clone();
    let mut args = Vec::with_capacity(sa.len());
    for (i, (&a, &b)) in sa.iter().zip(ta.iter()).enumerate() {
        let variance = params.get(i).map(|p| p.variance).unwrap_or(Variance::Invariant);
        let met = match variance {
            Variance::Covariant => meet_types(ctx, a, b),
            Variance::Contravariant => crate::join::join_types(ctx, a, b),
            Variance::Invariant => {
                if crate::same_type::same_type(ctx.interner, a, b) {
                    a
                } else {
                    return TypeId::UNINHABITED;
                }
            }
        };
        args.push(met);
    }
    ctx.interner.instance(type_info, args)
}

/// Whether some runtime value could inhabit both `s` and `t` (spec
/// §4.D.1). Type variables are erased to their upper bound before
/// comparison, since a runtime value's class is never a `TypeVar` itself.
#[must_use]
pub fn is_overlapping_types(ctx: &mut Ctx, s: TypeId, t: TypeId, use_promotions: bool) -> bool {
    let s = erase_to_upper_bound(ctx, s);
    let t = erase_to_upper_bound(ctx, t);
    if s.is_any() || t.is_any() {
        return true;
    }
    if ctx.options.strict_optional && (s.is_none() ^ t.is_none()) {
        let other = if s.is_none() { t } else { s };
        return matches!(ctx.interner.resolve(other), TypeKey::Union(items) if items.iter().any(|&m| m.is_none()));
    }
    let s_key = ctx.interner.resolve(s).clone();
    if let TypeKey::Union(items) = s_key {
        return items.iter().any(|&m| is_overlapping_types(ctx, m, t, use_promotions));
    }
    let t_key = ctx.interner.resolve(t).clone();
    if let TypeKey::Union(items) = t_key {
        return items.iter().any(|&m| is_overlapping_types(ctx, s, m, use_promotions));
    }
    let s_key = ctx.interner.resolve(s).clone();
    let t_key = ctx.interner.resolve(t).clone();
    match (s_key, t_key) {
        (TypeKey::TypeType(si), TypeKey::TypeType(ti)) => is_overlapping_types(ctx, si, ti, use_promotions),
        (TypeKey::TypeType(_), TypeKey::Instance { type_info, .. }) | (TypeKey::Instance { type_info, .. }, TypeKey::TypeType(_)) => {
            matches!(ctx.type_infos.well_known(), Some(wk) if type_info == wk.object || type_info == wk.type_obj)
        }
        (TypeKey::Instance { type_info: si, .. }, TypeKey::Instance { type_info: ti, .. }) => {
            ctx.type_infos.is_subclass(si, ti)
                || ctx.type_infos.is_subclass(ti, si)
                || (use_promotions && promotions_connect(ctx, si, ti))
        }
        _ => is_subtype(ctx, s, t) || is_subtype(ctx, t, s),
    }
}

fn promotions_connect(ctx: &Ctx, a: crate::type_info::TypeInfoId, b: crate::type_info::TypeInfoId) -> bool {
    let promotes_to = |mut id: crate::type_info::TypeInfoId, target: crate::type_info::TypeInfoId| -> bool {
        let mut steps = 0u32;
        while let Some(next) = ctx.type_infos.get(id).promotion {
            if next == target {
                return true;
            }
            id = next;
            steps += 1;
            if steps > 8 {
                break;
            }
        }
        false
    };
    promotes_to(a, b) || promotes_to(b, a)
}

fn erase_to_upper_bound(ctx: &mut Ctx, t: TypeId) -> TypeId {
    match ctx.interner.resolve(t).clone() {
        TypeKey::TypeVar { upper_bound, .. } => erase_to_upper_bound(ctx, upper_bound),
        TypeKey::TypeVarTuple { tuple_fallback, .. } => tuple_fallback,
        TypeKey::ParamSpec { upper_bound, .. } => upper_bound,
        _ => t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::TypeInterner;
    use crate::type_info::TypeInfoArena;
    use pytc_common::Options;

    #[test]
    fn meet_is_lower_bound() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let a = interner.union(vec![TypeId::NONE, TypeId::OBJECT_FALLBACK]);
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let met = meet_types(&mut ctx, a, TypeId::OBJECT_FALLBACK);
        assert!(is_subtype(&mut ctx, met, a));
        assert!(is_subtype(&mut ctx, met, TypeId::OBJECT_FALLBACK));
    }

    #[test]
    fn meet_any_is_identity() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        assert_eq!(meet_types(&mut ctx, TypeId::ANY, TypeId::NONE), TypeId::NONE);
    }

    #[test]
    fn non_overlapping_literals_meet_to_bottom() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default().apply_strict_defaults();
        let a = interner.literal_int(1, TypeId::OBJECT_FALLBACK);
        let b = interner.literal_int(2, TypeId::OBJECT_FALLBACK);
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        assert_eq!(meet_types(&mut ctx, a, b), TypeId::UNINHABITED);
    }
}
