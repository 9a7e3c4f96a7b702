//! Erasure (spec §4.B): replacing type variables with `Any`, for contexts
//! where only runtime-representation shape matters (e.g. `isinstance`
//! narrowing targets, or producing a concrete fallback for an unsolved
//! inference).

use crate::intern::TypeInterner;
use crate::types::{AnyKind, TypeId, TypeKey, VarId};
use rustc_hash::FxHashSet;

/// Replaces every `TypeVar`/`TypeVarTuple`/`ParamSpec` with `Any`;
/// `Callable` becomes the empty signature `() -> None` while keeping its
/// original `fallback`; `Tuple`/`TypedDict` become their `fallback`.
/// Recurses into `Union`, `Instance` arguments, and `TypeType`.
pub fn erase_type(interner: &mut TypeInterner, t: TypeId) -> TypeId {
    erase_typevars(interner, t, None)
}

/// Like [`erase_type`] but restricted to `ids` when given — variables
/// outside the set are left untouched. Used by inference to erase only
/// the meta-variables belonging to the current call.
pub fn erase_typevars(interner: &mut TypeInterner, t: TypeId, ids: Option<&FxHashSet<VarId>>) -> TypeId {
    if let Some(ids) = ids {
        if ids.is_empty() {
            return t;
        }
    }
    let key = interner.resolve(t).clone();
    match key {
        TypeKey::TypeVar { id, .. } | TypeKey::TypeVarTuple { id, .. } | TypeKey::ParamSpec { id, .. } => {
            if ids.map_or(true, |ids| ids.contains(&id)) {
                interner.any(AnyKind::FromAnotherAny)
            } else {
                t
            }
        }
        TypeKey::Callable(data) => interner.simple_callable(vec![], vec![], TypeId::NONE, data.fallback),
        TypeKey::Tuple { partial_fallback, .. } => erase_typevars(interner, partial_fallback, ids),
        TypeKey::TypedDict { fallback, .. } => erase_typevars(interner, fallback, ids),
        TypeKey::Union(items) => {
            let erased: Vec<_> = items.iter().map(|&m| erase_typevars(interner, m, ids)).collect();
            interner.union(erased)
        }
        TypeKey::Instance { type_info, args } => {
            let erased: Vec<_> = args.iter().map(|&a| erase_typevars(interner, a, ids)).collect();
            interner.instance(type_info, erased)
        }
        TypeKey::TypeType(item) => {
            let erased = erase_typevars(interner, item, ids);
            interner.type_type(erased)
        }
        TypeKey::Overloaded(items) => {
            let erased: Vec<_> = items.iter().map(|&m| erase_typevars(interner, m, ids)).collect();
            interner.overloaded(erased)
        }
        _ => t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{VarId, Variance};

    #[test]
    fn erase_replaces_bare_typevar_with_any() {
        let mut interner = TypeInterner::new();
        let v = interner.type_var(VarId::new_plain(0), interner_test_name(&mut interner), vec![], TypeId::OBJECT_FALLBACK, Variance::Invariant);
        assert_eq!(erase_type(&mut interner, v), TypeId::ANY);
    }

    #[test]
    fn erase_is_idempotent() {
        let mut interner = TypeInterner::new();
        let v = interner.type_var(VarId::new_plain(0), interner_test_name(&mut interner), vec![], TypeId::OBJECT_FALLBACK, Variance::Invariant);
        let once = erase_type(&mut interner, v);
        let twice = erase_type(&mut interner, once);
        assert_eq!(once, twice);
    }

    #[test]
    fn erase_recurses_into_union_members() {
        let mut interner = TypeInterner::new();
        let v = interner.type_var(VarId::new_plain(0), interner_test_name(&mut interner), vec![], TypeId::OBJECT_FALLBACK, Variance::Invariant);
        let u = interner.union(vec![v, TypeId::NONE]);
        let erased = erase_type(&mut interner, u);
        assert_eq!(erased, TypeId::ANY);
    }

    fn interner_test_name(interner: &mut TypeInterner) -> pytc_common::Atom {
        let mut strings = pytc_common::Interner::new();
        let _ = interner;
        strings.intern("T")
    }
}
