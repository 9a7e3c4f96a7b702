//! Structural equality (spec §4.C `same_type`), with `Unbound` treated as
//! equal to everything so that a pre-resolution placeholder never causes
//! a spurious mismatch downstream.

use crate::intern::TypeInterner;
use crate::types::{TupleItem, TypeId, TypeKey};

/// Structural equality, dispatching as a visitor on `a` against `b`.
/// `Unbound` always compares equal (spec: "tolerating pre-resolution
/// errors"); every other variant requires `b` to be the same variant with
/// pointwise-equal children.
#[must_use]
pub fn same_type(interner: &TypeInterner, a: TypeId, b: TypeId) -> bool {
    if a == b {
        return true;
    }
    let a_key = interner.resolve(a);
    if matches!(a_key, TypeKey::Unbound { .. }) {
        return true;
    }
    let b_key = interner.resolve(b);
    if matches!(b_key, TypeKey::Unbound { .. }) {
        return true;
    }
    match (a_key, b_key) {
        (TypeKey::Any(_), TypeKey::Any(_)) => true,
        (TypeKey::None, TypeKey::None) | (TypeKey::Erased, TypeKey::Erased) => true,
        (TypeKey::Uninhabited { is_noreturn: a }, TypeKey::Uninhabited { is_noreturn: b }) => a == b,
        (TypeKey::Deleted { .. }, TypeKey::Deleted { .. }) => true,
        (TypeKey::Instance { type_info: ti_a, args: args_a }, TypeKey::Instance { type_info: ti_b, args: args_b }) => {
            ti_a == ti_b && same_type_slices(interner, args_a, args_b)
        }
        (TypeKey::TypeVar { id: id_a, .. }, TypeKey::TypeVar { id: id_b, .. }) => id_a == id_b,
        (TypeKey::TypeVarTuple { id: id_a, .. }, TypeKey::TypeVarTuple { id: id_b, .. }) => id_a == id_b,
        (TypeKey::ParamSpec { id: id_a, .. }, TypeKey::ParamSpec { id: id_b, .. }) => id_a == id_b,
        (TypeKey::Callable(ca), TypeKey::Callable(cb)) => {
            ca.arg_kinds == cb.arg_kinds
                && ca.arg_names == cb.arg_names
                && ca.is_ellipsis_args == cb.is_ellipsis_args
                && same_type_slices(interner, &ca.arg_types, &cb.arg_types)
                && same_type(interner, ca.ret_type, cb.ret_type)
        }
        (TypeKey::Overloaded(a), TypeKey::Overloaded(b)) => same_type_slices(interner, a, b),
        (TypeKey::Tuple { items: a, .. }, TypeKey::Tuple { items: b, .. }) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| same_tuple_item(interner, x, y))
        }
        (
            TypeKey::TypedDict { items: a, required_keys: ra, .. },
            TypeKey::TypedDict { items: b, required_keys: rb, .. },
        ) => {
            ra == rb
                && a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|((na, ta), (nb, tb))| na == nb && same_type(interner, *ta, *tb))
        }
        (TypeKey::Literal { value: a, .. }, TypeKey::Literal { value: b, .. }) => a == b,
        (TypeKey::Union(a), TypeKey::Union(b)) => {
            a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| same_type(interner, *x, *y)))
        }
        (TypeKey::TypeType(a), TypeKey::TypeType(b)) => same_type(interner, *a, *b),
        (TypeKey::Unpack(a), TypeKey::Unpack(b)) => same_type(interner, *a, *b),
        _ => false,
    }
}

fn same_type_slices(interner: &TypeInterner, a: &[TypeId], b: &[TypeId]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| same_type(interner, *x, *y))
}

fn same_tuple_item(interner: &TypeInterner, a: &TupleItem, b: &TupleItem) -> bool {
    match (a, b) {
        (TupleItem::Plain(a), TupleItem::Plain(b)) | (TupleItem::Unpack(a), TupleItem::Unpack(b)) => {
            same_type(interner, *a, *b)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnyKind;

    #[test]
    fn reflexive_for_intrinsics() {
        let interner = TypeInterner::new();
        assert!(same_type(&interner, TypeId::ANY, TypeId::ANY));
        assert!(same_type(&interner, TypeId::NONE, TypeId::NONE));
    }

    #[test]
    fn any_kinds_compare_equal_regardless_of_provenance() {
        let mut interner = TypeInterner::new();
        let explicit = interner.any(AnyKind::Explicit);
        assert!(same_type(&interner, TypeId::ANY, explicit));
    }

    #[test]
    fn literal_values_must_match() {
        let mut interner = TypeInterner::new();
        let one = interner.literal_int(1, TypeId::OBJECT_FALLBACK);
        let two = interner.literal_int(2, TypeId::OBJECT_FALLBACK);
        assert!(!same_type(&interner, one, two));
    }

    #[test]
    fn unbound_is_equal_to_anything() {
        let mut interner = TypeInterner::new();
        let mut strings = pytc_common::Interner::new();
        let name = strings.intern("X");
        let unbound = interner.unbound(name, vec![]);
        assert!(same_type(&interner, unbound, TypeId::NONE));
        assert!(same_type(&interner, TypeId::NONE, unbound));
    }
}
