//! Expansion (spec §4.B): capture-free substitution of type variables by
//! concrete types, keyed by [`VarId`] rather than by name — two
//! differently-scoped variables that happen to share a surface name never
//! collide.

use crate::intern::TypeInterner;
use crate::type_info::TypeInfoArena;
use crate::types::{TupleItem, TypeId, TypeKey, VarId};
use rustc_hash::FxHashMap;

/// A substitution from type-variable id to the type it should become.
pub type Substitution = FxHashMap<VarId, TypeId>;

/// Substitutes every `TypeVar`/`TypeVarTuple`/`ParamSpec` whose id appears
/// in `map`; recurses into every composite. For `Callable`, substitutes
/// `arg_types`/`ret_type` but leaves `variables` untouched unless a
/// variable's own id is bound in `map` — generic parameters of a still-
/// generic callable are not instantiated just because the callable
/// happens to appear inside a larger expansion (spec §4.B).
pub fn expand_type(interner: &mut TypeInterner, t: TypeId, map: &Substitution) -> TypeId {
    if map.is_empty() {
        return t;
    }
    let key = interner.resolve(t).clone();
    match key {
        TypeKey::TypeVar { id, .. } | TypeKey::TypeVarTuple { id, .. } | TypeKey::ParamSpec { id, .. } => {
            map.get(&id).copied().unwrap_or(t)
        }
        TypeKey::Instance { type_info, args } => {
            let mapped: Vec<_> = args.iter().map(|&a| expand_type(interner, a, map)).collect();
            interner.instance(type_info, mapped)
        }
        TypeKey::Union(items) => {
            let mapped: Vec<_> = items.iter().map(|&m| expand_type(interner, m, map)).collect();
            interner.union(mapped)
        }
        TypeKey::TypeType(item) => {
            let mapped = expand_type(interner, item, map);
            interner.type_type(mapped)
        }
        TypeKey::Unpack(inner) => {
            let mapped = expand_type(interner, inner, map);
            interner.unpack(mapped)
        }
        TypeKey::Tuple { items, partial_fallback } => {
            let mapped_items: Vec<_> = items
                .iter()
                .map(|item| match item {
                    TupleItem::Plain(id) => TupleItem::Plain(expand_type(interner, *id, map)),
                    TupleItem::Unpack(id) => TupleItem::Unpack(expand_type(interner, *id, map)),
                })
                .collect();
            let mapped_fallback = expand_type(interner, partial_fallback, map);
            interner.tuple(mapped_items, mapped_fallback)
        }
        TypeKey::TypedDict { items, required_keys, fallback } => {
            let mapped_items: Vec<_> = items
                .into_iter()
                .map(|(name, ty)| (name, expand_type(interner, ty, map)))
                .collect();
            let mapped_fallback = expand_type(interner, fallback, map);
            interner.typed_dict(mapped_items, required_keys, mapped_fallback)
        }
        TypeKey::Literal { value, fallback } => {
            let mapped_fallback = expand_type(interner, fallback, map);
            interner.literal(value, mapped_fallback)
        }
        TypeKey::Overloaded(items) => {
            let mapped: Vec<_> = items.iter().map(|&m| expand_type(interner, m, map)).collect();
            interner.overloaded(mapped)
        }
        TypeKey::Callable(data) => {
            let bound_ids: Vec<VarId> = data.variables.iter().map(|v| v.id()).collect();
            let arg_types = data.arg_types.iter().map(|&a| expand_type(interner, a, map)).collect();
            let ret_type = expand_type(interner, data.ret_type, map);
            let bound_args = data
                .bound_args
                .iter()
                .map(|a| a.map(|id| expand_type(interner, id, map)))
                .collect();
            let type_guard = data.type_guard.map(|id| expand_type(interner, id, map));
            let variables = data
                .variables
                .into_iter()
                .filter(|v| !map.contains_key(&v.id()))
                .collect();
            let _ = bound_ids;
            interner.callable(crate::types::CallableData {
                arg_types,
                arg_kinds: data.arg_kinds,
                arg_names: data.arg_names,
                ret_type,
                fallback: data.fallback,
                variables,
                is_ellipsis_args: data.is_ellipsis_args,
                special_sig: data.special_sig,
                bound_args,
                type_guard,
            })
        }
        TypeKey::Partial { base, var, inner_types } => {
            let mapped: Vec<_> = inner_types.iter().map(|&i| expand_type(interner, i, map)).collect();
            interner.partial(base, var, mapped)
        }
        TypeKey::Unbound { name, args } => {
            let mapped: Vec<_> = args.iter().map(|&a| expand_type(interner, a, map)).collect();
            interner.unbound(name, mapped)
        }
        _ => t,
    }
}

/// Builds a substitution from `type_info`'s declared type-variable list to
/// `args` and applies [`expand_type`]. Returns `None` when the arities
/// differ, mirroring the spec's "fails if arities differ".
pub fn expand_type_by_instance(
    interner: &mut TypeInterner,
    type_infos: &TypeInfoArena,
    t: TypeId,
    type_info: crate::type_info::TypeInfoId,
    args: &[TypeId],
) -> Option<TypeId> {
    let params = &type_infos.get(type_info).type_params;
    if params.len() != args.len() {
        return None;
    }
    // The declared type-variable ids live on `TypeVar` types stored
    // per-class; here we assume the caller has already resolved those
    // ids (semantic analysis's job) and passes them via `var_ids`.
    // This helper takes the simpler, common path: callers that already
    // have the class's `VarId`s build the map themselves and call
    // `expand_type` directly. This entry point exists for the common
    // case of substituting by positional parameter index when the
    // class's type-variable ids are recoverable from its `self_type`.
    let self_type = type_infos.get(type_info).self_type;
    let map = collect_self_type_var_map(interner, self_type, args);
    Some(expand_type(interner, t, &map))
}

fn collect_self_type_var_map(interner: &TypeInterner, self_type: TypeId, args: &[TypeId]) -> Substitution {
    let mut map = Substitution::default();
    if let TypeKey::Instance { args: self_args, .. } = interner.resolve(self_type) {
        for (param, &replacement) in self_args.iter().zip(args.iter()) {
            if let TypeKey::TypeVar { id, .. } = interner.resolve(*param) {
                map.insert(*id, replacement);
            }
        }
    }
    map
}
