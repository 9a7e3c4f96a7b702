//! The type interner: the single construction site for [`TypeId`]s.
//!
//! Every other module builds types by calling methods on [`TypeInterner`]
//! rather than by matching on [`TypeKey`] directly — this is the same
//! "quarantine" discipline the teacher enforces around its own
//! `intern.rs` (a dedicated test asserts nothing outside this module
//! constructs a `TypeKey`), so a future reader always has one place to
//! look for how a given shape normalizes.

use crate::types::{
    AnyKind, CallableData, Kind, LiteralValue, TupleItem, TypeId, TypeKey, TypeVarLike, Variance,
};
use crate::type_info::TypeInfoId;
use pytc_common::Atom;
use pytc_common::limits::MAX_INTERNED_TYPES;
use rustc_hash::FxHashMap;

/// Arena + dedup table mapping [`TypeKey`] shapes to stable [`TypeId`]s.
///
/// Reserves the first [`TypeId::FIRST_USER`] slots for the intrinsic
/// singletons (`Any`, `None`, `Uninhabited`, ...) so they're always at
/// fixed, well-known indices regardless of what a given file happens to
/// reference.
pub struct TypeInterner {
    arena: Vec<TypeKey>,
    lookup: FxHashMap<TypeKey, TypeId>,
}

impl TypeInterner {
    #[must_use]
    pub fn new() -> Self {
        let mut interner = Self {
            arena: Vec::new(),
            lookup: FxHashMap::default(),
        };
        let any = interner.intern(TypeKey::Any(AnyKind::Unannotated));
        debug_assert_eq!(any, TypeId::ANY);
        let none = interner.intern(TypeKey::None);
        debug_assert_eq!(none, TypeId::NONE);
        let uninhabited = interner.intern(TypeKey::Uninhabited { is_noreturn: false });
        debug_assert_eq!(uninhabited, TypeId::UNINHABITED);
        let noreturn = interner.intern(TypeKey::Uninhabited { is_noreturn: true });
        debug_assert_eq!(noreturn, TypeId::NORETURN);
        let erased = interner.intern(TypeKey::Erased);
        debug_assert_eq!(erased, TypeId::ERASED);
        let error = interner.intern(TypeKey::Any(AnyKind::FromError));
        debug_assert_eq!(error, TypeId::ERROR);
        let object_fallback = interner.intern(TypeKey::Any(AnyKind::ImplementationArtifact));
        debug_assert_eq!(object_fallback, TypeId::OBJECT_FALLBACK);
        interner
    }

    /// The sole place a [`TypeKey`] turns into a [`TypeId`]: looks up the
    /// shape in the dedup table, interning a fresh id only on miss.
    fn intern(&mut self, key: TypeKey) -> TypeId {
        if let Some(&id) = self.lookup.get(&key) {
            return id;
        }
        assert!(
            self.arena.len() < MAX_INTERNED_TYPES,
            "exceeded MAX_INTERNED_TYPES ({MAX_INTERNED_TYPES}); this file's type graph is \
             unreasonably large or a construction loop failed to converge",
        );
        let id = TypeId(u32::try_from(self.arena.len()).expect("type arena overflow"));
        self.arena.push(key.clone());
        self.lookup.insert(key, id);
        id
    }

    #[must_use]
    pub fn resolve(&self, id: TypeId) -> &TypeKey {
        &self.arena[id.0 as usize]
    }

    /// Finds the `TypeVar`/`TypeVarTuple`/`ParamSpec` declaration a given
    /// [`crate::types::VarId`] was declared with, recovering its `values`/
    /// `upper_bound` for a caller such as [`crate::inference::check_typevar_bounds`]
    /// that only has the bare id at hand.
    ///
    /// Linear in the arena size; callers use this for diagnostics after
    /// inference finishes, never on a hot path.
    #[must_use]
    pub fn find_type_var_like_decl(&self, id: crate::types::VarId) -> Option<TypeId> {
        self.arena.iter().position(|key| match key {
            TypeKey::TypeVar { id: decl_id, .. }
            | TypeKey::TypeVarTuple { id: decl_id, .. }
            | TypeKey::ParamSpec { id: decl_id, .. } => *decl_id == id,
            _ => false,
        }).map(|index| TypeId(u32::try_from(index).expect("type arena overflow")))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    // -- constructors, one per spec §3.1 variant -----------------------

    #[must_use]
    pub fn any(&mut self, kind: AnyKind) -> TypeId {
        if matches!(kind, AnyKind::Unannotated) {
            return TypeId::ANY;
        }
        self.intern(TypeKey::Any(kind))
    }

    #[must_use]
    pub fn uninhabited(&mut self, is_noreturn: bool) -> TypeId {
        if is_noreturn { TypeId::NORETURN } else { TypeId::UNINHABITED }
    }

    #[must_use]
    pub fn deleted(&mut self, source: Option<Atom>) -> TypeId {
        self.intern(TypeKey::Deleted { source })
    }

    #[must_use]
    pub fn partial(&mut self, base: Option<TypeInfoId>, var: crate::types::VarId, inner_types: Vec<TypeId>) -> TypeId {
        self.intern(TypeKey::Partial { base, var, inner_types })
    }

    #[must_use]
    pub fn unbound(&mut self, name: Atom, args: Vec<TypeId>) -> TypeId {
        self.intern(TypeKey::Unbound { name, args })
    }

    #[must_use]
    pub fn instance(&mut self, type_info: TypeInfoId, args: Vec<TypeId>) -> TypeId {
        self.intern(TypeKey::Instance { type_info, args })
    }

    #[must_use]
    pub fn type_var(
        &mut self,
        id: crate::types::VarId,
        name: Atom,
        values: Vec<TypeId>,
        upper_bound: TypeId,
        variance: Variance,
    ) -> TypeId {
        self.intern(TypeKey::TypeVar { id, name, values, upper_bound, variance })
    }

    #[must_use]
    pub fn type_var_tuple(&mut self, id: crate::types::VarId, name: Atom, tuple_fallback: TypeId) -> TypeId {
        self.intern(TypeKey::TypeVarTuple { id, name, tuple_fallback })
    }

    #[must_use]
    pub fn param_spec(&mut self, id: crate::types::VarId, name: Atom, upper_bound: TypeId) -> TypeId {
        self.intern(TypeKey::ParamSpec { id, name, upper_bound })
    }

    #[must_use]
    pub fn callable(&mut self, data: CallableData) -> TypeId {
        debug_assert_eq!(data.arg_types.len(), data.arg_kinds.len());
        debug_assert_eq!(data.arg_types.len(), data.arg_names.len());
        self.intern(TypeKey::Callable(data))
    }

    /// A `Callable` is allowed at most one `Star`/`StarStar` each; panics
    /// in debug builds on violation to catch a malformed signature at its
    /// construction site rather than deep inside subtype checking.
    #[must_use]
    pub fn simple_callable(
        &mut self,
        arg_types: Vec<TypeId>,
        arg_kinds: Vec<Kind>,
        ret_type: TypeId,
        fallback: TypeId,
    ) -> TypeId {
        let arg_names = vec![None; arg_types.len()];
        self.callable(CallableData {
            arg_types,
            arg_kinds,
            arg_names,
            ret_type,
            fallback,
            variables: Vec::new(),
            is_ellipsis_args: false,
            special_sig: None,
            bound_args: Vec::new(),
            type_guard: None,
        })
    }

    #[must_use]
    pub fn generic_callable(
        &mut self,
        arg_types: Vec<TypeId>,
        arg_kinds: Vec<Kind>,
        ret_type: TypeId,
        fallback: TypeId,
        variables: Vec<TypeVarLike>,
    ) -> TypeId {
        let arg_names = vec![None; arg_types.len()];
        self.callable(CallableData {
            arg_types,
            arg_kinds,
            arg_names,
            ret_type,
            fallback,
            variables,
            is_ellipsis_args: false,
            special_sig: None,
            bound_args: Vec::new(),
            type_guard: None,
        })
    }

    /// An `Overloaded` item list must be non-empty and each member must be
    /// a `Callable` (spec invariant). Collapses a singleton list to its
    /// one member rather than wrapping it pointlessly.
    #[must_use]
    pub fn overloaded(&mut self, items: Vec<TypeId>) -> TypeId {
        assert!(!items.is_empty(), "Overloaded requires at least one signature");
        if items.len() == 1 {
            return items[0];
        }
        for &item in &items {
            debug_assert!(
                matches!(self.resolve(item), TypeKey::Callable(_)),
                "Overloaded members must be Callable types",
            );
        }
        self.intern(TypeKey::Overloaded(items))
    }

    #[must_use]
    pub fn tuple(&mut self, items: Vec<TupleItem>, partial_fallback: TypeId) -> TypeId {
        debug_assert!(
            items.iter().filter(|i| matches!(i, TupleItem::Unpack(_))).count() <= 1,
            "Tuple may contain at most one Unpack item",
        );
        self.intern(TypeKey::Tuple { items, partial_fallback })
    }

    #[must_use]
    pub fn fixed_tuple(&mut self, items: Vec<TypeId>, partial_fallback: TypeId) -> TypeId {
        self.tuple(items.into_iter().map(TupleItem::Plain).collect(), partial_fallback)
    }

    #[must_use]
    pub fn typed_dict(&mut self, mut items: Vec<(Atom, TypeId)>, required_keys: Vec<Atom>, fallback: TypeId) -> TypeId {
        items.sort_by_key(|(name, _)| name.as_u32());
        self.intern(TypeKey::TypedDict { items, required_keys, fallback })
    }

    #[must_use]
    pub fn literal(&mut self, value: LiteralValue, fallback: TypeId) -> TypeId {
        self.intern(TypeKey::Literal { value, fallback })
    }

    #[must_use]
    pub fn literal_int(&mut self, value: i64, fallback: TypeId) -> TypeId {
        self.literal(LiteralValue::Int(value), fallback)
    }

    #[must_use]
    pub fn literal_str(&mut self, value: Atom, fallback: TypeId) -> TypeId {
        self.literal(LiteralValue::Str(value), fallback)
    }

    #[must_use]
    pub fn literal_bool(&mut self, value: bool, fallback: TypeId) -> TypeId {
        self.literal(LiteralValue::Bool(value), fallback)
    }

    /// Constructs a `Union`, normalizing per spec invariants: flattens
    /// nested unions, drops duplicate members (by `TypeId`, i.e. after any
    /// prior normalization), and collapses to `Any`/the sole member in the
    /// degenerate cases. Does *not* perform subtype-based simplification
    /// (e.g. absorbing a subclass into a supertype already present in the
    /// union) — that needs `is_subtype`, which needs a `TypeInfoArena` this
    /// type alone doesn't have; see [`Self::union_absorbed`] for the
    /// variant that does, used wherever a `Ctx` is in scope.
    #[must_use]
    pub fn union(&mut self, members: Vec<TypeId>) -> TypeId {
        let mut flat = Vec::with_capacity(members.len());
        let mut seen = rustc_hash::FxHashSet::default();
        let mut any_seen = false;
        for member in members {
            if member.is_any() {
                any_seen = true;
                continue;
            }
            match self.resolve(member) {
                TypeKey::Union(inner) => {
                    for &nested in &inner.clone() {
                        if seen.insert(nested) {
                            flat.push(nested);
                        }
                    }
                }
                _ => {
                    if seen.insert(member) {
                        flat.push(member);
                    }
                }
            }
        }
        if any_seen {
            return TypeId::ANY;
        }
        match flat.len() {
            0 => TypeId::UNINHABITED,
            1 => flat[0],
            _ => self.intern(TypeKey::Union(flat)),
        }
    }

    /// [`Self::union`] plus spec §4.D's "subclasses are absorbed by their
    /// supertypes" (scenario S2: `Union.of([int, Employee, Manager])`
    /// simplifies to `Union[int, Employee]`, mirroring mypy's own
    /// `UnionType.make_simplified_union` running `is_subtype` over every
    /// pair of candidate members before keeping one). Drops a member `m`
    /// whenever some other surviving member `n` satisfies `m <: n` — a
    /// member that is only a subtype *and* a supertype of another (i.e.
    /// structurally equivalent but interned as a distinct `TypeId`) is
    /// left alone, since neither side is strictly more general.
    #[must_use]
    pub fn union_absorbed(ctx: &mut crate::ctx::Ctx, members: Vec<TypeId>) -> TypeId {
        let flat = ctx.interner.union(members);
        let TypeKey::Union(items) = ctx.interner.resolve(flat).clone() else {
            return flat;
        };
        let mut survivors = Vec::with_capacity(items.len());
        for &m in &items {
            let absorbed = items
                .iter()
                .any(|&n| n != m && crate::subtype::is_subtype(ctx, m, n) && !crate::subtype::is_subtype(ctx, n, m));
            if !absorbed {
                survivors.push(m);
            }
        }
        ctx.interner.union(survivors)
    }

    #[must_use]
    pub fn type_type(&mut self, inner: TypeId) -> TypeId {
        self.intern(TypeKey::TypeType(inner))
    }

    #[must_use]
    pub fn unpack(&mut self, inner: TypeId) -> TypeId {
        self.intern(TypeKey::Unpack(inner))
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::Ctx;
    use crate::type_info::{TypeInfo, TypeInfoArena};
    use crate::types::VarId;
    use pytc_common::Options;

    #[test]
    fn union_absorbed_drops_a_subclass_already_covered_by_its_supertype() {
        let mut interner = TypeInterner::new();
        let mut type_infos = TypeInfoArena::new();
        let mut strings = pytc_common::Interner::new();
        let employee_name = strings.intern("Employee");
        let module = strings.intern("m");
        let employee = type_infos.insert(TypeInfo {
            name: employee_name,
            module,
            bases: vec![],
            base_args: vec![],
            mro: vec![],
            is_protocol: false,
            is_abstract: false,
            fallback_to_any: false,
            promotion: None,
            type_params: vec![],
            members: FxHashMap::default(),
            self_type: TypeId::ANY,
        });
        let manager = type_infos.insert(TypeInfo {
            name: strings.intern("Manager"),
            module,
            bases: vec![employee],
            base_args: vec![vec![]],
            mro: vec![employee],
            is_protocol: false,
            is_abstract: false,
            fallback_to_any: false,
            promotion: None,
            type_params: vec![],
            members: FxHashMap::default(),
            self_type: TypeId::ANY,
        });

        let employee_ty = interner.instance(employee, vec![]);
        let manager_ty = interner.instance(manager, vec![]);
        let int_lit = interner.literal_int(1, TypeId::OBJECT_FALLBACK);

        let options = Options::default();
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let simplified = TypeInterner::union_absorbed(&mut ctx, vec![int_lit, employee_ty, manager_ty]);

        let TypeKey::Union(members) = ctx.interner.resolve(simplified).clone() else {
            panic!("expected a Union, got {simplified:?}");
        };
        assert_eq!(members.len(), 2);
        assert!(members.contains(&int_lit));
        assert!(members.contains(&employee_ty));
        assert!(!members.contains(&manager_ty));
    }

    #[test]
    fn intrinsics_land_at_fixed_ids() {
        let interner = TypeInterner::new();
        assert!(TypeId::ANY.is_intrinsic());
        assert!(TypeId::NONE.is_intrinsic());
        assert_eq!(interner.resolve(TypeId::NONE), &TypeKey::None);
    }

    #[test]
    fn identical_shapes_intern_to_the_same_id() {
        let mut interner = TypeInterner::new();
        let a = interner.literal_int(1, TypeId::OBJECT_FALLBACK);
        let b = interner.literal_int(1, TypeId::OBJECT_FALLBACK);
        assert_eq!(a, b);
        let c = interner.literal_int(2, TypeId::OBJECT_FALLBACK);
        assert_ne!(a, c);
    }

    #[test]
    fn union_flattens_and_dedups() {
        let mut interner = TypeInterner::new();
        let a = interner.literal_int(1, TypeId::OBJECT_FALLBACK);
        let b = interner.literal_int(2, TypeId::OBJECT_FALLBACK);
        let inner = interner.union(vec![a, b]);
        let flattened = interner.union(vec![inner, a, b]);
        assert_eq!(flattened, inner);
    }

    #[test]
    fn union_with_any_collapses_to_any() {
        let mut interner = TypeInterner::new();
        let a = interner.literal_int(1, TypeId::OBJECT_FALLBACK);
        assert_eq!(interner.union(vec![a, TypeId::ANY]), TypeId::ANY);
    }

    #[test]
    fn union_of_one_collapses_to_its_member() {
        let mut interner = TypeInterner::new();
        let a = interner.literal_int(1, TypeId::OBJECT_FALLBACK);
        assert_eq!(interner.union(vec![a]), a);
    }

    #[test]
    fn union_of_none_collapses_to_uninhabited() {
        let mut interner = TypeInterner::new();
        assert_eq!(interner.union(vec![]), TypeId::UNINHABITED);
    }

    #[test]
    fn overloaded_of_one_collapses_to_its_member() {
        let mut interner = TypeInterner::new();
        let sig = interner.simple_callable(vec![], vec![], TypeId::NONE, TypeId::OBJECT_FALLBACK);
        assert_eq!(interner.overloaded(vec![sig]), sig);
    }

    #[test]
    fn meta_and_plain_var_ids_are_distinguishable() {
        let meta = VarId::new_meta(3);
        let plain = VarId::new_plain(3);
        assert!(meta.is_meta());
        assert!(!plain.is_meta());
        assert_eq!(meta.raw(), plain.raw());
        assert_ne!(meta, plain);
    }
}
