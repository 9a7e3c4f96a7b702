//! `TypeInfo`: the nominal-class side of the world.
//!
//! The class graph (MRO, base classes, protocol membership, declared
//! members) is produced by semantic analysis, which is out of scope for
//! this engine (spec §1 Non-goals). What the engine owns is the *handle*
//! into that graph and the read-only queries the subtype/join/meet/member
//! lookup algorithms need against it. Spec §9's "cyclic graphs" design
//! note calls this out explicitly: `TypeInfo` objects reference their
//! bases and subclasses, which is naturally cyclic (a module's classes
//! mutually reference each other through inheritance and forward
//! references), so it is addressed by handle (`TypeInfoId`) rather than by
//! owned reference, exactly as the arena does for `Type`/`TypeId`.

use crate::types::{TypeId, Variance};
use pytc_common::Atom;
use rustc_hash::FxHashMap;

/// A stable handle into a [`TypeInfoArena`]. Never invalidated by further
/// insertions, so it is safe to store inside an interned [`crate::types::TypeKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeInfoId(u32);

/// Declaration-site shape of a class or protocol, as produced by whatever
/// semantic-analysis pass precedes this engine.
#[derive(Clone, Debug)]
pub struct TypeInfo {
    pub name: Atom,
    pub module: Atom,
    /// Direct base classes, in MRO-contributing declaration order.
    pub bases: Vec<TypeInfoId>,
    /// The type arguments this class passes to each entry of `bases`, in
    /// terms of *this* class's own `TypeVar`s (e.g. `class Foo(Bar[T])`
    /// stores `[T]` for `Bar`). Used by `map_instance_to_supertype` to
    /// compose substitutions along the inheritance chain.
    pub base_args: Vec<Vec<TypeId>>,
    /// Full linearized method resolution order, `self` first.
    pub mro: Vec<TypeInfoId>,
    pub is_protocol: bool,
    /// `True` for Python's `ABCMeta`-derived or explicitly `abstract`
    /// classes; affects whether a class may appear as an instantiated
    /// concrete argument.
    pub is_abstract: bool,
    /// An unresolvable base (e.g. `class Foo(some_dynamic_expr())`) makes
    /// every subtype query against this class trivially true, per spec
    /// §4.C's `Instance L` case.
    pub fallback_to_any: bool,
    /// Numeric tower promotion target (`int` promotes to `float`, `float`
    /// promotes to `complex`), consulted by `is_subtype` before falling
    /// through to MRO-based comparison.
    pub promotion: Option<TypeInfoId>,
    pub type_params: Vec<TypeParamInfo>,
    /// Declared (not inherited) members, keyed by attribute name.
    pub members: FxHashMap<Atom, MemberInfo>,
    /// The `TypeId` substituted for `Self` while checking this class's own
    /// body (spec §4.J "Self-type resolution").
    pub self_type: TypeId,
}

#[derive(Clone, Copy, Debug)]
pub struct TypeParamInfo {
    pub variance: Variance,
    pub upper_bound: TypeId,
}

#[derive(Clone, Debug)]
pub struct MemberInfo {
    pub declared_type: TypeId,
    pub is_method: bool,
    pub is_classmethod: bool,
    pub is_staticmethod: bool,
    pub is_property: bool,
    /// `ClassVar[...]`-declared; consulted by protocol structural checks
    /// (spec §4.C "flags must match (ClassVar, settable, ...)").
    pub is_classvar: bool,
    /// `False` for a read-only member (a property with no setter, or a
    /// `Final` attribute) — a protocol requiring a settable member is not
    /// satisfied by a read-only one, and a read-only protocol member only
    /// needs covariant compatibility rather than invariance.
    pub is_settable: bool,
    /// Declared but not yet given a value (`x: int` with no assignment);
    /// distinct from a `Partial` *type*, which is an inference-time state.
    pub is_abstract_declaration: bool,
}

/// The handful of builtin classes the subtype/join/meet algorithms need to
/// recognize by identity rather than by name lookup on every call (`type`,
/// `object`, the tuple/function/bool fallbacks). Populated once by the
/// driver after it has registered the builtins module.
#[derive(Clone, Copy, Debug)]
pub struct WellKnownTypeInfo {
    pub object: TypeInfoId,
    pub type_obj: TypeInfoId,
    pub tuple: TypeInfoId,
    pub function: TypeInfoId,
    pub bool_: TypeInfoId,
}

/// Owns every [`TypeInfo`] produced while checking one file (plus whatever
/// the driver preloaded for imported modules). Never shrinks or mutates an
/// entry in place once inserted — callers that need to "change" a
/// `TypeInfo` insert a new one and repoint their `TypeInfoId`.
#[derive(Debug, Default)]
pub struct TypeInfoArena {
    entries: Vec<TypeInfo>,
    by_qualified_name: FxHashMap<(Atom, Atom), TypeInfoId>,
    well_known: Option<WellKnownTypeInfo>,
}

impl TypeInfoArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: TypeInfo) -> TypeInfoId {
        let key = (info.module, info.name);
        if let Some(&id) = self.by_qualified_name.get(&key) {
            return id;
        }
        let id = TypeInfoId(u32::try_from(self.entries.len()).expect("TypeInfo arena overflow"));
        self.by_qualified_name.insert(key, id);
        self.entries.push(info);
        id
    }

    #[must_use]
    pub fn get(&self, id: TypeInfoId) -> &TypeInfo {
        &self.entries[id.0 as usize]
    }

    #[must_use]
    pub fn lookup(&self, module: Atom, name: Atom) -> Option<TypeInfoId> {
        self.by_qualified_name.get(&(module, name)).copied()
    }

    pub fn set_well_known(&mut self, well_known: WellKnownTypeInfo) {
        self.well_known = Some(well_known);
    }

    #[must_use]
    pub fn well_known(&self) -> Option<&WellKnownTypeInfo> {
        self.well_known.as_ref()
    }

    /// Whether `sub` has `sup` anywhere in its MRO (includes `sub == sup`).
    #[must_use]
    pub fn is_subclass(&self, sub: TypeInfoId, sup: TypeInfoId) -> bool {
        sub == sup || self.get(sub).mro.contains(&sup)
    }

    /// Find a member by walking `start`'s MRO in order, returning the
    /// first declaration found (spec: ordinary Python attribute lookup,
    /// not a merge across bases).
    #[must_use]
    pub fn resolve_member(&self, start: TypeInfoId, name: Atom) -> Option<(TypeInfoId, &MemberInfo)> {
        if let Some(member) = self.get(start).members.get(&name) {
            return Some((start, member));
        }
        for &base in &self.get(start).mro {
            if let Some(member) = self.get(base).members.get(&name) {
                return Some((base, member));
            }
        }
        None
    }
}
