//! The Type IR (spec §3.1, §4.A): a closed algebra of type terms.
//!
//! `Type` values are immutable and structurally interned: two types built
//! from the same shape collapse to the same [`TypeId`], so `same_type` on
//! the common case is an `O(1)` integer comparison (see `intern.rs`).
//! Per-occurrence source location is deliberately *not* part of the
//! interned shape — see the "line/column metadata" entry in DESIGN.md —
//! callers that need a type's use-site span carry it alongside the
//! `TypeId`, not inside it.

use pytc_common::Atom;
use std::cmp::Ordering;

/// An interned `Type`. Copy, `Eq`, `Hash` — comparisons are index
/// comparisons, not structural walks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// `Any` with `kind = unannotated`. Top and bottom of the lattice.
    pub const ANY: TypeId = TypeId(0);
    pub const NONE: TypeId = TypeId(1);
    pub const UNINHABITED: TypeId = TypeId(2);
    /// Bottom used specifically for unreachable code, as distinct from an
    /// ordinary empty type — see `Uninhabited.is_noreturn`.
    pub const NORETURN: TypeId = TypeId(3);
    pub const ERASED: TypeId = TypeId(4);
    pub const ERROR: TypeId = TypeId(5);
    pub const OBJECT_FALLBACK: TypeId = TypeId(6);

    pub(crate) const FIRST_USER: u32 = 7;

    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    #[must_use]
    pub const fn is_any(self) -> bool {
        self.0 == Self::ANY.0
    }

    #[must_use]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    #[must_use]
    pub const fn is_uninhabited(self) -> bool {
        self.0 == Self::UNINHABITED.0 || self.0 == Self::NORETURN.0
    }
}

/// Diagnostic-only provenance of an `Any` value (spec §3.1: "kind is
/// diagnostic only" — never consulted by subtype/join/meet).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnyKind {
    Unannotated,
    Explicit,
    FromError,
    FromAnotherAny,
    SpecialForm,
    FromOmittedGenerics,
    ImplementationArtifact,
}

/// Argument kind, shared by formal parameters and actual call arguments
/// (spec §3.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Pos,
    PosOpt,
    Named,
    NamedOpt,
    Star,
    StarStar,
}

impl Kind {
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(self, Kind::PosOpt | Kind::NamedOpt | Kind::Star | Kind::StarStar)
    }

    #[must_use]
    pub const fn is_star(self) -> bool {
        matches!(self, Kind::Star | Kind::StarStar)
    }

    #[must_use]
    pub const fn is_named(self) -> bool {
        matches!(self, Kind::Named | Kind::NamedOpt)
    }

    #[must_use]
    pub const fn is_positional(self) -> bool {
        matches!(self, Kind::Pos | Kind::PosOpt | Kind::Star)
    }
}

/// Declared variance of a type parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variance {
    Invariant,
    Covariant,
    Contravariant,
}

/// A globally-unique type-variable identifier. The top bit distinguishes
/// *meta*-variables — the fresh unification variables created during
/// two-pass inference (spec §4.F) — from ordinary, user-declared variables,
/// without needing a second type to carry around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

const META_BIT: u32 = 1 << 31;

impl VarId {
    #[must_use]
    pub(crate) const fn new_plain(index: u32) -> Self {
        debug_assert!(index & META_BIT == 0);
        VarId(index)
    }

    #[must_use]
    pub(crate) const fn new_meta(index: u32) -> Self {
        VarId(index | META_BIT)
    }

    #[must_use]
    pub const fn is_meta(self) -> bool {
        self.0 & META_BIT != 0
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0 & !META_BIT
    }
}

/// A `TypeVar`/`TypeVarTuple`/`ParamSpec` appearing in a `Callable`'s
/// `variables` list (spec: `Callable.variables: [TypeVarLike]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeVarLike {
    TypeVar(VarId),
    TypeVarTuple(VarId),
    ParamSpec(VarId),
}

impl TypeVarLike {
    #[must_use]
    pub const fn id(self) -> VarId {
        match self {
            TypeVarLike::TypeVar(id) | TypeVarLike::TypeVarTuple(id) | TypeVarLike::ParamSpec(id) => id,
        }
    }
}

/// A single element of a `Tuple`'s item list: either an ordinary member or
/// the (at most one) `*T` unpack (spec invariant: "Tuple.items contains at
/// most one Unpack").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TupleItem {
    Plain(TypeId),
    Unpack(TypeId),
}

/// The literal value carried by a `Literal` type.
#[derive(Clone, Debug)]
pub enum LiteralValue {
    Int(i64),
    /// Stored via its own ordering/hash so two structurally-equal floats
    /// intern to the same `TypeId`; Python's `int`/`float` literal types
    /// in annotations are restricted to `int`/`bool`/`str`/`bytes` per the
    /// surface syntax, but the engine keeps this open for `Final = 1.5`
    /// style narrowing the binder performs internally.
    Str(Atom),
    Bytes(Atom),
    Bool(bool),
}

impl PartialEq for LiteralValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LiteralValue::Int(a), LiteralValue::Int(b)) => a == b,
            (LiteralValue::Str(a), LiteralValue::Str(b)) => a == b,
            (LiteralValue::Bytes(a), LiteralValue::Bytes(b)) => a == b,
            (LiteralValue::Bool(a), LiteralValue::Bool(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for LiteralValue {}

impl std::hash::Hash for LiteralValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            LiteralValue::Int(v) => v.hash(state),
            LiteralValue::Str(v) | LiteralValue::Bytes(v) => v.hash(state),
            LiteralValue::Bool(v) => v.hash(state),
        }
    }
}

impl PartialOrd for VarId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for VarId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// Shape of a `Callable` type (spec §3.1). `arg_types`/`arg_kinds`/
/// `arg_names` are kept as parallel vectors of equal length rather than one
/// `Vec<Param>` to match how the subtype/inference code walks them
/// positionally against a second callable's equally-shaped vectors.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallableData {
    pub arg_types: Vec<TypeId>,
    pub arg_kinds: Vec<Kind>,
    pub arg_names: Vec<Option<Atom>>,
    pub ret_type: TypeId,
    pub fallback: TypeId,
    pub variables: Vec<TypeVarLike>,
    pub is_ellipsis_args: bool,
    pub special_sig: Option<Atom>,
    pub bound_args: Vec<Option<TypeId>>,
    pub type_guard: Option<TypeId>,
}

impl CallableData {
    #[must_use]
    pub fn min_args(&self) -> usize {
        self.arg_kinds
            .iter()
            .take_while(|k| matches!(k, Kind::Pos | Kind::Named))
            .count()
    }
}

/// The canonical shape of every `Type` variant, keyed on child `TypeId`s
/// rather than nested owned trees — this is what gets interned (see
/// `intern.rs`). Matches spec §3.1 one-for-one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Any(AnyKind),
    None,
    Uninhabited { is_noreturn: bool },
    Deleted { source: Option<Atom> },
    Erased,
    Partial {
        base: Option<crate::type_info::TypeInfoId>,
        var: VarId,
        inner_types: Vec<TypeId>,
    },
    Unbound { name: Atom, args: Vec<TypeId> },
    Instance {
        type_info: crate::type_info::TypeInfoId,
        args: Vec<TypeId>,
    },
    TypeVar {
        id: VarId,
        name: Atom,
        values: Vec<TypeId>,
        upper_bound: TypeId,
        variance: Variance,
    },
    TypeVarTuple {
        id: VarId,
        name: Atom,
        tuple_fallback: TypeId,
    },
    ParamSpec {
        id: VarId,
        name: Atom,
        upper_bound: TypeId,
    },
    Callable(CallableData),
    Overloaded(Vec<TypeId>),
    Tuple {
        items: Vec<TupleItem>,
        partial_fallback: TypeId,
    },
    TypedDict {
        items: Vec<(Atom, TypeId)>,
        required_keys: Vec<Atom>,
        fallback: TypeId,
    },
    Literal {
        value: LiteralValue,
        fallback: TypeId,
    },
    Union(Vec<TypeId>),
    TypeType(TypeId),
    Unpack(TypeId),
}

impl TypeKey {
    /// Short, stable name of the variant — used by the visitor dispatch
    /// table and by `internal_error` diagnostics.
    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        match self {
            TypeKey::Any(_) => "Any",
            TypeKey::None => "None",
            TypeKey::Uninhabited { .. } => "Uninhabited",
            TypeKey::Deleted { .. } => "Deleted",
            TypeKey::Erased => "Erased",
            TypeKey::Partial { .. } => "Partial",
            TypeKey::Unbound { .. } => "Unbound",
            TypeKey::Instance { .. } => "Instance",
            TypeKey::TypeVar { .. } => "TypeVar",
            TypeKey::TypeVarTuple { .. } => "TypeVarTuple",
            TypeKey::ParamSpec { .. } => "ParamSpec",
            TypeKey::Callable(_) => "Callable",
            TypeKey::Overloaded(_) => "Overloaded",
            TypeKey::Tuple { .. } => "Tuple",
            TypeKey::TypedDict { .. } => "TypedDict",
            TypeKey::Literal { .. } => "Literal",
            TypeKey::Union(_) => "Union",
            TypeKey::TypeType(_) => "TypeType",
            TypeKey::Unpack(_) => "Unpack",
        }
    }
}
