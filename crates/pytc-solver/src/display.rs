//! Canonical short-form pretty-printing (spec §4.A "Pretty printing").
//!
//! The rest of the engine never calls this module on a hot path — it
//! exists purely to turn a `TypeId` into the string a diagnostic message
//! shows the user (spec §7: messages like `Consider using "Sequence"
//! instead`), so it is the one place in `pytc-solver` that resolves
//! `Atom`s back to strings via a `pytc_common::Interner` rather than
//! working with bare handles.
//!
//! Two knobs the spec calls out explicitly:
//! - `Union.of([X, None])` prints as `Optional[X]`, not `Union[X, None]`
//!   (spec §4.A, tested by scenario S3).
//! - "Two alternative types with the same short name must be printed by
//!   their fully-qualified name" — `format_type` always checks short-name
//!   collisions across every `Instance`/`TypeVar`-like name it encounters
//!   before deciding whether any individual name needs qualifying.

use crate::intern::TypeInterner;
use crate::type_info::TypeInfoArena;
use crate::types::{LiteralValue, TupleItem, TypeId, TypeKey};
use pytc_common::Interner;
use rustc_hash::{FxHashMap, FxHashSet};

/// Formats `t` in the engine's canonical short form, qualifying any
/// `Instance` whose short class name collides with another `Instance` of a
/// different module reachable from the same type.
#[must_use]
pub fn format_type(interner: &TypeInterner, type_infos: &TypeInfoArena, strings: &Interner, t: TypeId) -> String {
    let mut short_names: FxHashMap<&str, FxHashSet<&str>> = FxHashMap::default();
    collect_instance_names(interner, type_infos, strings, t, &mut short_names);
    let ambiguous: FxHashSet<&str> =
        short_names.into_iter().filter(|(_, modules)| modules.len() > 1).map(|(name, _)| name).collect();
    render(interner, type_infos, strings, t, &ambiguous)
}

fn collect_instance_names<'a>(
    interner: &TypeInterner,
    type_infos: &TypeInfoArena,
    strings: &'a Interner,
    t: TypeId,
    out: &mut FxHashMap<&'a str, FxHashSet<&'a str>>,
) {
    match interner.resolve(t) {
        TypeKey::Instance { type_info, args } => {
            let info = type_infos.get(*type_info);
            out.entry(strings.resolve(info.name)).or_default().insert(strings.resolve(info.module));
            for &arg in args {
                collect_instance_names(interner, type_infos, strings, arg, out);
            }
        }
        TypeKey::TypeType(inner) | TypeKey::Unpack(inner) => {
            collect_instance_names(interner, type_infos, strings, *inner, out);
        }
        TypeKey::Union(items) | TypeKey::Overloaded(items) => {
            for &item in items {
                collect_instance_names(interner, type_infos, strings, item, out);
            }
        }
        TypeKey::Tuple { items, .. } => {
            for item in items {
                let inner = match item {
                    TupleItem::Plain(id) | TupleItem::Unpack(id) => *id,
                };
                collect_instance_names(interner, type_infos, strings, inner, out);
            }
        }
        TypeKey::Callable(data) => {
            for &arg in &data.arg_types {
                collect_instance_names(interner, type_infos, strings, arg, out);
            }
            collect_instance_names(interner, type_infos, strings, data.ret_type, out);
        }
        TypeKey::TypedDict { items, .. } => {
            for (_, value) in items {
                collect_instance_names(interner, type_infos, strings, *value, out);
            }
        }
        _ => {}
    }
}

fn render(interner: &TypeInterner, type_infos: &TypeInfoArena, strings: &Interner, t: TypeId, ambiguous: &FxHashSet<&str>) -> String {
    match interner.resolve(t) {
        TypeKey::Any(_) => "Any".to_string(),
        TypeKey::None => "None".to_string(),
        TypeKey::Uninhabited { is_noreturn } => {
            if *is_noreturn {
                "NoReturn".to_string()
            } else {
                "<nothing>".to_string()
            }
        }
        TypeKey::Deleted { .. } => "<deleted>".to_string(),
        TypeKey::Erased => "<erased>".to_string(),
        TypeKey::Partial { .. } => "<partial>".to_string(),
        TypeKey::Unbound { name, .. } => strings.resolve(*name).to_string(),
        TypeKey::Instance { type_info, args } => {
            let info = type_infos.get(*type_info);
            let short = strings.resolve(info.name);
            let name = if ambiguous.contains(short) {
                format!("{}.{}", strings.resolve(info.module), short)
            } else {
                short.to_string()
            };
            if args.is_empty() {
                name
            } else {
                let rendered: Vec<String> = args.iter().map(|&a| render(interner, type_infos, strings, a, ambiguous)).collect();
                format!("{name}[{}]", rendered.join(", "))
            }
        }
        TypeKey::TypeVar { name, .. } => strings.resolve(*name).to_string(),
        TypeKey::TypeVarTuple { name, .. } => format!("*{}", strings.resolve(*name)),
        TypeKey::ParamSpec { name, .. } => strings.resolve(*name).to_string(),
        TypeKey::Callable(data) => {
            if data.is_ellipsis_args {
                format!("Callable[..., {}]", render(interner, type_infos, strings, data.ret_type, ambiguous))
            } else {
                let args: Vec<String> =
                    data.arg_types.iter().map(|&a| render(interner, type_infos, strings, a, ambiguous)).collect();
                format!(
                    "Callable[[{}], {}]",
                    args.join(", "),
                    render(interner, type_infos, strings, data.ret_type, ambiguous)
                )
            }
        }
        TypeKey::Overloaded(items) => {
            let rendered: Vec<String> = items.iter().map(|&i| render(interner, type_infos, strings, i, ambiguous)).collect();
            format!("Overload[{}]", rendered.join(", "))
        }
        TypeKey::Tuple { items, .. } => {
            if items.len() == 1 {
                if let TupleItem::Unpack(inner) = items[0] {
                    if let Some(element) = homogeneous_tuple_element(interner, type_infos, inner) {
                        return format!("tuple[{}, ...]", render(interner, type_infos, strings, element, ambiguous));
                    }
                }
            }
            let rendered: Vec<String> = items
                .iter()
                .map(|item| match item {
                    TupleItem::Plain(id) => render(interner, type_infos, strings, *id, ambiguous),
                    TupleItem::Unpack(id) => format!("*{}", render(interner, type_infos, strings, *id, ambiguous)),
                })
                .collect();
            format!("tuple[{}]", rendered.join(", "))
        }
        TypeKey::TypedDict { items, .. } => {
            let rendered: Vec<String> = items
                .iter()
                .map(|(k, v)| format!("{:?}: {}", strings.resolve(*k), render(interner, type_infos, strings, *v, ambiguous)))
                .collect();
            format!("TypedDict({{{}}})", rendered.join(", "))
        }
        TypeKey::Literal { value, .. } => format!("Literal[{}]", render_literal(value, strings)),
        TypeKey::Union(items) => render_union(interner, type_infos, strings, items, ambiguous),
        TypeKey::TypeType(inner) => format!("type[{}]", render(interner, type_infos, strings, *inner, ambiguous)),
        TypeKey::Unpack(inner) => format!("*{}", render(interner, type_infos, strings, *inner, ambiguous)),
    }
}

/// Recognizes the TNF shape of a homogeneous variadic tuple
/// (`*tuple[T, ...]`, i.e. a single `Unpack` whose payload is the `tuple`
/// fallback instantiated with exactly one argument) so it prints with the
/// spec's "trailing `...`" shorthand instead of as a bare `Unpack`.
fn homogeneous_tuple_element(interner: &TypeInterner, type_infos: &TypeInfoArena, inner: TypeId) -> Option<TypeId> {
    let TypeKey::Instance { type_info, args } = interner.resolve(inner) else {
        return None;
    };
    let well_known = type_infos.well_known()?;
    if *type_info != well_known.tuple || args.len() != 1 {
        return None;
    }
    Some(args[0])
}

fn render_union(
    interner: &TypeInterner,
    type_infos: &TypeInfoArena,
    strings: &Interner,
    items: &[TypeId],
    ambiguous: &FxHashSet<&str>,
) -> String {
    let non_none: Vec<TypeId> = items.iter().copied().filter(|&i| i != TypeId::NONE).collect();
    if non_none.len() == 1 && non_none.len() + 1 == items.len() {
        return format!("Optional[{}]", render(interner, type_infos, strings, non_none[0], ambiguous));
    }
    let rendered: Vec<String> = items.iter().map(|&i| render(interner, type_infos, strings, i, ambiguous)).collect();
    format!("Union[{}]", rendered.join(", "))
}

fn render_literal(value: &LiteralValue, strings: &Interner) -> String {
    match value {
        LiteralValue::Int(v) => v.to_string(),
        LiteralValue::Str(atom) => format!("{:?}", strings.resolve(*atom)),
        LiteralValue::Bytes(atom) => format!("b{:?}", strings.resolve(*atom)),
        LiteralValue::Bool(v) => if *v { "True" } else { "False" }.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_info::{TypeInfo, WellKnownTypeInfo};
    use crate::types::Variance;

    struct Fixture {
        interner: TypeInterner,
        type_infos: TypeInfoArena,
        strings: Interner,
    }

    impl Fixture {
        fn new() -> Self {
            Self { interner: TypeInterner::new(), type_infos: TypeInfoArena::new(), strings: Interner::new() }
        }

        fn class(&mut self, module: &str, name: &str) -> TypeId {
            let module = self.strings.intern(module);
            let name = self.strings.intern(name);
            let id = self.type_infos.insert(TypeInfo {
                name,
                module,
                bases: Vec::new(),
                base_args: Vec::new(),
                mro: Vec::new(),
                is_protocol: false,
                is_abstract: false,
                fallback_to_any: false,
                promotion: None,
                type_params: Vec::new(),
                members: rustc_hash::FxHashMap::default(),
                self_type: TypeId::ANY,
            });
            self.interner.instance(id, Vec::new())
        }

        fn display(&mut self, t: TypeId) -> String {
            format_type(&self.interner, &self.type_infos, &self.strings, t)
        }
    }

    #[test]
    fn optional_shorthand_for_one_member_plus_none() {
        let mut f = Fixture::new();
        let x = f.class("builtins", "int");
        let u = f.interner.union(vec![x, TypeId::NONE]);
        assert_eq!(f.display(u), "Optional[int]");
    }

    #[test]
    fn three_member_union_prints_in_full() {
        let mut f = Fixture::new();
        let x = f.class("builtins", "int");
        let y = f.class("builtins", "str");
        let u = f.interner.union(vec![x, TypeId::NONE, y]);
        assert_eq!(f.display(u), "Union[int, None, str]");
    }

    #[test]
    fn any_prints_as_any() {
        let mut f = Fixture::new();
        assert_eq!(f.display(TypeId::ANY), "Any");
    }

    #[test]
    fn generic_instance_prints_bracketed_args() {
        let mut f = Fixture::new();
        let int_ty = f.class("builtins", "int");
        let list_info = f.type_infos.insert(TypeInfo {
            name: f.strings.intern("list"),
            module: f.strings.intern("builtins"),
            bases: Vec::new(),
            base_args: Vec::new(),
            mro: Vec::new(),
            is_protocol: false,
            is_abstract: false,
            fallback_to_any: false,
            promotion: None,
            type_params: vec![crate::type_info::TypeParamInfo { variance: Variance::Invariant, upper_bound: TypeId::ANY }],
            members: rustc_hash::FxHashMap::default(),
            self_type: TypeId::ANY,
        });
        let list_of_int = f.interner.instance(list_info, vec![int_ty]);
        assert_eq!(f.display(list_of_int), "list[int]");
    }

    #[test]
    fn colliding_short_names_are_qualified() {
        let mut f = Fixture::new();
        let a = f.class("pkg_a", "Widget");
        let b = f.class("pkg_b", "Widget");
        let u = f.interner.union(vec![a, b]);
        assert_eq!(f.display(u), "Union[pkg_a.Widget, pkg_b.Widget]");
    }

    #[test]
    fn homogeneous_tuple_prints_with_trailing_ellipsis() {
        let mut f = Fixture::new();
        let int_ty = f.class("builtins", "int");
        let tuple_info = f.type_infos.insert(TypeInfo {
            name: f.strings.intern("tuple"),
            module: f.strings.intern("builtins"),
            bases: Vec::new(),
            base_args: Vec::new(),
            mro: Vec::new(),
            is_protocol: false,
            is_abstract: false,
            fallback_to_any: false,
            promotion: None,
            type_params: vec![crate::type_info::TypeParamInfo { variance: Variance::Covariant, upper_bound: TypeId::ANY }],
            members: rustc_hash::FxHashMap::default(),
            self_type: TypeId::ANY,
        });
        f.type_infos.set_well_known(WellKnownTypeInfo {
            object: tuple_info,
            type_obj: tuple_info,
            tuple: tuple_info,
            function: tuple_info,
            bool_: tuple_info,
        });
        let homogeneous = f.interner.instance(tuple_info, vec![int_ty]);
        let t = f.interner.tuple(vec![TupleItem::Unpack(homogeneous)], TypeId::ANY);
        assert_eq!(f.display(t), "tuple[int, ...]");
    }

    #[test]
    fn callable_prints_arg_list_and_return() {
        let mut f = Fixture::new();
        let int_ty = f.class("builtins", "int");
        let str_ty = f.class("builtins", "str");
        let c = f.interner.simple_callable(vec![int_ty], vec![crate::types::Kind::Pos], str_ty, TypeId::OBJECT_FALLBACK);
        assert_eq!(f.display(c), "Callable[[int], str]");
    }
}
