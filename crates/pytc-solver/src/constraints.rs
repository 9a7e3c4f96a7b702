//! Constraint generation (spec §4.E): given a `template` containing type
//! variables and a concrete `actual`, emit `(var, op, target)` triples
//! whose solution makes `template <direction> actual` hold.

use crate::ctx::Ctx;
use crate::tnf::TupleNormalForm;
use crate::types::{TypeId, TypeKey, VarId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintOp {
    /// `var <: target`
    SubtypeOf,
    /// `var :> target`
    SupertypeOf,
}

impl ConstraintOp {
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            ConstraintOp::SubtypeOf => ConstraintOp::SupertypeOf,
            ConstraintOp::SupertypeOf => ConstraintOp::SubtypeOf,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    SubtypeOf,
    SupertypeOf,
}

impl Direction {
    const fn as_op(self) -> ConstraintOp {
        match self {
            Direction::SubtypeOf => ConstraintOp::SubtypeOf,
            Direction::SupertypeOf => ConstraintOp::SupertypeOf,
        }
    }

    const fn flip(self) -> Self {
        match self {
            Direction::SubtypeOf => Direction::SupertypeOf,
            Direction::SupertypeOf => Direction::SubtypeOf,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub var: VarId,
    pub op: ConstraintOp,
    pub target: TypeId,
}

/// Generates constraints such that substituting the solution into
/// `template` makes `template <direction> actual` (spec §4.E).
pub fn infer_constraints(ctx: &mut Ctx, template: TypeId, actual: TypeId, direction: Direction) -> Vec<Constraint> {
    let mut out = Vec::new();
    infer_constraints_into(ctx, template, actual, direction, &mut out);
    out
}

fn infer_constraints_into(ctx: &mut Ctx, template: TypeId, actual: TypeId, direction: Direction, out: &mut Vec<Constraint>) {
    if matches!(ctx.interner.resolve(actual), TypeKey::Any(_)) {
        collect_template_vars(ctx, template, out, direction);
        return;
    }
    let template_key = ctx.interner.resolve(template).clone();
    match template_key {
        TypeKey::TypeVar { id, .. } | TypeKey::TypeVarTuple { id, .. } | TypeKey::ParamSpec { id, .. } => {
            out.push(Constraint { var: id, op: direction.as_op(), target: actual });
        }
        TypeKey::Instance { type_info: ti, args: targs } => {
            infer_instance_constraints(ctx, ti, &targs, actual, direction, out);
        }
        TypeKey::Callable(template_data) => {
            if let TypeKey::Callable(actual_data) = ctx.interner.resolve(actual).clone() {
                let len = template_data.arg_types.len().min(actual_data.arg_types.len());
                for i in 0..len {
                    // Arguments are contravariant: negate direction.
                    infer_constraints_into(ctx, template_data.arg_types[i], actual_data.arg_types[i], direction.flip(), out);
                }
                infer_constraints_into(ctx, template_data.ret_type, actual_data.ret_type, direction, out);
            }
        }
        TypeKey::Tuple { items: template_items, .. } => {
            if let TypeKey::Tuple { items: actual_items, .. } = ctx.interner.resolve(actual).clone() {
                if template_items.len() == actual_items.len() {
                    for (l, r) in template_items.iter().zip(actual_items.iter()) {
                        infer_constraints_into(ctx, tuple_item_id(l), tuple_item_id(r), direction, out);
                    }
                } else {
                    infer_variadic_tuple_constraints(ctx, &template_items, actual, direction, out);
                }
            }
        }
        TypeKey::Union(template_items) => {
            for &member in &template_items {
                infer_constraints_into(ctx, member, actual, direction, out);
            }
        }
        TypeKey::TypeType(inner) => {
            if let TypeKey::TypeType(actual_inner) = ctx.interner.resolve(actual).clone() {
                infer_constraints_into(ctx, inner, actual_inner, direction, out);
            }
        }
        _ => {}
    }
}

fn tuple_item_id(item: &crate::types::TupleItem) -> TypeId {
    match *item {
        crate::types::TupleItem::Plain(id) | crate::types::TupleItem::Unpack(id) => id,
    }
}

fn infer_instance_constraints(
    ctx: &mut Ctx,
    template_info: crate::type_info::TypeInfoId,
    template_args: &[TypeId],
    actual: TypeId,
    direction: Direction,
    out: &mut Vec<Constraint>,
) {
    let TypeKey::Instance { type_info: actual_info, args: actual_args } = ctx.interner.resolve(actual).clone() else {
        return;
    };
    let (sub_info, sub_args, super_info, super_args) = match direction {
        Direction::SupertypeOf => (actual_info, actual_args, template_info, template_args.to_vec()),
        Direction::SubtypeOf => (template_info, template_args.to_vec(), actual_info, actual_args),
    };
    if !ctx.type_infos.is_subclass(sub_info, super_info) {
        return;
    }
    let Some(mapped) = crate::subtype::map_instance_to_supertype(ctx, sub_info, &sub_args, super_info) else {
        return;
    };
    // Use `super_args` (whichever side is the template) paired against
    // `mapped` (the instantiation of the template's class in the
    // actual's hierarchy). Emit both the constraint and its negation —
    // the solver filters the spurious half by the class's declared
    // variance (spec: "emit both the constraint and its negation").
    for (&template_side, &actual_side) in super_args.iter().zip(mapped.iter()) {
        infer_constraints_into(ctx, template_side, actual_side, direction, out);
        infer_constraints_into(ctx, template_side, actual_side, direction.flip(), out);
    }
}

fn infer_variadic_tuple_constraints(
    ctx: &mut Ctx,
    template_items: &[crate::types::TupleItem],
    actual: TypeId,
    direction: Direction,
    out: &mut Vec<Constraint>,
) {
    let template_tnf = TupleNormalForm::from_items(ctx, template_items.to_vec());
    let actual_tnf = match ctx.interner.resolve(actual).clone() {
        TypeKey::Tuple { items, .. } => TupleNormalForm::from_items(ctx, items),
        _ => return,
    };
    for (l, r) in template_tnf.prefix.iter().zip(actual_tnf.prefix.iter()) {
        infer_constraints_into(ctx, *l, *r, direction, out);
    }
    for (l, r) in template_tnf.suffix.iter().rev().zip(actual_tnf.suffix.iter().rev()) {
        infer_constraints_into(ctx, *l, *r, direction, out);
    }
    if let (Some(var), Some(actual_var)) = (template_tnf.variadic, actual_tnf.variadic) {
        infer_constraints_into(ctx, var, actual_var, direction, out);
    }
}

/// When `actual` is `Any`, every free variable in `template` is tied to
/// `Any` in both directions (spec: "emit trivial constraints").
fn collect_template_vars(ctx: &mut Ctx, template: TypeId, out: &mut Vec<Constraint>, direction: Direction) {
    let any = TypeId::ANY;
    match ctx.interner.resolve(template).clone() {
        TypeKey::TypeVar { id, .. } | TypeKey::TypeVarTuple { id, .. } | TypeKey::ParamSpec { id, .. } => {
            out.push(Constraint { var: id, op: direction.as_op(), target: any });
            out.push(Constraint { var: id, op: direction.flip().as_op(), target: any });
        }
        TypeKey::Instance { args, .. } => {
            for &a in &args {
                collect_template_vars(ctx, a, out, direction);
            }
        }
        TypeKey::Callable(data) => {
            for &a in &data.arg_types {
                collect_template_vars(ctx, a, out, direction);
            }
            collect_template_vars(ctx, data.ret_type, out, direction);
        }
        TypeKey::Tuple { items, .. } => {
            for item in &items {
                collect_template_vars(ctx, tuple_item_id(item), out, direction);
            }
        }
        TypeKey::Union(items) => {
            for &m in &items {
                collect_template_vars(ctx, m, out, direction);
            }
        }
        TypeKey::TypeType(inner) => collect_template_vars(ctx, inner, out, direction),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::TypeInterner;
    use crate::type_info::TypeInfoArena;
    use crate::types::Variance;
    use pytc_common::Options;

    #[test]
    fn typevar_template_against_concrete_actual_yields_one_constraint() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let mut strings = pytc_common::Interner::new();
        let name = strings.intern("T");
        let id = VarId::new_meta(0);
        let t = interner.type_var(id, name, vec![], TypeId::OBJECT_FALLBACK, Variance::Invariant);
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let constraints = infer_constraints(&mut ctx, t, TypeId::NONE, Direction::SupertypeOf);
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].var, id);
        assert_eq!(constraints[0].op, ConstraintOp::SupertypeOf);
        assert_eq!(constraints[0].target, TypeId::NONE);
    }

    #[test]
    fn any_actual_produces_bidirectional_constraints() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let mut strings = pytc_common::Interner::new();
        let name = strings.intern("T");
        let id = VarId::new_meta(0);
        let t = interner.type_var(id, name, vec![], TypeId::OBJECT_FALLBACK, Variance::Invariant);
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let constraints = infer_constraints(&mut ctx, t, TypeId::ANY, Direction::SupertypeOf);
        assert_eq!(constraints.len(), 2);
    }
}
