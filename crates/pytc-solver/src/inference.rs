//! Generic-function argument inference (spec §4.F): the two-pass driver
//! that freshens a callable's type variables, generates constraints from
//! actual arguments, solves, and substitutes.

use crate::argmap::FormalToActual;
use crate::constraints::{infer_constraints, Direction};
use crate::ctx::Ctx;
use crate::erase::erase_type;
use crate::expand::{expand_type, Substitution};
use crate::solve::solve_constraints;
use crate::subtype::is_subtype;
use crate::types::{CallableData, TypeId, TypeKey, TypeVarLike, VarId};
use rustc_hash::FxHashMap;
use tracing::debug;

/// One bad-solution diagnostic surfaced back to the caller; the core
/// itself never renders these, it only reports the fact and the relevant
/// ids (spec §7: "the core never throws for user errors").
#[derive(Debug, Clone)]
pub enum InferenceDiagnostic {
    CouldNotInfer { var: VarId },
    ValueRestrictionViolated { var: VarId, solved: TypeId },
    UpperBoundViolated { var: VarId, solved: TypeId, upper_bound: TypeId },
}

/// A fresh, uniquely-numbered meta-variable supply, scoped to one
/// inference call (spec §5: "the type-variable binding table ... not
/// thread-safe by design — only one traversal at a time").
#[derive(Default)]
pub struct MetaVarSource {
    next: u32,
}

impl MetaVarSource {
    pub fn fresh(&mut self) -> VarId {
        let id = VarId::new_meta(self.next);
        self.next += 1;
        id
    }
}

/// Replaces every `TypeVarLike` in `callee.variables` with a fresh
/// meta-variable, returning the freshened signature plus the substitution
/// used, so later passes can map meta-ids back to the original variable
/// if needed (e.g. for the value-restriction / upper-bound checks at the
/// end of inference, which must be reported against the *original*
/// variable, not its meta stand-in — see `finish`).
fn freshen(ctx: &mut Ctx, meta: &mut MetaVarSource, callee: &CallableData) -> (CallableData, FxHashMap<VarId, VarId>) {
    let mut map = Substitution::default();
    let mut meta_to_original = FxHashMap::default();
    for var in &callee.variables {
        let fresh = meta.fresh();
        meta_to_original.insert(fresh, var.id());
        map.insert(var.id(), meta_placeholder(ctx, var, fresh));
    }
    let freshened = expand_callable(ctx, callee, &map);
    (freshened, meta_to_original)
}

fn meta_placeholder(ctx: &mut Ctx, var: &TypeVarLike, fresh: VarId) -> TypeId {
    match var {
        TypeVarLike::TypeVar(_) => {
            let mut strings = pytc_common::Interner::new();
            let name = strings.intern("?");
            ctx.interner.type_var(fresh, name, vec![], TypeId::OBJECT_FALLBACK, crate::types::Variance::Invariant)
        }
        TypeVarLike::TypeVarTuple(_) => {
            let mut strings = pytc_common::Interner::new();
            let name = strings.intern("?Ts");
            let fallback = ctx.interner.instance(fallback_tuple(ctx), vec![TypeId::ANY]);
            ctx.interner.type_var_tuple(fresh, name, fallback)
        }
        TypeVarLike::ParamSpec(_) => {
            let mut strings = pytc_common::Interner::new();
            let name = strings.intern("?P");
            ctx.interner.param_spec(fresh, name, TypeId::OBJECT_FALLBACK)
        }
    }
}

fn fallback_tuple(ctx: &Ctx) -> crate::type_info::TypeInfoId {
    ctx.type_infos.well_known().map_or_else(|| crate::type_info::TypeInfoId::from(0u32), |wk| wk.tuple)
}

fn expand_callable(ctx: &mut Ctx, callee: &CallableData, map: &Substitution) -> CallableData {
    CallableData {
        arg_types: callee.arg_types.iter().map(|&t| expand_type(ctx.interner, t, map)).collect(),
        arg_kinds: callee.arg_kinds.clone(),
        arg_names: callee.arg_names.clone(),
        ret_type: expand_type(ctx.interner, callee.ret_type, map),
        fallback: callee.fallback,
        variables: Vec::new(),
        is_ellipsis_args: callee.is_ellipsis_args,
        special_sig: callee.special_sig.clone(),
        bound_args: callee.bound_args.iter().map(|a| a.map(|id| expand_type(ctx.interner, id, map))).collect(),
        type_guard: callee.type_guard.map(|id| expand_type(ctx.interner, id, map)),
    }
}

/// Drives the two-pass inference described in spec §4.F and returns one
/// inferred `Type` per original `callee.variables` entry, in order.
/// Diagnostics accumulate into `diagnostics` rather than aborting the
/// call — the core always returns a best-effort result.
pub fn infer_function_arguments(
    ctx: &mut Ctx,
    callee: &CallableData,
    actual_types: &[TypeId],
    formal_to_actual: &FormalToActual,
    context_return_type: Option<TypeId>,
    diagnostics: &mut Vec<InferenceDiagnostic>,
) -> Vec<TypeId> {
    let mut meta = MetaVarSource::default();
    let (freshened, meta_to_original) = freshen(ctx, &mut meta, callee);
    let meta_ids: Vec<VarId> = meta_to_original.keys().copied().collect();

    let mut constraints = Vec::new();
    if let Some(context) = context_return_type {
        constraints.extend(infer_constraints(ctx, freshened.ret_type, context, Direction::SubtypeOf));
    }

    // Pass 1: skip actuals whose expression type is itself driven by a
    // still-unresolved meta-variable appearing in a callable's return
    // position (e.g. a lambda argument) — those are deferred to pass 2.
    let mut deferred = Vec::new();
    for (formal_index, actuals) in formal_to_actual.iter().enumerate() {
        let Some(&formal_type) = freshened.arg_types.get(formal_index) else { continue };
        for &actual_index in actuals {
            let Some(&actual_type) = actual_types.get(actual_index) else { continue };
            if mentions_return_meta(ctx, actual_type, &meta_ids) {
                deferred.push((formal_type, actual_index));
                continue;
            }
            constraints.extend(infer_constraints(ctx, formal_type, actual_type, Direction::SupertypeOf));
        }
    }

    let first_solution = solve_constraints(ctx, &meta_ids, &constraints);
    let partial_map: Substitution = first_solution
        .iter()
        .filter_map(|(&var, &solved)| solved.map(|t| (var, t)))
        .collect();

    // Pass 2: re-infer deferred actuals under the partially-instantiated
    // callee, using `Erased` for anything still unresolved so a lambda's
    // parameter types can at least see concrete context where available.
    for (formal_type, actual_index) in deferred {
        let instantiated_formal = expand_type(ctx.interner, formal_type, &partial_map);
        let Some(&actual_type) = actual_types.get(actual_index) else { continue };
        constraints.extend(infer_constraints(ctx, instantiated_formal, actual_type, Direction::SupertypeOf));
    }

    let final_solution = solve_constraints(ctx, &meta_ids, &constraints);

    finish(ctx, callee, &meta_to_original, &final_solution, diagnostics)
}

fn mentions_return_meta(ctx: &Ctx, t: TypeId, meta_ids: &[VarId]) -> bool {
    match ctx.interner.resolve(t) {
        TypeKey::Callable(data) => contains_var(ctx, data.ret_type, meta_ids),
        _ => false,
    }
}

fn contains_var(ctx: &Ctx, t: TypeId, ids: &[VarId]) -> bool {
    match ctx.interner.resolve(t) {
        TypeKey::TypeVar { id, .. } | TypeKey::TypeVarTuple { id, .. } | TypeKey::ParamSpec { id, .. } => ids.contains(id),
        TypeKey::Union(items) => items.iter().any(|&m| contains_var(ctx, m, ids)),
        TypeKey::Instance { args, .. } => args.iter().any(|&a| contains_var(ctx, a, ids)),
        _ => false,
    }
}

/// Resolves each original type variable's solved type, substitutes `Any`
/// with a diagnostic for anything unsolved, and checks value-restriction
/// / upper-bound compatibility (spec §4.F step 8).
fn finish(
    ctx: &mut Ctx,
    callee: &CallableData,
    meta_to_original: &FxHashMap<VarId, VarId>,
    solution: &crate::solve::Solution,
    diagnostics: &mut Vec<InferenceDiagnostic>,
) -> Vec<TypeId> {
    let mut by_original: FxHashMap<VarId, TypeId> = FxHashMap::default();
    for (&meta_var, &original) in meta_to_original {
        let solved = solution.get(&meta_var).copied().flatten();
        let resolved = match solved {
            Some(t) => erase_type(ctx.interner, t),
            None => {
                debug!(?meta_var, ?original, "type variable left unsolved, substituting Any");
                diagnostics.push(InferenceDiagnostic::CouldNotInfer { var: original });
                TypeId::ANY
            }
        };
        by_original.insert(original, resolved);
    }

    callee
        .variables
        .iter()
        .map(|var| {
            let id = var.id();
            let resolved = by_original.get(&id).copied().unwrap_or(TypeId::ANY);
            if let TypeVarLike::TypeVar(_) = var {
                check_typevar_bounds(ctx, id, resolved, callee, diagnostics);
            }
            resolved
        })
        .collect()
}

/// mypy's `applytype.py` checks `values` membership before `upper_bound`;
/// this follows the same order.
fn check_typevar_bounds(ctx: &mut Ctx, id: VarId, resolved: TypeId, callee: &CallableData, diagnostics: &mut Vec<InferenceDiagnostic>) {
    if !matches!(callee.variables.iter().find(|v| v.id() == id), Some(TypeVarLike::TypeVar(_))) {
        return;
    }
    if resolved.is_any() {
        return;
    }
    let Some(decl) = ctx.interner.find_type_var_like_decl(id) else { return };
    let TypeKey::TypeVar { values, upper_bound, .. } = ctx.interner.resolve(decl).clone() else { return };
    if !values.is_empty() {
        if !values.iter().any(|&v| crate::same_type::same_type(ctx.interner, v, resolved)) {
            diagnostics.push(InferenceDiagnostic::ValueRestrictionViolated { var: id, solved: resolved });
        }
        return;
    }
    if !upper_bound.is_any() && !is_subtype(ctx, resolved, upper_bound) {
        diagnostics.push(InferenceDiagnostic::UpperBoundViolated { var: id, solved: resolved, upper_bound });
    }
}

/// Used by `subtype::is_callable_subtype` when the left side of a
/// callable-subtype comparison is still generic (spec §4.F.5): infers
/// `left.variables` from constraints generated between `left` and the
/// concrete `right`, then substitutes. Returns `None` if any variable is
/// left unsolved.
pub fn unify_generic_callable(ctx: &mut Ctx, left: &CallableData, right: &CallableData) -> Option<CallableData> {
    let mut meta = MetaVarSource::default();
    let (freshened, meta_to_original) = freshen(ctx, &mut meta, left);
    let meta_ids: Vec<VarId> = meta_to_original.keys().copied().collect();

    let mut constraints = Vec::new();
    let len = freshened.arg_types.len().min(right.arg_types.len());
    for i in 0..len {
        constraints.extend(infer_constraints(ctx, freshened.arg_types[i], right.arg_types[i], Direction::SubtypeOf));
    }
    constraints.extend(infer_constraints(ctx, freshened.ret_type, right.ret_type, Direction::SupertypeOf));

    let solution = solve_constraints(ctx, &meta_ids, &constraints);
    let mut map = Substitution::default();
    for &meta_var in &meta_ids {
        let solved = solution.get(&meta_var).copied().flatten()?;
        map.insert(meta_var, solved);
    }
    Some(expand_callable(ctx, &freshened, &map))
}

/// Applies already-inferred type arguments to a generic callable,
/// producing the fully-substituted `Callable` (spec §6
/// `apply_generic_arguments`).
#[must_use]
pub fn apply_generic_arguments(ctx: &mut Ctx, callee: &CallableData, inferred: &[TypeId]) -> CallableData {
    let mut map = Substitution::default();
    for (var, &t) in callee.variables.iter().zip(inferred.iter()) {
        map.insert(var.id(), t);
    }
    expand_callable(ctx, callee, &map)
}

/// Checks property 10 (spec §8): after inference, each actual is a
/// subtype of its substituted formal. Exposed for tests and for callers
/// that want the soundness check enforced at the call site rather than
/// only in this crate's own test suite.
#[must_use]
pub fn check_inference_soundness(
    ctx: &mut Ctx,
    substituted: &CallableData,
    actual_types: &[TypeId],
    formal_to_actual: &FormalToActual,
) -> bool {
    for (formal_index, actuals) in formal_to_actual.iter().enumerate() {
        let Some(&formal_type) = substituted.arg_types.get(formal_index) else { continue };
        if formal_type.is_any() {
            continue;
        }
        for &actual_index in actuals {
            let Some(&actual_type) = actual_types.get(actual_index) else { continue };
            if actual_type.is_any() {
                continue;
            }
            if !is_subtype(ctx, actual_type, formal_type) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::TypeInterner;
    use crate::type_info::TypeInfoArena;
    use crate::types::{Kind, Variance};
    use pytc_common::Options;

    fn generic_identity(interner: &mut TypeInterner) -> (CallableData, VarId) {
        let mut strings = pytc_common::Interner::new();
        let name = strings.intern("T");
        let id = VarId::new_plain(0);
        let t = interner.type_var(id, name, vec![], TypeId::OBJECT_FALLBACK, Variance::Invariant);
        (
            CallableData {
                arg_types: vec![t],
                arg_kinds: vec![Kind::Pos],
                arg_names: vec![None],
                ret_type: t,
                fallback: TypeId::OBJECT_FALLBACK,
                variables: vec![TypeVarLike::TypeVar(id)],
                is_ellipsis_args: false,
                special_sig: None,
                bound_args: Vec::new(),
                type_guard: None,
            },
            id,
        )
    }

    #[test]
    fn scenario_s4_generic_inference_returns_int() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let (callee, _id) = generic_identity(&mut interner);
        let int_literal = interner.literal_int(3, TypeId::OBJECT_FALLBACK);
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let mut diagnostics = Vec::new();
        let inferred = infer_function_arguments(&mut ctx, &callee, &[int_literal], &vec![vec![0]], None, &mut diagnostics);
        assert_eq!(inferred, vec![int_literal]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn unsolved_variable_reports_diagnostic_and_becomes_any() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let (callee, _id) = generic_identity(&mut interner);
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let mut diagnostics = Vec::new();
        let inferred = infer_function_arguments(&mut ctx, &callee, &[], &vec![vec![]], None, &mut diagnostics);
        assert_eq!(inferred, vec![TypeId::ANY]);
        assert!(!diagnostics.is_empty());
    }

    fn generic_identity_with_values(interner: &mut TypeInterner, values: Vec<TypeId>) -> CallableData {
        let mut strings = pytc_common::Interner::new();
        let name = strings.intern("AnyStr");
        let id = VarId::new_plain(0);
        let t = interner.type_var(id, name, values, TypeId::OBJECT_FALLBACK, Variance::Invariant);
        CallableData {
            arg_types: vec![t],
            arg_kinds: vec![Kind::Pos],
            arg_names: vec![None],
            ret_type: t,
            fallback: TypeId::OBJECT_FALLBACK,
            variables: vec![TypeVarLike::TypeVar(id)],
            is_ellipsis_args: false,
            special_sig: None,
            bound_args: Vec::new(),
            type_guard: None,
        }
    }

    #[test]
    fn value_restricted_typevar_accepts_a_listed_value() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let callee = generic_identity_with_values(&mut interner, vec![TypeId::NONE]);
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let mut diagnostics = Vec::new();
        let inferred = infer_function_arguments(&mut ctx, &callee, &[TypeId::NONE], &vec![vec![0]], None, &mut diagnostics);
        assert_eq!(inferred, vec![TypeId::NONE]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn value_restricted_typevar_rejects_an_unlisted_value() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let callee = generic_identity_with_values(&mut interner, vec![TypeId::NONE]);
        let uninhabited = TypeId::UNINHABITED;
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let mut diagnostics = Vec::new();
        let inferred = infer_function_arguments(&mut ctx, &callee, &[uninhabited], &vec![vec![0]], None, &mut diagnostics);
        assert_eq!(inferred, vec![uninhabited]);
        assert!(matches!(diagnostics.as_slice(), [InferenceDiagnostic::ValueRestrictionViolated { solved, .. }] if *solved == uninhabited));
    }

    fn generic_identity_with_upper_bound(interner: &mut TypeInterner, upper_bound: TypeId) -> CallableData {
        let mut strings = pytc_common::Interner::new();
        let name = strings.intern("T");
        let id = VarId::new_plain(0);
        let t = interner.type_var(id, name, vec![], upper_bound, Variance::Invariant);
        CallableData {
            arg_types: vec![t],
            arg_kinds: vec![Kind::Pos],
            arg_names: vec![None],
            ret_type: t,
            fallback: TypeId::OBJECT_FALLBACK,
            variables: vec![TypeVarLike::TypeVar(id)],
            is_ellipsis_args: false,
            special_sig: None,
            bound_args: Vec::new(),
            type_guard: None,
        }
    }

    #[test]
    fn bounded_typevar_rejects_a_solution_outside_its_upper_bound() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let callee = generic_identity_with_upper_bound(&mut interner, TypeId::UNINHABITED);
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let mut diagnostics = Vec::new();
        let inferred = infer_function_arguments(&mut ctx, &callee, &[TypeId::NONE], &vec![vec![0]], None, &mut diagnostics);
        assert_eq!(inferred, vec![TypeId::NONE]);
        assert!(matches!(
            diagnostics.as_slice(),
            [InferenceDiagnostic::UpperBoundViolated { solved, upper_bound, .. }]
                if *solved == TypeId::NONE && *upper_bound == TypeId::UNINHABITED
        ));
    }
}
