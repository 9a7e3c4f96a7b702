//! The constraint solver (spec §4.E `solve_constraints`).

use crate::constraints::{Constraint, ConstraintOp};
use crate::ctx::Ctx;
use crate::join::join_types;
use crate::meet::meet_types;
use crate::subtype::is_subtype;
use crate::types::{TypeId, VarId};
use rustc_hash::FxHashMap;

/// One inferred type per requested variable, or `None` when that variable
/// could not be solved (spec: "Unsolved variables are later replaced by
/// `Any` by inference with a diagnostic" — that replacement is inference's
/// job, not the solver's; the solver reports `None` honestly).
pub type Solution = FxHashMap<VarId, Option<TypeId>>;

/// Partitions `constraints` by variable, then for each variable in
/// `var_ids` takes `join(lower_bounds)` if any lower bound exists, else
/// `meet(upper_bounds)`, else leaves it unsolved. The candidate is
/// verified against every bound before being accepted.
#[must_use]
pub fn solve_constraints(ctx: &mut Ctx, var_ids: &[VarId], constraints: &[Constraint]) -> Solution {
    let mut lower_bounds: FxHashMap<VarId, Vec<TypeId>> = FxHashMap::default();
    let mut upper_bounds: FxHashMap<VarId, Vec<TypeId>> = FxHashMap::default();
    for c in constraints {
        match c.op {
            ConstraintOp::SupertypeOf => lower_bounds.entry(c.var).or_default().push(c.target),
            ConstraintOp::SubtypeOf => upper_bounds.entry(c.var).or_default().push(c.target),
        }
    }

    let mut solution = Solution::default();
    for &var in var_ids {
        let lowers = lower_bounds.get(&var).cloned().unwrap_or_default();
        let uppers = upper_bounds.get(&var).cloned().unwrap_or_default();
        let candidate = if !lowers.is_empty() {
            Some(lowers.iter().skip(1).fold(lowers[0], |acc, &t| join_types(ctx, acc, t)))
        } else if !uppers.is_empty() {
            Some(uppers.iter().skip(1).fold(uppers[0], |acc, &t| meet_types(ctx, acc, t)))
        } else {
            None
        };

        let accepted = match candidate {
            Some(candidate) => {
                let within_upper = uppers.iter().all(|&u| is_subtype(ctx, candidate, u));
                let within_lower = lowers.iter().all(|&l| is_subtype(ctx, l, candidate));
                if within_upper && within_lower { Some(candidate) } else { None }
            }
            None => None,
        };
        solution.insert(var, accepted);
    }
    solution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::TypeInterner;
    use crate::type_info::TypeInfoArena;
    use pytc_common::Options;

    #[test]
    fn single_lower_bound_solves_to_itself() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let v = VarId::new_meta(0);
        let constraints = vec![Constraint { var: v, op: ConstraintOp::SupertypeOf, target: TypeId::NONE }];
        let solution = solve_constraints(&mut ctx, &[v], &constraints);
        assert_eq!(solution.get(&v).copied().flatten(), Some(TypeId::NONE));
    }

    #[test]
    fn conflicting_bounds_are_unsolved() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let a = interner.literal_int(1, TypeId::OBJECT_FALLBACK);
        let b = interner.literal_int(2, TypeId::OBJECT_FALLBACK);
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let v = VarId::new_meta(0);
        let constraints = vec![
            Constraint { var: v, op: ConstraintOp::SupertypeOf, target: a },
            Constraint { var: v, op: ConstraintOp::SubtypeOf, target: b },
        ];
        let solution = solve_constraints(&mut ctx, &[v], &constraints);
        assert_eq!(solution.get(&v).copied().flatten(), None);
    }

    #[test]
    fn variable_with_no_constraints_is_unsolved() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let v = VarId::new_meta(0);
        let solution = solve_constraints(&mut ctx, &[v], &[]);
        assert_eq!(solution.get(&v).copied().flatten(), None);
    }
}
