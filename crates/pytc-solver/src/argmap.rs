//! Argument mapping (spec §4.G): binds actual call arguments to the
//! formal parameters of a callable.

use crate::types::{CallableData, Kind, TypeId, TypeKey};
use crate::intern::TypeInterner;

/// One entry per formal parameter, holding the indices of every actual
/// argument that binds it (usually 0 or 1; more than one only for
/// `STAR`/`STAR_STAR` formals).
pub type FormalToActual = Vec<Vec<usize>>;

#[derive(Debug)]
pub struct ArgMapError {
    pub message: String,
}

/// Maps `actual_kinds`/`actual_names` (processed left to right) onto
/// `callee`'s formal parameters.
pub fn map_actuals_to_formals(
    interner: &TypeInterner,
    actual_kinds: &[Kind],
    actual_names: &[Option<pytc_common::Atom>],
    actual_types: &[TypeId],
    callee: &CallableData,
) -> Result<FormalToActual, ArgMapError> {
    let n_formals = callee.arg_kinds.len();
    let mut formal_to_actual: FormalToActual = vec![Vec::new(); n_formals];
    let star_formal = callee.arg_kinds.iter().position(|k| *k == Kind::Star);
    let star_star_formal = callee.arg_kinds.iter().position(|k| *k == Kind::StarStar);
    let mut next_positional = 0usize;

    for (actual_index, &kind) in actual_kinds.iter().enumerate() {
        match kind {
            Kind::Pos | Kind::PosOpt => {
                // A `STAR` formal, once reached, absorbs every remaining
                // positional actual without `next_positional` advancing.
                if next_positional < n_formals && callee.arg_kinds[next_positional] == Kind::Star {
                    formal_to_actual[next_positional].push(actual_index);
                    continue;
                }
                while next_positional < n_formals
                    && !matches!(callee.arg_kinds[next_positional], Kind::Pos | Kind::PosOpt | Kind::Named | Kind::NamedOpt | Kind::Star)
                {
                    next_positional += 1;
                }
                match next_positional.cmp(&n_formals) {
                    std::cmp::Ordering::Less => {
                        formal_to_actual[next_positional].push(actual_index);
                        if callee.arg_kinds[next_positional] != Kind::Star {
                            next_positional += 1;
                        }
                    }
                    _ => match star_formal {
                        Some(star) => formal_to_actual[star].push(actual_index),
                        None => return Err(ArgMapError { message: "too many positional arguments".to_string() }),
                    },
                }
            }
            Kind::Star => {
                let arity = match interner.resolve(actual_types[actual_index]) {
                    TypeKey::Tuple { items, .. } if !items.iter().any(|i| matches!(i, crate::types::TupleItem::Unpack(_))) => {
                        Some(items.len())
                    }
                    _ => None,
                };
                if let Some(arity) = arity {
                    for _ in 0..arity {
                        while next_positional < n_formals && !callee.arg_kinds[next_positional].is_positional() {
                            next_positional += 1;
                        }
                        if next_positional < n_formals {
                            formal_to_actual[next_positional].push(actual_index);
                            if callee.arg_kinds[next_positional] != Kind::Star {
                                next_positional += 1;
                            }
                        } else if let Some(star) = star_formal {
                            formal_to_actual[star].push(actual_index);
                        }
                    }
                } else {
                    while next_positional < n_formals {
                        if Some(next_positional) == star_star_formal {
                            break;
                        }
                        formal_to_actual[next_positional].push(actual_index);
                        if callee.arg_kinds[next_positional] == Kind::Star {
                            next_positional += 1;
                            break;
                        }
                        next_positional += 1;
                    }
                }
            }
            Kind::Named | Kind::NamedOpt => {
                let name = actual_names.get(actual_index).copied().flatten();
                let found = name.and_then(|name| {
                    callee
                        .arg_names
                        .iter()
                        .position(|formal_name| *formal_name == Some(name))
                });
                match found {
                    Some(formal_index) => formal_to_actual[formal_index].push(actual_index),
                    None => match star_star_formal {
                        Some(ss) => formal_to_actual[ss].push(actual_index),
                        None => return Err(ArgMapError { message: "unexpected keyword argument".to_string() }),
                    },
                }
            }
            Kind::StarStar => {
                for (formal_index, formal_kind) in callee.arg_kinds.iter().enumerate() {
                    if formal_kind.is_named() || *formal_kind == Kind::StarStar {
                        formal_to_actual[formal_index].push(actual_index);
                    }
                }
            }
        }
    }

    check_argument_counts(callee, &formal_to_actual)?;
    Ok(formal_to_actual)
}

fn check_argument_counts(callee: &CallableData, formal_to_actual: &FormalToActual) -> Result<(), ArgMapError> {
    for (i, kind) in callee.arg_kinds.iter().enumerate() {
        let bound = formal_to_actual[i].len();
        let mandatory = matches!(kind, Kind::Pos | Kind::Named);
        if mandatory && bound != 1 {
            return Err(ArgMapError { message: format!("formal parameter {i} requires exactly one argument") });
        }
        if !kind.is_star() && bound > 1 {
            return Err(ArgMapError { message: format!("formal parameter {i} bound more than once") });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::TypeInterner;

    fn simple_callee(interner: &mut TypeInterner, kinds: Vec<Kind>) -> CallableData {
        let n = kinds.len();
        CallableData {
            arg_types: vec![TypeId::ANY; n],
            arg_kinds: kinds,
            arg_names: vec![None; n],
            ret_type: TypeId::NONE,
            fallback: TypeId::OBJECT_FALLBACK,
            variables: Vec::new(),
            is_ellipsis_args: false,
            special_sig: None,
            bound_args: Vec::new(),
            type_guard: None,
        }
    }

    #[test]
    fn positional_actuals_bind_positional_formals_in_order() {
        let mut interner = TypeInterner::new();
        let callee = simple_callee(&mut interner, vec![Kind::Pos, Kind::Pos]);
        let actual_kinds = vec![Kind::Pos, Kind::Pos];
        let actual_types = vec![TypeId::NONE, TypeId::NONE];
        let mapping = map_actuals_to_formals(&interner, &actual_kinds, &[None, None], &actual_types, &callee).unwrap();
        assert_eq!(mapping, vec![vec![0], vec![1]]);
    }

    #[test]
    fn missing_mandatory_argument_is_an_error() {
        let mut interner = TypeInterner::new();
        let callee = simple_callee(&mut interner, vec![Kind::Pos, Kind::Pos]);
        let actual_kinds = vec![Kind::Pos];
        let actual_types = vec![TypeId::NONE];
        assert!(map_actuals_to_formals(&interner, &actual_kinds, &[None], &actual_types, &callee).is_err());
    }

    #[test]
    fn named_actual_binds_by_name() {
        let mut interner = TypeInterner::new();
        let mut callee = simple_callee(&mut interner, vec![Kind::Named, Kind::Named]);
        let mut strings = pytc_common::Interner::new();
        let x = strings.intern("x");
        let y = strings.intern("y");
        callee.arg_names = vec![Some(x), Some(y)];
        let actual_kinds = vec![Kind::Named, Kind::Named];
        let actual_names = vec![Some(y), Some(x)];
        let actual_types = vec![TypeId::NONE, TypeId::NONE];
        let mapping = map_actuals_to_formals(&interner, &actual_kinds, &actual_names, &actual_types, &callee).unwrap();
        assert_eq!(mapping, vec![vec![1], vec![0]]);
    }
}
