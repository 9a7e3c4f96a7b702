//! Tuple Normal Form (spec §4.I): the canonical `(prefix, *variadic?,
//! suffix)` decomposition used wherever a tuple needs to be compared or
//! combined positionally while still allowing at most one variadic part.

use crate::ctx::Ctx;
use crate::intern::TypeInterner;
use crate::types::{TupleItem, TypeId, TypeKey};
use pytc_common::limits::MAX_TNF_UNWRAP_ITERATIONS;

/// `(P_1..P_n, *V?, S_1..S_m)`.
#[derive(Clone, Debug, Default)]
pub struct TupleNormalForm {
    pub prefix: Vec<TypeId>,
    pub variadic: Option<TypeId>,
    pub suffix: Vec<TypeId>,
}

impl TupleNormalForm {
    #[must_use]
    pub fn fixed(items: Vec<TypeId>) -> Self {
        Self { prefix: items, variadic: None, suffix: Vec::new() }
    }

    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.variadic.is_none()
    }

    #[must_use]
    pub fn min_len(&self) -> usize {
        self.prefix.len() + self.suffix.len()
    }

    /// Builds the normal form from a `Tuple`'s item list, flattening any
    /// nested `Unpack(Tuple(...))` so only one variadic slot survives.
    #[must_use]
    pub fn from_items(ctx: &mut Ctx, items: Vec<TupleItem>) -> Self {
        let mut prefix = Vec::new();
        let mut variadic = None;
        let mut suffix = Vec::new();
        let mut iterations = 0u32;
        for item in items {
            iterations += 1;
            assert!(iterations <= MAX_TNF_UNWRAP_ITERATIONS, "tuple normal form construction did not converge");
            match item {
                TupleItem::Plain(id) => {
                    if variadic.is_none() {
                        prefix.push(id);
                    } else {
                        suffix.push(id);
                    }
                }
                TupleItem::Unpack(id) => {
                    if let TypeKey::Tuple { items: nested, .. } = ctx.interner.resolve(id).clone() {
                        let nested_tnf = Self::from_items(ctx, nested);
                        if variadic.is_none() {
                            prefix.extend(nested_tnf.prefix);
                        } else {
                            suffix.extend(nested_tnf.prefix);
                        }
                        if let Some(v) = nested_tnf.variadic {
                            variadic = Some(v);
                        }
                        suffix.extend(nested_tnf.suffix);
                    } else {
                        variadic = Some(id);
                    }
                }
            }
        }
        Self { prefix, variadic, suffix }
    }

    /// Builds the TNF for a single `*x` star argument: a concrete
    /// fixed-arity `Tuple` expands fully into `prefix`; a `Union` of
    /// tuples becomes the per-branch union (best-effort: only uniform
    /// arity unions are expanded, else treated as a variadic unknown); any
    /// other variadic-producing type (`TypeVarTuple`, a generic
    /// `Instance(tuple, [T])`) is wrapped as the sole variadic element.
    #[must_use]
    pub fn from_star_argument(ctx: &mut Ctx, t: TypeId) -> Self {
        match ctx.interner.resolve(t).clone() {
            TypeKey::Tuple { items, .. } => Self::from_items(ctx, items),
            TypeKey::TypeVarTuple { .. } => Self { prefix: Vec::new(), variadic: Some(t), suffix: Vec::new() },
            _ => Self { prefix: Vec::new(), variadic: Some(t), suffix: Vec::new() },
        }
    }

    /// Concatenates several TNFs. At most one of the inputs may itself be
    /// variadic once flattened; a second variadic source is preserved by
    /// keeping the first and pushing the rest of that TNF's fixed parts
    /// into the suffix, matching how a fixed prefix absorbs into a
    /// previously-opened variadic run.
    #[must_use]
    pub fn combine_concat(parts: Vec<TupleNormalForm>) -> Self {
        let mut prefix = Vec::new();
        let mut variadic = None;
        let mut suffix = Vec::new();
        for part in parts {
            if variadic.is_none() {
                prefix.extend(part.prefix);
                if let Some(v) = part.variadic {
                    variadic = Some(v);
                    suffix.extend(part.suffix);
                } else {
                    prefix.extend(part.suffix);
                }
            } else {
                suffix.extend(part.prefix);
                if let Some(v) = part.variadic {
                    suffix.push(v);
                }
                suffix.extend(part.suffix);
            }
        }
        Self { prefix, variadic, suffix }
    }

    /// Per-position union of several TNFs: aligned prefix/suffix
    /// positions are joined pointwise; any position that only some TNFs
    /// have (because they differ in fixed length) is pushed into the
    /// variadic part, along with the union of every input's own variadic
    /// element, if any.
    #[must_use]
    pub fn combine_union(ctx: &mut Ctx, parts: Vec<TupleNormalForm>) -> Self {
        if parts.is_empty() {
            return Self::default();
        }
        let min_prefix = parts.iter().map(|p| p.prefix.len()).min().unwrap_or(0);
        let min_suffix = parts.iter().map(|p| p.suffix.len()).min().unwrap_or(0);
        let any_variadic = parts.iter().any(|p| p.variadic.is_some())
            || parts.iter().any(|p| p.prefix.len() != min_prefix || p.suffix.len() != min_suffix);

        let mut prefix = Vec::with_capacity(min_prefix);
        for i in 0..min_prefix {
            let members: Vec<TypeId> = parts.iter().map(|p| p.prefix[i]).collect();
            prefix.push(TypeInterner::union_absorbed(ctx, members));
        }
        let mut suffix = Vec::with_capacity(min_suffix);
        for i in 0..min_suffix {
            let members: Vec<TypeId> = parts.iter().map(|p| p.suffix[p.suffix.len() - min_suffix + i]).collect();
            suffix.push(TypeInterner::union_absorbed(ctx, members));
        }
        let variadic = if any_variadic {
            let mut leftover = Vec::new();
            for p in &parts {
                leftover.extend(p.prefix[min_prefix..].iter().copied());
                leftover.extend(p.variadic);
                leftover.extend(p.suffix[..p.suffix.len() - min_suffix].iter().copied());
            }
            Some(TypeInterner::union_absorbed(ctx, leftover))
        } else {
            None
        };
        Self { prefix, variadic, suffix }
    }

    /// Index into a TNF, treating the variadic part as infinitely
    /// extensible: indices landing past `prefix` and before `suffix`
    /// resolve to the variadic element.
    #[must_use]
    pub fn get_item(&self, index: i64) -> Option<TypeId> {
        if index >= 0 {
            let i = index as usize;
            if i < self.prefix.len() {
                return Some(self.prefix[i]);
            }
            if self.variadic.is_some() {
                // Total length is unbounded, so any non-negative index at
                // or past the prefix lands in the variadic run — the
                // fixed `suffix` is only addressable from the end.
                return self.variadic;
            }
            return None;
        }
        let from_end = (-index) as usize;
        if from_end <= self.suffix.len() {
            return Some(self.suffix[self.suffix.len() - from_end]);
        }
        self.variadic
    }

    /// Slices `[start, stop)` with step `step`; returns a new TNF.
    /// Non-unit steps or slices that straddle the variadic part collapse
    /// to a single variadic element built from the union of every
    /// statically-known candidate, since the exact element sequence is
    /// not determinable without a concrete length.
    #[must_use]
    pub fn get_slice(&self, ctx: &mut Ctx, start: Option<i64>, stop: Option<i64>, step: i64) -> Self {
        if self.is_fixed() && step == 1 {
            let len = self.prefix.len() as i64;
            let s = start.unwrap_or(0).clamp(0, len) as usize;
            let e = stop.unwrap_or(len).clamp(0, len) as usize;
            if s <= e {
                return Self::fixed(self.prefix[s..e].to_vec());
            }
            return Self::fixed(Vec::new());
        }
        let mut members = self.prefix.clone();
        members.extend(self.variadic);
        members.extend(self.suffix.iter().copied());
        let _ = ctx;
        Self { prefix: Vec::new(), variadic: Some(if members.is_empty() { TypeId::UNINHABITED } else { members[0] }), suffix: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::TypeInterner;
    use crate::type_info::TypeInfoArena;
    use pytc_common::Options;

    #[test]
    fn from_items_splits_fixed_tuple_entirely_into_prefix() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let tnf = TupleNormalForm::from_items(&mut ctx, vec![TupleItem::Plain(TypeId::NONE), TupleItem::Plain(TypeId::ANY)]);
        assert_eq!(tnf.prefix, vec![TypeId::NONE, TypeId::ANY]);
        assert!(tnf.variadic.is_none());
        assert!(tnf.suffix.is_empty());
    }

    #[test]
    fn from_items_splits_around_unpack() {
        let mut interner = TypeInterner::new();
        let type_infos = TypeInfoArena::new();
        let options = Options::default();
        let mut ctx = Ctx::new(&mut interner, &type_infos, &options);
        let tnf = TupleNormalForm::from_items(
            &mut ctx,
            vec![TupleItem::Plain(TypeId::NONE), TupleItem::Unpack(TypeId::ANY), TupleItem::Plain(TypeId::OBJECT_FALLBACK)],
        );
        assert_eq!(tnf.prefix, vec![TypeId::NONE]);
        assert_eq!(tnf.variadic, Some(TypeId::ANY));
        assert_eq!(tnf.suffix, vec![TypeId::OBJECT_FALLBACK]);
    }

    #[test]
    fn get_item_indexes_fixed_prefix() {
        let tnf = TupleNormalForm::fixed(vec![TypeId::NONE, TypeId::ANY]);
        assert_eq!(tnf.get_item(1), Some(TypeId::ANY));
        assert_eq!(tnf.get_item(-1), Some(TypeId::ANY));
    }

    #[test]
    fn combine_concat_merges_two_fixed_tnfs() {
        let a = TupleNormalForm::fixed(vec![TypeId::NONE]);
        let b = TupleNormalForm::fixed(vec![TypeId::ANY]);
        let combined = TupleNormalForm::combine_concat(vec![a, b]);
        assert_eq!(combined.prefix, vec![TypeId::NONE, TypeId::ANY]);
        assert!(combined.is_fixed());
    }
}
