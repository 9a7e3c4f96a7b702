//! Literal expression fingerprints (spec §3.3 "`LiteralKey`").
//!
//! Two AST nodes that denote the same run-time storage location — `x`,
//! `x.a`, `x.a[0]` — must share one binder entry no matter how many times
//! the expression checker re-visits the syntax tree. The pre-resolved AST
//! (out of scope for this crate, spec §1) is expected to hand the binder
//! an already-canonicalized [`LiteralKey`] per expression rather than a
//! raw AST node; this mirrors mypy's `Expression.literal_hash`, computed
//! once during semantic analysis and reused here.

use pytc_common::Atom;
use smallvec::{smallvec, SmallVec};

/// One component of a dotted/indexed access chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// A bound local, module, or parameter name.
    Name(Atom),
    /// `.attr`
    Attr(Atom),
    /// `[<literal index>]` — only constant-index subscripts produce a
    /// stable fingerprint; a dynamic subscript has no `LiteralKey` at all
    /// (spec: "if expr has a literal key"; an expression without one is
    /// simply never tracked by the binder).
    Index(i64),
}

/// The canonical fingerprint of an expression, e.g. `x.a[0]` (spec
/// glossary: "Literal key"). Two expressions with equal `LiteralKey`s
/// share a binder entry and dependency record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LiteralKey(SmallVec<[KeyPart; 4]>);

impl LiteralKey {
    #[must_use]
    pub fn name(root: Atom) -> Self {
        Self(smallvec![KeyPart::Name(root)])
    }

    /// Extends `self` with one more access step, e.g. `key.attr(a)` turns
    /// the key for `x` into the key for `x.a`.
    #[must_use]
    pub fn extend(&self, part: KeyPart) -> Self {
        let mut parts = self.0.clone();
        parts.push(part);
        Self(parts)
    }

    /// Every strict prefix of `self`, shortest first — used to build the
    /// `x -> {x.a, x.a.b}` dependency records (spec §4.H "dependencies
    /// map").
    #[must_use]
    pub fn prefixes(&self) -> Vec<LiteralKey> {
        (1..self.0.len()).map(|n| LiteralKey(self.0[..n].iter().copied().collect())).collect()
    }

    #[must_use]
    pub fn root(&self) -> Option<&KeyPart> {
        self.0.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(n: u32) -> Atom {
        // Atom has no public constructor outside pytc-common's interner;
        // tests only need distinct, comparable handles.
        let mut interner = pytc_common::Interner::new();
        for i in 0..=n {
            interner.intern(&format!("a{i}"));
        }
        interner.intern(&format!("a{n}"))
    }

    #[test]
    fn prefixes_are_shortest_first() {
        let x = LiteralKey::name(atom(0));
        let xa = x.extend(KeyPart::Attr(atom(1)));
        let xab = xa.extend(KeyPart::Attr(atom(2)));
        let prefixes = xab.prefixes();
        assert_eq!(prefixes, vec![x, xa]);
    }

    #[test]
    fn distinct_chains_are_distinct_keys() {
        let x = LiteralKey::name(atom(0));
        let xa = x.extend(KeyPart::Attr(atom(1)));
        let xb = x.extend(KeyPart::Attr(atom(2)));
        assert_ne!(xa, xb);
    }
}
