//! String interning for identifier and literal deduplication.
//!
//! Class names, attribute names, and type-variable names recur constantly
//! across a single file's `Type` values — interning them once means every
//! later comparison is a `u32` equality check instead of a `String`
//! comparison, and every `Atom` is `Copy`.

use rustc_hash::FxHashMap;

/// An interned string handle. Cheap to copy, compare, and hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(u32);

impl Atom {
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// A simple, single-threaded string interner.
///
/// The core is single-threaded over one file at a time (spec §5), so this
/// does not need the sharding a multi-threaded driver would reach for.
#[derive(Debug, Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    lookup: FxHashMap<Box<str>, Atom>,
}

impl Interner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.lookup.get(s) {
            return atom;
        }
        let atom = Atom(u32::try_from(self.strings.len()).expect("interner overflow"));
        let boxed: Box<str> = s.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, atom);
        atom
    }

    #[must_use]
    pub fn resolve(&self, atom: Atom) -> &str {
        &self.strings[atom.0 as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// A concurrency-safe interner, used where a driver shares one instance
/// across multiple checking threads (e.g. across files). The core itself
/// never needs this — see spec §5 — but it is provided for drivers that
/// pre-populate well-known names (builtin class names, dunder method
/// names) once and then hand out read-only `Atom`s to many single-threaded
/// checking passes.
#[derive(Debug, Default)]
pub struct ShardedInterner {
    inner: std::sync::RwLock<Interner>,
}

impl ShardedInterner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, s: &str) -> Atom {
        if let Some(atom) = self.inner.read().unwrap().lookup.get(s) {
            return *atom;
        }
        self.inner.write().unwrap().intern(s)
    }

    pub fn resolve(&self, atom: Atom) -> String {
        self.inner.read().unwrap().resolve(atom).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_string_twice_yields_same_atom() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn interning_different_strings_yields_different_atoms() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_roundtrips() {
        let mut interner = Interner::new();
        let atom = interner.intern("hello");
        assert_eq!(interner.resolve(atom), "hello");
    }

    #[test]
    fn sharded_interner_dedups_across_reads() {
        let interner = ShardedInterner::new();
        let a = interner.intern("x");
        let b = interner.intern("x");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "x");
    }
}
