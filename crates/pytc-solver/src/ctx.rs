//! The shared context threaded through every algorithm in this crate.
//!
//! Rather than each of subtype/join/meet/constraints/inference taking its
//! own ad hoc bundle of `&mut TypeInterner` plus `&TypeInfoArena` plus
//! `&Options`, they all borrow one [`Ctx`]. This is the `Options`-bag
//! design note from spec §9 carried all the way through: nothing in this
//! crate reads a global, every call site receives its configuration
//! explicitly.

use crate::intern::TypeInterner;
use crate::type_info::TypeInfoArena;
use pytc_common::Options;

pub struct Ctx<'a> {
    pub interner: &'a mut TypeInterner,
    pub type_infos: &'a TypeInfoArena,
    pub options: &'a Options,
}

impl<'a> Ctx<'a> {
    pub fn new(interner: &'a mut TypeInterner, type_infos: &'a TypeInfoArena, options: &'a Options) -> Self {
        Self { interner, type_infos, options }
    }

    /// Re-borrows with a shorter lifetime — needed whenever a recursive
    /// call site wants to hand the context down without moving it.
    pub fn reborrow(&mut self) -> Ctx<'_> {
        Ctx {
            interner: self.interner,
            type_infos: self.type_infos,
            options: self.options,
        }
    }
}
