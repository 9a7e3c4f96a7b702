//! The enclosing-scope stack (spec §4.J): which module, class, and
//! function currently enclose the expression being checked.
//!
//! Grounded on mypy's `checker.py` `TypeChecker.push_function`/
//! `enter_partial_types`-adjacent scope bookkeeping (the `scope.py`
//! `CheckerScope` class) — a small stack of frames, each either a class or
//! a function, consulted by inference to find the free type variables of
//! an enclosing generic class and by override checks to resolve `Self`.

use pytc_solver::{TypeInfoArena, TypeInfoId, TypeId};

#[derive(Clone, Copy, Debug)]
enum ScopeFrame {
    Class(TypeInfoId),
    Function(TypeInfoId),
}

/// Stack of enclosing definitions. One `Scope` is built per file and
/// pushed/popped as the checker descends into class and function bodies;
/// unlike [`crate::state::BinderState`] it is not reset per function, since
/// resolving `active_self_type` inside a nested method needs to see the
/// enclosing class's frame too.
#[derive(Debug, Default)]
pub struct Scope {
    frames: Vec<ScopeFrame>,
}

/// RAII guard returned by [`Scope::push_class`]/[`Scope::push_function`];
/// popping happens on drop so a checker that returns early (via `?`) can't
/// forget to unwind the stack.
#[must_use]
pub struct ScopeGuard<'a> {
    scope: &'a mut Scope,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.scope.frames.pop();
    }
}

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a class frame, returning a guard that pops it when dropped.
    pub fn push_class(&mut self, class: TypeInfoId) -> ScopeGuard<'_> {
        self.frames.push(ScopeFrame::Class(class));
        ScopeGuard { scope: self }
    }

    /// Pushes a function frame, returning a guard that pops it when
    /// dropped.
    pub fn push_function(&mut self, function: TypeInfoId) -> ScopeGuard<'_> {
        self.frames.push(ScopeFrame::Function(function));
        ScopeGuard { scope: self }
    }

    /// The innermost enclosing function, if any frame on the stack is one.
    #[must_use]
    pub fn top_function(&self) -> Option<TypeInfoId> {
        self.frames.iter().rev().find_map(|f| match f {
            ScopeFrame::Function(id) => Some(*id),
            ScopeFrame::Class(_) => None,
        })
    }

    /// The class whose body is directly being checked (the innermost
    /// frame, if it is a class) — distinct from [`Scope::enclosing_class`],
    /// which also sees through an intervening function (a method's class).
    #[must_use]
    pub fn active_class(&self) -> Option<TypeInfoId> {
        match self.frames.last()? {
            ScopeFrame::Class(id) => Some(*id),
            ScopeFrame::Function(_) => None,
        }
    }

    /// The nearest class anywhere on the stack, looking through any
    /// enclosing function frames (e.g. while checking a method body).
    #[must_use]
    pub fn enclosing_class(&self) -> Option<TypeInfoId> {
        self.frames.iter().rev().find_map(|f| match f {
            ScopeFrame::Class(id) => Some(*id),
            ScopeFrame::Function(_) => None,
        })
    }

    /// The `Self` instance of the active class, with its own type
    /// parameters filled in as themselves — i.e. the class's precomputed
    /// `TypeInfo::self_type`.
    #[must_use]
    pub fn active_self_type(&self, type_infos: &TypeInfoArena) -> Option<TypeId> {
        let class = self.enclosing_class()?;
        Some(type_infos.get(class).self_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pytc_common::Interner;
    use pytc_solver::{TypeInfo, TypeInterner};

    fn make_class(infos: &mut TypeInfoArena, interner: &mut TypeInterner, strings: &mut Interner, name: &str) -> TypeInfoId {
        let module = strings.intern("m");
        let class_name = strings.intern(name);
        let id = infos.insert(TypeInfo {
            name: class_name,
            module,
            bases: vec![],
            base_args: vec![],
            mro: vec![],
            is_protocol: false,
            is_abstract: false,
            fallback_to_any: false,
            promotion: None,
            type_params: vec![],
            members: Default::default(),
            self_type: TypeId::ERROR,
        });
        let self_ty = interner.instance(id, vec![]);
        // `TypeInfoArena` has no update-in-place, so the test class's
        // `self_type` field stays `ERROR`; `self_ty` only demonstrates the
        // constructor a real driver would use before inserting.
        let _ = self_ty;
        id
    }

    #[test]
    fn active_self_type_resolves_through_an_enclosing_method() {
        let mut interner = TypeInterner::new();
        let mut infos = TypeInfoArena::new();
        let mut strings = Interner::new();
        let class = make_class(&mut infos, &mut interner, &mut strings, "C");
        let method = make_class(&mut infos, &mut interner, &mut strings, "C.method");

        let mut scope = Scope::new();
        let _class_guard = scope.push_class(class);
        {
            let _fn_guard = scope.push_function(method);
            assert_eq!(scope.top_function(), Some(method));
            assert_eq!(scope.active_class(), None);
            assert_eq!(scope.enclosing_class(), Some(class));
            assert_eq!(scope.active_self_type(&infos), Some(infos.get(class).self_type));
        }
        assert_eq!(scope.top_function(), None);
        assert_eq!(scope.active_class(), Some(class));
    }

    #[test]
    fn guards_pop_on_drop_even_on_early_return() {
        let mut interner = TypeInterner::new();
        let mut infos = TypeInfoArena::new();
        let mut strings = Interner::new();
        let class = make_class(&mut infos, &mut interner, &mut strings, "C");

        let mut scope = Scope::new();
        fn helper(scope: &mut Scope, class: TypeInfoId) -> Option<()> {
            let _guard = scope.push_class(class);
            None
        }
        helper(&mut scope, class);
        assert_eq!(scope.active_class(), None);
    }
}
