//! `TypeChecker`, the composition root spec §6 calls the core's "external
//! interfaces": one struct owning the interner, the read-only `TypeInfo`
//! graph, the options bag, and the diagnostic sink, with thin delegating
//! methods onto `pytc-solver` and `pytc-binder`.
//!
//! Per spec §1, "the expression-level checker's per-AST-node recursion is
//! peripheral" — out of scope here. This crate does not walk statements or
//! drive control flow; an external expression checker does that, calling
//! back into the methods below (and into a per-function [`BinderState`]
//! and per-file [`Scope`] it constructs via [`TypeChecker::new_binder`] /
//! [`TypeChecker::scope_mut`]) the way mypy's `TypeChecker`/`ExpressionChecker`
//! pair calls into `subtypes.py`/`join.py`/`binder.py`.

use pytc_binder::{BoolExpr, Scope};
pub use pytc_binder::{BinderState, Frame, LiteralKey, TypeMap};
use pytc_common::diagnostics::diagnostic_codes;
pub use pytc_common::Interner;
use pytc_common::{Diagnostic, DiagnosticSink, Options};
pub use pytc_solver::{
    erase_type, is_subtype, join_types, meet_types, CallableData, Ctx, FormalToActual, InferenceDiagnostic, ProtocolViolation,
    Solution, Substitution, TypeId, TypeInfoArena, TypeInterner,
};
use pytc_solver::{argmap, format_type, inference, protocol_conformance, TypeInfoId};

/// Identity of one pre-resolved source file (spec §6: "consumes... the AST
/// with per-expression `literal_key` fingerprints and pre-resolved
/// `node`/`kind` fields"). The AST itself lives upstream of this crate;
/// only the identity needed to stamp diagnostics and to key a fresh
/// per-file [`Scope`] belongs here.
#[derive(Clone, Debug)]
pub struct PreResolvedFile {
    pub path: String,
}

/// The session `TypeChecker::check` hands back to the external driver: a
/// fresh [`Scope`] for this file plus the file identity diagnostics are
/// stamped with.
pub struct CheckSession {
    pub file: PreResolvedFile,
    pub scope: Scope,
}

/// The composition root: owns every piece of mutable/read-only state a
/// traversal of one file needs (spec §5 — single-threaded, one file at a
/// time), and exposes the operations spec §6 lists as the core's external
/// interface.
pub struct TypeChecker {
    pub interner: TypeInterner,
    pub type_infos: TypeInfoArena,
    pub options: Options,
    pub diagnostics: DiagnosticSink,
    /// The same string table the driver used to build `type_infos` and
    /// every `Atom` a `TypeVar`/class name carries — owned here (rather
    /// than re-created per call) so a diagnostic message can resolve a
    /// type to its display string without the caller threading one
    /// through every method (spec §4.A "Pretty printing").
    pub strings: Interner,
}

impl TypeChecker {
    #[must_use]
    pub fn new(type_infos: TypeInfoArena, options: Options, strings: Interner) -> Self {
        Self { interner: TypeInterner::new(), type_infos, options, diagnostics: DiagnosticSink::new(), strings }
    }

    /// Renders `t` in the engine's canonical short form (spec §4.A).
    #[must_use]
    pub fn display_type(&self, t: TypeId) -> String {
        format_type(&self.interner, &self.type_infos, &self.strings, t)
    }

    fn ctx(&mut self) -> Ctx<'_> {
        Ctx::new(&mut self.interner, &self.type_infos, &self.options)
    }

    /// `TypeChecker::check(file)` (spec §6): entry point for one
    /// pre-resolved file. Builds the fresh per-file [`Scope`] the driver
    /// will push/pop class and function frames on as it descends; the
    /// driver constructs one [`BinderState`] per function body it enters
    /// via [`TypeChecker::new_binder`].
    #[must_use]
    #[tracing::instrument(skip(self), fields(path = %file.path))]
    pub fn check(&mut self, file: PreResolvedFile) -> CheckSession {
        CheckSession { file, scope: Scope::new() }
    }

    /// `binder.push_frame(...)`-family delegation: constructs a fresh
    /// frame-stack for one function-body traversal (spec §5: "nested
    /// function traversals push an isolated stack").
    #[must_use]
    pub fn new_binder(&self) -> BinderState {
        BinderState::new()
    }

    /// `subtype(left, right[, options]) -> bool` (spec §6). The `options`
    /// argument mentioned in the spec is this checker's own `self.options`
    /// rather than a per-call override — every other operation here reads
    /// it the same way.
    #[must_use]
    pub fn subtype(&mut self, left: TypeId, right: TypeId) -> bool {
        is_subtype(&mut self.ctx(), left, right)
    }

    /// `join(a, b) -> Type` (spec §6).
    #[must_use]
    pub fn join(&mut self, a: TypeId, b: TypeId) -> TypeId {
        join_types(&mut self.ctx(), a, b)
    }

    /// `meet(a, b) -> Type` (spec §6).
    #[must_use]
    pub fn meet(&mut self, a: TypeId, b: TypeId) -> TypeId {
        meet_types(&mut self.ctx(), a, b)
    }

    /// `erase(t) -> Type` (spec §6).
    #[must_use]
    pub fn erase(&mut self, t: TypeId) -> TypeId {
        erase_type(&mut self.interner, t)
    }

    /// `expand(t, map) -> Type` (spec §6).
    #[must_use]
    pub fn expand(&mut self, t: TypeId, map: &Substitution) -> TypeId {
        pytc_solver::expand_type(&mut self.interner, t, map)
    }

    /// Maps call-site actuals to a callable's formals (spec §4.G), the
    /// step that precedes [`TypeChecker::infer_function_arguments`].
    pub fn map_actuals_to_formals(
        &self,
        actual_kinds: &[pytc_solver::Kind],
        actual_names: &[Option<pytc_common::Atom>],
        actual_types: &[TypeId],
        callee: &CallableData,
    ) -> Result<FormalToActual, pytc_solver::ArgMapError> {
        argmap::map_actuals_to_formals(&self.interner, actual_kinds, actual_names, actual_types, callee)
    }

    /// `infer_function_arguments(callee, actual_types, actual_kinds,
    /// formal_to_actual) -> [Type]` (spec §6). Diagnostics produced while
    /// solving are recorded on `self.diagnostics`, stamped against `file`.
    #[tracing::instrument(skip(self, callee, actual_types, formal_to_actual), fields(file))]
    pub fn infer_function_arguments(
        &mut self,
        file: &str,
        callee: &CallableData,
        actual_types: &[TypeId],
        formal_to_actual: &FormalToActual,
        context_return_type: Option<TypeId>,
    ) -> Vec<TypeId> {
        let mut diagnostics = Vec::new();
        let result = {
            let mut ctx = self.ctx();
            inference::infer_function_arguments(&mut ctx, callee, actual_types, formal_to_actual, context_return_type, &mut diagnostics)
        };
        for diagnostic in diagnostics {
            let record = self.inference_diagnostic_to_record(file, &diagnostic);
            self.diagnostics.push(record);
        }
        result
    }

    /// `apply_generic_arguments(callee, inferred, diagnostics) -> Callable`
    /// (spec §6).
    #[must_use]
    pub fn apply_generic_arguments(&mut self, callee: &CallableData, inferred: &[TypeId]) -> CallableData {
        inference::apply_generic_arguments(&mut self.ctx(), callee, inferred)
    }

    /// `find_isinstance_check(expr) -> (TypeMap, TypeMap)` (spec §6).
    #[must_use]
    pub fn find_isinstance_check(&mut self, expr: &BoolExpr) -> (TypeMap, TypeMap) {
        pytc_binder::find_isinstance_check(&mut self.ctx(), expr)
    }

    /// Structural protocol-conformance check (spec §4.C "Protocol
    /// structural check", spec §7's "protocol member missing/type
    /// conflict/flag conflict"). Records one diagnostic per violation on
    /// `self.diagnostics` and returns whether `left` conforms.
    #[must_use]
    pub fn check_protocol_conformance(
        &mut self,
        file: &str,
        left_info: TypeInfoId,
        left_args: &[TypeId],
        protocol_info: TypeInfoId,
        protocol_args: &[TypeId],
    ) -> bool {
        let violations = {
            let mut ctx = self.ctx();
            protocol_conformance(&mut ctx, left_info, left_args, protocol_info, protocol_args)
        };
        let conforms = violations.is_empty();
        for violation in &violations {
            let record = self.protocol_violation_to_record(file, left_info, protocol_info, violation);
            self.diagnostics.push(record);
        }
        conforms
    }

    fn protocol_violation_to_record(
        &self,
        file: &str,
        left_info: TypeInfoId,
        protocol_info: TypeInfoId,
        violation: &ProtocolViolation,
    ) -> Diagnostic {
        let left_name = self.strings.resolve(self.type_infos.get(left_info).name).to_string();
        let protocol_name = self.strings.resolve(self.type_infos.get(protocol_info).name).to_string();
        let (code, message_text) = match violation {
            ProtocolViolation::MissingMember(member) => (
                diagnostic_codes::PROTOCOL_MEMBER_MISSING,
                format!(
                    "\"{}\" is missing member \"{}\" required by protocol \"{}\"",
                    left_name,
                    self.strings.resolve(*member),
                    protocol_name
                ),
            ),
            ProtocolViolation::TypeConflict { member, expected, got } => (
                diagnostic_codes::PROTOCOL_MEMBER_TYPE_CONFLICT,
                format!(
                    "Protocol member \"{}\" has incompatible type (expected \"{}\", got \"{}\")",
                    self.strings.resolve(*member),
                    self.display_type(*expected),
                    self.display_type(*got)
                ),
            ),
            ProtocolViolation::FlagConflict(member) => (
                diagnostic_codes::PROTOCOL_MEMBER_FLAG_CONFLICT,
                format!("Protocol member \"{}\" has incompatible flags", self.strings.resolve(*member)),
            ),
        };
        Diagnostic::error(file, 0, 0, message_text, code)
    }

    /// Translates a solver-level [`InferenceDiagnostic`] (spec §4.F step 7-8)
    /// into the structured `(file, line, column, severity, code, message)`
    /// record spec §6/§7 describe, rendering every `TypeId` it mentions
    /// through [`TypeChecker::display_type`] rather than `Debug` formatting.
    fn inference_diagnostic_to_record(&self, file: &str, diagnostic: &InferenceDiagnostic) -> Diagnostic {
        let (code, message_text) = match diagnostic {
            InferenceDiagnostic::CouldNotInfer { var } => (
                diagnostic_codes::COULD_NOT_INFER_TYPE_ARGS,
                format!("could not infer type argument for {}", self.display_var(*var)),
            ),
            InferenceDiagnostic::ValueRestrictionViolated { var, solved } => (
                diagnostic_codes::TYPEVAR_VALUE_RESTRICTION,
                format!("value of type variable {} cannot be \"{}\"", self.display_var(*var), self.display_type(*solved)),
            ),
            InferenceDiagnostic::UpperBoundViolated { var, solved, upper_bound } => (
                diagnostic_codes::TYPEVAR_BOUND_VIOLATION,
                format!(
                    "type variable {} bound to \"{}\", which is not a subtype of its upper bound \"{}\"",
                    self.display_var(*var),
                    self.display_type(*solved),
                    self.display_type(*upper_bound),
                ),
            ),
        };
        Diagnostic::error(file, 0, 0, message_text, code)
    }

    /// Renders a bare `VarId` by recovering its declaration (if the
    /// interner still has one) and displaying its name; falls back to the
    /// raw id when the declaration is gone (e.g. a meta-variable created
    /// and erased entirely within one inference call).
    fn display_var(&self, var: pytc_solver::VarId) -> String {
        match self.interner.find_type_var_like_decl(var) {
            Some(decl) => self.display_type(decl),
            None => format!("{var:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> TypeChecker {
        TypeChecker::new(TypeInfoArena::new(), Options::default(), Interner::new())
    }

    #[test]
    fn check_returns_a_fresh_scope_per_file() {
        let mut checker = checker();
        let session = checker.check(PreResolvedFile { path: "m.py".to_string() });
        assert!(session.scope.active_class().is_none());
        assert_eq!(session.file.path, "m.py");
    }

    #[test]
    fn subtype_join_meet_delegate_to_the_solver() {
        let mut checker = checker();
        assert!(checker.subtype(TypeId::NONE, TypeId::ANY));
        assert_eq!(checker.join(TypeId::ANY, TypeId::NONE), TypeId::ANY);
        assert_eq!(checker.meet(TypeId::ANY, TypeId::NONE), TypeId::NONE);
    }

    #[test]
    fn erase_is_a_no_op_on_a_type_with_no_type_variables() {
        let mut checker = checker();
        assert_eq!(checker.erase(TypeId::OBJECT_FALLBACK), TypeId::OBJECT_FALLBACK);
    }

    #[test]
    fn check_protocol_conformance_reports_a_missing_member() {
        use pytc_solver::{MemberInfo, TypeInfo};

        let mut strings = Interner::new();
        let foo = strings.intern("foo");
        let p_name = strings.intern("P");
        let c_name = strings.intern("C");
        let module = strings.intern("m");

        let mut type_infos = TypeInfoArena::new();
        let mut p_members = rustc_hash::FxHashMap::default();
        p_members.insert(
            foo,
            MemberInfo {
                declared_type: TypeId::OBJECT_FALLBACK,
                is_method: false,
                is_classmethod: false,
                is_staticmethod: false,
                is_property: false,
                is_classvar: false,
                is_settable: true,
                is_abstract_declaration: true,
            },
        );
        let p_info = type_infos.insert(TypeInfo {
            name: p_name,
            module,
            bases: vec![],
            base_args: vec![],
            mro: vec![],
            is_protocol: true,
            is_abstract: false,
            fallback_to_any: false,
            promotion: None,
            type_params: vec![],
            members: p_members,
            self_type: TypeId::OBJECT_FALLBACK,
        });
        let c_info = type_infos.insert(TypeInfo {
            name: c_name,
            module,
            bases: vec![],
            base_args: vec![],
            mro: vec![],
            is_protocol: false,
            is_abstract: false,
            fallback_to_any: false,
            promotion: None,
            type_params: vec![],
            members: rustc_hash::FxHashMap::default(),
            self_type: TypeId::OBJECT_FALLBACK,
        });

        let mut checker = TypeChecker::new(type_infos, Options::default(), strings);
        let conforms = checker.check_protocol_conformance("m.py", c_info, &[], p_info, &[]);
        assert!(!conforms);
        assert_eq!(checker.diagnostics.diagnostics().len(), 1);
        assert_eq!(checker.diagnostics.diagnostics()[0].code, diagnostic_codes::PROTOCOL_MEMBER_MISSING);
    }

    #[test]
    fn display_type_renders_optional_shorthand() {
        let mut checker = checker();
        let optional_none = checker.interner.union(vec![TypeId::ANY, TypeId::NONE]);
        // A union with Any collapses to Any (spec §3.1), so this exercises
        // the plain Any rendering rather than Optional; Optional's own
        // rendering is covered directly in pytc_solver::display's tests,
        // which control class names `format_type` needs a `TypeInfo` for.
        assert_eq!(checker.display_type(optional_none), "Any");
    }
}
