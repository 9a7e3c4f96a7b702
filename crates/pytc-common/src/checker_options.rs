//! Checking options for the type-checking engine.
//!
//! This module lives in `pytc-common` so that the solver and the binder can
//! both reference `Options` without creating a circular dependency between
//! them. Every operation that branches on a global mode threads this value
//! explicitly rather than reading a module-level flag (see the "Global
//! mutable state" note in DESIGN.md).

/// Target interpreter version. Some annotation syntax (e.g. `X | Y` union
/// shorthand, the builtin generic syntax `list[int]` instead of
/// `List[int]`) requires a minimum version; bumping this does not change
/// the algebra of the Type IR, only which surface syntax a prior resolution
/// stage was allowed to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct PythonVersion {
    pub major: u8,
    pub minor: u8,
}

impl PythonVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// The version this engine assumes when none is configured.
    pub const DEFAULT: PythonVersion = PythonVersion::new(3, 9);
}

/// Collapses the source checker's three-valued "full / weak / none" typing
/// mode ternary into a two-valued enum. The third state ("no type checking
/// at all for this file") is not a checking *strictness* at all — it is
/// handled by `Options::no_type_checking`, a separate flag the driver
/// consults before ever invoking the core. See DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypingMode {
    /// Ordinary type checking: declared types are enforced, inference
    /// failures are diagnostics.
    #[default]
    Full,
    /// Weak typing: an unannotated function body is checked as if every
    /// local had type `Any`. Used for gradually migrating untyped code.
    Weak,
}

/// Options recognised by the core (see spec §6 "External Interfaces").
///
/// This is the single source of truth for any behavior that would otherwise
/// be read off a global flag. Every call site that needs one of these values
/// receives `&Options` explicitly.
#[derive(Debug, Clone)]
pub struct Options {
    /// Enables `strict_optional` semantics: `None` is not an implicit member
    /// of every type, and a union must mention `None` explicitly for a
    /// value to be allowed to be `None`. When disabled (legacy mode), `None`
    /// is compatible with every type except other singleton types.
    pub strict_optional: bool,
    /// Target interpreter version; gates surface syntax upstream of the
    /// core and selects which synthesized dunder methods (e.g. `__or__` for
    /// the `X | Y` union shorthand) a `TypeInfo` is expected to expose.
    pub python_version: PythonVersion,
    /// When true, an inferred or declared `Any` arising from a missing
    /// annotation is itself a diagnostic ("implicit Any"), rather than
    /// silently accepted.
    pub disallow_any: bool,
    /// When true, a function declared to return a concrete type whose body
    /// actually returns `Any` is diagnosed ("returning Any from function
    /// declared to return T").
    pub warn_return_any: bool,
    /// When true, a cast to a type that the source expression is already
    /// known to be a subtype of is diagnosed as redundant.
    pub warn_redundant_casts: bool,
    /// When true, `None`-related subtype violations are reported with
    /// their own diagnostic code instead of being folded into the generic
    /// "incompatible types" message.
    pub show_none_errors: bool,
    /// When true, only `bool` itself (not arbitrary truthy/falsy objects)
    /// is accepted where a boolean is required for control flow.
    pub strict_boolean: bool,
    /// The full/weak typing mode (see `TypingMode`).
    pub typing_mode: TypingMode,
    /// When true, the driver has decided this file opts out of checking
    /// entirely (the legacy third state of the typing-mode ternary). The
    /// core is not invoked when this is set; it exists on `Options` only so
    /// a single value can be threaded down from configuration to the
    /// point where that decision is made.
    pub no_type_checking: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            strict_optional: true,
            python_version: PythonVersion::DEFAULT,
            disallow_any: false,
            warn_return_any: false,
            warn_redundant_casts: false,
            show_none_errors: true,
            strict_boolean: false,
            typing_mode: TypingMode::Full,
            no_type_checking: false,
        }
    }
}

impl Options {
    /// Apply the bundle of flags implied by a top-level "strict" mode,
    /// mirroring the way `--strict` expands to its constituent flags rather
    /// than being a single runtime-checked bit. OR's in rather than
    /// overwriting, so flags explicitly set before calling this are not
    /// weakened.
    pub fn apply_strict_defaults(mut self) -> Self {
        self.strict_optional = true;
        self.disallow_any = true;
        self.warn_return_any = true;
        self.warn_redundant_casts = true;
        self.show_none_errors = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_defaults_do_not_touch_python_version() {
        let opts = Options {
            python_version: PythonVersion::new(3, 12),
            ..Options::default()
        }
        .apply_strict_defaults();
        assert_eq!(opts.python_version, PythonVersion::new(3, 12));
        assert!(opts.disallow_any);
    }

    #[test]
    fn default_is_strict_optional() {
        assert!(Options::default().strict_optional);
    }
}
