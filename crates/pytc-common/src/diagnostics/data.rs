//! Diagnostic message table for the core's own error kinds (spec §7).
//!
//! Unlike a full compiler's diagnostics table (typically auto-generated from
//! thousands of surface-syntax and emit messages), the core only ever raises
//! the handful of kinds it is itself responsible for: subtype violations,
//! inference failures, structural/protocol mismatches, narrowing
//! impossibilities, overload failures, and variadic-type misuse. Every other
//! diagnostic code belongs to the expression checker or driver layered on
//! top, which is out of scope here.

use super::super::diagnostics::{DiagnosticCategory, DiagnosticMessage};

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::INTERNAL_ERROR,
        category: DiagnosticCategory::Error,
        message: "internal error: {0}",
    },
    DiagnosticMessage {
        code: diagnostic_codes::ARG_TYPE_INCOMPATIBLE,
        category: DiagnosticCategory::Error,
        message: "Argument of type \"{0}\" cannot be assigned to parameter of type \"{1}\"",
    },
    DiagnosticMessage {
        code: diagnostic_codes::RETURN_TYPE_INCOMPATIBLE,
        category: DiagnosticCategory::Error,
        message: "Returning type \"{0}\" but expected type \"{1}\"",
    },
    DiagnosticMessage {
        code: diagnostic_codes::OVERRIDE_INCOMPATIBLE,
        category: DiagnosticCategory::Error,
        message: "Signature of \"{0}\" incompatible with supertype \"{1}\"",
    },
    DiagnosticMessage {
        code: diagnostic_codes::ASSIGNMENT_INCOMPATIBLE,
        category: DiagnosticCategory::Error,
        message: "Incompatible types in assignment (expression has type \"{0}\", variable has type \"{1}\")",
    },
    DiagnosticMessage {
        code: diagnostic_codes::CANNOT_DETERMINE_TYPE,
        category: DiagnosticCategory::Error,
        message: "Cannot determine type of \"{0}\"",
    },
    DiagnosticMessage {
        code: diagnostic_codes::NEED_TYPE_ANNOTATION,
        category: DiagnosticCategory::Error,
        message: "Need type annotation for \"{0}\"",
    },
    DiagnosticMessage {
        code: diagnostic_codes::COULD_NOT_INFER_TYPE_ARGS,
        category: DiagnosticCategory::Error,
        message: "Could not infer type argument for \"{0}\"",
    },
    DiagnosticMessage {
        code: diagnostic_codes::TYPEVAR_VALUE_RESTRICTION,
        category: DiagnosticCategory::Error,
        message: "Value of type variable \"{0}\" of \"{1}\" cannot be \"{2}\"",
    },
    DiagnosticMessage {
        code: diagnostic_codes::PROTOCOL_MEMBER_MISSING,
        category: DiagnosticCategory::Error,
        message: "\"{0}\" is missing member \"{1}\" required by protocol \"{2}\"",
    },
    DiagnosticMessage {
        code: diagnostic_codes::PROTOCOL_MEMBER_TYPE_CONFLICT,
        category: DiagnosticCategory::Error,
        message: "Protocol member \"{0}\" has incompatible type (expected \"{1}\", got \"{2}\")",
    },
    DiagnosticMessage {
        code: diagnostic_codes::PROTOCOL_MEMBER_FLAG_CONFLICT,
        category: DiagnosticCategory::Error,
        message: "Protocol member \"{0}\" has incompatible flags",
    },
    DiagnosticMessage {
        code: diagnostic_codes::BAD_PROTO_VARIANCE,
        category: DiagnosticCategory::Error,
        message: "Variance checks for protocol \"{0}\" are not fully supported and may be unsound",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNION_ATTR_NOT_FOUND,
        category: DiagnosticCategory::Error,
        message: "Item \"{0}\" of the union has no attribute \"{1}\"",
    },
    DiagnosticMessage {
        code: diagnostic_codes::NO_OVERLOAD_MATCHES,
        category: DiagnosticCategory::Error,
        message: "No overload variant of \"{0}\" matches argument types",
    },
    DiagnosticMessage {
        code: diagnostic_codes::OVERLOAD_SIGNATURES_OVERLAP,
        category: DiagnosticCategory::Error,
        message: "Overloaded function signatures {0} and {1} overlap with incompatible return types",
    },
    DiagnosticMessage {
        code: diagnostic_codes::TYPEVAR_AS_EXPRESSION,
        category: DiagnosticCategory::Error,
        message: "Type variable \"{0}\" cannot be used as an expression",
    },
    DiagnosticMessage {
        code: diagnostic_codes::TYPEVAR_BOUND_VIOLATION,
        category: DiagnosticCategory::Error,
        message: "Type variable \"{0}\" bound to \"{1}\", which is not a subtype of its upper bound \"{2}\"",
    },
];

pub mod diagnostic_codes {
    pub const INTERNAL_ERROR: u32 = 9000;
    pub const ARG_TYPE_INCOMPATIBLE: u32 = 9001;
    pub const RETURN_TYPE_INCOMPATIBLE: u32 = 9002;
    pub const OVERRIDE_INCOMPATIBLE: u32 = 9003;
    pub const ASSIGNMENT_INCOMPATIBLE: u32 = 9004;
    pub const CANNOT_DETERMINE_TYPE: u32 = 9005;
    pub const NEED_TYPE_ANNOTATION: u32 = 9006;
    pub const COULD_NOT_INFER_TYPE_ARGS: u32 = 9007;
    pub const TYPEVAR_VALUE_RESTRICTION: u32 = 9008;
    pub const PROTOCOL_MEMBER_MISSING: u32 = 9009;
    pub const PROTOCOL_MEMBER_TYPE_CONFLICT: u32 = 9010;
    pub const PROTOCOL_MEMBER_FLAG_CONFLICT: u32 = 9011;
    pub const BAD_PROTO_VARIANCE: u32 = 9012;
    pub const UNION_ATTR_NOT_FOUND: u32 = 9013;
    pub const NO_OVERLOAD_MATCHES: u32 = 9014;
    pub const OVERLOAD_SIGNATURES_OVERLAP: u32 = 9015;
    pub const TYPEVAR_AS_EXPRESSION: u32 = 9016;
    pub const TYPEVAR_BOUND_VIOLATION: u32 = 9017;
}
