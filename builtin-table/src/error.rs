//!
//! Builtin Lowering Errors
//!
//! Recoverable failures raised while lowering a call to a builtin. Lookup
//! misses are not errors (lookup returns `None`), and broken registry
//! invariants panic instead of surfacing here.
//!

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum BuiltinError {
    #[error("builtin `{name}` is not available on target {target}")]
    #[diagnostic(
        code(builtin::unavailable),
        help("the runtime library for this target does not provide `{symbol}`")
    )]
    UnavailableOnTarget {
        name: String,
        symbol: String,
        target: String,
    },

    #[error("builtin `{name}` expects {expected} argument(s), found {found}")]
    #[diagnostic(code(builtin::arity))]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {index} of builtin `{name}` has type {found}, expected {expected}")]
    #[diagnostic(code(builtin::argument_type))]
    ArgumentType {
        name: String,
        index: usize,
        expected: String,
        found: String,
    },

    #[error("no overload of builtin `{name}` accepts {found}")]
    #[diagnostic(code(builtin::overload), help("available overloads: {candidates}"))]
    NoMatchingOverload {
        name: String,
        found: String,
        candidates: String,
    },

    #[error("argument {index} of builtin `{name}` must be the constant {expected}")]
    #[diagnostic(code(builtin::constant))]
    ConstantArgument {
        name: String,
        index: usize,
        expected: i64,
    },

    #[error("cannot expand builtin `{name}`: the builder has no current block")]
    #[diagnostic(code(builtin::no_block))]
    NoInsertionBlock { name: String },

    #[error("module rejected `{symbol}`: {source}")]
    #[diagnostic(code(builtin::module))]
    Module {
        symbol: String,
        #[source]
        source: cranelift_module::ModuleError,
    },

    #[error("{0}")]
    #[diagnostic(code(builtin::codegen))]
    Codegen(String),

    #[error("failed to create ISA for {target}: {reason}")]
    #[diagnostic(code(builtin::isa))]
    Isa { target: String, reason: String },
}

/// Turns a panic raised by Cranelift while defining `func_name` into an
/// error message a compiler user can act on.
pub fn convert_cranelift_error(panic_msg: &str, func_name: &str) -> BuiltinError {
    if panic_msg.contains("signature") {
        BuiltinError::Codegen(format!(
            "Signature mismatch in builtin wrapper '{}': the intrinsic was instantiated with incompatible types.",
            func_name
        ))
    } else {
        BuiltinError::Codegen(format!(
            "Compilation error in builtin wrapper '{}': {}",
            func_name, panic_msg
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_panic_is_rewritten() {
        let err = convert_cranelift_error("signature mismatch in call", "intrinsic.sqrt.f64");
        let msg = err.to_string();
        assert!(msg.contains("intrinsic.sqrt.f64"));
        assert!(msg.contains("Signature mismatch"));
    }

    #[test]
    fn test_unknown_panic_keeps_message() {
        let err = convert_cranelift_error("unsupported type f128", "intrinsic.sqrt.f128");
        assert!(err.to_string().contains("unsupported type f128"));
    }

    #[test]
    fn test_other_panics_are_compilation_errors() {
        let err = convert_cranelift_error("block0 is not sealed", "intrinsic.clz.i8");
        let msg = err.to_string();
        assert!(msg.starts_with("Compilation error in builtin wrapper 'intrinsic.clz.i8'"));
        assert!(msg.contains("block0 is not sealed"));
    }

    #[test]
    fn test_unavailable_has_diagnostic_code() {
        let err = BuiltinError::UnavailableOnTarget {
            name: "__builtin_sin".to_string(),
            symbol: "sin".to_string(),
            target: "wasm32-unknown-unknown".to_string(),
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("builtin::unavailable"));
        assert!(err.to_string().contains("wasm32-unknown-unknown"));
    }
}
