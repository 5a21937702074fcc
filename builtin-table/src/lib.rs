//!
//! builtin-table - Builtin Function Table for the Cranelift Backend
//!
//! Decides, per target, how each compiler builtin is lowered and keeps the
//! callable created for it:
//!
//! - entry: one builtin, its lowering strategy and its callable cache
//! - registry: the name-indexed table and its one-time population
//! - types: source scalar types and overload families in Cranelift terms
//! - libfuncs / intrinsics: the runtime-library and intrinsic catalogues
//! - expand: inline expansions emitted at the call site
//! - callable / lower: materializing callables and lowering calls
//! - config / target: target selection from TOML or a triple
//!
//! Entry points:
//! - `BuiltinRegistry::register_all`: populate the table for a target
//! - `BuiltinRegistry::lookup`: find a builtin by source name
//! - `lower_builtin_call`: emit a call site
//!

pub mod callable;
pub mod config;
pub mod entry;
pub mod error;
pub mod expand;
pub mod intrinsics;
pub mod libfuncs;
pub mod lower;
pub mod registry;
pub mod target;
pub mod types;

pub use callable::{CallableFactory, ModuleCallables};
pub use config::{BuiltinConfig, ConfigError};
pub use entry::{BuiltinEntry, BuiltinKind, BuiltinStrategy, InlineExpander};
pub use error::BuiltinError;
pub use expand::BlockBuilder;
pub use intrinsics::IntrinsicId;
pub use libfuncs::{LibFunc, LibFuncClass, LibFuncStatus, TargetLibraryInfo};
pub use lower::{lower_builtin_call, resolve_overload};
pub use registry::{BuiltinId, BuiltinRegistry};
pub use target::TargetConfig;
pub use types::{OverloadFamily, SignatureTypes, SourceType, TypeManager};
