//!
//! Call Lowering
//!
//! Emits the code for one call to a builtin: a direct call to the entry's
//! callable, or the entry's inline expansion. Arguments arrive already
//! lowered to Cranelift values.
//!

use cranelift::prelude::*;

use crate::callable::CallableFactory;
use crate::entry::{BuiltinEntry, BuiltinKind};
use crate::error::BuiltinError;
use crate::expand::{BlockBuilder, check_args};
use crate::libfuncs::LibFuncStatus;
use crate::types::TypeManager;

/// Picks the member of an intrinsic's overload family matching `arg_type`.
pub fn resolve_overload(entry: &BuiltinEntry, arg_type: Type) -> Result<Type, BuiltinError> {
    if entry.signature_types().contains(&arg_type) {
        return Ok(arg_type);
    }
    let candidates = entry
        .signature_types()
        .iter()
        .map(|ty| ty.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(BuiltinError::NoMatchingOverload {
        name: entry.name().to_string(),
        found: arg_type.to_string(),
        candidates,
    })
}

fn check_call(
    entry: &BuiltinEntry,
    builder: &mut FunctionBuilder<'_>,
    args: &[Value],
    params: &[Type],
) -> Result<(), BuiltinError> {
    let scope = BlockBuilder::new(builder, entry.name())?;
    check_args(entry.name(), args, params, &scope)
}

/// Lowers a call to `entry` with `args` at the builder's current position.
/// Returns the result value, or `None` for builtins that produce none.
pub fn lower_builtin_call<F: CallableFactory + ?Sized>(
    entry: &BuiltinEntry,
    factory: &mut F,
    types: &TypeManager,
    builder: &mut FunctionBuilder<'_>,
    args: &[Value],
) -> Result<Option<Value>, BuiltinError> {
    tracing::trace!(builtin = entry.name(), strategy = %entry.strategy(), "lowering builtin call");

    let callable = match entry.kind() {
        BuiltinKind::Inlined(expander) => {
            let mut scope = BlockBuilder::new(builder, entry.name())?;
            check_args(entry.name(), args, entry.signature_types(), &scope)?;
            let result = expander(args, &mut scope, types)?;
            tracing::trace!(
                builtin = entry.name(),
                block = %scope.block(),
                emitted = scope.emitted_count(),
                "expanded builtin inline"
            );
            return Ok(result);
        }
        BuiltinKind::LibraryCall(LibFuncStatus::Unavailable) => {
            return Err(BuiltinError::UnavailableOnTarget {
                name: entry.name().to_string(),
                symbol: entry.backend_symbol().to_string(),
                target: types.target().to_string(),
            });
        }
        BuiltinKind::LibraryCall(LibFuncStatus::Available(func)) => {
            check_call(entry, builder, args, entry.signature_types())?;
            entry.callable_or_create(|e| factory.declare_library_call(e, func))?
        }
        BuiltinKind::Intrinsic(id) => {
            let Some(first) = args.first() else {
                return Err(BuiltinError::ArgumentCount {
                    name: entry.name().to_string(),
                    expected: id.arity(),
                    found: 0,
                });
            };
            let ty = resolve_overload(entry, builder.func.dfg.value_type(*first))?;
            check_call(entry, builder, args, &vec![ty; id.arity()])?;
            if ty == types.long_double_type() && !types.target().long_double_is_binary128() {
                return Err(BuiltinError::UnavailableOnTarget {
                    name: entry.name().to_string(),
                    symbol: id.instance_symbol(ty),
                    target: types.target().to_string(),
                });
            }
            if entry.signature_types().len() == 1 {
                entry.callable_or_create(|e| factory.declare_intrinsic(e, id, ty))?
            } else {
                factory.declare_intrinsic(entry, id, ty)?
            }
        }
    };

    let func_ref = factory.import(callable, builder.func);
    let call = builder.ins().call(func_ref, args);
    Ok(builder.inst_results(call).first().copied())
}
