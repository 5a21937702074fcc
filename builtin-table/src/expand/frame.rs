//!
//! Frame introspection builtins. Only the innermost frame (level 0) can be
//! expressed with Cranelift's frame instructions, and those are only
//! meaningful when frame pointers are preserved.
//!

use cranelift::prelude::*;

use super::BlockBuilder;
use crate::error::BuiltinError;
use crate::types::TypeManager;

fn require_level_zero(
    name: &str,
    args: &[Value],
    builder: &BlockBuilder<'_, '_>,
) -> Result<(), BuiltinError> {
    match builder.constant(args[0]) {
        Some(0) => Ok(()),
        _ => Err(BuiltinError::ConstantArgument {
            name: name.to_string(),
            index: 0,
            expected: 0,
        }),
    }
}

/// `__builtin_return_address(0)`
pub fn expand_return_address(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    require_level_zero("__builtin_return_address", args, builder)?;
    Ok(Some(builder.ins().get_return_address(backend.pointer_type())))
}

/// `__builtin_frame_address(0)`
pub fn expand_frame_address(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    require_level_zero("__builtin_frame_address", args, builder)?;
    Ok(Some(builder.ins().get_frame_pointer(backend.pointer_type())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::test_support::*;

    #[test]
    fn test_level_zero_expands() {
        let mut func = function_with_params(&[]);
        let mut fctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(&mut func, &mut fctx);
        entry_block(&mut builder);
        let backend = TypeManager::host();

        let level = builder.ins().iconst(types::I32, 0);
        let mut scope = BlockBuilder::new(&mut builder, "__builtin_return_address").unwrap();
        let addr = expand_return_address(&[level], &mut scope, &backend)
            .unwrap()
            .unwrap();
        assert_eq!(scope.value_type(addr), backend.pointer_type());
        assert_eq!(scope.emitted_count(), 1);
    }

    #[test]
    fn test_outer_frames_rejected() {
        let mut func = function_with_params(&[types::I32]);
        let mut fctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(&mut func, &mut fctx);
        let (_, params) = entry_block(&mut builder);
        let backend = TypeManager::host();

        let one = builder.ins().iconst(types::I32, 1);
        let mut scope = BlockBuilder::new(&mut builder, "__builtin_frame_address").unwrap();
        for level in [one, params[0]] {
            let err = expand_frame_address(&[level], &mut scope, &backend).unwrap_err();
            assert!(matches!(err, BuiltinError::ConstantArgument { expected: 0, .. }));
        }
        assert_eq!(scope.emitted_count(), 0);
    }
}
