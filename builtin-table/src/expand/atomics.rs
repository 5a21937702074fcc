//!
//! Atomic builtins expanded to Cranelift atomic instructions. All of them
//! are sequentially consistent; the operand width is taken from the value
//! argument, or from the loaded type for plain loads.
//!

use cranelift::prelude::*;
use cranelift_codegen::ir::AtomicRmwOp;

use super::BlockBuilder;
use crate::error::BuiltinError;
use crate::types::TypeManager;

fn rmw(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    op: AtomicRmwOp,
) -> Value {
    let ty = builder.value_type(args[1]);
    builder
        .ins()
        .atomic_rmw(ty, MemFlags::new(), op, args[0], args[1])
}

/// `(ptr, delta) -> old`
pub fn expand_fetch_and_add(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    _backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    Ok(Some(rmw(args, builder, AtomicRmwOp::Add)))
}

/// `(ptr, delta) -> new`
pub fn expand_xadd(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    _backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    let old = rmw(args, builder, AtomicRmwOp::Add);
    Ok(Some(builder.ins().iadd(old, args[1])))
}

/// `(ptr, new) -> old`
pub fn expand_xchg(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    _backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    Ok(Some(rmw(args, builder, AtomicRmwOp::Xchg)))
}

/// `(ptr, mask)`
pub fn expand_and(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    _backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    rmw(args, builder, AtomicRmwOp::And);
    Ok(None)
}

/// `(ptr, mask)`
pub fn expand_or(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    _backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    rmw(args, builder, AtomicRmwOp::Or);
    Ok(None)
}

/// `(ptr, expected, new) -> bool`, true when the swap happened.
pub fn expand_cas(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    _backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    let actual = builder
        .ins()
        .atomic_cas(MemFlags::new(), args[0], args[1], args[2]);
    Ok(Some(builder.ins().icmp(IntCC::Equal, actual, args[1])))
}

/// `(ptr, value)`
pub fn expand_store(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    _backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    builder
        .ins()
        .atomic_store(MemFlags::new(), args[1], args[0]);
    Ok(None)
}

fn load(args: &[Value], builder: &mut BlockBuilder<'_, '_>, ty: Type) -> Value {
    builder.ins().atomic_load(ty, MemFlags::new(), args[0])
}

/// `(ptr) -> u8`
pub fn expand_load8(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    _backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    Ok(Some(load(args, builder, types::I8)))
}

/// `(ptr) -> u32`
pub fn expand_load32(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    _backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    Ok(Some(load(args, builder, types::I32)))
}

/// `(ptr) -> u64`
pub fn expand_load64(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    _backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    Ok(Some(load(args, builder, types::I64)))
}

/// `(ptr) -> uintptr`
pub fn expand_load_ptr(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    Ok(Some(load(args, builder, backend.pointer_type())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::test_support::*;
    use cranelift_codegen::ir::Opcode;

    #[test]
    fn test_fetch_and_add_is_one_rmw() {
        let mut func = function_with_params(&[types::I64, types::I32]);
        let mut fctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(&mut func, &mut fctx);
        let (_, params) = entry_block(&mut builder);
        let backend = TypeManager::host();

        let mut scope = BlockBuilder::new(&mut builder, "__sync_fetch_and_add_4").unwrap();
        let old = expand_fetch_and_add(&params, &mut scope, &backend).unwrap().unwrap();
        assert_eq!(scope.value_type(old), types::I32);
        let emitted = scope.emitted();
        assert_eq!(emitted.len(), 1);
        drop(scope);
        assert_eq!(builder.func.dfg.insts[emitted[0]].opcode(), Opcode::AtomicRmw);
    }

    #[test]
    fn test_xadd_returns_new_value() {
        let mut func = function_with_params(&[types::I64, types::I64]);
        let mut fctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(&mut func, &mut fctx);
        let (_, params) = entry_block(&mut builder);
        let backend = TypeManager::host();

        let mut scope = BlockBuilder::new(&mut builder, "atomic::xadd64").unwrap();
        let new = expand_xadd(&params, &mut scope, &backend).unwrap().unwrap();
        assert_eq!(scope.value_type(new), types::I64);
        assert_eq!(scope.emitted_count(), 2);
    }

    #[test]
    fn test_cas_yields_bool() {
        let mut func = function_with_params(&[types::I64, types::I32, types::I32]);
        let mut fctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(&mut func, &mut fctx);
        let (_, params) = entry_block(&mut builder);
        let backend = TypeManager::host();

        let mut scope = BlockBuilder::new(&mut builder, "atomic::cas32").unwrap();
        let ok = expand_cas(&params, &mut scope, &backend).unwrap().unwrap();
        assert_eq!(scope.value_type(ok), types::I8);
        assert_eq!(scope.emitted_count(), 2);
    }

    #[test]
    fn test_store_and_or_produce_no_value() {
        let mut func = function_with_params(&[types::I64, types::I8]);
        let mut fctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(&mut func, &mut fctx);
        let (_, params) = entry_block(&mut builder);
        let backend = TypeManager::host();

        let mut scope = BlockBuilder::new(&mut builder, "atomic::store8").unwrap();
        assert_eq!(expand_store(&params, &mut scope, &backend).unwrap(), None);
        assert_eq!(expand_or(&params, &mut scope, &backend).unwrap(), None);
        assert_eq!(expand_and(&params, &mut scope, &backend).unwrap(), None);
        assert_eq!(scope.emitted_count(), 3);
    }

    #[test]
    fn test_pointer_load_uses_target_width() {
        let backend = TypeManager::new("i686-unknown-linux-gnu".parse().unwrap());
        let mut func = function_with_params(&[types::I32]);
        let mut fctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(&mut func, &mut fctx);
        let (_, params) = entry_block(&mut builder);

        let mut scope = BlockBuilder::new(&mut builder, "atomic::load_ptr").unwrap();
        let v = expand_load_ptr(&params, &mut scope, &backend).unwrap().unwrap();
        assert_eq!(scope.value_type(v), types::I32);
    }
}
