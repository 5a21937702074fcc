//!
//! Inline Expansion
//!
//! Builtins lowered as instruction sequences instead of calls. Expanders
//! receive the lowered arguments and a `BlockBuilder` scoped to the block
//! the call site is being emitted into.
//!

pub mod atomics;
pub mod frame;

use cranelift::prelude::*;
use cranelift_codegen::ir::{Inst, InstructionData, Opcode, ValueDef};
use cranelift_frontend::FuncInstBuilder;

use crate::error::BuiltinError;

/// A `FunctionBuilder` narrowed to the block that is current when the
/// scope opens. Tracks the instructions appended through it.
pub struct BlockBuilder<'a, 'f> {
    builder: &'a mut FunctionBuilder<'f>,
    block: Block,
    start: usize,
}

impl<'a, 'f> BlockBuilder<'a, 'f> {
    /// Opens a scope on the builder's current block. `name` is only used to
    /// report a builder positioned nowhere.
    pub fn new(builder: &'a mut FunctionBuilder<'f>, name: &str) -> Result<Self, BuiltinError> {
        let block = builder
            .current_block()
            .ok_or_else(|| BuiltinError::NoInsertionBlock {
                name: name.to_string(),
            })?;
        let start = builder.func.layout.block_insts(block).count();
        Ok(Self {
            builder,
            block,
            start,
        })
    }

    pub fn block(&self) -> Block {
        self.block
    }

    pub fn ins<'s>(&'s mut self) -> FuncInstBuilder<'s, 'f> {
        self.builder.ins()
    }

    pub fn value_type(&self, value: Value) -> Type {
        self.builder.func.dfg.value_type(value)
    }

    /// Instructions appended to the block since this scope opened.
    pub fn emitted(&self) -> Vec<Inst> {
        self.builder
            .func
            .layout
            .block_insts(self.block)
            .skip(self.start)
            .collect()
    }

    pub fn emitted_count(&self) -> usize {
        self.builder.func.layout.block_insts(self.block).count() - self.start
    }

    /// The integer constant `value` was materialized from, if any.
    pub fn constant(&self, value: Value) -> Option<i64> {
        let dfg = &self.builder.func.dfg;
        match dfg.value_def(value) {
            ValueDef::Result(inst, 0) => match dfg.insts[inst] {
                InstructionData::UnaryImm {
                    opcode: Opcode::Iconst,
                    imm,
                } => Some(imm.bits()),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Checks argument count and types against a registered signature.
pub(crate) fn check_args(
    name: &str,
    args: &[Value],
    params: &[Type],
    builder: &BlockBuilder<'_, '_>,
) -> Result<(), BuiltinError> {
    if args.len() != params.len() {
        return Err(BuiltinError::ArgumentCount {
            name: name.to_string(),
            expected: params.len(),
            found: args.len(),
        });
    }
    for (index, (arg, expected)) in args.iter().zip(params).enumerate() {
        let found = builder.value_type(*arg);
        if found != *expected {
            return Err(BuiltinError::ArgumentType {
                name: name.to_string(),
                index,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
    }
    Ok(())
}

/// `__builtin_expect(value, expected)` carries a branch hint only; the
/// value passes through unchanged.
pub fn expand_expect(
    args: &[Value],
    _builder: &mut BlockBuilder<'_, '_>,
    _backend: &crate::types::TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    Ok(args.first().copied())
}

/// `__builtin_extract_return_addr(addr)` is the identity on every
/// supported target.
pub fn expand_extract_return_addr(
    args: &[Value],
    _builder: &mut BlockBuilder<'_, '_>,
    _backend: &crate::types::TypeManager,
) -> Result<Option<Value>, BuiltinError> {
    Ok(args.first().copied())
}

#[cfg(test)]
pub(crate) mod test_support {
    use cranelift::prelude::*;
    use cranelift_codegen::ir::{Function, UserFuncName};
    use cranelift_codegen::isa::CallConv;

    /// A function whose entry block takes `params` and has the builder
    /// positioned in it.
    pub fn function_with_params(params: &[Type]) -> Function {
        let mut sig = Signature::new(CallConv::SystemV);
        for ty in params {
            sig.params.push(AbiParam::new(*ty));
        }
        Function::with_name_signature(UserFuncName::user(0, 0), sig)
    }

    pub fn entry_block(builder: &mut FunctionBuilder<'_>) -> (Block, Vec<Value>) {
        let block = builder.create_block();
        builder.append_block_params_for_function_params(block);
        builder.switch_to_block(block);
        builder.seal_block(block);
        let params = builder.block_params(block).to_vec();
        (block, params)
    }
}
