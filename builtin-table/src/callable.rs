//!
//! Callable Materialization
//!
//! Turns builtin entries into functions a call instruction can target.
//! Library calls become imports of the runtime symbol; intrinsic
//! instantiations become small local wrappers whose body is the intrinsic's
//! single instruction.
//!

use std::collections::HashMap;
use std::panic;

use cranelift::prelude::*;
use cranelift_codegen::ir::{FuncRef, Function, UserFuncName};
use cranelift_module::{FuncId, Linkage, Module};

use crate::entry::BuiltinEntry;
use crate::error::{BuiltinError, convert_cranelift_error};
use crate::intrinsics::IntrinsicId;
use crate::libfuncs::LibFunc;

/// Creates and imports the callables builtins lower to.
pub trait CallableFactory {
    /// Declares the runtime library function `func` with the entry's
    /// parameter and result types.
    fn declare_library_call(
        &mut self,
        entry: &BuiltinEntry,
        func: LibFunc,
    ) -> Result<FuncId, BuiltinError>;

    /// Declares and defines the instantiation of `id` at `ty`.
    fn declare_intrinsic(
        &mut self,
        entry: &BuiltinEntry,
        id: IntrinsicId,
        ty: Type,
    ) -> Result<FuncId, BuiltinError>;

    /// Makes `callable` referenceable from the function being built.
    fn import(&mut self, callable: FuncId, func: &mut Function) -> FuncRef;
}

/// `CallableFactory` over a Cranelift module. Each symbol is declared once
/// per module no matter how many entries or call sites reach it.
pub struct ModuleCallables<'m, M: Module + ?Sized> {
    module: &'m mut M,
    ctx: codegen::Context,
    declared: HashMap<String, FuncId>,
}

impl<'m, M: Module + ?Sized> ModuleCallables<'m, M> {
    pub fn new(module: &'m mut M) -> Self {
        let ctx = module.make_context();
        Self {
            module,
            ctx,
            declared: HashMap::new(),
        }
    }

    pub fn module(&mut self) -> &mut M {
        self.module
    }

    /// Callable already declared under `symbol`, if any.
    pub fn declared(&self, symbol: &str) -> Option<FuncId> {
        self.declared.get(symbol).copied()
    }

    pub fn declared_count(&self) -> usize {
        self.declared.len()
    }

    fn declare(
        &mut self,
        symbol: &str,
        linkage: Linkage,
        sig: &Signature,
    ) -> Result<FuncId, BuiltinError> {
        let func_id = self
            .module
            .declare_function(symbol, linkage, sig)
            .map_err(|source| BuiltinError::Module {
                symbol: symbol.to_string(),
                source,
            })?;
        self.declared.insert(symbol.to_string(), func_id);
        tracing::debug!(symbol, ?linkage, ?func_id, "declared builtin callable");
        Ok(func_id)
    }

    fn define_intrinsic_body(
        &mut self,
        func_id: FuncId,
        symbol: &str,
        id: IntrinsicId,
        sig: Signature,
    ) -> Result<(), BuiltinError> {
        self.ctx.func.signature = sig;
        self.ctx.func.name = UserFuncName::user(0, func_id.as_u32());

        let mut builder_ctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(&mut self.ctx.func, &mut builder_ctx);
        let entry_block = builder.create_block();
        builder.append_block_params_for_function_params(entry_block);
        builder.switch_to_block(entry_block);
        builder.seal_block(entry_block);

        let params = builder.block_params(entry_block).to_vec();
        let result = id.emit(builder.ins(), &params);
        builder.ins().return_(&[result]);
        builder.finalize();

        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.module.define_function(func_id, &mut self.ctx)
        }));
        let outcome = match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(BuiltinError::Module {
                symbol: symbol.to_string(),
                source,
            }),
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown internal error".to_string()
                };
                Err(convert_cranelift_error(&panic_msg, symbol))
            }
        };

        self.module.clear_context(&mut self.ctx);
        outcome
    }
}

impl<M: Module + ?Sized> CallableFactory for ModuleCallables<'_, M> {
    fn declare_library_call(
        &mut self,
        entry: &BuiltinEntry,
        func: LibFunc,
    ) -> Result<FuncId, BuiltinError> {
        let symbol = func.symbol();
        if let Some(func_id) = self.declared(symbol) {
            return Ok(func_id);
        }

        let mut sig = self.module.make_signature();
        sig.params
            .extend(entry.signature_types().iter().map(|ty| AbiParam::new(*ty)));
        if let Some(result) = entry.result_type() {
            sig.returns.push(AbiParam::new(result));
        }
        self.declare(symbol, Linkage::Import, &sig)
    }

    fn declare_intrinsic(
        &mut self,
        entry: &BuiltinEntry,
        id: IntrinsicId,
        ty: Type,
    ) -> Result<FuncId, BuiltinError> {
        let symbol = id.instance_symbol(ty);
        if let Some(func_id) = self.declared(&symbol) {
            return Ok(func_id);
        }
        tracing::debug!(builtin = entry.name(), %symbol, "instantiating intrinsic");

        let mut sig = self.module.make_signature();
        for _ in 0..id.arity() {
            sig.params.push(AbiParam::new(ty));
        }
        sig.returns.push(AbiParam::new(ty));

        let func_id = self.declare(&symbol, Linkage::Local, &sig)?;
        if let Err(err) = self.define_intrinsic_body(func_id, &symbol, id, sig) {
            self.declared.remove(&symbol);
            return Err(err);
        }
        Ok(func_id)
    }

    fn import(&mut self, callable: FuncId, func: &mut Function) -> FuncRef {
        self.module.declare_func_in_func(callable, func)
    }
}
