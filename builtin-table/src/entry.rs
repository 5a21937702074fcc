//!
//! Builtin Entries
//!
//! One entry describes one builtin: its source name, the symbol used when
//! a callable is materialized, how it is lowered, and the types that shape
//! it. The only state that changes after registration is the callable
//! cell, which goes from empty to bound exactly once.
//!

use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};

use cranelift::prelude::{Type, Value};
use cranelift_module::FuncId;
use serde::Serialize;

use crate::error::BuiltinError;
use crate::expand::BlockBuilder;
use crate::intrinsics::IntrinsicId;
use crate::libfuncs::LibFuncStatus;
use crate::types::{SignatureTypes, TypeManager};

/// Synthesizes a builtin's result directly at the call site from the
/// already-lowered arguments. Returns `None` for builtins without a value.
pub type InlineExpander = fn(
    args: &[Value],
    builder: &mut BlockBuilder<'_, '_>,
    backend: &TypeManager,
) -> Result<Option<Value>, BuiltinError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinStrategy {
    /// Backend primitive, called through an instantiated wrapper
    Intrinsic,
    /// Function from the target's runtime library
    LibraryCall,
    /// Expanded into instructions at the call site
    Inlined,
}

impl BuiltinStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinStrategy::Intrinsic => "intrinsic",
            BuiltinStrategy::LibraryCall => "library_call",
            BuiltinStrategy::Inlined => "inlined",
        }
    }
}

impl fmt::Display for BuiltinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy together with the data only that strategy needs.
#[derive(Clone, Copy)]
pub enum BuiltinKind {
    Intrinsic(IntrinsicId),
    LibraryCall(LibFuncStatus),
    Inlined(InlineExpander),
}

impl BuiltinKind {
    pub fn strategy(&self) -> BuiltinStrategy {
        match self {
            BuiltinKind::Intrinsic(_) => BuiltinStrategy::Intrinsic,
            BuiltinKind::LibraryCall(_) => BuiltinStrategy::LibraryCall,
            BuiltinKind::Inlined(_) => BuiltinStrategy::Inlined,
        }
    }
}

impl fmt::Debug for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltinKind::Intrinsic(id) => f.debug_tuple("Intrinsic").field(id).finish(),
            BuiltinKind::LibraryCall(status) => f.debug_tuple("LibraryCall").field(status).finish(),
            BuiltinKind::Inlined(_) => f.write_str("Inlined(..)"),
        }
    }
}

pub struct BuiltinEntry {
    name: String,
    backend_symbol: String,
    kind: BuiltinKind,
    signature_types: SignatureTypes,
    result_type: Option<Type>,
    callable: OnceLock<FuncId>,
    create_lock: Mutex<()>,
}

impl BuiltinEntry {
    fn new(
        name: &str,
        backend_symbol: &str,
        kind: BuiltinKind,
        signature_types: SignatureTypes,
        result_type: Option<Type>,
    ) -> Self {
        Self {
            name: name.to_string(),
            backend_symbol: backend_symbol.to_string(),
            kind,
            signature_types,
            result_type,
            callable: OnceLock::new(),
            create_lock: Mutex::new(()),
        }
    }

    /// An intrinsic over `overloads`; the result type is the chosen member.
    pub fn intrinsic(
        name: &str,
        backend_symbol: &str,
        id: IntrinsicId,
        overloads: SignatureTypes,
    ) -> Self {
        Self::new(name, backend_symbol, BuiltinKind::Intrinsic(id), overloads, None)
    }

    pub fn library_call(
        name: &str,
        backend_symbol: &str,
        status: LibFuncStatus,
        params: SignatureTypes,
        result: Type,
    ) -> Self {
        Self::new(
            name,
            backend_symbol,
            BuiltinKind::LibraryCall(status),
            params,
            Some(result),
        )
    }

    pub fn inlined(
        name: &str,
        params: SignatureTypes,
        result: Option<Type>,
        expander: InlineExpander,
    ) -> Self {
        Self::new(name, name, BuiltinKind::Inlined(expander), params, result)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend_symbol(&self) -> &str {
        &self.backend_symbol
    }

    pub fn strategy(&self) -> BuiltinStrategy {
        self.kind.strategy()
    }

    pub fn kind(&self) -> BuiltinKind {
        self.kind
    }

    pub fn signature_types(&self) -> &[Type] {
        &self.signature_types
    }

    pub fn result_type(&self) -> Option<Type> {
        self.result_type
    }

    pub fn intrinsic_id(&self) -> Option<IntrinsicId> {
        match self.kind {
            BuiltinKind::Intrinsic(id) => Some(id),
            _ => None,
        }
    }

    pub fn library_function(&self) -> Option<LibFuncStatus> {
        match self.kind {
            BuiltinKind::LibraryCall(status) => Some(status),
            _ => None,
        }
    }

    pub fn inline_expander(&self) -> Option<InlineExpander> {
        match self.kind {
            BuiltinKind::Inlined(expander) => Some(expander),
            _ => None,
        }
    }

    pub fn expect_intrinsic(&self) -> IntrinsicId {
        self.intrinsic_id()
            .unwrap_or_else(|| self.wrong_strategy(BuiltinStrategy::Intrinsic))
    }

    pub fn expect_library_function(&self) -> LibFuncStatus {
        self.library_function()
            .unwrap_or_else(|| self.wrong_strategy(BuiltinStrategy::LibraryCall))
    }

    pub fn expect_inline_expander(&self) -> InlineExpander {
        self.inline_expander()
            .unwrap_or_else(|| self.wrong_strategy(BuiltinStrategy::Inlined))
    }

    fn wrong_strategy(&self, wanted: BuiltinStrategy) -> ! {
        panic!(
            "builtin `{}` is lowered as {}, not {}",
            self.name,
            self.strategy(),
            wanted
        )
    }

    pub fn cached_callable(&self) -> Option<FuncId> {
        self.callable.get().copied()
    }

    /// Records the callable created for this builtin. Binding the same
    /// callable again is a no-op; binding a different one panics.
    pub fn bind_callable(&self, callable: FuncId) {
        let bound = *self.callable.get_or_init(|| callable);
        if bound != callable {
            panic!(
                "builtin `{}` is already bound to {:?}; refusing to rebind it to {:?}",
                self.name, bound, callable
            );
        }
        tracing::debug!(builtin = %self.name, ?callable, "bound builtin callable");
    }

    /// Returns the bound callable, running `create` and binding its result
    /// if there is none yet. Concurrent callers serialize on this entry so
    /// `create` runs at most once per successful bind.
    pub fn callable_or_create<E>(
        &self,
        create: impl FnOnce(&BuiltinEntry) -> Result<FuncId, E>,
    ) -> Result<FuncId, E> {
        if let Some(callable) = self.cached_callable() {
            return Ok(callable);
        }
        let _guard = self.create_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(callable) = self.cached_callable() {
            return Ok(callable);
        }
        let callable = create(self)?;
        self.bind_callable(callable);
        Ok(callable)
    }
}

impl fmt::Debug for BuiltinEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinEntry")
            .field("name", &self.name)
            .field("backend_symbol", &self.backend_symbol)
            .field("kind", &self.kind)
            .field("signature_types", &self.signature_types)
            .field("result_type", &self.result_type)
            .field("callable", &self.cached_callable())
            .finish()
    }
}
