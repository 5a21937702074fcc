//!
//! Builtin Registry
//!
//! Maps builtin names to entries. The table is filled once per target by
//! `register_all` and only read afterwards; `register_*` take `&mut self`
//! while lookups borrow it shared, so no reference handed out by `lookup`
//! can outlive a later insertion.
//!
//! Categories, in registration order:
//! - atomics: `__sync_fetch_and_add_N`, expanded inline
//! - intrinsics: bit and float primitives, called through wrappers
//! - math: libm transcendental functions, called by symbol
//! - exprs: runtime atomics and other inline expressions
//!

mod atomics;
mod exprs;
mod intrinsics;
mod math;

use std::fmt;

use cranelift::prelude::Type;
use indexmap::IndexMap;

use crate::entry::{BuiltinEntry, BuiltinStrategy, InlineExpander};
use crate::intrinsics::IntrinsicId;
use crate::libfuncs::{LibFunc, LibFuncStatus, TargetLibraryInfo};
use crate::types::{SignatureTypes, TypeManager};

pub use intrinsics::LONG_DOUBLE_INTRINSICS;
pub use math::{MATH_FUNCS, MathFunc};

/// Stable handle to a registered entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuiltinId(u32);

impl BuiltinId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BuiltinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "builtin{}", self.0)
    }
}

pub struct BuiltinRegistry {
    types: TypeManager,
    library: TargetLibraryInfo,
    entries: Vec<BuiltinEntry>,
    index: IndexMap<String, BuiltinId>,
    populated: bool,
}

impl BuiltinRegistry {
    pub fn new(types: TypeManager) -> Self {
        let library = TargetLibraryInfo::new(types.target());
        Self {
            types,
            library,
            entries: Vec::new(),
            index: IndexMap::new(),
            populated: false,
        }
    }

    /// Registers every builtin for the target. Long-double variants are
    /// only added when `extended_precision` is set: the source language has
    /// no surface type for them and call lowering cannot pass them yet.
    ///
    /// Panics if called twice.
    pub fn register_all(&mut self, extended_precision: bool) {
        assert!(
            !self.populated,
            "builtin registry for {} is already populated",
            self.types.target()
        );
        self.populated = true;
        self.types.set_extended_precision(extended_precision);

        self.define_sync_fetch_and_add_builtins();
        self.define_intrinsic_builtins(extended_precision);
        self.define_math_builtins(extended_precision);
        self.define_expr_builtins();

        tracing::info!(
            target_triple = %self.types.target(),
            extended_precision,
            builtins = self.entries.len(),
            "registered builtins"
        );
    }

    /// Number of entries `register_all(true)` adds over
    /// `register_all(false)`.
    pub fn extended_precision_candidates() -> usize {
        MATH_FUNCS.len() + LONG_DOUBLE_INTRINSICS.len()
    }

    pub fn lookup(&self, name: &str) -> Option<&BuiltinEntry> {
        self.lookup_id(name).map(|id| self.entry(id))
    }

    pub fn lookup_id(&self, name: &str) -> Option<BuiltinId> {
        let found = self.index.get(name).copied();
        tracing::trace!(builtin = name, hit = found.is_some(), "builtin lookup");
        found
    }

    pub fn entry(&self, id: BuiltinId) -> &BuiltinEntry {
        &self.entries[id.index()]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (BuiltinId, &BuiltinEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (BuiltinId(i as u32), entry))
    }

    pub fn types(&self) -> &TypeManager {
        &self.types
    }

    pub fn library_info(&self) -> &TargetLibraryInfo {
        &self.library
    }

    pub fn extended_precision(&self) -> bool {
        self.types.extended_precision()
    }

    fn insert(&mut self, entry: BuiltinEntry) -> BuiltinId {
        let name = entry.name().to_string();
        assert!(
            !self.index.contains_key(&name),
            "builtin `{}` registered twice",
            name
        );
        let id = BuiltinId(self.entries.len() as u32);
        tracing::debug!(
            builtin = %name,
            symbol = entry.backend_symbol(),
            strategy = %entry.strategy(),
            "registered builtin"
        );
        self.entries.push(entry);
        self.index.insert(name, id);
        id
    }

    pub fn register_intrinsic(
        &mut self,
        name: &str,
        backend_symbol: &str,
        id: IntrinsicId,
        overloads: SignatureTypes,
    ) -> BuiltinId {
        debug_assert!(overloads.iter().all(|ty| id.accepts(*ty)));
        self.insert(BuiltinEntry::intrinsic(name, backend_symbol, id, overloads))
    }

    /// Registers a runtime library call. Functions the target does not
    /// provide are still registered, marked unavailable, so the call site
    /// can report them instead of treating the name as unknown.
    pub fn register_library_call(
        &mut self,
        name: &str,
        func: LibFunc,
        params: SignatureTypes,
        result: Type,
    ) -> BuiltinId {
        let status = self.library.status(func);
        if status == LibFuncStatus::Unavailable {
            tracing::debug!(
                builtin = name,
                symbol = func.symbol(),
                target_triple = %self.types.target(),
                "library function not provided by target"
            );
        }
        self.insert(BuiltinEntry::library_call(
            name,
            func.symbol(),
            status,
            params,
            result,
        ))
    }

    pub fn register_inlined(
        &mut self,
        name: &str,
        params: SignatureTypes,
        result: Option<Type>,
        expander: InlineExpander,
    ) -> BuiltinId {
        self.insert(BuiltinEntry::inlined(name, params, result, expander))
    }

    /// Entry counts per strategy, for summaries.
    pub fn strategy_counts(&self) -> [(BuiltinStrategy, usize); 3] {
        let mut counts = [
            (BuiltinStrategy::Intrinsic, 0),
            (BuiltinStrategy::LibraryCall, 0),
            (BuiltinStrategy::Inlined, 0),
        ];
        for entry in &self.entries {
            if let Some(slot) = counts.iter_mut().find(|(s, _)| *s == entry.strategy()) {
                slot.1 += 1;
            }
        }
        counts
    }
}

impl fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinRegistry")
            .field("target", &self.types.target().to_string())
            .field("entries", &self.entries.len())
            .field("populated", &self.populated)
            .finish()
    }
}
