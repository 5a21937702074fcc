//!
//! Type Mappings (source scalars -> Cranelift)
//!
//! Builtin signatures are written in terms of source-level scalar types and
//! lowered to Cranelift IR types for the active target:
//! - int8..int64, uint8..uint64 -> I8..I64
//! - uintptr, pointer -> pointer-sized integer
//! - float32 -> F32, float64 -> F64
//! - long double -> F128
//! - bool -> I8 (0 or 1)
//!

use cranelift::prelude::Type;
use cranelift::prelude::types;
use smallvec::SmallVec;

use crate::target::TargetConfig;

/// Ordered type descriptors of one builtin: an overload family for
/// intrinsics, the parameter list otherwise.
pub type SignatureTypes = SmallVec<[Type; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Pointer,
    Float32,
    Float64,
    LongDouble,
    Bool,
}

/// A set of instantiations an intrinsic may be specialized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverloadFamily {
    /// Every float width the target supports.
    Float,
    /// I8 through I64.
    Integer,
    /// I16 through I64 (byte swapping needs at least two bytes).
    MultiByteInteger,
    /// A single instantiation.
    Exact(SourceType),
}

#[derive(Debug, Clone)]
pub struct TypeManager {
    target: TargetConfig,
    pointer: Type,
    extended_precision: bool,
}

impl TypeManager {
    pub fn new(target: TargetConfig) -> Self {
        let pointer = Type::int(target.pointer_bits()).unwrap_or(types::I64);
        Self {
            target,
            pointer,
            extended_precision: false,
        }
    }

    pub fn host() -> Self {
        Self::new(TargetConfig::host())
    }

    pub fn target(&self) -> &TargetConfig {
        &self.target
    }

    pub fn pointer_type(&self) -> Type {
        self.pointer
    }

    pub fn bool_type(&self) -> Type {
        types::I8
    }

    pub fn long_double_type(&self) -> Type {
        types::F128
    }

    pub fn extended_precision(&self) -> bool {
        self.extended_precision
    }

    /// Lets `long double` join the float overload family.
    pub fn set_extended_precision(&mut self, enabled: bool) {
        self.extended_precision = enabled;
    }

    pub fn lower(&self, ty: SourceType) -> Type {
        match ty {
            SourceType::Int8 | SourceType::Uint8 => types::I8,
            SourceType::Int16 | SourceType::Uint16 => types::I16,
            SourceType::Int32 | SourceType::Uint32 => types::I32,
            SourceType::Int64 | SourceType::Uint64 => types::I64,
            SourceType::Uintptr | SourceType::Pointer => self.pointer,
            SourceType::Float32 => types::F32,
            SourceType::Float64 => types::F64,
            SourceType::LongDouble => self.long_double_type(),
            SourceType::Bool => self.bool_type(),
        }
    }

    pub fn signature(&self, tys: &[SourceType]) -> SignatureTypes {
        tys.iter().map(|ty| self.lower(*ty)).collect()
    }

    /// Unsigned integer of `bytes` width, as used by the sized atomics.
    pub fn int_of_bytes(&self, bytes: u16) -> Option<Type> {
        Type::int_with_byte_size(bytes)
    }

    pub fn family(&self, family: OverloadFamily) -> SignatureTypes {
        match family {
            OverloadFamily::Float => {
                let mut tys: SignatureTypes = smallvec::smallvec![types::F32, types::F64];
                if self.extended_precision {
                    tys.push(self.long_double_type());
                }
                tys
            }
            OverloadFamily::Integer => {
                smallvec::smallvec![types::I8, types::I16, types::I32, types::I64]
            }
            OverloadFamily::MultiByteInteger => {
                smallvec::smallvec![types::I16, types::I32, types::I64]
            }
            OverloadFamily::Exact(ty) => smallvec::smallvec![self.lower(ty)],
        }
    }
}
