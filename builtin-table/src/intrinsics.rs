//!
//! Backend Intrinsics
//!
//! Primitive operations Cranelift implements as single instructions. Each
//! is polymorphic over a family of scalar types; a call site picks one
//! member and gets a wrapper function instantiated for it.
//!

use cranelift::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IntrinsicId {
    Sqrt,
    Fabs,
    Floor,
    Ceil,
    Trunc,
    Nearest,
    Copysign,
    Fmin,
    Fmax,
    Popcount,
    Clz,
    Ctz,
    Bswap,
    Bitreverse,
}

impl IntrinsicId {
    pub fn name(self) -> &'static str {
        match self {
            IntrinsicId::Sqrt => "sqrt",
            IntrinsicId::Fabs => "fabs",
            IntrinsicId::Floor => "floor",
            IntrinsicId::Ceil => "ceil",
            IntrinsicId::Trunc => "trunc",
            IntrinsicId::Nearest => "nearest",
            IntrinsicId::Copysign => "copysign",
            IntrinsicId::Fmin => "fmin",
            IntrinsicId::Fmax => "fmax",
            IntrinsicId::Popcount => "popcnt",
            IntrinsicId::Clz => "clz",
            IntrinsicId::Ctz => "ctz",
            IntrinsicId::Bswap => "bswap",
            IntrinsicId::Bitreverse => "bitrev",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            IntrinsicId::Copysign | IntrinsicId::Fmin | IntrinsicId::Fmax => 2,
            _ => 1,
        }
    }

    pub fn is_float_op(self) -> bool {
        matches!(
            self,
            IntrinsicId::Sqrt
                | IntrinsicId::Fabs
                | IntrinsicId::Floor
                | IntrinsicId::Ceil
                | IntrinsicId::Trunc
                | IntrinsicId::Nearest
                | IntrinsicId::Copysign
                | IntrinsicId::Fmin
                | IntrinsicId::Fmax
        )
    }

    /// Whether `ty` is a legal instantiation at all, independent of the
    /// family a particular builtin registered.
    pub fn accepts(self, ty: Type) -> bool {
        if self.is_float_op() {
            return ty.is_float();
        }
        match self {
            IntrinsicId::Bswap => ty.is_int() && ty.bits() >= 16,
            _ => ty.is_int(),
        }
    }

    /// Backend symbol of the wrapper instantiated for `ty`, e.g.
    /// `intrinsic.sqrt.f64`.
    pub fn instance_symbol(self, ty: Type) -> String {
        format!("intrinsic.{}.{}", self.name(), ty)
    }

    /// Emits the instruction for this intrinsic over `args`, all of type
    /// `ty`. The result has type `ty` as well.
    pub fn emit<'a>(self, ins: impl InstBuilder<'a>, args: &[Value]) -> Value {
        match self {
            IntrinsicId::Sqrt => ins.sqrt(args[0]),
            IntrinsicId::Fabs => ins.fabs(args[0]),
            IntrinsicId::Floor => ins.floor(args[0]),
            IntrinsicId::Ceil => ins.ceil(args[0]),
            IntrinsicId::Trunc => ins.trunc(args[0]),
            IntrinsicId::Nearest => ins.nearest(args[0]),
            IntrinsicId::Copysign => ins.fcopysign(args[0], args[1]),
            IntrinsicId::Fmin => ins.fmin(args[0], args[1]),
            IntrinsicId::Fmax => ins.fmax(args[0], args[1]),
            IntrinsicId::Popcount => ins.popcnt(args[0]),
            IntrinsicId::Clz => ins.clz(args[0]),
            IntrinsicId::Ctz => ins.ctz(args[0]),
            IntrinsicId::Bswap => ins.bswap(args[0]),
            IntrinsicId::Bitreverse => ins.bitrev(args[0]),
        }
    }
}
