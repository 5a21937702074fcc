//!
//! Intrinsic builtins. The C-style names are single instantiations; the
//! `math::` and `bits::` names keep the whole overload family and are
//! narrowed at each call site.
//!

use super::BuiltinRegistry;
use crate::intrinsics::IntrinsicId;
use crate::types::{OverloadFamily, SourceType};

use IntrinsicId::*;
use SourceType::{Float32, Float64, Uint16, Uint32, Uint64};

const C_INTRINSICS: &[(&str, IntrinsicId, SourceType)] = &[
    ("__builtin_sqrt", Sqrt, Float64),
    ("__builtin_sqrtf", Sqrt, Float32),
    ("__builtin_fabs", Fabs, Float64),
    ("__builtin_fabsf", Fabs, Float32),
    ("__builtin_floor", Floor, Float64),
    ("__builtin_floorf", Floor, Float32),
    ("__builtin_ceil", Ceil, Float64),
    ("__builtin_ceilf", Ceil, Float32),
    ("__builtin_trunc", Trunc, Float64),
    ("__builtin_truncf", Trunc, Float32),
    ("__builtin_copysign", Copysign, Float64),
    ("__builtin_copysignf", Copysign, Float32),
    ("__builtin_bswap16", Bswap, Uint16),
    ("__builtin_bswap32", Bswap, Uint32),
    ("__builtin_bswap64", Bswap, Uint64),
    ("__builtin_popcount", Popcount, Uint32),
    ("__builtin_popcountll", Popcount, Uint64),
    ("__builtin_clz", Clz, Uint32),
    ("__builtin_clzll", Clz, Uint64),
    ("__builtin_ctz", Ctz, Uint32),
    ("__builtin_ctzll", Ctz, Uint64),
];

/// Long-double forms of the float intrinsics, registered only with
/// extended precision.
pub const LONG_DOUBLE_INTRINSICS: &[(&str, IntrinsicId)] = &[
    ("__builtin_sqrtl", Sqrt),
    ("__builtin_fabsl", Fabs),
    ("__builtin_floorl", Floor),
    ("__builtin_ceill", Ceil),
    ("__builtin_truncl", Trunc),
    ("__builtin_copysignl", Copysign),
];

const FAMILIES: &[(&str, IntrinsicId, OverloadFamily)] = &[
    ("math::sqrt", Sqrt, OverloadFamily::Float),
    ("math::abs", Fabs, OverloadFamily::Float),
    ("math::floor", Floor, OverloadFamily::Float),
    ("math::ceil", Ceil, OverloadFamily::Float),
    ("math::trunc", Trunc, OverloadFamily::Float),
    ("math::round_even", Nearest, OverloadFamily::Float),
    ("math::copysign", Copysign, OverloadFamily::Float),
    // NaN-propagating, unlike C fmin/fmax
    ("math::min", Fmin, OverloadFamily::Float),
    ("math::max", Fmax, OverloadFamily::Float),
    ("bits::popcount", Popcount, OverloadFamily::Integer),
    ("bits::leading_zeros", Clz, OverloadFamily::Integer),
    ("bits::trailing_zeros", Ctz, OverloadFamily::Integer),
    ("bits::reverse", Bitreverse, OverloadFamily::Integer),
    ("bits::swap_bytes", Bswap, OverloadFamily::MultiByteInteger),
];

impl BuiltinRegistry {
    pub(super) fn define_intrinsic_builtins(&mut self, extended_precision: bool) {
        for &(name, id, ty) in C_INTRINSICS {
            let overloads = self.types.family(OverloadFamily::Exact(ty));
            self.register_intrinsic(name, id.name(), id, overloads);
        }
        if extended_precision {
            for &(name, id) in LONG_DOUBLE_INTRINSICS {
                let overloads = self.types.family(OverloadFamily::Exact(SourceType::LongDouble));
                self.register_intrinsic(name, id.name(), id, overloads);
            }
        }
        for &(name, id, family) in FAMILIES {
            let overloads = self.types.family(family);
            self.register_intrinsic(name, id.name(), id, overloads);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::intrinsics::IntrinsicId;
    use crate::registry::BuiltinRegistry;
    use crate::types::TypeManager;
    use cranelift::prelude::types;

    fn registry(extended: bool) -> BuiltinRegistry {
        let mut reg = BuiltinRegistry::new(TypeManager::new("aarch64-unknown-linux-gnu".parse().unwrap()));
        reg.register_all(extended);
        reg
    }

    #[test]
    fn test_monomorphic_names_have_one_member() {
        let reg = registry(false);
        let sqrt = reg.lookup("__builtin_sqrt").unwrap();
        assert_eq!(sqrt.expect_intrinsic(), IntrinsicId::Sqrt);
        assert_eq!(sqrt.backend_symbol(), "sqrt");
        assert_eq!(sqrt.signature_types(), &[types::F64]);
        let bswap = reg.lookup("__builtin_bswap32").unwrap();
        assert_eq!(bswap.signature_types(), &[types::I32]);
    }

    #[test]
    fn test_float_family_gains_f128_with_extended_precision() {
        let base = registry(false);
        assert_eq!(
            base.lookup("math::sqrt").unwrap().signature_types(),
            &[types::F32, types::F64]
        );
        let extended = registry(true);
        assert_eq!(
            extended.lookup("math::sqrt").unwrap().signature_types(),
            &[types::F32, types::F64, types::F128]
        );
        assert_eq!(
            extended.lookup("__builtin_fabsl").unwrap().signature_types(),
            &[types::F128]
        );
    }

    #[test]
    fn test_integer_families() {
        let reg = registry(false);
        assert_eq!(
            reg.lookup("bits::popcount").unwrap().signature_types(),
            &[types::I8, types::I16, types::I32, types::I64]
        );
        assert_eq!(
            reg.lookup("bits::swap_bytes").unwrap().signature_types(),
            &[types::I16, types::I32, types::I64]
        );
    }
}
