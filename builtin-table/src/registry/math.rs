//!
//! Math library builtins, lowered to calls into the target's libm, and the
//! memory builtins that lower to libc.
//!

use super::BuiltinRegistry;
use crate::libfuncs::LibFunc;
use crate::types::SourceType;

/// One libm function in its three precisions.
#[derive(Debug, Clone, Copy)]
pub struct MathFunc {
    pub base: &'static str,
    pub double: LibFunc,
    pub float: LibFunc,
    pub long_double: LibFunc,
    /// `ldexp` takes its exponent as an int.
    pub int_exponent: bool,
    pub binary: bool,
}

const fn unary(base: &'static str, double: LibFunc, float: LibFunc, long_double: LibFunc) -> MathFunc {
    MathFunc { base, double, float, long_double, int_exponent: false, binary: false }
}

const fn binary(base: &'static str, double: LibFunc, float: LibFunc, long_double: LibFunc) -> MathFunc {
    MathFunc { base, double, float, long_double, int_exponent: false, binary: true }
}

pub const MATH_FUNCS: &[MathFunc] = &[
    unary("acos", LibFunc::Acos, LibFunc::Acosf, LibFunc::Acosl),
    unary("asin", LibFunc::Asin, LibFunc::Asinf, LibFunc::Asinl),
    unary("atan", LibFunc::Atan, LibFunc::Atanf, LibFunc::Atanl),
    binary("atan2", LibFunc::Atan2, LibFunc::Atan2f, LibFunc::Atan2l),
    unary("cos", LibFunc::Cos, LibFunc::Cosf, LibFunc::Cosl),
    unary("cosh", LibFunc::Cosh, LibFunc::Coshf, LibFunc::Coshl),
    unary("exp", LibFunc::Exp, LibFunc::Expf, LibFunc::Expl),
    unary("expm1", LibFunc::Expm1, LibFunc::Expm1f, LibFunc::Expm1l),
    binary("fmod", LibFunc::Fmod, LibFunc::Fmodf, LibFunc::Fmodl),
    MathFunc {
        base: "ldexp",
        double: LibFunc::Ldexp,
        float: LibFunc::Ldexpf,
        long_double: LibFunc::Ldexpl,
        int_exponent: true,
        binary: true,
    },
    unary("log", LibFunc::Log, LibFunc::Logf, LibFunc::Logl),
    unary("log10", LibFunc::Log10, LibFunc::Log10f, LibFunc::Log10l),
    unary("log1p", LibFunc::Log1p, LibFunc::Log1pf, LibFunc::Log1pl),
    unary("log2", LibFunc::Log2, LibFunc::Log2f, LibFunc::Log2l),
    unary("sin", LibFunc::Sin, LibFunc::Sinf, LibFunc::Sinl),
    unary("sinh", LibFunc::Sinh, LibFunc::Sinhf, LibFunc::Sinhl),
    unary("tan", LibFunc::Tan, LibFunc::Tanf, LibFunc::Tanl),
    unary("tanh", LibFunc::Tanh, LibFunc::Tanhf, LibFunc::Tanhl),
];

impl MathFunc {
    fn params(&self, float: SourceType) -> Vec<SourceType> {
        match (self.binary, self.int_exponent) {
            (false, _) => vec![float],
            (true, false) => vec![float, float],
            (true, true) => vec![float, SourceType::Int32],
        }
    }
}

impl BuiltinRegistry {
    pub(super) fn define_math_builtins(&mut self, extended_precision: bool) {
        for func in MATH_FUNCS {
            self.define_math_variant(func, "", func.double, SourceType::Float64);
            self.define_math_variant(func, "f", func.float, SourceType::Float32);
            if extended_precision {
                self.define_math_variant(func, "l", func.long_double, SourceType::LongDouble);
            }
        }
        self.define_memory_builtins();
    }

    fn define_math_variant(
        &mut self,
        func: &MathFunc,
        suffix: &str,
        libfunc: LibFunc,
        float: SourceType,
    ) {
        let params = self.types.signature(&func.params(float));
        let result = self.types.lower(float);
        self.register_library_call(
            &format!("__builtin_{}{}", func.base, suffix),
            libfunc,
            params,
            result,
        );
    }

    fn define_memory_builtins(&mut self) {
        use SourceType::{Int32, Pointer, Uintptr};

        let table: [(&str, LibFunc, &[SourceType], SourceType); 4] = [
            ("__builtin_memcmp", LibFunc::Memcmp, &[Pointer, Pointer, Uintptr], Int32),
            ("__builtin_memcpy", LibFunc::Memcpy, &[Pointer, Pointer, Uintptr], Pointer),
            ("__builtin_memmove", LibFunc::Memmove, &[Pointer, Pointer, Uintptr], Pointer),
            ("__builtin_memset", LibFunc::Memset, &[Pointer, Int32, Uintptr], Pointer),
        ];
        for (name, libfunc, params, result) in table {
            let params = self.types.signature(params);
            let result = self.types.lower(result);
            self.register_library_call(name, libfunc, params, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libfuncs::LibFuncStatus;
    use crate::types::TypeManager;
    use cranelift::prelude::types;

    #[test]
    fn test_long_double_variants_are_extended_precision() {
        for func in MATH_FUNCS {
            assert!(func.long_double.is_extended_precision(), "{}", func.base);
            assert!(!func.double.is_extended_precision());
            assert_eq!(func.double.symbol(), func.base);
            assert_eq!(func.float.symbol(), format!("{}f", func.base));
        }
    }

    #[test]
    fn test_signatures() {
        let mut reg = BuiltinRegistry::new(TypeManager::new("aarch64-unknown-linux-gnu".parse().unwrap()));
        reg.register_all(true);

        let sinf = reg.lookup("__builtin_sinf").unwrap();
        assert_eq!(sinf.backend_symbol(), "sinf");
        assert_eq!(sinf.signature_types(), &[types::F32]);
        assert_eq!(sinf.result_type(), Some(types::F32));

        let ldexpl = reg.lookup("__builtin_ldexpl").unwrap();
        assert_eq!(ldexpl.signature_types(), &[types::F128, types::I32]);
        assert_eq!(
            ldexpl.library_function(),
            Some(LibFuncStatus::Available(LibFunc::Ldexpl))
        );

        let memset = reg.lookup("__builtin_memset").unwrap();
        assert_eq!(memset.signature_types(), &[types::I64, types::I32, types::I64]);
        assert_eq!(memset.result_type(), Some(types::I64));
    }
}
