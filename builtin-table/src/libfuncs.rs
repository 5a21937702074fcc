//!
//! Runtime Library Catalogue
//!
//! Functions the target's C runtime provides and that builtins may lower
//! to as plain calls. `TargetLibraryInfo` answers which of them exist on
//! the active target.
//!

use serde::Serialize;

use crate::target::TargetConfig;

/// What a catalogued function operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LibFuncClass {
    /// `double` math
    Double,
    /// `float` math (`f` suffix)
    Single,
    /// `long double` math (`l` suffix)
    Extended,
    Memory,
}

macro_rules! lib_funcs {
    ($($variant:ident => $symbol:literal : $class:ident),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum LibFunc {
            $($variant,)*
        }

        impl LibFunc {
            pub const ALL: &'static [LibFunc] = &[$(LibFunc::$variant,)*];

            /// Symbol the runtime library exports for this function.
            pub fn symbol(self) -> &'static str {
                match self {
                    $(LibFunc::$variant => $symbol,)*
                }
            }

            pub fn class(self) -> LibFuncClass {
                match self {
                    $(LibFunc::$variant => LibFuncClass::$class,)*
                }
            }
        }
    };
}

lib_funcs! {
    Acos => "acos": Double, Acosf => "acosf": Single, Acosl => "acosl": Extended,
    Asin => "asin": Double, Asinf => "asinf": Single, Asinl => "asinl": Extended,
    Atan => "atan": Double, Atanf => "atanf": Single, Atanl => "atanl": Extended,
    Atan2 => "atan2": Double, Atan2f => "atan2f": Single, Atan2l => "atan2l": Extended,
    Cos => "cos": Double, Cosf => "cosf": Single, Cosl => "cosl": Extended,
    Cosh => "cosh": Double, Coshf => "coshf": Single, Coshl => "coshl": Extended,
    Exp => "exp": Double, Expf => "expf": Single, Expl => "expl": Extended,
    Expm1 => "expm1": Double, Expm1f => "expm1f": Single, Expm1l => "expm1l": Extended,
    Fmod => "fmod": Double, Fmodf => "fmodf": Single, Fmodl => "fmodl": Extended,
    Ldexp => "ldexp": Double, Ldexpf => "ldexpf": Single, Ldexpl => "ldexpl": Extended,
    Log => "log": Double, Logf => "logf": Single, Logl => "logl": Extended,
    Log10 => "log10": Double, Log10f => "log10f": Single, Log10l => "log10l": Extended,
    Log1p => "log1p": Double, Log1pf => "log1pf": Single, Log1pl => "log1pl": Extended,
    Log2 => "log2": Double, Log2f => "log2f": Single, Log2l => "log2l": Extended,
    Sin => "sin": Double, Sinf => "sinf": Single, Sinl => "sinl": Extended,
    Sinh => "sinh": Double, Sinhf => "sinhf": Single, Sinhl => "sinhl": Extended,
    Tan => "tan": Double, Tanf => "tanf": Single, Tanl => "tanl": Extended,
    Tanh => "tanh": Double, Tanhf => "tanhf": Single, Tanhl => "tanhl": Extended,
    Memcmp => "memcmp": Memory,
    Memcpy => "memcpy": Memory,
    Memmove => "memmove": Memory,
    Memset => "memset": Memory,
}

impl LibFunc {
    /// Long-double math functions.
    pub fn is_extended_precision(self) -> bool {
        self.class() == LibFuncClass::Extended
    }

    pub fn is_memory(self) -> bool {
        self.class() == LibFuncClass::Memory
    }
}

/// Availability of a catalogued function on the active target. Absence is
/// its own variant rather than an out-of-range catalogue index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LibFuncStatus {
    Available(LibFunc),
    Unavailable,
}

impl LibFuncStatus {
    pub fn is_available(self) -> bool {
        matches!(self, LibFuncStatus::Available(_))
    }
}

#[derive(Debug, Clone)]
pub struct TargetLibraryInfo {
    has_libc: bool,
    binary128_long_double: bool,
}

impl TargetLibraryInfo {
    pub fn new(target: &TargetConfig) -> Self {
        Self {
            has_libc: target.has_runtime_library(),
            binary128_long_double: target.long_double_is_binary128(),
        }
    }

    pub fn has(&self, func: LibFunc) -> bool {
        if !self.has_libc {
            return false;
        }
        !func.is_extended_precision() || self.binary128_long_double
    }

    pub fn status(&self, func: LibFunc) -> LibFuncStatus {
        if self.has(func) {
            LibFuncStatus::Available(func)
        } else {
            LibFuncStatus::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(triple: &str) -> TargetLibraryInfo {
        TargetLibraryInfo::new(&triple.parse().unwrap())
    }

    #[test]
    fn test_extended_precision_classification() {
        assert!(LibFunc::Sinl.is_extended_precision());
        assert!(LibFunc::Atan2l.is_extended_precision());
        assert!(!LibFunc::Sin.is_extended_precision());
        assert!(!LibFunc::Log1pf.is_extended_precision());
        assert!(!LibFunc::Memcmp.is_extended_precision());
        assert!(!LibFunc::Log.is_extended_precision());
        assert!(!LibFunc::Fmodl.is_memory());
    }

    #[test]
    fn test_class_matches_symbol_suffix() {
        for func in LibFunc::ALL {
            let symbol = func.symbol();
            match func.class() {
                LibFuncClass::Extended => assert!(symbol.ends_with('l'), "{}", symbol),
                LibFuncClass::Single => assert!(symbol.ends_with('f'), "{}", symbol),
                LibFuncClass::Double => {
                    assert!(LibFunc::ALL.iter().any(|f| f.symbol() == format!("{}l", symbol)))
                }
                LibFuncClass::Memory => assert!(symbol.starts_with("mem"), "{}", symbol),
            }
        }
    }

    #[test]
    fn test_catalogue_symbols_unique() {
        let mut symbols: Vec<_> = LibFunc::ALL.iter().map(|f| f.symbol()).collect();
        let total = symbols.len();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), total);
    }

    #[test]
    fn test_linux_x86_has_double_but_not_long_double() {
        let info = info("x86_64-unknown-linux-gnu");
        assert_eq!(info.status(LibFunc::Sin), LibFuncStatus::Available(LibFunc::Sin));
        assert_eq!(info.status(LibFunc::Sinl), LibFuncStatus::Unavailable);
    }

    #[test]
    fn test_aarch64_linux_has_long_double() {
        assert!(info("aarch64-unknown-linux-gnu").has(LibFunc::Sinl));
    }

    #[test]
    fn test_freestanding_has_nothing() {
        let info = info("wasm32-unknown-unknown");
        assert!(LibFunc::ALL.iter().all(|f| !info.has(*f)));
    }
}
