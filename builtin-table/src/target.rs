//!
//! Target Configuration
//!
//! The active target triple plus the flags used when an ISA is needed to
//! materialize builtin callables. Pointer width, runtime library presence
//! and the shape of `long double` are all derived from the triple.
//!

use std::fmt;
use std::str::FromStr;

use cranelift::prelude::*;
use cranelift_codegen::isa::OwnedTargetIsa;
use target_lexicon::{Architecture, OperatingSystem, PointerWidth, Triple};

use crate::error::BuiltinError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    triple: Triple,
    pub pic: bool,
    pub release: bool,
}

impl TargetConfig {
    pub fn new(triple: Triple) -> Self {
        Self {
            triple,
            pic: false,
            release: false,
        }
    }

    pub fn host() -> Self {
        Self::new(Triple::host())
    }

    pub fn is_host(&self) -> bool {
        self.triple == Triple::host()
    }

    /// Pointer width in bits. Unknown architectures are treated as 64-bit.
    pub fn pointer_bits(&self) -> u16 {
        self.triple
            .pointer_width()
            .map(PointerWidth::bits)
            .unwrap_or(64) as u16
    }

    /// Whether the target ships a C math/runtime library at all. Freestanding
    /// targets (no operating system) have none.
    pub fn has_runtime_library(&self) -> bool {
        !matches!(
            self.triple.operating_system,
            OperatingSystem::Unknown | OperatingSystem::None_
        )
    }

    /// Whether C `long double` is IEEE binary128 on this target, which is the
    /// only extended format the table can express (as `F128`).
    pub fn long_double_is_binary128(&self) -> bool {
        let os = &self.triple.operating_system;
        if os.is_like_darwin() || *os == OperatingSystem::Windows {
            return false;
        }
        matches!(
            self.triple.architecture,
            Architecture::Aarch64(_) | Architecture::Riscv64(_) | Architecture::S390x
        )
    }

    /// Builds the ISA for this target. The host goes through
    /// `cranelift_native` so CPU features are detected.
    pub fn create_isa(&self) -> Result<OwnedTargetIsa, BuiltinError> {
        let mut flag_builder = settings::builder();
        let flags = [
            ("use_colocated_libcalls", "false"),
            ("is_pic", if self.pic { "true" } else { "false" }),
            ("opt_level", if self.release { "speed" } else { "none" }),
            // frame builtins read the frame chain
            ("preserve_frame_pointers", "true"),
        ];
        for (name, value) in flags {
            flag_builder.set(name, value).map_err(|e| self.isa_error(e))?;
        }

        let isa_builder = if self.is_host() {
            cranelift_native::builder().map_err(|e| self.isa_error(e))?
        } else {
            cranelift_codegen::isa::lookup(self.triple.clone()).map_err(|e| self.isa_error(e))?
        };

        isa_builder
            .finish(settings::Flags::new(flag_builder))
            .map_err(|e| self.isa_error(e))
    }

    fn isa_error(&self, reason: impl fmt::Display) -> BuiltinError {
        BuiltinError::Isa {
            target: self.triple.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for TargetConfig {
    type Err = target_lexicon::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(Triple::from_str(s)?))
    }
}

impl fmt::Display for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.triple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(s: &str) -> TargetConfig {
        s.parse().expect("valid triple")
    }

    #[test]
    fn test_pointer_bits() {
        assert_eq!(target("x86_64-unknown-linux-gnu").pointer_bits(), 64);
        assert_eq!(target("i686-unknown-linux-gnu").pointer_bits(), 32);
        assert_eq!(target("wasm32-unknown-unknown").pointer_bits(), 32);
    }

    #[test]
    fn test_runtime_library_presence() {
        assert!(target("x86_64-unknown-linux-gnu").has_runtime_library());
        assert!(target("aarch64-apple-darwin").has_runtime_library());
        assert!(target("wasm32-wasi").has_runtime_library());
        assert!(!target("wasm32-unknown-unknown").has_runtime_library());
        assert!(!target("riscv64gc-unknown-none-elf").has_runtime_library());
    }

    #[test]
    fn test_long_double_format() {
        assert!(target("aarch64-unknown-linux-gnu").long_double_is_binary128());
        assert!(!target("aarch64-apple-darwin").long_double_is_binary128());
        assert!(!target("x86_64-unknown-linux-gnu").long_double_is_binary128());
    }

    #[test]
    fn test_host_isa() {
        let isa = TargetConfig::host().create_isa().expect("host ISA");
        assert_eq!(
            isa.pointer_type().bits() as u16,
            TargetConfig::host().pointer_bits()
        );
        assert!(isa.flags().preserve_frame_pointers());
    }

    #[test]
    fn test_invalid_triple() {
        assert!("not-a-real-triple-at-all".parse::<TargetConfig>().is_err());
    }
}
