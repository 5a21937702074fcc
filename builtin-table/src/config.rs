///
/// # Builtin Table Configuration
///
/// Describes the target a builtin table is built for, read from a TOML
/// file. Every field is optional; an empty file means the host target with
/// extended precision off.
///
/// ## Example builtins.toml
///
/// ```toml
/// [target]
/// triple = "aarch64-unknown-linux-gnu"
/// pic = true
/// release = false
///
/// [builtins]
/// extended_precision = true
/// ```
///

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::registry::BuiltinRegistry;
use crate::target::TargetConfig;
use crate::types::TypeManager;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config not found at {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid target triple '{triple}': {reason}")]
    InvalidTarget { triple: String, reason: String },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BuiltinConfig {
    #[serde(default)]
    pub target: TargetSection,
    #[serde(default)]
    pub builtins: BuiltinsSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSection {
    /// Host when absent.
    #[serde(default)]
    pub triple: Option<String>,
    #[serde(default)]
    pub pic: bool,
    #[serde(default)]
    pub release: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BuiltinsSection {
    #[serde(default)]
    pub extended_precision: bool,
}

impl BuiltinConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn target_config(&self) -> Result<TargetConfig, ConfigError> {
        let mut target = match &self.target.triple {
            None => TargetConfig::host(),
            Some(triple) => {
                TargetConfig::from_str(triple).map_err(|e| ConfigError::InvalidTarget {
                    triple: triple.clone(),
                    reason: e.to_string(),
                })?
            }
        };
        target.pic = self.target.pic;
        target.release = self.target.release;
        Ok(target)
    }

    /// A populated registry for the configured target.
    pub fn build_registry(&self) -> Result<BuiltinRegistry, ConfigError> {
        let mut registry = BuiltinRegistry::new(TypeManager::new(self.target_config()?));
        registry.register_all(self.builtins.extended_precision);
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_host() {
        let config = BuiltinConfig::from_toml_str("").expect("Failed to parse config");
        assert_eq!(config, BuiltinConfig::default());
        assert!(config.target_config().unwrap().is_host());
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
[target]
triple = "aarch64-unknown-linux-gnu"
pic = true

[builtins]
extended_precision = true
"#;
        let config = BuiltinConfig::from_toml_str(content).expect("Failed to parse config");
        let target = config.target_config().unwrap();
        assert_eq!(target.to_string(), "aarch64-unknown-linux-gnu");
        assert!(target.pic);
        assert!(!target.release);

        let registry = config.build_registry().unwrap();
        assert!(registry.extended_precision());
        assert!(registry.lookup("__builtin_sinl").is_some());
    }

    #[test]
    fn test_invalid_triple() {
        let config = BuiltinConfig::from_toml_str("[target]\ntriple = \"not a triple\"\n").unwrap();
        let err = config.target_config().unwrap_err();
        assert!(err.to_string().contains("Invalid target triple"));
        assert!(err.to_string().contains("not a triple"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = BuiltinConfig::from_toml_str("[builtins]\nlong_double = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("builtins.toml");
        std::fs::write(&path, "[target]\ntriple = \"wasm32-unknown-unknown\"\n").unwrap();

        let config = BuiltinConfig::load(&path).unwrap();
        let registry = config.build_registry().unwrap();
        assert_eq!(registry.types().pointer_type(), cranelift::prelude::types::I32);
        assert!(!registry.library_info().has(crate::libfuncs::LibFunc::Sin));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BuiltinConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }
}
