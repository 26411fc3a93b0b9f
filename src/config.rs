//! Translator configuration
//!
//! Read from a TOML file, every key optional:
//!
//! ```toml
//! bootstrap = true   # omit for auto: bootstrap when Sys.init is defined
//! annotate = false   # emit a "// <command>" line before each command
//! stack_base = 256   # initial SP set by the bootstrap
//! ```

use crate::vm_translator::codegen_calls::DEFAULT_STACK_BASE;
use crate::vm_translator::error::TranslatorError;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslatorConfig {
    pub bootstrap: Option<bool>,
    pub annotate: bool,
    pub stack_base: u16,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            bootstrap: None,
            annotate: false,
            stack_base: DEFAULT_STACK_BASE,
        }
    }
}

impl TranslatorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, TranslatorError> {
        toml::from_str(text).map_err(|err| TranslatorError::ConfigError(err.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, TranslatorError> {
        debug!("Loading configuration from {}", path.display());
        let text = fs::read_to_string(path).map_err(|err| {
            TranslatorError::ConfigError(format!("cannot read '{}': {}", path.display(), err))
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = TranslatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, TranslatorConfig::default());
        assert_eq!(config.stack_base, 256);
    }

    #[test]
    fn test_all_keys() {
        let config =
            TranslatorConfig::from_toml_str("bootstrap = false\nannotate = true\nstack_base = 300\n")
                .unwrap();
        assert_eq!(config.bootstrap, Some(false));
        assert!(config.annotate);
        assert_eq!(config.stack_base, 300);
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let err = TranslatorConfig::from_toml_str("optimize = true").unwrap_err();
        assert!(matches!(err, TranslatorError::ConfigError(_)));
    }

    #[test]
    fn test_out_of_range_stack_base_is_config_error() {
        let err = TranslatorConfig::from_toml_str("stack_base = -4").unwrap_err();
        assert!(matches!(err, TranslatorError::ConfigError(_)));
    }
}
