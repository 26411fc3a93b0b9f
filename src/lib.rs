#![crate_name = "hackvm"]

#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod emulator;
pub mod vm_translator;

pub use config::TranslatorConfig;
pub use vm_translator::{SourceUnit, TranslatorError, VmTranslator};
