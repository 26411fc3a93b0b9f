// VM Translator Module
// Stack VM commands -> Hack assembly

pub mod codegen;
pub mod codegen_arithmetic;
pub mod codegen_branch;
pub mod codegen_calls;
pub mod codegen_segments;
pub mod command;
pub mod context;
pub mod error;
pub mod parser;

use crate::config::TranslatorConfig;
use codegen_calls::ENTRY_FUNCTION;
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub use codegen::CodeWriter;
pub use command::{ArithmeticOp, Command, Segment};
pub use error::TranslatorError;

/// Extension of VM source files
pub const VM_EXTENSION: &str = "vm";

/// Extension of generated assembly files
pub const ASM_EXTENSION: &str = "asm";

/// One input unit: its name scopes the unit's statics
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub name: String,
    pub source: String,
}

impl SourceUnit {
    pub fn new(name: &str, source: &str) -> Self {
        SourceUnit {
            name: name.to_string(),
            source: source.to_string(),
        }
    }

    /// Load a `.vm` file; the unit is named after the file stem
    pub fn from_file(path: &Path) -> Result<Self, TranslatorError> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| {
                TranslatorError::IOError(format!("invalid input filename '{}'", path.display()))
            })?;
        let source = fs::read_to_string(path).map_err(|err| {
            TranslatorError::IOError(format!("cannot read '{}': {}", path.display(), err))
        })?;
        Ok(SourceUnit { name, source })
    }
}

/// What a translation run produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TranslationSummary {
    pub units: usize,
    pub commands: usize,
    pub lines: usize,
    pub bootstrapped: bool,
}

/// Qualifies flow labels with the enclosing function
struct LabelScope {
    scope: String,
}

impl LabelScope {
    fn new(unit_name: &str) -> Self {
        LabelScope {
            scope: unit_name.to_string(),
        }
    }

    fn enter_function(&mut self, name: &str) {
        self.scope = name.to_string();
    }

    fn qualify(&self, label: &str) -> String {
        format!("{}${}", self.scope, label)
    }
}

/// Drives parsing and code generation over a set of units
#[derive(Debug, Clone, Default)]
pub struct VmTranslator {
    config: TranslatorConfig,
}

impl VmTranslator {
    pub fn new(config: TranslatorConfig) -> Self {
        VmTranslator { config }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate all units, in order, into one assembly stream
    pub fn translate_units<W: Write>(
        &self,
        units: &[SourceUnit],
        sink: W,
    ) -> Result<TranslationSummary, TranslatorError> {
        // All units are parsed before any output is written
        let mut parsed = Vec::with_capacity(units.len());
        for unit in units {
            if unit.name.is_empty() || unit.name.contains('$') {
                return Err(TranslatorError::InvalidUnitName(unit.name.clone()));
            }
            let commands = parser::parse_source(&unit.source)?;
            debug!("Parsed {} commands from unit '{}'", commands.len(), unit.name);
            parsed.push((unit, commands));
        }

        let bootstrapped = self.config.bootstrap.unwrap_or_else(|| {
            parsed.iter().any(|(_, commands)| {
                commands
                    .iter()
                    .any(|command| matches!(command, Command::Function(name, _) if name == ENTRY_FUNCTION))
            })
        });

        let mut writer = CodeWriter::new(sink).with_annotations(self.config.annotate);
        if bootstrapped {
            writer.write_bootstrap(self.config.stack_base)?;
        }

        let mut summary = TranslationSummary {
            bootstrapped,
            ..TranslationSummary::default()
        };
        for (unit, commands) in parsed {
            info!("Translating unit '{}'", unit.name);
            writer.set_unit_name(&unit.name);
            let mut scope = LabelScope::new(&unit.name);
            for command in &commands {
                let command = match command {
                    Command::Function(name, _) => {
                        scope.enter_function(name);
                        command.clone()
                    }
                    Command::Label(label) => Command::Label(scope.qualify(label)),
                    Command::Goto(label) => Command::Goto(scope.qualify(label)),
                    Command::IfGoto(label) => Command::IfGoto(scope.qualify(label)),
                    _ => command.clone(),
                };
                writer.write_command(&command)?;
            }
            summary.units += 1;
            summary.commands += commands.len();
        }
        writer.flush()?;
        summary.lines = writer.lines_written();
        Ok(summary)
    }

    /// `Foo.vm` -> `Foo.asm` beside it; `dir/` -> `dir/dir.asm`
    pub fn default_output_path(input: &Path) -> PathBuf {
        if input.is_dir() {
            // `.` and `..` have no file name of their own
            let dir = input.canonicalize().unwrap_or_else(|_| input.to_path_buf());
            let name = dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "out".to_string());
            input.join(format!("{}.{}", name, ASM_EXTENSION))
        } else {
            input.with_extension(ASM_EXTENSION)
        }
    }

    /// A single `.vm` file, or every `.vm` file in a directory sorted by name
    pub fn collect_units(input: &Path) -> Result<Vec<SourceUnit>, TranslatorError> {
        if !input.is_dir() {
            return Ok(vec![SourceUnit::from_file(input)?]);
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(input)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == VM_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();
        if paths.is_empty() {
            warn!("No .{} files found in {}", VM_EXTENSION, input.display());
        }
        paths.iter().map(|path| SourceUnit::from_file(path)).collect()
    }

    /// Translate a file or directory and write the assembly file
    pub fn translate_path(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<(PathBuf, TranslationSummary), TranslatorError> {
        let units = Self::collect_units(input)?;
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Self::default_output_path(input));

        let file = File::create(&output).map_err(|err| {
            TranslatorError::IOError(format!("cannot create '{}': {}", output.display(), err))
        })?;
        let summary = self.translate_units(&units, BufWriter::new(file))?;
        info!(
            "Wrote {} lines for {} commands to {}",
            summary.lines,
            summary.commands,
            output.display()
        );
        Ok((output, summary))
    }
}

#[cfg(test)]
#[path = "translator_tests.rs"]
mod tests;
