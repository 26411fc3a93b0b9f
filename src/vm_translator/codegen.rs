// Hack Assembly Code Generator
//
// Translates VM commands into Hack assembly text. The emitters for segments,
// arithmetic, branching and calls live in codegen_*.rs and extend CodeWriter
// with their own impl blocks.

use crate::vm_translator::command::Command;
use crate::vm_translator::context::TranslationContext;
use crate::vm_translator::error::TranslatorError;
use log::debug;
use std::fmt;
use std::io::Write;

/// Instruction sequence built for one operation before it reaches the sink
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AsmBlock {
    lines: Vec<String>,
}

impl AsmBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one raw assembly line
    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(text.into());
        self
    }

    /// A-instruction: `@target`
    pub fn at(&mut self, target: impl fmt::Display) -> &mut Self {
        self.line(format!("@{}", target))
    }

    /// Label definition: `(name)`
    pub fn label(&mut self, name: impl fmt::Display) -> &mut Self {
        self.line(format!("({})", name))
    }

    /// Unconditional jump to `target`
    pub fn jump(&mut self, target: impl fmt::Display) -> &mut Self {
        self.at(target).line("0;JMP")
    }

    /// Jump to `target` when D satisfies `condition`
    pub fn jump_if_d(&mut self, target: impl fmt::Display, condition: &str) -> &mut Self {
        self.at(target).line(format!("D;{}", condition))
    }

    /// `*SP = D; SP++`
    pub fn push_d(&mut self) -> &mut Self {
        self.at("SP")
            .line("A=M")
            .line("M=D")
            .at("SP")
            .line("M=M+1")
    }

    /// `SP--; D = *SP`, leaving A at the popped slot
    pub fn pop_d(&mut self) -> &mut Self {
        self.at("SP").line("AM=M-1").line("D=M")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The VM translator backend: owns the translation context, borrows the sink
pub struct CodeWriter<W: Write> {
    sink: W,
    pub(crate) ctx: TranslationContext,
    annotate: bool,
    lines_written: usize,
}

impl<W: Write> CodeWriter<W> {
    pub fn new(sink: W) -> Self {
        CodeWriter {
            sink,
            ctx: TranslationContext::new(),
            annotate: false,
            lines_written: 0,
        }
    }

    /// Precede each command's code with a `// <command>` line
    pub fn with_annotations(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Must be called once per input unit, before any of its commands
    pub fn set_unit_name(&mut self, name: &str) {
        self.ctx.set_unit_name(name);
    }

    pub fn context(&self) -> &TranslationContext {
        &self.ctx
    }

    /// Number of lines written to the sink so far
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Translate one parsed command
    pub fn write_command(&mut self, command: &Command) -> Result<(), TranslatorError> {
        debug!("Translating '{}' in unit '{}'", command, self.ctx.unit_name());
        if self.annotate {
            self.write_comment(&command.to_string())?;
        }

        match command {
            Command::Arithmetic(op) => self.write_arithmetic(*op),
            Command::Push(segment, index) => self.write_push(*segment, *index),
            Command::Pop(segment, index) => self.write_pop(*segment, *index),
            Command::Label(label) => self.write_label(label),
            Command::Goto(label) => self.write_goto(label),
            Command::IfGoto(label) => self.write_if(label),
            Command::Function(name, n_locals) => self.write_function(name, *n_locals),
            Command::Call(name, n_args) => self.write_call(name, *n_args),
            Command::Return => self.write_return(),
        }
    }

    pub fn write_comment(&mut self, text: &str) -> Result<(), TranslatorError> {
        let mut block = AsmBlock::new();
        block.line(format!("// {}", text));
        self.emit(block)
    }

    /// Write a finished block to the sink, in order, one line each
    pub(crate) fn emit(&mut self, block: AsmBlock) -> Result<(), TranslatorError> {
        for line in block.lines() {
            writeln!(self.sink, "{}", line)?;
        }
        self.lines_written += block.len();
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), TranslatorError> {
        self.sink.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

#[cfg(test)]
#[path = "codegen_tests.rs"]
mod tests;
