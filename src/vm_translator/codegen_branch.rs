/// codegen_branch.rs
/// Label and jump emission. Names are written exactly as given; scoping them
/// is the caller's job.
use crate::vm_translator::codegen::{AsmBlock, CodeWriter};
use crate::vm_translator::error::TranslatorError;
use std::io::Write;

impl<W: Write> CodeWriter<W> {
    pub fn write_label(&mut self, label: &str) -> Result<(), TranslatorError> {
        let mut block = AsmBlock::new();
        block.label(label);
        self.emit(block)
    }

    pub fn write_goto(&mut self, label: &str) -> Result<(), TranslatorError> {
        let mut block = AsmBlock::new();
        block.jump(label);
        self.emit(block)
    }

    /// Pop the top of stack and jump when it is non-zero
    pub fn write_if(&mut self, label: &str) -> Result<(), TranslatorError> {
        let mut block = AsmBlock::new();
        block.pop_d().jump_if_d(label, "JNE");
        self.emit(block)
    }
}
