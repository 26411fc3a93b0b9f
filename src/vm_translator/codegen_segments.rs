/// codegen_segments.rs
/// Segment resolution and push/pop emission for CodeWriter
///
use crate::vm_translator::codegen::{AsmBlock, CodeWriter};
use crate::vm_translator::command::{Segment, SegmentBase};
use crate::vm_translator::error::TranslatorError;
use std::io::Write;

/// Where the value named by `segment index` lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A literal; there is no address
    Immediate(u16),
    /// `*(register) + offset`
    Indirect { register: &'static str, offset: u16 },
    /// A fixed RAM address or an assembler symbol
    Direct(String),
}

impl<W: Write> CodeWriter<W> {
    /// Map a segment reference to its storage location
    pub fn resolve(&self, segment: Segment, index: u16) -> Location {
        match segment.base() {
            SegmentBase::Immediate => Location::Immediate(index),
            SegmentBase::Register(register) => Location::Indirect {
                register,
                offset: index,
            },
            // No upper bound check: temp 9 simply lands past R12
            SegmentBase::Fixed(base) => Location::Direct((base as u32 + index as u32).to_string()),
            SegmentBase::Symbol => Location::Direct(self.ctx.static_symbol(index)),
        }
    }

    /// `push segment index`: load the value into D, then push D
    pub fn write_push(&mut self, segment: Segment, index: u16) -> Result<(), TranslatorError> {
        let mut block = AsmBlock::new();
        match self.resolve(segment, index) {
            Location::Immediate(value) => {
                block.at(value).line("D=A");
            }
            Location::Indirect { register, offset } => {
                block
                    .at(register)
                    .line("D=M")
                    .at(offset)
                    .line("A=D+A")
                    .line("D=M");
            }
            Location::Direct(address) => {
                block.at(address).line("D=M");
            }
        }
        block.push_d();
        self.emit(block)
    }

    /// `pop segment index`: store the top of stack at the resolved address
    pub fn write_pop(&mut self, segment: Segment, index: u16) -> Result<(), TranslatorError> {
        let mut block = AsmBlock::new();
        match self.resolve(segment, index) {
            Location::Immediate(_) => {
                return Err(TranslatorError::InvalidSegment(format!(
                    "{} (read-only, cannot pop)",
                    segment
                )));
            }
            Location::Indirect { register, offset } => {
                // Destination goes to R13 first: popping clobbers both A and D
                block
                    .at(register)
                    .line("D=M")
                    .at(offset)
                    .line("D=D+A")
                    .at("R13")
                    .line("M=D")
                    .pop_d()
                    .at("R13")
                    .line("A=M")
                    .line("M=D");
            }
            Location::Direct(address) => {
                block.pop_d().at(address).line("M=D");
            }
        }
        self.emit(block)
    }
}
