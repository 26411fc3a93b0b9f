/// codegen_calls.rs
/// Function entry, call and return sequences for CodeWriter
///
/// Frame layout built by `call f n` (stack grows upward):
///
/// ```text
///   ARG  -> arg 0 .. arg n-1
///           return address
///           saved LCL
///           saved ARG
///           saved THIS
///           saved THAT
///   LCL  -> local 0 .. (zeroed by `function f k`)
/// ```
use crate::vm_translator::codegen::{AsmBlock, CodeWriter};
use crate::vm_translator::command::Segment;
use crate::vm_translator::error::TranslatorError;
use log::debug;
use std::io::Write;

/// Words pushed by a call between the arguments and the callee's locals
pub const SAVED_FRAME_WORDS: u16 = 5;

/// Caller pointers saved by a call, in push order
const SAVED_POINTERS: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

/// Restore order on return, paired with the offset below the frame base
const RESTORE_ORDER: [(&str, u16); 4] = [("THAT", 1), ("THIS", 2), ("ARG", 3), ("LCL", 4)];

/// Scratch cell holding the frame base during return
const FRAME: &str = "R13";

/// Scratch cell holding the return address during return
const RETURN_ADDRESS: &str = "R14";

/// Default initial stack pointer for the bootstrap
pub const DEFAULT_STACK_BASE: u16 = 256;

/// Entry point called by the bootstrap
pub const ENTRY_FUNCTION: &str = "Sys.init";

impl<W: Write> CodeWriter<W> {
    /// `function name n_locals`: entry label, then n_locals zeroed locals
    pub fn write_function(&mut self, name: &str, n_locals: u16) -> Result<(), TranslatorError> {
        self.write_label(name)?;
        for _ in 0..n_locals {
            self.write_push(Segment::Constant, 0)?;
        }
        Ok(())
    }

    /// `call name n_args`
    pub fn write_call(&mut self, name: &str, n_args: u16) -> Result<(), TranslatorError> {
        let id = self.ctx.next_call_id();
        let return_label = format!("{}$ret${}", name, id);
        debug!("Call to '{}' with {} args returns to '{}'", name, n_args, return_label);

        let mut block = AsmBlock::new();
        block.at(&return_label).line("D=A").push_d();
        for pointer in SAVED_POINTERS {
            block.at(pointer).line("D=M").push_d();
        }

        // ARG = SP - 5 - n_args
        block
            .at("SP")
            .line("D=M")
            .at(SAVED_FRAME_WORDS as u32 + n_args as u32)
            .line("D=D-A")
            .at("ARG")
            .line("M=D");

        // LCL = SP
        block.at("SP").line("D=M").at("LCL").line("M=D");

        block.jump(name).label(&return_label);
        self.emit(block)
    }

    /// `return`. No underflow checks: nesting is the caller's guarantee.
    pub fn write_return(&mut self) -> Result<(), TranslatorError> {
        let mut block = AsmBlock::new();

        // frame = LCL
        block.at("LCL").line("D=M").at(FRAME).line("M=D");

        // Return address must be read before *ARG is written: with zero
        // arguments ARG points at the very slot holding it
        block
            .at(SAVED_FRAME_WORDS)
            .line("A=D-A")
            .line("D=M")
            .at(RETURN_ADDRESS)
            .line("M=D");

        // *ARG = pop()
        block.pop_d().at("ARG").line("A=M").line("M=D");

        // SP = ARG + 1
        block.at("ARG").line("D=M+1").at("SP").line("M=D");

        for (pointer, offset) in RESTORE_ORDER {
            block
                .at(FRAME)
                .line("D=M")
                .at(offset)
                .line("A=D-A")
                .line("D=M")
                .at(pointer)
                .line("M=D");
        }

        block.at(RETURN_ADDRESS).line("A=M").line("0;JMP");
        self.emit(block)
    }

    /// `SP = stack_base; call Sys.init 0`
    pub fn write_bootstrap(&mut self, stack_base: u16) -> Result<(), TranslatorError> {
        debug!("Bootstrap: SP={} then call {}", stack_base, ENTRY_FUNCTION);
        let mut block = AsmBlock::new();
        block.at(stack_base).line("D=A").at("SP").line("M=D");
        self.emit(block)?;
        self.write_call(ENTRY_FUNCTION, 0)
    }
}
