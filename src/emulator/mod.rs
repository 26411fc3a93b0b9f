//! Hack assembler and CPU emulator
//!
//! Used to check translated programs by running them: assemble the emitted
//! text into a [`Program`], load it into a [`HackMachine`], run, then inspect
//! RAM. The machine follows the Hack CPU: 16-bit words, registers A and D,
//! `M` meaning `RAM[A]`, and a ROM the program counter walks through. The ALU
//! also accepts the extended shift computations `X<<` and `X>>`.

pub mod assembler;
pub mod cpu;

pub use assembler::{assemble, Program};
pub use cpu::HackMachine;

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EmulatorError {
    UnknownInstruction(String, usize), // text, line
    DuplicateLabel(String, usize),     // name, line
    UnknownSymbol(String),
    AddressOutOfRange(u16),
    StepLimit(usize),
}

impl fmt::Display for EmulatorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmulatorError::UnknownInstruction(text, line) => {
                write!(f, "Unknown instruction '{}' at line {}", text, line)
            }
            EmulatorError::DuplicateLabel(name, line) => {
                write!(f, "Label '{}' redefined at line {}", name, line)
            }
            EmulatorError::UnknownSymbol(name) => write!(f, "Unknown symbol '{}'", name),
            EmulatorError::AddressOutOfRange(address) => {
                write!(f, "RAM address 0x{:04x} out of range", address)
            }
            EmulatorError::StepLimit(steps) => {
                write!(f, "Program still running after {} steps", steps)
            }
        }
    }
}

impl std::error::Error for EmulatorError {}
