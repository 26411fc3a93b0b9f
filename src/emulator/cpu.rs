// Hack CPU emulator

use crate::emulator::assembler::{Comp, Instruction, Program, Register};
use crate::emulator::EmulatorError;
use log::debug;

/// Words of data memory
pub const RAM_SIZE: usize = 0x8000;

/// RAM address of the stack pointer
const SP: u16 = 0;

pub struct HackMachine {
    program: Program,
    ram: Vec<i16>,
    a: i16,
    d: i16,
    pc: usize,
    steps: usize,
}

impl HackMachine {
    pub fn new(program: Program) -> Self {
        HackMachine {
            program,
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
            steps: 0,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn ram(&self, address: u16) -> i16 {
        self.ram.get(address as usize).copied().unwrap_or(0)
    }

    pub fn set_ram(&mut self, address: u16, value: i16) {
        if let Some(slot) = self.ram.get_mut(address as usize) {
            *slot = value;
        }
    }

    /// Value of a symbol's RAM cell (statics, pointers, R13..)
    pub fn ram_at_symbol(&self, name: &str) -> Option<i16> {
        self.program.symbol(name).map(|address| self.ram(address))
    }

    pub fn sp(&self) -> u16 {
        self.ram(SP) as u16
    }

    /// Stack contents from `base` up to (not including) SP
    pub fn stack(&self, base: u16) -> Vec<i16> {
        (base..self.sp()).map(|address| self.ram(address)).collect()
    }

    pub fn a(&self) -> i16 {
        self.a
    }

    pub fn d(&self) -> i16 {
        self.d
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// The program has run off the end of ROM
    pub fn is_halted(&self) -> bool {
        self.pc >= self.program.len()
    }

    fn memory_slot(&self) -> Result<usize, EmulatorError> {
        let address = self.a as u16;
        if (address as usize) < RAM_SIZE {
            Ok(address as usize)
        } else {
            Err(EmulatorError::AddressOutOfRange(address))
        }
    }

    fn read(&self, register: Register) -> Result<i16, EmulatorError> {
        match register {
            Register::A => Ok(self.a),
            Register::D => Ok(self.d),
            Register::M => Ok(self.ram[self.memory_slot()?]),
        }
    }

    fn compute(&self, comp: Comp) -> Result<i16, EmulatorError> {
        let value = match comp {
            Comp::Constant(value) => value,
            Comp::Value(r) => self.read(r)?,
            Comp::Not(r) => !self.read(r)?,
            Comp::Neg(r) => self.read(r)?.wrapping_neg(),
            Comp::Inc(r) => self.read(r)?.wrapping_add(1),
            Comp::Dec(r) => self.read(r)?.wrapping_sub(1),
            Comp::Add(x, y) => self.read(x)?.wrapping_add(self.read(y)?),
            Comp::Sub(x, y) => self.read(x)?.wrapping_sub(self.read(y)?),
            Comp::And(x, y) => self.read(x)? & self.read(y)?,
            Comp::Or(x, y) => self.read(x)? | self.read(y)?,
            Comp::ShiftLeft(r) => self.read(r)?.wrapping_shl(1),
            Comp::ShiftRight(r) => self.read(r)? >> 1,
        };
        Ok(value)
    }

    /// Execute one instruction
    pub fn step(&mut self) -> Result<(), EmulatorError> {
        let Some(&instruction) = self.program.instructions.get(self.pc) else {
            return Ok(());
        };
        self.steps += 1;

        match instruction {
            Instruction::Address(value) => {
                self.a = value as i16;
                self.pc += 1;
            }
            Instruction::Compute { dest, comp, jump } => {
                let value = self.compute(comp)?;
                // Jump target and M address both use A from before this instruction
                let old_a = self.a;
                if dest.m {
                    let slot = self.memory_slot()?;
                    self.ram[slot] = value;
                }
                if dest.a {
                    self.a = value;
                }
                if dest.d {
                    self.d = value;
                }
                self.pc = if jump.taken(value) {
                    old_a as u16 as usize
                } else {
                    self.pc + 1
                };
            }
        }
        Ok(())
    }

    /// Run until the program counter leaves ROM
    pub fn run(&mut self, max_steps: usize) -> Result<usize, EmulatorError> {
        let start = self.steps;
        while !self.is_halted() {
            if self.steps - start >= max_steps {
                return Err(EmulatorError::StepLimit(max_steps));
            }
            self.step()?;
        }
        debug!("Halted at pc={} after {} steps", self.pc, self.steps - start);
        Ok(self.steps - start)
    }

    /// Run until execution reaches the given label
    pub fn run_until(&mut self, label: &str, max_steps: usize) -> Result<usize, EmulatorError> {
        let target = self
            .program
            .label(label)
            .ok_or_else(|| EmulatorError::UnknownSymbol(label.to_string()))? as usize;
        let start = self.steps;
        while self.pc != target && !self.is_halted() {
            if self.steps - start >= max_steps {
                return Err(EmulatorError::StepLimit(max_steps));
            }
            self.step()?;
        }
        Ok(self.steps - start)
    }
}
