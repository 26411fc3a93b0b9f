//! VM Command Model
//!
//! Closed enumerations for everything the translator accepts. Segment and
//! opcode names are resolved once, through `FromStr`, and every later stage
//! matches on the enums exhaustively. An unknown name can therefore only
//! surface here, as `InvalidSegment` or `InvalidOpcode`.

use crate::vm_translator::error::TranslatorError;
use std::fmt;
use std::str::FromStr;

/// Named memory segment of the VM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Pointer,
    Temp,
    Static,
}

/// How a segment reaches its storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentBase {
    /// Not memory at all: the index is the value
    Immediate,
    /// Base address lives in a pointer register (LCL, ARG, THIS, THAT)
    Register(&'static str),
    /// Base is a fixed RAM address
    Fixed(u16),
    /// Assembler-allocated symbol scoped by the current unit name
    Symbol,
}

/// RAM address where the `pointer` segment starts (THIS, THAT)
pub const POINTER_BASE: u16 = 3;

/// RAM address where the `temp` segment starts (R5..R12)
pub const TEMP_BASE: u16 = 5;

impl Segment {
    pub fn base(self) -> SegmentBase {
        match self {
            Segment::Constant => SegmentBase::Immediate,
            Segment::Local => SegmentBase::Register("LCL"),
            Segment::Argument => SegmentBase::Register("ARG"),
            Segment::This => SegmentBase::Register("THIS"),
            Segment::That => SegmentBase::Register("THAT"),
            Segment::Pointer => SegmentBase::Fixed(POINTER_BASE),
            Segment::Temp => SegmentBase::Fixed(TEMP_BASE),
            Segment::Static => SegmentBase::Symbol,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
            Segment::Static => "static",
        }
    }
}

impl FromStr for Segment {
    type Err = TranslatorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "constant" => Ok(Segment::Constant),
            "local" => Ok(Segment::Local),
            "argument" => Ok(Segment::Argument),
            "this" => Ok(Segment::This),
            "that" => Ok(Segment::That),
            "pointer" => Ok(Segment::Pointer),
            "temp" => Ok(Segment::Temp),
            "static" => Ok(Segment::Static),
            _ => Err(TranslatorError::InvalidSegment(name.to_string())),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Arithmetic and logical opcodes operating on the top of the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
    ShiftLeft,
    ShiftRight,
}

/// Where a unary operator sits in the emitted `M=` computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// `M=-M`, `M=!M`
    Prefix,
    /// `M=M<<`, `M=M>>`
    Postfix,
}

/// Emission template selected per opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpTemplate {
    Binary(&'static str),
    Unary(&'static str, Placement),
    Compare(Comparison),
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 11] = [
        ArithmeticOp::Add,
        ArithmeticOp::Sub,
        ArithmeticOp::Neg,
        ArithmeticOp::Eq,
        ArithmeticOp::Gt,
        ArithmeticOp::Lt,
        ArithmeticOp::And,
        ArithmeticOp::Or,
        ArithmeticOp::Not,
        ArithmeticOp::ShiftLeft,
        ArithmeticOp::ShiftRight,
    ];

    pub fn template(self) -> OpTemplate {
        match self {
            ArithmeticOp::Add => OpTemplate::Binary("+"),
            ArithmeticOp::Sub => OpTemplate::Binary("-"),
            ArithmeticOp::And => OpTemplate::Binary("&"),
            ArithmeticOp::Or => OpTemplate::Binary("|"),
            ArithmeticOp::Neg => OpTemplate::Unary("-", Placement::Prefix),
            ArithmeticOp::Not => OpTemplate::Unary("!", Placement::Prefix),
            ArithmeticOp::ShiftLeft => OpTemplate::Unary("<<", Placement::Postfix),
            ArithmeticOp::ShiftRight => OpTemplate::Unary(">>", Placement::Postfix),
            ArithmeticOp::Eq => OpTemplate::Compare(Comparison::Eq),
            ArithmeticOp::Gt => OpTemplate::Compare(Comparison::Gt),
            ArithmeticOp::Lt => OpTemplate::Compare(Comparison::Lt),
        }
    }

    /// Change in operand-stack depth after the operation runs
    pub fn stack_effect(self) -> i32 {
        match self.template() {
            OpTemplate::Binary(_) | OpTemplate::Compare(_) => -1,
            OpTemplate::Unary(_, _) => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
            ArithmeticOp::ShiftLeft => "shiftleft",
            ArithmeticOp::ShiftRight => "shiftright",
        }
    }
}

impl FromStr for ArithmeticOp {
    type Err = TranslatorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ArithmeticOp::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == name)
            .ok_or_else(|| TranslatorError::InvalidOpcode(name.to_string()))
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Three-way comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Gt,
    Lt,
}

/// Sign classes of the operand pair `(x, y)`, where x was below y on the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignCase {
    /// x < 0 <= y, so x < y whatever the magnitudes
    XNegativeYNonNegative,
    /// y < 0 <= x, so x > y whatever the magnitudes
    XNonNegativeYNegative,
    /// Both negative or both non-negative: x - y fits in 16 bits
    SameSign,
}

/// What the emitted code does for a given sign case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    True,
    False,
    Subtract,
}

impl Comparison {
    /// Hack jump mnemonic applied to `x - y`
    pub fn jump(self) -> &'static str {
        match self {
            Comparison::Eq => "JEQ",
            Comparison::Gt => "JGT",
            Comparison::Lt => "JLT",
        }
    }

    /// Decision table for the overflow-safe comparison
    pub fn outcome(self, case: SignCase) -> Outcome {
        match (self, case) {
            (_, SignCase::SameSign) => Outcome::Subtract,
            (Comparison::Eq, _) => Outcome::False,
            (Comparison::Gt, SignCase::XNonNegativeYNegative) => Outcome::True,
            (Comparison::Gt, SignCase::XNegativeYNonNegative) => Outcome::False,
            (Comparison::Lt, SignCase::XNegativeYNonNegative) => Outcome::True,
            (Comparison::Lt, SignCase::XNonNegativeYNegative) => Outcome::False,
        }
    }
}

/// One parsed VM command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Arithmetic(ArithmeticOp),
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function(String, u16),
    Call(String, u16),
    Return,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => write!(f, "{}", op),
            Command::Push(segment, index) => write!(f, "push {} {}", segment, index),
            Command::Pop(segment, index) => write!(f, "pop {} {}", segment, index),
            Command::Label(label) => write!(f, "label {}", label),
            Command::Goto(label) => write!(f, "goto {}", label),
            Command::IfGoto(label) => write!(f, "if-goto {}", label),
            Command::Function(name, n_locals) => write!(f, "function {} {}", name, n_locals),
            Command::Call(name, n_args) => write!(f, "call {} {}", name, n_args),
            Command::Return => write!(f, "return"),
        }
    }
}
