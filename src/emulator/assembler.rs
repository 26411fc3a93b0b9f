// Hack Assembler
// Two passes: label addresses first, then instructions with variables
// allocated from RAM[16] in order of first use.

use crate::emulator::EmulatorError;
use indexmap::IndexMap;
use log::debug;

/// First RAM address handed out to assembler variables
pub const VARIABLE_BASE: u16 = 16;

/// Largest value an A-instruction can load
pub const MAX_LITERAL: u16 = 0x7FFF;

lazy_static! {
    static ref PREDEFINED_SYMBOLS: IndexMap<String, u16> = {
        let mut symbols = IndexMap::new();
        for (name, address) in [("SP", 0), ("LCL", 1), ("ARG", 2), ("THIS", 3), ("THAT", 4)] {
            symbols.insert(name.to_string(), address);
        }
        for register in 0..16u16 {
            symbols.insert(format!("R{}", register), register);
        }
        symbols.insert("SCREEN".to_string(), 0x4000);
        symbols.insert("KBD".to_string(), 0x6000);
        symbols
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    A,
    D,
    M,
}

/// ALU computation of a C-instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comp {
    Constant(i16),
    Value(Register),
    Not(Register),
    Neg(Register),
    Inc(Register),
    Dec(Register),
    Add(Register, Register),
    Sub(Register, Register),
    And(Register, Register),
    Or(Register, Register),
    ShiftLeft(Register),
    ShiftRight(Register),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dest {
    pub a: bool,
    pub d: bool,
    pub m: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    Never,
    Gt,
    Eq,
    Ge,
    Lt,
    Ne,
    Le,
    Always,
}

impl Jump {
    pub fn taken(self, value: i16) -> bool {
        match self {
            Jump::Never => false,
            Jump::Gt => value > 0,
            Jump::Eq => value == 0,
            Jump::Ge => value >= 0,
            Jump::Lt => value < 0,
            Jump::Ne => value != 0,
            Jump::Le => value <= 0,
            Jump::Always => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Address(u16),
    Compute { dest: Dest, comp: Comp, jump: Jump },
}

/// An assembled program plus the symbols it defined
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    labels: IndexMap<String, u16>,
    variables: IndexMap<String, u16>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// ROM address of a label
    pub fn label(&self, name: &str) -> Option<u16> {
        self.labels.get(name).copied()
    }

    /// Any symbol: label, allocated variable, or predefined
    pub fn symbol(&self, name: &str) -> Option<u16> {
        self.labels
            .get(name)
            .or_else(|| self.variables.get(name))
            .or_else(|| PREDEFINED_SYMBOLS.get(name))
            .copied()
    }

    /// Label names in definition order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Variable names in allocation order
    pub fn variables(&self) -> impl Iterator<Item = (&str, u16)> {
        self.variables.iter().map(|(name, address)| (name.as_str(), *address))
    }
}

/// Strip comments and all whitespace from a source line
fn clean_line(line: &str) -> String {
    let code = match line.find("//") {
        Some(start) => &line[..start],
        None => line,
    };
    code.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn assemble(source: &str) -> Result<Program, EmulatorError> {
    let mut program = Program::default();

    // Pass 1: labels
    let mut rom_address: u16 = 0;
    let mut body = Vec::new();
    for (line_index, line) in source.lines().enumerate() {
        let line_number = line_index + 1;
        let code = clean_line(line);
        if code.is_empty() {
            continue;
        }
        if let Some(name) = code.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
            if name.is_empty() {
                return Err(EmulatorError::UnknownInstruction(code.clone(), line_number));
            }
            if program.labels.insert(name.to_string(), rom_address).is_some() {
                return Err(EmulatorError::DuplicateLabel(name.to_string(), line_number));
            }
        } else {
            body.push((code, line_number));
            rom_address = rom_address.wrapping_add(1);
        }
    }

    // Pass 2: instructions
    let mut next_variable = VARIABLE_BASE;
    for (code, line_number) in body {
        let instruction = if let Some(operand) = code.strip_prefix('@') {
            let address = if operand.bytes().all(|b| b.is_ascii_digit()) && !operand.is_empty() {
                match operand.parse::<u16>() {
                    Ok(value) if value <= MAX_LITERAL => value,
                    _ => return Err(EmulatorError::UnknownInstruction(code.clone(), line_number)),
                }
            } else if let Some(address) = program.symbol(operand) {
                address
            } else {
                let address = next_variable;
                program.variables.insert(operand.to_string(), address);
                next_variable += 1;
                address
            };
            Instruction::Address(address)
        } else {
            parse_compute(&code)
                .ok_or_else(|| EmulatorError::UnknownInstruction(code.clone(), line_number))?
        };
        program.instructions.push(instruction);
    }

    debug!(
        "Assembled {} instructions, {} labels, {} variables",
        program.instructions.len(),
        program.labels.len(),
        program.variables.len()
    );
    Ok(program)
}

fn parse_compute(code: &str) -> Option<Instruction> {
    let (assignment, jump) = match code.split_once(';') {
        Some((assignment, jump)) => (assignment, parse_jump(jump)?),
        None => (code, Jump::Never),
    };
    let (dest, comp) = match assignment.split_once('=') {
        Some((dest, comp)) => (parse_dest(dest)?, comp),
        None => (Dest::default(), assignment),
    };
    Some(Instruction::Compute {
        dest,
        comp: parse_comp(comp)?,
        jump,
    })
}

fn parse_dest(text: &str) -> Option<Dest> {
    let mut dest = Dest::default();
    for c in text.chars() {
        let slot = match c {
            'A' => &mut dest.a,
            'D' => &mut dest.d,
            'M' => &mut dest.m,
            _ => return None,
        };
        if *slot {
            return None;
        }
        *slot = true;
    }
    Some(dest)
}

fn parse_jump(text: &str) -> Option<Jump> {
    match text {
        "JGT" => Some(Jump::Gt),
        "JEQ" => Some(Jump::Eq),
        "JGE" => Some(Jump::Ge),
        "JLT" => Some(Jump::Lt),
        "JNE" => Some(Jump::Ne),
        "JLE" => Some(Jump::Le),
        "JMP" => Some(Jump::Always),
        _ => None,
    }
}

fn parse_register(text: &str) -> Option<Register> {
    match text {
        "A" => Some(Register::A),
        "D" => Some(Register::D),
        "M" => Some(Register::M),
        _ => None,
    }
}

fn parse_comp(text: &str) -> Option<Comp> {
    match text {
        "0" => return Some(Comp::Constant(0)),
        "1" => return Some(Comp::Constant(1)),
        "-1" => return Some(Comp::Constant(-1)),
        _ => {}
    }
    if let Some(reg) = text.strip_suffix("<<") {
        return parse_register(reg).map(Comp::ShiftLeft);
    }
    if let Some(reg) = text.strip_suffix(">>") {
        return parse_register(reg).map(Comp::ShiftRight);
    }
    if let Some(reg) = text.strip_prefix('!') {
        return parse_register(reg).map(Comp::Not);
    }
    if let Some(reg) = text.strip_prefix('-') {
        return parse_register(reg).map(Comp::Neg);
    }
    if let Some(reg) = parse_register(text) {
        return Some(Comp::Value(reg));
    }

    // Two-operand forms: X+1, 1+X, X-1, X+Y, X-Y, X&Y, X|Y
    if text.len() != 3 || !text.is_ascii() {
        return None;
    }
    let (left, op, right) = (&text[0..1], &text[1..2], &text[2..3]);
    match (parse_register(left), op, parse_register(right)) {
        (Some(x), "+", None) if right == "1" => Some(Comp::Inc(x)),
        (None, "+", Some(y)) if left == "1" => Some(Comp::Inc(y)),
        (Some(x), "-", None) if right == "1" => Some(Comp::Dec(x)),
        (Some(x), "+", Some(y)) if x != y => Some(Comp::Add(x, y)),
        (Some(x), "-", Some(y)) if x != y => Some(Comp::Sub(x, y)),
        (Some(x), "&", Some(y)) if x != y => Some(Comp::And(x, y)),
        (Some(x), "|", Some(y)) if x != y => Some(Comp::Or(x, y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_resolve_to_following_instruction() {
        let program = assemble("@END\n0;JMP\n(LOOP)\nD=D+1\n(END)\n").unwrap();
        assert_eq!(program.label("LOOP"), Some(2));
        assert_eq!(program.label("END"), Some(3));
        assert_eq!(program.instructions[0], Instruction::Address(3));
    }

    #[test]
    fn test_variables_allocated_from_16() {
        let program = assemble("@Foo.0\nM=D\n@Bar.0\nM=D\n@Foo.0\nD=M\n").unwrap();
        assert_eq!(program.symbol("Foo.0"), Some(16));
        assert_eq!(program.symbol("Bar.0"), Some(17));
        assert_eq!(program.instructions[4], Instruction::Address(16));
    }

    #[test]
    fn test_predefined_symbols() {
        let program = assemble("@R13\n@THAT\n@SCREEN\n").unwrap();
        assert_eq!(
            program.instructions,
            vec![
                Instruction::Address(13),
                Instruction::Address(4),
                Instruction::Address(0x4000)
            ]
        );
    }

    #[test]
    fn test_compute_forms() {
        assert_eq!(
            parse_compute("AM=M-1"),
            Some(Instruction::Compute {
                dest: Dest { a: true, d: false, m: true },
                comp: Comp::Dec(Register::M),
                jump: Jump::Never,
            })
        );
        assert_eq!(
            parse_compute("D;JNE"),
            Some(Instruction::Compute {
                dest: Dest::default(),
                comp: Comp::Value(Register::D),
                jump: Jump::Ne,
            })
        );
        assert_eq!(parse_comp("M<<"), Some(Comp::ShiftLeft(Register::M)));
        assert_eq!(parse_comp("D+M"), Some(Comp::Add(Register::D, Register::M)));
        assert_eq!(parse_comp("1+A"), Some(Comp::Inc(Register::A)));
        assert_eq!(parse_comp("D*M"), None);
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let err = assemble("(X)\nD=0\n(X)\n").unwrap_err();
        assert_eq!(err, EmulatorError::DuplicateLabel("X".to_string(), 3));
    }

    #[test]
    fn test_comments_and_spaces_ignored() {
        let program = assemble("// header\n  D = M + 1 ; JGT  // trailing\n").unwrap();
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn test_literal_too_large_rejected() {
        assert!(assemble("@32768").is_err());
        assert!(assemble("@32767").is_ok());
    }
}
