// VM Source Parser
// Turns the text of one VM unit into a list of commands

use crate::vm_translator::command::{ArithmeticOp, Command, Segment};
use crate::vm_translator::error::TranslatorError;

/// Largest value `push constant` can load in one A-instruction
pub const MAX_CONSTANT: u16 = 0x7FFF;

/// Parse every command in a unit, skipping comments and blank lines
pub fn parse_source(source: &str) -> Result<Vec<Command>, TranslatorError> {
    let mut commands = Vec::new();
    for (line_index, line) in source.lines().enumerate() {
        if let Some(command) = parse_line(line, line_index + 1)? {
            commands.push(command);
        }
    }
    Ok(commands)
}

/// Parse a single source line. Returns `None` for lines with no command.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<Command>, TranslatorError> {
    let code = match line.find("//") {
        Some(start) => &line[..start],
        None => line,
    };
    let tokens: Vec<&str> = code.split_whitespace().collect();
    let Some((&keyword, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match keyword {
        "push" | "pop" => {
            expect_args(keyword, args, 2, line_number)?;
            let segment: Segment = args[0].parse()?;
            let index = parse_number(args[1], line_number)?;
            if segment == Segment::Constant && index > MAX_CONSTANT {
                return Err(TranslatorError::ParseError(
                    format!("constant {} does not fit in 15 bits", index),
                    line_number,
                ));
            }
            if keyword == "push" {
                Command::Push(segment, index)
            } else {
                Command::Pop(segment, index)
            }
        }
        "label" | "goto" | "if-goto" => {
            expect_args(keyword, args, 1, line_number)?;
            let label = parse_symbol(args[0], line_number)?;
            match keyword {
                "label" => Command::Label(label),
                "goto" => Command::Goto(label),
                _ => Command::IfGoto(label),
            }
        }
        "function" | "call" => {
            expect_args(keyword, args, 2, line_number)?;
            let name = parse_symbol(args[0], line_number)?;
            let count = parse_number(args[1], line_number)?;
            if keyword == "function" {
                Command::Function(name, count)
            } else {
                Command::Call(name, count)
            }
        }
        "return" => {
            expect_args(keyword, args, 0, line_number)?;
            Command::Return
        }
        _ => {
            let op: ArithmeticOp = keyword.parse()?;
            expect_args(keyword, args, 0, line_number)?;
            Command::Arithmetic(op)
        }
    };
    Ok(Some(command))
}

fn expect_args(
    keyword: &str,
    args: &[&str],
    expected: usize,
    line_number: usize,
) -> Result<(), TranslatorError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(TranslatorError::ParseError(
            format!(
                "'{}' takes {} argument(s), found {}",
                keyword,
                expected,
                args.len()
            ),
            line_number,
        ))
    }
}

fn parse_number(token: &str, line_number: usize) -> Result<u16, TranslatorError> {
    token.parse::<u16>().map_err(|_| {
        TranslatorError::ParseError(
            format!("expected a non-negative integer, found '{}'", token),
            line_number,
        )
    })
}

/// Label and function names: letters, digits, `_`, `.` and `:`, not
/// starting with a digit. `$` is reserved for generated labels.
fn parse_symbol(token: &str, line_number: usize) -> Result<String, TranslatorError> {
    let valid = token
        .chars()
        .next()
        .is_some_and(|first| !first.is_ascii_digit())
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':'));
    if valid {
        Ok(token.to_string())
    } else {
        Err(TranslatorError::ParseError(
            format!("invalid symbol '{}'", token),
            line_number,
        ))
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
