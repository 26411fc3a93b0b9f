// Translator Error Handling

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TranslatorError {
    // Caller contract violations
    InvalidSegment(String),
    InvalidOpcode(String),

    // Source errors
    ParseError(String, usize), // message, line
    InvalidUnitName(String),

    // Configuration errors
    ConfigError(String),

    // IO errors
    IOError(String),
}

impl fmt::Display for TranslatorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TranslatorError::InvalidSegment(segment) => {
                write!(f, "Invalid memory segment '{}'", segment)
            }
            TranslatorError::InvalidOpcode(opcode) => {
                write!(f, "Invalid arithmetic/logical opcode '{}'", opcode)
            }
            TranslatorError::ParseError(msg, line) => {
                write!(f, "Parse error at line {}: {}", line, msg)
            }
            TranslatorError::InvalidUnitName(name) => {
                write!(f, "Invalid unit name '{}': '$' is reserved for generated labels", name)
            }
            TranslatorError::ConfigError(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
            TranslatorError::IOError(msg) => {
                write!(f, "IO error: {}", msg)
            }
        }
    }
}

impl std::error::Error for TranslatorError {}

impl From<std::io::Error> for TranslatorError {
    fn from(err: std::io::Error) -> Self {
        TranslatorError::IOError(err.to_string())
    }
}
