use serde::Serialize;
use std::fmt;

/// Failures that invalidate address assignment for the whole program.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("duplicate label definition: {label}")]
    DuplicateLabel { label: String },
}

/// Failures local to one instruction; the pass records them and moves on.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EncodeError {
    #[error("malformed instruction")]
    MalformedInstruction,
    #[error("unknown mnemonic: {0}")]
    UnknownMnemonic(String),
    #[error("{mnemonic} expects {expected} operand(s), got {found}")]
    OperandCount { mnemonic: String, expected: usize, found: usize },
    #[error("invalid or unmapped register: {0}")]
    InvalidRegister(String),
    #[error("invalid immediate value: {0} (expected #<decimal>)")]
    InvalidImmediateFormat(String),
    #[error("immediate {value} out of range for {bits} bits (min: {min}, max: {max})")]
    ImmediateRange { value: String, bits: u32, min: i64, max: i64 },
    #[error("undefined label: {0}")]
    UndefinedLabel(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown opcode {opcode:#06b} in word {word:#06x}")]
    UnknownOpcode { word: u16, opcode: u8 },
}

/// A per-instruction error tied back to where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub address: usize,
    pub text: String,
    pub error: EncodeError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "address {} ('{}'): {}", self.address, self.text, self.error)
    }
}

impl std::error::Error for Diagnostic {}
