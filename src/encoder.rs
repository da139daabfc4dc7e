use serde::Serialize;
use tracing::warn;

use crate::bits::{fits_signed, pack, signed_bounds, twos_complement};
use crate::compiler::{CompiledEntry, Outcome};
use crate::error::EncodeError;
use crate::symbols::SymbolTable;
use crate::tables::{self, Cond, Format, Op, OpDesc};

// Field offsets within the 16-bit word.
pub const OPCODE_SHIFT: u32 = 12;
pub const RD_SHIFT: u32 = 8;
pub const RS_SHIFT: u32 = 4;
pub const RT_SHIFT: u32 = 0;
pub const COND_SHIFT: u32 = 9;
pub const REG_BITS: u32 = 4;
pub const IMM_BITS: u32 = 8;
pub const ADDR_BITS: u32 = 8;

/// Operands as parsed for each layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Operands {
    Branch { cond: Cond, target: String },
    RegImm { rd: u8, imm: i64 },
    SrcPair { rs: u8, rt: u8 },
    Triple { rd: u8, rs: u8, rt: u8 },
    DstSrc { rd: u8, rs: u8 },
    Bare,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instr {
    pub op: Op,
    pub operands: Operands,
}

/// Splits on runs of whitespace and commas.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect()
}

/// Parses a mnemonic once: anything starting with `BR` is the branch family,
/// with N/Z/P picked out of the rest of the token.
pub fn parse_mnemonic(token: &str) -> Result<(&'static OpDesc, Cond), EncodeError> {
    let upper = token.to_ascii_uppercase();
    if let Some(suffix) = upper.strip_prefix("BR") {
        return Ok((tables::desc(Op::Br), Cond::from_suffix(suffix)));
    }
    tables::by_mnemonic(&upper)
        .map(|d| (d, Cond::empty()))
        .ok_or(EncodeError::UnknownMnemonic(upper))
}

fn reg(token: &str) -> Result<u8, EncodeError> {
    tables::register(token).ok_or_else(|| EncodeError::InvalidRegister(token.to_string()))
}

fn immediate(token: &str, bits: u32) -> Result<i64, EncodeError> {
    let digits = token
        .strip_prefix('#')
        .ok_or_else(|| EncodeError::InvalidImmediateFormat(token.to_string()))?;
    let (min, max) = signed_bounds::<i64>(bits);
    let out_of_range = || EncodeError::ImmediateRange { value: digits.to_string(), bits, min, max };
    let value = match digits.parse::<i64>() {
        Ok(v) => v,
        Err(e) => {
            use std::num::IntErrorKind::*;
            return Err(match e.kind() {
                PosOverflow | NegOverflow => out_of_range(),
                _ => EncodeError::InvalidImmediateFormat(token.to_string()),
            });
        }
    };
    if !fits_signed(value, bits) {
        return Err(out_of_range());
    }
    Ok(value)
}

impl Instr {
    /// Parses one tokenized instruction. Arity is checked before any operand.
    pub fn parse(tokens: &[&str]) -> Result<Self, EncodeError> {
        let (&mnemonic, ops) = tokens.split_first().ok_or(EncodeError::MalformedInstruction)?;
        let (desc, cond) = parse_mnemonic(mnemonic)?;
        let expected = desc.format.arity();
        if ops.len() != expected {
            return Err(EncodeError::OperandCount {
                mnemonic: mnemonic.to_ascii_uppercase(),
                expected,
                found: ops.len(),
            });
        }
        let operands = match desc.format {
            Format::Branch => Operands::Branch { cond, target: ops[0].to_ascii_uppercase() },
            Format::RegImm => Operands::RegImm { rd: reg(ops[0])?, imm: immediate(ops[1], IMM_BITS)? },
            Format::SrcPair => Operands::SrcPair { rs: reg(ops[0])?, rt: reg(ops[1])? },
            Format::Triple => Operands::Triple { rd: reg(ops[0])?, rs: reg(ops[1])?, rt: reg(ops[2])? },
            Format::DstSrc => Operands::DstSrc { rd: reg(ops[0])?, rs: reg(ops[1])? },
            Format::Bare => Operands::Bare,
        };
        Ok(Instr { op: desc.op, operands })
    }

    /// Packs the word. Branch targets are absolute addresses; anything past
    /// 255 wraps to the low 8 bits.
    pub fn encode(&self, symbols: &SymbolTable) -> Result<u16, EncodeError> {
        let opcode = pack(tables::desc(self.op).opcode as u16, OPCODE_SHIFT, 4);
        let body = match &self.operands {
            Operands::Branch { cond, target } => {
                let addr = symbols
                    .get(target)
                    .ok_or_else(|| EncodeError::UndefinedLabel(target.clone()))?;
                pack(cond.bits() as u16, COND_SHIFT, 3) | pack(addr as u16, 0, ADDR_BITS)
            }
            Operands::RegImm { rd, imm } => {
                pack(*rd as u16, RD_SHIFT, REG_BITS) | twos_complement(*imm, IMM_BITS)
            }
            Operands::SrcPair { rs, rt } => {
                pack(*rs as u16, RS_SHIFT, REG_BITS) | pack(*rt as u16, RT_SHIFT, REG_BITS)
            }
            Operands::Triple { rd, rs, rt } => {
                pack(*rd as u16, RD_SHIFT, REG_BITS)
                    | pack(*rs as u16, RS_SHIFT, REG_BITS)
                    | pack(*rt as u16, RT_SHIFT, REG_BITS)
            }
            Operands::DstSrc { rd, rs } => {
                pack(*rd as u16, RD_SHIFT, REG_BITS) | pack(*rs as u16, RS_SHIFT, REG_BITS)
            }
            Operands::Bare => 0,
        };
        Ok(opcode | body)
    }
}

/// Tokenize, parse and pack a single instruction line.
pub fn encode_line(text: &str, symbols: &SymbolTable) -> Result<u16, EncodeError> {
    Instr::parse(&tokenize(text))?.encode(symbols)
}

/// Pass 2: one entry per instruction, failures recorded in place.
pub fn encode_all<S: AsRef<str>>(instructions: &[S], symbols: &SymbolTable) -> Vec<CompiledEntry> {
    instructions
        .iter()
        .enumerate()
        .map(|(address, text)| {
            let text = text.as_ref();
            let outcome = match encode_line(text, symbols) {
                Ok(word) => Outcome::Word(word),
                Err(error) => {
                    warn!(address, instruction = text, %error, "failed to encode instruction");
                    Outcome::Error(error)
                }
            };
            CompiledEntry { address, text: text.to_string(), outcome }
        })
        .collect()
}
