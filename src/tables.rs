use bitflags::bitflags;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Nop,
    Br,
    Cmp,
    Add,
    Sub,
    Mul,
    Div,
    Ldr,
    Str,
    Const,
    Ret,
}

/// Operand shape of an instruction, which also fixes its bit layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    /// `op | n z p 0 | addr8`
    Branch,
    /// `op | Rd | imm8`
    RegImm,
    /// `op | 0000 | Rs | Rt`
    SrcPair,
    /// `op | Rd | Rs | Rt`
    Triple,
    /// `op | Rd | Rs | 0000`
    DstSrc,
    /// `op | 0000 0000 0000`
    Bare,
}

impl Format {
    pub fn arity(self) -> usize {
        match self {
            Format::Bare => 0,
            Format::Branch => 1,
            Format::RegImm | Format::SrcPair | Format::DstSrc => 2,
            Format::Triple => 3,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OpDesc {
    pub op: Op,
    pub mnemonic: &'static str,
    pub opcode: u8,
    pub format: Format,
}

pub const OPCODES: &[OpDesc] = &[
    OpDesc { op: Op::Nop, mnemonic: "NOP", opcode: 0b0000, format: Format::Bare },
    OpDesc { op: Op::Br, mnemonic: "BR", opcode: 0b0001, format: Format::Branch },
    OpDesc { op: Op::Cmp, mnemonic: "CMP", opcode: 0b0010, format: Format::SrcPair },
    OpDesc { op: Op::Add, mnemonic: "ADD", opcode: 0b0011, format: Format::Triple },
    OpDesc { op: Op::Sub, mnemonic: "SUB", opcode: 0b0100, format: Format::Triple },
    OpDesc { op: Op::Mul, mnemonic: "MUL", opcode: 0b0101, format: Format::Triple },
    OpDesc { op: Op::Div, mnemonic: "DIV", opcode: 0b0110, format: Format::Triple },
    OpDesc { op: Op::Ldr, mnemonic: "LDR", opcode: 0b0111, format: Format::DstSrc },
    OpDesc { op: Op::Str, mnemonic: "STR", opcode: 0b1000, format: Format::SrcPair },
    OpDesc { op: Op::Const, mnemonic: "CONST", opcode: 0b1001, format: Format::RegImm },
    OpDesc { op: Op::Ret, mnemonic: "RET", opcode: 0b1111, format: Format::Bare },
];

/// Exact (case-insensitive) mnemonic lookup. The branch family is matched by
/// prefix in the encoder, not here.
pub fn by_mnemonic(name: &str) -> Option<&'static OpDesc> {
    OPCODES.iter().find(|d| d.mnemonic.eq_ignore_ascii_case(name))
}

pub fn by_opcode(opcode: u8) -> Option<&'static OpDesc> {
    OPCODES.iter().find(|d| d.opcode == opcode)
}

pub fn desc(op: Op) -> &'static OpDesc {
    // rows are declared in `Op` order
    &OPCODES[op as usize]
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cond: u8 {
const N = 0b100; // negative
const Z = 0b010; // zero
const P = 0b001; // positive
}
}

impl Cond {
    /// Collects N/Z/P from a branch suffix; letters may repeat or come in any order.
    pub fn from_suffix(suffix: &str) -> Self {
        let mut cond = Cond::empty();
        for c in suffix.chars() {
            match c.to_ascii_uppercase() {
                'N' => cond |= Cond::N,
                'Z' => cond |= Cond::Z,
                'P' => cond |= Cond::P,
                _ => {}
            }
        }
        cond
    }

    pub fn suffix(self) -> String {
        let mut s = String::new();
        if self.contains(Cond::N) { s.push('n'); }
        if self.contains(Cond::Z) { s.push('z'); }
        if self.contains(Cond::P) { s.push('p'); }
        s
    }
}

pub const REGISTERS: &[(&str, u8)] = &[
    ("R0", 0), ("R1", 1), ("R2", 2), ("R3", 3),
    ("R4", 4), ("R5", 5), ("R6", 6), ("R7", 7),
    ("R8", 8), ("R9", 9), ("R10", 10), ("R11", 11),
    ("R12", 12), ("R13", 13), ("R14", 14), ("R15", 15),
    // special registers, read-only views of the launch geometry
    ("%blockIdx", 13),
    ("%blockDim", 14),
    ("%threadIdx", 15),
];

pub const REGISTER_COUNT: u8 = 16;

/// Resolves `R<n>` or a special-register alias to its 4-bit index, ignoring case.
pub fn register(token: &str) -> Option<u8> {
    let t = token.trim();
    if let Some(&(_, idx)) = REGISTERS.iter().find(|(name, _)| name.eq_ignore_ascii_case(t)) {
        return Some(idx);
    }
    // R<digits> with leading zeros, e.g. R07
    let digits = t.strip_prefix(['R', 'r'])?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n = digits.parse::<u32>().ok()?;
    (n < REGISTER_COUNT as u32).then_some(n as u8)
}
