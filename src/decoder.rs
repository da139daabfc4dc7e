use serde::{Deserialize, Serialize};

use crate::bits::{field, sign_extend};
use crate::encoder::{ADDR_BITS, COND_SHIFT, IMM_BITS, OPCODE_SHIFT, RD_SHIFT, REG_BITS, RS_SHIFT, RT_SHIFT};
use crate::error::DecodeError;
use crate::tables::{by_opcode, Cond, Format, Op};

/// Fields of a program word. Slots the format does not use read as 0;
/// reserved bits are ignored, the same way the core ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub word: u16,
    pub op: Op,
    pub rd: u8,
    pub rs: u8,
    pub rt: u8,
    pub imm: i8,
    pub cond: Cond,
    pub target: u8,
}

pub fn decode(word: u16) -> Result<Decoded, DecodeError> {
    let opcode = field(word, OPCODE_SHIFT, 4) as u8;
    let desc = by_opcode(opcode).ok_or(DecodeError::UnknownOpcode { word, opcode })?;
    let reg = |shift| field(word, shift, REG_BITS) as u8;

    let mut d = Decoded {
        word,
        op: desc.op,
        rd: 0,
        rs: 0,
        rt: 0,
        imm: 0,
        cond: Cond::empty(),
        target: 0,
    };
    match desc.format {
        Format::Branch => {
            d.cond = Cond::from_bits_truncate(field(word, COND_SHIFT, 3) as u8);
            d.target = field(word, 0, ADDR_BITS) as u8;
        }
        Format::RegImm => {
            d.rd = reg(RD_SHIFT);
            d.imm = sign_extend(field(word, 0, IMM_BITS), IMM_BITS) as i8;
        }
        Format::SrcPair => {
            d.rs = reg(RS_SHIFT);
            d.rt = reg(RT_SHIFT);
        }
        Format::Triple => {
            d.rd = reg(RD_SHIFT);
            d.rs = reg(RS_SHIFT);
            d.rt = reg(RT_SHIFT);
        }
        Format::DstSrc => {
            d.rd = reg(RD_SHIFT);
            d.rs = reg(RS_SHIFT);
        }
        Format::Bare => {}
    }
    Ok(d)
}
