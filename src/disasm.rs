use std::collections::BTreeMap;

use crate::decoder::{decode, Decoded};
use crate::tables::{desc, Op};

pub fn fmt_decoded(d: &Decoded) -> String {
    fmt_with(d, |_| None)
}

/// Like [`fmt_decoded`], naming branch targets through `label`.
pub fn fmt_with<'a, F>(d: &Decoded, label: F) -> String
where
    F: Fn(usize) -> Option<&'a str>,
{
    let mn = desc(d.op).mnemonic;
    match d.op {
        Op::Br => {
            let target = d.target as usize;
            match label(target) {
                Some(name) => format!("BR{} {}", d.cond.suffix(), name),
                None => format!("BR{} {}", d.cond.suffix(), target),
            }
        }
        Op::Const => format!("CONST R{}, #{}", d.rd, d.imm),
        Op::Cmp | Op::Str => format!("{mn} R{}, R{}", d.rs, d.rt),
        Op::Add | Op::Sub | Op::Mul | Op::Div => format!("{mn} R{}, R{}, R{}", d.rd, d.rs, d.rt),
        Op::Ldr => format!("LDR R{}, R{}", d.rd, d.rs),
        Op::Nop | Op::Ret => mn.to_string(),
    }
}

/// Every branch target in `words`, named `L<addr>`.
pub fn derive_labels(words: &[u16]) -> BTreeMap<usize, String> {
    words
        .iter()
        .filter_map(|&w| decode(w).ok())
        .filter(|d| d.op == Op::Br)
        .map(|d| d.target as usize)
        .map(|t| (t, format!("L{t}")))
        .collect()
}

/// Renders assembler source for `words` that reassembles at the same addresses.
///
/// Each address keeps exactly one instruction line. An undecodable word is
/// written as `NOP` with the decode error in a comment, so it reassembles to
/// `0x0000` without moving any later address. Branch targets past the end are
/// reached by padding with `NOP`s and declaring the label after them; the
/// reassembled image then has `words` as a prefix.
pub fn disassemble(words: &[u16]) -> String {
    let labels = derive_labels(words);
    let name = |addr: usize| labels.get(&addr).map(String::as_str);
    let end = labels.keys().next_back().map_or(words.len(), |&t| t.max(words.len()));
    let mut out = String::new();
    for addr in 0..end {
        if let Some(l) = labels.get(&addr) {
            out.push_str(&format!("{l}:\n"));
        }
        match words.get(addr).map(|&w| decode(w)) {
            Some(Ok(d)) => out.push_str(&format!("    {}\n", fmt_with(&d, name))),
            Some(Err(e)) => out.push_str(&format!("    NOP ; {e}\n")),
            None => out.push_str("    NOP ; padding\n"),
        }
    }
    if let Some(l) = labels.get(&end) {
        out.push_str(&format!("{l}:\n"));
    }
    out
}
