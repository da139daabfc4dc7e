use std::fmt::Write as _;

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use crate::compiler::{Compiled, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    /// `        0b<bits>, # <source>`, ready to paste into a program-memory list
    Listing,
    /// `Address <n> (0b<bits>): <source>`
    Verbose,
    /// one `XXXX` word per line
    Hex,
    Json,
}

/// MSB-first binary digits of a program word.
pub fn bit_string(word: u16) -> String {
    word.view_bits::<Msb0>()
        .iter()
        .map(|b| if *b { '1' } else { '0' })
        .collect()
}

pub fn render(compiled: &Compiled, format: Format) -> serde_json::Result<String> {
    let mut out = String::new();
    match format {
        Format::Json => return serde_json::to_string_pretty(&compiled.entries),
        Format::Listing => {
            for e in &compiled.entries {
                let code = match &e.outcome {
                    Outcome::Word(w) => format!("0b{}", bit_string(*w)),
                    Outcome::Error(_) => "ERROR".to_string(),
                };
                let _ = writeln!(out, "        {code}, # {}", e.text);
            }
        }
        Format::Verbose => {
            for e in &compiled.entries {
                let code = match &e.outcome {
                    Outcome::Word(w) => format!("0b{}", bit_string(*w)),
                    Outcome::Error(_) => "ERROR".to_string(),
                };
                let _ = writeln!(out, "Address {} ({code}): {}", e.address, e.text);
            }
        }
        Format::Hex => {
            for e in &compiled.entries {
                match e.outcome {
                    Outcome::Word(w) => { let _ = writeln!(out, "{w:04X}"); }
                    Outcome::Error(_) => { let _ = writeln!(out, "????"); }
                }
            }
        }
    }
    Ok(out)
}

/// Raw program image, little-endian 16-bit words.
pub fn to_le_bytes(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

pub fn from_le_bytes(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect()
}
