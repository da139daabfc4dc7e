use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::StructuralError;

/// Label name (uppercased) to instruction address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolTable {
    map: BTreeMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.map.get(&label.trim().to_ascii_uppercase()).copied()
    }

    /// Binds `label` to `address`; fails if the case-folded name is taken.
    pub fn define(&mut self, label: &str, address: usize) -> Result<(), StructuralError> {
        let key = label.trim().to_ascii_uppercase();
        if self.map.contains_key(&key) {
            return Err(StructuralError::DuplicateLabel { label: label.trim().to_string() });
        }
        self.map.insert(key, address);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.map.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Output of the first pass.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub symbols: SymbolTable,
    pub instructions: Vec<String>,
}

impl Resolved {
    pub fn count(&self) -> usize {
        self.instructions.len()
    }

    /// Whether every instruction and label address is below `1 << bits`.
    /// A trailing label after exactly `1 << bits` instructions does not fit.
    pub fn fits_address_space(&self, bits: u32) -> bool {
        let limit = 1usize << bits;
        self.count() <= limit && self.symbols.iter().all(|(_, addr)| addr < limit)
    }
}

/// Pass 1: split label declarations from instructions. A label gets the
/// address the next instruction will occupy. Operands are not looked at.
pub fn resolve<S: AsRef<str>>(lines: &[S]) -> Result<Resolved, StructuralError> {
    let mut out = Resolved::default();
    for line in lines {
        let line = line.as_ref();
        if let Some(name) = line.strip_suffix(':') {
            out.symbols.define(name, out.instructions.len())?;
        } else {
            out.instructions.push(line.to_string());
        }
    }
    debug!(
        instructions = out.count(),
        labels = out.symbols.len(),
        symbols = ?out.symbols.map,
        "pass 1 complete"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_bind_to_next_instruction() {
        let r = resolve(&["START:", "NOP", "LOOP:", "ADD R1, R1, R2", "BRn LOOP", "END:"]).unwrap();
        assert_eq!(r.symbols.get("start"), Some(0));
        assert_eq!(r.symbols.get("LOOP"), Some(1));
        // trailing label dangles one past the last instruction
        assert_eq!(r.symbols.get("End"), Some(3));
        assert_eq!(r.count(), 3);
        assert_eq!(r.instructions[2], "BRn LOOP");
    }

    #[test]
    fn stacked_labels_share_an_address() {
        let r = resolve(&["A:", "B:", "RET"]).unwrap();
        assert_eq!(r.symbols.get("A"), Some(0));
        assert_eq!(r.symbols.get("B"), Some(0));
    }

    #[test]
    fn duplicate_is_case_insensitive() {
        let err = resolve(&["loop:", "NOP", "LOOP:", "RET"]).unwrap_err();
        assert_eq!(err, StructuralError::DuplicateLabel { label: "LOOP".into() });
    }

    #[test]
    fn label_name_is_trimmed() {
        let r = resolve(&["  here  :", "NOP"]).unwrap();
        assert_eq!(r.symbols.get("HERE"), Some(0));
    }

    #[test]
    fn trailing_label_after_full_space_does_not_fit() {
        let mut lines = vec!["NOP"; 256];
        assert!(resolve(&lines[..]).unwrap().fits_address_space(8));
        lines.push("END:");
        assert!(!resolve(&lines[..]).unwrap().fits_address_space(8));
        lines.truncate(255);
        lines.push("END:");
        assert!(resolve(&lines[..]).unwrap().fits_address_space(8));
        lines.push("NOP");
        lines.push("NOP");
        assert!(!resolve(&lines[..]).unwrap().fits_address_space(8));
    }
}
