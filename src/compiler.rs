use serde::Serialize;
use tracing::{debug, warn};

use crate::encoder::{encode_all, ADDR_BITS};
use crate::error::{Diagnostic, EncodeError, StructuralError};
use crate::preprocess::clean_lines;
use crate::symbols::{resolve, SymbolTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Word(u16),
    Error(EncodeError),
}

/// One assembled instruction, at its address, with the text it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledEntry {
    pub address: usize,
    pub text: String,
    pub outcome: Outcome,
}

impl CompiledEntry {
    pub fn word(&self) -> Option<u16> {
        match self.outcome {
            Outcome::Word(w) => Some(w),
            Outcome::Error(_) => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.word().is_some()
    }

    pub fn diagnostic(&self) -> Option<Diagnostic> {
        match &self.outcome {
            Outcome::Word(_) => None,
            Outcome::Error(error) => Some(Diagnostic {
                address: self.address,
                text: self.text.clone(),
                error: error.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Compiled {
    pub entries: Vec<CompiledEntry>,
    pub instructions: Vec<String>,
    pub symbols: SymbolTable,
}

impl Compiled {
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries.iter().filter_map(CompiledEntry::diagnostic).collect()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| !e.is_ok())
    }

    /// Strict view: every word, or every diagnostic if there is at least one.
    pub fn into_words(self) -> Result<Vec<u16>, Vec<Diagnostic>> {
        let diags = self.diagnostics();
        if !diags.is_empty() {
            return Err(diags);
        }
        Ok(self.entries.iter().filter_map(CompiledEntry::word).collect())
    }

    pub fn into_parts(self) -> (Vec<CompiledEntry>, Vec<String>) {
        (self.entries, self.instructions)
    }
}

/// Preprocess, resolve labels, encode. Only a structural error (duplicate
/// label) fails the call; per-instruction problems come back as entries.
pub fn compile(source: &str) -> Result<Compiled, StructuralError> {
    let lines = clean_lines(source);
    debug!(lines = lines.len(), "preprocessed source");

    let resolved = resolve(&lines)?;
    if !resolved.fits_address_space(ADDR_BITS) {
        warn!(
            instructions = resolved.count(),
            "program exceeds the 8-bit branch address space; far targets will wrap"
        );
    }

    let entries = encode_all(&resolved.instructions, &resolved.symbols);
    debug!(
        entries = entries.len(),
        errors = entries.iter().filter(|e| !e.is_ok()).count(),
        "pass 2 complete"
    );
    Ok(Compiled { entries, instructions: resolved.instructions, symbols: resolved.symbols })
}
