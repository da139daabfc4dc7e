use anyhow::Result;
use std::path::Path;

use tinygpu_asm::output::from_le_bytes;

/// Program memory image: 16-bit words, 8-bit word addresses.
#[derive(Debug, Clone)]
pub struct Image {
    pub base: usize,
    pub words: Vec<u16>,
}

impl Image {
    pub fn word(&self, addr: usize) -> Option<u16> {
        addr.checked_sub(self.base).and_then(|off| self.words.get(off).copied())
    }

    pub fn is_mapped(&self, addr: usize) -> bool {
        addr >= self.base && addr < self.end()
    }

    pub fn end(&self) -> usize {
        self.base + self.words.len()
    }
}

/// Loads a little-endian word image. `skip` and `len` count words.
pub fn load_raw_bin(path: &Path, base: usize, skip: usize, len: Option<usize>) -> Result<Image> {
    let file = std::fs::read(path)?;
    anyhow::ensure!(file.len() % 2 == 0, "image has an odd number of bytes");
    let words = from_le_bytes(&file);
    anyhow::ensure!(skip <= words.len(), "--skip exceeds image size");
    let mut payload = &words[skip..];
    if let Some(lim) = len {
        anyhow::ensure!(lim <= payload.len(), "--len exceeds remaining words after skip");
        payload = &payload[..lim];
    }
    Ok(Image { base, words: payload.to_vec() })
}
