//! Key material parsing.

use crate::error::CipherError;

/// The padding-length/key separator: `:`.
const KEY_MARKER: u8 = 58;
/// The key section is exactly sixteen bytes — four 32-bit subkeys per block.
const KEY_LEN: usize = 16;

/// Parsed cipher key material.
///
/// Wire form is one ASCII line: `<decimal padding length>:<16 key bytes>`.
/// The padding length is how many random decimal digits wrap each encrypted
/// word; the sixteen key bytes become sixteen `u32` words by ordinal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    padding: usize,
    words: [u32; KEY_LEN],
}

impl KeyMaterial {
    pub fn parse(line: &str) -> Result<Self, CipherError> {
        let bytes = line.trim().as_bytes();
        let marker = bytes
            .iter()
            .position(|b| *b == KEY_MARKER)
            .ok_or_else(|| CipherError::invalid_key("no padding indicator"))?;
        let padding = std::str::from_utf8(&bytes[..marker])
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| CipherError::invalid_key("padding length is not a number"))?;
        let keyed = &bytes[marker + 1..];
        if keyed.len() != KEY_LEN {
            return Err(CipherError::invalid_key(format!(
                "key section must be {KEY_LEN} bytes, got {}",
                keyed.len()
            )));
        }
        let mut words = [0u32; KEY_LEN];
        for (word, byte) in words.iter_mut().zip(keyed) {
            *word = u32::from(*byte);
        }
        Ok(Self { padding, words })
    }

    /// Random decimal digits wrapped around each encrypted word.
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// The four subkeys for block `index`.
    ///
    /// The window starts at byte offset `2 * index` and wraps modulo the key
    /// length, so arbitrarily long plaintexts reuse the schedule consistently.
    pub fn subkeys(&self, index: usize) -> [u32; 4] {
        let offset = (index * 2) % KEY_LEN;
        std::array::from_fn(|j| self.words[(offset + j) % KEY_LEN])
    }
}
