//! The ROM image: a packed little-endian sequence of 64-bit words with
//! no header or symbol table. Execution starts at word index 0.

use crate::isa::Word;

#[must_use]
pub fn encode(words: &[Word]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 8);
    for word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    bytes
}

/// Unpacks an image into words. A trailing partial word is zero-padded
/// rather than dropped, so a truncated image still loads.
#[must_use]
pub fn decode(bytes: &[u8]) -> Vec<Word> {
    let mut words = Vec::with_capacity(bytes.len().div_ceil(8));
    let mut chunks = bytes.chunks_exact(8);
    for chunk in &mut chunks {
        let mut cell = [0u8; 8];
        cell.copy_from_slice(chunk);
        words.push(Word::from_le_bytes(cell));
    }
    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut cell = [0u8; 8];
        cell[..tail.len()].copy_from_slice(tail);
        words.push(Word::from_le_bytes(cell));
    }
    words
}
