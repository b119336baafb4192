//! # Bit Stream Container
//!
//! Huffman output and steganographic payloads are not byte aligned, so every
//! stage passes bits around in a [`BitVec`]: bytes packed MSB first plus an
//! explicit bit count.

use std::fmt;

use crate::common::error::StegoError;

/// Growable, MSB-first packed sequence of bits with an exact length.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct BitVec {
    bytes: Vec<u8>,
    bit_count: usize,
}

impl BitVec {
    pub fn new() -> Self {
        BitVec {
            bytes: Vec::new(),
            bit_count: 0,
        }
    }

    pub fn with_capacity(bits: usize) -> Self {
        BitVec {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            bit_count: 0,
        }
    }

    /// Rebuild a bit stream from packed bytes and its declared bit length.
    ///
    /// The byte buffer must be exactly `ceil(bit_count / 8)` long. Padding
    /// bits after `bit_count` are kept as-is so callers can inspect them with
    /// [`BitVec::has_clean_padding`].
    pub fn from_bytes(bytes: Vec<u8>, bit_count: usize) -> Result<Self, StegoError> {
        if bytes.len() != bit_count.div_ceil(8) {
            return Err(StegoError::InvalidBitLength {
                bits: bit_count,
                bytes: bytes.len(),
            });
        }
        Ok(BitVec { bytes, bit_count })
    }

    pub fn len(&self) -> usize {
        self.bit_count
    }

    pub fn is_empty(&self) -> bool {
        self.bit_count == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn push(&mut self, bit: bool) {
        let byte_index = self.bit_count / 8;
        let bit_offset = self.bit_count % 8;

        if byte_index >= self.bytes.len() {
            self.bytes.push(0);
        }

        if bit {
            self.bytes[byte_index] |= 1 << (7 - bit_offset);
        }

        self.bit_count += 1;
    }

    /// Append the low `width` bits of `value`, most significant first.
    pub fn push_bits(&mut self, value: u64, width: usize) {
        debug_assert!(width <= 64);
        for bit_pos in (0..width).rev() {
            self.push((value >> bit_pos) & 1 == 1);
        }
    }

    pub fn extend_from(&mut self, other: &BitVec) {
        for bit in other.iter() {
            self.push(bit);
        }
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.bit_count {
            return None;
        }
        Some((self.bytes[index / 8] >> (7 - index % 8)) & 1 == 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.bit_count).map(move |i| (self.bytes[i / 8] >> (7 - i % 8)) & 1 == 1)
    }

    /// Read `width` bits starting at `start` as a big-endian unsigned integer.
    pub fn read_bits(&self, start: usize, width: usize) -> Option<u64> {
        if width > 64 || start.checked_add(width)? > self.bit_count {
            return None;
        }
        let mut value = 0u64;
        for i in start..start + width {
            value = (value << 1) | u64::from(self.get(i)?);
        }
        Some(value)
    }

    /// True when every bit stored past `len()` in the final byte is zero.
    pub fn has_clean_padding(&self) -> bool {
        let used = self.bit_count % 8;
        if used == 0 {
            return true;
        }
        match self.bytes.last() {
            Some(last) => last & (0xFF >> used) == 0,
            None => true,
        }
    }

    /// Number of padding bits stored after `len()`.
    pub(crate) fn padding_len(&self) -> usize {
        self.bytes.len() * 8 - self.bit_count
    }
}

impl FromIterator<bool> for BitVec {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut bits = BitVec::new();
        for bit in iter {
            bits.push(bit);
        }
        bits
    }
}

impl fmt::Debug for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVec({} bits: ", self.bit_count)?;
        for bit in self.iter().take(64) {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        if self.bit_count > 64 {
            f.write_str("...")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
