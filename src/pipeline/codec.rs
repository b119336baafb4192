//! # Message Codec
//!
//! Composes Huffman compression with LSB embedding.
//!
//! ```text
//! encode: plaintext -> CodeTable::compress -> embed -> stego image (+ table bytes)
//! decode: stego image -> extract -> CodeTable::decompress -> plaintext
//! ```
//!
//! The code table is not embedded. [`encode_message`] hands it back as
//! bytes and the caller stores it next to the image (see
//! [`StegoKey`](super::key::StegoKey)).

use image::RgbaImage;
use log::info;
use serde::{Deserialize, Serialize};

use crate::common::error::Result;
use crate::common::BitVec;
use crate::compression::{
    deserialize_table, serialize_table, CodeTable, FrequencyTable, HuffmanTree,
};
use crate::processing::steganography::{self, EmbedMode, HEADER_BITS};

/// Size and ratio figures for one encoded message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageStats {
    pub message_bytes: usize,
    pub distinct_symbols: usize,
    /// `message_bytes * 8`
    pub original_bits: usize,
    pub compressed_bits: usize,
    /// Header plus payload
    pub embedded_bits: usize,
    pub capacity_bits: usize,
    pub mode: EmbedMode,
}

impl MessageStats {
    /// `1 - compressed / original`; negative when coding expands the message.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_bits == 0 {
            return 0.0;
        }
        1.0 - self.compressed_bits as f64 / self.original_bits as f64
    }

    /// Fraction of writable channels touched by the embed.
    pub fn capacity_used(&self) -> f64 {
        if self.capacity_bits == 0 {
            return 0.0;
        }
        self.embedded_bits as f64 / self.capacity_bits as f64
    }
}

/// Everything produced by [`encode_message`].
#[derive(Debug, Clone)]
pub struct EncodedMessage {
    pub stego: RgbaImage,
    /// Serialized code table, required by [`decode_message`]
    pub code_table: Vec<u8>,
    pub stats: MessageStats,
}

/// Compress `plaintext` and hide it in a copy of `cover`.
///
/// # Example
/// ```ignore
/// let cover = image_io::open_image("cover.png")?;
/// let encoded = encode_message(&cover, b"meet at dawn", EmbedMode::Shuffled { seed: 7 })?;
/// image_io::save_image(&encoded.stego, "stego.png")?;
/// ```
pub fn encode_message(
    cover: &RgbaImage,
    plaintext: &[u8],
    mode: EmbedMode,
) -> Result<EncodedMessage> {
    let frequencies = FrequencyTable::from_message(plaintext)?;
    let table = HuffmanTree::build(&frequencies)?.code_table()?;
    let bits = table.compress(plaintext)?;

    let stego = steganography::embed(cover, &bits, mode)?;
    let code_table = serialize_table(&table)?;

    let stats = MessageStats {
        message_bytes: plaintext.len(),
        distinct_symbols: frequencies.distinct(),
        original_bits: plaintext.len() * 8,
        compressed_bits: bits.len(),
        embedded_bits: HEADER_BITS + bits.len(),
        capacity_bits: steganography::capacity(cover),
        mode,
    };

    info!(
        "Encoded {} bytes into {} bits ({:.1}% smaller), {:.2}% of image capacity used",
        stats.message_bytes,
        stats.compressed_bits,
        stats.compression_ratio() * 100.0,
        stats.capacity_used() * 100.0
    );

    Ok(EncodedMessage {
        stego,
        code_table,
        stats,
    })
}

/// Extract and decompress a message hidden by [`encode_message`].
///
/// `mode` must be the mode used for embedding, including the seed.
pub fn decode_message(stego: &RgbaImage, code_table: &[u8], mode: EmbedMode) -> Result<Vec<u8>> {
    let table = deserialize_table(code_table)?;
    let bits = steganography::extract(stego, mode)?;
    decode_payload(&bits, &table)
}

/// Decompress a payload that was already extracted from the image.
pub fn decode_payload(bits: &BitVec, table: &CodeTable) -> Result<Vec<u8>> {
    let plaintext = table.decompress(bits)?;
    info!("Decoded {} bits into {} bytes", bits.len(), plaintext.len());
    Ok(plaintext)
}
