//! # Image Processing and Steganography
//!
//! Embeds and extracts bit streams in the least significant bits of an RGBA
//! pixel buffer, in sequential or seeded-shuffle channel order.

pub mod positions;
pub mod steganography;

// Re-export main functions for convenience
pub use steganography::{capacity, embed, extract, max_payload_bits, EmbedMode};
