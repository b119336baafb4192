//! # End-to-end Pipeline
//!
//! - [`codec`]: Huffman compression composed with LSB embedding
//! - [`image_io`]: Image files and bytes to RGBA buffers and back (lossless only)
//! - [`key`]: JSON key file carrying the code table and embedding mode

pub mod codec;
pub mod image_io;
pub mod key;

pub use codec::{decode_message, decode_payload, encode_message, EncodedMessage, MessageStats};
pub use key::StegoKey;
