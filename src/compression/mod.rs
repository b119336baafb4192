//! # Huffman Compression
//!
//! Lossless prefix-code compression of the secret message before it is
//! embedded, plus a compact byte form of the code table for the decoder.

pub mod huffman;
pub mod table;

pub use huffman::{CodeTable, FrequencyTable, HuffNode, HuffmanTree};
pub use table::{deserialize_table, serialize_table};
