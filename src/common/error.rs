//! # Error Types
//!
//! [`StegoError`] is returned by every codec operation in the library. The
//! image, key-file and CLI boundaries wrap it in `anyhow::Error`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StegoError {
    /// No plaintext to compress.
    #[error("cannot compress an empty message")]
    EmptyInput,

    /// Header plus payload does not fit into the cover image.
    #[error("payload needs {required} channels but the cover image only has {available}")]
    CapacityExceeded { required: usize, available: usize },

    /// Payload length cannot be described by the 24-bit header.
    #[error("payload of {bits} bits exceeds the 24-bit length header")]
    PayloadTooLong { bits: usize },

    /// The channel position space does not fit in `u32`.
    #[error("image has {channels} writable channels, more than the shuffle supports")]
    ImageTooLarge { channels: usize },

    /// A bit path left the code tree or the stream ended inside a code.
    #[error("invalid Huffman encoding at bit {position}")]
    InvalidEncoding { position: usize },

    /// Non-zero bits after the declared end of the stream.
    #[error("{count} trailing bits are not valid zero padding")]
    TrailingBits { count: usize },

    /// The stego image is smaller than its header declares.
    #[error("stego data needs {required} channels but the image only has {available}")]
    TruncatedStego { required: usize, available: usize },

    #[error("byte {0:#04x} has no code in the table")]
    UnknownSymbol(u8),

    #[error("malformed code table: {0}")]
    InvalidTable(String),

    #[error("{bits} bits cannot be stored in {bytes} bytes")]
    InvalidBitLength { bits: usize, bytes: usize },
}

pub type Result<T> = std::result::Result<T, StegoError>;
