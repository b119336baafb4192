pub mod common;
pub mod compression;
pub mod pipeline;
pub mod processing;

pub use common::{BitVec, StegoError};
pub use compression::CodeTable;
pub use pipeline::{
    decode_message, decode_payload, encode_message, EncodedMessage, MessageStats, StegoKey,
};
pub use processing::EmbedMode;
