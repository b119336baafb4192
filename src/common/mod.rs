//! # Common Components
//!
//! Shared utilities used by the compression, embedding and pipeline layers.
//!
//! ## Modules
//!
//! - [`bits`]: Packed bit stream container with an explicit bit length
//! - [`error`]: Codec error type
//! - [`config`]: Configuration parsing utilities
//! - [`logging`]: Logger setup for the binaries

pub mod bits;
pub mod config;
pub mod error;
pub mod logging;

pub use bits::BitVec;
pub use error::StegoError;
