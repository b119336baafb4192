//! # Key File
//!
//! The code table and the embedding mode travel out-of-band, next to the stego
//! image, as a small JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "mode": { "type": "shuffled", "seed": 42 },
//!   "payload_bits": 40,
//!   "code_table": "AAQAAgA=...",
//!   "created_at": "2026-10-17T12:00:00+02:00"
//! }
//! ```
//!
//! Whoever holds the key file can decode the message. It is not a secret
//! in any cryptographic sense.

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::processing::EmbedMode;

pub const KEY_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StegoKey {
    pub version: u32,
    pub mode: EmbedMode,
    /// Compressed payload length, used to sanity-check extraction
    pub payload_bits: usize,
    /// Base64 of the serialized code table
    pub code_table: String,
    pub created_at: String,
}

impl StegoKey {
    pub fn new(mode: EmbedMode, payload_bits: usize, code_table: &[u8]) -> Self {
        Self {
            version: KEY_VERSION,
            mode,
            payload_bits,
            code_table: general_purpose::STANDARD.encode(code_table),
            created_at: chrono::Local::now().to_rfc3339(),
        }
    }

    pub fn code_table_bytes(&self) -> Result<Vec<u8>> {
        general_purpose::STANDARD
            .decode(&self.code_table)
            .context("code table is not valid base64")
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let key: StegoKey = serde_json::from_str(json).context("malformed key file")?;
        if key.version != KEY_VERSION {
            bail!(
                "unsupported key file version {} (expected {})",
                key.version,
                KEY_VERSION
            );
        }
        Ok(key)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .with_context(|| format!("failed to write key file {}", path.display()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read key file {}", path.display()))?;
        Self::from_json(&content)
    }

    /// `stego.png` -> `stego.png.key.json`
    pub fn default_path(image_path: impl AsRef<Path>) -> PathBuf {
        let mut name = image_path.as_ref().as_os_str().to_owned();
        name.push(".key.json");
        PathBuf::from(name)
    }
}
