//! Channel position ordering.
//!
//! A channel position indexes the writable (R, G, B) channels of an RGBA
//! buffer; alpha is never part of the position space. Sequential mode walks
//! positions in index order. Shuffled mode applies a Fisher-Yates shuffle
//! driven by a ChaCha20 PRNG seeded from the caller's seed, so embedder and
//! extractor derive the same permutation from the same seed and the same
//! position count.
//!
//! The shuffle draws `u32` ranges rather than `usize` so the permutation is
//! identical on 32-bit and 64-bit targets.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::common::error::{Result, StegoError};
use crate::processing::steganography::EmbedMode;

/// Bytes per pixel in the RGBA buffer.
pub const CHANNELS_PER_PIXEL: usize = 4;
/// Channels per pixel that may carry payload bits.
pub const WRITABLE_CHANNELS: usize = 3;

/// Byte offset of a channel position inside the flat RGBA buffer.
pub fn channel_offset(position: usize) -> usize {
    (position / WRITABLE_CHANNELS) * CHANNELS_PER_PIXEL + position % WRITABLE_CHANNELS
}

#[derive(Debug, Clone)]
pub enum ChannelOrder {
    Sequential { total: usize },
    Shuffled { positions: Vec<u32> },
}

impl ChannelOrder {
    pub fn new(total: usize, mode: EmbedMode) -> Result<Self> {
        match mode {
            EmbedMode::Sequential => Ok(ChannelOrder::Sequential { total }),
            EmbedMode::Shuffled { seed } => {
                let total_u32 = u32::try_from(total)
                    .map_err(|_| StegoError::ImageTooLarge { channels: total })?;
                let mut positions: Vec<u32> = (0..total_u32).collect();
                shuffle_portable(&mut positions, seed);
                Ok(ChannelOrder::Shuffled { positions })
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChannelOrder::Sequential { total } => *total,
            ChannelOrder::Shuffled { positions } => positions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The channel position used for the `index`-th embedded bit.
    ///
    /// `index` must be below [`ChannelOrder::len`].
    pub fn position(&self, index: usize) -> usize {
        match self {
            ChannelOrder::Sequential { .. } => index,
            ChannelOrder::Shuffled { positions } => positions[index] as usize,
        }
    }
}

fn shuffle_portable(positions: &mut [u32], seed: u64) {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let n = positions.len();
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=(i as u32)) as usize;
        positions.swap(i, j);
    }
}
