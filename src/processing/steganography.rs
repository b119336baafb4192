//! # LSB Steganography Implementation
//!
//! Hides an arbitrary bit stream in the least significant bit of the R, G and
//! B channels of an RGBA pixel buffer.
//!
//! ## Layout
//!
//! ```text
//! [24-bit big-endian payload length L][L payload bits]
//! ```
//!
//! Both parts are written into consecutive entries of the channel order
//! selected by [`EmbedMode`]; the header occupies the first 24 entries.
//!
//! ### Encoding Process
//! 1. Check that `24 + L` fits into `width * height * 3` channels
//! 2. Copy the cover buffer
//! 3. For each header and payload bit, clear the channel LSB and set it to the bit
//!
//! ### Decoding Process
//! 1. Read 24 bits to get the payload length
//! 2. Read the next L bits in the same order
//!
//! ### Capacity
//! An image can carry `width * height * 3 - 24` payload bits, capped at
//! `2^24 - 1` by the header. Alpha is never touched.

use image::RgbaImage;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::common::bits::BitVec;
use crate::common::error::{Result, StegoError};
use crate::processing::positions::{channel_offset, ChannelOrder, WRITABLE_CHANNELS};

/// Width of the payload length header in bits.
pub const HEADER_BITS: usize = 24;
/// Largest payload the header can describe.
pub const MAX_PAYLOAD_BITS: usize = (1 << HEADER_BITS) - 1;

/// Order in which channel positions are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EmbedMode {
    /// Positions 0, 1, 2, ... in raster order
    Sequential,
    /// Seeded Fisher-Yates permutation of all positions
    Shuffled { seed: u64 },
}

impl std::fmt::Display for EmbedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbedMode::Sequential => write!(f, "sequential"),
            EmbedMode::Shuffled { seed } => write!(f, "shuffled (seed {seed})"),
        }
    }
}

/// Number of writable channel positions in the image.
pub fn capacity(image: &RgbaImage) -> usize {
    image.width() as usize * image.height() as usize * WRITABLE_CHANNELS
}

/// Largest payload, in bits, that [`embed`] accepts for this image.
pub fn max_payload_bits(image: &RgbaImage) -> usize {
    capacity(image).saturating_sub(HEADER_BITS).min(MAX_PAYLOAD_BITS)
}

/// Embed `payload` into a copy of `cover`.
///
/// # Errors
/// - [`StegoError::PayloadTooLong`] if the payload exceeds the 24-bit header
/// - [`StegoError::CapacityExceeded`] if header plus payload do not fit
/// - [`StegoError::ImageTooLarge`] if shuffled mode cannot index the image
///
/// Nothing is written unless the whole stream fits.
pub fn embed(cover: &RgbaImage, payload: &BitVec, mode: EmbedMode) -> Result<RgbaImage> {
    if payload.len() > MAX_PAYLOAD_BITS {
        return Err(StegoError::PayloadTooLong {
            bits: payload.len(),
        });
    }

    let available = capacity(cover);
    let required = HEADER_BITS + payload.len();
    if required > available {
        return Err(StegoError::CapacityExceeded {
            required,
            available,
        });
    }

    let order = ChannelOrder::new(available, mode)?;

    let mut stream = BitVec::with_capacity(required);
    stream.push_bits(payload.len() as u64, HEADER_BITS);
    stream.extend_from(payload);

    let mut stego = cover.clone();
    let channels: &mut [u8] = &mut stego;
    for (index, bit) in stream.iter().enumerate() {
        let offset = channel_offset(order.position(index));
        channels[offset] = (channels[offset] & 0xFE) | bit as u8;
    }

    debug!(
        "Embedded {} payload bits ({}) using {} of {} channels",
        payload.len(),
        mode,
        required,
        available
    );

    Ok(stego)
}

/// Recover the payload written by [`embed`] with the same `mode`.
///
/// # Errors
/// - [`StegoError::TruncatedStego`] if the image cannot hold the header, or
///   holds fewer channels than the header declares
pub fn extract(stego: &RgbaImage, mode: EmbedMode) -> Result<BitVec> {
    let available = capacity(stego);
    if available < HEADER_BITS {
        return Err(StegoError::TruncatedStego {
            required: HEADER_BITS,
            available,
        });
    }

    let order = ChannelOrder::new(available, mode)?;
    let channels: &[u8] = stego;
    let read_bit = |index: usize| channels[channel_offset(order.position(index))] & 1 == 1;

    let declared = (0..HEADER_BITS)
        .fold(0usize, |acc, index| (acc << 1) | read_bit(index) as usize);

    let required = HEADER_BITS + declared;
    if required > available {
        return Err(StegoError::TruncatedStego {
            required,
            available,
        });
    }

    let payload: BitVec = (HEADER_BITS..required).map(read_bit).collect();

    debug!("Extracted {} payload bits ({})", payload.len(), mode);

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn cover(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = (x * 31 + y * 17) as u8;
            Rgba([v, v.wrapping_add(85), v.wrapping_mul(3), 200u8.wrapping_add(v)])
        })
    }

    fn pattern(len: usize) -> BitVec {
        (0..len).map(|i| (i * 7 + i / 3) % 5 < 2).collect()
    }

    #[test]
    fn test_capacity() {
        let img = cover(100, 100);
        assert_eq!(capacity(&img), 30_000);
        assert_eq!(max_payload_bits(&img), 30_000 - HEADER_BITS);
        assert_eq!(max_payload_bits(&cover(2, 2)), 0);
    }

    #[test]
    fn test_sequential_round_trip() {
        let img = cover(20, 20);
        let payload = pattern(700);
        let stego = embed(&img, &payload, EmbedMode::Sequential).unwrap();
        assert_eq!(extract(&stego, EmbedMode::Sequential).unwrap(), payload);
    }

    #[test]
    fn test_shuffled_round_trip() {
        let img = cover(20, 20);
        let payload = pattern(1000);
        let mode = EmbedMode::Shuffled { seed: 0xDEAD_BEEF };
        let stego = embed(&img, &payload, mode).unwrap();
        assert_eq!(extract(&stego, mode).unwrap(), payload);
    }

    #[test]
    fn test_sequential_header_layout() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let payload: BitVec = std::iter::once(true).collect();
        let stego = embed(&img, &payload, EmbedMode::Sequential).unwrap();

        let raw: &[u8] = &stego;
        // Header ends with a 1 at position 23 (pixel 7, blue), payload at 24 (pixel 8, red).
        assert_eq!(raw[7 * 4 + 2], 1);
        assert_eq!(raw[8 * 4], 1);
        let ones = raw.iter().enumerate().filter(|(i, v)| *i % 4 != 3 && **v == 1).count();
        assert_eq!(ones, 2);
    }

    #[test]
    fn test_capacity_boundary() {
        let img = cover(10, 10);
        let exact = pattern(300 - HEADER_BITS);
        let stego = embed(&img, &exact, EmbedMode::Sequential).unwrap();
        assert_eq!(extract(&stego, EmbedMode::Sequential).unwrap(), exact);

        let over = pattern(300 - HEADER_BITS + 1);
        assert_eq!(
            embed(&img, &over, EmbedMode::Shuffled { seed: 5 }).unwrap_err(),
            StegoError::CapacityExceeded {
                required: 301,
                available: 300
            }
        );
    }

    #[test]
    fn test_payload_too_long() {
        let img = cover(2, 2);
        let payload = BitVec::from_bytes(vec![0; (MAX_PAYLOAD_BITS + 1) / 8], MAX_PAYLOAD_BITS + 1)
            .unwrap();
        assert_eq!(
            embed(&img, &payload, EmbedMode::Sequential).unwrap_err(),
            StegoError::PayloadTooLong {
                bits: MAX_PAYLOAD_BITS + 1
            }
        );
    }

    #[test]
    fn test_only_low_bits_change() {
        let img = cover(16, 16);
        let payload = pattern(600);
        let stego = embed(&img, &payload, EmbedMode::Shuffled { seed: 77 }).unwrap();

        for (before, after) in img.pixels().zip(stego.pixels()) {
            for channel in 0..3 {
                assert_eq!(before[channel] & 0xFE, after[channel] & 0xFE);
            }
            assert_eq!(before[3], after[3]);
        }
    }

    #[test]
    fn test_shuffled_embed_deterministic() {
        let img = cover(12, 12);
        let payload = pattern(200);
        let mode = EmbedMode::Shuffled { seed: 1234 };
        let a = embed(&img, &payload, mode).unwrap();
        let b = embed(&img, &payload, mode).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_small_for_header() {
        let img = cover(2, 2);
        assert_eq!(
            extract(&img, EmbedMode::Sequential).unwrap_err(),
            StegoError::TruncatedStego {
                required: HEADER_BITS,
                available: 12
            }
        );
    }

    #[test]
    fn test_header_longer_than_image() {
        // Every LSB set: the header declares 2^24 - 1 bits.
        let img = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        assert_eq!(
            extract(&img, EmbedMode::Sequential).unwrap_err(),
            StegoError::TruncatedStego {
                required: HEADER_BITS + MAX_PAYLOAD_BITS,
                available: 300
            }
        );
    }

    #[test]
    fn test_empty_payload() {
        let img = cover(3, 3);
        let stego = embed(&img, &BitVec::new(), EmbedMode::Sequential).unwrap();
        assert!(extract(&stego, EmbedMode::Sequential).unwrap().is_empty());
    }
}
