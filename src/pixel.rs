//! Packed ARGB pixel words and channel-layout conversions.
//!
//! The canonical pixel representation is one `u32` per pixel with alpha in
//! the most significant byte and blue in the least: `0xAARRGGBB` as a word
//! value. The packing is defined on the word, not on bytes in memory, so it
//! is the same on every host; the in-memory byte order falls out of the host
//! endianness (B,G,R,A on little-endian, A,R,G,B on big-endian).

use crate::error::JxlError;

/// Pack four channel bytes into an ARGB word.
#[inline]
pub fn pack(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Alpha byte of an ARGB word.
#[inline]
pub fn alpha(px: u32) -> u8 {
    (px >> 24) as u8
}

/// Red byte of an ARGB word.
#[inline]
pub fn red(px: u32) -> u8 {
    (px >> 16) as u8
}

/// Green byte of an ARGB word.
#[inline]
pub fn green(px: u32) -> u8 {
    (px >> 8) as u8
}

/// Blue byte of an ARGB word.
#[inline]
pub fn blue(px: u32) -> u8 {
    px as u8
}

/// Convert tightly packed interleaved samples into ARGB words.
///
/// `channels` follows the codestream layout: 1 = gray, 2 = gray+alpha,
/// 3 = RGB, 4 = RGBA. Gray is replicated into R, G and B; missing alpha is
/// filled with 0xFF. `dst` must hold one word per source pixel.
pub(crate) fn interleaved_to_argb(
    src: &[u8],
    channels: u32,
    dst: &mut [u32],
) -> Result<(), JxlError> {
    match channels {
        1 => {
            for (px, g) in dst.iter_mut().zip(src) {
                *px = pack(0xFF, *g, *g, *g);
            }
        }
        2 => {
            for (px, s) in dst.iter_mut().zip(src.chunks_exact(2)) {
                *px = pack(s[1], s[0], s[0], s[0]);
            }
        }
        3 => {
            for (px, s) in dst.iter_mut().zip(src.chunks_exact(3)) {
                *px = pack(0xFF, s[0], s[1], s[2]);
            }
        }
        4 => {
            for (px, s) in dst.iter_mut().zip(src.chunks_exact(4)) {
                *px = pack(s[3], s[0], s[1], s[2]);
            }
        }
        other => return Err(JxlError::UnsupportedChannels(other)),
    }
    Ok(())
}

/// Flatten ARGB words into interleaved bytes for the encoder.
///
/// Emits RGB (3 channels) when `has_alpha` is false, RGBA (4 channels)
/// when true.
pub(crate) fn argb_to_interleaved(pixels: &[u32], has_alpha: bool) -> Vec<u8> {
    let channels = if has_alpha { 4 } else { 3 };
    let mut out = Vec::with_capacity(pixels.len() * channels);
    for &px in pixels {
        out.push(red(px));
        out.push(green(px));
        out.push(blue(px));
        if has_alpha {
            out.push(alpha(px));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack() {
        let px = pack(0x12, 0x34, 0x56, 0x78);
        assert_eq!(px, 0x1234_5678);
        assert_eq!(alpha(px), 0x12);
        assert_eq!(red(px), 0x34);
        assert_eq!(green(px), 0x56);
        assert_eq!(blue(px), 0x78);
    }

    #[test]
    fn gray_replicates_with_opaque_alpha() {
        let mut dst = [0u32; 2];
        interleaved_to_argb(&[0x40, 0xA0], 1, &mut dst).unwrap();
        assert_eq!(dst, [0xFF40_4040, 0xFFA0_A0A0]);
    }

    #[test]
    fn gray_alpha_keeps_alpha() {
        let mut dst = [0u32; 2];
        interleaved_to_argb(&[0x40, 0x80, 0xA0, 0x00], 2, &mut dst).unwrap();
        assert_eq!(dst, [0x8040_4040, 0x00A0_A0A0]);
    }

    #[test]
    fn rgb_fills_opaque_alpha() {
        let mut dst = [0u32; 1];
        interleaved_to_argb(&[0x11, 0x22, 0x33], 3, &mut dst).unwrap();
        assert_eq!(dst, [0xFF11_2233]);
    }

    #[test]
    fn rgba_reorders_to_argb() {
        let mut dst = [0u32; 1];
        interleaved_to_argb(&[0x11, 0x22, 0x33, 0x44], 4, &mut dst).unwrap();
        assert_eq!(dst, [0x4411_2233]);
    }

    #[test]
    fn rejects_unknown_channel_count() {
        let mut dst = [0u32; 1];
        let err = interleaved_to_argb(&[0; 5], 5, &mut dst).unwrap_err();
        assert!(matches!(err, JxlError::UnsupportedChannels(5)));
    }

    #[test]
    fn interleave_drops_alpha_for_rgb() {
        let out = argb_to_interleaved(&[0x8011_2233, 0xFF44_5566], false);
        assert_eq!(out, [0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
    }

    #[test]
    fn interleave_keeps_alpha_for_rgba() {
        let out = argb_to_interleaved(&[0x8011_2233], true);
        assert_eq!(out, [0x11, 0x22, 0x33, 0x80]);
    }
}
