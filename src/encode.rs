//! JPEG XL encoding: configure libjxl, then drain its output into a sink.

use std::io::Write;

use crate::error::JxlError;
use crate::ffi::{self, Encoder, JxlEncoderStatus};
use crate::pixel;

/// Builder for encoding canonical ARGB pixels to JPEG XL.
///
/// With no knobs set, libjxl's own defaults apply (visually lossless,
/// medium effort). Output color is always declared as sRGB.
#[derive(Clone, Debug, Default)]
pub struct EncodeRequest {
    quality: Option<u8>,
    compression: Option<u8>,
    distance: Option<f32>,
    effort: Option<u32>,
}

impl EncodeRequest {
    pub fn new() -> Self {
        EncodeRequest::default()
    }

    /// Quality from 0 (smallest) to 99. Values above 99 behave as 99, and
    /// 99 selects true lossless encoding, not merely a near-zero distance.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Compression effort from 0 (fastest) to 9 (smallest output), clamped
    /// into libjxl's effort range 1..=9.
    pub fn with_compression(mut self, compression: u8) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Set the Butteraugli distance directly, overriding the distance
    /// derived from [`with_quality`](Self::with_quality). Lossless selection
    /// still follows the quality knob.
    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = Some(distance);
        self
    }

    /// Set the libjxl effort directly (clamped to 1..=9), overriding the
    /// value derived from [`with_compression`](Self::with_compression).
    pub fn with_effort(mut self, effort: u32) -> Self {
        self.effort = Some(effort);
        self
    }

    /// Encode `width * height` pixels, streaming the output to `sink` in
    /// ordered chunks.
    ///
    /// Emits three channels per pixel when `has_alpha` is false, four when
    /// true. On error the sink may have received a partial prefix.
    pub fn write_to(
        &self,
        pixels: &[u32],
        width: u32,
        height: u32,
        has_alpha: bool,
        sink: &mut dyn Write,
    ) -> Result<(), JxlError> {
        let pixel_count = (width as usize)
            .checked_mul(height as usize)
            .ok_or(JxlError::DimensionsTooLarge { width, height })?;
        if pixels.len() < pixel_count {
            return Err(JxlError::BufferTooSmall {
                needed: pixel_count,
                actual: pixels.len(),
            });
        }
        let pixels = &pixels[..pixel_count];

        let quality = self.quality.map(|q| q.min(99));
        let lossless = quality == Some(99);

        let encoder = Encoder::new()?;
        let mut info = ffi::init_basic_info();
        info.xsize = width;
        info.ysize = height;
        info.bits_per_sample = 8;
        info.num_color_channels = 3;
        if has_alpha {
            info.alpha_bits = 8;
            info.num_extra_channels = 1;
        }
        // Lossless requires encoding in the original profile.
        info.uses_original_profile = ffi::jxl_bool(lossless);
        encoder.set_basic_info(&info)?;
        encoder.set_color_encoding(&ffi::srgb_color_encoding(false))?;

        let settings = encoder.frame_settings()?;
        if let Some(distance) = self.distance {
            settings.set_distance(distance)?;
        } else if let Some(quality) = quality {
            settings.set_distance(quality_to_distance(quality))?;
        }
        if lossless {
            settings.set_lossless(true)?;
        }
        if let Some(effort) = self.effort {
            settings.set_effort(effort_setting(effort))?;
        } else if let Some(compression) = self.compression {
            settings.set_effort(effort_setting(u32::from(compression)))?;
        }

        let interleaved = pixel::argb_to_interleaved(pixels, has_alpha);
        let format = ffi::pixel_format(if has_alpha { 4 } else { 3 });
        // SAFETY: `interleaved` outlives the drain loop below; the encoder
        // reads no frame data after its final status.
        unsafe { settings.add_image_frame(&format, &interleaved)? };
        encoder.close_input();

        drain(&encoder, interleaved.len(), sink)
    }

    /// Encode into a freshly allocated vector.
    pub fn encode(
        &self,
        pixels: &[u32],
        width: u32,
        height: u32,
        has_alpha: bool,
    ) -> Result<Vec<u8>, JxlError> {
        let mut out = Vec::new();
        self.write_to(pixels, width, height, has_alpha, &mut out)?;
        Ok(out)
    }
}

/// Pull encoded bytes out of libjxl through a bounded scratch buffer,
/// flushing to the sink each time it fills.
fn drain(encoder: &Encoder, interleaved_len: usize, sink: &mut dyn Write) -> Result<(), JxlError> {
    let mut scratch = vec![0u8; scratch_capacity(interleaved_len)];
    loop {
        let mut next_out = scratch.as_mut_ptr();
        let mut avail_out = scratch.len();
        // SAFETY: the window covers exactly `scratch`, which stays alive and
        // unmoved for the duration of the call.
        let status = unsafe { encoder.process_output(&mut next_out, &mut avail_out) };
        let produced = scratch.len() - avail_out;
        match status {
            JxlEncoderStatus::Success => {
                if produced > 0 {
                    sink.write_all(&scratch[..produced])?;
                }
                return Ok(());
            }
            JxlEncoderStatus::NeedMoreOutput => {
                // A full-buffer cycle that produced nothing means the
                // encoder is wedged; bail instead of looping forever.
                if produced == 0 {
                    return Err(JxlError::EncoderStalled);
                }
                sink.write_all(&scratch[..produced])?;
            }
            _ => return Err(JxlError::EncodeFailed),
        }
    }
}

/// Distance mapping: 0 -> 15.0 (worst), 99 -> 0.0 (mathematically lossless).
fn quality_to_distance(quality: u8) -> f32 {
    let q = f32::from(quality.min(99));
    15.0 - (q * 15.0) / 99.0
}

/// Clamp a host effort value into libjxl's stable range.
fn effort_setting(value: u32) -> i64 {
    i64::from(value).clamp(1, 9)
}

/// Scratch sizing: a sixteenth of the raw frame, floored at 8 KiB.
fn scratch_capacity(interleaved_len: usize) -> usize {
    (interleaved_len / 16).max(8 * 1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_endpoints() {
        assert_eq!(quality_to_distance(0), 15.0);
        assert_eq!(quality_to_distance(99), 0.0);
        assert_eq!(quality_to_distance(200), 0.0);
    }

    #[test]
    fn distance_decreases_with_quality() {
        let mut last = f32::INFINITY;
        for quality in 0..=99 {
            let d = quality_to_distance(quality);
            assert!(d < last, "distance must fall as quality rises");
            last = d;
        }
    }

    #[test]
    fn effort_clamps_into_codec_range() {
        assert_eq!(effort_setting(0), 1);
        assert_eq!(effort_setting(1), 1);
        assert_eq!(effort_setting(5), 5);
        assert_eq!(effort_setting(9), 9);
        assert_eq!(effort_setting(200), 9);
    }

    #[test]
    fn scratch_has_a_floor() {
        assert_eq!(scratch_capacity(0), 8 * 1024);
        assert_eq!(scratch_capacity(100), 8 * 1024);
        assert_eq!(scratch_capacity(1 << 20), 1 << 16);
    }
}
