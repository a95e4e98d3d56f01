//! JPEG XL decoding: a synchronous driver over libjxl's event loop.

#[cfg(feature = "cms")]
use crate::cms;
use crate::error::JxlError;
use crate::ffi::{self, Decoder, JxlDecoderStatus};
use crate::limits::Limits;
use crate::pixel;
use crate::signature::JxlSignature;

/// How the decoded pixels relate to sRGB.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorState {
    /// The decoder's output was already sRGB; no transform was needed.
    Srgb,
    /// Pixels were transformed from the embedded ICC profile to sRGB.
    ConvertedToSrgb,
    /// Pixels are unconverted: no usable profile, the transform failed, or
    /// color management is compiled out.
    NotConverted,
}

/// Decoded image: canonical ARGB words plus metadata.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    pixels: Vec<u32>,
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
    /// What happened to color on the way out of the codestream.
    pub color: ColorState,
}

impl DecodeOutput {
    /// Pixel words, row-major, `width * height` long.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Take ownership of the pixel words.
    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }
}

/// Builder for decoding a complete in-memory JPEG XL image.
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
    #[cfg(feature = "cms")]
    srgb_tolerance: f64,
}

impl<'a> DecodeRequest<'a> {
    /// Decode `data`, which must hold one complete codestream or container.
    pub fn new(data: &'a [u8]) -> Self {
        DecodeRequest {
            data,
            limits: None,
            #[cfg(feature = "cms")]
            srgb_tolerance: cms::SRGB_CHROMA_TOLERANCE,
        }
    }

    /// Enforce resource limits while decoding.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Override the per-component chromaticity tolerance used when deciding
    /// whether the stream is already sRGB.
    #[cfg(feature = "cms")]
    pub fn with_srgb_tolerance(mut self, tolerance: f64) -> Self {
        self.srgb_tolerance = tolerance;
        self
    }

    /// Run the decode.
    pub fn decode(&self) -> Result<DecodeOutput, JxlError> {
        let mut decoder = Decoder::new()?;
        #[allow(unused_mut)]
        let mut events = ffi::EVENT_BASIC_INFO | ffi::EVENT_FULL_IMAGE;
        #[cfg(feature = "cms")]
        {
            events |= ffi::EVENT_COLOR_ENCODING;
        }
        decoder.subscribe(events)?;
        // SAFETY: `self.data` outlives `decoder`, which is dropped when this
        // call returns.
        unsafe { decoder.set_input(self.data)? };

        let mut header: Option<Header> = None;
        let mut interleaved: Vec<u8> = Vec::new();
        #[cfg(feature = "cms")]
        let mut icc: Option<Vec<u8>> = None;
        #[cfg(feature = "cms")]
        let mut already_srgb = false;

        // The whole input is present up front, so NeedMoreInput can only
        // mean the stream stops short of a full image.
        loop {
            match decoder.process_input() {
                JxlDecoderStatus::BasicInfo => {
                    let info = decoder.basic_info()?;
                    header = Some(read_header(
                        info.xsize,
                        info.ysize,
                        info.num_color_channels,
                        info.alpha_bits,
                        self.limits,
                    )?);
                }
                #[cfg(feature = "cms")]
                JxlDecoderStatus::ColorEncoding => {
                    let Some(header) = &header else {
                        return Err(JxlError::Setup(
                            "color encoding reported before basic info".into(),
                        ));
                    };
                    // Ask for sRGB output first; libjxl can often oblige and
                    // save us the transform. Refusal is fine.
                    let gray = header.channels <= 2;
                    decoder.set_preferred_color_profile(&ffi::srgb_color_encoding(gray));
                    match decoder.color_as_encoded_profile() {
                        Some(encoding) if cms::encoding_is_srgb(&encoding, self.srgb_tolerance) => {
                            already_srgb = true;
                        }
                        _ => icc = decoder.icc_profile(),
                    }
                }
                JxlDecoderStatus::NeedImageOutBuffer => {
                    let Some(header) = &header else {
                        return Err(JxlError::Setup(
                            "pixel buffer requested before basic info".into(),
                        ));
                    };
                    let format = ffi::pixel_format(header.channels);
                    let reported = decoder.image_out_buffer_size(&format)?;
                    if reported != header.interleaved_len {
                        return Err(JxlError::BufferSizeMismatch {
                            reported,
                            expected: header.interleaved_len,
                        });
                    }
                    if let Some(limits) = self.limits {
                        limits.check_memory(reported)?;
                    }
                    interleaved = alloc_bytes(reported)?;
                    // SAFETY: `interleaved` is neither reallocated nor
                    // dropped until the full-image event below.
                    unsafe { decoder.set_image_out_buffer(&format, &mut interleaved)? };
                }
                JxlDecoderStatus::FullImage => break,
                JxlDecoderStatus::NeedMoreInput => return Err(JxlError::TruncatedInput),
                JxlDecoderStatus::Error => return Err(diagnose_stream_error(self.data)),
                other => return Err(unexpected_status_error(other)),
            }
        }

        let header =
            header.ok_or_else(|| JxlError::Setup("decoder finished without basic info".into()))?;
        if let Some(limits) = self.limits {
            limits.check_memory(header.pixel_count.saturating_mul(4))?;
        }
        let mut pixels = alloc_words(header.pixel_count)?;

        #[cfg(feature = "cms")]
        let color = if already_srgb {
            pixel::interleaved_to_argb(&interleaved, header.channels, &mut pixels)?;
            ColorState::Srgb
        } else if let Some(icc) = icc.as_deref() {
            if cms::convert_to_srgb(icc, &interleaved, header.channels, &mut pixels).is_some() {
                ColorState::ConvertedToSrgb
            } else {
                // Bad or unsupported profile. Uncorrected pixels beat no
                // pixels; the caller can see this in the color state.
                pixel::interleaved_to_argb(&interleaved, header.channels, &mut pixels)?;
                ColorState::NotConverted
            }
        } else {
            pixel::interleaved_to_argb(&interleaved, header.channels, &mut pixels)?;
            ColorState::NotConverted
        };
        #[cfg(not(feature = "cms"))]
        let color = {
            pixel::interleaved_to_argb(&interleaved, header.channels, &mut pixels)?;
            ColorState::NotConverted
        };

        Ok(DecodeOutput {
            pixels,
            width: header.width,
            height: header.height,
            has_alpha: header.has_alpha,
            color,
        })
    }
}

#[derive(Debug)]
struct Header {
    width: u32,
    height: u32,
    channels: u32,
    has_alpha: bool,
    pixel_count: usize,
    interleaved_len: usize,
}

/// Validate codestream dimensions and fix the channel layout.
fn read_header(
    width: u32,
    height: u32,
    num_color_channels: u32,
    alpha_bits: u32,
    limits: Option<&Limits>,
) -> Result<Header, JxlError> {
    if let Some(limits) = limits {
        limits.check(width, height)?;
    }
    let has_alpha = alpha_bits > 0;
    let channels = num_color_channels + u32::from(has_alpha);
    if !(1..=4).contains(&channels) {
        return Err(JxlError::UnsupportedChannels(channels));
    }
    let too_large = JxlError::DimensionsTooLarge { width, height };
    let pixel_count = (width as usize)
        .checked_mul(height as usize)
        .ok_or(too_large)?;
    let interleaved_len = pixel_count
        .checked_mul(channels as usize)
        .ok_or(JxlError::DimensionsTooLarge { width, height })?;
    Ok(Header {
        width,
        height,
        channels,
        has_alpha,
        pixel_count,
        interleaved_len,
    })
}

/// Metadata-only pass: drive the decoder up to the header and stop.
pub(crate) fn read_basic_info(data: &[u8]) -> Result<ffi::JxlBasicInfo, JxlError> {
    let mut decoder = Decoder::new()?;
    decoder.subscribe(ffi::EVENT_BASIC_INFO)?;
    // SAFETY: `data` outlives `decoder`, which is dropped when this call
    // returns.
    unsafe { decoder.set_input(data)? };
    loop {
        match decoder.process_input() {
            JxlDecoderStatus::BasicInfo => return decoder.basic_info(),
            JxlDecoderStatus::NeedMoreInput => return Err(JxlError::TruncatedInput),
            JxlDecoderStatus::Error => return Err(diagnose_stream_error(data)),
            other => return Err(unexpected_status_error(other)),
        }
    }
}

/// Refine a decoder error using the signature: a stream that never looked
/// like JPEG XL is a format mismatch, not corruption.
fn diagnose_stream_error(data: &[u8]) -> JxlError {
    match JxlSignature::check(data) {
        JxlSignature::Codestream | JxlSignature::Container => JxlError::CorruptStream,
        JxlSignature::Invalid | JxlSignature::NotEnoughBytes => JxlError::UnrecognizedFormat,
    }
}

fn unexpected_status_error(status: JxlDecoderStatus) -> JxlError {
    JxlError::Setup(format!("unexpected decoder status {status:?}"))
}

fn alloc_bytes(len: usize) -> Result<Vec<u8>, JxlError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| JxlError::Oom { bytes: len })?;
    buf.resize(len, 0);
    Ok(buf)
}

fn alloc_words(len: usize) -> Result<Vec<u32>, JxlError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| JxlError::Oom {
        bytes: len.saturating_mul(4),
    })?;
    buf.resize(len, 0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_derives_channel_count() {
        let h = read_header(10, 20, 3, 8, None).unwrap();
        assert_eq!(h.channels, 4);
        assert!(h.has_alpha);
        assert_eq!(h.pixel_count, 200);
        assert_eq!(h.interleaved_len, 800);

        let h = read_header(10, 20, 1, 0, None).unwrap();
        assert_eq!(h.channels, 1);
        assert!(!h.has_alpha);
        assert_eq!(h.interleaved_len, 200);
    }

    #[test]
    fn header_rejects_overflowing_dimensions() {
        let err = read_header(u32::MAX, u32::MAX, 3, 8, None).unwrap_err();
        assert!(matches!(err, JxlError::DimensionsTooLarge { .. }));
    }

    #[test]
    fn header_enforces_limits_first() {
        let limits = Limits {
            max_pixels: Some(100),
            ..Limits::default()
        };
        let err = read_header(100, 100, 3, 0, Some(&limits)).unwrap_err();
        assert!(matches!(err, JxlError::LimitExceeded(_)));
    }

    #[test]
    fn stream_errors_refine_by_signature() {
        assert!(matches!(
            diagnose_stream_error(&[0xFF, 0x0A, 0, 1, 2]),
            JxlError::CorruptStream
        ));
        assert!(matches!(
            diagnose_stream_error(b"not jxl at all"),
            JxlError::UnrecognizedFormat
        ));
    }
}
