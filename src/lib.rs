//! # zenjxl
//!
//! JPEG XL decoder and encoder backed by [libjxl], with canonical 32-bit
//! ARGB pixel buffers and ICC-aware sRGB normalization.
//!
//! Pixels are `u32` words packing `0xAARRGGBB` as a word value on every
//! host; the in-memory byte order follows host endianness (B,G,R,A on
//! little-endian machines). Decoding normalizes color to sRGB whenever the
//! stream carries a usable profile, and reports what happened in
//! [`ColorState`] instead of logging.
//!
//! ## Features
//!
//! - `decode`: decoding and header probing
//! - `encode`: encoding with quality/effort knobs
//! - `cms`: ICC-to-sRGB normalization of decoded pixels via Little CMS
//!   (implies `decode`)
//! - `vendored`: build libjxl from source instead of linking a system
//!   install
//!
//! All but `vendored` are on by default.
//!
//! ## Non-Goals
//!
//! - Animation: streams are decoded to their first frame only
//! - Output profiles other than sRGB on encode
//! - 16-bit and floating-point pixel paths
//!
//! ## Usage
//!
//! ```no_run
//! let data: &[u8] = &[]; // your JPEG XL bytes
//!
//! // Probe the header without decoding pixels
//! let info = zenjxl::ImageInfo::from_bytes(data)?;
//! println!("{}x{} alpha={}", info.width, info.height, info.has_alpha);
//!
//! // Decode to 0xAARRGGBB words
//! let image = zenjxl::DecodeRequest::new(data).decode()?;
//!
//! // Re-encode losslessly
//! let encoded = zenjxl::EncodeRequest::new()
//!     .with_quality(99)
//!     .encode(image.pixels(), image.width, image.height, image.has_alpha)?;
//! # Ok::<(), zenjxl::JxlError>(())
//! ```
//!
//! [libjxl]: https://github.com/libjxl/libjxl

#![deny(unsafe_op_in_unsafe_fn)]

mod error;
mod limits;
pub mod pixel;
mod signature;

#[cfg(any(feature = "decode", feature = "encode"))]
mod ffi;

#[cfg(feature = "cms")]
mod cms;

#[cfg(feature = "decode")]
mod decode;
#[cfg(feature = "decode")]
mod info;

#[cfg(feature = "encode")]
mod encode;

pub use error::JxlError;
pub use limits::Limits;
pub use signature::JxlSignature;

#[cfg(feature = "decode")]
pub use decode::{ColorState, DecodeOutput, DecodeRequest};
#[cfg(feature = "decode")]
pub use info::ImageInfo;

#[cfg(feature = "encode")]
pub use encode::EncodeRequest;

#[cfg(feature = "cms")]
pub use cms::SRGB_CHROMA_TOLERANCE;

/// Probe a JPEG XL header without decoding pixels.
///
/// Shorthand for [`ImageInfo::from_bytes`].
#[cfg(feature = "decode")]
pub fn probe(data: &[u8]) -> Result<ImageInfo, JxlError> {
    ImageInfo::from_bytes(data)
}

/// Decode a complete JPEG XL image with default settings.
#[cfg(feature = "decode")]
pub fn decode(data: &[u8]) -> Result<DecodeOutput, JxlError> {
    DecodeRequest::new(data).decode()
}

/// Encode ARGB pixel words with default settings.
#[cfg(feature = "encode")]
pub fn encode(
    pixels: &[u32],
    width: u32,
    height: u32,
    has_alpha: bool,
) -> Result<Vec<u8>, JxlError> {
    EncodeRequest::new().encode(pixels, width, height, has_alpha)
}

/// Version of the linked libjxl runtime, encoded as
/// `major * 1_000_000 + minor * 1_000 + patch`.
#[cfg(any(feature = "decode", feature = "encode"))]
pub fn version() -> u32 {
    ffi::runtime_version()
}

#[cfg(test)]
mod tests {
    #[cfg(any(feature = "decode", feature = "encode"))]
    #[test]
    fn version_is_nonzero() {
        assert!(super::version() > 0);
    }
}
