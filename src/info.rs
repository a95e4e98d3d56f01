//! Metadata probe without pixel decoding.

use crate::decode;
use crate::error::JxlError;

/// Image metadata from the codestream header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
    /// Color channels in the codestream (1 = gray, 3 = RGB), not counting
    /// alpha.
    pub color_channels: u32,
    /// Whether the stream declares an animation. Decoding still returns the
    /// first frame only.
    pub has_animation: bool,
}

impl ImageInfo {
    /// Parse the header of a JPEG XL stream. Stops before any pixel work,
    /// so this is cheap even for huge images.
    pub fn from_bytes(data: &[u8]) -> Result<ImageInfo, JxlError> {
        let info = decode::read_basic_info(data)?;
        Ok(ImageInfo {
            width: info.xsize,
            height: info.ysize,
            has_alpha: info.alpha_bits > 0,
            color_channels: info.num_color_channels,
            has_animation: info.have_animation as u32 != 0,
        })
    }
}
