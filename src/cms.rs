//! sRGB acceptance check and ICC-to-sRGB normalization via Little CMS.
//!
//! Decoded pixels that already carry sRGB colorimetry are passed through
//! untouched; anything else is transformed from its embedded ICC profile.
//! The transform writes host-ordered canonical bytes directly, so no second
//! reordering pass runs over converted pixels.

use lcms2::{Intent, PixelFormat, Profile, Transform};

use crate::ffi::{self, JxlColorEncoding, JxlColorSpace, JxlPrimaries, JxlWhitePoint};

/// Default per-component tolerance when comparing a stream's chromaticities
/// against sRGB.
pub const SRGB_CHROMA_TOLERANCE: f64 = 2e-5;

// sRGB primaries and D65 white point as (x, y) chromaticities, the values
// libjxl uses for the canonical enums.
const SRGB_RED_XY: [f64; 2] = [0.639_998_686, 0.330_010_138];
const SRGB_GREEN_XY: [f64; 2] = [0.300_003_784, 0.600_003_357];
const SRGB_BLUE_XY: [f64; 2] = [0.150_002_046, 0.059_997_204];
const D65_XY: [f64; 2] = [0.3127, 0.3290];

fn xy_close(actual: [f64; 2], reference: [f64; 2], tolerance: f64) -> bool {
    (actual[0] - reference[0]).abs() <= tolerance && (actual[1] - reference[1]).abs() <= tolerance
}

/// Whether `encoding` already describes sRGB (or gray-sRGB) pixels.
///
/// The transfer function must be exactly sRGB. White point and primaries
/// pass either as the canonical enum values or as custom chromaticities
/// within `tolerance` per component. Gray encodings carry no meaningful
/// primaries, so only white point and transfer function are checked.
pub(crate) fn encoding_is_srgb(encoding: &JxlColorEncoding, tolerance: f64) -> bool {
    let gray = match encoding.color_space {
        JxlColorSpace::Rgb => false,
        JxlColorSpace::Gray => true,
        _ => return false,
    };
    let srgb = ffi::srgb_color_encoding(gray);

    if encoding.transfer_function as u32 != srgb.transfer_function as u32 {
        return false;
    }

    let white_ok = encoding.white_point as u32 == srgb.white_point as u32
        || (matches!(encoding.white_point, JxlWhitePoint::Custom)
            && xy_close(encoding.white_point_xy, D65_XY, tolerance));
    if !white_ok {
        return false;
    }
    if gray {
        return true;
    }

    encoding.primaries as u32 == srgb.primaries as u32
        || (matches!(encoding.primaries, JxlPrimaries::Custom)
            && xy_close(encoding.primaries_red_xy, SRGB_RED_XY, tolerance)
            && xy_close(encoding.primaries_green_xy, SRGB_GREEN_XY, tolerance)
            && xy_close(encoding.primaries_blue_xy, SRGB_BLUE_XY, tolerance))
}

/// Rendering intent declared in the ICC profile header (bytes 64..68).
/// Out-of-range or missing values fall back to relative colorimetric.
fn intent_from_icc(icc: &[u8]) -> Intent {
    let declared = icc
        .get(64..68)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]));
    match declared {
        Some(0) => Intent::Perceptual,
        Some(1) => Intent::RelativeColorimetric,
        Some(2) => Intent::Saturation,
        Some(3) => Intent::AbsoluteColorimetric,
        _ => Intent::RelativeColorimetric,
    }
}

/// Transform interleaved samples through their ICC profile into sRGB,
/// writing canonical ARGB words to `dst`.
///
/// `channels` follows the codestream layout (1/2/3/4). Little CMS never
/// touches extra channels, so the alpha byte of every destination word is
/// written here: source alpha for 2- and 4-channel input, opaque otherwise.
///
/// Returns `None` when the profile or the transform cannot be built; the
/// caller falls back to uncorrected reordering.
pub(crate) fn convert_to_srgb(
    icc: &[u8],
    src: &[u8],
    channels: u32,
    dst: &mut [u32],
) -> Option<()> {
    let src_profile = Profile::new_icc(icc).ok()?;
    let dst_profile = Profile::new_srgb();

    let src_format = match channels {
        1 => PixelFormat::GRAY_8,
        2 => PixelFormat::GRAYA_8,
        3 => PixelFormat::RGB_8,
        _ => PixelFormat::RGBA_8,
    };
    // BGRA bytes on little-endian hosts (ARGB on big-endian) are exactly the
    // canonical word layout.
    let dst_format = if cfg!(target_endian = "little") {
        PixelFormat::BGRA_8
    } else {
        PixelFormat::ARGB_8
    };

    let transform = Transform::<u8, u8>::new(
        &src_profile,
        src_format,
        &dst_profile,
        dst_format,
        intent_from_icc(icc),
    )
    .ok()?;
    transform.transform_pixels(src, bytemuck::cast_slice_mut(dst));

    match channels {
        2 => {
            for (px, s) in dst.iter_mut().zip(src.chunks_exact(2)) {
                *px = (*px & 0x00FF_FFFF) | (u32::from(s[1]) << 24);
            }
        }
        4 => {
            for (px, s) in dst.iter_mut().zip(src.chunks_exact(4)) {
                *px = (*px & 0x00FF_FFFF) | (u32::from(s[3]) << 24);
            }
        }
        _ => {
            for px in dst.iter_mut() {
                *px |= 0xFF00_0000;
            }
        }
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpegxl_sys::color::color_encoding::JxlTransferFunction;

    fn srgb_reference() -> JxlColorEncoding {
        ffi::srgb_color_encoding(false)
    }

    #[test]
    fn canonical_srgb_is_accepted() {
        assert!(encoding_is_srgb(&srgb_reference(), SRGB_CHROMA_TOLERANCE));
        assert!(encoding_is_srgb(
            &ffi::srgb_color_encoding(true),
            SRGB_CHROMA_TOLERANCE
        ));
    }

    #[test]
    fn custom_chromaticities_within_tolerance_pass() {
        let mut encoding = srgb_reference();
        encoding.white_point = JxlWhitePoint::Custom;
        encoding.white_point_xy = [D65_XY[0] + 1e-5, D65_XY[1] - 1e-5];
        encoding.primaries = JxlPrimaries::Custom;
        encoding.primaries_red_xy = [SRGB_RED_XY[0] - 1e-5, SRGB_RED_XY[1]];
        encoding.primaries_green_xy = SRGB_GREEN_XY;
        encoding.primaries_blue_xy = [SRGB_BLUE_XY[0], SRGB_BLUE_XY[1] + 1e-5];
        assert!(encoding_is_srgb(&encoding, SRGB_CHROMA_TOLERANCE));
    }

    #[test]
    fn custom_chromaticities_outside_tolerance_fail() {
        let mut encoding = srgb_reference();
        encoding.primaries = JxlPrimaries::Custom;
        encoding.primaries_red_xy = [SRGB_RED_XY[0] + 1e-3, SRGB_RED_XY[1]];
        encoding.primaries_green_xy = SRGB_GREEN_XY;
        encoding.primaries_blue_xy = SRGB_BLUE_XY;
        assert!(!encoding_is_srgb(&encoding, SRGB_CHROMA_TOLERANCE));

        // A wider caller-chosen tolerance accepts the same encoding.
        assert!(encoding_is_srgb(&encoding, 2e-3));
    }

    #[test]
    fn non_srgb_transfer_function_fails() {
        let mut encoding = srgb_reference();
        encoding.transfer_function = JxlTransferFunction::Linear;
        assert!(!encoding_is_srgb(&encoding, SRGB_CHROMA_TOLERANCE));
    }

    #[test]
    fn xyb_is_never_srgb() {
        let mut encoding = srgb_reference();
        encoding.color_space = JxlColorSpace::Xyb;
        assert!(!encoding_is_srgb(&encoding, SRGB_CHROMA_TOLERANCE));
    }

    #[test]
    fn intent_parses_from_header() {
        let mut icc = vec![0u8; 72];
        assert_eq!(intent_from_icc(&icc), Intent::Perceptual);
        icc[67] = 1;
        assert_eq!(intent_from_icc(&icc), Intent::RelativeColorimetric);
        icc[67] = 2;
        assert_eq!(intent_from_icc(&icc), Intent::Saturation);
        icc[67] = 3;
        assert_eq!(intent_from_icc(&icc), Intent::AbsoluteColorimetric);
        icc[67] = 9;
        assert_eq!(intent_from_icc(&icc), Intent::RelativeColorimetric);
        assert_eq!(intent_from_icc(&icc[..10]), Intent::RelativeColorimetric);
    }

    #[test]
    fn srgb_profile_roundtrip_preserves_pixels() {
        let icc = Profile::new_srgb().icc().unwrap();
        let src = [10u8, 20, 30, 0x80, 200, 100, 50, 0x01];
        let mut dst = [0u32; 2];
        convert_to_srgb(&icc, &src, 4, &mut dst).unwrap();

        // sRGB through sRGB is near-identity; alpha must be carried exactly.
        for (word, px) in dst.iter().zip(src.chunks_exact(4)) {
            assert_eq!(crate::pixel::alpha(*word), px[3]);
            assert!(crate::pixel::red(*word).abs_diff(px[0]) <= 2);
            assert!(crate::pixel::green(*word).abs_diff(px[1]) <= 2);
            assert!(crate::pixel::blue(*word).abs_diff(px[2]) <= 2);
        }
    }

    #[test]
    fn gray_alpha_carries_through() {
        let white = lcms2::CIExyY {
            x: 0.3127,
            y: 0.3290,
            Y: 1.0,
        };
        let curve = lcms2::ToneCurve::new(2.2);
        let Ok(profile) = Profile::new_gray(&white, &curve) else {
            return;
        };
        let Ok(icc) = profile.icc() else {
            return;
        };
        let src = [0u8, 0x20, 255, 0xEE];
        let mut dst = [0u32; 2];
        if convert_to_srgb(&icc, &src, 2, &mut dst).is_some() {
            assert_eq!(crate::pixel::alpha(dst[0]), 0x20);
            assert_eq!(crate::pixel::alpha(dst[1]), 0xEE);
            assert_eq!(crate::pixel::red(dst[1]), crate::pixel::green(dst[1]));
        }
    }

    #[test]
    fn garbage_profile_is_rejected() {
        let mut dst = [0u32; 1];
        assert!(convert_to_srgb(&[0u8; 16], &[1, 2, 3], 3, &mut dst).is_none());
    }
}
