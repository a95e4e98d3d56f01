//! Thin RAII wrappers over the libjxl C API.
//!
//! Everything `jpegxl_sys` stays inside this module. Each wrapper owns its
//! handle and releases it on drop. Configuration calls are exposed as safe
//! methods; calls whose pointer arguments must stay valid beyond the call
//! itself are `unsafe fn` with the contract spelled out.

use std::ffi::c_void;
use std::mem::MaybeUninit;
use std::ptr;

#[cfg(any(feature = "cms", feature = "encode"))]
use jpegxl_sys::encoder::encode::JxlColorEncodingSetToSRGB;
#[cfg(any(feature = "cms", feature = "encode"))]
use jpegxl_sys::common::types::JxlBool;
use jpegxl_sys::common::types::{JxlDataType, JxlEndianness, JxlPixelFormat};

#[cfg(any(feature = "cms", feature = "encode"))]
pub(crate) use jpegxl_sys::color::color_encoding::JxlColorEncoding;
use jpegxl_sys::threads::thread_parallel_runner::{
    JxlThreadParallelRunner, JxlThreadParallelRunnerCreate,
    JxlThreadParallelRunnerDefaultNumWorkerThreads, JxlThreadParallelRunnerDestroy,
};

use crate::error::JxlError;

#[cfg(feature = "cms")]
pub(crate) use jpegxl_sys::color::color_encoding::{JxlColorSpace, JxlPrimaries, JxlWhitePoint};
#[cfg(feature = "decode")]
pub(crate) use jpegxl_sys::decode::JxlDecoderStatus;
#[cfg(feature = "encode")]
pub(crate) use jpegxl_sys::encoder::encode::JxlEncoderStatus;
#[cfg(any(feature = "decode", feature = "encode"))]
pub(crate) use jpegxl_sys::metadata::codestream_header::JxlBasicInfo;

#[cfg(feature = "decode")]
use jpegxl_sys::decode as dec;
#[cfg(feature = "encode")]
use jpegxl_sys::encoder::encode as enc;

/// Decoder events, as the bitmask `subscribe` wants.
#[cfg(feature = "decode")]
pub(crate) const EVENT_BASIC_INFO: i32 = JxlDecoderStatus::BasicInfo as i32;
#[cfg(all(feature = "decode", feature = "cms"))]
pub(crate) const EVENT_COLOR_ENCODING: i32 = JxlDecoderStatus::ColorEncoding as i32;
#[cfg(feature = "decode")]
pub(crate) const EVENT_FULL_IMAGE: i32 = JxlDecoderStatus::FullImage as i32;

fn setup(msg: &str) -> JxlError {
    JxlError::Setup(msg.into())
}

#[cfg(any(feature = "cms", feature = "encode"))]
pub(crate) fn jxl_bool(b: bool) -> JxlBool {
    if b { JxlBool::True } else { JxlBool::False }
}

/// Tightly packed 8-bit interleaved format with `num_channels` channels.
pub(crate) fn pixel_format(num_channels: u32) -> JxlPixelFormat {
    JxlPixelFormat {
        num_channels,
        data_type: JxlDataType::Uint8,
        endianness: JxlEndianness::Native,
        align: 0,
    }
}

/// The standard sRGB color encoding (gray variant when `gray` is set).
#[cfg(any(feature = "cms", feature = "encode"))]
pub(crate) fn srgb_color_encoding(gray: bool) -> JxlColorEncoding {
    let mut encoding = MaybeUninit::<JxlColorEncoding>::uninit();
    // SAFETY: JxlColorEncodingSetToSRGB writes every field of the struct.
    unsafe {
        JxlColorEncodingSetToSRGB(encoding.as_mut_ptr(), gray);
        encoding.assume_init()
    }
}

/// libjxl runtime version, encoded as major*1_000_000 + minor*1_000 + patch.
#[cfg(feature = "decode")]
pub(crate) fn runtime_version() -> u32 {
    // SAFETY: no arguments, no state.
    unsafe { dec::JxlDecoderVersion() }
}

/// libjxl runtime version, encoded as major*1_000_000 + minor*1_000 + patch.
#[cfg(all(feature = "encode", not(feature = "decode")))]
pub(crate) fn runtime_version() -> u32 {
    // SAFETY: no arguments, no state.
    unsafe { enc::JxlEncoderVersion() }
}

// ── Thread parallel runner ──────────────────────────────────────────

/// Owned `JxlThreadParallelRunner` worker pool.
pub(crate) struct Runner(*mut c_void);

impl Runner {
    pub(crate) fn new() -> Result<Self, JxlError> {
        // SAFETY: both calls are safe with a null memory manager; a null
        // return means allocation failed.
        let raw = unsafe {
            let threads = JxlThreadParallelRunnerDefaultNumWorkerThreads();
            JxlThreadParallelRunnerCreate(ptr::null(), threads)
        };
        if raw.is_null() {
            return Err(setup("thread runner creation failed"));
        }
        Ok(Runner(raw))
    }

    fn as_opaque(&self) -> *mut c_void {
        self.0
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        // SAFETY: the pointer came from JxlThreadParallelRunnerCreate and is
        // destroyed exactly once.
        unsafe { JxlThreadParallelRunnerDestroy(self.0) };
    }
}

// ── Decoder ─────────────────────────────────────────────────────────

/// Owned `JxlDecoder` with its thread runner attached.
///
/// The runner is a struct field so it is destroyed after the decoder.
#[cfg(feature = "decode")]
pub(crate) struct Decoder {
    raw: *mut dec::JxlDecoder,
    _runner: Runner,
}

#[cfg(feature = "decode")]
impl Decoder {
    pub(crate) fn new() -> Result<Self, JxlError> {
        let runner = Runner::new()?;
        // SAFETY: a null memory manager selects the default allocator.
        let raw = unsafe { dec::JxlDecoderCreate(ptr::null()) };
        if raw.is_null() {
            return Err(setup("decoder creation failed"));
        }
        let decoder = Decoder {
            raw,
            _runner: runner,
        };
        // SAFETY: both handles are live; the runner is owned by this wrapper
        // and stays alive for every later decoder call.
        let status = unsafe {
            dec::JxlDecoderSetParallelRunner(
                decoder.raw,
                JxlThreadParallelRunner,
                decoder._runner.as_opaque(),
            )
        };
        if !matches!(status, JxlDecoderStatus::Success) {
            return Err(setup("attaching thread runner to decoder failed"));
        }
        Ok(decoder)
    }

    pub(crate) fn subscribe(&mut self, events: i32) -> Result<(), JxlError> {
        // SAFETY: live handle.
        let status = unsafe { dec::JxlDecoderSubscribeEvents(self.raw, events) };
        match status {
            JxlDecoderStatus::Success => Ok(()),
            _ => Err(setup("subscribing to decoder events failed")),
        }
    }

    /// Hand the complete input buffer to the decoder.
    ///
    /// # Safety
    ///
    /// `data` must stay valid and unmoved until the decoder is dropped; the
    /// decoder reads from it across later `process_input` calls.
    pub(crate) unsafe fn set_input(&mut self, data: &[u8]) -> Result<(), JxlError> {
        // SAFETY: pointer and length come from a live slice; the caller
        // keeps the buffer alive per this function's contract.
        let status = unsafe { dec::JxlDecoderSetInput(self.raw, data.as_ptr(), data.len()) };
        match status {
            JxlDecoderStatus::Success => Ok(()),
            _ => Err(setup("decoder rejected input buffer")),
        }
    }

    pub(crate) fn process_input(&mut self) -> JxlDecoderStatus {
        // SAFETY: live handle.
        unsafe { dec::JxlDecoderProcessInput(self.raw) }
    }

    pub(crate) fn basic_info(&self) -> Result<JxlBasicInfo, JxlError> {
        let mut info = MaybeUninit::<JxlBasicInfo>::uninit();
        // SAFETY: live handle; on Success the decoder has filled `info`.
        let status = unsafe { dec::JxlDecoderGetBasicInfo(self.raw, info.as_mut_ptr()) };
        match status {
            // SAFETY: Success means the struct was written.
            JxlDecoderStatus::Success => Ok(unsafe { info.assume_init() }),
            _ => Err(setup("basic info unavailable")),
        }
    }

    pub(crate) fn image_out_buffer_size(&self, format: &JxlPixelFormat) -> Result<usize, JxlError> {
        let mut size = 0usize;
        // SAFETY: live handle; out-params are valid for the call.
        let status = unsafe { dec::JxlDecoderImageOutBufferSize(self.raw, format, &mut size) };
        match status {
            JxlDecoderStatus::Success => Ok(size),
            _ => Err(setup("image buffer size query failed")),
        }
    }

    /// Register the pixel output buffer.
    ///
    /// # Safety
    ///
    /// `buf` must stay valid and unmoved until `process_input` has returned
    /// the full-image event or the decoder is dropped; libjxl writes decoded
    /// rows into it from inside `process_input`.
    pub(crate) unsafe fn set_image_out_buffer(
        &mut self,
        format: &JxlPixelFormat,
        buf: &mut [u8],
    ) -> Result<(), JxlError> {
        // SAFETY: pointer and length come from a live slice; the caller
        // keeps the buffer alive per this function's contract.
        let status = unsafe {
            dec::JxlDecoderSetImageOutBuffer(self.raw, format, buf.as_mut_ptr().cast(), buf.len())
        };
        match status {
            JxlDecoderStatus::Success => Ok(()),
            _ => Err(setup("decoder rejected output buffer")),
        }
    }

    /// Ask the decoder to produce output close to the given encoding.
    /// Best effort; the decoder may refuse.
    #[cfg(feature = "cms")]
    pub(crate) fn set_preferred_color_profile(&mut self, encoding: &JxlColorEncoding) -> bool {
        // SAFETY: live handle; `encoding` is only read during the call.
        let status = unsafe { dec::JxlDecoderSetPreferredColorProfile(self.raw, encoding) };
        matches!(status, JxlDecoderStatus::Success)
    }

    /// Parametric color description of the output data, if one exists.
    #[cfg(feature = "cms")]
    pub(crate) fn color_as_encoded_profile(&self) -> Option<JxlColorEncoding> {
        let mut encoding = MaybeUninit::<JxlColorEncoding>::uninit();
        // SAFETY: live handle; on Success the decoder has filled `encoding`.
        let status = unsafe {
            dec::JxlDecoderGetColorAsEncodedProfile(
                self.raw,
                dec::JxlColorProfileTarget::Data,
                encoding.as_mut_ptr(),
            )
        };
        match status {
            // SAFETY: Success means the struct was written.
            JxlDecoderStatus::Success => Some(unsafe { encoding.assume_init() }),
            _ => None,
        }
    }

    /// ICC profile of the output data, if one exists and is non-empty.
    #[cfg(feature = "cms")]
    pub(crate) fn icc_profile(&self) -> Option<Vec<u8>> {
        let mut size = 0usize;
        // SAFETY: live handle; out-param is valid for the call.
        let status = unsafe {
            dec::JxlDecoderGetICCProfileSize(self.raw, dec::JxlColorProfileTarget::Data, &mut size)
        };
        if !matches!(status, JxlDecoderStatus::Success) || size == 0 {
            return None;
        }
        let mut icc = vec![0u8; size];
        // SAFETY: `icc` holds exactly `size` writable bytes.
        let status = unsafe {
            dec::JxlDecoderGetColorAsICCProfile(
                self.raw,
                dec::JxlColorProfileTarget::Data,
                icc.as_mut_ptr(),
                icc.len(),
            )
        };
        matches!(status, JxlDecoderStatus::Success).then_some(icc)
    }
}

#[cfg(feature = "decode")]
impl Drop for Decoder {
    fn drop(&mut self) {
        // SAFETY: the handle came from JxlDecoderCreate and is destroyed
        // exactly once.
        unsafe { dec::JxlDecoderDestroy(self.raw) };
    }
}

// ── Encoder ─────────────────────────────────────────────────────────

/// Owned `JxlEncoder` with its thread runner attached.
///
/// Methods take `&self`: the handle is an opaque C object and its frame
/// settings child (`FrameSettings`) needs to coexist with later calls.
#[cfg(feature = "encode")]
pub(crate) struct Encoder {
    raw: *mut enc::JxlEncoder,
    _runner: Runner,
}

#[cfg(feature = "encode")]
impl Encoder {
    pub(crate) fn new() -> Result<Self, JxlError> {
        let runner = Runner::new()?;
        // SAFETY: a null memory manager selects the default allocator.
        let raw = unsafe { enc::JxlEncoderCreate(ptr::null()) };
        if raw.is_null() {
            return Err(setup("encoder creation failed"));
        }
        let encoder = Encoder {
            raw,
            _runner: runner,
        };
        // SAFETY: both handles are live; the runner is owned by this wrapper
        // and stays alive for every later encoder call.
        let status = unsafe {
            enc::JxlEncoderSetParallelRunner(
                encoder.raw,
                JxlThreadParallelRunner,
                encoder._runner.as_opaque(),
            )
        };
        if !matches!(status, JxlEncoderStatus::Success) {
            return Err(setup("attaching thread runner to encoder failed"));
        }
        Ok(encoder)
    }

    pub(crate) fn set_basic_info(&self, info: &JxlBasicInfo) -> Result<(), JxlError> {
        // SAFETY: live handle; `info` is only read during the call.
        let status = unsafe { enc::JxlEncoderSetBasicInfo(self.raw, info) };
        match status {
            JxlEncoderStatus::Success => Ok(()),
            _ => Err(setup("encoder rejected basic info")),
        }
    }

    pub(crate) fn set_color_encoding(&self, encoding: &JxlColorEncoding) -> Result<(), JxlError> {
        // SAFETY: live handle; `encoding` is only read during the call.
        let status = unsafe { enc::JxlEncoderSetColorEncoding(self.raw, encoding) };
        match status {
            JxlEncoderStatus::Success => Ok(()),
            _ => Err(setup("encoder rejected color encoding")),
        }
    }

    /// Create a frame settings object. It is owned by the encoder and freed
    /// with it.
    pub(crate) fn frame_settings(&self) -> Result<FrameSettings<'_>, JxlError> {
        // SAFETY: live handle; null source selects default settings.
        let raw = unsafe { enc::JxlEncoderFrameSettingsCreate(self.raw, ptr::null()) };
        if raw.is_null() {
            return Err(setup("frame settings creation failed"));
        }
        Ok(FrameSettings {
            raw,
            _encoder: std::marker::PhantomData,
        })
    }

    pub(crate) fn close_input(&self) {
        // SAFETY: live handle.
        unsafe { enc::JxlEncoderCloseInput(self.raw) };
    }

    /// Run one encoder output cycle.
    ///
    /// # Safety
    ///
    /// `next_out` must point at least `avail_out` writable bytes; libjxl
    /// advances the pointer and decrements the count as it writes.
    pub(crate) unsafe fn process_output(
        &self,
        next_out: &mut *mut u8,
        avail_out: &mut usize,
    ) -> JxlEncoderStatus {
        // SAFETY: live handle; the caller guarantees the output window.
        unsafe { enc::JxlEncoderProcessOutput(self.raw, next_out, avail_out) }
    }
}

#[cfg(feature = "encode")]
impl Drop for Encoder {
    fn drop(&mut self) {
        // SAFETY: the handle came from JxlEncoderCreate and is destroyed
        // exactly once, freeing its frame settings with it.
        unsafe { enc::JxlEncoderDestroy(self.raw) };
    }
}

/// Frame settings handle, owned by its encoder.
#[cfg(feature = "encode")]
pub(crate) struct FrameSettings<'a> {
    raw: *mut enc::JxlEncoderFrameSettings,
    _encoder: std::marker::PhantomData<&'a Encoder>,
}

#[cfg(feature = "encode")]
impl FrameSettings<'_> {
    pub(crate) fn set_distance(&self, distance: f32) -> Result<(), JxlError> {
        // SAFETY: live handle.
        let status = unsafe { enc::JxlEncoderSetFrameDistance(self.raw, distance) };
        match status {
            JxlEncoderStatus::Success => Ok(()),
            _ => Err(setup("encoder rejected frame distance")),
        }
    }

    pub(crate) fn set_lossless(&self, lossless: bool) -> Result<(), JxlError> {
        // SAFETY: live handle.
        let status = unsafe { enc::JxlEncoderSetFrameLossless(self.raw, lossless) };
        match status {
            JxlEncoderStatus::Success => Ok(()),
            _ => Err(setup("encoder rejected lossless mode")),
        }
    }

    pub(crate) fn set_effort(&self, effort: i64) -> Result<(), JxlError> {
        // SAFETY: live handle.
        let status = unsafe {
            enc::JxlEncoderFrameSettingsSetOption(
                self.raw,
                enc::JxlEncoderFrameSettingId::Effort,
                effort,
            )
        };
        match status {
            JxlEncoderStatus::Success => Ok(()),
            _ => Err(setup("encoder rejected effort setting")),
        }
    }

    /// Queue one interleaved frame for encoding.
    ///
    /// # Safety
    ///
    /// `data` must stay valid and unmoved until `process_output` has
    /// returned its final status for this encoder.
    pub(crate) unsafe fn add_image_frame(
        &self,
        format: &JxlPixelFormat,
        data: &[u8],
    ) -> Result<(), JxlError> {
        // SAFETY: pointer and length come from a live slice; the caller
        // keeps the buffer alive per this function's contract.
        let status = unsafe {
            enc::JxlEncoderAddImageFrame(self.raw, format, data.as_ptr().cast(), data.len())
        };
        match status {
            JxlEncoderStatus::Success => Ok(()),
            _ => Err(setup("encoder rejected image frame")),
        }
    }
}

/// Fresh basic info with libjxl's defaults filled in.
#[cfg(feature = "encode")]
pub(crate) fn init_basic_info() -> JxlBasicInfo {
    let mut info = MaybeUninit::<JxlBasicInfo>::uninit();
    // SAFETY: JxlEncoderInitBasicInfo writes every field of the struct.
    unsafe {
        enc::JxlEncoderInitBasicInfo(info.as_mut_ptr());
        info.assume_init()
    }
}
