/// Errors from JPEG XL decoding and encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum JxlError {
    #[error("not a JPEG XL file")]
    UnrecognizedFormat,

    #[error("corrupt JPEG XL stream")]
    CorruptStream,

    #[error("unexpected end of input")]
    TruncatedInput,

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(u32),

    #[error("codec reported buffer size {reported}, expected {expected}")]
    BufferSizeMismatch { reported: usize, expected: usize },

    #[error("pixel buffer too small: need {needed} pixels, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("allocation of {bytes} bytes failed")]
    Oom { bytes: usize },

    #[error("codec setup failed: {0}")]
    Setup(String),

    #[error("error during encoding")]
    EncodeFailed,

    #[error("encoder made no progress")]
    EncoderStalled,

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}
