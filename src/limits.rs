/// Resource limits for decode operations.
///
/// All fields default to `None` (no limit). Dimension limits are enforced
/// as soon as the codestream header is parsed, before any pixel allocation;
/// the memory limit bounds each individual pixel-buffer allocation.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes per pixel-buffer allocation.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Check header dimensions. Returns Ok(()) or LimitExceeded.
    pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), crate::JxlError> {
        if let Some(max_w) = self.max_width
            && u64::from(width) > max_w
        {
            return Err(crate::JxlError::LimitExceeded(format!(
                "width {width} exceeds limit {max_w}"
            )));
        }
        if let Some(max_h) = self.max_height
            && u64::from(height) > max_h
        {
            return Err(crate::JxlError::LimitExceeded(format!(
                "height {height} exceeds limit {max_h}"
            )));
        }
        if let Some(max_px) = self.max_pixels {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > max_px {
                return Err(crate::JxlError::LimitExceeded(format!(
                    "pixel count {pixels} exceeds limit {max_px}"
                )));
            }
        }
        Ok(())
    }

    /// Check that an allocation size is within the memory limit.
    pub(crate) fn check_memory(&self, bytes: usize) -> Result<(), crate::JxlError> {
        if let Some(max_mem) = self.max_memory_bytes
            && bytes as u64 > max_mem
        {
            return Err(crate::JxlError::LimitExceeded(format!(
                "allocation {bytes} bytes exceeds memory limit {max_mem}"
            )));
        }
        Ok(())
    }
}
