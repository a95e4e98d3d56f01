#![no_main]
use libfuzzer_sys::fuzz_target;

use zenjxl::{DecodeRequest, ImageInfo, JxlSignature, Limits};

// libjxl sees arbitrary bytes here, so keep its allocations on a leash.
const LIMITS: Limits = Limits {
    max_width: Some(1 << 12),
    max_height: Some(1 << 12),
    max_pixels: Some(1 << 20),
    max_memory_bytes: Some(64 << 20),
};

fuzz_target!(|data: &[u8]| {
    // Signature and header probes must never panic
    let _ = JxlSignature::check(data);
    let _ = ImageInfo::from_bytes(data);

    // Neither must a full decode
    let _ = DecodeRequest::new(data).with_limits(&LIMITS).decode();
});
