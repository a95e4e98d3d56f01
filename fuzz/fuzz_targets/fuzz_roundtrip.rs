#![no_main]
use libfuzzer_sys::fuzz_target;

use zenjxl::{DecodeRequest, EncodeRequest, Limits};

const LIMITS: Limits = Limits {
    max_width: Some(1 << 12),
    max_height: Some(1 << 12),
    max_pixels: Some(1 << 20),
    max_memory_bytes: Some(64 << 20),
};

fuzz_target!(|data: &[u8]| {
    // If the input decodes, a lossless re-encode must reproduce it exactly
    let Ok(decoded) = DecodeRequest::new(data).with_limits(&LIMITS).decode() else {
        return;
    };

    // Low effort keeps iterations fast
    let Ok(reencoded) = EncodeRequest::new()
        .with_quality(99)
        .with_compression(1)
        .encode(
            decoded.pixels(),
            decoded.width,
            decoded.height,
            decoded.has_alpha,
        )
    else {
        panic!("re-encode of decoded pixels failed");
    };

    let Ok(decoded2) = DecodeRequest::new(&reencoded).decode() else {
        panic!("re-encoded data failed to decode");
    };

    assert_eq!(decoded.width, decoded2.width);
    assert_eq!(decoded.height, decoded2.height);
    assert_eq!(decoded.has_alpha, decoded2.has_alpha);
    assert_eq!(
        decoded.pixels(),
        decoded2.pixels(),
        "roundtrip pixel mismatch"
    );
});
