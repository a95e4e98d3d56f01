#!/usr/bin/env -S cargo +nightly -Zscript
---
[dependencies]
zenjxl = { path = ".." }
---
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // Real streams from our own encoder, one lossless and one lossy
    let mut rgb = Vec::new();
    for i in 0u32..8 * 8 {
        rgb.push(0xFF00_0000 | (i * 0x0004_0810));
    }
    let lossless = zenjxl::EncodeRequest::new()
        .with_quality(99)
        .encode(&rgb, 8, 8, false)
        .unwrap();
    fs::write(format!("{dir}/rgb_8x8_lossless.jxl"), lossless).unwrap();

    let mut rgba = Vec::new();
    for i in 0u32..4 * 4 {
        rgba.push((i * 0x1000_0000) | 0x0020_40FF);
    }
    let lossy = zenjxl::EncodeRequest::new()
        .with_quality(60)
        .encode(&rgba, 4, 4, true)
        .unwrap();
    fs::write(format!("{dir}/rgba_4x4_lossy.jxl"), lossy).unwrap();

    // Container skeleton: signature box, ftyp box, then a jxlc box whose
    // payload is junk. Exercises box parsing past the signature check.
    let mut container = Vec::new();
    container.extend_from_slice(&[
        0x00, 0x00, 0x00, 0x0C, b'J', b'X', b'L', b' ', 0x0D, 0x0A, 0x87, 0x0A,
    ]);
    container.extend_from_slice(&[
        0x00, 0x00, 0x00, 0x14, b'f', b't', b'y', b'p', b'j', b'x', b'l', b' ', 0x00, 0x00, 0x00,
        0x00, b'j', b'x', b'l', b' ',
    ]);
    container.extend_from_slice(&[0x00, 0x00, 0x00, 0x10, b'j', b'x', b'l', b'c']);
    container.extend_from_slice(&[0xFF, 0x0A, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00]);
    fs::write(format!("{dir}/container_junk_codestream.bin"), container).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/bare_magic.bin"), [0xFF, 0x0A]).unwrap();
    fs::write(format!("{dir}/half_signature_box.bin"), [0x00, 0x00, 0x00, 0x0C, b'J', b'X'])
        .unwrap();
    fs::write(format!("{dir}/jpeg_magic.bin"), [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

    println!("Generated seed corpus in {dir}/");
}
