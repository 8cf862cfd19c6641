//! Radiance RGBE Decoder Tests
//!
//! Synthetic byte streams covering header validation, new-RLE decoding,
//! and the exponent/mantissa tone mapping.

use vitrine::VitrineError;
use vitrine::assets::rgbe;

/// Builds a valid stream: header, resolution line, then one new-RLE
/// scanline per row with the given component planes.
fn stream(width: u16, rows: &[[Vec<u8>; 4]]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"#?RADIANCE\n");
    bytes.extend_from_slice(b"FORMAT=32-bit_rle_rgbe\n");
    bytes.extend_from_slice(b"\n");
    bytes.extend_from_slice(format!("-Y {} +X {}\n", rows.len(), width).as_bytes());

    for planes in rows {
        bytes.extend_from_slice(&[2, 2, (width >> 8) as u8, (width & 0xFF) as u8]);
        for plane in planes {
            assert_eq!(plane.len(), width as usize);
            // Encode each plane as literal spans of at most 128 bytes.
            for chunk in plane.chunks(128) {
                bytes.push(chunk.len() as u8);
                bytes.extend_from_slice(chunk);
            }
        }
    }
    bytes
}

#[test]
fn unit_exponent_decodes_to_white() {
    // Exponent 136 makes the scale 2^0: the mantissa passes through.
    let bytes = stream(1, &[[vec![255], vec![255], vec![255], vec![136]]]);
    let image = rgbe::decode(&bytes).unwrap();
    assert_eq!((image.width, image.height), (1, 1));
    assert_eq!(image.data, vec![255, 255, 255, 255]);
}

#[test]
fn zero_exponent_decodes_to_transparent_black() {
    // Mantissa is irrelevant when the exponent is zero.
    let bytes = stream(1, &[[vec![200], vec![10], vec![77], vec![0]]]);
    let image = rgbe::decode(&bytes).unwrap();
    assert_eq!(image.data, vec![0, 0, 0, 0]);
}

#[test]
fn large_exponent_clamps_to_255() {
    let bytes = stream(1, &[[vec![255], vec![128], vec![4], vec![140]]]);
    let image = rgbe::decode(&bytes).unwrap();
    // Scale 2^4 = 16: 255 and 128 clamp, 4 * 16 = 64.
    assert_eq!(image.data, vec![255, 255, 64, 255]);
}

#[test]
fn tone_map_is_exact_at_the_reference_points() {
    assert_eq!(rgbe::tone_map_texel(255, 255, 255, 136), [255, 255, 255, 255]);
    assert_eq!(rgbe::tone_map_texel(255, 0, 10, 0), [0, 0, 0, 0]);
    // One exponent step below 136 halves the mantissa.
    assert_eq!(rgbe::tone_map_texel(200, 100, 50, 135), [100, 50, 25, 255]);
}

#[test]
fn run_length_spans_round_trip() {
    let width = 200u16;
    // Alternate literals and values that compress well.
    let r: Vec<u8> = (0..200).map(|i| (i % 7) as u8).collect();
    let g = vec![42u8; 200];
    let b: Vec<u8> = (0..200).rev().map(|i| (i % 11) as u8).collect();
    let e = vec![136u8; 200];
    let bytes = stream(width, &[[r.clone(), g.clone(), b.clone(), e]]);

    let image = rgbe::decode(&bytes).unwrap();
    for x in 0..200 {
        assert_eq!(image.data[x * 4], r[x]);
        assert_eq!(image.data[x * 4 + 1], g[x]);
        assert_eq!(image.data[x * 4 + 2], b[x]);
        assert_eq!(image.data[x * 4 + 3], 255);
    }
}

#[test]
fn true_runs_are_expanded() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"#?RGBE\n\n-Y 1 +X 8\n");
    bytes.extend_from_slice(&[2, 2, 0, 8]);
    for value in [9u8, 18, 27, 136] {
        // One run of 8 identical bytes per component: 0x80 + 8.
        bytes.extend_from_slice(&[0x88, value]);
    }

    let image = rgbe::decode(&bytes).unwrap();
    assert_eq!(image.width, 8);
    for x in 0..8 {
        assert_eq!(&image.data[x * 4..x * 4 + 4], &[9, 18, 27, 255]);
    }
}

#[test]
fn rejects_wrong_magic() {
    let bytes = b"#?NOTRADIANCE\n\n-Y 1 +X 1\n".to_vec();
    assert!(matches!(
        rgbe::decode(&bytes),
        Err(VitrineError::AssetDecode(_))
    ));
}

#[test]
fn rejects_old_style_rle() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"#?RADIANCE\n\n-Y 1 +X 4\n");
    // First two bytes are pixel data, not the new-RLE 2/2 marker.
    bytes.extend_from_slice(&[255, 0, 0, 136, 255, 0, 0, 136]);
    assert!(matches!(
        rgbe::decode(&bytes),
        Err(VitrineError::AssetDecode(_))
    ));
}

#[test]
fn rejects_scanline_width_mismatch() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"#?RADIANCE\n\n-Y 1 +X 4\n");
    // Declares width 5 against an image width of 4.
    bytes.extend_from_slice(&[2, 2, 0, 5]);
    bytes.extend_from_slice(&[5, 1, 2, 3, 4, 5]);
    assert!(matches!(
        rgbe::decode(&bytes),
        Err(VitrineError::AssetDecode(_))
    ));
}

#[test]
fn rejects_overlong_run() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"#?RADIANCE\n\n-Y 1 +X 4\n");
    bytes.extend_from_slice(&[2, 2, 0, 4]);
    // A run of 8 overflows the 4-texel scanline.
    bytes.extend_from_slice(&[0x88, 1]);
    assert!(matches!(
        rgbe::decode(&bytes),
        Err(VitrineError::AssetDecode(_))
    ));
}

#[test]
fn rejects_truncated_data() {
    let bytes = b"#?RADIANCE\n\n-Y 2 +X 2\n".to_vec();
    assert!(matches!(
        rgbe::decode(&bytes),
        Err(VitrineError::AssetDecode(_))
    ));
}

#[test]
fn rejects_unsupported_resolution_orientation() {
    let bytes = b"#?RADIANCE\n\n+Y 1 +X 1\n".to_vec();
    assert!(matches!(
        rgbe::decode(&bytes),
        Err(VitrineError::AssetDecode(_))
    ));
}
