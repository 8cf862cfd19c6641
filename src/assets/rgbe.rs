//! Radiance RGBE (`.hdr`) decoder.
//!
//! Parses the ASCII header (`#?RADIANCE` / `#?RGBE` magic, blank-line
//! terminated), the `-Y <h> +X <w>` resolution line, and new-RLE encoded
//! scanlines. Old-style RLE and mismatched scanline widths are rejected.
//!
//! Texels are tone-mapped straight to RGBA8: each channel becomes
//! `m * 2^(e - 136)` clamped to `[0, 255]`, and a zero exponent yields a
//! fully transparent black texel.

use crate::errors::{Result, VitrineError};

/// A decoded equirectangular panorama, flat RGBA8.
#[derive(Debug, Clone)]
pub struct HdrImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, row-major from the top of the image.
    pub data: Vec<u8>,
}

/// Decodes a Radiance RGBE byte stream.
pub fn decode(bytes: &[u8]) -> Result<HdrImage> {
    let mut cursor = 0usize;

    let magic = read_line(bytes, &mut cursor)?;
    if !magic.starts_with("#?RADIANCE") && !magic.starts_with("#?RGBE") {
        return Err(VitrineError::AssetDecode(format!(
            "not a Radiance file (header {magic:?})"
        )));
    }

    // Remaining header lines (FORMAT=, EXPOSURE=, comments) up to the blank
    // separator line.
    loop {
        let line = read_line(bytes, &mut cursor)?;
        if line.is_empty() {
            break;
        }
    }

    let resolution = read_line(bytes, &mut cursor)?;
    let (width, height) = parse_resolution(&resolution)?;

    let w = width as usize;
    let h = height as usize;
    let mut data = vec![0u8; w * h * 4];
    // Component-planar scratch for one scanline: R row, G row, B row, E row.
    let mut planes = vec![0u8; w * 4];

    for y in 0..h {
        decode_scanline(bytes, &mut cursor, w, &mut planes)?;

        let row = &mut data[y * w * 4..(y + 1) * w * 4];
        for x in 0..w {
            let texel = tone_map_texel(planes[x], planes[w + x], planes[2 * w + x], planes[3 * w + x]);
            row[x * 4..x * 4 + 4].copy_from_slice(&texel);
        }
    }

    Ok(HdrImage {
        width,
        height,
        data,
    })
}

/// Maps one RGBE texel to RGBA8: `m * 2^(e - 136)` per channel, clamped.
/// A zero exponent is the encoder's "no value" and maps to transparent black.
#[must_use]
pub fn tone_map_texel(r: u8, g: u8, b: u8, e: u8) -> [u8; 4] {
    if e == 0 {
        return [0, 0, 0, 0];
    }
    let scale = 2.0_f32.powi(i32::from(e) - 136);
    let map = |m: u8| (f32::from(m) * scale).clamp(0.0, 255.0) as u8;
    [map(r), map(g), map(b), 255]
}

fn read_line<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a str> {
    let start = *cursor;
    let rest = bytes
        .get(start..)
        .ok_or_else(|| VitrineError::AssetDecode("truncated header".into()))?;
    let end = rest
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| VitrineError::AssetDecode("unterminated header line".into()))?;
    *cursor = start + end + 1;
    std::str::from_utf8(&rest[..end])
        .map(str::trim_end)
        .map_err(|_| VitrineError::AssetDecode("non-ASCII header line".into()))
}

fn parse_resolution(line: &str) -> Result<(u32, u32)> {
    let mut parts = line.split_ascii_whitespace();
    let bad = || VitrineError::AssetDecode(format!("unsupported resolution line {line:?}"));

    if parts.next() != Some("-Y") {
        return Err(bad());
    }
    let height: u32 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    if parts.next() != Some("+X") {
        return Err(bad());
    }
    let width: u32 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;

    if width == 0 || height == 0 {
        return Err(bad());
    }
    Ok((width, height))
}

/// Decodes one new-RLE scanline into component-planar `planes`
/// (`[R..][G..][B..][E..]`, each `width` bytes).
fn decode_scanline(
    bytes: &[u8],
    cursor: &mut usize,
    width: usize,
    planes: &mut [u8],
) -> Result<()> {
    let header = bytes
        .get(*cursor..*cursor + 4)
        .ok_or_else(|| VitrineError::AssetDecode("truncated scanline header".into()))?;
    *cursor += 4;

    // New-RLE only: both lead bytes 2 and a declared width below 0x8000.
    if header[0] != 2 || header[1] != 2 || header[2] & 0x80 != 0 {
        return Err(VitrineError::AssetDecode(
            "old-style RLE scanline is not supported".into(),
        ));
    }
    let declared = (usize::from(header[2]) << 8) | usize::from(header[3]);
    if declared != width {
        return Err(VitrineError::AssetDecode(format!(
            "scanline width {declared} does not match image width {width}"
        )));
    }

    for component in 0..4 {
        let plane = &mut planes[component * width..(component + 1) * width];
        let mut x = 0usize;
        while x < width {
            let count = next_byte(bytes, cursor)?;
            if count > 128 {
                // Run: repeat the next byte (count - 128) times.
                let run = usize::from(count) - 128;
                if x + run > width {
                    return Err(VitrineError::AssetDecode("RLE run overflows scanline".into()));
                }
                let value = next_byte(bytes, cursor)?;
                plane[x..x + run].fill(value);
                x += run;
            } else {
                // Literal span of `count` bytes.
                let run = usize::from(count);
                if run == 0 {
                    return Err(VitrineError::AssetDecode("zero-length RLE literal".into()));
                }
                if x + run > width {
                    return Err(VitrineError::AssetDecode("RLE literal overflows scanline".into()));
                }
                let src = bytes
                    .get(*cursor..*cursor + run)
                    .ok_or_else(|| VitrineError::AssetDecode("truncated RLE literal".into()))?;
                *cursor += run;
                plane[x..x + run].copy_from_slice(src);
                x += run;
            }
        }
    }

    Ok(())
}

fn next_byte(bytes: &[u8], cursor: &mut usize) -> Result<u8> {
    let b = *bytes
        .get(*cursor)
        .ok_or_else(|| VitrineError::AssetDecode("truncated scanline data".into()))?;
    *cursor += 1;
    Ok(b)
}
