//! Test fixtures: images generated with `image`, EXIF injected with `img-parts`.

use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::ImageEXIF;
use std::io::Cursor;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            96,
        ])
    })
}

fn encode(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode fixture");
    buf
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Jpeg)
}

/// One IFD entry: (tag, type, count, value-or-offset bytes).
type Entry = (u16, u16, u32, [u8; 4]);

fn push_ifd(out: &mut Vec<u8>, entries: &[Entry]) {
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (tag, kind, count, value) in entries {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(value);
    }
    out.extend_from_slice(&0u32.to_le_bytes());
}

fn rationals(values: &[(u32, u32)]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|(n, d)| n.to_le_bytes().into_iter().chain(d.to_le_bytes()))
        .collect()
}

/// Little-endian TIFF block: IFD0 with `Make = "Canon"` and a GPS IFD for
/// 37°58'0" N, 122°25'0" W.
fn exif_with_gps() -> Vec<u8> {
    // Layout: header(8) | IFD0 2 entries (30) | "Canon\0" (6) | GPS IFD 4 entries (54) | lat (24) | lon (24)
    let ifd0_offset = 8u32;
    let make_offset = ifd0_offset + 2 + 12 * 2 + 4;
    let gps_offset = make_offset + 6;
    let lat_offset = gps_offset + 2 + 12 * 4 + 4;
    let lon_offset = lat_offset + 24;

    let mut out = b"II*\0".to_vec();
    out.extend_from_slice(&ifd0_offset.to_le_bytes());
    push_ifd(
        &mut out,
        &[
            (0x010F, 2, 6, make_offset.to_le_bytes()),
            (0x8825, 4, 1, gps_offset.to_le_bytes()),
        ],
    );
    out.extend_from_slice(b"Canon\0");
    push_ifd(
        &mut out,
        &[
            (0x0001, 2, 2, *b"N\0\0\0"),
            (0x0002, 5, 3, lat_offset.to_le_bytes()),
            (0x0003, 2, 2, *b"W\0\0\0"),
            (0x0004, 5, 3, lon_offset.to_le_bytes()),
        ],
    );
    out.extend_from_slice(&rationals(&[(37, 1), (58, 1), (0, 1)]));
    out.extend_from_slice(&rationals(&[(122, 1), (25, 1), (0, 1)]));
    out
}

/// JPEG with camera make and GPS position in its EXIF block.
pub fn jpeg_with_gps() -> Vec<u8> {
    let mut jpeg = Jpeg::from_bytes(Bytes::from(jpeg(32, 32))).expect("parse jpeg");
    jpeg.set_exif(Some(Bytes::from(exif_with_gps())));
    jpeg.encoder().bytes().to_vec()
}
