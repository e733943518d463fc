//! Fixture images for unit tests

use std::io::Cursor;

use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use img_parts::jpeg::Jpeg;
use img_parts::ImageEXIF;

const GPS_IFD_POINTER: u16 = 0x8825;

pub(crate) enum ExifValue {
    Ascii(String),
    Rationals(Vec<(u32, u32)>),
}

pub(crate) struct ExifEntry {
    tag: u16,
    gps: bool,
    value: ExifValue,
}

impl ExifEntry {
    pub(crate) fn ascii(tag: u16, text: &str) -> Self {
        Self {
            tag,
            gps: false,
            value: ExifValue::Ascii(text.to_string()),
        }
    }

    pub(crate) fn gps_ascii(tag: u16, text: &str) -> Self {
        Self {
            tag,
            gps: true,
            value: ExifValue::Ascii(text.to_string()),
        }
    }

    pub(crate) fn gps_rationals(tag: u16, values: &[(u32, u32)]) -> Self {
        Self {
            tag,
            gps: true,
            value: ExifValue::Rationals(values.to_vec()),
        }
    }

    /// 37°58'0" N, 122°25'0" W
    pub(crate) fn gps_san_francisco() -> Vec<Self> {
        vec![
            Self::gps_ascii(0x0001, "N"),
            Self::gps_rationals(0x0002, &[(37, 1), (58, 1), (0, 1)]),
            Self::gps_ascii(0x0003, "W"),
            Self::gps_rationals(0x0004, &[(122, 1), (25, 1), (0, 1)]),
        ]
    }
}

struct RawEntry {
    tag: u16,
    kind: u16,
    count: u32,
    payload: Vec<u8>,
}

impl From<&ExifEntry> for RawEntry {
    fn from(entry: &ExifEntry) -> Self {
        match &entry.value {
            ExifValue::Ascii(text) => {
                let mut payload = text.as_bytes().to_vec();
                payload.push(0);
                RawEntry {
                    tag: entry.tag,
                    kind: 2,
                    count: payload.len() as u32,
                    payload,
                }
            }
            ExifValue::Rationals(values) => RawEntry {
                tag: entry.tag,
                kind: 5,
                count: values.len() as u32,
                payload: values
                    .iter()
                    .flat_map(|(n, d)| n.to_le_bytes().into_iter().chain(d.to_le_bytes()))
                    .collect(),
            },
        }
    }
}

fn padded(len: usize) -> usize {
    (len + 1) & !1
}

fn ifd_size(entries: &[RawEntry]) -> usize {
    2 + 12 * entries.len()
        + 4
        + entries
            .iter()
            .filter(|e| e.payload.len() > 4)
            .map(|e| padded(e.payload.len()))
            .sum::<usize>()
}

fn write_ifd(out: &mut Vec<u8>, entries: &[RawEntry]) {
    let mut data_offset = out.len() + 2 + 12 * entries.len() + 4;
    let mut data = Vec::new();

    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for entry in entries {
        out.extend_from_slice(&entry.tag.to_le_bytes());
        out.extend_from_slice(&entry.kind.to_le_bytes());
        out.extend_from_slice(&entry.count.to_le_bytes());
        if entry.payload.len() <= 4 {
            let mut inline = entry.payload.clone();
            inline.resize(4, 0);
            out.extend_from_slice(&inline);
        } else {
            out.extend_from_slice(&(data_offset as u32).to_le_bytes());
            data.extend_from_slice(&entry.payload);
            if entry.payload.len() % 2 == 1 {
                data.push(0);
            }
            data_offset += padded(entry.payload.len());
        }
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&data);
}

/// Little-endian TIFF structure holding IFD0 and, when needed, a GPS IFD.
pub(crate) fn tiff_exif_block(entries: &[ExifEntry]) -> Vec<u8> {
    let mut ifd0: Vec<RawEntry> = entries.iter().filter(|e| !e.gps).map(RawEntry::from).collect();
    let mut gps: Vec<RawEntry> = entries.iter().filter(|e| e.gps).map(RawEntry::from).collect();

    if !gps.is_empty() {
        ifd0.push(RawEntry {
            tag: GPS_IFD_POINTER,
            kind: 4,
            count: 1,
            payload: vec![0; 4],
        });
    }
    ifd0.sort_by_key(|e| e.tag);
    gps.sort_by_key(|e| e.tag);

    let gps_offset = (8 + ifd_size(&ifd0)) as u32;
    if let Some(pointer) = ifd0.iter_mut().find(|e| e.tag == GPS_IFD_POINTER) {
        pointer.payload = gps_offset.to_le_bytes().to_vec();
    }

    let mut out = b"II*\0".to_vec();
    out.extend_from_slice(&8u32.to_le_bytes());
    write_ifd(&mut out, &ifd0);
    if !gps.is_empty() {
        write_ifd(&mut out, &gps);
    }
    out
}

fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            128,
        ])
    })
}

pub(crate) fn png_image(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            128,
            255,
        ])
    });
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

pub(crate) fn jpeg_image(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    gradient_rgb(width, height)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .expect("encode jpeg");
    buf
}

pub(crate) fn tiff_image(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    gradient_rgb(width, height)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Tiff)
        .expect("encode tiff");
    buf
}

pub(crate) fn bmp_image(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    gradient_rgb(width, height)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Bmp)
        .expect("encode bmp");
    buf
}

/// JPEG carrying `exif` verbatim as its APP1 payload.
pub(crate) fn jpeg_with_raw_exif(exif: Vec<u8>) -> Vec<u8> {
    let mut jpeg = Jpeg::from_bytes(Bytes::from(jpeg_image(16, 16))).expect("parse jpeg");
    jpeg.set_exif(Some(Bytes::from(exif)));
    jpeg.encoder().bytes().to_vec()
}

pub(crate) fn jpeg_with_exif(entries: &[ExifEntry]) -> Vec<u8> {
    jpeg_with_raw_exif(tiff_exif_block(entries))
}

/// PNG with a `tEXt` chunk holding `keyword` and `text`.
pub(crate) fn png_with_text(keyword: &str, text: &str) -> Vec<u8> {
    use img_parts::png::{Png, PngChunk};

    let mut png = Png::from_bytes(Bytes::from(png_image(8, 8))).expect("parse png");
    let mut contents = keyword.as_bytes().to_vec();
    contents.push(0);
    contents.extend_from_slice(text.as_bytes());
    let chunk = PngChunk::new(*b"tEXt", Bytes::from(contents));
    let position = png.chunks().len() - 1;
    png.chunks_mut().insert(position, chunk);
    png.encoder().bytes().to_vec()
}

pub(crate) fn webp_image(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    gradient_rgb(width, height)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::WebP)
        .expect("encode webp");
    buf
}

fn riff_chunk(out: &mut Vec<u8>, id: &[u8; 4], payload: &[u8]) {
    out.extend_from_slice(id);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
}

/// Extended (VP8X) WebP with an `EXIF` chunk built from `entries` and an
/// `XMP ` chunk holding `xmp`.
pub(crate) fn webp_with_exif_and_xmp(entries: &[ExifEntry], xmp: &str) -> Vec<u8> {
    const EXIF_FLAG: u8 = 0x08;
    const XMP_FLAG: u8 = 0x04;
    let (width, height) = (16u32, 16u32);

    let simple = webp_image(width, height);
    let bitstream = &simple[12..];

    let mut vp8x = vec![EXIF_FLAG | XMP_FLAG, 0, 0, 0];
    vp8x.extend_from_slice(&(width - 1).to_le_bytes()[..3]);
    vp8x.extend_from_slice(&(height - 1).to_le_bytes()[..3]);

    let mut body = b"WEBP".to_vec();
    riff_chunk(&mut body, b"VP8X", &vp8x);
    body.extend_from_slice(bitstream);
    riff_chunk(&mut body, b"EXIF", &tiff_exif_block(entries));
    riff_chunk(&mut body, b"XMP ", xmp.as_bytes());

    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend(body);
    out
}
