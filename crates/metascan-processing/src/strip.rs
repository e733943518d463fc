//! Metadata removal
//!
//! Container formats are rewritten at the segment/chunk level so the encoded
//! pixel data is carried over untouched. TIFF keeps its metadata in the same
//! directory as the raster layout, so it is decoded and re-encoded instead.

use std::io::Cursor;

use bytes::Bytes;
use img_parts::jpeg::{markers, Jpeg};
use img_parts::png::Png;
use img_parts::webp::WebP;
use img_parts::ImageEXIF;

use crate::error::StripError;
use crate::gif::{parse_gif, GifBlockKind, NETSCAPE_APP_ID};
use crate::magic::{detect_format, ImageFormat};

/// JPEG application segments needed to render the image correctly: JFIF,
/// ICC profile and Adobe color transform.
const JPEG_KEPT_APP_MARKERS: &[u8] = &[markers::APP0, markers::APP2, markers::APP14];

/// PNG ancillary chunks that carry descriptive metadata.
const PNG_METADATA_CHUNKS: &[[u8; 4]] = &[*b"tEXt", *b"zTXt", *b"iTXt", *b"tIME", *b"eXIf"];

const WEBP_XMP_CHUNK: [u8; 4] = *b"XMP ";

#[derive(Debug, Clone)]
pub struct Stripped {
    pub bytes: Vec<u8>,
    /// Original size minus cleaned size. Negative when the rewrite grew.
    pub size_reduction: i64,
}

fn is_jpeg_metadata_marker(marker: u8) -> bool {
    let app = (markers::APP0..=markers::APP15).contains(&marker);
    (app && !JPEG_KEPT_APP_MARKERS.contains(&marker)) || marker == markers::COM
}

fn strip_jpeg(data: &[u8]) -> Result<Vec<u8>, StripError> {
    let mut jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(data)).map_err(|e| {
        StripError::Malformed {
            format: "JPEG",
            message: e.to_string(),
        }
    })?;
    jpeg.segments_mut()
        .retain(|segment| !is_jpeg_metadata_marker(segment.marker()));
    Ok(jpeg.encoder().bytes().to_vec())
}

fn strip_png(data: &[u8]) -> Result<Vec<u8>, StripError> {
    let mut png = Png::from_bytes(Bytes::copy_from_slice(data)).map_err(|e| {
        StripError::Malformed {
            format: "PNG",
            message: e.to_string(),
        }
    })?;
    png.chunks_mut()
        .retain(|chunk| !PNG_METADATA_CHUNKS.contains(&chunk.kind()));
    Ok(png.encoder().bytes().to_vec())
}

fn strip_webp(data: &[u8]) -> Result<Vec<u8>, StripError> {
    let mut webp = WebP::from_bytes(Bytes::copy_from_slice(data)).map_err(|e| {
        StripError::Malformed {
            format: "WEBP",
            message: e.to_string(),
        }
    })?;
    webp.set_exif(None);
    webp.remove_chunks_by_id(WEBP_XMP_CHUNK);
    Ok(webp.encoder().bytes().to_vec())
}

/// Drops comment extensions, non-animation application extensions and any
/// bytes after the trailer.
fn strip_gif(data: &[u8]) -> Result<Vec<u8>, StripError> {
    let layout = parse_gif(data).map_err(|e| StripError::Malformed {
        format: "GIF",
        message: e.to_string(),
    })?;

    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&data[layout.preamble.clone()]);
    for block in &layout.blocks {
        let keep = match &block.kind {
            GifBlockKind::Comment(_) => false,
            GifBlockKind::Application { identifier } => identifier == NETSCAPE_APP_ID,
            GifBlockKind::OtherExtension(_) | GifBlockKind::Image => true,
        };
        if keep {
            out.extend_from_slice(&data[block.range.clone()]);
        }
    }
    out.push(data[layout.trailer.start]);
    Ok(out)
}

fn reencode_tiff(data: &[u8]) -> Result<Vec<u8>, StripError> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Tiff).map_err(|e| {
        StripError::Malformed {
            format: "TIFF",
            message: e.to_string(),
        }
    })?;

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Tiff)
        .map_err(|e| StripError::Encode {
            format: "TIFF",
            message: e.to_string(),
        })?;
    Ok(buf)
}

/// Rewrite `data` in its own format without any embedded metadata.
#[tracing::instrument(skip(data), fields(size = data.len()))]
pub fn strip_metadata(data: &[u8]) -> Result<Stripped, StripError> {
    let format = detect_format(data).ok_or(StripError::UnsupportedFormat)?;

    let bytes = match format {
        ImageFormat::Jpeg => strip_jpeg(data)?,
        ImageFormat::Png => strip_png(data)?,
        ImageFormat::Webp => strip_webp(data)?,
        ImageFormat::Gif => strip_gif(data)?,
        ImageFormat::Tiff => reencode_tiff(data)?,
        // BMP has no metadata blocks
        ImageFormat::Bmp => data.to_vec(),
    };

    let size_reduction = data.len() as i64 - bytes.len() as i64;
    tracing::debug!(
        format = format.mime(),
        cleaned_size = bytes.len(),
        size_reduction,
        "Metadata stripped"
    );

    Ok(Stripped {
        bytes,
        size_reduction,
    })
}
