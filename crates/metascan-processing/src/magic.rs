//! Header-signature file type detection

use metascan_core::MagicBytes;

use crate::validator::file_extension;

/// Number of leading bytes inspected.
const HEADER_LEN: usize = 16;

pub const UNKNOWN_MIME: &str = "unknown";

/// Image container formats recognised by their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Tiff,
    Bmp,
    Webp,
}

impl ImageFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Webp => "image/webp",
        }
    }

    /// Extensions (lowercase, no dot) that name this format. The first is canonical.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ImageFormat::Png => &["png"],
            ImageFormat::Jpeg => &["jpg", "jpeg"],
            ImageFormat::Gif => &["gif"],
            ImageFormat::Tiff => &["tiff", "tif"],
            ImageFormat::Bmp => &["bmp"],
            ImageFormat::Webp => &["webp"],
        }
    }

    pub fn canonical_extension(&self) -> &'static str {
        self.extensions()[0]
    }

    pub fn matches_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.').to_lowercase();
        self.extensions().iter().any(|e| *e == extension)
    }
}

/// Detect the container format from the file header.
pub fn detect_format(data: &[u8]) -> Option<ImageFormat> {
    let header = &data[..data.len().min(HEADER_LEN)];

    if header.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(ImageFormat::Png)
    } else if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageFormat::Jpeg)
    } else if header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a") {
        Some(ImageFormat::Gif)
    } else if header.starts_with(b"II*\0") || header.starts_with(b"MM\0*") {
        Some(ImageFormat::Tiff)
    } else if header.starts_with(b"BM") {
        Some(ImageFormat::Bmp)
    } else if header.len() >= 12 && &header[..4] == b"RIFF" && &header[8..12] == b"WEBP" {
        Some(ImageFormat::Webp)
    } else {
        None
    }
}

/// Compare the detected format against the declared filename's extension.
pub fn validate_magic_bytes(data: &[u8], declared_filename: &str) -> MagicBytes {
    let extension = file_extension(declared_filename).unwrap_or_default();

    let (detected_mime, is_valid) = match detect_format(data) {
        Some(format) => (format.mime(), format.matches_extension(&extension)),
        None => (UNKNOWN_MIME, false),
    };

    MagicBytes {
        file_extension: if extension.is_empty() {
            String::new()
        } else {
            format!(".{}", extension)
        },
        detected_mime: detected_mime.to_string(),
        is_valid,
    }
}
