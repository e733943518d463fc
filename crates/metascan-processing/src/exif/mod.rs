//! Embedded metadata extraction
//!
//! Reads EXIF (JPEG, PNG, TIFF, WEBP) through `kamadak-exif` plus the textual
//! blocks that live outside EXIF: PNG text chunks, JPEG comment segments and
//! GIF comment extensions. Every entry is stored as a [`MetadataField`] so that
//! consumers branch on its shape instead of assuming one.

mod gps;

use std::collections::BTreeMap;
use std::io::Cursor;

use bytes::Bytes;
use exif::{Context, Field, In, Reader, Tag, Value};
use img_parts::jpeg::{markers, Jpeg};
use img_parts::png::Png;
use metascan_core::{
    ExifData, MetadataField, MetadataMap, Rational, RiskCategory, RiskFinding, TagValue,
};

use crate::error::DetectorError;
use crate::gif::{parse_gif, GifBlockKind};
use crate::magic::{detect_format, ImageFormat};

pub use gps::{dms_to_decimal, resolve_gps, GPS_GROUP_KEY};

/// Tags whose presence alone is a privacy finding.
pub const SENSITIVE_TAGS: &[&str] = &["DateTime", "Make", "Model", "Software", GPS_GROUP_KEY];

/// Longest rendering kept for opaque (undefined/unknown) tag values.
const MAX_OPAQUE_LEN: usize = 256;

/// Baseline TIFF tags describing the raster layout rather than the picture.
/// They are always present in a TIFF, cleaned or not, so they are not reported.
const TIFF_STRUCTURE_TAGS: &[u16] = &[
    254, 256, 257, 258, 259, 262, 273, 277, 278, 279, 282, 283, 284, 296, 317, 320, 322, 323, 324,
    325, 338, 339,
];

fn is_structural(tag: Tag, format: ImageFormat) -> bool {
    if tag == Tag::ExifIFDPointer || tag == Tag::InteropIFDPointer {
        return true;
    }
    format == ImageFormat::Tiff
        && tag.context() == Context::Tiff
        && TIFF_STRUCTURE_TAGS.contains(&tag.number())
}

fn ascii_text(values: &[Vec<u8>]) -> String {
    values
        .iter()
        .map(|v| String::from_utf8_lossy(v).trim_end_matches('\0').to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn opaque_text(field: &Field) -> String {
    let mut text = field.display_value().to_string();
    if text.len() > MAX_OPAQUE_LEN {
        let mut cut = MAX_OPAQUE_LEN;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("...");
    }
    text
}

fn tag_value(field: &Field) -> TagValue {
    match &field.value {
        Value::Ascii(values) => TagValue::Text(ascii_text(values)),
        Value::Byte(v) => TagValue::Integers(v.iter().map(|&x| x as i64).collect()),
        Value::Short(v) => TagValue::Integers(v.iter().map(|&x| x as i64).collect()),
        Value::Long(v) => TagValue::Integers(v.iter().map(|&x| x as i64).collect()),
        Value::SByte(v) => TagValue::Integers(v.iter().map(|&x| x as i64).collect()),
        Value::SShort(v) => TagValue::Integers(v.iter().map(|&x| x as i64).collect()),
        Value::SLong(v) => TagValue::Integers(v.iter().map(|&x| x as i64).collect()),
        Value::Rational(v) => TagValue::Rationals(
            v.iter()
                .map(|r| Rational::new(r.num as i64, r.denom as i64))
                .collect(),
        ),
        Value::SRational(v) => TagValue::Rationals(
            v.iter()
                .map(|r| Rational::new(r.num as i64, r.denom as i64))
                .collect(),
        ),
        Value::Float(v) => TagValue::Floats(v.iter().map(|&x| x as f64).collect()),
        Value::Double(v) => TagValue::Floats(v.clone()),
        _ => TagValue::Text(opaque_text(field)),
    }
}

fn exif_fields(data: &[u8], format: ImageFormat, metadata: &mut MetadataMap) -> Result<(), DetectorError> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(()),
        Err(e) => return Err(DetectorError::Metadata(e.to_string())),
    };

    let mut gps_group = BTreeMap::new();
    let mut gps_pointer = None;

    for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
        if field.tag == Tag::GPSInfoIFDPointer {
            gps_pointer = Some(tag_value(field));
            continue;
        }
        if is_structural(field.tag, format) {
            continue;
        }
        if field.tag.context() == Context::Gps {
            gps_group.insert(field.tag.to_string(), tag_value(field));
        } else {
            metadata.insert(
                field.tag.to_string(),
                MetadataField::Scalar(tag_value(field)),
            );
        }
    }

    // A GPS pointer whose directory yielded no entries stays a bare scalar.
    if !gps_group.is_empty() {
        metadata.insert(GPS_GROUP_KEY.to_string(), MetadataField::Group(gps_group));
    } else if let Some(pointer) = gps_pointer {
        metadata.insert(GPS_GROUP_KEY.to_string(), MetadataField::Scalar(pointer));
    }

    Ok(())
}

fn png_text_chunks(data: &[u8], metadata: &mut MetadataMap) -> Result<(), DetectorError> {
    let png = Png::from_bytes(Bytes::copy_from_slice(data))
        .map_err(|e| DetectorError::Metadata(e.to_string()))?;

    for chunk in png.chunks() {
        let kind = chunk.kind();
        if &kind != b"tEXt" && &kind != b"iTXt" && &kind != b"zTXt" {
            continue;
        }
        let contents = chunk.contents();
        let mut parts = contents.splitn(2, |&b| b == 0);
        let keyword = String::from_utf8_lossy(parts.next().unwrap_or_default()).to_string();
        let text = match &kind {
            b"tEXt" => String::from_utf8_lossy(parts.next().unwrap_or_default()).to_string(),
            // compressed or international text: keep the raw payload searchable
            _ => String::from_utf8_lossy(parts.next().unwrap_or_default())
                .replace('\0', " ")
                .trim()
                .to_string(),
        };
        metadata.insert(
            format!("PNG:{}", keyword),
            MetadataField::Scalar(TagValue::Text(text)),
        );
    }

    Ok(())
}

fn jpeg_comments(data: &[u8], metadata: &mut MetadataMap) -> Result<(), DetectorError> {
    let jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(data))
        .map_err(|e| DetectorError::Metadata(e.to_string()))?;

    let comments: Vec<String> = jpeg
        .segments()
        .iter()
        .filter(|s| s.marker() == markers::COM)
        .map(|s| String::from_utf8_lossy(s.contents()).to_string())
        .collect();

    if !comments.is_empty() {
        metadata.insert(
            "Comment".to_string(),
            MetadataField::Scalar(TagValue::Text(comments.join("\n"))),
        );
    }

    Ok(())
}

fn gif_comments(data: &[u8], metadata: &mut MetadataMap) -> Result<(), DetectorError> {
    let layout = parse_gif(data).map_err(|e| DetectorError::Metadata(e.to_string()))?;

    let comments: Vec<String> = layout
        .blocks
        .iter()
        .filter_map(|block| match &block.kind {
            GifBlockKind::Comment(text) => Some(String::from_utf8_lossy(text).to_string()),
            _ => None,
        })
        .collect();

    if !comments.is_empty() {
        metadata.insert(
            "Comment".to_string(),
            MetadataField::Scalar(TagValue::Text(comments.join("\n"))),
        );
    }

    Ok(())
}

/// Parse every metadata entry embedded in the image container.
///
/// Images without metadata, and formats that cannot carry any (BMP), yield an
/// empty map. A metadata block that is present but malformed is an error.
pub fn extract_metadata(data: &[u8]) -> Result<MetadataMap, DetectorError> {
    let mut metadata = MetadataMap::new();

    match detect_format(data) {
        Some(format @ (ImageFormat::Tiff | ImageFormat::Webp)) => {
            exif_fields(data, format, &mut metadata)?;
        }
        Some(ImageFormat::Jpeg) => {
            exif_fields(data, ImageFormat::Jpeg, &mut metadata)?;
            jpeg_comments(data, &mut metadata)?;
        }
        Some(ImageFormat::Png) => {
            exif_fields(data, ImageFormat::Png, &mut metadata)?;
            png_text_chunks(data, &mut metadata)?;
        }
        Some(ImageFormat::Gif) => gif_comments(data, &mut metadata)?,
        Some(ImageFormat::Bmp) | None => {}
    }

    Ok(metadata)
}

/// Build the report section from a parsed metadata map.
pub fn build_exif_data(metadata: MetadataMap) -> ExifData {
    let gps_data = metadata.get(GPS_GROUP_KEY).and_then(resolve_gps);
    let has_sensitive_data = SENSITIVE_TAGS
        .iter()
        .any(|tag| metadata.get(*tag).is_some_and(|f| !f.is_missing()));

    ExifData {
        metadata,
        gps_data,
        has_sensitive_data,
    }
}

/// Extract and resolve metadata in one step.
pub fn analyze_exif(data: &[u8]) -> Result<ExifData, DetectorError> {
    extract_metadata(data).map(build_exif_data)
}

/// Findings contributed by the metadata section, in report order.
pub fn exif_findings(exif: &ExifData) -> Vec<RiskFinding> {
    let mut findings = Vec::new();
    if exif.has_sensitive_data {
        findings.push(RiskFinding::new(RiskCategory::SensitiveMetadata));
    }
    if exif.gps_data.is_some() {
        findings.push(RiskFinding::new(RiskCategory::Gps));
    }
    findings
}

/// All textual metadata values, one per line, for payload scanning.
pub fn metadata_text(metadata: &MetadataMap) -> String {
    let mut lines = Vec::new();
    for field in metadata.values() {
        match field {
            MetadataField::Scalar(TagValue::Text(text)) => lines.push(text.as_str()),
            MetadataField::Group(group) => {
                lines.extend(group.values().filter_map(TagValue::as_text));
            }
            _ => {}
        }
    }
    lines.join("\n")
}
