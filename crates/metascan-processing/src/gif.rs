//! Minimal GIF block walker
//!
//! Splits a GIF stream into its top-level blocks without decoding any image
//! data, so comment and application extensions can be read or dropped.

use std::ops::Range;

const EXTENSION_INTRODUCER: u8 = 0x21;
const IMAGE_SEPARATOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;

const COMMENT_LABEL: u8 = 0xFE;
const APPLICATION_LABEL: u8 = 0xFF;

/// Application extension that carries the animation loop count.
pub const NETSCAPE_APP_ID: &[u8] = b"NETSCAPE2.0";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GifError {
    #[error("Not a GIF stream")]
    BadSignature,

    #[error("GIF stream truncated at offset {0}")]
    Truncated(usize),

    #[error("Unexpected GIF block 0x{byte:02x} at offset {offset}")]
    UnexpectedBlock { byte: u8, offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GifBlockKind {
    Comment(Vec<u8>),
    Application { identifier: Vec<u8> },
    OtherExtension(u8),
    Image,
}

#[derive(Debug, Clone)]
pub struct GifBlock {
    pub kind: GifBlockKind,
    pub range: Range<usize>,
}

/// Top-level layout of a GIF stream.
#[derive(Debug, Clone)]
pub struct GifLayout {
    /// Header, logical screen descriptor and global color table.
    pub preamble: Range<usize>,
    pub blocks: Vec<GifBlock>,
    /// Trailer byte and anything after it.
    pub trailer: Range<usize>,
}

fn color_table_len(packed: u8) -> usize {
    if packed & 0x80 != 0 {
        3 * (1usize << ((packed & 0x07) + 1))
    } else {
        0
    }
}

/// Skip a chain of data sub-blocks starting at `pos`, returning the offset
/// just past the block terminator and the concatenated payload.
fn read_sub_blocks(data: &[u8], mut pos: usize) -> Result<(usize, Vec<u8>), GifError> {
    let mut payload = Vec::new();
    loop {
        let len = *data.get(pos).ok_or(GifError::Truncated(pos))? as usize;
        pos += 1;
        if len == 0 {
            return Ok((pos, payload));
        }
        let chunk = data.get(pos..pos + len).ok_or(GifError::Truncated(pos))?;
        payload.extend_from_slice(chunk);
        pos += len;
    }
}

pub fn parse_gif(data: &[u8]) -> Result<GifLayout, GifError> {
    if !(data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a")) {
        return Err(GifError::BadSignature);
    }
    let packed = *data.get(10).ok_or(GifError::Truncated(10))?;
    let preamble_end = 13 + color_table_len(packed);
    if data.len() < preamble_end {
        return Err(GifError::Truncated(data.len()));
    }

    let mut blocks = Vec::new();
    let mut pos = preamble_end;
    loop {
        let start = pos;
        let byte = *data.get(pos).ok_or(GifError::Truncated(pos))?;
        match byte {
            TRAILER => {
                return Ok(GifLayout {
                    preamble: 0..preamble_end,
                    blocks,
                    trailer: pos..data.len(),
                });
            }
            EXTENSION_INTRODUCER => {
                let label = *data.get(pos + 1).ok_or(GifError::Truncated(pos + 1))?;
                let (end, payload) = read_sub_blocks(data, pos + 2)?;
                let kind = match label {
                    COMMENT_LABEL => GifBlockKind::Comment(payload),
                    APPLICATION_LABEL => GifBlockKind::Application {
                        identifier: payload.iter().take(11).copied().collect(),
                    },
                    other => GifBlockKind::OtherExtension(other),
                };
                blocks.push(GifBlock {
                    kind,
                    range: start..end,
                });
                pos = end;
            }
            IMAGE_SEPARATOR => {
                let packed = *data.get(pos + 9).ok_or(GifError::Truncated(pos + 9))?;
                // descriptor (10) + local color table + LZW minimum code size (1)
                let data_start = pos + 10 + color_table_len(packed) + 1;
                let (end, _) = read_sub_blocks(data, data_start)?;
                blocks.push(GifBlock {
                    kind: GifBlockKind::Image,
                    range: start..end,
                });
                pos = end;
            }
            other => {
                return Err(GifError::UnexpectedBlock {
                    byte: other,
                    offset: pos,
                })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 1x1 GIF89a with a comment extension and a NETSCAPE loop extension.
    pub(crate) fn gif_with_comment(comment: &[u8]) -> Vec<u8> {
        let mut gif = Vec::new();
        gif.extend_from_slice(b"GIF89a");
        gif.extend_from_slice(&[1, 0, 1, 0, 0x80, 0, 0]); // 2-entry global color table
        gif.extend_from_slice(&[0, 0, 0, 255, 255, 255]);
        gif.extend_from_slice(&[0x21, 0xFF, 11]);
        gif.extend_from_slice(NETSCAPE_APP_ID);
        gif.extend_from_slice(&[3, 1, 0, 0, 0]);
        gif.extend_from_slice(&[0x21, 0xFE, comment.len() as u8]);
        gif.extend_from_slice(comment);
        gif.push(0);
        gif.extend_from_slice(&[0x2C, 0, 0, 0, 0, 1, 0, 1, 0, 0]);
        gif.extend_from_slice(&[2, 2, 0x4C, 0x01, 0]);
        gif.push(TRAILER);
        gif
    }

    #[test]
    fn test_parse_gif_finds_blocks() {
        let gif = gif_with_comment(b"hello");
        let layout = parse_gif(&gif).unwrap();
        assert_eq!(layout.preamble, 0..19);
        assert_eq!(layout.blocks.len(), 3);
        assert_eq!(
            layout.blocks[0].kind,
            GifBlockKind::Application {
                identifier: NETSCAPE_APP_ID.to_vec()
            }
        );
        assert_eq!(layout.blocks[1].kind, GifBlockKind::Comment(b"hello".to_vec()));
        assert_eq!(layout.blocks[2].kind, GifBlockKind::Image);
        assert_eq!(layout.trailer, gif.len() - 1..gif.len());
    }

    #[test]
    fn test_parse_gif_truncated() {
        let gif = gif_with_comment(b"hello");
        assert!(matches!(
            parse_gif(&gif[..gif.len() - 4]),
            Err(GifError::Truncated(_))
        ));
        assert!(matches!(parse_gif(b"PNG"), Err(GifError::BadSignature)));
    }
}
