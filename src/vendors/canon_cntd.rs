//! Canon `CNTH`/`CNDA`: a thumbnail-sized JPEG with a standard EXIF APP1
//! segment embedded in its own `uuid` container, carried as production
//! metadata rather than as a displayable preview (SPEC_FULL.md §4.7).

use crate::core::context::Context;
use crate::core::tiff::{self, TiffIfdChain};
use crate::error::{Error, Result};

const APP1_MARKER: u8 = 0xE1;
const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";

/// Locate the TIFF payload inside a JPEG's EXIF APP1 segment.
fn find_exif_tiff_slice(jpeg: &[u8]) -> Option<&[u8]> {
    if jpeg.len() < 4 || jpeg[0] != 0xFF || jpeg[1] != 0xD8 {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= jpeg.len() {
        if jpeg[pos] != 0xFF {
            // Not aligned on a marker; bail rather than guess.
            return None;
        }
        let marker = jpeg[pos + 1];
        if marker == 0xD8 || marker == 0xD9 {
            pos += 2;
            continue;
        }
        let segment_len = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        let payload_start = pos + 4;
        let payload_end = pos + 2 + segment_len;
        if payload_end > jpeg.len() {
            return None;
        }
        if marker == APP1_MARKER
            && segment_len >= 8
            && &jpeg[payload_start..payload_start + 6] == EXIF_HEADER
        {
            return Some(&jpeg[payload_start + 6..payload_end]);
        }
        if marker == 0xDA {
            // Start of scan: no more APPn segments can follow.
            return None;
        }
        pos = payload_end;
    }
    None
}

pub fn decode(data: &[u8], ctx: &mut Context) -> Result<TiffIfdChain> {
    let tiff_slice = find_exif_tiff_slice(data)
        .ok_or_else(|| Error::MalformedPayload("no EXIF APP1 segment found in CNDA JPEG".into()))?;
    tiff::decode(tiff_slice, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_tiff() -> Vec<u8> {
        let mut data = vec![b'M', b'M', 0, 42, 0, 0, 0, 8];
        data.extend_from_slice(&0u16.to_be_bytes()); // zero entries
        data.extend_from_slice(&0u32.to_be_bytes()); // next IFD
        data
    }

    fn jpeg_with_exif(tiff: &[u8]) -> Vec<u8> {
        let mut jpeg = vec![0xFF, 0xD8];
        let mut app1 = EXIF_HEADER.to_vec();
        app1.extend_from_slice(tiff);
        let segment_len = (app1.len() + 2) as u16;
        jpeg.push(0xFF);
        jpeg.push(APP1_MARKER);
        jpeg.extend_from_slice(&segment_len.to_be_bytes());
        jpeg.extend_from_slice(&app1);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    #[test]
    fn extracts_and_decodes_embedded_tiff() {
        let tiff = minimal_tiff();
        let jpeg = jpeg_with_exif(&tiff);
        let mut ctx = Context::new();
        let chain = decode(&jpeg, &mut ctx).unwrap();
        assert!(chain.ifd0.entries.is_empty());
    }

    #[test]
    fn rejects_jpeg_without_exif() {
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xD9];
        let mut ctx = Context::new();
        assert!(decode(&jpeg, &mut ctx).is_err());
    }
}
