//! Fujifilm MakerNote dialect: an 8-byte `"FUJIFILM"` signature, a 4-byte
//! little-endian offset to the IFD (relative to the start of the maker note
//! blob, not to the signature), then a flat little-endian IFD whose own
//! internal offsets are also relative to the blob start regardless of the
//! enclosing EXIF's byte order.

use super::MakerNoteParser;
use crate::core::endian::Endian;
use crate::core::tiff::parse_flat_ifd;
use crate::error::{Error, Result};
use crate::tables::fujifilm_tags;
use indexmap::IndexMap;

const SIGNATURE: &[u8; 8] = b"FUJIFILM";

pub struct FujifilmMakerNoteParser;

impl MakerNoteParser for FujifilmMakerNoteParser {
    fn parse(&self, data: &[u8], _endian: Endian) -> Result<IndexMap<String, serde_json::Value>> {
        if data.len() < 12 || &data[..SIGNATURE.len()] != SIGNATURE {
            return Err(Error::MalformedPayload(
                "Fujifilm MakerNote missing signature".to_string(),
            ));
        }
        let ifd_offset = u32::from_le_bytes(data[8..12].try_into().unwrap());
        let ifd = parse_flat_ifd(data, Endian::Little, ifd_offset)?;

        let mut out = IndexMap::new();
        for entry in &ifd.entries {
            let name = fujifilm_tags::tag_name(entry.tag)
                .map(str::to_owned)
                .unwrap_or_else(|| format!("Unknown_{:#06x}", entry.tag));
            out.insert(name, entry.value.to_json());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_tag_via_relative_ifd_offset() {
        let mut blob = SIGNATURE.to_vec();
        blob.extend_from_slice(&12u32.to_le_bytes()); // IFD offset

        blob.extend_from_slice(&1u16.to_le_bytes()); // one entry
        blob.extend_from_slice(&0x1000u16.to_le_bytes()); // Quality
        blob.extend_from_slice(&3u16.to_le_bytes()); // SHORT
        blob.extend_from_slice(&1u32.to_le_bytes()); // count
        blob.extend_from_slice(&5u16.to_le_bytes());
        blob.extend_from_slice(&[0, 0]);
        blob.extend_from_slice(&0u32.to_le_bytes()); // next IFD

        let parsed = FujifilmMakerNoteParser.parse(&blob, Endian::Big).unwrap();
        assert_eq!(parsed["Quality"], 5);
    }
}
