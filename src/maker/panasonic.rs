//! Panasonic MakerNote dialect: a 12-byte `"Panasonic\0\0\0"` signature
//! followed by a flat IFD whose internal offsets are relative to the byte
//! right after that signature (grounded in `maker/panasonic.rs` of the
//! example this module is modeled on).

use super::MakerNoteParser;
use crate::core::endian::Endian;
use crate::core::tiff::parse_flat_ifd;
use crate::error::{Error, Result};
use crate::tables::panasonic_tags;
use indexmap::IndexMap;

const SIGNATURE: &[u8; 12] = b"Panasonic\0\0\0";

pub struct PanasonicMakerNoteParser;

impl MakerNoteParser for PanasonicMakerNoteParser {
    fn parse(&self, data: &[u8], endian: Endian) -> Result<IndexMap<String, serde_json::Value>> {
        if data.len() < SIGNATURE.len() || &data[..SIGNATURE.len()] != SIGNATURE {
            return Err(Error::MalformedPayload(
                "Panasonic MakerNote missing signature".to_string(),
            ));
        }
        let ifd_data = &data[SIGNATURE.len()..];
        let ifd = parse_flat_ifd(ifd_data, endian, 0)?;

        let mut out = IndexMap::new();
        for entry in &ifd.entries {
            let name = panasonic_tags::tag_name(entry.tag)
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
    fn rejects_missing_signature() {
        let blob = vec![0u8; 20];
        assert!(PanasonicMakerNoteParser.parse(&blob, Endian::Little).is_err());
    }

    #[test]
    fn decodes_tag_after_signature() {
        let mut blob = SIGNATURE.to_vec();
        blob.extend_from_slice(&1u16.to_le_bytes()); // one entry
        blob.extend_from_slice(&0x0001u16.to_le_bytes()); // ImageQuality
        blob.extend_from_slice(&3u16.to_le_bytes()); // SHORT
        blob.extend_from_slice(&1u32.to_le_bytes()); // count
        blob.extend_from_slice(&2u16.to_le_bytes());
        blob.extend_from_slice(&[0, 0]); // pad inline field to 4 bytes
        blob.extend_from_slice(&0u32.to_le_bytes()); // next IFD

        let parsed = PanasonicMakerNoteParser.parse(&blob, Endian::Little).unwrap();
        assert_eq!(parsed["ImageQuality"], 2);
    }
}
