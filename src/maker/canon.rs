//! Canon MakerNote dialect: a raw IFD with no vendor signature, dispatched
//! purely because the enclosing container's manufacturer is already known
//! to be Canon (`exif/read.go:49-62`).

use super::MakerNoteParser;
use crate::core::endian::Endian;
use crate::core::tiff::{parse_flat_ifd, TiffValue};
use crate::error::Result;
use crate::tables::canon_tags;
use indexmap::IndexMap;

pub struct CanonMakerNoteParser;

impl MakerNoteParser for CanonMakerNoteParser {
    fn parse(&self, data: &[u8], endian: Endian) -> Result<IndexMap<String, serde_json::Value>> {
        // Some bodies append an 8-byte trailer (serial number + checksum)
        // after the IFD; it carries no tag data and is simply not reached by
        // the IFD's own entry count, so no special handling is needed beyond
        // not requiring the blob length to match a directory exactly.
        // Canon MakerNote offsets are relative to the start of the maker
        // note blob itself, so the flat IFD is parsed directly against it
        // rather than against a synthetic file-level header.
        let ifd = parse_flat_ifd(data, endian, 0)?;

        let mut out = IndexMap::new();
        for entry in &ifd.entries {
            let Some(name) = canon_tags::top_level_tag_name(entry.tag) else {
                continue;
            };
            let value = match (entry.tag, &entry.value) {
                (canon_tags::TAG_CAMERA_SETTINGS, TiffValue::Short(values)) => {
                    serde_json::json!(canon_tags::decode_indexed_array(
                        values,
                        canon_tags::camera_settings_field
                    ))
                }
                (canon_tags::TAG_SHOT_INFO, TiffValue::Short(values)) => {
                    serde_json::json!(canon_tags::decode_indexed_array(
                        values,
                        canon_tags::shot_info_field
                    ))
                }
                (canon_tags::TAG_PROCESSING_INFO, TiffValue::Short(values)) => {
                    serde_json::json!(canon_tags::decode_indexed_array(
                        values,
                        canon_tags::processing_info_field
                    ))
                }
                (canon_tags::TAG_LOG_INFO, TiffValue::Short(values)) => {
                    serde_json::json!(canon_tags::decode_indexed_array(
                        values,
                        canon_tags::log_info_field
                    ))
                }
                (_, value) => value.to_json(),
            };
            out.insert(name.to_string(), value);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camera_settings_sub_table() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&1u16.to_le_bytes()); // one entry
        blob.extend_from_slice(&canon_tags::TAG_CAMERA_SETTINGS.to_le_bytes());
        blob.extend_from_slice(&3u16.to_le_bytes()); // SHORT
        blob.extend_from_slice(&2u32.to_le_bytes()); // count = 2, fits inline
        blob.extend_from_slice(&1u16.to_le_bytes()); // index 1: MacroMode = 1
        blob.extend_from_slice(&0u16.to_le_bytes()); // index 2: SelfTimer = 0
        blob.extend_from_slice(&0u32.to_le_bytes()); // next IFD

        let parsed = CanonMakerNoteParser.parse(&blob, Endian::Little).unwrap();
        let settings = &parsed["CameraSettings"];
        assert_eq!(settings["MacroMode"], 1);
        assert_eq!(settings["SelfTimer"], 0);
    }
}
