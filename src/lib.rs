//! Metadata decoder for camera production container files: ISO BMFF /
//! QuickTime box trees, embedded TIFF/EXIF and MakerNote blocks, vendor XML
//! sidecars, and the SMPTE RP 210 raw-metadata-track (RTMD) stream some Sony
//! XAVC files carry alongside picture data.
//!
//! See `DESIGN.md` for the grounding ledger behind each module.

pub mod boxes;
pub mod core;
pub mod error;
pub mod ftyp;
pub mod maker;
pub mod metadata;
pub mod rtmd;
pub mod tables;
pub mod vendors;

use crate::core::context::{Context, Manufacturer};
use crate::core::cursor::BoundedReader;
use crate::core::registry::Registry;
use crate::error::Result;
use crate::metadata::{BoxType, FileStructure, Payload};
use crate::rtmd::reader::RtmdReader;
use crate::rtmd::sampletable::{resolve_all, SampleLocation};
use std::io::{Read, Seek, SeekFrom};

/// Parse a whole container file's box tree, inferring manufacturer along the
/// way from `ftyp`'s major brand and any vendor-specific boxes encountered.
pub fn parse_file<R: Read + Seek>(source: &mut R) -> Result<FileStructure> {
    let file_len = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(0))?;

    let registry = Registry::standard();
    let mut ctx = Context::new();
    let mut reader = BoundedReader::new(source, file_len);
    let root = crate::core::boxwalker::walk(&mut reader, &registry, &mut ctx)?;

    let ftyp_node = root
        .iter()
        .find(|n| n.info.box_type == BoxType::FourCc(*b"ftyp"));
    let (major_brand, compatible_brands) = match ftyp_node.map(|n| &n.payload) {
        Some(Payload::Generic(fields)) => {
            let major_brand = fields
                .get("major_brand")
                .and_then(|v| v.as_u64())
                .map(|v| metadata::fourcc_from_u32(v as u32));
            let compatible_brands = fields
                .get("compatible_brands")
                .and_then(|v| v.as_array())
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_u64())
                        .map(|v| metadata::fourcc_from_u32(v as u32))
                        .collect()
                })
                .unwrap_or_default();
            (major_brand, compatible_brands)
        }
        _ => (None, Vec::new()),
    };

    Ok(FileStructure {
        major_brand,
        compatible_brands,
        manufacturer: ctx.manufacturer.unwrap_or(Manufacturer::Unknown),
        root,
    })
}

/// Resolve the raw-metadata-track's per-sample byte locations inside `mdat`
/// from a parsed file's `stsc`/`stsz`/`stco` triple, so an [`RtmdReader`] can
/// be built over the same source without re-walking the box tree.
pub fn resolve_rtmd_samples(structure: &FileStructure) -> Result<Vec<SampleLocation>> {
    let stsc = match structure.find(b"stsc").map(|n| &n.payload) {
        Some(Payload::SampleToChunk(entries)) => entries.as_slice(),
        _ => &[],
    };
    let stsz = match structure.find(b"stsz").map(|n| &n.payload) {
        Some(Payload::SampleSizes(sizes)) => sizes.as_slice(),
        _ => &[],
    };
    let stco = match structure.find(b"stco").map(|n| &n.payload) {
        Some(Payload::ChunkOffsets(offsets)) => offsets.as_slice(),
        _ => &[],
    };
    resolve_all(stsc, stsz, stco)
}

/// Build a random-access [`RtmdReader`] over `source`, using the sample
/// locations resolved from `structure`'s sample tables.
pub fn open_rtmd_reader<'a, R: Read + Seek>(
    source: &'a mut R,
    structure: &FileStructure,
) -> Result<RtmdReader<'a, R>> {
    let locations = resolve_rtmd_samples(structure)?;
    Ok(RtmdReader::new(source, locations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn minimal_ftyp() -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(b"XAVC");
        payload.extend_from_slice(&0u32.to_be_bytes());
        payload.extend_from_slice(b"isom");

        let mut data = Vec::new();
        let total = 8 + payload.len() as u32;
        data.extend_from_slice(&total.to_be_bytes());
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(&payload);
        data
    }

    #[test]
    fn parses_ftyp_and_infers_manufacturer() {
        let data = minimal_ftyp();
        let mut cursor = Cursor::new(data);
        let structure = parse_file(&mut cursor).unwrap();
        assert_eq!(structure.major_brand.as_deref(), Some("XAVC"));
        assert_eq!(structure.manufacturer, Manufacturer::Sony);
        assert_eq!(structure.compatible_brands, vec!["isom".to_string()]);
    }
}
