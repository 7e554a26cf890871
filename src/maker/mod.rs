//! MakerNote dialect dispatch.
//!
//! The source this is modeled on (`maker/mod.rs`) defines a `MakerNoteParser`
//! trait and a `Manufacturer::from_make()`/`parser()` dispatch pair covering
//! two dozen vendors. This crate only needs the three dialects that appear in
//! the production-camera container formats it targets, so the dispatch
//! surface is narrowed accordingly (SPEC_FULL.md §4.4).

pub mod canon;
pub mod fujifilm;
pub mod panasonic;

use crate::core::context::Manufacturer;
use crate::core::endian::Endian;
use crate::error::Result;
use indexmap::IndexMap;

pub trait MakerNoteParser {
    fn parse(&self, data: &[u8], endian: Endian) -> Result<IndexMap<String, serde_json::Value>>;
}

/// Identify the MakerNote dialect from the blob's own signature bytes,
/// falling back to Canon (which has no signature of its own) only when the
/// container's declared manufacturer is already known to be Canon.
///
/// Grounded in `exif/read.go:49-62`: the Panasonic/Fujifilm checks come
/// first and look at the MakerNote blob itself, not the TIFF `Make` tag.
pub fn dispatch(data: &[u8], container_manufacturer: Option<Manufacturer>) -> Option<Manufacturer> {
    if data.len() >= 9 && &data[..9] == b"Panasonic" {
        Some(Manufacturer::Panasonic)
    } else if data.len() >= 8 && &data[..8] == b"FUJIFILM" {
        Some(Manufacturer::Fujifilm)
    } else if container_manufacturer == Some(Manufacturer::Canon) {
        Some(Manufacturer::Canon)
    } else {
        None
    }
}

/// Decode a MakerNote blob against the dialect implied by `vendor`. Returns
/// `None` when the vendor has no registered MakerNote dialect (the blob is
/// then left undecoded, per SPEC_FULL.md §7's recoverable-skip policy).
pub fn decode(
    vendor: Manufacturer,
    data: &[u8],
    endian: Endian,
) -> Option<Result<IndexMap<String, serde_json::Value>>> {
    match vendor {
        Manufacturer::Canon => Some(canon::CanonMakerNoteParser.parse(data, endian)),
        Manufacturer::Panasonic => Some(panasonic::PanasonicMakerNoteParser.parse(data, endian)),
        Manufacturer::Fujifilm => Some(fujifilm::FujifilmMakerNoteParser.parse(data, endian)),
        _ => None,
    }
}
