//! Public tree types: the decoded shape of one container file.
//!
//! Mirrors `BoxInfo`/`BoxNode`/`FileStructure` from SPEC_FULL.md §3. `Payload`
//! is a closed tagged union over every box type this crate understands, plus
//! an `Opaque` carry-through for boxes whose bytes are kept but not decoded
//! and an `Unsupported` marker for box types the registry has never heard of
//! (SPEC_FULL.md §7: unsupported box types are a recoverable skip, not an
//! error).

use crate::core::context::Manufacturer;
use crate::core::tiff::TiffIfdChain;
use crate::rtmd::sampletable::SampleLocation;
use crate::vendors::nikon_nctg::NctgTag;
use crate::vendors::panasonic_clipmain::ClipMain;
use crate::vendors::sony_nrtmd::NonRealTimeMeta;
use crate::vendors::sony_videoprofile::VideoProfile;
use indexmap::IndexMap;
use serde::Serialize;

/// A box/atom type: either a 4-character code or a 16-byte extended UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum BoxType {
    FourCc([u8; 4]),
    Uuid([u8; 16]),
}

impl BoxType {
    pub fn as_fourcc_str(&self) -> Option<String> {
        match self {
            BoxType::FourCc(code) => Some(String::from_utf8_lossy(code).into_owned()),
            BoxType::Uuid(_) => None,
        }
    }
}

/// Render a big-endian-packed four-character code back into a string, the
/// shape `ftyp`'s brand fields and compatible-brand array decode into.
pub fn fourcc_from_u32(value: u32) -> String {
    String::from_utf8_lossy(&value.to_be_bytes()).into_owned()
}

impl std::fmt::Display for BoxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoxType::FourCc(code) => write!(f, "{}", String::from_utf8_lossy(code)),
            BoxType::Uuid(bytes) => {
                write!(f, "uuid(")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Positional and header metadata for one box, independent of its decoded content.
#[derive(Debug, Clone, Serialize)]
pub struct BoxInfo {
    pub box_type: BoxType,
    /// Absolute file offset of the box header's first byte.
    pub offset: u64,
    /// Size in bytes of the header (classic or full-box, including any 64-bit
    /// extended size field and 16-byte UUID extension).
    pub header_len: u32,
    /// Size in bytes of the payload, excluding the header.
    pub payload_len: u64,
    /// `version`/`flags` for boxes using the full-box header variant.
    pub version: Option<u8>,
    pub flags: Option<u32>,
}

impl BoxInfo {
    pub fn payload_end(&self) -> u64 {
        self.offset + self.header_len as u64 + self.payload_len
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StscEntry {
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    pub sample_description_index: u32,
}

/// A reference to the raw-metadata-track sample area inside `mdat`, resolved
/// against the sibling `stbl` rather than loaded eagerly (SPEC_FULL.md §5).
#[derive(Debug, Clone, Serialize)]
pub struct MdatRef {
    pub offset: u64,
    pub len: u64,
}

#[derive(Debug, Clone, Serialize)]
pub enum Payload {
    /// Pure container: all information is in `BoxNode::children`.
    None,
    /// A flat set of fields decoded by the declarative schema engine.
    Generic(IndexMap<String, serde_json::Value>),
    /// A decoded TIFF/EXIF IFD chain (top-level EXIF, or an embedded
    /// MakerNote/Canon-CNDA/Fujifilm-MVTG TIFF structure).
    Tiff(TiffIfdChain),
    SampleToChunk(Vec<StscEntry>),
    SampleSizes(Vec<u32>),
    ChunkOffsets(Vec<u64>),
    Mdat(MdatRef),
    SonyNonRealTimeMeta(NonRealTimeMeta),
    PanasonicClipMain(ClipMain),
    NikonNctg(Vec<NctgTag>),
    SonyVideoProfile(VideoProfile),
    /// Bytes retained verbatim because no decoder exists for this box's content
    /// even though its type is registered (e.g. a still-undecoded sub-box).
    Opaque(Vec<u8>),
    /// Box type not present in the registry at all. Its bytes are left
    /// unread (SPEC_FULL.md §7: an unsupported box is a recoverable skip,
    /// not an error); `BoxInfo::offset`/`payload_len` are enough to re-read
    /// it from the source file if ever needed.
    Unsupported,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxNode {
    pub info: BoxInfo,
    pub payload: Payload,
    pub children: Vec<BoxNode>,
}

/// The decoded shape of one container file plus the ambient facts (brand,
/// manufacturer) needed to interpret it.
#[derive(Debug, Clone, Serialize)]
pub struct FileStructure {
    pub major_brand: Option<String>,
    pub compatible_brands: Vec<String>,
    pub manufacturer: Manufacturer,
    pub root: Vec<BoxNode>,
}

impl FileStructure {
    /// Depth-first search for the first box of the given four-character code.
    pub fn find(&self, fourcc: &[u8; 4]) -> Option<&BoxNode> {
        fn walk<'a>(nodes: &'a [BoxNode], fourcc: &[u8; 4]) -> Option<&'a BoxNode> {
            for n in nodes {
                if n.info.box_type == BoxType::FourCc(*fourcc) {
                    return Some(n);
                }
                if let Some(found) = walk(&n.children, fourcc) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.root, fourcc)
    }

    /// Depth-first search for every box of the given four-character code.
    pub fn find_all(&self, fourcc: &[u8; 4]) -> Vec<&BoxNode> {
        fn walk<'a>(nodes: &'a [BoxNode], fourcc: &[u8; 4], out: &mut Vec<&'a BoxNode>) {
            for n in nodes {
                if n.info.box_type == BoxType::FourCc(*fourcc) {
                    out.push(n);
                }
                walk(&n.children, fourcc, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.root, fourcc, &mut out);
        out
    }
}

/// One resolved byte range of a raw-metadata-track sample, as produced by
/// [`crate::rtmd::sampletable`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResolvedSample {
    pub sample_index: u32,
    pub location: SampleLocation,
}
