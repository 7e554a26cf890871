//! Registry entries: which box types exist, whether they contain children,
//! which header variant they use, and how their payload bytes decode.

use crate::core::context::{Context, Manufacturer};
use crate::core::registry::{HeaderVariant, Registry, RegistryEntry};
use crate::core::schema::{self, FieldDescriptor, FieldKind, LengthPolicy, StringMode};
use crate::error::Result;
use crate::ftyp;
use crate::metadata::{fourcc_from_u32, BoxType, Payload, StscEntry};
use crate::vendors::{canon_cntd, fujifilm_mvtg, nikon_nctg, panasonic_clipmain, sony_nrtmd, sony_videoprofile};
use indexmap::IndexMap;
use std::io::Cursor;

/// Sony's Video Profile `uuid` extension (`PROF…`); not part of the public
/// ISO BMFF registry, so a concrete 16-byte value is pinned here.
pub const SONY_VIDEO_PROFILE_UUID: [u8; 16] = [
    0x50, 0x52, 0x4f, 0x46, 0x21, 0xd2, 0x4f, 0xce, 0xbb, 0x88, 0x69, 0x5c, 0xfa, 0xc9, 0xc7, 0x40,
];

/// Canon's `uuid` wrapper around the `CNTH`/`CNDA` thumbnail-metadata pair.
pub const CANON_THUMBNAIL_UUID: [u8; 16] = [
    0x85, 0xc0, 0xb6, 0x87, 0x82, 0x0f, 0x11, 0xe0, 0x81, 0x11, 0xf4, 0xce, 0x46, 0x2b, 0x6a, 0x48,
];

/// The QuickTime `Exif` extension `uuid`, wrapping a top-level TIFF/EXIF
/// block outside of any `stbl`/sample-description track.
pub const EXIF_UUID: [u8; 16] = [
    0x05, 0x7f, 0x87, 0x4f, 0xf8, 0x69, 0x4c, 0x7e, 0x8a, 0x7d, 0xd9, 0x51, 0xd9, 0xa9, 0xc4, 0x7f,
];

fn fourcc(code: &[u8; 4]) -> BoxType {
    BoxType::FourCc(*code)
}

fn decode_fields(
    payload: &[u8],
    version: Option<u8>,
    descriptors: &[FieldDescriptor],
) -> Result<IndexMap<String, serde_json::Value>> {
    let mut cursor = Cursor::new(payload);
    let mut reader = crate::core::cursor::BoundedReader::new(&mut cursor, payload.len() as u64);
    let fields = schema::unmarshal(&mut reader, descriptors, version)?;
    Ok(fields
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_json()))
        .collect())
}

fn decode_ftyp(payload: &[u8], _version: Option<u8>, ctx: &mut Context) -> Result<Payload> {
    let descriptors = [
        FieldDescriptor {
            name: "major_brand",
            kind: FieldKind::UInt { size_bits: 32 },
            version: None,
        },
        FieldDescriptor {
            name: "minor_version",
            kind: FieldKind::UInt { size_bits: 32 },
            version: None,
        },
        FieldDescriptor {
            name: "compatible_brands",
            kind: FieldKind::UIntArray {
                element_size_bits: 32,
                length: LengthPolicy::UnlimitedToEnd,
            },
            version: None,
        },
    ];
    let fields = decode_fields(payload, None, &descriptors)?;
    if let Some(major_brand) = fields.get("major_brand").and_then(|v| v.as_u64()) {
        let brand = fourcc_from_u32(major_brand as u32);
        ctx.set_manufacturer_if_unset(ftyp::manufacturer_for_brand(&brand));
    }
    Ok(Payload::Generic(fields))
}

fn decode_mvhd(payload: &[u8], version: Option<u8>, _ctx: &mut Context) -> Result<Payload> {
    let descriptors = [
        FieldDescriptor {
            name: "creation_time",
            kind: FieldKind::UInt { size_bits: 32 },
            version: Some(0),
        },
        FieldDescriptor {
            name: "modification_time",
            kind: FieldKind::UInt { size_bits: 32 },
            version: Some(0),
        },
        FieldDescriptor {
            name: "timescale",
            kind: FieldKind::UInt { size_bits: 32 },
            version: Some(0),
        },
        FieldDescriptor {
            name: "duration",
            kind: FieldKind::UInt { size_bits: 32 },
            version: Some(0),
        },
        FieldDescriptor {
            name: "creation_time",
            kind: FieldKind::UInt { size_bits: 64 },
            version: Some(1),
        },
        FieldDescriptor {
            name: "modification_time",
            kind: FieldKind::UInt { size_bits: 64 },
            version: Some(1),
        },
        FieldDescriptor {
            name: "timescale",
            kind: FieldKind::UInt { size_bits: 32 },
            version: Some(1),
        },
        FieldDescriptor {
            name: "duration",
            kind: FieldKind::UInt { size_bits: 64 },
            version: Some(1),
        },
        FieldDescriptor {
            name: "rate",
            kind: FieldKind::UInt { size_bits: 32 },
            version: None,
        },
    ];
    Ok(Payload::Generic(decode_fields(payload, version, &descriptors)?))
}

fn decode_hdlr(payload: &[u8], version: Option<u8>, _ctx: &mut Context) -> Result<Payload> {
    let descriptors = [
        FieldDescriptor {
            name: "pre_defined",
            kind: FieldKind::UInt { size_bits: 32 },
            version: None,
        },
        FieldDescriptor {
            name: "handler_type",
            kind: FieldKind::UInt { size_bits: 32 },
            version: None,
        },
        FieldDescriptor {
            name: "reserved",
            kind: FieldKind::Bytes(LengthPolicy::Fixed(12)),
            version: None,
        },
        FieldDescriptor {
            name: "name",
            kind: FieldKind::NulTerminatedString(StringMode::Ascii),
            version: None,
        },
    ];
    let mut fields = decode_fields(payload, version, &descriptors)?;
    if let Some(handler_type) = fields.get("handler_type").and_then(|v| v.as_u64()) {
        fields.insert(
            "handler_type_fourcc".to_string(),
            serde_json::json!(fourcc_from_u32(handler_type as u32)),
        );
    }
    Ok(Payload::Generic(fields))
}

fn sample_count_field(fields: &schema::DecodedFields) -> Result<usize> {
    Ok(fields["entry_count"].as_u64().unwrap_or(0) as usize)
}

fn decode_stsc(payload: &[u8], version: Option<u8>, _ctx: &mut Context) -> Result<Payload> {
    let mut cursor = Cursor::new(payload);
    let mut reader = crate::core::cursor::BoundedReader::new(&mut cursor, payload.len() as u64);
    let count_desc = [FieldDescriptor {
        name: "entry_count",
        kind: FieldKind::UInt { size_bits: 32 },
        version: None,
    }];
    let header = schema::unmarshal(&mut reader, &count_desc, version)?;
    let entry_count = header["entry_count"].as_u64().unwrap_or(0);

    let mut entries = Vec::with_capacity(entry_count as usize);
    for _ in 0..entry_count {
        entries.push(StscEntry {
            first_chunk: reader.read_u32_be()?,
            samples_per_chunk: reader.read_u32_be()?,
            sample_description_index: reader.read_u32_be()?,
        });
    }
    Ok(Payload::SampleToChunk(entries))
}

fn decode_stsz(payload: &[u8], version: Option<u8>, _ctx: &mut Context) -> Result<Payload> {
    let descriptors = [
        FieldDescriptor {
            name: "sample_size",
            kind: FieldKind::UInt { size_bits: 32 },
            version: None,
        },
        FieldDescriptor {
            name: "entry_count",
            kind: FieldKind::UInt { size_bits: 32 },
            version: None,
        },
        FieldDescriptor {
            name: "entry_sizes",
            kind: FieldKind::UIntArray {
                element_size_bits: 32,
                length: LengthPolicy::Dynamic(sample_count_field),
            },
            version: None,
        },
    ];
    let mut cursor = Cursor::new(payload);
    let mut reader = crate::core::cursor::BoundedReader::new(&mut cursor, payload.len() as u64);
    let fields = schema::unmarshal(&mut reader, &descriptors, version)?;

    let uniform_size = fields["sample_size"].as_u64().unwrap_or(0) as u32;
    let entry_count = fields["entry_count"].as_u64().unwrap_or(0) as usize;
    let sizes = if uniform_size != 0 {
        vec![uniform_size; entry_count]
    } else {
        fields["entry_sizes"]
            .as_array()
            .map(|a| a.iter().map(|v| *v as u32).collect())
            .unwrap_or_default()
    };
    Ok(Payload::SampleSizes(sizes))
}

fn decode_stco(payload: &[u8], version: Option<u8>, _ctx: &mut Context) -> Result<Payload> {
    let descriptors = [
        FieldDescriptor {
            name: "entry_count",
            kind: FieldKind::UInt { size_bits: 32 },
            version: None,
        },
        FieldDescriptor {
            name: "chunk_offsets",
            kind: FieldKind::UIntArray {
                element_size_bits: 32,
                length: LengthPolicy::Dynamic(sample_count_field),
            },
            version: None,
        },
    ];
    let offsets = decode_fields(payload, version, &descriptors)?;
    let chunk_offsets = offsets["chunk_offsets"]
        .as_array()
        .map(|arr| arr.iter().filter_map(|v| v.as_u64()).collect())
        .unwrap_or_default();
    Ok(Payload::ChunkOffsets(chunk_offsets))
}

fn decode_keys(payload: &[u8], _version: Option<u8>, ctx: &mut Context) -> Result<Payload> {
    if payload.len() < 4 {
        return Ok(Payload::Generic(IndexMap::new()));
    }
    let entry_count = u32::from_be_bytes(payload[0..4].try_into().unwrap());
    let mut pos = 4usize;
    let mut keys = Vec::new();
    for _ in 0..entry_count {
        if pos + 8 > payload.len() {
            break;
        }
        let key_size = u32::from_be_bytes(payload[pos..pos + 4].try_into().unwrap()) as usize;
        if key_size < 8 || pos + key_size > payload.len() {
            break;
        }
        let namespace = String::from_utf8_lossy(&payload[pos + 4..pos + 8]).into_owned();
        let value = String::from_utf8_lossy(&payload[pos + 8..pos + key_size]).into_owned();
        keys.push(format!("{namespace}.{value}"));
        pos += key_size;
    }
    ctx.quicktime_keys_entry_count = Some(entry_count);
    ctx.quicktime_keys = keys.clone();

    let fields = keys
        .into_iter()
        .enumerate()
        .map(|(i, k)| (format!("key_{}", i + 1), serde_json::json!(k)))
        .collect();
    Ok(Payload::Generic(fields))
}

fn decode_ilst(payload: &[u8], _version: Option<u8>, ctx: &mut Context) -> Result<Payload> {
    let mut out = IndexMap::new();
    let mut pos = 0usize;
    while pos + 8 <= payload.len() {
        let item_size = u32::from_be_bytes(payload[pos..pos + 4].try_into().unwrap()) as usize;
        let key_index = u32::from_be_bytes(payload[pos + 4..pos + 8].try_into().unwrap()) as usize;
        if item_size < 8 || pos + item_size > payload.len() {
            break;
        }
        let item_body = &payload[pos + 8..pos + item_size];
        if item_body.len() >= 16 && &item_body[4..8] == b"data" {
            let value_bytes = &item_body[16..];
            let value = String::from_utf8_lossy(value_bytes).into_owned();
            let key_name = ctx
                .quicktime_keys
                .get(key_index.saturating_sub(1))
                .cloned()
                .unwrap_or_else(|| format!("index_{key_index}"));
            out.insert(key_name, serde_json::json!(value));
        }
        pos += item_size;
    }
    Ok(Payload::Generic(out))
}

fn decode_xml(payload: &[u8], _version: Option<u8>, ctx: &mut Context) -> Result<Payload> {
    let text = String::from_utf8_lossy(payload);
    Ok(match ctx.manufacturer {
        Some(Manufacturer::Sony) => Payload::SonyNonRealTimeMeta(sony_nrtmd::NonRealTimeMeta::parse(&text)?),
        Some(Manufacturer::Panasonic) => {
            Payload::PanasonicClipMain(panasonic_clipmain::ClipMain::parse(&text)?)
        }
        _ => Payload::Opaque(payload.to_vec()),
    })
}

fn decode_pana(payload: &[u8], _version: Option<u8>, ctx: &mut Context) -> Result<Payload> {
    ctx.set_manufacturer_if_unset(Manufacturer::Panasonic);
    let text = String::from_utf8_lossy(payload);
    Ok(Payload::PanasonicClipMain(panasonic_clipmain::ClipMain::parse(&text)?))
}

fn decode_mvtg(payload: &[u8], _version: Option<u8>, ctx: &mut Context) -> Result<Payload> {
    ctx.set_manufacturer_if_unset(Manufacturer::Fujifilm);
    Ok(Payload::Tiff(fujifilm_mvtg::decode(payload)?))
}

fn decode_nctg(payload: &[u8], _version: Option<u8>, ctx: &mut Context) -> Result<Payload> {
    ctx.set_manufacturer_if_unset(Manufacturer::Nikon);
    Ok(Payload::NikonNctg(nikon_nctg::decode(payload)?))
}

fn decode_cnda(payload: &[u8], _version: Option<u8>, ctx: &mut Context) -> Result<Payload> {
    ctx.set_manufacturer_if_unset(Manufacturer::Canon);
    Ok(Payload::Tiff(canon_cntd::decode(payload, ctx)?))
}

fn decode_cnth(payload: &[u8], _version: Option<u8>, ctx: &mut Context) -> Result<Payload> {
    ctx.set_manufacturer_if_unset(Manufacturer::Canon);
    Ok(Payload::Opaque(payload.to_vec()))
}

fn decode_sony_profile(payload: &[u8], _version: Option<u8>, ctx: &mut Context) -> Result<Payload> {
    ctx.set_manufacturer_if_unset(Manufacturer::Sony);
    Ok(Payload::SonyVideoProfile(sony_videoprofile::decode(payload)?))
}

fn decode_exif_uuid(payload: &[u8], _version: Option<u8>, ctx: &mut Context) -> Result<Payload> {
    Ok(Payload::Tiff(crate::core::tiff::decode(payload, ctx)?))
}

fn container(box_type: BoxType, header: HeaderVariant) -> (BoxType, RegistryEntry) {
    (
        box_type,
        RegistryEntry {
            is_container: true,
            header,
            decode: None,
            accepted_versions: None,
        },
    )
}

fn leaf(box_type: BoxType, header: HeaderVariant, decode: crate::core::registry::PayloadDecoder) -> (BoxType, RegistryEntry) {
    (
        box_type,
        RegistryEntry {
            is_container: false,
            header,
            decode: Some(decode),
            accepted_versions: None,
        },
    )
}

/// Like [`leaf`], but restricts the full-box versions the walker will
/// accept before calling `decode`.
fn leaf_versioned(
    box_type: BoxType,
    header: HeaderVariant,
    decode: crate::core::registry::PayloadDecoder,
    accepted_versions: &'static [u8],
) -> (BoxType, RegistryEntry) {
    (
        box_type,
        RegistryEntry {
            is_container: false,
            header,
            decode: Some(decode),
            accepted_versions: Some(accepted_versions),
        },
    )
}

pub fn register_all(registry: &mut Registry) {
    let containers = [
        container(fourcc(b"moov"), HeaderVariant::Classic),
        container(fourcc(b"trak"), HeaderVariant::Classic),
        container(fourcc(b"mdia"), HeaderVariant::Classic),
        container(fourcc(b"minf"), HeaderVariant::Classic),
        container(fourcc(b"stbl"), HeaderVariant::Classic),
        container(fourcc(b"udta"), HeaderVariant::Classic),
        container(fourcc(b"meta"), HeaderVariant::Full),
        container(fourcc(b"NCDT"), HeaderVariant::Classic),
        container(BoxType::Uuid(CANON_THUMBNAIL_UUID), HeaderVariant::Classic),
    ];
    for (box_type, entry) in containers {
        registry.register(box_type, entry);
    }

    let leaves: Vec<(BoxType, RegistryEntry)> = vec![
        leaf(fourcc(b"ftyp"), HeaderVariant::Classic, decode_ftyp),
        leaf_versioned(fourcc(b"mvhd"), HeaderVariant::Full, decode_mvhd, &[0, 1]),
        leaf(fourcc(b"hdlr"), HeaderVariant::Full, decode_hdlr),
        leaf(fourcc(b"keys"), HeaderVariant::Full, decode_keys),
        leaf(fourcc(b"ilst"), HeaderVariant::Classic, decode_ilst),
        leaf(fourcc(b"xml "), HeaderVariant::Full, decode_xml),
        leaf(fourcc(b"stsc"), HeaderVariant::Full, decode_stsc),
        leaf(fourcc(b"stsz"), HeaderVariant::Full, decode_stsz),
        leaf(fourcc(b"stco"), HeaderVariant::Full, decode_stco),
        leaf(fourcc(b"PANA"), HeaderVariant::Classic, decode_pana),
        leaf(fourcc(b"MVTG"), HeaderVariant::Classic, decode_mvtg),
        leaf(fourcc(b"NCTG"), HeaderVariant::Classic, decode_nctg),
        leaf(fourcc(b"CNTH"), HeaderVariant::Classic, decode_cnth),
        leaf(fourcc(b"CNDA"), HeaderVariant::Classic, decode_cnda),
        leaf(
            BoxType::Uuid(SONY_VIDEO_PROFILE_UUID),
            HeaderVariant::Full,
            decode_sony_profile,
        ),
        leaf(BoxType::Uuid(EXIF_UUID), HeaderVariant::Classic, decode_exif_uuid),
    ];
    for (box_type, entry) in leaves {
        registry.register(box_type, entry);
    }
}
