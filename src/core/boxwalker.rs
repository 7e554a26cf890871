//! Recursive ISO BMFF / QuickTime box walker (SPEC_FULL.md §4.1).
//!
//! Grounded in `core/containers/quicktime.rs`'s `read_atom_header`/
//! `find_atom`: the 32-bit-size-with-64-bit-escape header, `size == 0`
//! meaning "extends to the end of its parent", and UUID-extended box types
//! are all handled the same way here, just data-driven off the
//! [`crate::core::registry::Registry`] instead of a chain of `match` arms.

use crate::core::context::Context;
use crate::core::cursor::BoundedReader;
use crate::core::registry::{HeaderVariant, Registry};
use crate::error::{Error, Result};
use crate::metadata::{BoxInfo, BoxNode, BoxType, MdatRef, Payload};
use std::io::{Read, Seek};

const CLASSIC_HEADER_LEN: u64 = 8;

fn read_box_type(code: &[u8]) -> BoxType {
    let mut arr = [0u8; 4];
    arr.copy_from_slice(code);
    BoxType::FourCc(arr)
}

fn is_fourcc(box_type: &BoxType, code: &[u8; 4]) -> bool {
    matches!(box_type, BoxType::FourCc(c) if c == code)
}

/// Walk every box at the current nesting level, consuming `reader` up to its
/// declared end.
pub fn walk<R: Read + Seek>(
    reader: &mut BoundedReader<R>,
    registry: &Registry,
    ctx: &mut Context,
) -> Result<Vec<BoxNode>> {
    let mut nodes = Vec::new();

    while reader.remaining()? >= CLASSIC_HEADER_LEN {
        let offset = reader.position()?;
        let size32 = reader.read_u32_be()?;
        let type_bytes = reader.read_exact_vec(4, "box type")?;
        let mut header_len: u64 = CLASSIC_HEADER_LEN;

        let total_size = if size32 == 1 {
            header_len += 8;
            reader.read_u64_be()?
        } else if size32 == 0 {
            reader.end() - offset
        } else {
            size32 as u64
        };

        let box_type = if type_bytes == b"uuid" {
            let uuid_bytes = reader.read_exact_vec(16, "uuid extension")?;
            header_len += 16;
            let mut arr = [0u8; 16];
            arr.copy_from_slice(&uuid_bytes);
            BoxType::Uuid(arr)
        } else {
            read_box_type(&type_bytes)
        };

        let payload_end = offset + total_size;
        if total_size < header_len || payload_end > reader.end() {
            return Err(Error::MalformedContainer(format!(
                "box {box_type} at offset {offset} overruns its container"
            )));
        }

        if is_fourcc(&box_type, b"mdat") {
            let mdat_payload_len = total_size - header_len;
            nodes.push(BoxNode {
                info: BoxInfo {
                    box_type,
                    offset,
                    header_len: header_len as u32,
                    payload_len: mdat_payload_len,
                    version: None,
                    flags: None,
                },
                payload: Payload::Mdat(MdatRef {
                    offset: offset + header_len,
                    len: mdat_payload_len,
                }),
                children: Vec::new(),
            });
            reader.seek_to(payload_end)?;
            continue;
        }

        let registry_entry = registry.lookup(&box_type).copied();
        let is_meta = is_fourcc(&box_type, b"meta");

        // `meta` is ambiguous between the ISO BMFF full-box variant and the
        // classic QuickTime variant with no version/flags; probe the next
        // four bytes the way a zeroed version+flags word would read.
        let use_full_header = if is_meta {
            let probe = reader.read_exact_vec(4, "meta header probe")?;
            reader.skip(-4)?;
            probe == [0, 0, 0, 0]
        } else {
            matches!(
                registry_entry.map(|e| e.header),
                Some(HeaderVariant::Full)
            )
        };

        let (version, flags) = if use_full_header {
            let v = reader.read_u8()?;
            let flag_bytes = reader.read_exact_vec(3, "full box flags")?;
            let f = flag_bytes
                .iter()
                .fold(0u32, |acc, byte| (acc << 8) | *byte as u32);
            header_len += 4;

            if let Some(accepted) = registry_entry.and_then(|e| e.accepted_versions) {
                if !accepted.contains(&v) {
                    return Err(Error::UnsupportedVersion {
                        type_code: box_type.to_string(),
                        version: v,
                    });
                }
            }

            (Some(v), Some(f))
        } else {
            (None, None)
        };

        let payload_len = total_size - header_len;
        let is_container = registry_entry.map(|e| e.is_container).unwrap_or(false);

        let payload = match registry_entry {
            Some(_) if is_container => Payload::None,
            Some(entry) => match entry.decode {
                Some(decode_fn) => {
                    let bytes = reader.read_exact_vec(payload_len as usize, "box payload")?;
                    decode_fn(&bytes, version, ctx)?
                }
                None => {
                    reader.seek_to(payload_end)?;
                    Payload::None
                }
            },
            None => {
                reader.seek_to(payload_end)?;
                Payload::Unsupported
            }
        };

        let children = if is_container {
            let mut child_reader = reader.sub_reader(payload_end);
            walk(&mut child_reader, registry, ctx)?
        } else {
            Vec::new()
        };

        nodes.push(BoxNode {
            info: BoxInfo {
                box_type,
                offset,
                header_len: header_len as u32,
                payload_len,
                version,
                flags,
            },
            payload,
            children,
        });
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::{Registry, RegistryEntry};
    use std::io::Cursor;

    fn dummy_registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(
            BoxType::FourCc(*b"moov"),
            RegistryEntry {
                is_container: true,
                header: HeaderVariant::Classic,
                decode: None,
                accepted_versions: None,
            },
        );
        registry
    }

    #[test]
    fn walks_flat_sibling_boxes() {
        let mut data = Vec::new();
        data.extend_from_slice(&16u32.to_be_bytes());
        data.extend_from_slice(b"free");
        data.extend_from_slice(&[0u8; 8]);

        let mut cursor = Cursor::new(data.clone());
        let mut reader = BoundedReader::new(&mut cursor, data.len() as u64);
        let registry = dummy_registry();
        let mut ctx = Context::new();
        let nodes = walk(&mut reader, &registry, &mut ctx).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].info.payload_len, 8);
    }

    #[test]
    fn recurses_into_registered_containers() {
        let mut inner = Vec::new();
        inner.extend_from_slice(&8u32.to_be_bytes());
        inner.extend_from_slice(b"free");

        let mut data = Vec::new();
        let total = 8 + inner.len() as u32;
        data.extend_from_slice(&total.to_be_bytes());
        data.extend_from_slice(b"moov");
        data.extend_from_slice(&inner);

        let mut cursor = Cursor::new(data.clone());
        let mut reader = BoundedReader::new(&mut cursor, data.len() as u64);
        let registry = dummy_registry();
        let mut ctx = Context::new();
        let nodes = walk(&mut reader, &registry, &mut ctx).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].children.len(), 1);
    }

    #[test]
    fn mdat_is_not_read_into_memory() {
        let mut data = Vec::new();
        data.extend_from_slice(&16u32.to_be_bytes());
        data.extend_from_slice(b"mdat");
        data.extend_from_slice(&[0xABu8; 8]);

        let mut cursor = Cursor::new(data.clone());
        let mut reader = BoundedReader::new(&mut cursor, data.len() as u64);
        let registry = dummy_registry();
        let mut ctx = Context::new();
        let nodes = walk(&mut reader, &registry, &mut ctx).unwrap();
        match &nodes[0].payload {
            Payload::Mdat(mdat_ref) => {
                assert_eq!(mdat_ref.offset, 8);
                assert_eq!(mdat_ref.len, 8);
            }
            other => panic!("expected Mdat payload, got {other:?}"),
        }
    }
}
