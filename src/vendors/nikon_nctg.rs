//! Nikon NCTG: a flat, always-big-endian typed tag stream (`manufacturer/nikon/nctg.go`
//! of the original implementation this crate's metadata model is distilled
//! from — `ProcessNCTG`'s main decode loop, minus its struct-field reflection
//! since this crate reports tags as a flat list rather than populating a
//! fixed Go struct).
//!
//! Each record is `{id: u32 BE, type: u16 BE, count: u16 BE, data: [u8; count * type_size]}`.

use crate::error::{Error, Result};
use serde::Serialize;

const RECORD_HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct NctgTag {
    pub id: u32,
    pub name: String,
    pub value: serde_json::Value,
}

fn type_size(type_id: u16) -> Option<usize> {
    match type_id {
        1 | 2 | 6 | 7 => Some(1),
        3 | 8 => Some(2),
        4 | 9 | 11 => Some(4),
        5 | 10 | 12 => Some(8),
        _ => None,
    }
}

fn tag_name(id: u32) -> Option<&'static str> {
    Some(match id {
        0x01 => "Make",
        0x02 => "Model",
        0x11 => "CreateDate",
        0x12 => "WhiteBalance",
        0x13 => "ISO",
        0x16 => "FrameRate",
        0x110829a => "ExposureTime",
        0x2000023 => "PictureControlData",
        0x20000b7 => "AFInfo2",
        _ => return None,
    })
}

fn decode_value(type_id: u16, count: u16, bytes: &[u8]) -> serde_json::Value {
    let count = count as usize;
    match type_id {
        2 => serde_json::json!(String::from_utf8_lossy(bytes).trim_end_matches('\0')),
        1 | 7 => serde_json::json!(bytes),
        6 => serde_json::json!(bytes.iter().map(|b| *b as i8).collect::<Vec<_>>()),
        3 => serde_json::json!((0..count)
            .map(|i| u16::from_be_bytes([bytes[i * 2], bytes[i * 2 + 1]]))
            .collect::<Vec<_>>()),
        8 => serde_json::json!((0..count)
            .map(|i| i16::from_be_bytes([bytes[i * 2], bytes[i * 2 + 1]]))
            .collect::<Vec<_>>()),
        4 => serde_json::json!((0..count)
            .map(|i| u32::from_be_bytes(bytes[i * 4..i * 4 + 4].try_into().unwrap()))
            .collect::<Vec<_>>()),
        9 => serde_json::json!((0..count)
            .map(|i| i32::from_be_bytes(bytes[i * 4..i * 4 + 4].try_into().unwrap()))
            .collect::<Vec<_>>()),
        5 => serde_json::json!((0..count)
            .map(|i| {
                let n = u32::from_be_bytes(bytes[i * 8..i * 8 + 4].try_into().unwrap());
                let d = u32::from_be_bytes(bytes[i * 8 + 4..i * 8 + 8].try_into().unwrap());
                n as f64 / d as f64
            })
            .collect::<Vec<_>>()),
        10 => serde_json::json!((0..count)
            .map(|i| {
                let n = i32::from_be_bytes(bytes[i * 8..i * 8 + 4].try_into().unwrap());
                let d = i32::from_be_bytes(bytes[i * 8 + 4..i * 8 + 8].try_into().unwrap());
                n as f64 / d as f64
            })
            .collect::<Vec<_>>()),
        _ => serde_json::json!(bytes),
    }
}

pub fn decode(data: &[u8]) -> Result<Vec<NctgTag>> {
    let mut tags = Vec::new();
    let mut pos = 0usize;

    while pos + RECORD_HEADER_LEN <= data.len() {
        let id = u32::from_be_bytes(data[pos..pos + 4].try_into().unwrap());
        let type_id = u16::from_be_bytes(data[pos + 4..pos + 6].try_into().unwrap());
        let count = u16::from_be_bytes(data[pos + 6..pos + 8].try_into().unwrap());
        pos += RECORD_HEADER_LEN;

        let Some(elem_size) = type_size(type_id) else {
            break;
        };
        let byte_len = elem_size * count as usize;
        if pos + byte_len > data.len() {
            return Err(Error::UnexpectedEof("NCTG tag data"));
        }
        let value = decode_value(type_id, count, &data[pos..pos + byte_len]);
        pos += byte_len;

        let name = tag_name(id)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Unknown_{id:#x}"));
        tags.push(NctgTag { id, name, value });
    }

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ascii_and_short_records() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x01u32.to_be_bytes());
        data.extend_from_slice(&2u16.to_be_bytes()); // ASCII
        data.extend_from_slice(&6u16.to_be_bytes()); // "Nikon\0"
        data.extend_from_slice(b"Nikon\0");

        data.extend_from_slice(&0x16u32.to_be_bytes());
        data.extend_from_slice(&3u16.to_be_bytes()); // SHORT
        data.extend_from_slice(&1u16.to_be_bytes());
        data.extend_from_slice(&60u16.to_be_bytes());

        let tags = decode(&data).unwrap();
        assert_eq!(tags[0].name, "Make");
        assert_eq!(tags[0].value, serde_json::json!("Nikon"));
        assert_eq!(tags[1].name, "FrameRate");
        assert_eq!(tags[1].value, serde_json::json!([60]));
    }
}
