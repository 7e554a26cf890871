//! Sony Video Profile `uuid` box (`PROF…C9C7-40`, full-box).
//!
//! After the full-box version/flags word (stripped by the box walker before
//! this decoder runs) the payload holds 16 reserved bytes, a feature-entry
//! count, then that many variable-length `{size u32, code [u8; 4],
//! data[size-8]}` items. Only the item coded `"VPRF"` is interpreted here:
//! its body is a big-endian `u32` word array where word index 5 is the
//! average video bitrate and word index 10 packs two `u16`s forming the
//! pixel aspect ratio. Grounded in `mp4/box/types.go:147-188`.

use crate::error::{Error, Result};
use serde::Serialize;

const RESERVED_LEN: usize = 16;
const ITEM_HEADER_LEN: usize = 8;
const VPRF_CODE: &[u8; 4] = b"VPRF";

#[derive(Debug, Clone, Serialize)]
pub struct VideoProfile {
    pub video_avg_bitrate: Option<u32>,
    pub pixel_aspect_ratio: Option<(u16, u16)>,
}

pub fn decode(data: &[u8]) -> Result<VideoProfile> {
    if data.len() < RESERVED_LEN + 4 {
        return Err(Error::UnexpectedEof("Sony video profile header"));
    }
    let mut pos = RESERVED_LEN;
    let feature_entries =
        u32::from_be_bytes(data[pos..pos + 4].try_into().unwrap()) as usize;
    pos += 4;

    let mut video_avg_bitrate = None;
    let mut pixel_aspect_ratio = None;

    for _ in 0..feature_entries {
        if pos + ITEM_HEADER_LEN > data.len() {
            break;
        }
        let size = u32::from_be_bytes(data[pos..pos + 4].try_into().unwrap()) as usize;
        let code: [u8; 4] = data[pos + 4..pos + 8].try_into().unwrap();
        if size < ITEM_HEADER_LEN || pos + size > data.len() {
            return Err(Error::MalformedPayload(
                "Sony video profile feature item overruns box".to_string(),
            ));
        }
        let body = &data[pos + ITEM_HEADER_LEN..pos + size];

        if &code == VPRF_CODE {
            for (i, word) in body.chunks_exact(4).enumerate() {
                if i == 5 {
                    video_avg_bitrate = Some(u32::from_be_bytes(word.try_into().unwrap()));
                } else if i == 10 {
                    let par_x = u16::from_be_bytes([word[0], word[1]]);
                    let par_y = u16::from_be_bytes([word[2], word[3]]);
                    pixel_aspect_ratio = Some((par_x, par_y));
                }
            }
        }

        pos += size;
    }

    Ok(VideoProfile {
        video_avg_bitrate,
        pixel_aspect_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vprf_item(words: &[u32]) -> Vec<u8> {
        let mut item = Vec::new();
        let size = (ITEM_HEADER_LEN + words.len() * 4) as u32;
        item.extend_from_slice(&size.to_be_bytes());
        item.extend_from_slice(VPRF_CODE);
        for w in words {
            item.extend_from_slice(&w.to_be_bytes());
        }
        item
    }

    #[test]
    fn extracts_bitrate_and_pixel_aspect_ratio_from_vprf_item() {
        let mut words = vec![0u32; 11];
        words[5] = 25_000_000;
        words[10] = (1u32 << 16) | 1u32; // par_x=1, par_y=1 packed big-endian

        let mut data = vec![0u8; RESERVED_LEN];
        data.extend_from_slice(&1u32.to_be_bytes()); // feature_entries
        data.extend_from_slice(&vprf_item(&words));

        let profile = decode(&data).unwrap();
        assert_eq!(profile.video_avg_bitrate, Some(25_000_000));
        assert_eq!(profile.pixel_aspect_ratio, Some((1, 1)));
    }

    #[test]
    fn ignores_items_other_than_vprf() {
        let mut item = Vec::new();
        item.extend_from_slice(&12u32.to_be_bytes());
        item.extend_from_slice(b"AUDP");
        item.extend_from_slice(&[0u8; 4]);

        let mut data = vec![0u8; RESERVED_LEN];
        data.extend_from_slice(&1u32.to_be_bytes());
        data.extend_from_slice(&item);

        let profile = decode(&data).unwrap();
        assert_eq!(profile.video_avg_bitrate, None);
        assert_eq!(profile.pixel_aspect_ratio, None);
    }
}
