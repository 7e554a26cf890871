//! Fujifilm `MVTG`: a single, headerless little-endian TIFF IFD — no `II*\0`
//! magic. The box payload opens with 16 reserved bytes before the IFD
//! proper starts; grounded on `quicktime/atom/types.go`'s `MVTG.GetMeta`
//! (`r.Seek(ai.Offset+ai.HeaderSize+16, ...)`), matched independently by
//! `internal/box/types.go`'s `MVTG` box.

use crate::core::endian::Endian;
use crate::core::tiff::{parse_flat_ifd, TiffIfdChain};
use crate::error::{Error, Result};

const RESERVED_LEN: usize = 16;

pub fn decode(data: &[u8]) -> Result<TiffIfdChain> {
    if data.len() < RESERVED_LEN {
        return Err(Error::UnexpectedEof("Fujifilm MVTG reserved header"));
    }
    let ifd0 = parse_flat_ifd(&data[RESERVED_LEN..], Endian::Little, 0)?;
    Ok(TiffIfdChain {
        ifd0,
        ifd1: None,
        exif: None,
        maker_note: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ifd_after_reserved_header() {
        let mut data = vec![0u8; RESERVED_LEN];
        data.extend_from_slice(&1u16.to_le_bytes()); // one entry
        data.extend_from_slice(&0x3803u16.to_le_bytes()); // VideoRecordingMode
        data.extend_from_slice(&3u16.to_le_bytes()); // SHORT
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(&0u32.to_le_bytes()); // next IFD

        let chain = decode(&data).unwrap();
        assert_eq!(chain.ifd0.get(0x3803).unwrap().value.as_u32(), Some(1));
    }
}
