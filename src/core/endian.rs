//! Byte order handling shared by the box walker, the TIFF/EXIF decoder and RTMD.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    /// Detect endianness from the two-byte TIFF byte-order marker (`II` or `MM`).
    pub fn from_tiff_marker(marker: &[u8]) -> Option<Self> {
        match marker {
            b"II" => Some(Endian::Little),
            b"MM" => Some(Endian::Big),
            _ => None,
        }
    }

    pub fn read_u16(&self, data: &[u8]) -> u16 {
        match self {
            Endian::Little => LittleEndian::read_u16(data),
            Endian::Big => BigEndian::read_u16(data),
        }
    }

    pub fn read_u32(&self, data: &[u8]) -> u32 {
        match self {
            Endian::Little => LittleEndian::read_u32(data),
            Endian::Big => BigEndian::read_u32(data),
        }
    }

    pub fn read_i16(&self, data: &[u8]) -> i16 {
        match self {
            Endian::Little => LittleEndian::read_i16(data),
            Endian::Big => BigEndian::read_i16(data),
        }
    }

    pub fn read_i32(&self, data: &[u8]) -> i32 {
        match self {
            Endian::Little => LittleEndian::read_i32(data),
            Endian::Big => BigEndian::read_i32(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_intel_and_motorola_markers() {
        assert_eq!(Endian::from_tiff_marker(b"II"), Some(Endian::Little));
        assert_eq!(Endian::from_tiff_marker(b"MM"), Some(Endian::Big));
        assert_eq!(Endian::from_tiff_marker(b"XX"), None);
    }

    #[test]
    fn reads_scalars_in_declared_order() {
        let le = Endian::Little;
        let be = Endian::Big;
        assert_eq!(le.read_u16(&[0x01, 0x02]), 0x0201);
        assert_eq!(be.read_u16(&[0x01, 0x02]), 0x0102);
        assert_eq!(le.read_i32(&[0xff, 0xff, 0xff, 0xff]), -1);
    }
}
