//! Seekable byte-source primitives shared by the box walker and sample-table resolver.
//!
//! The box walker, TIFF decoder and RTMD decoder are all strictly sequential
//! readers over one seekable source (see SPEC_FULL.md §5); this module is the
//! single place that turns `Read + Seek` into the small vocabulary of reads
//! those decoders actually need.

use crate::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

/// A forward reader bounded to `[start, end)` of an underlying seekable source.
pub struct BoundedReader<'a, R: Read + Seek> {
    inner: &'a mut R,
    end: u64,
}

impl<'a, R: Read + Seek> BoundedReader<'a, R> {
    pub fn new(inner: &'a mut R, end: u64) -> Self {
        BoundedReader { inner, end }
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn remaining(&mut self) -> Result<u64> {
        let pos = self.position()?;
        Ok(self.end.saturating_sub(pos))
    }

    pub fn seek_to(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn skip(&mut self, amount: i64) -> Result<()> {
        self.inner.seek(SeekFrom::Current(amount))?;
        Ok(())
    }

    fn ensure_available(&mut self, n: u64, what: &'static str) -> Result<()> {
        if self.remaining()? < n {
            return Err(Error::UnexpectedEof(what));
        }
        Ok(())
    }

    pub fn read_exact_vec(&mut self, n: usize, what: &'static str) -> Result<Vec<u8>> {
        self.ensure_available(n as u64, what)?;
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure_available(1, "u8")?;
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.ensure_available(2, "u16")?;
        let mut buf = [0u8; 2];
        self.inner.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.ensure_available(4, "u32")?;
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_u64_be(&mut self) -> Result<u64> {
        self.ensure_available(8, "u64")?;
        let mut buf = [0u8; 8];
        self.inner.read_exact(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    /// Reborrow the underlying reader with a narrower declared end, for
    /// recursing into one box's children without giving up the outer bound.
    pub fn sub_reader(&mut self, end: u64) -> BoundedReader<'_, R> {
        BoundedReader {
            inner: &mut *self.inner,
            end,
        }
    }
}

/// Read the whole `[offset, offset+len)` span of a seekable source into memory.
///
/// The TIFF decoder needs its slice held contiguously so that inline-offset
/// cross references inside the IFD chain resolve against absolute positions
/// (SPEC_FULL.md §5, "Memory discipline").
pub fn read_span<R: Read + Seek>(reader: &mut R, offset: u64, len: u64) -> Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn bounded_reader_rejects_reads_past_declared_end() {
        let mut data = Cursor::new(vec![1u8, 2, 3, 4, 5, 6]);
        let mut r = BoundedReader::new(&mut data, 4);
        assert_eq!(r.read_u32_be().unwrap(), 0x01020304);
        assert!(r.read_u8().is_err());
    }

    #[test]
    fn read_span_reads_exact_slice() {
        let mut data = Cursor::new(vec![0u8, 1, 2, 3, 4, 5, 6, 7]);
        let span = read_span(&mut data, 2, 3).unwrap();
        assert_eq!(span, vec![2, 3, 4]);
    }
}
