//! Frame-indexed random-access reader over a raw-metadata-track's samples.

use super::sampletable::{collapse_runs, SampleLocation};
use super::{decode_frame, RTMDFrame};
use crate::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

pub struct RtmdReader<'a, R: Read + Seek> {
    inner: &'a mut R,
    locations: Vec<SampleLocation>,
}

impl<'a, R: Read + Seek> RtmdReader<'a, R> {
    pub fn new(inner: &'a mut R, locations: Vec<SampleLocation>) -> Self {
        RtmdReader { inner, locations }
    }

    pub fn frame_count(&self) -> usize {
        self.locations.len()
    }

    pub fn read_frame(&mut self, index: usize) -> Result<RTMDFrame> {
        let location = *self
            .locations
            .get(index)
            .ok_or_else(|| Error::MalformedContainer(format!("no RTMD sample at index {index}")))?;
        let bytes = self.read_span(location)?;
        decode_frame(&bytes)
    }

    /// Read `count` consecutive frames starting at `start`, collapsing
    /// byte-adjacent samples into single reads where possible.
    pub fn read_range(&mut self, start: usize, count: usize) -> Result<Vec<RTMDFrame>> {
        let end = start
            .checked_add(count)
            .ok_or_else(|| Error::MalformedContainer("RTMD range overflow".to_string()))?;
        let slice = self
            .locations
            .get(start..end)
            .ok_or_else(|| Error::MalformedContainer(format!("RTMD range {start}..{end} out of bounds")))?
            .to_vec();

        let spans = collapse_runs(&slice);
        let mut span_bytes = Vec::with_capacity(spans.len());
        for span in &spans {
            span_bytes.push(self.read_span(*span)?);
        }

        let mut frames = Vec::with_capacity(slice.len());
        let mut span_index = 0;
        let mut span_cursor = 0usize;
        for location in &slice {
            while span_cursor + location.len as usize > span_bytes[span_index].len() {
                span_index += 1;
                span_cursor = 0;
            }
            let bytes =
                &span_bytes[span_index][span_cursor..span_cursor + location.len as usize];
            frames.push(decode_frame(bytes)?);
            span_cursor += location.len as usize;
        }
        Ok(frames)
    }

    fn read_span(&mut self, location: SampleLocation) -> Result<Vec<u8>> {
        self.inner.seek(SeekFrom::Start(location.offset))?;
        let mut buf = vec![0u8; location.len as usize];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn minimal_frame(hour: u8) -> Vec<u8> {
        let mut data = vec![0u8; super::super::FRAME_HEADER_LEN];
        data[13] = hour;
        data
    }

    #[test]
    fn reads_single_frame_by_index() {
        let frame_bytes = minimal_frame(5);
        let mut backing = Cursor::new(frame_bytes.clone());
        let locations = vec![SampleLocation {
            offset: 0,
            len: frame_bytes.len() as u64,
        }];
        let mut reader = RtmdReader::new(&mut backing, locations);
        let frame = reader.read_frame(0).unwrap();
        assert_eq!(frame.timecode.unwrap().hour, 5);
    }

    #[test]
    fn reads_contiguous_range_via_collapsed_spans() {
        let mut backing_bytes = minimal_frame(1);
        backing_bytes.extend(minimal_frame(2));
        let len = super::super::FRAME_HEADER_LEN as u64;
        let mut backing = Cursor::new(backing_bytes);
        let locations = vec![
            SampleLocation { offset: 0, len },
            SampleLocation { offset: len, len },
        ];
        let mut reader = RtmdReader::new(&mut backing, locations);
        let frames = reader.read_range(0, 2).unwrap();
        assert_eq!(frames[0].timecode.unwrap().hour, 1);
        assert_eq!(frames[1].timecode.unwrap().hour, 2);
    }
}
