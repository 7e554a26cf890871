//! End-to-end scenario: a synthetic Sony XAVC `.mp4` whose `stbl` sample
//! tables describe one raw-metadata-track sample living inside `mdat`,
//! decoded first as a box tree and then as an RTMD frame via the sample
//! table resolved from that tree.

use camera_metadata_core::core::context::Manufacturer;
use camera_metadata_core::metadata::Payload;
use camera_metadata_core::{open_rtmd_reader, parse_file};
use std::io::Cursor;

fn fullbox(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut body = vec![0u8, 0, 0, 0]; // version 0, flags 0
    body.extend_from_slice(payload);
    wrap(fourcc, &body)
}

fn wrap(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut b = Vec::new();
    let total = 8 + payload.len() as u32;
    b.extend_from_slice(&total.to_be_bytes());
    b.extend_from_slice(fourcc);
    b.extend_from_slice(payload);
    b
}

fn concat(boxes: &[Vec<u8>]) -> Vec<u8> {
    boxes.iter().flat_map(|b| b.iter().copied()).collect()
}

fn rtmd_frame_with_no_sets() -> Vec<u8> {
    let mut frame = vec![0u8; 28];
    frame[13] = 10; // hour
    frame[14] = 20; // minute
    frame[15] = 30; // second
    frame[16..18].copy_from_slice(&5u16.to_be_bytes());
    frame
}

/// Assemble `ftyp` + `moov` (whose `stco` carries `chunk_offset`) + `mdat`.
/// `chunk_offset`'s value never changes any box's length, so this can be
/// called once with a placeholder to discover the true `mdat` payload
/// position, then again with the real value.
fn build_file(chunk_offset: u32, frame_bytes: &[u8]) -> Vec<u8> {
    let ftyp_payload = {
        let mut p = Vec::new();
        p.extend_from_slice(b"XAVC");
        p.extend_from_slice(&0u32.to_be_bytes());
        p.extend_from_slice(b"isom");
        p
    };
    let ftyp = wrap(b"ftyp", &ftyp_payload);

    let stsc_payload = {
        let mut p = Vec::new();
        p.extend_from_slice(&1u32.to_be_bytes()); // entry_count
        p.extend_from_slice(&1u32.to_be_bytes()); // first_chunk
        p.extend_from_slice(&1u32.to_be_bytes()); // samples_per_chunk
        p.extend_from_slice(&1u32.to_be_bytes()); // sample_description_index
        p
    };
    let stsc = fullbox(b"stsc", &stsc_payload);

    let stsz_payload = {
        let mut p = Vec::new();
        p.extend_from_slice(&0u32.to_be_bytes()); // sample_size (0 => use entry_sizes)
        p.extend_from_slice(&1u32.to_be_bytes()); // entry_count
        p.extend_from_slice(&(frame_bytes.len() as u32).to_be_bytes());
        p
    };
    let stsz = fullbox(b"stsz", &stsz_payload);

    let stco_payload = {
        let mut p = Vec::new();
        p.extend_from_slice(&1u32.to_be_bytes()); // entry_count
        p.extend_from_slice(&chunk_offset.to_be_bytes());
        p
    };
    let stco = fullbox(b"stco", &stco_payload);

    let stbl = wrap(b"stbl", &concat(&[stsc, stsz, stco]));
    let minf = wrap(b"minf", &stbl);
    let mdia = wrap(b"mdia", &minf);
    let trak = wrap(b"trak", &mdia);
    let moov = wrap(b"moov", &trak);

    let mdat = wrap(b"mdat", frame_bytes);

    let mut file = Vec::new();
    file.extend_from_slice(&ftyp);
    file.extend_from_slice(&moov);
    file.extend_from_slice(&mdat);
    file
}

#[test]
fn parses_box_tree_and_reads_rtmd_frame_via_sample_table() {
    let frame_bytes = rtmd_frame_with_no_sets();

    // First pass with a placeholder chunk offset to measure where mdat's
    // payload will actually land; the value doesn't change any box's size.
    let probe = build_file(0, &frame_bytes);
    let mdat_payload_offset = (probe.len() - frame_bytes.len()) as u32;

    let file = build_file(mdat_payload_offset, &frame_bytes);

    let mut cursor = Cursor::new(file);
    let structure = parse_file(&mut cursor).unwrap();
    assert_eq!(structure.manufacturer, Manufacturer::Sony);

    let stco_node = structure.find(b"stco").unwrap();
    let resolved_offset = match &stco_node.payload {
        Payload::ChunkOffsets(offsets) => offsets[0],
        other => panic!("expected ChunkOffsets, got {other:?}"),
    };
    assert_eq!(resolved_offset, mdat_payload_offset as u64);

    let mut reader = open_rtmd_reader(&mut cursor, &structure).unwrap();
    assert_eq!(reader.frame_count(), 1);
    let frame = reader.read_frame(0).unwrap();
    let tc = frame.timecode.unwrap();
    assert_eq!((tc.hour, tc.minute, tc.second, tc.frame), (10, 20, 30, 5));
}
