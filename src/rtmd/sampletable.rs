//! Sample-table resolution: turn `stsc`/`stsz`/`stco` into byte offsets of
//! arbitrary raw-metadata-track samples inside `mdat` (SPEC_FULL.md §4.6).

use crate::error::{Error, Result};
use crate::metadata::StscEntry;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleLocation {
    pub offset: u64,
    pub len: u64,
}

/// Resolve every sample's `(offset, len)` from the chunk-to-sample map, the
/// per-sample size table, and the chunk offset table. Handles both uniform
/// (`samples_per_chunk` constant) and variable-samples-per-chunk layouts.
pub fn resolve_all(stsc: &[StscEntry], stsz: &[u32], stco: &[u64]) -> Result<Vec<SampleLocation>> {
    if stsc.is_empty() {
        return Ok(Vec::new());
    }

    let mut locations = Vec::with_capacity(stsz.len());
    let mut sample_index = 0usize;

    for chunk_number in 1..=stco.len() as u32 {
        let samples_per_chunk = samples_per_chunk_for(stsc, chunk_number)?;
        let Some(&chunk_offset) = stco.get((chunk_number - 1) as usize) else {
            return Err(Error::MalformedContainer(format!(
                "stco missing entry for chunk {chunk_number}"
            )));
        };

        let mut cursor = chunk_offset;
        for _ in 0..samples_per_chunk {
            let Some(&size) = stsz.get(sample_index) else {
                return Err(Error::MalformedContainer(format!(
                    "stsz has fewer entries than stsc/stco imply at sample {sample_index}"
                )));
            };
            locations.push(SampleLocation {
                offset: cursor,
                len: size as u64,
            });
            cursor += size as u64;
            sample_index += 1;
        }
    }

    Ok(locations)
}

fn samples_per_chunk_for(stsc: &[StscEntry], chunk_number: u32) -> Result<u32> {
    let mut applicable = None;
    for entry in stsc {
        if entry.first_chunk <= chunk_number {
            applicable = Some(entry);
        } else {
            break;
        }
    }
    applicable
        .map(|e| e.samples_per_chunk)
        .ok_or_else(|| Error::MalformedContainer(format!("no stsc entry covers chunk {chunk_number}")))
}

/// Merge byte-adjacent sample locations into larger spans so a range read
/// issues one I/O call per contiguous run instead of one per sample
/// (grounded in the original implementation's per-field run collapsing for
/// RTMD collections).
pub fn collapse_runs(locations: &[SampleLocation]) -> Vec<SampleLocation> {
    let mut out: Vec<SampleLocation> = Vec::new();
    for &loc in locations {
        if let Some(last) = out.last_mut() {
            if last.offset + last.len == loc.offset {
                last.len += loc.len;
                continue;
            }
        }
        out.push(loc);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_uniform_samples_per_chunk() {
        let stsc = vec![StscEntry {
            first_chunk: 1,
            samples_per_chunk: 2,
            sample_description_index: 1,
        }];
        let stsz = vec![10, 10, 10, 10];
        let stco = vec![100, 200];

        let locations = resolve_all(&stsc, &stsz, &stco).unwrap();
        assert_eq!(locations.len(), 4);
        assert_eq!(locations[0], SampleLocation { offset: 100, len: 10 });
        assert_eq!(locations[1], SampleLocation { offset: 110, len: 10 });
        assert_eq!(locations[2], SampleLocation { offset: 200, len: 10 });
    }

    #[test]
    fn resolves_variable_samples_per_chunk() {
        let stsc = vec![
            StscEntry {
                first_chunk: 1,
                samples_per_chunk: 1,
                sample_description_index: 1,
            },
            StscEntry {
                first_chunk: 3,
                samples_per_chunk: 2,
                sample_description_index: 1,
            },
        ];
        let stsz = vec![10, 10, 10, 10];
        let stco = vec![0, 10, 20];

        let locations = resolve_all(&stsc, &stsz, &stco).unwrap();
        assert_eq!(locations.len(), 4);
        assert_eq!(locations[2], SampleLocation { offset: 20, len: 10 });
        assert_eq!(locations[3], SampleLocation { offset: 30, len: 10 });
    }

    #[test]
    fn collapses_contiguous_runs() {
        let locations = vec![
            SampleLocation { offset: 0, len: 10 },
            SampleLocation { offset: 10, len: 10 },
            SampleLocation { offset: 50, len: 10 },
        ];
        let collapsed = collapse_runs(&locations);
        assert_eq!(
            collapsed,
            vec![
                SampleLocation { offset: 0, len: 20 },
                SampleLocation { offset: 50, len: 10 },
            ]
        );
    }
}
