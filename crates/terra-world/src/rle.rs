//! Run-length encoding of chunk voxels in flattening order.
//!
//! A run sequence is maximal: no two neighbouring runs carry the same value
//! and no run is empty. Every encoder in this module keeps that invariant.

use terra_core::constants::CHUNK_SIZE3D;
use terra_core::types::MaterialId;

/// A maximal span of identical voxels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub value: MaterialId,
    pub length: u32,
}

impl Run {
    pub fn new(value: MaterialId, length: u32) -> Self {
        Self { value, length }
    }
}

/// Append-only run builder that merges with the previous run on equal values.
#[derive(Debug, Clone, Default)]
pub struct RunEncoder {
    runs: Vec<Run>,
    total: u32,
}

impl RunEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            runs: Vec::with_capacity(capacity),
            total: 0,
        }
    }

    /// Append `length` voxels of `value`. Zero-length pushes are ignored.
    pub fn push(&mut self, value: MaterialId, length: u32) {
        if length == 0 {
            return;
        }
        self.total += length;
        match self.runs.last_mut() {
            Some(last) if last.value == value => last.length += length,
            _ => self.runs.push(Run::new(value, length)),
        }
    }

    /// Total voxels appended so far.
    pub fn total_length(&self) -> u32 {
        self.total
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn finish(self) -> Vec<Run> {
        self.runs
    }
}

/// Encode a dense voxel buffer in one pass.
pub fn encode(voxels: &[MaterialId]) -> Vec<Run> {
    let mut encoder = RunEncoder::new();
    for &value in voxels {
        encoder.push(value, 1);
    }
    encoder.finish()
}

/// Expand runs back into a dense buffer.
pub fn decode(runs: &[Run]) -> Vec<MaterialId> {
    let mut voxels = Vec::with_capacity(total_length(runs) as usize);
    for run in runs {
        voxels.extend(std::iter::repeat(run.value).take(run.length as usize));
    }
    voxels
}

/// Sum of all run lengths.
pub fn total_length(runs: &[Run]) -> u32 {
    runs.iter().map(|r| r.length).sum()
}

/// Whether `runs` is a valid chunk encoding: maximal, non-empty runs
/// covering exactly one chunk.
pub fn is_canonical(runs: &[Run]) -> bool {
    let no_empty = runs.iter().all(|r| r.length > 0);
    let maximal = runs.windows(2).all(|w| w[0].value != w[1].value);
    no_empty && maximal && total_length(runs) == CHUNK_SIZE3D
}

/// Value at linear voxel `index`, walking the runs.
pub fn value_at(runs: &[Run], index: usize) -> Option<MaterialId> {
    let mut remaining = index as u64;
    for run in runs {
        if remaining < run.length as u64 {
            return Some(run.value);
        }
        remaining -= run.length as u64;
    }
    None
}
