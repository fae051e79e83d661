//! Per-sample metagene and read-length data

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Number of reading frames
pub const FRAMES: usize = 3;

/// Reading frame of a position relative to the start codon (0, 1 or 2).
///
/// Uses the non-negative modulo, so position -2 falls in frame 1.
pub fn frame_of(position: i64) -> usize {
    position.rem_euclid(FRAMES as i64) as usize
}

/// Coverage counts indexed by nucleotide position
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionSeries {
    pub positions: Vec<i64>,
    pub counts: Vec<f64>,
}

impl PositionSeries {
    /// Index a raw coverage array so that `offset_5p` lands on position 0.
    ///
    /// Positions run over `-offset_5p .. counts.len() - offset_5p`; `None` when
    /// that range does not fit in `i64`.
    pub fn from_profile(counts: Vec<f64>, offset_5p: i64) -> Option<Self> {
        let start = offset_5p.checked_neg()?;
        let len = i64::try_from(counts.len()).ok()?;
        start.checked_add(len)?;
        let positions = (0..len).map(|i| start + i).collect();
        Some(Self { positions, counts })
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.positions.iter().copied().zip(self.counts.iter().copied())
    }

    fn push(&mut self, position: i64, count: f64) {
        self.positions.push(position);
        self.counts.push(count);
    }

    /// Keep only positions inside `window`
    pub fn window(&self, window: &RangeInclusive<i64>) -> Self {
        let mut out = Self::default();
        for (position, count) in self.iter().filter(|(p, _)| window.contains(p)) {
            out.push(position, count);
        }
        out
    }

    /// Split into frame 0, 1 and 2 subsequences, keeping position order in each.
    pub fn split_frames(&self) -> [PositionSeries; FRAMES] {
        let mut frames: [PositionSeries; FRAMES] = Default::default();
        for (position, count) in self.iter() {
            frames[frame_of(position)].push(position, count);
        }
        frames
    }
}

/// One fragment length's metagene profile for one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleProfile {
    pub fragment_length: u32,
    pub offset_5p: i64,
    pub coverage: PositionSeries,
    /// Absent when the pipeline could not score this length
    pub phase_score: Option<f64>,
    pub valid_codons: Option<u64>,
}

/// All fragment-length profiles of one sample, keyed by fragment length
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleMetagene {
    pub profiles: BTreeMap<u32, SampleProfile>,
}

impl SampleMetagene {
    pub fn get(&self, fragment_length: u32) -> Option<&SampleProfile> {
        self.profiles.get(&fragment_length)
    }

    #[cfg(test)]
    pub fn fragment_lengths(&self) -> impl Iterator<Item = u32> + '_ {
        self.profiles.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// The phase score column, ascending by fragment length
    pub fn phase_scores(&self) -> BTreeMap<u32, Option<f64>> {
        self.profiles
            .iter()
            .map(|(length, profile)| (*length, profile.phase_score))
            .collect()
    }
}

/// Read counts per fragment length, ascending
pub type ReadLengthDistribution = BTreeMap<u32, u64>;
