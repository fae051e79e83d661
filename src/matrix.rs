//! Cross-sample metagene views: frame-decomposed coverage and the phase score matrix

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use crate::profile::{PositionSeries, FRAMES};
use crate::project::ProjectMetagenes;

/// One sample's coverage at the selected fragment length, split by reading frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleFrames {
    pub sample: String,
    pub phase_score: Option<f64>,
    /// Full (windowed) coverage, used for line plots
    pub coverage: PositionSeries,
    /// Frame 0, 1 and 2 subsequences of `coverage`
    pub frames: [PositionSeries; FRAMES],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameDecomposedProfile {
    pub fragment_length: u32,
    /// Every sample in the project, including those that contributed no trace
    pub sample_ids: Vec<String>,
    pub samples: Vec<SampleFrames>,
}

/// Split each sample's coverage at `fragment_length` into reading frames.
///
/// Samples without a profile at this length are skipped.
pub fn select_frame_decomposed_profile(
    project: &ProjectMetagenes,
    fragment_length: u32,
) -> FrameDecomposedProfile {
    select_frame_decomposed_profile_in(project, fragment_length, None)
}

/// As [`select_frame_decomposed_profile`], restricted to positions inside `window`
pub fn select_frame_decomposed_profile_in(
    project: &ProjectMetagenes,
    fragment_length: u32,
    window: Option<&RangeInclusive<i64>>,
) -> FrameDecomposedProfile {
    let samples: Vec<SampleFrames> = project
        .loaded()
        .filter_map(|(sample, metagene)| {
            let profile = metagene.get(fragment_length)?;
            let coverage = match window {
                Some(w) => profile.coverage.window(w),
                None => profile.coverage.clone(),
            };
            Some(SampleFrames {
                sample: sample.to_string(),
                phase_score: profile.phase_score,
                frames: coverage.split_frames(),
                coverage,
            })
        })
        .collect();

    log::debug!(
        "Fragment length {}: {} of {} samples have a profile",
        fragment_length,
        samples.len(),
        project.len()
    );

    FrameDecomposedProfile {
        fragment_length,
        sample_ids: project.sample_ids().to_vec(),
        samples,
    }
}

/// Phase scores, samples × fragment lengths
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseScoreMatrix {
    /// Row labels, descending
    pub samples: Vec<String>,
    /// Column labels, ascending
    pub fragment_lengths: Vec<u32>,
    /// `values[row][col]`; `None` where the sample has no score at that length
    pub values: Vec<Vec<Option<f64>>>,
}

impl PhaseScoreMatrix {
    #[cfg(test)]
    pub fn get(&self, sample: &str, fragment_length: u32) -> Option<Option<f64>> {
        let row = self.samples.iter().position(|s| s == sample)?;
        let col = self.fragment_lengths.iter().position(|l| *l == fragment_length)?;
        Some(self.values[row][col])
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.samples.len(), self.fragment_lengths.len())
    }
}

/// Result of building the phase score matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "matrix", rename_all = "snake_case")]
pub enum PhaseScoreOutcome {
    Matrix(PhaseScoreMatrix),
    /// Nothing to draw: no rows, no columns, or every cell null
    NoData,
}

impl PhaseScoreOutcome {
    pub fn matrix(&self) -> Option<&PhaseScoreMatrix> {
        match self {
            PhaseScoreOutcome::Matrix(m) => Some(m),
            PhaseScoreOutcome::NoData => None,
        }
    }
}

/// Pivot per-sample phase scores into a samples × fragment lengths matrix.
///
/// 1. Each loaded sample contributes a column of phase scores keyed by fragment length.
/// 2. Columns are outer-joined on fragment length (union of keys, gaps are null),
///    ascending by fragment length.
/// 3. The joined table is transposed to samples × fragment lengths and rows are
///    sorted by sample identifier, descending.
pub fn build_phase_score_matrix(project: &ProjectMetagenes) -> PhaseScoreOutcome {
    // 1. per-sample columns
    let columns: Vec<(&str, BTreeMap<u32, Option<f64>>)> = project
        .loaded()
        .map(|(sample, metagene)| (sample, metagene.phase_scores()))
        .collect();

    // 2. outer join on fragment length
    let index: Vec<u32> = columns
        .iter()
        .flat_map(|(_, column)| column.keys().copied())
        .collect::<BTreeSet<u32>>()
        .into_iter()
        .collect();
    let joined: Vec<Vec<Option<f64>>> = index
        .iter()
        .map(|length| {
            columns
                .iter()
                .map(|(_, column)| column.get(length).copied().flatten())
                .collect()
        })
        .collect();

    // 3. transpose, then order rows by sample descending
    let mut rows: Vec<(&str, Vec<Option<f64>>)> = columns
        .iter()
        .enumerate()
        .map(|(col, (sample, _))| (*sample, joined.iter().map(|row| row[col]).collect()))
        .collect();
    rows.sort_by(|a, b| b.0.cmp(a.0));

    let has_value = rows.iter().any(|(_, values)| values.iter().any(Option::is_some));
    if rows.is_empty() || index.is_empty() || !has_value {
        log::info!("No phase scores to show for {} samples", project.len());
        return PhaseScoreOutcome::NoData;
    }

    let (samples, values): (Vec<String>, Vec<Vec<Option<f64>>>) = rows
        .into_iter()
        .map(|(sample, values)| (sample.to_string(), values))
        .unzip();

    PhaseScoreOutcome::Matrix(PhaseScoreMatrix {
        samples,
        fragment_lengths: index,
        values,
    })
}
