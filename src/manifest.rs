//! Project manifest (one row per sequencing run) and its per-sample file pointers

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{read_text, Result, RibopodError};

/// Column holding the sample identifier
pub const SAMPLE_COLUMN: &str = "experiment_accession";

/// Cells pandas writes for a missing value
const MISSING_MARKERS: [&str; 6] = ["", "NA", "nan", "NaN", "null", "None"];

/// Per-sample output files referenced by the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    OrfTable,
    Metagene5p,
    Metagene3p,
    BamSummary,
    Protocol,
}

impl Pointer {
    pub const ALL: [Pointer; 5] = [
        Pointer::OrfTable,
        Pointer::Metagene5p,
        Pointer::Metagene3p,
        Pointer::BamSummary,
        Pointer::Protocol,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Pointer::OrfTable => "ribotricer_orfs",
            Pointer::Metagene5p => "ribotricer_metagene_5p",
            Pointer::Metagene3p => "ribotricer_metagene_3p",
            Pointer::BamSummary => "ribotricer_bam_summary",
            Pointer::Protocol => "ribotricer_protocol",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// One sample with whichever output files exist for it
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub sample_id: String,
    pointers: [Option<PathBuf>; 5],
}

impl SampleRow {
    pub fn pointer(&self, pointer: Pointer) -> Option<&Path> {
        self.pointers[pointer.index()].as_deref()
    }
}

/// The raw manifest as a table, for display
#[derive(Debug, Clone, Serialize)]
pub struct ManifestTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A project manifest, collapsed to one row per sample and sorted by sample identifier
#[derive(Debug, Clone)]
pub struct ProjectManifest {
    pub path: PathBuf,
    pub samples: Vec<SampleRow>,
    pub table: ManifestTable,
}

fn pointer_value(cell: &str) -> Option<PathBuf> {
    let cell = cell.trim();
    if MISSING_MARKERS.contains(&cell) {
        None
    } else {
        Some(PathBuf::from(cell))
    }
}

impl ProjectManifest {
    /// Load a tab-separated manifest
    pub fn from_tsv(path: &Path) -> Result<Self> {
        let content = read_text(path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| RibopodError::from_csv(path, e))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let sample_idx = headers
            .iter()
            .position(|h| h == SAMPLE_COLUMN)
            .ok_or_else(|| {
                RibopodError::parse(path, 1, format!("missing '{}' column", SAMPLE_COLUMN))
            })?;
        let pointer_idx: Vec<Option<usize>> = Pointer::ALL
            .iter()
            .map(|p| headers.iter().position(|h| h == p.column()))
            .collect();

        let mut rows = Vec::new();
        let mut by_sample: BTreeMap<String, SampleRow> = BTreeMap::new();

        for result in rdr.records() {
            let record = result.map_err(|e| RibopodError::from_csv(path, e))?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            let sample_id = record.get(sample_idx).unwrap_or("").trim().to_string();
            if sample_id.is_empty() {
                return Err(RibopodError::parse(path, line, "empty sample identifier"));
            }

            let entry = by_sample.entry(sample_id.clone()).or_insert_with(|| SampleRow {
                sample_id: sample_id.clone(),
                pointers: Default::default(),
            });

            // Several runs of one sample share its outputs; keep the first non-missing pointer.
            for (pointer, idx) in Pointer::ALL.iter().zip(&pointer_idx) {
                let value = idx.and_then(|i| record.get(i)).and_then(pointer_value);
                let slot = &mut entry.pointers[pointer.index()];
                let Some(value) = value else { continue };
                if let Some(existing) = slot.as_ref() {
                    if *existing != value {
                        log::warn!(
                            "{}: sample {} lists two {} files, keeping {}",
                            path.display(),
                            sample_id,
                            pointer.column(),
                            existing.display()
                        );
                    }
                } else {
                    *slot = Some(value);
                }
            }

            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        let samples: Vec<SampleRow> = by_sample.into_values().collect();
        log::debug!(
            "Loaded manifest {}: {} rows, {} samples",
            path.display(),
            rows.len(),
            samples.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            samples,
            table: ManifestTable { headers, rows },
        })
    }
}
