//! Dataset registry (`datasets.tsv`): species → projects and their summary files.
//!
//! Read once at startup; the resulting [`DatasetRegistry`] is never mutated.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{read_text, Result, RibopodError};

/// One project of one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub species: String,
    pub srp: String,
    #[serde(default)]
    pub project_output_path: Option<PathBuf>,
    /// Project manifest
    pub project_metadata_path: PathBuf,
    /// JSON list of fragment lengths seen across the project, e.g. `[26, 27, 28]`
    pub fragment_lengths: String,
    #[serde(default)]
    pub summarized_orfs: Option<PathBuf>,
    #[serde(default)]
    pub summarized_phase_scores: Option<PathBuf>,
}

impl DatasetRecord {
    /// Decode the fragment length list, ascending and without duplicates.
    pub fn fragment_lengths(&self) -> std::result::Result<Vec<u32>, String> {
        let mut lengths: Vec<u32> = serde_json::from_str(self.fragment_lengths.trim())
            .map_err(|e| format!("fragment_lengths is not an integer list: {}", e))?;
        lengths.sort_unstable();
        lengths.dedup();
        Ok(lengths)
    }
}

#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    path: PathBuf,
    records: Vec<DatasetRecord>,
}

impl DatasetRegistry {
    pub fn from_tsv(path: &Path) -> Result<Self> {
        let content = read_text(path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(content.as_bytes());

        let mut records = Vec::new();
        for result in rdr.deserialize::<DatasetRecord>() {
            let record = result.map_err(|e| RibopodError::from_csv(path, e))?;
            // validate eagerly so a bad row fails at startup, not on first click
            record
                .fragment_lengths()
                .map_err(|msg| RibopodError::parse(path, records.len() + 2, msg))?;
            records.push(record);
        }
        records.sort_by(|a, b| (&a.species, &a.srp).cmp(&(&b.species, &b.srp)));

        let registry = Self {
            path: path.to_path_buf(),
            records,
        };
        log::info!(
            "Loaded dataset registry {}: {} projects across {} species",
            path.display(),
            registry.records.len(),
            registry.species().len()
        );
        Ok(registry)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Species with at least one project
    pub fn species(&self) -> Vec<&str> {
        let mut species: Vec<&str> = self.records.iter().map(|r| r.species.as_str()).collect();
        species.dedup();
        species
    }

    /// Projects of a species, sorted by project identifier
    pub fn projects(&self, species: &str) -> Vec<&DatasetRecord> {
        self.records.iter().filter(|r| r.species == species).collect()
    }

    pub fn dataset(&self, species: &str, srp: &str) -> Result<&DatasetRecord> {
        self.records
            .iter()
            .find(|r| r.species == species && r.srp == srp)
            .ok_or_else(|| RibopodError::UnknownDataset {
                species: species.to_string(),
                srp: srp.to_string(),
            })
    }

    pub fn fragment_lengths(&self, species: &str, srp: &str) -> Result<Vec<u32>> {
        self.dataset(species, srp)?
            .fragment_lengths()
            .map_err(|msg| RibopodError::parse(&self.path, 0, msg))
    }
}
