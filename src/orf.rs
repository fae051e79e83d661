//! Project-level ORF summaries referenced by the dataset registry

use serde::Serialize;
use std::path::Path;

use crate::error::{read_text, Result, RibopodError};

/// ORF categories, in stacking order
pub const ORF_CATEGORIES: [&str; 8] = [
    "annotated",
    "super_uORF",
    "uORF",
    "overlap_uORF",
    "super_dORF",
    "dORF",
    "overlap_dORF",
    "novel",
];

const SAMPLE_COLUMN: &str = "experiment_accession";
const ORF_ID_COLUMN: &str = "ORF_ID";

/// Translating ORF counts per sample and category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrfCounts {
    pub samples: Vec<String>,
    pub categories: Vec<String>,
    /// `counts[category][sample]`; `None` where the table has no value
    pub counts: Vec<Vec<Option<u64>>>,
}

#[cfg(test)]
impl OrfCounts {
    pub fn category(&self, name: &str) -> Option<&[Option<u64>]> {
        let idx = self.categories.iter().position(|c| c == name)?;
        Some(&self.counts[idx])
    }
}

/// Per-ORF phase scores, one column per sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizedPhaseScores {
    pub samples: Vec<String>,
    /// Non-missing scores of each sample
    pub scores: Vec<Vec<f64>>,
    pub orf_count: usize,
}

fn tsv_reader(content: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(content.as_bytes())
}

fn headers(rdr: &mut csv::Reader<&[u8]>, path: &Path) -> Result<Vec<String>> {
    Ok(rdr
        .headers()
        .map_err(|e| RibopodError::from_csv(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect())
}

fn column(headers: &[String], name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| RibopodError::parse(path, 1, format!("missing '{}' column", name)))
}

/// Parse a count cell; pandas writes integer columns with gaps as floats (`12.0`).
fn parse_count(cell: &str) -> std::result::Result<Option<u64>, ()> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    if let Ok(n) = cell.parse::<u64>() {
        return Ok(Some(n));
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v.is_finite() => Ok(Some(v as u64)),
        _ => Err(()),
    }
}

/// Load `{srp}_summarized_orfs.tsv`
pub fn load_orf_counts(path: &Path) -> Result<OrfCounts> {
    let content = read_text(path)?;
    let mut rdr = tsv_reader(&content);
    let headers = headers(&mut rdr, path)?;

    let sample_idx = column(&headers, SAMPLE_COLUMN, path)?;
    let category_idx: Vec<usize> = ORF_CATEGORIES
        .iter()
        .map(|c| column(&headers, c, path))
        .collect::<Result<_>>()?;

    let mut samples = Vec::new();
    let mut counts = vec![Vec::new(); ORF_CATEGORIES.len()];

    for result in rdr.records() {
        let record = result.map_err(|e| RibopodError::from_csv(path, e))?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        samples.push(record.get(sample_idx).unwrap_or("").to_string());
        for (ci, idx) in category_idx.iter().enumerate() {
            let cell = record.get(*idx).unwrap_or("");
            let count = parse_count(cell).map_err(|_| {
                RibopodError::parse(
                    path,
                    line,
                    format!("invalid {} count '{}'", ORF_CATEGORIES[ci], cell),
                )
            })?;
            counts[ci].push(count);
        }
    }

    log::debug!("Loaded ORF counts {}: {} samples", path.display(), samples.len());

    Ok(OrfCounts {
        samples,
        categories: ORF_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        counts,
    })
}

/// Load `{srp}_summarized_phase_scores.tsv`
pub fn load_summarized_phase_scores(path: &Path) -> Result<SummarizedPhaseScores> {
    let content = read_text(path)?;
    let mut rdr = tsv_reader(&content);
    let headers = headers(&mut rdr, path)?;

    let orf_idx = column(&headers, ORF_ID_COLUMN, path)?;
    let sample_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != orf_idx)
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut scores = vec![Vec::new(); sample_cols.len()];
    let mut orf_count = 0;

    for result in rdr.records() {
        let record = result.map_err(|e| RibopodError::from_csv(path, e))?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        orf_count += 1;
        for (si, (idx, sample)) in sample_cols.iter().enumerate() {
            let cell = record.get(*idx).unwrap_or("").trim();
            if cell.is_empty() {
                continue;
            }
            let value: f64 = cell.parse().map_err(|_| {
                RibopodError::parse(
                    path,
                    line,
                    format!("invalid phase score '{}' for sample {}", cell, sample),
                )
            })?;
            if value.is_finite() {
                scores[si].push(value);
            }
        }
    }

    log::debug!(
        "Loaded summarized phase scores {}: {} ORFs × {} samples",
        path.display(),
        orf_count,
        sample_cols.len()
    );

    Ok(SummarizedPhaseScores {
        samples: sample_cols.into_iter().map(|(_, s)| s).collect(),
        scores,
        orf_count,
    })
}
