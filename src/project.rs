//! Project-wide collections of per-sample data, loaded through the manifest

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::manifest::{Pointer, ProjectManifest};
use crate::parsers::{BamSummaryParser, MetageneProfileParser, SampleFileParser};
use crate::profile::{ReadLengthDistribution, SampleMetagene};

/// A sample's data, or the explicit placeholder for a sample without that file
#[derive(Debug, Clone, PartialEq)]
pub enum SampleEntry<T> {
    Loaded(T),
    Missing,
}

impl<T> SampleEntry<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            SampleEntry::Loaded(data) => Some(data),
            SampleEntry::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, SampleEntry::Missing)
    }
}

/// Sample-keyed collection that iterates in manifest order
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSamples<T> {
    order: Vec<String>,
    entries: HashMap<String, SampleEntry<T>>,
}

impl<T> Default for ProjectSamples<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

impl<T> ProjectSamples<T> {
    /// Append a sample; a repeated identifier replaces the earlier entry in place.
    pub fn insert(&mut self, sample_id: &str, entry: SampleEntry<T>) {
        if self.entries.insert(sample_id.to_string(), entry).is_none() {
            self.order.push(sample_id.to_string());
        }
    }

    /// `None` means the sample is not part of the project at all
    pub fn get(&self, sample_id: &str) -> Option<&SampleEntry<T>> {
        self.entries.get(sample_id)
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SampleEntry<T>)> + '_ {
        self.order
            .iter()
            .map(move |id| (id.as_str(), &self.entries[id]))
    }

    /// Samples with data, in order
    pub fn loaded(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.iter()
            .filter_map(|(id, entry)| entry.loaded().map(|data| (id, data)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Serialize)]
struct SerializedEntry<'a, T: Serialize> {
    sample: &'a str,
    data: Option<&'a T>,
}

impl<T: Serialize> Serialize for ProjectSamples<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for (sample, entry) in self.iter() {
            seq.serialize_element(&SerializedEntry {
                sample,
                data: entry.loaded(),
            })?;
        }
        seq.end()
    }
}

pub type ProjectMetagenes = ProjectSamples<SampleMetagene>;
pub type ProjectReadLengths = ProjectSamples<ReadLengthDistribution>;

/// Load the 5' metagene profiles of every sample in a project manifest
pub fn load_project_metagenes(manifest_path: &Path) -> Result<ProjectMetagenes> {
    let manifest = ProjectManifest::from_tsv(manifest_path)?;
    collect_samples(&manifest, Pointer::Metagene5p, &MetageneProfileParser)
}

/// Load the fragment length distribution of every sample in a project manifest
pub fn load_project_read_lengths(manifest_path: &Path) -> Result<ProjectReadLengths> {
    let manifest = ProjectManifest::from_tsv(manifest_path)?;
    collect_samples(&manifest, Pointer::BamSummary, &BamSummaryParser)
}

/// Parse the file behind `pointer` for each sample.
///
/// Samples without a pointer become [`SampleEntry::Missing`]; a pointer to an
/// unreadable or malformed file fails the whole load.
pub fn collect_samples<P: SampleFileParser>(
    manifest: &ProjectManifest,
    pointer: Pointer,
    parser: &P,
) -> Result<ProjectSamples<P::Output>> {
    let mut samples = ProjectSamples::default();

    for row in &manifest.samples {
        let entry = match row.pointer(pointer) {
            Some(path) => {
                log::debug!("  {} -> {} ({})", row.sample_id, path.display(), parser.format_name());
                SampleEntry::Loaded(parser.parse(path)?)
            }
            None => SampleEntry::Missing,
        };
        samples.insert(&row.sample_id, entry);
    }

    if samples.is_empty() {
        log::warn!("{}: manifest lists no samples", manifest.path.display());
    }
    log::info!(
        "Loaded {} for {} samples from {} ({} without a file)",
        parser.format_name(),
        samples.len(),
        manifest.path.display(),
        samples.iter().filter(|(_, entry)| entry.is_missing()).count()
    );

    Ok(samples)
}
