//! Dashboard views: one method per panel of the browser front end.
//!
//! A [`Dashboard`] is opened once from the configuration and the dataset
//! registry; every view is rebuilt from disk on each call.

use anyhow::Context;
use serde::Serialize;
use std::ops::RangeInclusive;
use std::path::Path;

use crate::chart::{self, Figure, PlotType};
use crate::config::Config;
use crate::error::Result;
use crate::manifest::{Pointer, ProjectManifest};
use crate::matrix::{self, FrameDecomposedProfile, PhaseScoreOutcome};
use crate::orf::{self, OrfCounts, SummarizedPhaseScores};
use crate::project::{self, ProjectReadLengths};
use crate::registry::DatasetRegistry;

/// Drop-down entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetadataView {
    pub species: String,
    pub srp: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Columns whose cells are rendered as download links
    pub link_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetageneView {
    pub species: String,
    pub srp: String,
    pub plot_type: PlotType,
    pub profile: FrameDecomposedProfile,
    pub figure: Figure,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseScoreView {
    pub species: String,
    pub srp: String,
    pub outcome: PhaseScoreOutcome,
    pub figure: Option<Figure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadLengthView {
    pub species: String,
    pub srp: String,
    pub samples: ProjectReadLengths,
    pub figure: Figure,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrfCountView {
    pub species: String,
    pub srp: String,
    pub counts: OrfCounts,
    pub figure: Figure,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseScoreDistributionView {
    pub species: String,
    pub srp: String,
    pub scores: SummarizedPhaseScores,
    pub figure: Figure,
}

/// Configured species, in display order
pub fn species_options(config: &Config) -> Vec<SelectOption> {
    config
        .species
        .iter()
        .map(|s| SelectOption {
            label: s.label.clone(),
            value: s.assembly.clone(),
        })
        .collect()
}

pub struct Dashboard {
    config: Config,
    registry: DatasetRegistry,
}

impl Dashboard {
    pub fn new(config: Config, registry: DatasetRegistry) -> Self {
        Self { config, registry }
    }

    /// Read the registry named by `registry_override` or the config
    pub fn open(config: Config, registry_override: Option<&Path>) -> anyhow::Result<Self> {
        let path = config.registry_path(registry_override)?;
        let registry = DatasetRegistry::from_tsv(&path)
            .with_context(|| format!("Failed to load dataset registry: {}", path.display()))?;
        Ok(Self::new(config, registry))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    pub fn project_options(&self, species: &str) -> Vec<SelectOption> {
        self.registry
            .projects(species)
            .into_iter()
            .map(|r| SelectOption {
                label: r.srp.clone(),
                value: r.srp.clone(),
            })
            .collect()
    }

    pub fn fragment_length_options(&self, species: &str, srp: &str) -> Result<Vec<u32>> {
        self.registry.fragment_lengths(species, srp)
    }

    pub fn metadata_view(&self, species: &str, srp: &str) -> Result<MetadataView> {
        let record = self.registry.dataset(species, srp)?;
        let manifest = ProjectManifest::from_tsv(&record.project_metadata_path)?;
        let link_columns = manifest
            .table
            .headers
            .iter()
            .filter(|h| h.as_str() == Pointer::OrfTable.column())
            .cloned()
            .collect();

        Ok(MetadataView {
            species: species.to_string(),
            srp: srp.to_string(),
            headers: manifest.table.headers,
            rows: manifest.table.rows,
            link_columns,
        })
    }

    /// Frame-decomposed metagene at one fragment length.
    ///
    /// `fragment_length` and `plot_type` fall back to the configured defaults.
    pub fn metagene_view(
        &self,
        species: &str,
        srp: &str,
        fragment_length: Option<u32>,
        plot_type: Option<PlotType>,
        window: Option<&RangeInclusive<i64>>,
    ) -> Result<MetageneView> {
        let options = &self.config.options;
        let fragment_length = fragment_length.unwrap_or(options.default_fragment_length);
        let plot_type = plot_type.unwrap_or(options.plot_type);

        let record = self.registry.dataset(species, srp)?;
        let metagenes = project::load_project_metagenes(&record.project_metadata_path)?;
        let profile = match window {
            Some(window) => {
                matrix::select_frame_decomposed_profile_in(&metagenes, fragment_length, Some(window))
            }
            None => matrix::select_frame_decomposed_profile(&metagenes, fragment_length),
        };
        let figure = chart::metagene_figure(&profile, plot_type, options.samples_per_row);

        Ok(MetageneView {
            species: species.to_string(),
            srp: srp.to_string(),
            plot_type,
            profile,
            figure,
        })
    }

    pub fn phase_score_view(&self, species: &str, srp: &str) -> Result<PhaseScoreView> {
        let record = self.registry.dataset(species, srp)?;
        let metagenes = project::load_project_metagenes(&record.project_metadata_path)?;
        let outcome = matrix::build_phase_score_matrix(&metagenes);
        let figure = chart::phase_score_heatmap(&outcome);

        Ok(PhaseScoreView {
            species: species.to_string(),
            srp: srp.to_string(),
            outcome,
            figure,
        })
    }

    pub fn read_length_view(&self, species: &str, srp: &str) -> Result<ReadLengthView> {
        let record = self.registry.dataset(species, srp)?;
        let samples = project::load_project_read_lengths(&record.project_metadata_path)?;
        let figure = chart::read_length_figure(&samples, self.config.options.samples_per_row);

        Ok(ReadLengthView {
            species: species.to_string(),
            srp: srp.to_string(),
            samples,
            figure,
        })
    }

    /// `None` when the registry lists no ORF summary for the project
    pub fn orf_count_view(&self, species: &str, srp: &str) -> Result<Option<OrfCountView>> {
        let record = self.registry.dataset(species, srp)?;
        let Some(path) = &record.summarized_orfs else {
            log::info!("{} / {}: no summarized ORF table", species, srp);
            return Ok(None);
        };
        let counts = orf::load_orf_counts(path)?;
        let figure = chart::orf_counts_figure(&counts);

        Ok(Some(OrfCountView {
            species: species.to_string(),
            srp: srp.to_string(),
            counts,
            figure,
        }))
    }

    /// `None` when the registry lists no phase score summary for the project
    pub fn phase_score_distribution_view(
        &self,
        species: &str,
        srp: &str,
    ) -> Result<Option<PhaseScoreDistributionView>> {
        let record = self.registry.dataset(species, srp)?;
        let Some(path) = &record.summarized_phase_scores else {
            log::info!("{} / {}: no summarized phase score table", species, srp);
            return Ok(None);
        };
        let scores = orf::load_summarized_phase_scores(path)?;
        let figure = chart::phase_score_violin(&scores);

        Ok(Some(PhaseScoreDistributionView {
            species: species.to_string(),
            srp: srp.to_string(),
            scores,
            figure,
        }))
    }
}
