//! Configuration parsing for ribopod
//!
//! Parses the optional YAML file naming the dataset registry, the species
//! offered for browsing, and plotting defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::chart::PlotType;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Dataset registry (`datasets.tsv`)
    #[serde(default)]
    pub registry: Option<PathBuf>,

    /// Species offered for browsing, in display order
    #[serde(default = "default_species")]
    pub species: Vec<SpeciesConfig>,

    /// Optional settings
    #[serde(default)]
    pub options: Options,
}

/// A species entry: display label and the assembly used as registry key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesConfig {
    pub label: String,
    pub assembly: String,
}

/// Optional settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Assembly selected when none is given
    #[serde(default = "default_assembly")]
    pub default_species: String,

    /// Fragment length for the metagene plot when none is given
    #[serde(default = "default_fragment_length")]
    pub default_fragment_length: u32,

    /// Subplot columns in per-sample figures
    #[serde(default = "default_samples_per_row")]
    pub samples_per_row: usize,

    /// Metagene plot style
    #[serde(default)]
    pub plot_type: PlotType,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_species: default_assembly(),
            default_fragment_length: default_fragment_length(),
            samples_per_row: default_samples_per_row(),
            plot_type: PlotType::default(),
        }
    }
}

fn default_assembly() -> String {
    "SC5314".to_string()
}

fn default_fragment_length() -> u32 {
    28
}

fn default_samples_per_row() -> usize {
    1
}

fn default_species() -> Vec<SpeciesConfig> {
    [
        ("H.sapiens", "hg38"),
        ("M.musculus", "mm10"),
        ("C.albicans", "SC5314"),
        ("D.melanogaster", "BDGP6"),
        ("C.elegans", "WBcel235"),
        ("M.mulatta", "Mmul8"),
        ("G.gallus", "GRCg6"),
        ("R.norvegicus", "Rnor6.0"),
        ("P.troglodytes", "panTro3"),
        ("D.rerio", "GRCz11"),
    ]
    .iter()
    .map(|(label, assembly)| SpeciesConfig {
        label: label.to_string(),
        assembly: assembly.to_string(),
    })
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: None,
            species: default_species(),
            options: Options::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(registry) = &self.registry {
            if !registry.exists() {
                anyhow::bail!("Dataset registry not found: {}", registry.display());
            }
        }

        if self.species.is_empty() {
            anyhow::bail!("At least one species must be defined");
        }

        let mut assemblies: Vec<&str> = self.species.iter().map(|s| s.assembly.as_str()).collect();
        assemblies.sort_unstable();
        if let Some(pair) = assemblies.windows(2).find(|w| w[0] == w[1]) {
            anyhow::bail!("Species assembly '{}' is listed twice", pair[0]);
        }

        if self.options.samples_per_row == 0 {
            anyhow::bail!("samples_per_row must be at least 1");
        }

        Ok(())
    }

    /// Registry path; `--registry` on the command line wins over the config file
    pub fn registry_path(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.registry.clone())
            .context("No dataset registry given: pass --registry or set 'registry' in the config")
    }

    /// Display label for an assembly
    pub fn species_label(&self, assembly: &str) -> String {
        self.species
            .iter()
            .find(|s| s.assembly == assembly)
            .map(|s| s.label.clone())
            .unwrap_or_else(|| assembly.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
registry: /data2/datasets.tsv

species:
  - label: "H.sapiens"
    assembly: hg38
  - label: "M.musculus"
    assembly: mm10

options:
  default_species: hg38
  plot_type: line
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.registry, Some(PathBuf::from("/data2/datasets.tsv")));
        assert_eq!(config.species.len(), 2);
        assert_eq!(config.options.default_species, "hg38");
        assert_eq!(config.options.default_fragment_length, 28);
        assert_eq!(config.options.samples_per_row, 1);
        assert_eq!(config.options.plot_type, PlotType::Line);
        assert_eq!(config.species_label("mm10"), "M.musculus");
        assert_eq!(config.species_label("hg19"), "hg19");
    }

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.species.len(), 10);
        assert_eq!(config.options.default_species, "SC5314");
        assert_eq!(config.options.plot_type, PlotType::Bar);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicates_and_zero_columns() {
        let mut config = Config::default();
        config.species.push(SpeciesConfig {
            label: "again".to_string(),
            assembly: "hg38".to_string(),
        });
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.options.samples_per_row = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_registry_override() {
        let config = Config {
            registry: Some(PathBuf::from("/from/config.tsv")),
            ..Config::default()
        };
        let path = config.registry_path(Some(Path::new("/from/cli.tsv"))).unwrap();
        assert_eq!(path, PathBuf::from("/from/cli.tsv"));
        assert_eq!(
            config.registry_path(None).unwrap(),
            PathBuf::from("/from/config.tsv")
        );
        assert!(Config::default().registry_path(None).is_err());
    }
}
