//! ribopod: Ribo-seq dashboard core
//!
//! Loads per-sample ribotricer outputs through project manifests listed in a
//! dataset registry and writes the dashboard's views as JSON:
//! 1. Metagene coverage split by reading frame, at one fragment length
//! 2. Phase score matrix (samples × fragment lengths)
//! 3. Read length distributions and project-level ORF summaries

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::ops::RangeInclusive;
use std::path::PathBuf;

mod chart;
mod config;
mod dashboard;
mod error;
mod manifest;
mod matrix;
mod orf;
mod output;
mod parsers;
mod profile;
mod project;
mod registry;
#[cfg(test)]
mod test_util;

use crate::chart::PlotType;
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::output::OutputOptions;

/// Ribo-seq dashboard views from ribotricer outputs
#[derive(Parser, Debug)]
#[command(name = "ribopod")]
#[command(version)]
#[command(about = "Browse Ribo-seq projects: metagene profiles, phase scores and read lengths as JSON views")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    args: GlobalArgs,
}

#[derive(Parser, Debug)]
struct GlobalArgs {
    /// YAML configuration file (registry, species list, plotting defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Dataset registry (datasets.tsv); overrides the config file
    #[arg(short, long, global = true)]
    registry: Option<PathBuf>,

    /// Output file, `-` for stdout
    #[arg(short, long, global = true, default_value = "-")]
    output: PathBuf,

    /// Use compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    compact: bool,

    /// Compress output with gzip (.gz)
    #[arg(long, global = true)]
    gzip: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Species and project selection
#[derive(Parser, Debug)]
struct Selection {
    /// Species assembly, e.g. hg38 (default: from config)
    #[arg(short, long)]
    species: Option<String>,

    /// Project identifier, e.g. SRP098789
    srp: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List configured species
    Species,

    #[command(flatten)]
    View(ViewCommand),
}

/// Subcommands that read the dataset registry
#[derive(Subcommand, Debug)]
enum ViewCommand {
    /// List the projects of a species
    Projects {
        /// Species assembly (default: from config)
        #[arg(short, long)]
        species: Option<String>,
    },

    /// List the fragment lengths of a project
    FragmentLengths(Selection),

    /// Show the project manifest as a table
    Metadata(Selection),

    /// Metagene coverage at one fragment length, split by reading frame
    Metagene {
        #[command(flatten)]
        selection: Selection,

        /// Fragment length (default: from config)
        #[arg(short = 'l', long)]
        fragment_length: Option<u32>,

        /// Plot style (default: from config)
        #[arg(long, value_enum)]
        plot_type: Option<PlotType>,

        /// Restrict to positions START:END (inclusive, relative to the start codon)
        #[arg(long, value_parser = parse_window, allow_hyphen_values = true)]
        window: Option<RangeInclusive<i64>>,
    },

    /// Phase score matrix, samples × fragment lengths
    PhaseScores(Selection),

    /// Read length distribution of every sample
    ReadLengths(Selection),

    /// Translating ORF counts per category
    OrfCounts(Selection),

    /// Distribution of per-ORF phase scores
    PhaseScoreDist(Selection),
}

/// Parse `START:END` into an inclusive range
fn parse_window(s: &str) -> std::result::Result<RangeInclusive<i64>, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{}'", s))?;
    let start: i64 = start.trim().parse().map_err(|_| format!("invalid start '{}'", start))?;
    let end: i64 = end.trim().parse().map_err(|_| format!("invalid end '{}'", end))?;
    if start > end {
        return Err(format!("window start {} is after end {}", start, end));
    }
    Ok(start..=end)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("ribopod v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.args.config {
        Some(path) => {
            info!("Loading configuration: {}", path.display());
            Config::from_yaml(path)?
        }
        None => Config::default(),
    };

    let output = OutputOptions {
        path: cli.args.output.clone(),
        compact: cli.args.compact,
        gzip: cli.args.gzip,
    };

    match cli.command {
        Commands::Species => output::write_json(&dashboard::species_options(&config), &output),
        Commands::View(command) => {
            let dashboard = Dashboard::open(config, cli.args.registry.as_deref())?;
            info!("Dataset registry: {}", dashboard.registry().path().display());
            run(&dashboard, command, &output)
        }
    }
}

fn run(dashboard: &Dashboard, command: ViewCommand, output: &OutputOptions) -> Result<()> {
    let default_species = dashboard.config().options.default_species.clone();
    let species_or_default = |species: Option<String>| species.unwrap_or_else(|| default_species.clone());

    match command {
        ViewCommand::Projects { species } => {
            let species = species_or_default(species);
            let projects = dashboard.project_options(&species);
            info!(
                "{} ({}): {} projects",
                dashboard.config().species_label(&species),
                species,
                projects.len()
            );
            output::write_json(&projects, output)
        }

        ViewCommand::FragmentLengths(sel) => {
            let species = species_or_default(sel.species);
            let lengths = dashboard
                .fragment_length_options(&species, &sel.srp)
                .with_context(|| format!("Failed to list fragment lengths of {}", sel.srp))?;
            output::write_json(&lengths, output)
        }

        ViewCommand::Metadata(sel) => {
            let species = species_or_default(sel.species);
            let view = dashboard
                .metadata_view(&species, &sel.srp)
                .with_context(|| format!("Failed to load metadata of {}", sel.srp))?;
            output::write_json(&view, output)
        }

        ViewCommand::Metagene {
            selection,
            fragment_length,
            plot_type,
            window,
        } => {
            let species = species_or_default(selection.species);
            let view = dashboard
                .metagene_view(&species, &selection.srp, fragment_length, plot_type, window.as_ref())
                .with_context(|| format!("Failed to build metagene view of {}", selection.srp))?;
            info!(
                "Fragment length {}: {} of {} samples plotted",
                view.profile.fragment_length,
                view.profile.samples.len(),
                view.profile.sample_ids.len()
            );
            output::write_json(&view, output)
        }

        ViewCommand::PhaseScores(sel) => {
            let species = species_or_default(sel.species);
            let view = dashboard
                .phase_score_view(&species, &sel.srp)
                .with_context(|| format!("Failed to build phase score matrix of {}", sel.srp))?;
            if let Some(matrix) = view.outcome.matrix() {
                let (rows, cols) = matrix.shape();
                info!("Phase score matrix: {} samples × {} fragment lengths", rows, cols);
            }
            output::write_json(&view, output)
        }

        ViewCommand::ReadLengths(sel) => {
            let species = species_or_default(sel.species);
            let view = dashboard
                .read_length_view(&species, &sel.srp)
                .with_context(|| format!("Failed to load read lengths of {}", sel.srp))?;
            output::write_json(&view, output)
        }

        ViewCommand::OrfCounts(sel) => {
            let species = species_or_default(sel.species);
            let view = dashboard
                .orf_count_view(&species, &sel.srp)
                .with_context(|| format!("Failed to load ORF counts of {}", sel.srp))?;
            output::write_json(&view, output)
        }

        ViewCommand::PhaseScoreDist(sel) => {
            let species = species_or_default(sel.species);
            let view = dashboard
                .phase_score_distribution_view(&species, &sel.srp)
                .with_context(|| format!("Failed to load summarized phase scores of {}", sel.srp))?;
            output::write_json(&view, output)
        }
    }
}
