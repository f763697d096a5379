use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use spring_layout::config::DEFAULT_APPROXIMATION_THRESHOLD;
use spring_layout::{Dimensions, SimulationConfig};

/// Force-directed 2D/3D layout for node/edge graph documents.
#[derive(Parser, Debug)]
#[command(name = "spring-layout")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input graph document (.json, .yaml) - used when no subcommand specified
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output path for the annotated document
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub options: LayoutOptions,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute node coordinates (default behavior)
    Layout {
        /// Input graph document (.json, .yaml)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the annotated document
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        options: LayoutOptions,
    },
    /// Print graph size and the repulsion backend a layout would use
    Stats {
        /// Input graph document (.json, .yaml)
        #[arg(short, long)]
        input: PathBuf,

        /// Node count above which Barnes-Hut is used
        #[arg(long, default_value_t = DEFAULT_APPROXIMATION_THRESHOLD)]
        threshold: usize,
    },
}

/// Simulation settings; flags override values from `--config`
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct LayoutOptions {
    /// Simulation config file (.json, .yaml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Iteration budget [default: 100]
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Output dimensionality [default: 3]
    #[arg(long, value_parser = clap::value_parser!(u8).range(2..=3))]
    pub dim: Option<u8>,

    /// Seed for the initial placement [default: 42]
    #[arg(long)]
    pub seed: Option<u64>,

    /// Node count above which Barnes-Hut is used [default: 2000]
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Barnes-Hut opening criterion [default: 0.9]
    #[arg(long)]
    pub theta: Option<f64>,

    /// Resting distance between connected nodes [default: 1.0]
    #[arg(long)]
    pub edge_length: Option<f64>,
}

impl LayoutOptions {
    /// Build the simulation config: defaults, then the config file, then flags
    pub fn to_config(&self) -> anyhow::Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => SimulationConfig::default(),
        };

        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(dim) = self.dim {
            config.dimensions = Dimensions::try_from(dim)?;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(threshold) = self.threshold {
            config.approximation_threshold = threshold;
        }
        if let Some(theta) = self.theta {
            config.theta = theta;
        }
        if let Some(edge_length) = self.edge_length {
            config.ideal_edge_length = edge_length;
        }

        config.validate()?;
        Ok(config)
    }
}
