use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "tile-size-index",
    version,
    about = "Quadtree size-index builder and download-size estimator for tiled map datasets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (error|warn|info|debug|trace)
    #[arg(long, default_value = "info", global = true)]
    pub log: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Build(BuildArgs),
    Estimate(EstimateArgs),
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    pub input: PathBuf,

    /// Path the size-index JSON is written to
    #[arg(long)]
    pub output: PathBuf,

    /// Quadtree recursion floor (side length in tiles)
    #[arg(long, default_value_t = 16)]
    pub min_node_size: u64,

    /// Coefficient-of-variation threshold for collapsing a region
    #[arg(long, default_value_t = 0.5)]
    pub cv_threshold: f64,

    /// Maximum simultaneous block fetches
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

#[derive(Debug, Args)]
pub struct EstimateArgs {
    /// Datasets as key or key=label
    #[arg(required = true)]
    pub datasets: Vec<String>,

    /// Directory holding size-index-<key>.json files
    #[arg(long)]
    pub base_path: PathBuf,

    #[arg(long, value_enum, default_value_t = CoverageArg::Global)]
    pub coverage: CoverageArg,

    /// Bounding box as west,south,east,north in degrees
    #[arg(long)]
    pub bbox: Option<String>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub output: ReportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CoverageArg {
    Global,
    Bbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}
