use anyhow::Result;
use clap::Parser;

use tile_size_index::archive::MbtilesArchive;
use tile_size_index::builder::{BuildConfig, build_index};
use tile_size_index::cache::IndexCache;
use tile_size_index::cli::{Cli, Command, CoverageArg, ReportFormat};
use tile_size_index::estimate::{Coverage, estimate_download_sizes, parse_dataset_spec};
use tile_size_index::format::format_bytes;
use tile_size_index::geo::GeoBBox;
use tile_size_index::output::{ndjson_lines, text_lines};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    match cli.command {
        Command::Build(args) => {
            if args.min_node_size == 0 {
                anyhow::bail!("--min-node-size must be at least 1");
            }
            if !args.cv_threshold.is_finite() || args.cv_threshold < 0.0 {
                anyhow::bail!("--cv-threshold must be a non-negative number");
            }
            let archive = MbtilesArchive::open(&args.input)?;
            let config = BuildConfig {
                min_node_size: args.min_node_size,
                cv_threshold: args.cv_threshold,
                concurrency: args.concurrency,
                no_progress: args.no_progress,
            };
            let index = build_index(&archive, &config)?;
            index.write_file(&args.output)?;
            let json_bytes = index.to_json()?.len() as u64;
            println!(
                "written {} to {}",
                format_bytes(json_bytes),
                args.output.display()
            );
        }
        Command::Estimate(args) => {
            if args.coverage == CoverageArg::Bbox && args.bbox.is_none() {
                anyhow::bail!("--coverage bbox requires --bbox");
            }
            if args.bbox.is_some() && args.coverage != CoverageArg::Bbox {
                anyhow::bail!("--bbox requires --coverage bbox");
            }
            let datasets = args
                .datasets
                .iter()
                .map(|value| parse_dataset_spec(value))
                .collect::<Result<Vec<_>>>()?;
            let bbox = match args.bbox.as_deref() {
                Some(value) => Some(GeoBBox::parse(value)?),
                None => None,
            };
            let coverage = match args.coverage {
                CoverageArg::Global => Coverage::Global,
                CoverageArg::Bbox => Coverage::Bbox,
            };
            let cache = IndexCache::new();
            let estimates = estimate_download_sizes(
                &datasets,
                coverage,
                &args.base_path,
                bbox.as_ref(),
                &cache,
            )?;
            match args.output {
                ReportFormat::Text => {
                    for line in text_lines(&estimates) {
                        println!("{line}");
                    }
                }
                ReportFormat::Json => {
                    for line in ndjson_lines(&estimates)? {
                        println!("{line}");
                    }
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
