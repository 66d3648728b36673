use std::collections::BTreeMap;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::archive::{BlockDefinition, TileArchive};
use crate::builder::stats::{BlockGrid, RegionStats};
use crate::index::{QuadNode, SizeIndex};

pub mod fetch;
pub mod stats;

/// Build-time constants of the quadtree compression. Fixed per index; the
/// estimator never sees them.
#[derive(Debug, Clone, Copy)]
pub struct BuildConfig {
    /// Recursion floor: squares at or below this side length become leaves.
    pub min_node_size: u64,
    /// Coefficient-of-variation threshold below which a region collapses to
    /// a single mean value.
    pub cv_threshold: f64,
    /// Maximum number of simultaneous block fetches.
    pub concurrency: usize,
    pub no_progress: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            min_node_size: 16,
            cv_threshold: 0.5,
            concurrency: 4,
            no_progress: false,
        }
    }
}

/// Builds the quadtree node covering [x_min, x_min+size) x [y_min, y_min+size)
/// and returns it together with the exact stats of that square.
///
/// Leaf values average the byte sum over all `size * size` tiles of the
/// square, absent tiles included, so sparsely covered regions dilute the
/// per-tile mean. Downstream estimates are calibrated against this.
pub fn build_node(
    grid: &BlockGrid,
    x_min: u64,
    y_min: u64,
    size: u64,
    config: &BuildConfig,
) -> (QuadNode, RegionStats) {
    if size <= config.min_node_size {
        let stats = grid.collect_stats(x_min, y_min, size);
        let mean = if stats.tile_count == 0 {
            0.0
        } else {
            stats.sum / (size * size) as f64
        };
        return (QuadNode::Leaf(mean.round() as u64), stats);
    }

    let half = size / 2;
    let (nw, nw_stats) = build_node(grid, x_min, y_min, half, config);
    let (ne, ne_stats) = build_node(grid, x_min + half, y_min, half, config);
    let (sw, sw_stats) = build_node(grid, x_min, y_min + half, half, config);
    let (se, se_stats) = build_node(grid, x_min + half, y_min + half, half, config);

    let mut stats = nw_stats;
    stats.merge(&ne_stats);
    stats.merge(&sw_stats);
    stats.merge(&se_stats);

    if stats.tile_count == 0 {
        return (QuadNode::Leaf(0), stats);
    }

    // Heterogeneity test over the nonzero tile lengths.
    let mean = stats.sum / stats.tile_count as f64;
    let variance = (stats.sum_of_squares / stats.tile_count as f64 - mean * mean).max(0.0);
    let cv = if mean > 0.0 {
        variance.sqrt() / mean
    } else {
        0.0
    };

    let total_mean = stats.sum / (size * size) as f64;

    if cv < config.cv_threshold {
        // Statistically smooth: trade spatial detail for index size.
        return (QuadNode::Leaf(total_mean.round() as u64), stats);
    }

    if let (QuadNode::Leaf(a), QuadNode::Leaf(b), QuadNode::Leaf(c), QuadNode::Leaf(d)) =
        (&nw, &ne, &sw, &se)
    {
        if a == b && a == c && a == d {
            return (QuadNode::Leaf(*a), stats);
        }
    }

    (QuadNode::branch(nw, ne, sw, se), stats)
}

/// Builds the full size index for an archive, one quadtree per zoom level.
///
/// All block fetches of a zoom level complete before its tree is built, and
/// any fetch failure aborts the whole build; no partial index is returned.
pub fn build_index(archive: &dyn TileArchive, config: &BuildConfig) -> Result<SizeIndex> {
    let header = archive.header()?;
    let blocks = archive.block_index()?;

    let mut blocks_by_zoom: BTreeMap<u8, Vec<BlockDefinition>> = BTreeMap::new();
    for block in blocks {
        blocks_by_zoom.entry(block.level).or_default().push(block);
    }
    let total_blocks = blocks_by_zoom.values().map(|blocks| blocks.len() as u64).sum();

    let progress = if config.no_progress {
        ProgressBar::hidden()
    } else {
        make_progress_bar(total_blocks)
    };

    let mut levels = BTreeMap::new();
    for zoom in header.zoom_min..=header.zoom_max {
        let node = match blocks_by_zoom.get(&zoom) {
            None => QuadNode::Leaf(0),
            Some(zoom_blocks) => {
                let grid =
                    fetch::fetch_block_grid(archive, zoom_blocks, config.concurrency, &progress)?;
                let grid_size = 1u64 << zoom;
                let (node, stats) = build_node(&grid, 0, 0, grid_size, config);
                debug!(
                    zoom,
                    blocks = grid.len(),
                    tiles = stats.tile_count,
                    "built quadtree level"
                );
                node
            }
        };
        levels.insert(zoom, node);
    }
    progress.finish_and_clear();

    Ok(SizeIndex { levels })
}

fn make_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );
    bar
}
