use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cache::IndexCache;
use crate::geo::GeoBBox;
use crate::index::QuadNode;

/// Margin of tiles added around a bbox-derived tile rectangle so renderer
/// buffer tiles are covered by the estimate.
pub const BORDER: i64 = 3;

/// Half-open tile rectangle [x_min, x_max) x [y_min, y_max).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x_min: u64,
    pub y_min: u64,
    pub x_max: u64,
    pub y_max: u64,
}

impl TileRect {
    pub fn full_grid(zoom: u8) -> Self {
        let grid_size = 1u64 << zoom;
        TileRect {
            x_min: 0,
            y_min: 0,
            x_max: grid_size,
            y_max: grid_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    Global,
    Bbox,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSpec {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeEstimate {
    pub dataset_key: String,
    pub label: String,
    pub bytes: u64,
}

/// Parses `key` or `key=label`; the key doubles as the label when none is
/// given.
pub fn parse_dataset_spec(value: &str) -> Result<DatasetSpec> {
    let trimmed = value.trim();
    let (key, label) = match trimmed.split_once('=') {
        Some((key, label)) => (key.trim(), label.trim()),
        None => (trimmed, trimmed),
    };
    if key.is_empty() {
        anyhow::bail!("dataset key must not be empty");
    }
    if label.is_empty() {
        anyhow::bail!("dataset label must not be empty");
    }
    Ok(DatasetSpec {
        key: key.to_string(),
        label: label.to_string(),
    })
}

/// Sums approximate byte costs over the part of the node's square that
/// overlaps the query rectangle.
///
/// A leaf applies one uniform per-tile cost across its whole region, so a
/// partial overlap contributes value x overlap area. Branches recurse into
/// their four half-size children; squares disjoint from the query are pruned.
pub fn estimate_size(
    node: &QuadNode,
    node_x: u64,
    node_y: u64,
    node_size: u64,
    query: &TileRect,
) -> u64 {
    if node_x >= query.x_max
        || node_x + node_size <= query.x_min
        || node_y >= query.y_max
        || node_y + node_size <= query.y_min
    {
        return 0;
    }

    match node {
        QuadNode::Leaf(value) => {
            let ox_min = node_x.max(query.x_min);
            let oy_min = node_y.max(query.y_min);
            let ox_max = (node_x + node_size).min(query.x_max);
            let oy_max = (node_y + node_size).min(query.y_max);
            value * (ox_max - ox_min) * (oy_max - oy_min)
        }
        QuadNode::Branch(children) => {
            let half = node_size / 2;
            estimate_size(&children[0], node_x, node_y, half, query)
                + estimate_size(&children[1], node_x + half, node_y, half, query)
                + estimate_size(&children[2], node_x, node_y + half, half, query)
                + estimate_size(&children[3], node_x + half, node_y + half, half, query)
        }
    }
}

/// Estimates the download size of each dataset for the requested coverage.
///
/// Indices are loaded through the cache; a load failure fails the whole
/// estimate with an error naming the dataset rather than reporting zero.
/// Global coverage (or a missing bbox) queries each zoom's full grid; bbox
/// coverage queries the border-expanded tile rectangle clamped to the grid.
pub fn estimate_download_sizes(
    datasets: &[DatasetSpec],
    coverage: Coverage,
    base_path: &Path,
    bbox: Option<&GeoBBox>,
    cache: &IndexCache,
) -> Result<Vec<SizeEstimate>> {
    let mut results = Vec::with_capacity(datasets.len());

    for dataset in datasets {
        let index = cache
            .load(&dataset.key, base_path)
            .with_context(|| format!("failed to estimate dataset {}", dataset.key))?;

        let mut total_bytes: u64 = 0;
        for (&zoom, root) in index.levels.iter() {
            let grid_size = 1u64 << zoom;
            let query = match (coverage, bbox) {
                (Coverage::Bbox, Some(bbox)) => bbox.tile_rect(zoom, BORDER),
                _ => TileRect::full_grid(zoom),
            };
            total_bytes += estimate_size(root, 0, 0, grid_size, &query);
        }

        results.push(SizeEstimate {
            dataset_key: dataset.key.clone(),
            label: dataset.label.clone(),
            bytes: total_bytes,
        });
    }

    Ok(results)
}
