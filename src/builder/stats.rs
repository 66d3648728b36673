use std::collections::HashMap;

use crate::archive::{BlockDefinition, TileLengths};

const BLOCK_SHIFT: u64 = 8;
const BLOCK_SPAN: i64 = 256;

/// Exact aggregate over the nonzero tile lengths of some region. Sums are
/// accumulated as f64; downstream byte estimates are calibrated against
/// that arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionStats {
    pub tile_count: u64,
    pub sum: f64,
    pub sum_of_squares: f64,
}

impl RegionStats {
    pub fn merge(&mut self, other: &RegionStats) {
        self.tile_count += other.tile_count;
        self.sum += other.sum;
        self.sum_of_squares += other.sum_of_squares;
    }

    fn record(&mut self, length: u64) {
        let length = length as f64;
        self.tile_count += 1;
        self.sum += length;
        self.sum_of_squares += length * length;
    }
}

pub struct BlockData {
    pub block: BlockDefinition,
    pub lengths: TileLengths,
}

/// All fetched blocks of one zoom level, addressed by block coordinates.
#[derive(Default)]
pub struct BlockGrid {
    blocks: HashMap<(u32, u32), BlockData>,
}

impl BlockGrid {
    pub fn new() -> Self {
        BlockGrid::default()
    }

    pub fn insert(&mut self, data: BlockData) {
        self.blocks
            .insert((data.block.column, data.block.row), data);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Exact stats over the [x_min, x_min+size) x [y_min, y_min+size) square
    /// of tile space. Intersects every overlapping block's own tile bounds
    /// with the query square and accumulates all tiles with length > 0.
    /// Returns zeroed stats when no block overlaps.
    pub fn collect_stats(&self, x_min: u64, y_min: u64, size: u64) -> RegionStats {
        let x_max = x_min + size;
        let y_max = y_min + size;

        let bx_min = x_min >> BLOCK_SHIFT;
        let bx_max = (x_max - 1) >> BLOCK_SHIFT;
        let by_min = y_min >> BLOCK_SHIFT;
        let by_max = (y_max - 1) >> BLOCK_SHIFT;

        let mut stats = RegionStats::default();

        for bx in bx_min..=bx_max {
            for by in by_min..=by_max {
                let Some(data) = self.blocks.get(&(bx as u32, by as u32)) else {
                    continue;
                };
                let block = &data.block;

                // Intersection of the query square with the block's own
                // bounds, in block-local tile coordinates.
                let tile_x_min = (x_min as i64 - bx as i64 * BLOCK_SPAN).max(block.col_min as i64);
                let tile_x_max =
                    (x_max as i64 - 1 - bx as i64 * BLOCK_SPAN).min(block.col_max as i64);
                let tile_y_min = (y_min as i64 - by as i64 * BLOCK_SPAN).max(block.row_min as i64);
                let tile_y_max =
                    (y_max as i64 - 1 - by as i64 * BLOCK_SPAN).min(block.row_max as i64);

                if tile_x_min > tile_x_max || tile_y_min > tile_y_max {
                    continue;
                }

                let cols = (block.col_max - block.col_min + 1) as i64;

                for ty in tile_y_min..=tile_y_max {
                    for tx in tile_x_min..=tile_x_max {
                        let index =
                            ((ty - block.row_min as i64) * cols + (tx - block.col_min as i64))
                                as usize;
                        let length = data.lengths.lengths[index];
                        if length > 0 {
                            stats.record(length);
                        }
                    }
                }
            }
        }

        stats
    }
}
