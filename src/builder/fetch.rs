use anyhow::Result;
use indicatif::ProgressBar;

use crate::archive::{BlockDefinition, TileArchive, TileLengths};
use crate::builder::stats::{BlockData, BlockGrid};

/// Fetches the tile index of every block through a fixed-size worker pool.
///
/// Total parallelism never exceeds `concurrency`. The first fetch error
/// aborts the whole batch: a failed fetch must never degrade into "this
/// region has no tiles". Progress advances once per completed block.
pub fn fetch_block_grid(
    archive: &dyn TileArchive,
    blocks: &[BlockDefinition],
    concurrency: usize,
    progress: &ProgressBar,
) -> Result<BlockGrid> {
    let workers = concurrency.max(1);

    std::thread::scope(|scope| {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<BlockDefinition>();
        let (result_tx, result_rx) =
            crossbeam_channel::unbounded::<Result<(BlockDefinition, TileLengths)>>();

        for block in blocks {
            let _ = job_tx.send(block.clone());
        }
        drop(job_tx);

        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for block in job_rx.iter() {
                    let result = archive.tile_index(&block).map(|lengths| (block, lengths));
                    // Receiver gone means the batch already failed.
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        let mut grid = BlockGrid::new();
        for result in result_rx.iter() {
            let (block, lengths) = result?;
            grid.insert(BlockData { block, lengths });
            progress.inc(1);
        }
        Ok(grid)
    })
}
