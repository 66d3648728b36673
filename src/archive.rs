use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, params};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub zoom_min: u8,
    pub zoom_max: u8,
}

/// One rectangular block of contiguous tiles at a single zoom level.
/// `column`/`row` address the block in the 2^z/256 block grid; the
/// `col_*`/`row_*` bounds are block-local (0..=255) and describe the tiles
/// the block actually covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDefinition {
    pub level: u8,
    pub column: u32,
    pub row: u32,
    pub col_min: u32,
    pub col_max: u32,
    pub row_min: u32,
    pub row_max: u32,
}

/// Per-tile byte lengths of one block, row-major over the block's bounds.
/// A length of 0 means the tile does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLengths {
    pub lengths: Vec<u64>,
}

/// Source of per-tile byte-length metadata for the index builder.
///
/// Implementations must be shareable across the fetch workers; fetching a
/// block's tile index is an independent operation.
pub trait TileArchive: Sync {
    fn header(&self) -> Result<ArchiveHeader>;
    fn block_index(&self) -> Result<Vec<BlockDefinition>>;
    fn tile_index(&self, block: &BlockDefinition) -> Result<TileLengths>;
}

/// MBTiles-backed archive. Only tile byte lengths are read; tile payloads
/// are never decoded. MBTiles stores rows in TMS order, so rows are flipped
/// to the XYZ convention used by the tile grid.
#[derive(Debug)]
pub struct MbtilesArchive {
    path: PathBuf,
}

impl MbtilesArchive {
    pub fn open(path: &Path) -> Result<Self> {
        ensure_mbtiles_path(path)?;
        let archive = MbtilesArchive {
            path: path.to_path_buf(),
        };
        // Fail fast on unreadable files instead of inside the worker pool.
        archive.connect()?;
        Ok(archive)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("failed to open mbtiles: {}", self.path.display()))?;
        apply_read_pragmas(&conn)?;
        Ok(conn)
    }
}

impl TileArchive for MbtilesArchive {
    fn header(&self) -> Result<ArchiveHeader> {
        let conn = self.connect()?;
        let (zoom_min, zoom_max): (Option<u8>, Option<u8>) = conn
            .query_row(
                "SELECT MIN(zoom_level), MAX(zoom_level) FROM tiles",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .context("failed to read zoom range")?;
        match (zoom_min, zoom_max) {
            (Some(zoom_min), Some(zoom_max)) => Ok(ArchiveHeader { zoom_min, zoom_max }),
            _ => anyhow::bail!("mbtiles contains no tiles: {}", self.path.display()),
        }
    }

    fn block_index(&self) -> Result<Vec<BlockDefinition>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "
                SELECT zoom_level,
                       tile_column / 256 AS block_column,
                       ((1 << zoom_level) - 1 - tile_row) / 256 AS block_row,
                       MIN(tile_column % 256),
                       MAX(tile_column % 256),
                       MIN(((1 << zoom_level) - 1 - tile_row) % 256),
                       MAX(((1 << zoom_level) - 1 - tile_row) % 256)
                FROM tiles
                GROUP BY zoom_level, block_column, block_row
                ORDER BY zoom_level, block_column, block_row
                ",
            )
            .context("prepare block index scan")?;
        let mut rows = stmt.query([]).context("query block index")?;

        let mut blocks = Vec::new();
        while let Some(row) = rows.next().context("read block index row")? {
            blocks.push(BlockDefinition {
                level: row.get(0)?,
                column: row.get(1)?,
                row: row.get(2)?,
                col_min: row.get(3)?,
                col_max: row.get(4)?,
                row_min: row.get(5)?,
                row_max: row.get(6)?,
            });
        }
        Ok(blocks)
    }

    fn tile_index(&self, block: &BlockDefinition) -> Result<TileLengths> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "
                SELECT tile_column % 256,
                       ((1 << zoom_level) - 1 - tile_row) % 256,
                       LENGTH(tile_data)
                FROM tiles
                WHERE zoom_level = ?1
                  AND tile_column / 256 = ?2
                  AND ((1 << zoom_level) - 1 - tile_row) / 256 = ?3
                ",
            )
            .context("prepare tile index scan")?;
        let mut rows = stmt
            .query(params![block.level, block.column, block.row])
            .context("query tile index")?;

        let cols = (block.col_max - block.col_min + 1) as usize;
        let tile_rows = (block.row_max - block.row_min + 1) as usize;
        let mut lengths = vec![0u64; cols * tile_rows];
        while let Some(row) = rows.next().context("read tile index row")? {
            let tx: u32 = row.get(0)?;
            let ty: u32 = row.get(1)?;
            let length: i64 = row.get(2)?;
            let length = length as u64;
            if tx < block.col_min || tx > block.col_max || ty < block.row_min || ty > block.row_max
            {
                anyhow::bail!(
                    "tile ({tx}, {ty}) outside block bounds of block ({}, {}) at zoom {}",
                    block.column,
                    block.row,
                    block.level
                );
            }
            let index = (ty - block.row_min) as usize * cols + (tx - block.col_min) as usize;
            lengths[index] = length;
        }
        Ok(TileLengths { lengths })
    }
}

fn ensure_mbtiles_path(path: &Path) -> Result<()> {
    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    if ext.eq_ignore_ascii_case("mbtiles") {
        Ok(())
    } else {
        anyhow::bail!("input must be an .mbtiles path: {}", path.display());
    }
}

fn apply_read_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA query_only = ON;
        PRAGMA temp_store = MEMORY;
        PRAGMA synchronous = OFF;
        PRAGMA cache_size = -200000;
        ",
    )
    .context("failed to apply read pragmas")?;
    Ok(())
}
