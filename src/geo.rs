use anyhow::{Context, Result};

use crate::estimate::TileRect;

/// Tile column for a longitude at the given zoom, Web-Mercator slippy-tile
/// convention. Returns a signed index so callers can widen the result by a
/// border margin before clamping to the grid.
pub fn lon_to_tile_x(lon: f64, zoom: u8) -> i64 {
    (((lon + 180.0) / 360.0) * (1u64 << zoom) as f64).floor() as i64
}

/// Tile row for a latitude at the given zoom. Higher latitude maps to a
/// smaller row. Only meaningful well inside the Mercator domain (roughly
/// within ±85.05 degrees).
pub fn lat_to_tile_y(lat: f64, zoom: u8) -> i64 {
    let lat_rad = lat.to_radians();
    ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
        * (1u64 << zoom) as f64)
        .floor() as i64
}

/// Geographic bounding box in degrees, west/south/east/north order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self> {
        let bbox = GeoBBox {
            west,
            south,
            east,
            north,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Parses a `west,south,east,north` string as produced by most bbox
    /// pickers, rejecting malformed or non-finite coordinates.
    pub fn parse(value: &str) -> Result<Self> {
        let parts = value.trim().split(',').collect::<Vec<_>>();
        if parts.len() != 4 {
            anyhow::bail!("bbox must be in west,south,east,north format");
        }
        let west: f64 = parts[0].trim().parse().context("invalid bbox west")?;
        let south: f64 = parts[1].trim().parse().context("invalid bbox south")?;
        let east: f64 = parts[2].trim().parse().context("invalid bbox east")?;
        let north: f64 = parts[3].trim().parse().context("invalid bbox north")?;
        GeoBBox::new(west, south, east, north)
    }

    fn validate(&self) -> Result<()> {
        let values = [self.west, self.south, self.east, self.north];
        if values.iter().any(|v| !v.is_finite()) {
            anyhow::bail!("bbox coordinates must be finite");
        }
        if self.west >= self.east {
            anyhow::bail!("bbox west must be less than east");
        }
        if self.south >= self.north {
            anyhow::bail!("bbox south must be less than north");
        }
        if self.west < -180.0 || self.east > 180.0 {
            anyhow::bail!("bbox longitudes must be within [-180, 180]");
        }
        if self.south < -90.0 || self.north > 90.0 {
            anyhow::bail!("bbox latitudes must be within [-90, 90]");
        }
        Ok(())
    }

    /// Converts the bbox to a half-open tile rectangle at the given zoom,
    /// widened by `border` tiles on every side and clamped to the grid.
    pub fn tile_rect(&self, zoom: u8, border: i64) -> TileRect {
        let grid_max = (1i64 << zoom) - 1;
        let x_min = (lon_to_tile_x(self.west, zoom) - border).clamp(0, grid_max);
        let x_max = (lon_to_tile_x(self.east, zoom) + border).clamp(0, grid_max);
        let y_min = (lat_to_tile_y(self.north, zoom) - border).clamp(0, grid_max);
        let y_max = (lat_to_tile_y(self.south, zoom) + border).clamp(0, grid_max);
        TileRect {
            x_min: x_min as u64,
            y_min: y_min as u64,
            x_max: (x_max + 1) as u64,
            y_max: (y_max + 1) as u64,
        }
    }
}
