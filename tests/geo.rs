use tile_size_index::estimate::TileRect;
use tile_size_index::geo::{GeoBBox, lat_to_tile_y, lon_to_tile_x};

#[test]
fn lon_to_tile_x_west_edge_is_zero() {
    for zoom in 0..=10 {
        assert_eq!(lon_to_tile_x(-180.0, zoom), 0);
    }
}

#[test]
fn lon_to_tile_x_meridian_at_zoom_one() {
    assert_eq!(lon_to_tile_x(0.0, 1), 1);
}

#[test]
fn lat_to_tile_y_equator_at_zoom_one() {
    assert_eq!(lat_to_tile_y(0.0, 1), 1);
}

#[test]
fn lat_to_tile_y_high_latitudes() {
    assert_eq!(lat_to_tile_y(85.0, 1), 0);
    assert_eq!(lat_to_tile_y(-85.0, 1), 1);
}

#[test]
fn lat_to_tile_y_decreases_northward() {
    assert!(lat_to_tile_y(60.0, 8) < lat_to_tile_y(0.0, 8));
    assert!(lat_to_tile_y(0.0, 8) < lat_to_tile_y(-60.0, 8));
}

#[test]
fn parse_bbox_valid() {
    let bbox = GeoBBox::parse("5.5, 45.0, 10.25, 47.5").expect("bbox");
    assert_eq!(
        bbox,
        GeoBBox {
            west: 5.5,
            south: 45.0,
            east: 10.25,
            north: 47.5,
        }
    );
}

#[test]
fn parse_bbox_rejects_wrong_arity() {
    let err = GeoBBox::parse("1,2,3").expect_err("should error");
    assert!(err.to_string().contains("west,south,east,north"));
}

#[test]
fn parse_bbox_rejects_non_numeric() {
    let err = GeoBBox::parse("a,2,3,4").expect_err("should error");
    assert!(err.to_string().contains("invalid bbox west"));
}

#[test]
fn parse_bbox_rejects_non_finite() {
    let err = GeoBBox::parse("NaN,0,10,10").expect_err("should error");
    assert!(err.to_string().contains("finite"));

    let err = GeoBBox::parse("0,0,inf,10").expect_err("should error");
    assert!(err.to_string().contains("finite"));
}

#[test]
fn parse_bbox_rejects_inverted_bounds() {
    let err = GeoBBox::parse("10,0,5,10").expect_err("should error");
    assert!(err.to_string().contains("west must be less than east"));

    let err = GeoBBox::parse("0,10,10,5").expect_err("should error");
    assert!(err.to_string().contains("south must be less than north"));
}

#[test]
fn parse_bbox_rejects_out_of_range() {
    let err = GeoBBox::parse("-200,0,10,10").expect_err("should error");
    assert!(err.to_string().contains("longitudes"));

    let err = GeoBBox::parse("0,-95,10,10").expect_err("should error");
    assert!(err.to_string().contains("latitudes"));
}

#[test]
fn tile_rect_expands_by_border() {
    let bbox = GeoBBox::new(-1.0, -1.0, 1.0, 1.0).expect("bbox");
    let rect = bbox.tile_rect(6, 3);
    assert_eq!(
        rect,
        TileRect {
            x_min: 28,
            y_min: 28,
            x_max: 36,
            y_max: 36,
        }
    );
}

#[test]
fn tile_rect_clamps_to_grid() {
    let bbox = GeoBBox::new(-180.0, -85.0, 179.9, 85.0).expect("bbox");
    let rect = bbox.tile_rect(2, 3);
    assert_eq!(
        rect,
        TileRect {
            x_min: 0,
            y_min: 0,
            x_max: 4,
            y_max: 4,
        }
    );
}

#[test]
fn tile_rect_upper_bound_is_exclusive() {
    let bbox = GeoBBox::new(-1.0, -1.0, 1.0, 1.0).expect("bbox");
    let rect = bbox.tile_rect(6, 0);
    // Tiles 31..=32 on both axes, exclusive upper bound.
    assert_eq!(
        rect,
        TileRect {
            x_min: 31,
            y_min: 31,
            x_max: 33,
            y_max: 33,
        }
    );
}
