use tile_size_index::estimate::SizeEstimate;
use tile_size_index::output::{ndjson_lines, text_lines};

fn sample_estimates() -> Vec<SizeEstimate> {
    vec![
        SizeEstimate {
            dataset_key: "osm".to_string(),
            label: "OpenStreetMap".to_string(),
            bytes: 2048,
        },
        SizeEstimate {
            dataset_key: "sat".to_string(),
            label: "Satellite".to_string(),
            bytes: 3 * 1024 * 1024 * 1024,
        },
    ]
}

#[test]
fn text_lines_show_label_and_bytes() {
    let lines = text_lines(&sample_estimates());
    assert_eq!(
        lines,
        vec![
            "OpenStreetMap: 2.0 KB (2048 bytes)".to_string(),
            "Satellite: 3.00 GB (3221225472 bytes)".to_string(),
        ]
    );
}

#[test]
fn ndjson_lines_parse_back() {
    let lines = ndjson_lines(&sample_estimates()).expect("lines");
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(&lines[0]).expect("json");
    assert_eq!(first["type"], "size_estimate");
    assert_eq!(first["estimate"]["dataset_key"], "osm");
    assert_eq!(first["estimate"]["label"], "OpenStreetMap");
    assert_eq!(first["estimate"]["bytes"], 2048);
}

#[test]
fn empty_estimates_render_nothing() {
    assert!(text_lines(&[]).is_empty());
    assert!(ndjson_lines(&[]).expect("lines").is_empty());
}
