use std::fs;
use std::sync::Arc;

use tile_size_index::cache::IndexCache;
use tile_size_index::index::QuadNode;

#[test]
fn load_parses_index_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("size-index-osm.json"),
        r#"{"levels":{"0":42}}"#,
    )
    .expect("write index");

    let cache = IndexCache::new();
    let index = cache.load("osm", dir.path()).expect("load");
    assert_eq!(index.levels[&0], QuadNode::Leaf(42));
}

#[test]
fn second_load_hits_the_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("size-index-osm.json");
    fs::write(&path, r#"{"levels":{"0":42}}"#).expect("write index");

    let cache = IndexCache::new();
    let first = cache.load("osm", dir.path()).expect("load");

    // The file is gone, so only the cache can satisfy this.
    fs::remove_file(&path).expect("remove");
    let second = cache.load("osm", dir.path()).expect("cached load");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn clear_drops_cached_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("size-index-osm.json");
    fs::write(&path, r#"{"levels":{"0":42}}"#).expect("write index");

    let cache = IndexCache::new();
    cache.load("osm", dir.path()).expect("load");
    fs::remove_file(&path).expect("remove");

    cache.clear();
    cache.load("osm", dir.path()).expect_err("should error");
}

#[test]
fn load_failure_names_the_dataset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = IndexCache::new();
    let err = cache.load("satellite", dir.path()).expect_err("should error");
    assert!(err.to_string().contains("satellite"));
}

#[test]
fn structural_errors_surface_at_load_time() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("size-index-bad.json"),
        r#"{"levels":{"2":[1,2,3]}}"#,
    )
    .expect("write index");

    let cache = IndexCache::new();
    let err = cache.load("bad", dir.path()).expect_err("should error");
    assert!(format!("{err:#}").contains("exactly 4 child nodes"));
}

#[test]
fn distinct_keys_are_cached_independently() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("size-index-a.json"), r#"{"levels":{"0":1}}"#)
        .expect("write index");
    fs::write(dir.path().join("size-index-b.json"), r#"{"levels":{"0":2}}"#)
        .expect("write index");

    let cache = IndexCache::new();
    let a = cache.load("a", dir.path()).expect("load a");
    let b = cache.load("b", dir.path()).expect("load b");
    assert_eq!(a.levels[&0], QuadNode::Leaf(1));
    assert_eq!(b.levels[&0], QuadNode::Leaf(2));
}
