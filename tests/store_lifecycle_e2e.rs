use std::path::Path;

use quiver_db::{EngineConfig, StoreConfig, StoreError, VectorStore};
use tempfile::tempdir;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

fn config(dir: &Path) -> StoreConfig {
    StoreConfig::default().with_snapshot_dir(dir)
}

fn items(pairs: &[(&str, [f32; 3])]) -> Vec<(String, Vec<f32>)> {
    pairs
        .iter()
        .map(|(name, v)| (name.to_string(), v.to_vec()))
        .collect()
}

#[test]
fn test_three_dimensional_walkthrough() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("vector_store");

    let mut store: VectorStore = VectorStore::new(3, config(&path)).unwrap();
    store
        .create(
            items(&[
                ("a", [1.0, 0.0, 0.0]),
                ("b", [0.0, 1.0, 0.0]),
                ("c", [0.0, 0.0, 1.0]),
            ]),
            true,
        )
        .unwrap();
    assert!(quiver_db::snapshot::exists(&path));

    let hits = store.get_similar(&[1.0, 0.0, 0.0], 1, &path).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, "a");
    assert!(hits[0].1.abs() < 1e-5, "distance {}", hits[0].1);

    let ids = store
        .update(items(&[("d", [1.0, 0.0, 0.01])]), &path)
        .unwrap();
    assert_eq!(ids, vec![3]);

    let hits = store.get_similar(&[1.0, 0.0, 0.0], 2, &path).unwrap();
    let names: Vec<&str> = hits.iter().map(|(r, _)| r.as_str()).collect();
    assert_eq!(names, vec!["a", "d"]);
    assert!(hits[0].1 <= hits[1].1);
}

#[test]
fn test_identifiers_continue_across_instances() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("store");

    let mut first: VectorStore = VectorStore::new(3, config(&path)).unwrap();
    let initial: Vec<(String, Vec<f32>)> = (0..5)
        .map(|i| (format!("r{i}"), vec![i as f32 + 1.0, 1.0, 0.5]))
        .collect();
    assert_eq!(first.create(initial, true).unwrap(), vec![0, 1, 2, 3, 4]);
    drop(first);

    // A fresh process: empty store, cursor at 0 until the snapshot is reloaded.
    let mut second: VectorStore = VectorStore::new(3, config(&path)).unwrap();
    assert_eq!(second.next_id(), 0);
    let more: Vec<(String, Vec<f32>)> = (0..3)
        .map(|i| (format!("s{i}"), vec![0.5, i as f32, 1.0]))
        .collect();
    let ids = second.update(more, &path).unwrap();
    assert_eq!(ids, vec![5, 6, 7]);
    assert_eq!(second.next_id(), 8);

    let reopened: VectorStore = VectorStore::load(&path, config(&path)).unwrap();
    assert_eq!(reopened.len(), 8);
    assert_eq!(reopened.record(0).map(String::as_str), Some("r0"));
    assert_eq!(reopened.record(7).map(String::as_str), Some("s2"));
}

#[test]
fn test_duplicate_records_get_distinct_ids() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store");
    let mut store: VectorStore = VectorStore::new(3, config(&path)).unwrap();

    let ids = store
        .create(
            items(&[("same", [1.0, 0.0, 0.0]), ("same", [0.0, 1.0, 0.0])]),
            true,
        )
        .unwrap();
    assert_eq!(ids, vec![0, 1]);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_roundtrip_preserves_mapping_and_answers() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("store");
    let engine = EngineConfig::default()
        .with_m(16)
        .with_ef_construction(100)
        .with_ef_search(100)
        .with_seed(9);
    let cfg = config(&path).with_engine(engine);

    let mut store: VectorStore = VectorStore::new(8, cfg.clone()).unwrap();
    let batch: Vec<(String, Vec<f32>)> = (0..200)
        .map(|i| {
            let v = (0..8).map(|d| ((i * 7 + d * 13) % 17) as f32 - 8.0).collect();
            (format!("item-{i}"), v)
        })
        .collect();
    store.create(batch.clone(), true).unwrap();

    let reloaded: VectorStore = VectorStore::load(&path, cfg).unwrap();
    assert_eq!(reloaded.records(), store.records());
    for (_, v) in batch.iter().step_by(17) {
        assert_eq!(
            store.search(v, 5).unwrap(),
            reloaded.search(v, 5).unwrap()
        );
    }
}

#[test]
fn test_missing_snapshot_writes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("never_created");
    let mut store: VectorStore = VectorStore::new(3, config(&path)).unwrap();

    let err = store
        .update(items(&[("x", [1.0, 0.0, 0.0])]), &path)
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::SnapshotNotFound { .. }));

    let err = store.get_similar(&[1.0, 0.0, 0.0], 1, &path).err().unwrap();
    assert!(matches!(err, StoreError::SnapshotNotFound { .. }));

    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert!(store.is_empty());
}

#[test]
fn test_half_present_snapshot_is_absent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store");
    let mut store: VectorStore = VectorStore::new(3, config(&path)).unwrap();
    store.create(items(&[("a", [1.0, 0.0, 0.0])]), true).unwrap();

    std::fs::remove_file(path.join(quiver_db::snapshot::INDEX_FILE)).unwrap();
    let err = store.get_similar(&[1.0, 0.0, 0.0], 1, &path).err().unwrap();
    assert!(matches!(err, StoreError::SnapshotNotFound { .. }));
}

#[test]
fn test_fewer_results_than_requested_are_not_padded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store");
    let mut store: VectorStore = VectorStore::new(3, config(&path)).unwrap();
    store
        .create(items(&[("a", [1.0, 0.0, 0.0]), ("b", [0.0, 1.0, 0.0])]), true)
        .unwrap();

    let hits = store.get_similar(&[0.0, 1.0, 0.0], 10, &path).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].0, "b");
}

#[test]
fn test_update_respects_reloaded_capacity() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store");
    let cfg = config(&path).with_engine(EngineConfig::default().with_max_elements(3));
    let mut store: VectorStore = VectorStore::new(3, cfg).unwrap();
    store
        .create(items(&[("a", [1.0, 0.0, 0.0]), ("b", [0.0, 1.0, 0.0])]), true)
        .unwrap();

    let err = store
        .update(
            items(&[("c", [0.0, 0.0, 1.0]), ("d", [1.0, 1.0, 0.0])]),
            &path,
        )
        .err()
        .unwrap();
    assert!(matches!(
        err,
        StoreError::CapacityExceeded {
            capacity: 3,
            requested: 4
        }
    ));

    let snapshot_view: VectorStore = VectorStore::load(&path, StoreConfig::default()).unwrap();
    assert_eq!(snapshot_view.len(), 2);
}

#[test]
fn test_sparse_graph_returns_every_requested_record() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("store");
    let engine = EngineConfig::default()
        .with_m(2)
        .with_ef_construction(2)
        .with_ef_search(2)
        .with_seed(3);
    let cfg = config(&path).with_engine(engine);

    let mut rng = StdRng::seed_from_u64(16);
    let batch: Vec<(String, Vec<f32>)> = (0..3000)
        .map(|i| {
            let v = (0..16).map(|_| rng.gen::<f32>() - 0.5).collect();
            (format!("v{i}"), v)
        })
        .collect();
    let query = batch[42].1.clone();

    let mut store: VectorStore = VectorStore::new(16, cfg).unwrap();
    store.create(batch, true).unwrap();

    for top_n in [10, 1000, 3000] {
        let hits = store.get_similar(&query, top_n, &path).unwrap();
        assert_eq!(hits.len(), top_n);
        assert!(hits.windows(2).all(|w| w[0].1 <= w[1].1));
    }
    assert_eq!(store.get_similar(&query, 4000, &path).unwrap().len(), 3000);
}
