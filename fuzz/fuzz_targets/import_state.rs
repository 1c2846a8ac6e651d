#![no_main]

use libfuzzer_sys::fuzz_target;
use quiver_core::{FlatIndex, Hnsw, IndexEngine};

fuzz_target!(|data: &[u8]| {
    if let Ok(hnsw) = Hnsw::import_state(data) {
        // anything accepted must be searchable and survive a re-encode
        let query = vec![0.5; hnsw.dim()];
        let _ = hnsw.knn_query(&query, 3);
        assert!(Hnsw::import_state(&hnsw.export_state()).is_ok());
    }
    if let Ok(flat) = FlatIndex::import_state(data) {
        let query = vec![0.5; flat.dim()];
        let _ = flat.knn_query(&query, 3);
    }
});
