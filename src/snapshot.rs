//! On-disk snapshot: an engine blob plus the id -> record mapping
//!
//! ```text
//! <snapshot_dir>/
//!   index.bin      engine state (opaque, versioned by its magic)
//!   records.json   { format_version, dim, index_sha256, records: [[id, record], ...] }
//! ```
//!
//! Each artifact is replaced atomically (temp file, fsync, rename, fsync dir).
//! `index.bin` is written first and `records.json` records its digest, so a
//! pair left behind by an interrupted write is detected on the next read.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use quiver_core::IndexEngine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, StoreError};
use crate::records::RecordMap;

pub const INDEX_FILE: &str = "index.bin";
pub const RECORDS_FILE: &str = "records.json";

/// Version of the `records.json` layout
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct RecordsFileRef<'a, R> {
    format_version: u32,
    dim: usize,
    index_sha256: String,
    records: Vec<(u64, &'a R)>,
}

#[derive(Deserialize)]
struct RecordsFile<R> {
    format_version: u32,
    dim: usize,
    index_sha256: String,
    records: Vec<(u64, R)>,
}

/// Artifact locations for one snapshot directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    pub dir: PathBuf,
    pub index: PathBuf,
    pub records: PathBuf,
}

impl SnapshotPaths {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            index: dir.join(INDEX_FILE),
            records: dir.join(RECORDS_FILE),
            dir,
        }
    }

    pub fn exists(&self) -> bool {
        self.index.is_file() && self.records.is_file()
    }
}

/// True when both artifacts are present under `dir`.
pub fn exists(dir: impl AsRef<Path>) -> bool {
    SnapshotPaths::new(dir).exists()
}

/// A snapshot read back from disk, already cross-checked.
pub struct Snapshot<E, R> {
    pub dim: usize,
    pub engine: E,
    pub records: RecordMap<R>,
}

/// Write `engine` and `records` under `dir`, creating it if needed.
pub fn write<E, R>(dir: &Path, dim: usize, engine: &E, records: &RecordMap<R>) -> Result<()>
where
    E: IndexEngine,
    R: Serialize,
{
    let paths = SnapshotPaths::new(dir);
    fs::create_dir_all(&paths.dir).map_err(|e| StoreError::persistence(&paths.dir, e))?;

    let blob = engine.export_state();
    let file = RecordsFileRef {
        format_version: FORMAT_VERSION,
        dim,
        index_sha256: sha256_hex(&blob),
        records: records.iter().map(|(&id, r)| (id, r)).collect(),
    };
    let json = serde_json::to_vec(&file)
        .map_err(|e| StoreError::persistence(&paths.records, io::Error::other(e)))?;

    write_atomic(&paths.index, &blob)?;
    write_atomic(&paths.records, &json)?;
    sync_dir(&paths.dir).map_err(|e| StoreError::persistence(&paths.dir, e))?;

    tracing::debug!(
        "wrote snapshot {:?}: {} records, {} index bytes",
        paths.dir,
        records.len(),
        blob.len()
    );
    Ok(())
}

/// Read and validate the snapshot under `dir`. Never creates anything.
pub fn read<E, R>(dir: &Path) -> Result<Snapshot<E, R>>
where
    E: IndexEngine,
    R: DeserializeOwned,
{
    let paths = SnapshotPaths::new(dir);
    let not_found = || StoreError::SnapshotNotFound {
        path: paths.dir.clone(),
    };
    if !paths.exists() {
        return Err(not_found());
    }

    let read = |path: &Path| {
        fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => not_found(),
            _ => StoreError::persistence(path, e),
        })
    };
    let blob = read(&paths.index)?;
    let json = read(&paths.records)?;

    let file: RecordsFile<R> =
        serde_json::from_slice(&json).map_err(|e| StoreError::corrupt(&paths.records, e))?;
    if file.format_version != FORMAT_VERSION {
        return Err(StoreError::corrupt(
            &paths.records,
            format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                file.format_version
            ),
        ));
    }
    if file.index_sha256 != sha256_hex(&blob) {
        return Err(StoreError::InconsistentState(format!(
            "{} does not match the digest recorded in {}",
            paths.index.display(),
            paths.records.display()
        )));
    }

    let engine = E::import_state(&blob).map_err(|e| StoreError::corrupt(&paths.index, e))?;
    if engine.dim() != file.dim {
        return Err(StoreError::InconsistentState(format!(
            "index dimension {} differs from recorded dimension {}",
            engine.dim(),
            file.dim
        )));
    }

    let count = file.records.len();
    let records: RecordMap<R> = file.records.into_iter().collect();
    if records.len() != count {
        return Err(StoreError::corrupt(&paths.records, "duplicate record ids"));
    }

    if engine.len() != records.len() || records.ids().any(|id| !engine.contains(id)) {
        return Err(StoreError::InconsistentState(format!(
            "index holds {} ids, mapping holds {}, and they differ",
            engine.len(),
            records.len()
        )));
    }

    Ok(Snapshot {
        dim: file.dim,
        engine,
        records,
    })
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let result = (|| -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::persistence(path, e));
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest.iter() {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

fn sync_dir(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        File::open(path)?.sync_all()?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
