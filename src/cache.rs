use crate::BoxError;
use crate::dataset::Dataset;
use crate::loader::load_dataset;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Identity of an input file: where it is and what state it was in
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceId {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceId {
    pub fn of(path: impl AsRef<Path>) -> Result<Self, BoxError> {
        let path = path.as_ref();
        let canonical = path
            .canonicalize()
            .map_err(|e| format!("Cannot open {}: {}", path.display(), e))?;
        let meta = std::fs::metadata(&canonical)?;
        Ok(SourceId {
            path: canonical,
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Keeps the most recently loaded dataset for the lifetime of the process.
///
/// The entry is reused while the file's identity is unchanged and replaced
/// once the file is modified. A failed reload leaves the previous entry in
/// place.
#[derive(Default)]
pub struct DatasetCache {
    entry: Option<(SourceId, Arc<Dataset>)>,
    loads: usize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached dataset for `path`, loading it if the file is new
    /// or has changed since the last load.
    pub fn get_or_load(&mut self, path: impl AsRef<Path>) -> Result<Arc<Dataset>, BoxError> {
        let id = SourceId::of(path)?;

        if let Some((cached_id, data)) = &self.entry {
            if *cached_id == id {
                debug!("Dataset cache hit for {}", id.path.display());
                return Ok(Arc::clone(data));
            }
            info!("{} changed on disk, reloading", id.path.display());
        }

        let data = Arc::new(load_dataset(&id.path)?);
        self.loads += 1;
        self.entry = Some((id, Arc::clone(&data)));
        Ok(data)
    }

    /// Number of times a file has actually been read
    pub fn loads(&self) -> usize {
        self.loads
    }

    /// Identity of the file behind the cached dataset, if any
    pub fn source(&self) -> Option<&SourceId> {
        self.entry.as_ref().map(|(id, _)| id)
    }
}
