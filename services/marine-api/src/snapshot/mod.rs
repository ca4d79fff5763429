//! Snapshot backend: station directories and wave models read from exported
//! JSON files.
//!
//! Layout of the data directory:
//!
//! ```text
//! buoys.json          buoy station records
//! tides.json          tide station records
//! models/<name>.json  one wave model run per file
//! ```

mod model;
mod station;

pub use model::SnapshotModel;
pub use station::{SnapshotDirectory, SnapshotStation};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

/// All collaborators backed by one data directory.
pub struct SnapshotBackend {
    pub root: PathBuf,
    pub buoys: Arc<SnapshotDirectory>,
    pub tide_stations: Arc<SnapshotDirectory>,
    pub models: Vec<Arc<SnapshotModel>>,
}

impl SnapshotBackend {
    /// Open the directories and load the wave models under `root`.
    ///
    /// Station files are read lazily on first use.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            tracing::warn!(
                "Snapshot directory {:?} does not exist; station lookups will report upstream failures",
                root
            );
        }

        let models = SnapshotModel::load_dir(root.join("models"))?
            .into_iter()
            .map(Arc::new)
            .collect();

        Ok(Self {
            buoys: Arc::new(SnapshotDirectory::new(root.join("buoys.json"), "buoy")),
            tide_stations: Arc::new(SnapshotDirectory::new(root.join("tides.json"), "tide")),
            models,
            root,
        })
    }
}
