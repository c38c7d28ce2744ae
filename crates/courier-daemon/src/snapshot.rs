//! Durable session snapshot persistence.
//!
//! The snapshot is written once per successful authentication and never read
//! back by the daemon; it exists so an operator can reuse the platform
//! session elsewhere. Writes go through a temp file in the target directory
//! followed by a rename, so a crash mid-write can never leave a torn file.

use async_trait::async_trait;
use courier_core::model::AppState;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Format version of the on-disk envelope.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct SnapshotEnvelope<'a> {
    version: u32,
    state: &'a AppState,
}

/// Storage backend for session snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn persist(&self, state: &AppState) -> Result<(), SnapshotError>;
}

/// File-backed store writing a versioned JSON envelope.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut os = self.path.as_os_str().to_owned();
        os.push(".tmp");
        PathBuf::from(os)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn persist(&self, state: &AppState) -> Result<(), SnapshotError> {
        let json = serde_json::to_vec_pretty(&SnapshotEnvelope {
            version: SNAPSHOT_VERSION,
            state,
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| SnapshotError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|source| SnapshotError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| SnapshotError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }
}
