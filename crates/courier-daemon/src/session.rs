//! Process-wide session holder.
//!
//! At most one authenticated platform session exists per process. The holder
//! guards the slot with a `RwLock`: authentication takes the write lock for
//! the whole login exchange, so racing `authenticate` calls serialize and
//! exactly one can ever reach the provider. There is no logout; the slot is
//! cleared only by process restart.

use crate::snapshot::{SnapshotError, SnapshotStore};
use courier_core::credentials::Credentials;
use courier_core::provider::{ChatHandle, ChatProvider, ProviderError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("already authenticated")]
    AlreadyAuthenticated,

    #[error("login failed: {0}")]
    LoginFailed(#[source] ProviderError),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("failed to persist session snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
}

pub struct SessionHolder {
    provider: Arc<dyn ChatProvider>,
    snapshots: Arc<dyn SnapshotStore>,
    current: RwLock<Option<Arc<dyn ChatHandle>>>,
}

impl SessionHolder {
    pub fn new(provider: Arc<dyn ChatProvider>, snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self {
            provider,
            snapshots,
            current: RwLock::new(None),
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Create the one session this process will ever hold.
    ///
    /// The write lock spans the provider login and the snapshot write, so a
    /// second caller waits and then observes the stored session instead of
    /// issuing a duplicate login. The snapshot is persisted before the
    /// session becomes visible; a failed write leaves the holder
    /// unauthenticated so the operation can be retried.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn ChatHandle>, SessionError> {
        let mut slot = self.current.write().await;
        if slot.is_some() {
            return Err(SessionError::AlreadyAuthenticated);
        }

        let handle = self
            .provider
            .login(credentials)
            .await
            .map_err(SessionError::LoginFailed)?;
        self.snapshots.persist(&handle.app_state()).await?;

        info!(user_id = %handle.user_id(), "session established");
        *slot = Some(handle.clone());
        Ok(handle)
    }

    /// The live session, or `NotAuthenticated`.
    ///
    /// Callers get a clone of the `Arc`, so a slow platform call never holds
    /// the lock.
    pub async fn handle(&self) -> Result<Arc<dyn ChatHandle>, SessionError> {
        self.current
            .read()
            .await
            .clone()
            .ok_or(SessionError::NotAuthenticated)
    }
}
