//! Capability abstraction over the chat platform.
//!
//! The daemon only ever talks to these traits. `ChatProvider` performs the
//! login; the returned `ChatHandle` carries the authenticated session and
//! exposes the handful of operations the RPC surface forwards to.

use crate::credentials::Credentials;
use crate::model::{AppState, Message, MessageAck, OutgoingAttachment, ThreadMatch, User};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failures surfaced by a chat platform implementation.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("login rejected by platform: {0}")]
    LoginRejected(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed platform response: {0}")]
    MalformedResponse(String),

    #[error("no such user: {0}")]
    UnknownUser(String),

    #[error("attachment upload failed: {0}")]
    UploadFailed(String),

    #[error("platform error {code}: {message}")]
    Platform { code: u64, message: String },
}

/// Entry point into the platform: exchanges credentials for a live session.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ProviderResult<Arc<dyn ChatHandle>>;
}

/// An authenticated platform session.
///
/// Handles are shared across concurrently dispatched requests, so every
/// operation takes `&self`.
#[async_trait]
pub trait ChatHandle: Send + Sync + std::fmt::Debug {
    /// The platform identity this session is logged in as.
    fn user_id(&self) -> &str;

    /// Serializable snapshot of the session, captured at login time.
    fn app_state(&self) -> AppState;

    /// Batch profile lookup; the result maps each requested id to its record.
    async fn user_info(&self, ids: &[String]) -> ProviderResult<HashMap<String, User>>;

    async fn send_message(&self, body: &str, thread_id: &str) -> ProviderResult<MessageAck>;

    async fn send_attachment(
        &self,
        attachment: OutgoingAttachment,
        thread_id: &str,
    ) -> ProviderResult<MessageAck>;

    async fn search_threads(&self, query: &str) -> ProviderResult<Vec<ThreadMatch>>;

    /// Fetch up to `amount` messages from a thread, optionally only those
    /// before `before` (milliseconds since the epoch).
    async fn thread_history(
        &self,
        thread_id: &str,
        amount: u64,
        before: Option<u64>,
    ) -> ProviderResult<Vec<Message>>;
}
