//! RPC context holding shared state for handlers

use crate::session::SessionHolder;
use std::sync::Arc;
use std::time::Instant;

pub struct RpcContext {
    pub sessions: Arc<SessionHolder>,
    pub started_at: Instant,
}

impl RpcContext {
    pub fn new(sessions: Arc<SessionHolder>) -> Self {
        Self {
            sessions,
            started_at: Instant::now(),
        }
    }
}
