//! HTTP transport for the JSON-RPC dispatcher.
//!
//! One POST endpoint carries every RPC call; the body is read as text so a
//! malformed request becomes a `PARSE_ERROR` response instead of a transport
//! rejection. A health route reports liveness and authentication state.

use crate::handlers;
use crate::protocol::{Request, Response, PARSE_ERROR};
use crate::rpc::RpcContext;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use courier_config::CourierConfig;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

pub fn router(ctx: Arc<RpcContext>, max_body_size: usize) -> Router {
    Router::new()
        .route("/", post(rpc_endpoint))
        .route("/health", get(health_check))
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(max_body_size))
}

async fn rpc_endpoint(State(ctx): State<Arc<RpcContext>>, body: String) -> Json<Response> {
    let response = match serde_json::from_str::<Request>(&body) {
        Ok(req) => handlers::dispatch(&ctx, req).await,
        Err(e) => {
            warn!("Parse error: {}", e);
            Response::error(None, PARSE_ERROR, e.to_string())
        }
    };
    Json(response)
}

async fn health_check(State(ctx): State<Arc<RpcContext>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "courier-daemon",
        "authenticated": ctx.sessions.is_authenticated().await,
        "uptime_secs": ctx.started_at.elapsed().as_secs(),
    }))
}

/// Run the server until the process is stopped.
pub async fn serve(config: &CourierConfig, ctx: Arc<RpcContext>) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .bind_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen address {:?}: {e}", config.bind_addr()))?;

    info!("RPC server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router(ctx, config.server.max_payload_size as usize),
    )
    .await?;

    Ok(())
}
