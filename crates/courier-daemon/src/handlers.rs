//! RPC method handlers and the dispatch table.
//!
//! Every session-gated handler resolves the session first and returns the
//! `NOT_AUTHENTICATED` error immediately when there is none; the provider is
//! never touched on that path.

use crate::protocol::{Request, RequestId, Response, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND};
use crate::rpc::error::{provider_error_to_rpc_error, session_error_to_rpc_error};
use crate::rpc::RpcContext;
use crate::rpc_helpers::{optional_u64_arg, require_str_arg, require_typed_arg, require_u64_arg};
use base64::Engine as _;
use courier_core::credentials::Credentials;
use courier_core::model::OutgoingAttachment;
use courier_core::provider::ProviderError;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, warn};

/// Resolve the live session or short-circuit with `NOT_AUTHENTICATED`.
macro_rules! require_session {
    ($req:expr, $ctx:expr) => {
        match $ctx.sessions.handle().await {
            Ok(handle) => handle,
            Err(e) => return Response::failure($req.id, session_error_to_rpc_error(e)),
        }
    };
}

pub async fn dispatch(ctx: &RpcContext, req: Request) -> Response {
    debug!(method = %req.method, "rpc request");

    match req.method.as_str() {
        "ping" => handle_ping(req).await,
        "authenticate" => handle_authenticate(req, ctx).await,
        "my_fbid" => handle_my_fbid(req, ctx).await,
        "user_info" => handle_user_info(req, ctx).await,
        "message" => handle_message(req, ctx).await,
        "attachment" => handle_attachment(req, ctx).await,
        "search" => handle_search(req, ctx).await,
        "history" => handle_history(req, ctx).await,
        _ => {
            warn!("unknown RPC method: {:?}", req.method);
            Response::error(
                req.id,
                METHOD_NOT_FOUND,
                format!("Unknown method: {}", req.method),
            )
        }
    }
}

/// Log internal error details and return a generic error message.
fn internal_error(req_id: Option<RequestId>, err: impl std::fmt::Display) -> Response {
    error!("Internal error: {}", err);
    Response::error(req_id, INTERNAL_ERROR, "Internal server error")
}

/// Serialize a payload into the success slot.
fn success_json<T: Serialize>(req_id: Option<RequestId>, payload: &T) -> Response {
    match serde_json::to_value(payload) {
        Ok(value) => Response::success(req_id, value),
        Err(e) => internal_error(req_id, e),
    }
}

async fn handle_ping(req: Request) -> Response {
    let echo = req
        .args()
        .first()
        .and_then(|v| v.as_str())
        .unwrap_or("pong")
        .to_string();
    Response::success(req.id, echo)
}

async fn handle_authenticate(req: Request, ctx: &RpcContext) -> Response {
    let credentials = require_typed_arg!(req, 0, Credentials, "credentials");

    match ctx.sessions.authenticate(&credentials).await {
        Ok(handle) => Response::success(
            req.id,
            json!({ "status": "Login success", "user_id": handle.user_id() }),
        ),
        Err(e) => Response::failure(req.id, session_error_to_rpc_error(e)),
    }
}

async fn handle_my_fbid(req: Request, ctx: &RpcContext) -> Response {
    let handle = require_session!(req, ctx);
    Response::success(req.id, handle.user_id())
}

async fn handle_user_info(req: Request, ctx: &RpcContext) -> Response {
    let fbid = require_str_arg!(req, 0, "fbid");
    let handle = require_session!(req, ctx);

    match handle.user_info(&[fbid.to_string()]).await {
        Ok(mut profiles) => match profiles.remove(fbid) {
            Some(user) => success_json(req.id, &user),
            None => {
                let error = provider_error_to_rpc_error(ProviderError::UnknownUser(fbid.to_string()));
                Response::failure(req.id, error)
            }
        },
        Err(e) => Response::failure(req.id, provider_error_to_rpc_error(e)),
    }
}

async fn handle_message(req: Request, ctx: &RpcContext) -> Response {
    let body = require_str_arg!(req, 0, "message");
    let thread_id = require_str_arg!(req, 1, "thread_id");
    let handle = require_session!(req, ctx);

    match handle.send_message(body, thread_id).await {
        Ok(ack) => success_json(req.id, &ack),
        Err(e) => Response::failure(req.id, provider_error_to_rpc_error(e)),
    }
}

async fn handle_attachment(req: Request, ctx: &RpcContext) -> Response {
    let encoded = require_str_arg!(req, 0, "attachment");
    let thread_id = require_str_arg!(req, 1, "thread_id");
    let handle = require_session!(req, ctx);

    let data = match base64::engine::general_purpose::STANDARD.decode(encoded) {
        Ok(data) => data,
        Err(e) => {
            return Response::error(
                req.id,
                INVALID_PARAMS,
                format!("'attachment' argument is not valid base64: {e}"),
            )
        }
    };

    match handle
        .send_attachment(OutgoingAttachment::new(data), thread_id)
        .await
    {
        Ok(ack) => success_json(req.id, &ack),
        Err(e) => Response::failure(req.id, provider_error_to_rpc_error(e)),
    }
}

async fn handle_search(req: Request, ctx: &RpcContext) -> Response {
    let query = require_str_arg!(req, 0, "query");
    let handle = require_session!(req, ctx);

    match handle.search_threads(query).await {
        Ok(matches) => success_json(req.id, &matches),
        Err(e) => Response::failure(req.id, provider_error_to_rpc_error(e)),
    }
}

async fn handle_history(req: Request, ctx: &RpcContext) -> Response {
    let thread_id = require_str_arg!(req, 0, "thread_id");
    let amount = require_u64_arg!(req, 1, "amount");
    let before = optional_u64_arg!(req, 2);
    let handle = require_session!(req, ctx);

    match handle.thread_history(thread_id, amount, before).await {
        Ok(messages) => success_json(req.id, &messages),
        Err(e) => Response::failure(req.id, provider_error_to_rpc_error(e)),
    }
}
