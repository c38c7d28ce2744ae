//! Conversions from domain errors to JSON-RPC error objects.
//!
//! The messages keep the wording callers of the original service knew
//! ("Login first", "Already logged in"), but they travel on the error
//! channel with distinct codes instead of masquerading as results.
//! Internal causes are logged here and never leaked to the caller.

use crate::protocol::{
    RpcError, ALREADY_AUTHENTICATED, INTERNAL_ERROR, INVALID_PARAMS, LOGIN_FAILED,
    NOT_AUTHENTICATED, UPSTREAM_ERROR,
};
use crate::session::SessionError;
use courier_core::provider::ProviderError;

pub fn session_error_to_rpc_error(e: SessionError) -> RpcError {
    use SessionError::*;
    match e {
        AlreadyAuthenticated => RpcError {
            code: ALREADY_AUTHENTICATED,
            message: "Already logged in".into(),
            data: None,
        },
        NotAuthenticated => RpcError {
            code: NOT_AUTHENTICATED,
            message: "Login first".into(),
            data: None,
        },
        LoginFailed(cause) => {
            tracing::debug!("login rejected: {cause}");
            RpcError {
                code: LOGIN_FAILED,
                message: "Login failed".into(),
                data: None,
            }
        }
        Snapshot(cause) => {
            tracing::error!("snapshot persistence failed: {cause}");
            RpcError {
                code: INTERNAL_ERROR,
                message: "Internal server error".into(),
                data: None,
            }
        }
    }
}

pub fn provider_error_to_rpc_error(e: ProviderError) -> RpcError {
    use ProviderError::*;
    match e {
        UnknownUser(id) => RpcError {
            code: INVALID_PARAMS,
            message: format!("No such user: {id}"),
            data: None,
        },
        other => {
            tracing::error!("upstream provider error: {other}");
            RpcError {
                code: UPSTREAM_ERROR,
                message: "Upstream platform error".into(),
                data: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_map_to_app_codes() {
        let err = session_error_to_rpc_error(SessionError::NotAuthenticated);
        assert_eq!(err.code, NOT_AUTHENTICATED);
        assert_eq!(err.message, "Login first");

        let err = session_error_to_rpc_error(SessionError::AlreadyAuthenticated);
        assert_eq!(err.code, ALREADY_AUTHENTICATED);

        let err = session_error_to_rpc_error(SessionError::LoginFailed(
            ProviderError::LoginRejected("bad credentials".into()),
        ));
        assert_eq!(err.code, LOGIN_FAILED);
        // The cause stays server-side.
        assert!(!err.message.contains("bad credentials"));
    }

    #[test]
    fn unknown_user_is_a_params_error() {
        let err = provider_error_to_rpc_error(ProviderError::UnknownUser("42".into()));
        assert_eq!(err.code, INVALID_PARAMS);
        assert!(err.message.contains("42"));
    }

    #[test]
    fn other_provider_errors_are_upstream_errors() {
        let err = provider_error_to_rpc_error(ProviderError::Network("timeout".into()));
        assert_eq!(err.code, UPSTREAM_ERROR);
        assert!(!err.message.contains("timeout"));
    }
}
