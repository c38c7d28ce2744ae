//! RPC argument extraction macros
//!
//! The transport carries positional argument arrays, so every handler pulls
//! its inputs out by index. These macros return early with an
//! `INVALID_PARAMS` response when an argument is missing or mistyped,
//! instead of letting a bad call surface as a fault inside the delegate.
//!
//! They use `#[macro_export]` for availability across the crate.

/// Extract a required string argument by position.
///
/// Returns the argument as `&str`, or returns early with an error Response.
///
/// # Example
///
/// ```ignore
/// let thread_id = require_str_arg!(req, 1, "thread_id");
/// ```
#[macro_export]
macro_rules! require_str_arg {
    ($req:expr, $idx:literal, $name:literal) => {
        match $req.args().get($idx).and_then(|v| v.as_str()) {
            Some(v) => v,
            None => {
                return $crate::protocol::Response::error(
                    $req.id.clone(),
                    $crate::protocol::INVALID_PARAMS,
                    concat!(
                        "Missing or invalid '",
                        $name,
                        "' argument (position ",
                        $idx,
                        ")"
                    ),
                )
            }
        }
    };
}

/// Extract a required unsigned integer argument by position.
///
/// Numeric strings are accepted too; the original transport was loose about
/// whether counts arrived as numbers or strings.
#[macro_export]
macro_rules! require_u64_arg {
    ($req:expr, $idx:literal, $name:literal) => {
        match $req
            .args()
            .get($idx)
            .and_then($crate::rpc_helpers::value_as_u64)
        {
            Some(v) => v,
            None => {
                return $crate::protocol::Response::error(
                    $req.id.clone(),
                    $crate::protocol::INVALID_PARAMS,
                    concat!(
                        "Missing or invalid '",
                        $name,
                        "' argument (position ",
                        $idx,
                        ", expected integer)"
                    ),
                )
            }
        }
    };
}

/// Extract an optional unsigned integer argument by position.
///
/// Returns `Option<u64>`; absent, null, or mistyped arguments are `None`.
#[macro_export]
macro_rules! optional_u64_arg {
    ($req:expr, $idx:literal) => {
        $req.args()
            .get($idx)
            .and_then($crate::rpc_helpers::value_as_u64)
    };
}

/// Deserialize a required argument into a typed value.
///
/// Used for structured arguments like the credentials object.
#[macro_export]
macro_rules! require_typed_arg {
    ($req:expr, $idx:literal, $ty:ty, $name:literal) => {
        match $req
            .args()
            .get($idx)
            .cloned()
            .map(serde_json::from_value::<$ty>)
        {
            Some(Ok(v)) => v,
            _ => {
                return $crate::protocol::Response::error(
                    $req.id.clone(),
                    $crate::protocol::INVALID_PARAMS,
                    concat!(
                        "Missing or invalid '",
                        $name,
                        "' argument (position ",
                        $idx,
                        ")"
                    ),
                )
            }
        }
    };
}

/// Lenient u64 coercion shared by the numeric macros.
pub fn value_as_u64(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

// Re-export macros for use in sibling modules via `use crate::rpc_helpers::*`
pub use crate::optional_u64_arg;
pub use crate::require_str_arg;
pub use crate::require_typed_arg;
pub use crate::require_u64_arg;

#[cfg(test)]
mod tests {
    use crate::protocol::{Request, RequestId, Response, INVALID_PARAMS};
    use courier_core::credentials::Credentials;
    use serde_json::json;

    fn make_request(params: serde_json::Value) -> Request {
        Request {
            jsonrpc: "2.0".to_string(),
            id: Some(RequestId::Number(1)),
            method: "test".to_string(),
            params,
        }
    }

    // Handler-shaped functions exercising the macros
    fn extract_required_str(req: Request) -> Response {
        let value = require_str_arg!(req, 0, "thread_id");
        Response::success(req.id.clone(), value)
    }

    fn extract_required_u64(req: Request) -> Response {
        let value = require_u64_arg!(req, 1, "amount");
        Response::success(req.id, value)
    }

    fn extract_optional_u64(req: Request) -> Response {
        let value = optional_u64_arg!(req, 2);
        Response::success(req.id, value.unwrap_or(10))
    }

    fn extract_credentials(req: Request) -> Response {
        let credentials = require_typed_arg!(req, 0, Credentials, "credentials");
        Response::success(req.id, credentials.username)
    }

    #[test]
    fn require_str_arg_success() {
        let req = make_request(json!(["424242"]));
        let resp = extract_required_str(req);

        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap(), "424242");
    }

    #[test]
    fn require_str_arg_missing() {
        let req = make_request(json!([]));
        let resp = extract_required_str(req);

        assert!(resp.result.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.code, INVALID_PARAMS);
        assert!(err.message.contains("'thread_id'"));
    }

    #[test]
    fn require_str_arg_wrong_type() {
        let req = make_request(json!([42]));
        let resp = extract_required_str(req);

        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[test]
    fn require_u64_arg_success() {
        let req = make_request(json!(["t", 25]));
        let resp = extract_required_u64(req);

        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap(), 25);
    }

    #[test]
    fn require_u64_arg_accepts_numeric_string() {
        let req = make_request(json!(["t", "25"]));
        let resp = extract_required_u64(req);

        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap(), 25);
    }

    #[test]
    fn require_u64_arg_missing() {
        let req = make_request(json!(["t"]));
        let resp = extract_required_u64(req);

        let err = resp.error.unwrap();
        assert_eq!(err.code, INVALID_PARAMS);
        assert!(err.message.contains("'amount'"));
    }

    #[test]
    fn optional_u64_arg_present() {
        let req = make_request(json!(["t", 5, 1500000000000u64]));
        let resp = extract_optional_u64(req);

        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap(), 1500000000000u64);
    }

    #[test]
    fn optional_u64_arg_null_is_absent() {
        let req = make_request(json!(["t", 5, null]));
        let resp = extract_optional_u64(req);

        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap(), 10);
    }

    #[test]
    fn optional_u64_arg_missing() {
        let req = make_request(json!(["t", 5]));
        let resp = extract_optional_u64(req);

        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap(), 10);
    }

    #[test]
    fn require_typed_arg_success() {
        let req = make_request(json!([{"username": "ada@example.invalid", "password": "pw"}]));
        let resp = extract_credentials(req);

        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap(), "ada@example.invalid");
    }

    #[test]
    fn require_typed_arg_missing_field() {
        let req = make_request(json!([{"username": "ada@example.invalid"}]));
        let resp = extract_credentials(req);

        let err = resp.error.unwrap();
        assert_eq!(err.code, INVALID_PARAMS);
        assert!(err.message.contains("'credentials'"));
    }

    #[test]
    fn require_typed_arg_missing_argument() {
        let req = make_request(json!([]));
        let resp = extract_credentials(req);

        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }
}
