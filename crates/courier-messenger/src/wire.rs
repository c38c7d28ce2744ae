//! Wire-format helpers: page scraping and mercury payload parsing.

use courier_core::model::{Message, MessageAck, ThreadMatch, User};
use courier_core::provider::{ProviderError, ProviderResult};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// JSON bodies come prefixed with an infinite-loop guard.
const JSON_GUARD: &str = "for (;;);";

pub(crate) fn strip_json_guard(body: &str) -> &str {
    body.strip_prefix(JSON_GUARD).unwrap_or(body).trim_start()
}

pub(crate) fn parse_guarded_json(body: &str) -> ProviderResult<Value> {
    serde_json::from_str(strip_json_guard(body))
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid json: {e}")))
}

/// Fail on an in-band platform error envelope (`{"error": 1357001, ...}`).
pub(crate) fn check_payload_error(payload: &Value) -> ProviderResult<()> {
    if let Some(code) = payload.get("error").and_then(Value::as_u64) {
        let message = payload
            .get("errorDescription")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(ProviderError::Platform { code, message });
    }
    Ok(())
}

/// Extract a quoted script field like `"USER_ID":"1234"` from a page body.
pub(crate) fn find_js_field(body: &str, field: &str) -> Option<String> {
    let pattern = format!("\"{}\"(,|:)\"(?P<value>.*?)\"", regex::escape(field));
    let re = Regex::new(&pattern).ok()?;
    re.captures(body).map(|caps| caps["value"].to_string())
}

/// The login form's submit target plus its hidden inputs.
pub(crate) struct LoginForm {
    pub action: String,
    pub inputs: Vec<(String, String)>,
}

pub(crate) fn find_login_form(body: &str) -> Option<LoginForm> {
    let form_re =
        Regex::new(r#"(?s)(?P<open><form[^>]*id="login_form"[^>]*>)(?P<inner>.*?)</form>"#)
            .ok()?;
    let caps = form_re.captures(body)?;
    let action = attr(&caps["open"], "action")?;

    let input_re = Regex::new(r"(?s)<input[^>]*>").ok()?;
    let mut inputs = Vec::new();
    for tag in input_re.find_iter(&caps["inner"]) {
        let tag = tag.as_str();
        if attr(tag, "type").as_deref() != Some("hidden") {
            continue;
        }
        if let (Some(name), Some(value)) = (attr(tag, "name"), attr(tag, "value")) {
            inputs.push((name, value));
        }
    }
    Some(LoginForm { action, inputs })
}

fn attr(tag: &str, name: &str) -> Option<String> {
    let pattern = format!(r#"{}="(?P<value>[^"]*)""#, regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(tag).map(|caps| caps["value"].to_string())
}

/// The request counter parameter is base36-encoded.
pub(crate) fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = String::new();
    while n > 0 {
        out.insert(0, DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    out
}

fn malformed(detail: impl Into<String>) -> ProviderError {
    ProviderError::MalformedResponse(detail.into())
}

/// Ids arrive as strings or bare numbers depending on the endpoint.
fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn parse_profiles(payload: &Value) -> ProviderResult<HashMap<String, User>> {
    let profiles = payload
        .get("payload")
        .and_then(|p| p.get("profiles"))
        .ok_or_else(|| malformed("missing payload.profiles"))?;
    serde_json::from_value(profiles.clone()).map_err(|e| malformed(format!("profiles: {e}")))
}

pub(crate) fn parse_thread_matches(payload: &Value) -> ProviderResult<Vec<ThreadMatch>> {
    let threads = payload
        .get("payload")
        .and_then(|p| p.get("mercury_payload"))
        .and_then(|p| p.get("threads"))
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing mercury_payload.threads"))?;
    Ok(threads.iter().filter_map(thread_match_from_value).collect())
}

fn thread_match_from_value(value: &Value) -> Option<ThreadMatch> {
    let thread_id = value
        .get("thread_fbid")
        .or_else(|| value.get("thread_id"))
        .map(id_string)?;
    Some(ThreadMatch {
        thread_id,
        name: value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        is_group: value
            .get("is_group")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

/// Reshape mercury history actions into the client-facing message form.
pub(crate) fn parse_history(payload: &Value, thread_id: &str) -> ProviderResult<Vec<Message>> {
    let actions = payload
        .get("payload")
        .and_then(|p| p.get("actions"))
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing payload.actions"))?;
    Ok(actions
        .iter()
        .map(|action| message_from_action(action, thread_id))
        .collect())
}

fn message_from_action(action: &Value, thread_id: &str) -> Message {
    let author = action
        .get("author")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let sender_id = author.strip_prefix("fbid:").unwrap_or(author).to_string();
    let attachments = action
        .get("attachments")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|a| serde_json::from_value(a.clone()).ok())
                .collect()
        })
        .unwrap_or_default();
    Message {
        kind: "message".to_string(),
        attachments,
        body: action
            .get("body")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        is_group: action
            .get("is_group")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        message_id: action
            .get("message_id")
            .map(id_string)
            .unwrap_or_default(),
        sender_id,
        thread_id: action
            .get("thread_fbid")
            .map(id_string)
            .unwrap_or_else(|| thread_id.to_string()),
        timestamp: action.get("timestamp").map(id_string).unwrap_or_default(),
        is_unread: action
            .get("is_unread")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        is_sponsored: false,
    }
}

/// Send responses echo an action on success; fall back to the offline id
/// when the platform does not.
pub(crate) fn parse_send_ack(
    payload: &Value,
    thread_id: &str,
    fallback_message_id: &str,
    fallback_timestamp: u64,
) -> MessageAck {
    let action = payload
        .get("payload")
        .and_then(|p| p.get("actions"))
        .and_then(Value::as_array)
        .and_then(|actions| actions.first());
    let message_id = action
        .and_then(|a| a.get("message_id"))
        .and_then(Value::as_str)
        .unwrap_or(fallback_message_id)
        .to_string();
    let timestamp = action
        .and_then(|a| a.get("timestamp"))
        .and_then(Value::as_u64)
        .unwrap_or(fallback_timestamp);
    MessageAck {
        message_id,
        thread_id: thread_id.to_string(),
        timestamp,
    }
}

/// Upload metadata names its id field by attachment kind; return the matching
/// send parameter name (`image_ids`, `file_ids`, ...) and the id itself.
pub(crate) fn parse_upload_metadata(payload: &Value) -> ProviderResult<(String, String)> {
    let meta = payload
        .get("payload")
        .and_then(|p| p.get("metadata"))
        .and_then(Value::as_array)
        .and_then(|list| list.first())
        .ok_or_else(|| ProviderError::UploadFailed("missing upload metadata".into()))?;
    for key in ["image_id", "file_id", "video_id", "audio_id"] {
        if let Some(id) = meta.get(key) {
            return Ok((format!("{key}s"), id_string(id)));
        }
    }
    Err(ProviderError::UploadFailed(
        "no attachment id in upload metadata".into(),
    ))
}
