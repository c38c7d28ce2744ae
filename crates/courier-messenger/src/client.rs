//! Provider implementation: form login and the mercury endpoints.

use crate::wire::{
    base36, check_payload_error, find_js_field, find_login_form, parse_guarded_json,
    parse_history, parse_profiles, parse_send_ack, parse_thread_matches, parse_upload_metadata,
};
use async_trait::async_trait;
use courier_core::credentials::Credentials;
use courier_core::model::{
    AppState, Message, MessageAck, OutgoingAttachment, StoredCookie, ThreadMatch, User,
};
use courier_core::provider::{ChatHandle, ChatProvider, ProviderError, ProviderResult};
use reqwest::header::{HeaderMap, COOKIE, REFERER, SET_COOKIE, USER_AGENT};
use reqwest::multipart;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Factory for authenticated Messenger sessions.
pub struct MessengerProvider {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl MessengerProvider {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> ProviderResult<Self> {
        let http = reqwest::Client::builder().build().map_err(net_err)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
        })
    }
}

#[async_trait]
impl ChatProvider for MessengerProvider {
    async fn login(&self, credentials: &Credentials) -> ProviderResult<Arc<dyn ChatHandle>> {
        let mut cookies = BTreeMap::new();

        // The login page carries the form target, its hidden inputs, and the
        // datr seed the platform expects back as a cookie.
        let resp = self
            .http
            .get(&self.base_url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(net_err)?;
        collect_cookies(resp.headers(), &mut cookies);
        let body = resp.text().await.map_err(net_err)?;

        let form = find_login_form(&body).ok_or_else(|| {
            ProviderError::MalformedResponse("no login form on login page".into())
        })?;
        if let Some(datr) = find_js_field(&body, "_js_datr") {
            cookies.insert("_js_datr".to_string(), datr);
        }

        let action_url = if form.action.starts_with("http") {
            form.action.clone()
        } else {
            format!("{}{}", self.base_url, form.action)
        };

        let mut params = form.inputs;
        params.push(("email".to_string(), credentials.username.clone()));
        params.push(("pass".to_string(), credentials.password.clone()));
        params.push(("persistent".to_string(), "1".to_string()));
        params.push(("login".to_string(), "1".to_string()));

        let resp = self
            .http
            .post(&action_url)
            .header(USER_AGENT, &self.user_agent)
            .header(REFERER, &self.base_url)
            .header(COOKIE, cookie_header(&cookies))
            .form(&params)
            .send()
            .await
            .map_err(net_err)?;
        collect_cookies(resp.headers(), &mut cookies);
        let body = resp.text().await.map_err(net_err)?;

        // A logged-out page reports USER_ID 0.
        let user_id = find_js_field(&body, "USER_ID")
            .filter(|id| id != "0")
            .ok_or_else(|| ProviderError::LoginRejected("no user id in login response".into()))?;
        let fb_dtsg = find_js_field(&body, "fb_dtsg").ok_or_else(|| {
            ProviderError::LoginRejected("no request token in login response".into())
        })?;

        debug!(%user_id, "platform login succeeded");

        Ok(Arc::new(MessengerHandle {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            user_agent: self.user_agent.clone(),
            user_id,
            fb_dtsg,
            cookies,
            request_counter: AtomicU64::new(1),
        }))
    }
}

/// One authenticated session; the cookie set is fixed at login time.
#[derive(Debug)]
struct MessengerHandle {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
    user_id: String,
    fb_dtsg: String,
    cookies: BTreeMap<String, String>,
    request_counter: AtomicU64,
}

impl MessengerHandle {
    /// Session-wide form fields every endpoint expects.
    fn session_params(&self) -> Vec<(String, String)> {
        let seq = self.request_counter.fetch_add(1, Ordering::Relaxed);
        vec![
            ("fb_dtsg".to_string(), self.fb_dtsg.clone()),
            ("__user".to_string(), self.user_id.clone()),
            ("__a".to_string(), "1".to_string()),
            ("__req".to_string(), base36(seq)),
        ]
    }

    async fn post_form(
        &self,
        path: &str,
        mut params: Vec<(String, String)>,
    ) -> ProviderResult<Value> {
        params.extend(self.session_params());
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header(USER_AGENT, &self.user_agent)
            .header(REFERER, &self.base_url)
            .header(COOKIE, cookie_header(&self.cookies))
            .form(&params)
            .send()
            .await
            .map_err(net_err)?;
        let body = resp.text().await.map_err(net_err)?;
        let payload = parse_guarded_json(&body)?;
        check_payload_error(&payload)?;
        Ok(payload)
    }

    async fn upload(&self, attachment: OutgoingAttachment) -> ProviderResult<(String, String)> {
        let part = multipart::Part::bytes(attachment.data).file_name(attachment.filename);
        let mut form = multipart::Form::new().part("upload_1024", part);
        for (key, value) in self.session_params() {
            form = form.text(key, value);
        }
        let resp = self
            .http
            .post(format!("{}/ajax/mercury/upload.php", self.base_url))
            .header(USER_AGENT, &self.user_agent)
            .header(COOKIE, cookie_header(&self.cookies))
            .multipart(form)
            .send()
            .await
            .map_err(net_err)?;
        let body = resp.text().await.map_err(net_err)?;
        let payload = parse_guarded_json(&body)?;
        check_payload_error(&payload)?;
        parse_upload_metadata(&payload)
    }
}

#[async_trait]
impl ChatHandle for MessengerHandle {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn app_state(&self) -> AppState {
        AppState {
            user_id: self.user_id.clone(),
            cookies: self
                .cookies
                .iter()
                .map(|(key, value)| StoredCookie {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
        }
    }

    async fn user_info(&self, ids: &[String]) -> ProviderResult<HashMap<String, User>> {
        let params = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (format!("ids[{i}]"), id.clone()))
            .collect();
        let payload = self.post_form("/chat/user_info/", params).await?;
        parse_profiles(&payload)
    }

    async fn send_message(&self, body: &str, thread_id: &str) -> ProviderResult<MessageAck> {
        let message_id = generate_offline_id();
        let params = vec![
            (
                "action_type".to_string(),
                "ma-type:user-generated-message".to_string(),
            ),
            ("body".to_string(), body.to_string()),
            ("other_user_fbid".to_string(), thread_id.to_string()),
            ("message_id".to_string(), message_id.clone()),
            ("offline_threading_id".to_string(), message_id.clone()),
        ];
        let payload = self.post_form("/messaging/send/", params).await?;
        Ok(parse_send_ack(&payload, thread_id, &message_id, now_millis()))
    }

    async fn send_attachment(
        &self,
        attachment: OutgoingAttachment,
        thread_id: &str,
    ) -> ProviderResult<MessageAck> {
        let (param, id) = self.upload(attachment).await?;
        let message_id = generate_offline_id();
        let params = vec![
            (
                "action_type".to_string(),
                "ma-type:user-generated-message".to_string(),
            ),
            ("other_user_fbid".to_string(), thread_id.to_string()),
            ("message_id".to_string(), message_id.clone()),
            ("offline_threading_id".to_string(), message_id.clone()),
            (format!("{param}[0]"), id),
        ];
        let payload = self.post_form("/messaging/send/", params).await?;
        Ok(parse_send_ack(&payload, thread_id, &message_id, now_millis()))
    }

    async fn search_threads(&self, query: &str) -> ProviderResult<Vec<ThreadMatch>> {
        let params = vec![
            ("query".to_string(), query.to_string()),
            ("snippetOffset".to_string(), "0".to_string()),
            ("snippetLimit".to_string(), "30".to_string()),
        ];
        let payload = self
            .post_form("/ajax/mercury/search_threads.php", params)
            .await?;
        parse_thread_matches(&payload)
    }

    async fn thread_history(
        &self,
        thread_id: &str,
        amount: u64,
        before: Option<u64>,
    ) -> ProviderResult<Vec<Message>> {
        let prefix = format!("messages[thread_fbids][{thread_id}]");
        let params = vec![
            (format!("{prefix}[offset]"), "0".to_string()),
            (format!("{prefix}[limit]"), amount.to_string()),
            (
                format!("{prefix}[timestamp]"),
                before.map(|t| t.to_string()).unwrap_or_default(),
            ),
        ];
        let payload = self
            .post_form("/ajax/mercury/thread_info.php", params)
            .await?;
        parse_history(&payload, thread_id)
    }
}

fn net_err(e: reqwest::Error) -> ProviderError {
    ProviderError::Network(e.to_string())
}

fn collect_cookies(headers: &HeaderMap, cookies: &mut BTreeMap<String, String>) {
    for header in headers.get_all(SET_COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        let Some(pair) = raw.split(';').next() else { continue };
        if let Some((key, value)) = pair.split_once('=') {
            cookies.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
}

fn cookie_header(cookies: &BTreeMap<String, String>) -> String {
    cookies
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Offline threading ids are positive 63-bit integers.
fn generate_offline_id() -> String {
    (rand::random::<u64>() >> 1).to_string()
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
