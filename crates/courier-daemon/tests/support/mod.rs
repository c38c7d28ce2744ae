//! Shared test doubles for the daemon integration tests.

use async_trait::async_trait;
use courier_core::credentials::Credentials;
use courier_core::model::{
    AppState, Message, MessageAck, OutgoingAttachment, StoredCookie, ThreadMatch, User,
};
use courier_core::provider::{ChatHandle, ChatProvider, ProviderError, ProviderResult};
use courier_daemon::protocol::{Request, RequestId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Records every provider invocation so tests can assert on gating.
#[derive(Debug, Default)]
pub struct CallLog {
    calls: Mutex<Vec<String>>,
}

impl CallLog {
    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn ada() -> User {
    User {
        name: "Ada Lovelace".into(),
        first_name: "Ada".into(),
        vanity: "ada.lovelace".into(),
        thumb_src: String::new(),
        profile_url: String::new(),
        gender: 1,
        kind: "friend".into(),
        is_friend: true,
        is_birthday: false,
    }
}

pub fn canned_history() -> Vec<Message> {
    vec![
        Message {
            kind: "message".into(),
            attachments: vec![],
            body: "first".into(),
            is_group: false,
            message_id: "mid.1".into(),
            sender_id: "100010".into(),
            thread_id: "424242".into(),
            timestamp: "1500000000000".into(),
            is_unread: false,
            is_sponsored: false,
        },
        Message {
            kind: "message".into(),
            attachments: vec![],
            body: "second".into(),
            is_group: false,
            message_id: "mid.2".into(),
            sender_id: "100009".into(),
            thread_id: "424242".into(),
            timestamp: "1500000001000".into(),
            is_unread: true,
            is_sponsored: false,
        },
    ]
}

#[derive(Debug)]
pub struct MockHandle {
    user_id: String,
    users: HashMap<String, User>,
    history: Vec<Message>,
    threads: Vec<ThreadMatch>,
    log: Arc<CallLog>,
}

#[async_trait]
impl ChatHandle for MockHandle {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn app_state(&self) -> AppState {
        AppState {
            user_id: self.user_id.clone(),
            cookies: vec![StoredCookie {
                key: "c_user".into(),
                value: self.user_id.clone(),
            }],
        }
    }

    async fn user_info(&self, ids: &[String]) -> ProviderResult<HashMap<String, User>> {
        self.log.record(format!("user_info {}", ids.join(",")));
        Ok(self.users.clone())
    }

    async fn send_message(&self, body: &str, thread_id: &str) -> ProviderResult<MessageAck> {
        self.log.record(format!("send_message {body} {thread_id}"));
        Ok(MessageAck {
            message_id: "mid.sent".into(),
            thread_id: thread_id.to_string(),
            timestamp: 1600000000000,
        })
    }

    async fn send_attachment(
        &self,
        attachment: OutgoingAttachment,
        thread_id: &str,
    ) -> ProviderResult<MessageAck> {
        self.log.record(format!(
            "send_attachment {}:{} {thread_id}",
            attachment.filename,
            attachment.data.len()
        ));
        Ok(MessageAck {
            message_id: "mid.attachment".into(),
            thread_id: thread_id.to_string(),
            timestamp: 1600000001000,
        })
    }

    async fn search_threads(&self, query: &str) -> ProviderResult<Vec<ThreadMatch>> {
        self.log.record(format!("search_threads {query}"));
        Ok(self.threads.clone())
    }

    async fn thread_history(
        &self,
        thread_id: &str,
        amount: u64,
        before: Option<u64>,
    ) -> ProviderResult<Vec<Message>> {
        self.log
            .record(format!("thread_history {thread_id} {amount} {before:?}"));
        Ok(self.history.clone())
    }
}

pub struct MockProvider {
    pub log: Arc<CallLog>,
    reject_login: bool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            log: Arc::new(CallLog::default()),
            reject_login: false,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            log: Arc::new(CallLog::default()),
            reject_login: true,
        }
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn login(&self, credentials: &Credentials) -> ProviderResult<Arc<dyn ChatHandle>> {
        self.log.record(format!("login {}", credentials.username));
        if self.reject_login {
            return Err(ProviderError::LoginRejected("bad credentials".into()));
        }
        Ok(Arc::new(MockHandle {
            user_id: "100009".into(),
            users: HashMap::from([("100010".to_string(), ada())]),
            history: canned_history(),
            threads: vec![ThreadMatch {
                thread_id: "424242".into(),
                name: "Lab group".into(),
                is_group: true,
            }],
            log: self.log.clone(),
        }))
    }
}

pub fn request(method: &str, params: serde_json::Value) -> Request {
    Request {
        jsonrpc: "2.0".to_string(),
        id: Some(RequestId::Number(1)),
        method: method.to_string(),
        params,
    }
}
