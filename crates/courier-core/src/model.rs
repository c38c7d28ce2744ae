//! Platform data shapes.
//!
//! The platform speaks camelCase on the wire; serde renames keep the Rust
//! side idiomatic while preserving the exact wire keys.

use serde::{Deserialize, Serialize};

/// One entry of the platform's batch profile lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(default)]
    pub vanity: String,
    #[serde(rename = "thumbSrc", default)]
    pub thumb_src: String,
    #[serde(rename = "profileUrl", default)]
    pub profile_url: String,
    #[serde(default)]
    pub gender: i32,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "isFriend", default)]
    pub is_friend: bool,
    #[serde(rename = "isBirthday", default)]
    pub is_birthday: bool,
}

/// A single message from a thread's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "isGroup", default)]
    pub is_group: bool,
    #[serde(rename = "messageID")]
    pub message_id: String,
    #[serde(rename = "senderID")]
    pub sender_id: String,
    #[serde(rename = "threadID")]
    pub thread_id: String,
    pub timestamp: String,
    #[serde(rename = "isUnread", default)]
    pub is_unread: bool,
    #[serde(rename = "isSponsored", default)]
    pub is_sponsored: bool,
}

/// An attachment carried by a received message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub filename: String,
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "isMalicious", default)]
    pub is_malicious: bool,
    #[serde(rename = "contentType", default)]
    pub content_type: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(rename = "fileSize", default)]
    pub file_size: i64,
}

/// Acknowledgement returned by a send operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageAck {
    #[serde(rename = "messageID")]
    pub message_id: String,
    #[serde(rename = "threadID")]
    pub thread_id: String,
    pub timestamp: u64,
}

/// One hit from a thread search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMatch {
    #[serde(rename = "threadID")]
    pub thread_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "isGroup", default)]
    pub is_group: bool,
}

/// An attachment to be sent, already decoded to raw bytes.
///
/// The platform wants uploads framed as files, so every outgoing buffer
/// carries a filename even when the caller never supplied one.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingAttachment {
    pub data: Vec<u8>,
    pub filename: String,
}

impl OutgoingAttachment {
    /// Default filename matching the pseudo-file framing used upstream.
    pub const DEFAULT_FILENAME: &'static str = "block";

    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            filename: Self::DEFAULT_FILENAME.to_string(),
        }
    }

    pub fn with_filename(data: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            data,
            filename: filename.into(),
        }
    }
}

/// Serializable snapshot of an authenticated session.
///
/// Captured once at login and persisted to disk; the cookie set is what a
/// future process would need to resume the platform session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub cookies: Vec<StoredCookie>,
}

/// One captured session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub key: String,
    pub value: String,
}
