//! Core types for the courier bridge.
//!
//! This crate defines the domain model shared by the daemon and the
//! Messenger provider, plus the capability traits that keep the daemon
//! decoupled from any concrete chat-platform client.

pub mod credentials;
pub mod model;
pub mod provider;

pub use credentials::Credentials;
pub use model::{
    AppState, Attachment, Message, MessageAck, OutgoingAttachment, StoredCookie, ThreadMatch, User,
};
pub use provider::{ChatHandle, ChatProvider, ProviderError, ProviderResult};
