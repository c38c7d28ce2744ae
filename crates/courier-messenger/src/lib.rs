//! Reqwest-backed implementation of the courier chat provider.
//!
//! Speaks the same unofficial surface the platform's own web client uses:
//! form login against the public login page, a manually tracked cookie
//! session, and the mercury AJAX endpoints for messaging, search, and
//! history. Nothing here is a published API; the wire parsing is therefore
//! deliberately tolerant of missing fields.

mod client;
mod wire;

pub use client::MessengerProvider;
