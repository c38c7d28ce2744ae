//! Courier Session Daemon
//!
//! Library for running the courier daemon: a JSON-RPC over HTTP facade that
//! forwards each named method to the single authenticated Messenger session
//! this process holds.

pub mod handlers;
pub mod protocol;
pub mod rpc;
pub mod rpc_helpers;
pub mod server;
pub mod session;
pub mod snapshot;

pub use protocol::{Request, RequestId, Response, RpcError};
pub use rpc::RpcContext;
pub use server::serve;
pub use session::{SessionError, SessionHolder};
pub use snapshot::{FileSnapshotStore, SnapshotError, SnapshotStore};
