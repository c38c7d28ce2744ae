pub mod context;
pub mod error;

pub use context::RpcContext;
