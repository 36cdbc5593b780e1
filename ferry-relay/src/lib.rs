//! Ferry Relay Library
//!
//! This library provides the call side of the Ferry system including:
//! - The `Client` trait and request/response types
//! - A selecting client that picks nodes and delegates to a `Transport`
//! - The wrapper chain (shard, version, metadata, rate limit, endpoint scope)
//! - A config driven builder

pub mod relay;

// Re-export commonly used types
pub use relay::builder::{build_discovery, build_selector, build_wrappers, ClientBuilder};
pub use relay::chain::{wrap, Wrapper};
pub use relay::client::{
    CallOptions, Client, ClientError, Request, Response, SelectClient, Transport,
};
