//! Ferry Core Library
//!
//! This library provides core functionality for the Ferry selection system including:
//! - Service and node registry types
//! - The discovery source contract and an in-memory registry
//! - Call-scoped metadata
//! - Configuration management

pub mod config;
pub mod error;
pub mod metadata;
pub mod registry;

// Re-export commonly used types
pub use config::model::{
    ClientSettings, Config, DiscoveryKind, DiscoverySettings, FilterSpec, RateLimit,
    SelectorSettings, StrategyKind, WrapperKind, WrapperSettings,
};
pub use error::SelectorError;
pub use metadata::{CallContext, Metadata};
pub use registry::{flatten_nodes, Discovery, MemoryRegistry, Node, Service};
