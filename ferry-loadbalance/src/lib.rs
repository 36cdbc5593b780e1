//! Ferry Load Balance Library
//!
//! This library provides node selection for the Ferry system including:
//! - The `Selector` façade (discovery + filters + strategy)
//! - Random, round-robin and shard strategies
//! - Version and metadata filters
//! - A TTL caching discovery source
//! - Static, DNS and noop resolvers

pub mod loadbalance;
pub mod resolver;

// Re-export commonly used types
pub use loadbalance::{
    CacheStats, CachingDiscovery, Filter, NodeIterator, RoundRobin, SelectOptions, Selector,
    Shard, Strategy,
};
pub use resolver::{DnsResolver, NoopResolver, StaticResolver};
