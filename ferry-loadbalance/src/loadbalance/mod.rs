pub mod cache;
pub mod filter;
pub mod options;
pub mod selector;
pub mod strategy;


pub use cache::{CacheStats, CachingDiscovery};
pub use filter::Filter;
pub use options::SelectOptions;
pub use selector::Selector;
pub use strategy::{NodeIterator, RoundRobin, Shard, Strategy};
