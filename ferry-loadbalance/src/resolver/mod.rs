//! 不依赖注册中心的节点来源
//!
//! 这些解析器都实现了 `Discovery`，可以直接交给 `Selector` 使用

pub mod dns;
pub mod noop;
pub mod static_resolver;

pub use dns::DnsResolver;
pub use noop::NoopResolver;
pub use static_resolver::StaticResolver;
