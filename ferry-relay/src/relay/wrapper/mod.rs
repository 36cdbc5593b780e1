//! 调用包装器
//!
//! 前三个包装器只向 `CallOptions` 注入选择偏好，限流器与选择无关，
//! 端点包装器把任意包装器限定在部分端点上。

pub mod endpoint;
pub mod metadata;
pub mod rate_limit;
pub mod shard;
pub mod version;

pub use endpoint::{endpoint_wrapper, EndpointClient};
pub use metadata::{metadata_wrapper, MetadataClient};
pub use rate_limit::{rate_limit_wrapper, RateLimitClient, TokenBucket};
pub use shard::{shard_wrapper, ShardClient};
pub use version::{latest_version_wrapper, LatestVersionClient};
