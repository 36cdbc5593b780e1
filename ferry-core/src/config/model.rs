use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::registry::types::{Node, Service};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub selector: SelectorSettings,
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(default)]
    pub wrappers: WrapperSettings,
}

/// 服务发现来源配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DiscoverySettings {
    #[serde(default)]
    pub kind: DiscoveryKind,
    /// memory 模式下预注册的服务
    #[serde(default)]
    pub services: Vec<Service>,
    /// static 模式下的固定节点，为空时使用服务名本身作为地址
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// dns 模式下 SRV 查询使用的域名后缀
    #[serde(default = "default_dns_domain")]
    pub dns_domain: String,
    /// 服务发现结果缓存时间，0 表示不缓存
    #[serde(default)]
    pub cache_ttl_seconds: u64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            kind: DiscoveryKind::default(),
            services: Vec::new(),
            nodes: Vec::new(),
            dns_domain: default_dns_domain(),
            cache_ttl_seconds: 0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryKind {
    /// 进程内注册表（默认）
    #[default]
    Memory,
    /// 固定节点列表
    Static,
    /// A/AAAA 或 SRV 记录
    Dns,
    /// 始终返回空列表
    Noop,
}

/// 选择器默认配置
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SelectorSettings {
    #[serde(default)]
    pub strategy: StrategyKind,
    /// 默认过滤器，按顺序应用在每次调用的过滤器之前
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    RoundRobin,
    Random,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    /// 只保留最新版本
    LatestVersion,
    /// 只保留指定版本
    Version { version: String },
    /// 只保留元数据匹配的节点
    Metadata { key: String, value: String },
    /// 只保留暴露了指定端点的服务
    Endpoint { endpoint: String },
}

/// 客户端调用配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClientSettings {
    /// 同一次调用内重新选择节点的次数
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// 调用包装链配置
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct WrapperSettings {
    /// 包装顺序，第一个为最外层
    #[serde(default)]
    pub order: Vec<WrapperKind>,
    /// 分片使用的元数据键
    #[serde(default)]
    pub shard_keys: Vec<String>,
    /// 元数据匹配过滤使用的键（例如 datacenter）
    #[serde(default)]
    pub metadata_match_key: Option<String>,
    #[serde(default)]
    pub rate_limit: Option<RateLimit>,
    /// 非空时限流只作用于这些方法
    #[serde(default)]
    pub rate_limit_endpoints: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WrapperKind {
    Shard,
    LatestVersion,
    MetadataMatch,
    RateLimit,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RateLimit {
    pub requests_per_second: f64,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

// Default value functions
fn default_dns_domain() -> String {
    "local".to_string()
}

fn default_retries() -> u32 {
    1
}

fn default_request_timeout() -> u64 {
    5
}

fn default_burst() -> u32 {
    1
}

impl Config {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        self.validate_discovery_config()?;
        self.validate_selector_config()?;
        self.validate_client_config()?;
        self.validate_wrapper_config()?;
        Ok(())
    }

    fn validate_discovery_config(&self) -> Result<()> {
        let discovery = &self.discovery;

        for service in &discovery.services {
            if service.name.is_empty() {
                anyhow::bail!("Discovery has a service with empty name");
            }
            Self::validate_nodes(&service.name, &service.nodes)?;
        }

        Self::validate_nodes("static", &discovery.nodes)?;

        if discovery.kind == DiscoveryKind::Dns && discovery.dns_domain.is_empty() {
            anyhow::bail!("DNS discovery requires a non-empty dns_domain");
        }

        Ok(())
    }

    /// 验证节点列表：id 非空、地址带端口、id 不重复
    fn validate_nodes(owner: &str, nodes: &[Node]) -> Result<()> {
        let mut seen = HashSet::new();

        for node in nodes {
            if node.id.is_empty() {
                anyhow::bail!("Service '{}' has a node with empty id", owner);
            }

            let port = node
                .address
                .rsplit_once(':')
                .map(|(host, port)| (host.is_empty(), port.parse::<u16>()));
            match port {
                Some((false, Ok(_))) => {}
                _ => anyhow::bail!(
                    "Service '{}' node '{}' has invalid address '{}' (expected host:port)",
                    owner,
                    node.id,
                    node.address
                ),
            }

            if !seen.insert(node.id.as_str()) {
                anyhow::bail!("Service '{}' has duplicate node id '{}'", owner, node.id);
            }
        }

        Ok(())
    }

    fn validate_selector_config(&self) -> Result<()> {
        for filter in &self.selector.filters {
            match filter {
                FilterSpec::Version { version } if version.is_empty() => {
                    anyhow::bail!("Version filter has empty version");
                }
                FilterSpec::Endpoint { endpoint } if endpoint.is_empty() => {
                    anyhow::bail!("Endpoint filter has empty endpoint");
                }
                FilterSpec::Metadata { key, .. } if key.is_empty() => {
                    anyhow::bail!("Metadata filter has empty key");
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn validate_client_config(&self) -> Result<()> {
        if self.client.request_timeout_seconds == 0 {
            anyhow::bail!("Client has invalid request_timeout_seconds: cannot be 0");
        }

        if self.client.retries > 10 {
            anyhow::bail!(
                "Client has retries too large: {} (maximum 10)",
                self.client.retries
            );
        }

        Ok(())
    }

    fn validate_wrapper_config(&self) -> Result<()> {
        let wrappers = &self.wrappers;

        let mut seen = HashSet::new();
        for kind in &wrappers.order {
            if !seen.insert(kind) {
                anyhow::bail!("Wrapper {:?} is listed more than once", kind);
            }
        }

        if seen.contains(&WrapperKind::Shard) {
            if wrappers.shard_keys.is_empty() {
                anyhow::bail!("Shard wrapper requires at least one shard key");
            }
            if wrappers.shard_keys.iter().any(|k| k.is_empty()) {
                anyhow::bail!("Shard wrapper has empty shard key");
            }
        }

        if seen.contains(&WrapperKind::MetadataMatch)
            && wrappers.metadata_match_key.as_deref().unwrap_or("").is_empty()
        {
            anyhow::bail!("Metadata match wrapper requires a non-empty metadata_match_key");
        }

        match (&wrappers.rate_limit, seen.contains(&WrapperKind::RateLimit)) {
            (None, true) => anyhow::bail!("Rate limit wrapper requires a rate_limit section"),
            (Some(limit), true) => {
                if limit.requests_per_second <= 0.0 || !limit.requests_per_second.is_finite() {
                    anyhow::bail!(
                        "Rate limit has invalid requests_per_second: {}",
                        limit.requests_per_second
                    );
                }
                if limit.burst == 0 {
                    anyhow::bail!("Rate limit has invalid burst: cannot be 0");
                }
            }
            _ => {}
        }

        if !wrappers.rate_limit_endpoints.is_empty() && !seen.contains(&WrapperKind::RateLimit) {
            anyhow::bail!("rate_limit_endpoints is set but the rate_limit wrapper is not enabled");
        }

        Ok(())
    }
}
