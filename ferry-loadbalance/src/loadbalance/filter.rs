use ferry_core::{FilterSpec, SelectorError, Service};
use std::fmt;

/// 服务列表过滤器
///
/// 纯函数：输入快照不会被修改，总是返回新的列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// 只保留版本字符串最大的服务（按字符串比较，不是语义化版本）
    LatestVersion,
    /// 只保留指定版本
    Version(String),
    /// 只保留 `metadata[key] == value` 的节点，没有节点的服务被丢弃
    Metadata { key: String, value: String },
    /// 只保留暴露了指定端点的服务
    Endpoint(String),
}

impl Filter {
    pub fn version(version: impl Into<String>) -> Self {
        Filter::Version(version.into())
    }

    pub fn endpoint(endpoint: impl Into<String>) -> Self {
        Filter::Endpoint(endpoint.into())
    }

    pub fn metadata(key: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Metadata {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn apply(&self, services: &[Service]) -> Vec<Service> {
        match self {
            Filter::LatestVersion => latest_version(services),
            Filter::Version(version) => services
                .iter()
                .filter(|s| &s.version == version)
                .cloned()
                .collect(),
            Filter::Metadata { key, value } => metadata_match(services, key, value),
            Filter::Endpoint(endpoint) => services
                .iter()
                .filter(|s| s.endpoints.iter().any(|e| e == endpoint))
                .cloned()
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<(), SelectorError> {
        match self {
            Filter::Version(version) if version.is_empty() => Err(SelectorError::InvalidOption(
                "version filter requires a non-empty version".to_string(),
            )),
            Filter::Metadata { key, .. } if key.is_empty() => Err(SelectorError::InvalidOption(
                "metadata filter requires a non-empty key".to_string(),
            )),
            Filter::Endpoint(endpoint) if endpoint.is_empty() => Err(SelectorError::InvalidOption(
                "endpoint filter requires a non-empty endpoint".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl From<&FilterSpec> for Filter {
    fn from(config: &FilterSpec) -> Self {
        match config {
            FilterSpec::LatestVersion => Filter::LatestVersion,
            FilterSpec::Version { version } => Filter::Version(version.clone()),
            FilterSpec::Metadata { key, value } => Filter::metadata(key.clone(), value.clone()),
            FilterSpec::Endpoint { endpoint } => Filter::Endpoint(endpoint.clone()),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::LatestVersion => write!(f, "latest_version"),
            Filter::Version(version) => write!(f, "version={version}"),
            Filter::Metadata { key, value } => write!(f, "metadata[{key}]={value}"),
            Filter::Endpoint(endpoint) => write!(f, "endpoint={endpoint}"),
        }
    }
}

fn latest_version(services: &[Service]) -> Vec<Service> {
    if services.len() <= 1 {
        return services.to_vec();
    }

    let Some(latest) = services.iter().map(|s| s.version.as_str()).max() else {
        return Vec::new();
    };

    services
        .iter()
        .filter(|s| s.version == latest)
        .cloned()
        .collect()
}

fn metadata_match(services: &[Service], key: &str, value: &str) -> Vec<Service> {
    services
        .iter()
        .filter_map(|service| {
            let nodes: Vec<_> = service
                .nodes
                .iter()
                .filter(|node| node.metadata.get(key).is_some_and(|v| v == value))
                .cloned()
                .collect();

            if nodes.is_empty() {
                return None;
            }

            Some(Service {
                name: service.name.clone(),
                version: service.version.clone(),
                nodes,
                endpoints: service.endpoints.clone(),
            })
        })
        .collect()
}
