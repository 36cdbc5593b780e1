use anyhow::Result;
use ferry_core::{
    Config, Discovery, DiscoveryKind, DiscoverySettings, MemoryRegistry, SelectorSettings,
    StrategyKind, WrapperKind, WrapperSettings,
};
use ferry_loadbalance::{
    CachingDiscovery, DnsResolver, Filter, NoopResolver, Selector, StaticResolver, Strategy,
};
use std::sync::Arc;
use std::time::Duration;

use super::chain::{wrap, Wrapper};
use super::client::{Client, SelectClient, Transport};
use super::wrapper::{
    endpoint_wrapper, latest_version_wrapper, metadata_wrapper, rate_limit_wrapper,
    shard_wrapper,
};

/// 根据配置创建服务发现源
///
/// `cache_ttl_seconds` 大于 0 时在外面套一层缓存
pub fn build_discovery(settings: &DiscoverySettings) -> Arc<dyn Discovery> {
    let discovery: Arc<dyn Discovery> = match settings.kind {
        DiscoveryKind::Memory => Arc::new(MemoryRegistry::with_services(settings.services.clone())),
        DiscoveryKind::Static => Arc::new(StaticResolver::with_nodes(settings.nodes.clone())),
        DiscoveryKind::Dns => Arc::new(DnsResolver::with_domain(settings.dns_domain.clone())),
        DiscoveryKind::Noop => Arc::new(NoopResolver),
    };

    if settings.cache_ttl_seconds > 0 {
        tracing::debug!(
            "Caching {} discovery results for {}s",
            discovery.kind(),
            settings.cache_ttl_seconds
        );
        Arc::new(CachingDiscovery::new(
            discovery,
            Duration::from_secs(settings.cache_ttl_seconds),
        ))
    } else {
        discovery
    }
}

/// 根据配置创建选择器
pub fn build_selector(discovery: Arc<dyn Discovery>, settings: &SelectorSettings) -> Selector {
    let strategy = match settings.strategy {
        StrategyKind::Random => Strategy::random(),
        StrategyKind::RoundRobin => Strategy::round_robin(),
    };
    Selector::new(discovery)
        .with_strategy(strategy)
        .with_filters(settings.filters.iter().map(Filter::from))
}

/// 按 `order` 创建包装器列表，第一个在最外层
pub fn build_wrappers(settings: &WrapperSettings) -> Result<Vec<Wrapper>> {
    let mut wrappers = Vec::with_capacity(settings.order.len());

    for kind in &settings.order {
        let wrapper = match kind {
            WrapperKind::Shard => shard_wrapper(settings.shard_keys.clone()),
            WrapperKind::LatestVersion => latest_version_wrapper(),
            WrapperKind::MetadataMatch => match &settings.metadata_match_key {
                Some(key) => metadata_wrapper(key.as_str()),
                None => anyhow::bail!("metadata_match wrapper requires metadata_match_key"),
            },
            WrapperKind::RateLimit => {
                let Some(limit) = &settings.rate_limit else {
                    anyhow::bail!("rate_limit wrapper requires a [wrappers.rate_limit] section");
                };
                let limiter = rate_limit_wrapper(limit.requests_per_second, limit.burst);
                if settings.rate_limit_endpoints.is_empty() {
                    limiter
                } else {
                    endpoint_wrapper(settings.rate_limit_endpoints.clone(), limiter)
                }
            }
        };
        wrappers.push(wrapper);
    }

    Ok(wrappers)
}

/// 客户端构建器
///
/// 把配置中的发现源、选择器、客户端参数和包装器组装成一个客户端
pub struct ClientBuilder {
    config: Config,
    extra_wrappers: Vec<Wrapper>,
}

impl ClientBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            extra_wrappers: Vec::new(),
        }
    }

    /// 在配置的包装器内侧追加一个包装器
    pub fn with_wrapper(mut self, wrapper: Wrapper) -> Self {
        self.extra_wrappers.push(wrapper);
        self
    }

    pub fn selector(&self) -> Selector {
        let discovery = build_discovery(&self.config.discovery);
        build_selector(discovery, &self.config.selector)
    }

    pub fn build(self, transport: Arc<dyn Transport>) -> Result<Arc<dyn Client>> {
        self.config.validate()?;

        let selector = Arc::new(self.selector());
        let base = SelectClient::new(selector.clone(), transport)
            .with_retries(self.config.client.retries)
            .with_request_timeout(Duration::from_secs(
                self.config.client.request_timeout_seconds,
            ));

        let mut wrappers = build_wrappers(&self.config.wrappers)?;
        wrappers.extend(self.extra_wrappers);

        tracing::info!(
            "Built client: discovery={}, selector={}, filters={}, wrappers={:?}",
            selector.discovery().kind(),
            selector,
            selector.filters().len(),
            self.config.wrappers.order
        );

        Ok(wrap(Arc::new(base), &wrappers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::client::{CallOptions, Request};
    use crate::relay::testing::ScriptedTransport;
    use ferry_core::{CallContext, FilterSpec, Node, RateLimit, Service};

    fn create_config() -> Config {
        let mut config = Config::default();
        config.discovery.services = vec![
            Service::new(
                "greeter",
                "1.0.0",
                vec![Node::new("old", "10.0.0.1:8080").with_metadata("tenant", "a")],
            ),
            Service::new(
                "greeter",
                "1.1.0",
                vec![
                    Node::new("new-a", "10.0.0.2:8080").with_metadata("tenant", "a"),
                    Node::new("new-b", "10.0.0.3:8080").with_metadata("tenant", "b"),
                ],
            ),
        ];
        config.selector.strategy = StrategyKind::RoundRobin;
        config
    }

    #[tokio::test]
    async fn test_build_discovery_kinds() {
        let mut settings = DiscoverySettings::default();
        for (kind, expected) in [
            (DiscoveryKind::Memory, "memory"),
            (DiscoveryKind::Static, "static"),
            (DiscoveryKind::Dns, "dns"),
            (DiscoveryKind::Noop, "noop"),
        ] {
            settings.kind = kind;
            assert_eq!(build_discovery(&settings).kind(), expected);
        }

        settings.kind = DiscoveryKind::Noop;
        settings.cache_ttl_seconds = 30;
        assert_eq!(build_discovery(&settings).kind(), "cache");
    }

    #[tokio::test]
    async fn test_build_selector_from_settings() {
        let config = create_config();
        let mut settings = config.selector.clone();
        settings.filters = vec![FilterSpec::LatestVersion];

        let selector = build_selector(build_discovery(&config.discovery), &settings);
        assert_eq!(selector.to_string(), "roundrobin");
        assert_eq!(selector.filters(), &[Filter::LatestVersion]);
    }

    #[tokio::test]
    async fn test_rate_limit_wrapper_requires_settings() {
        let settings = WrapperSettings {
            order: vec![WrapperKind::RateLimit],
            ..Default::default()
        };
        assert!(build_wrappers(&settings).is_err());

        let settings = WrapperSettings {
            order: vec![WrapperKind::RateLimit, WrapperKind::LatestVersion],
            rate_limit: Some(RateLimit {
                requests_per_second: 10.0,
                burst: 1,
            }),
            rate_limit_endpoints: vec!["Say.Hello".to_string()],
            ..Default::default()
        };
        assert_eq!(build_wrappers(&settings).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_built_client_applies_wrappers() {
        let mut config = create_config();
        config.wrappers.order = vec![WrapperKind::LatestVersion, WrapperKind::MetadataMatch];
        config.wrappers.metadata_match_key = Some("tenant".to_string());

        let transport = Arc::new(ScriptedTransport::new());
        let client = ClientBuilder::new(config).build(transport.clone()).unwrap();

        let ctx = CallContext::new().with_metadata("tenant", "a");
        for _ in 0..3 {
            client
                .call(&ctx, &Request::new("greeter", "Say.Hello"), CallOptions::new())
                .await
                .unwrap();
        }

        assert_eq!(transport.calls(), vec!["new-a", "new-a", "new-a"]);
    }

    #[tokio::test]
    async fn test_built_client_shards_by_metadata() {
        let mut config = create_config();
        config.wrappers.order = vec![WrapperKind::Shard];
        config.wrappers.shard_keys = vec!["tenant".to_string()];

        let transport = Arc::new(ScriptedTransport::new());
        let client = ClientBuilder::new(config).build(transport.clone()).unwrap();

        let ctx = CallContext::new().with_metadata("tenant", "tenant-42");
        for _ in 0..10 {
            client
                .call(&ctx, &Request::new("greeter", "Say.Hello"), CallOptions::new())
                .await
                .unwrap();
        }

        let calls = transport.calls();
        assert_eq!(calls.len(), 10);
        assert!(calls.iter().all(|id| id == &calls[0]));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = create_config();
        config.client.request_timeout_seconds = 0;
        let result = ClientBuilder::new(config).build(Arc::new(ScriptedTransport::new()));
        assert!(result.is_err());
    }
}
