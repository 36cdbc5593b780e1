use ferry_core::{Discovery, Node, SelectorError, Service};
use std::fmt;
use std::sync::Arc;

use super::filter::Filter;
use super::options::SelectOptions;
use super::strategy::{NodeIterator, Strategy};

/// 节点选择器
///
/// 组合服务发现、默认过滤器和默认策略，对外只暴露一个 `select` 入口。
/// 在客户端构建时创建一次，之后以引用方式共享。
pub struct Selector {
    discovery: Arc<dyn Discovery>,
    strategy: Strategy,
    filters: Vec<Filter>,
}

impl Selector {
    /// 创建选择器，默认使用随机策略且没有默认过滤器
    pub fn new(discovery: Arc<dyn Discovery>) -> Self {
        Self {
            discovery,
            strategy: Strategy::random(),
            filters: Vec::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// 追加一个默认过滤器
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn discovery(&self) -> &Arc<dyn Discovery> {
        &self.discovery
    }

    /// 为服务选择节点
    ///
    /// 1. 查询服务发现，错误原样返回
    /// 2. 先应用默认过滤器，再按传入顺序应用单次调用的过滤器
    /// 3. 没有剩余节点时返回 `NoneAvailable`
    /// 4. 单次调用的策略优先于默认策略
    pub async fn select(
        &self,
        service: &str,
        opts: SelectOptions,
    ) -> Result<NodeIterator, SelectorError> {
        opts.validate()?;

        let mut services = self.discovery.get_service(service).await?;
        let discovered = node_count(&services);

        for filter in self.filters.iter().chain(opts.filters.iter()) {
            services = filter.apply(&services);
            tracing::trace!(
                "Filter {} left {} nodes for service '{}'",
                filter,
                node_count(&services),
                service
            );
        }

        let remaining = node_count(&services);
        if remaining == 0 {
            tracing::debug!(
                "No nodes available for service '{}' ({} discovered via {}, {} after filters)",
                service,
                discovered,
                self.discovery.kind(),
                remaining
            );
            return Err(SelectorError::NoneAvailable);
        }

        let strategy = opts.strategy.as_ref().unwrap_or(&self.strategy);
        tracing::debug!(
            "Selecting from {} of {} nodes for service '{}' using {} strategy",
            remaining,
            discovered,
            service,
            strategy
        );

        strategy.apply(service, &services)
    }

    /// 反馈一次调用结果
    ///
    /// 目前所有策略都不使用反馈，这里只记录日志，为后续熔断预留
    pub fn mark(&self, service: &str, node: &Node, error: Option<&dyn std::error::Error>) {
        match error {
            Some(e) => tracing::debug!(
                "Call to service '{}' node {} ({}) failed: {}",
                service,
                node.id,
                node.address,
                e
            ),
            None => tracing::trace!(
                "Call to service '{}' node {} ({}) succeeded",
                service,
                node.id,
                node.address
            ),
        }
    }

    /// 清除服务的累计策略状态
    pub fn reset(&self, service: &str) {
        self.strategy.reset(service);
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.strategy)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("discovery", &self.discovery.kind())
            .field("strategy", &self.strategy)
            .field("filters", &self.filters)
            .finish()
    }
}

fn node_count(services: &[Service]) -> usize {
    services.iter().map(|s| s.nodes.len()).sum()
}
