use async_trait::async_trait;
use ferry_core::{Discovery, Node, SelectorError, Service};
use hickory_resolver::{config::ResolverConfig, name_server::TokioConnectionProvider, Resolver};
use parking_lot::RwLock;
use std::net::SocketAddr;
use tracing::debug;

/// Default domain suffix for SRV lookups.
const DEFAULT_DOMAIN: &str = "local";

/// DNS 解析器
///
/// - 名称是 `host:port` 时查询 A/AAAA 记录，每个 IP 生成一个 `ip:port` 节点
/// - 否则查询 `_<name>._tcp.<domain>` 的 SRV 记录，每条记录生成一个 `target:port` 节点
///
/// 节点只在本次查询内有效，id 就是解析出的目标
pub struct DnsResolver {
    domain: String,
    resolver: RwLock<Option<Resolver<TokioConnectionProvider>>>,
}

impl DnsResolver {
    pub fn new() -> Self {
        Self::with_domain(DEFAULT_DOMAIN)
    }

    pub fn with_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            resolver: RwLock::new(None),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    fn resolver(&self) -> Resolver<TokioConnectionProvider> {
        if let Some(resolver) = self.resolver.read().as_ref() {
            return resolver.clone();
        }

        let mut guard = self.resolver.write();
        guard
            .get_or_insert_with(|| {
                Resolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
                .build()
            })
            .clone()
    }

    async fn lookup_host(
        &self,
        name: &str,
        host: &str,
        port: u16,
    ) -> Result<Vec<Node>, SelectorError> {
        debug!("Performing DNS A/AAAA lookup for {}", host);

        let lookup = self
            .resolver()
            .lookup_ip(host)
            .await
            .map_err(|e| SelectorError::resolution(name, e))?;

        Ok(lookup
            .iter()
            .map(|ip| {
                let address = SocketAddr::new(ip, port).to_string();
                Node::new(ip.to_string(), address)
            })
            .collect())
    }

    async fn lookup_srv(&self, name: &str) -> Result<Vec<Node>, SelectorError> {
        let query = srv_name(name, &self.domain);
        debug!("Performing DNS SRV lookup for {}", query);

        let lookup = self
            .resolver()
            .srv_lookup(query.as_str())
            .await
            .map_err(|e| SelectorError::resolution(name, e))?;

        Ok(lookup
            .iter()
            .map(|srv| {
                let target = srv.target().to_utf8();
                let target = target.trim_end_matches('.');
                Node::new(target, format!("{}:{}", target, srv.port()))
            })
            .collect())
    }
}

impl Default for DnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Discovery for DnsResolver {
    async fn get_service(&self, name: &str) -> Result<Vec<Service>, SelectorError> {
        let nodes = match split_host_port(name) {
            Some((host, port)) => self.lookup_host(name, host, port).await?,
            None => self.lookup_srv(name).await?,
        };

        debug!("DNS lookup for '{}' returned {} nodes", name, nodes.len());
        Ok(vec![Service::new(name, "", nodes)])
    }

    async fn list_services(&self) -> Result<Vec<Service>, SelectorError> {
        Ok(Vec::new())
    }

    fn kind(&self) -> &'static str {
        "dns"
    }
}

/// 拆分 `host:port`，支持 `[::1]:8080` 形式
fn split_host_port(name: &str) -> Option<(&str, u16)> {
    let (host, port) = name.rsplit_once(':')?;
    let port = port.parse().ok()?;
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    if host.is_empty() || (host.contains(':') && !name.starts_with('[')) {
        return None;
    }
    Some((host, port))
}

fn srv_name(service: &str, domain: &str) -> String {
    format!("_{}._tcp.{}.", service, domain.trim_end_matches('.'))
}
