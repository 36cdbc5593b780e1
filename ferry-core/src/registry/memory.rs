use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::traits::Discovery;
use super::types::Service;
use crate::error::SelectorError;

/// 进程内注册表
///
/// 用于本地引导配置和测试，按服务名保存各版本的节点列表
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    services: RwLock<HashMap<String, Vec<Service>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用一组服务初始化注册表
    pub fn with_services(services: impl IntoIterator<Item = Service>) -> Self {
        let registry = Self::new();
        for service in services {
            registry.register(service);
        }
        registry
    }

    /// 注册服务；同名同版本的条目按节点 id 合并
    pub fn register(&self, service: Service) {
        let mut services = self.services.write();
        let versions = services.entry(service.name.clone()).or_default();

        match versions.iter_mut().find(|s| s.version == service.version) {
            Some(existing) => {
                for endpoint in service.endpoints {
                    if !existing.endpoints.contains(&endpoint) {
                        existing.endpoints.push(endpoint);
                    }
                }
                for node in service.nodes {
                    match existing.nodes.iter_mut().find(|n| n.id == node.id) {
                        Some(slot) => *slot = node,
                        None => existing.nodes.push(node),
                    }
                }
            }
            None => versions.push(service),
        }
    }

    /// 注销服务中的节点；没有节点的版本和服务名会被移除
    pub fn deregister(&self, service: &Service) {
        let mut services = self.services.write();
        let Some(versions) = services.get_mut(&service.name) else {
            return;
        };

        for existing in versions.iter_mut().filter(|s| s.version == service.version) {
            existing
                .nodes
                .retain(|n| !service.nodes.iter().any(|removed| removed.id == n.id));
        }
        versions.retain(|s| !s.nodes.is_empty());

        if versions.is_empty() {
            services.remove(&service.name);
            tracing::debug!("Removed service '{}' from memory registry", service.name);
        }
    }
}

#[async_trait]
impl Discovery for MemoryRegistry {
    async fn get_service(&self, name: &str) -> Result<Vec<Service>, SelectorError> {
        self.services
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| SelectorError::NotFound(name.to_string()))
    }

    async fn list_services(&self) -> Result<Vec<Service>, SelectorError> {
        let services = self.services.read();
        let mut all: Vec<Service> = services.values().flatten().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));
        Ok(all)
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
