use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 服务的一个具体实例
///
/// 从服务发现拿到后视为不可变，任何子集都必须是新的集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// host:port
    pub address: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Node {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            metadata: HashMap::new(),
        }
    }

    /// 附加一个元数据标签（例如数据中心）
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// 一组具有相同名称和版本的等价实例
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// 服务暴露的端点名称，例如 `Greeter.Hello`
    #[serde(default)]
    pub endpoints: Vec<String>,
}

impl Service {
    pub fn new(name: impl Into<String>, version: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            nodes,
            endpoints: Vec::new(),
        }
    }

    pub fn with_endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }
}

/// 按服务顺序、再按节点顺序展开所有节点
pub fn flatten_nodes(services: &[Service]) -> Vec<Node> {
    services
        .iter()
        .flat_map(|service| service.nodes.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_preserves_service_then_node_order() {
        let services = vec![
            Service::new("greeter", "1.0.0", vec![Node::new("a", "10.0.0.1:8080")]),
            Service::new(
                "greeter",
                "1.1.0",
                vec![Node::new("b", "10.0.0.2:8080"), Node::new("c", "10.0.0.3:8080")],
            ),
        ];

        let ids: Vec<String> = flatten_nodes(&services).into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten_nodes(&[]).is_empty());
        let services = vec![Service::new("greeter", "1.0.0", vec![])];
        assert!(flatten_nodes(&services).is_empty());
    }
}
