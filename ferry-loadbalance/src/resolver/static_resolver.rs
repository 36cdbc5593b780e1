use async_trait::async_trait;
use ferry_core::{Discovery, Node, SelectorError, Service};

/// 固定节点列表
///
/// 没有配置节点时，返回一个以服务名本身作为地址的合成节点，
/// 适合没有注册中心、服务名就是 host:port 的场景
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    nodes: Vec<Node>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

#[async_trait]
impl Discovery for StaticResolver {
    async fn get_service(&self, name: &str) -> Result<Vec<Service>, SelectorError> {
        if name.is_empty() {
            return Err(SelectorError::resolution(name, "empty service name"));
        }

        let nodes = if self.nodes.is_empty() {
            vec![Node::new(name, name)]
        } else {
            self.nodes.clone()
        };

        Ok(vec![Service::new(name, "", nodes)])
    }

    async fn list_services(&self) -> Result<Vec<Service>, SelectorError> {
        Ok(Vec::new())
    }

    fn kind(&self) -> &'static str {
        "static"
    }
}
