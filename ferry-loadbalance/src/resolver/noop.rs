use async_trait::async_trait;
use ferry_core::{Discovery, SelectorError, Service};

/// 总是返回空列表，用来有意让选择短路
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

#[async_trait]
impl Discovery for NoopResolver {
    async fn get_service(&self, _name: &str) -> Result<Vec<Service>, SelectorError> {
        Ok(Vec::new())
    }

    async fn list_services(&self) -> Result<Vec<Service>, SelectorError> {
        Ok(Vec::new())
    }

    fn kind(&self) -> &'static str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_is_empty() {
        let resolver = NoopResolver;
        assert!(resolver.get_service("greeter").await.unwrap().is_empty());
        assert!(resolver.list_services().await.unwrap().is_empty());
    }
}
