use async_trait::async_trait;
use ferry_core::CallContext;
use ferry_loadbalance::Filter;
use std::sync::Arc;

use crate::relay::chain::Wrapper;
use crate::relay::client::{CallOptions, Client, ClientError, Request, Response};

/// 只调用元数据匹配的节点
///
/// 匹配的值来自本次调用的元数据，调用里没有这个键时不做过滤
pub struct MetadataClient {
    key: String,
    inner: Arc<dyn Client>,
}

impl MetadataClient {
    pub fn new(key: impl Into<String>, inner: Arc<dyn Client>) -> Self {
        Self {
            key: key.into(),
            inner,
        }
    }
}

#[async_trait]
impl Client for MetadataClient {
    async fn call(
        &self,
        ctx: &CallContext,
        request: &Request,
        mut opts: CallOptions,
    ) -> Result<Response, ClientError> {
        if let Some(value) = ctx.get(&self.key) {
            opts = opts.with_filter(Filter::metadata(self.key.as_str(), value));
        }
        self.inner.call(ctx, request, opts).await
    }
}

pub fn metadata_wrapper(key: impl Into<String>) -> Wrapper {
    let key = key.into();
    Box::new(move |inner: Arc<dyn Client>| -> Arc<dyn Client> {
        Arc::new(MetadataClient::new(key.as_str(), inner))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::chain::wrap;
    use crate::relay::client::SelectClient;
    use crate::relay::testing::{RecordingClient, ScriptedTransport};
    use ferry_core::{MemoryRegistry, Node, Service};
    use ferry_loadbalance::Selector;

    #[tokio::test]
    async fn test_filter_from_call_metadata() {
        let base = Arc::new(RecordingClient::new());
        let client = wrap(base.clone(), &[metadata_wrapper("datacenter")]);

        let ctx = CallContext::new().with_metadata("datacenter", "eu-1");
        client
            .call(&ctx, &Request::new("greeter", "Say.Hello"), CallOptions::new())
            .await
            .unwrap();

        assert_eq!(
            base.last_options().unwrap().select.filters,
            vec![Filter::metadata("datacenter", "eu-1")]
        );
    }

    #[tokio::test]
    async fn test_absent_key_is_transparent() {
        let base = Arc::new(RecordingClient::new());
        let client = wrap(base.clone(), &[metadata_wrapper("datacenter")]);

        client
            .call(
                &CallContext::new(),
                &Request::new("greeter", "Say.Hello"),
                CallOptions::new(),
            )
            .await
            .unwrap();

        assert!(base.last_options().unwrap().select.filters.is_empty());
    }

    #[tokio::test]
    async fn test_routes_to_matching_node() {
        let registry = Arc::new(MemoryRegistry::with_services(vec![Service::new(
            "greeter",
            "1.0.0",
            vec![
                Node::new("eu", "10.0.0.1:8080").with_metadata("datacenter", "eu-1"),
                Node::new("us", "10.0.0.2:8080").with_metadata("datacenter", "us-1"),
            ],
        )]));
        let selector = Arc::new(Selector::new(registry));
        let base = Arc::new(SelectClient::new(selector, Arc::new(ScriptedTransport::new())));
        let client = wrap(base, &[metadata_wrapper("datacenter")]);

        let ctx = CallContext::new().with_metadata("datacenter", "us-1");
        for _ in 0..10 {
            let response = client
                .call(&ctx, &Request::new("greeter", "Say.Hello"), CallOptions::new())
                .await
                .unwrap();
            assert_eq!(response.address, "10.0.0.2:8080");
        }
    }
}
