use async_trait::async_trait;
use ferry_core::CallContext;
use ferry_loadbalance::Filter;
use std::sync::Arc;

use crate::relay::chain::Wrapper;
use crate::relay::client::{CallOptions, Client, ClientError, Request, Response};

/// 只调用最新版本的服务
pub struct LatestVersionClient {
    inner: Arc<dyn Client>,
}

impl LatestVersionClient {
    pub fn new(inner: Arc<dyn Client>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Client for LatestVersionClient {
    async fn call(
        &self,
        ctx: &CallContext,
        request: &Request,
        opts: CallOptions,
    ) -> Result<Response, ClientError> {
        let opts = opts.with_filter(Filter::LatestVersion);
        self.inner.call(ctx, request, opts).await
    }
}

pub fn latest_version_wrapper() -> Wrapper {
    Box::new(|inner: Arc<dyn Client>| -> Arc<dyn Client> {
        Arc::new(LatestVersionClient::new(inner))
    })
}
