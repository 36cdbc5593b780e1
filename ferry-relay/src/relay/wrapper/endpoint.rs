use async_trait::async_trait;
use ferry_core::CallContext;
use std::collections::HashSet;
use std::sync::Arc;

use crate::relay::chain::Wrapper;
use crate::relay::client::{CallOptions, Client, ClientError, Request, Response};

/// 只对部分端点生效的包装器
///
/// 端点在允许列表中时走包装后的客户端，否则直接调用内层客户端
pub struct EndpointClient {
    endpoints: HashSet<String>,
    plain: Arc<dyn Client>,
    wrapped: Arc<dyn Client>,
}

impl EndpointClient {
    pub fn new(endpoints: HashSet<String>, plain: Arc<dyn Client>, wrapped: Arc<dyn Client>) -> Self {
        Self {
            endpoints,
            plain,
            wrapped,
        }
    }
}

#[async_trait]
impl Client for EndpointClient {
    async fn call(
        &self,
        ctx: &CallContext,
        request: &Request,
        opts: CallOptions,
    ) -> Result<Response, ClientError> {
        if self.endpoints.contains(&request.endpoint) {
            self.wrapped.call(ctx, request, opts).await
        } else {
            self.plain.call(ctx, request, opts).await
        }
    }
}

pub fn endpoint_wrapper(endpoints: Vec<String>, wrapper: Wrapper) -> Wrapper {
    let endpoints: HashSet<String> = endpoints.into_iter().collect();
    Box::new(move |inner: Arc<dyn Client>| -> Arc<dyn Client> {
        let wrapped = wrapper(inner.clone());
        Arc::new(EndpointClient::new(endpoints.clone(), inner, wrapped))
    })
}
