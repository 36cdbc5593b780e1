use async_trait::async_trait;
use ferry_core::CallContext;
use ferry_loadbalance::Strategy;
use std::sync::Arc;

use crate::relay::chain::Wrapper;
use crate::relay::client::{CallOptions, Client, ClientError, Request, Response};

/// 按调用元数据分片
///
/// 把配置的元数据键对应的非空值用 `-` 连接成分片键。调用元数据里没有
/// 任何非空值时不改动调用选项。
pub struct ShardClient {
    keys: Vec<String>,
    inner: Arc<dyn Client>,
}

impl ShardClient {
    pub fn new(keys: Vec<String>, inner: Arc<dyn Client>) -> Self {
        Self { keys, inner }
    }

    fn shard_key(&self, ctx: &CallContext) -> Option<String> {
        let values: Vec<&str> = self
            .keys
            .iter()
            .filter_map(|key| ctx.get(key))
            .filter(|value| !value.is_empty())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join("-"))
        }
    }
}

#[async_trait]
impl Client for ShardClient {
    async fn call(
        &self,
        ctx: &CallContext,
        request: &Request,
        mut opts: CallOptions,
    ) -> Result<Response, ClientError> {
        if let Some(key) = self.shard_key(ctx) {
            tracing::trace!("Sharding call to service '{}' by key '{}'", request.service, key);
            opts = opts.with_strategy(Strategy::shard(key));
        }
        self.inner.call(ctx, request, opts).await
    }
}

pub fn shard_wrapper(keys: Vec<String>) -> Wrapper {
    Box::new(move |inner: Arc<dyn Client>| -> Arc<dyn Client> {
        Arc::new(ShardClient::new(keys.clone(), inner))
    })
}
