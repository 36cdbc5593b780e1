use async_trait::async_trait;
use ferry_core::{CallContext, SelectorError};
use ferry_loadbalance::Selector;
use std::sync::Arc;
use std::time::Duration;

use super::traits::{Client, Transport};
use super::types::{CallOptions, ClientError, Request, Response};

/// 基于选择器的客户端
///
/// 每次调用做一次 `select`，失败时从同一个节点迭代器中重新取节点，
/// 每次尝试的结果都通过 `mark` 反馈给选择器。
pub struct SelectClient {
    selector: Arc<Selector>,
    transport: Arc<dyn Transport>,
    retries: u32,
    request_timeout: Duration,
}

impl SelectClient {
    pub fn new(selector: Arc<Selector>, transport: Arc<dyn Transport>) -> Self {
        Self {
            selector,
            transport,
            retries: 1,
            request_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn selector(&self) -> &Arc<Selector> {
        &self.selector
    }
}

#[async_trait]
impl Client for SelectClient {
    async fn call(
        &self,
        ctx: &CallContext,
        request: &Request,
        opts: CallOptions,
    ) -> Result<Response, ClientError> {
        let retries = opts.retries.unwrap_or(self.retries);
        let timeout = opts.request_timeout.unwrap_or(self.request_timeout);
        let attempts = retries.saturating_add(1);

        let mut next = self.selector.select(&request.service, opts.select).await?;
        let mut last_error = None;

        for attempt in 0..attempts {
            let node = next.next()?;
            tracing::debug!(
                "Calling {}.{} on node {} ({}), attempt {}/{}",
                request.service,
                request.endpoint,
                node.id,
                node.address,
                attempt + 1,
                attempts
            );

            let result =
                match tokio::time::timeout(timeout, self.transport.send(&node, ctx, request)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(ClientError::Timeout {
                        address: node.address.clone(),
                        timeout_ms: timeout.as_millis() as u64,
                    }),
                };

            match result {
                Ok(response) => {
                    self.selector.mark(&request.service, &node, None);
                    return Ok(response);
                }
                Err(e) => {
                    self.selector.mark(&request.service, &node, Some(&e));
                    if !e.is_retryable() {
                        return Err(e);
                    }
                    if attempt + 1 < attempts {
                        tracing::warn!("Request failed on attempt {}, retrying: {}", attempt + 1, e);
                    } else {
                        tracing::error!(
                            "Request to service '{}' failed after {} attempts: {}",
                            request.service,
                            attempts,
                            e
                        );
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(ClientError::Select(SelectorError::NoneAvailable)))
    }
}
