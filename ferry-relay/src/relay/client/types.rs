use ferry_core::SelectorError;
use ferry_loadbalance::{Filter, SelectOptions, Strategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

// 定义客户端错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error(transparent)]
    Select(#[from] SelectorError),
    #[error("transport error calling {address}: {message}")]
    Transport { address: String, message: String },
    #[error("request to {address} timed out after {timeout_ms}ms")]
    Timeout { address: String, timeout_ms: u64 },
}

impl ClientError {
    pub fn transport(address: impl Into<String>, message: impl ToString) -> Self {
        ClientError::Transport {
            address: address.into(),
            message: message.to_string(),
        }
    }

    /// 选择阶段的错误不会因为换节点而恢复
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ClientError::Select(_))
    }
}

/// 一次远程调用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub service: String,
    pub endpoint: String,
    #[serde(default)]
    pub body: Value,
}

impl Request {
    pub fn new(service: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            endpoint: endpoint.into(),
            body: Value::Null,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }
}

// 客户端响应类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// 实际处理请求的节点地址
    pub address: String,
    #[serde(default)]
    pub body: Value,
}

impl Response {
    pub fn new(address: impl Into<String>, body: Value) -> Self {
        Self {
            address: address.into(),
            body,
        }
    }
}

/// 单次调用的选项
///
/// 包装器通过修改 `select` 字段把路由偏好传给内层的选择客户端
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub select: SelectOptions,
    pub retries: Option<u32>,
    pub request_timeout: Option<Duration>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.select = self.select.with_strategy(strategy);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.select = self.select.with_filter(filter);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_errors_are_not_retryable() {
        assert!(!ClientError::from(SelectorError::NoneAvailable).is_retryable());
        assert!(ClientError::transport("10.0.0.1:8080", "connection refused").is_retryable());
        assert!(ClientError::Timeout {
            address: "10.0.0.1:8080".to_string(),
            timeout_ms: 100
        }
        .is_retryable());
    }

    #[test]
    fn test_selector_error_message_is_transparent() {
        let err = ClientError::from(SelectorError::NotFound("greeter".to_string()));
        assert_eq!(
            err.to_string(),
            SelectorError::NotFound("greeter".to_string()).to_string()
        );
    }

    #[test]
    fn test_call_options_builders() {
        let opts = CallOptions::new()
            .with_filter(Filter::LatestVersion)
            .with_strategy(Strategy::shard("tenant-1"))
            .with_retries(2)
            .with_request_timeout(Duration::from_millis(250));

        assert_eq!(opts.select.filters, vec![Filter::LatestVersion]);
        assert!(matches!(opts.select.strategy, Some(Strategy::Shard(_))));
        assert_eq!(opts.retries, Some(2));
        assert_eq!(opts.request_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_request_deserializes_without_body() {
        let request: Request =
            serde_json::from_str(r#"{"service":"greeter","endpoint":"Say.Hello"}"#).unwrap();
        assert_eq!(request, Request::new("greeter", "Say.Hello"));
    }
}
