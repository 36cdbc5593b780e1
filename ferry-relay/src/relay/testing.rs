use async_trait::async_trait;
use ferry_core::{CallContext, Node};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::client::{CallOptions, Client, ClientError, Request, Response, Transport};

/// 按节点 id 预设结果的传输层
#[derive(Default)]
pub struct ScriptedTransport {
    failing: HashSet<String>,
    slow: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, node_id: &str) -> Self {
        self.failing.insert(node_id.to_string());
        self
    }

    pub fn slow(mut self, node_id: &str, delay: Duration) -> Self {
        self.slow.insert(node_id.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        node: &Node,
        _ctx: &CallContext,
        request: &Request,
    ) -> Result<Response, ClientError> {
        self.calls.lock().push(node.id.clone());

        if let Some(delay) = self.slow.get(&node.id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&node.id) {
            return Err(ClientError::transport(&node.address, "connection refused"));
        }

        Ok(Response::new(
            &node.address,
            json!({ "node": node.id, "endpoint": request.endpoint }),
        ))
    }
}

/// 记录收到的调用选项的客户端，用来检查包装器的效果
#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<(String, CallOptions)>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, CallOptions)> {
        self.calls.lock().clone()
    }

    pub fn last_options(&self) -> Option<CallOptions> {
        self.calls.lock().last().map(|(_, opts)| opts.clone())
    }
}

#[async_trait]
impl Client for RecordingClient {
    async fn call(
        &self,
        _ctx: &CallContext,
        request: &Request,
        opts: CallOptions,
    ) -> Result<Response, ClientError> {
        self.calls.lock().push((request.endpoint.clone(), opts));
        Ok(Response::new("recorded", json!(null)))
    }
}
