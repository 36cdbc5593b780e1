use async_trait::async_trait;
use ferry_core::{CallContext, Node};

use super::types::{CallOptions, ClientError, Request, Response};

/// RPC 客户端
///
/// 选择客户端和所有包装器都实现这个 trait，包装器持有内层客户端并在
/// 调用前调整 `CallOptions`。
#[async_trait]
pub trait Client: Send + Sync {
    async fn call(
        &self,
        ctx: &CallContext,
        request: &Request,
        opts: CallOptions,
    ) -> Result<Response, ClientError>;
}

/// 把请求发送到一个具体节点的传输层
///
/// 连接管理和编解码都在这一层之下，选择层只关心结果
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        node: &Node,
        ctx: &CallContext,
        request: &Request,
    ) -> Result<Response, ClientError>;
}
