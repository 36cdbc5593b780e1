use async_trait::async_trait;

use super::types::Service;
use crate::error::SelectorError;

/// 服务发现接口
///
/// 选择器只依赖这个trait，具体的注册中心、DNS或静态列表都在外部实现。
/// 返回的服务列表是一次快照，调用方不得原地修改。
#[async_trait]
pub trait Discovery: Send + Sync {
    /// 获取指定名称的所有服务版本
    async fn get_service(&self, name: &str) -> Result<Vec<Service>, SelectorError>;

    /// 列出所有已知服务
    async fn list_services(&self) -> Result<Vec<Service>, SelectorError>;

    /// 实现名称（用于日志）
    fn kind(&self) -> &'static str;
}
