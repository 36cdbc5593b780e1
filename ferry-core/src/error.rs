use thiserror::Error;

/// 节点选择错误
///
/// 所有变体都可以直接用 `matches!` 比较类型，选择层不会吞掉任何错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// 服务发现查找失败或没有返回任何结果
    #[error("service '{0}' not found")]
    NotFound(String),

    /// 过滤或策略之后没有剩余的候选节点
    #[error("no nodes available")]
    NoneAvailable,

    /// DNS 或静态解析失败
    #[error("failed to resolve '{name}': {message}")]
    Resolution { name: String, message: String },

    /// 单次调用的选择参数不合法
    #[error("invalid select option: {0}")]
    InvalidOption(String),
}

impl SelectorError {
    /// 构造解析错误
    pub fn resolution(name: impl Into<String>, message: impl ToString) -> Self {
        Self::Resolution {
            name: name.into(),
            message: message.to_string(),
        }
    }
}
