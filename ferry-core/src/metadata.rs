use std::collections::HashMap;

/// 调用级别的元数据（键值均为字符串）
pub type Metadata = HashMap<String, String>;

/// 单次调用的上下文
///
/// 路由、分片和过滤相关的键都从这里读取，缺失的键只会关闭对应功能，不会报错
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    metadata: Metadata,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有元数据创建上下文
    pub fn from_metadata(metadata: Metadata) -> Self {
        Self { metadata }
    }

    /// 追加一条元数据（链式调用）
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 读取元数据
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// 合并元数据，`overwrite` 为 false 时保留已有的键
    pub fn merge(&mut self, other: &Metadata, overwrite: bool) {
        for (key, value) in other {
            if overwrite || !self.metadata.contains_key(key) {
                self.metadata.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let ctx = CallContext::new().with_metadata("tenant", "tenant-42");
        assert_eq!(ctx.get("tenant"), Some("tenant-42"));
        assert_eq!(ctx.get("datacenter"), None);
    }

    #[test]
    fn test_merge_without_overwrite_keeps_existing() {
        let mut ctx = CallContext::new().with_metadata("dc", "eu-1");
        let mut other = Metadata::new();
        other.insert("dc".to_string(), "us-1".to_string());
        other.insert("tenant".to_string(), "t1".to_string());

        ctx.merge(&other, false);
        assert_eq!(ctx.get("dc"), Some("eu-1"));
        assert_eq!(ctx.get("tenant"), Some("t1"));

        ctx.merge(&other, true);
        assert_eq!(ctx.get("dc"), Some("us-1"));
    }
}
