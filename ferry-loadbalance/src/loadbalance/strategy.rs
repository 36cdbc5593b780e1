use ferry_core::{flatten_nodes, Node, SelectorError, Service};
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 负载均衡策略
///
/// 封闭的策略集合，在构造时选定。策略本身可以在多个调用之间共享，
/// 需要跨调用保存的状态（轮询计数器）放在策略实例上而不是迭代器上。
#[derive(Debug, Clone)]
pub enum Strategy {
    /// 均匀随机
    Random,
    /// 按服务名轮询
    RoundRobin(RoundRobin),
    /// 按路由键的校验和固定到一个节点
    Shard(Shard),
}

impl Strategy {
    pub fn random() -> Self {
        Strategy::Random
    }

    pub fn round_robin() -> Self {
        Strategy::RoundRobin(RoundRobin::new())
    }

    pub fn shard(key: impl Into<String>) -> Self {
        Strategy::Shard(Shard::new(key))
    }

    /// 把过滤后的服务列表转换为节点迭代器
    pub fn apply(&self, service: &str, services: &[Service]) -> Result<NodeIterator, SelectorError> {
        let nodes = flatten_nodes(services);
        if nodes.is_empty() {
            return Err(SelectorError::NoneAvailable);
        }

        let picker = match self {
            Strategy::Random => Picker::Random,
            Strategy::RoundRobin(rr) => Picker::RoundRobin {
                service: service.to_string(),
                counters: rr.counters.clone(),
            },
            Strategy::Shard(shard) => Picker::Fixed(shard.index(nodes.len())),
        };

        Ok(NodeIterator { nodes, picker })
    }

    /// 检查单次调用传入的策略是否合法
    pub fn validate(&self) -> Result<(), SelectorError> {
        match self {
            Strategy::Shard(shard) if shard.key.is_empty() => Err(SelectorError::InvalidOption(
                "shard strategy requires a non-empty key".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// 清除指定服务的累计状态
    pub fn reset(&self, service: &str) {
        if let Strategy::RoundRobin(rr) = self {
            rr.reset(service);
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Random => write!(f, "random"),
            Strategy::RoundRobin(_) => write!(f, "roundrobin"),
            Strategy::Shard(_) => write!(f, "shard"),
        }
    }
}

/// 轮询状态
///
/// 所有服务共用一把锁，每次选择只做 O(1) 的工作
#[derive(Debug, Clone, Default)]
pub struct RoundRobin {
    counters: Arc<Mutex<HashMap<String, usize>>>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前计数（未取模）
    pub fn counter(&self, service: &str) -> usize {
        self.counters.lock().get(service).copied().unwrap_or(0)
    }

    pub fn reset(&self, service: &str) {
        if self.counters.lock().remove(service).is_some() {
            tracing::debug!("Reset round robin counter for service '{}'", service);
        }
    }
}

/// 分片路由
///
/// 相同的 key 和相同的节点集合总是映射到同一个节点。节点集合变化时所有
/// key 的映射都可能改变（没有一致性哈希环）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    key: String,
}

impl Shard {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn index(&self, pool_size: usize) -> usize {
        let checksum = crc32fast::hash(self.key.as_bytes());
        (u64::from(checksum) % pool_size as u64) as usize
    }
}

#[derive(Debug)]
enum Picker {
    Random,
    RoundRobin {
        service: String,
        counters: Arc<Mutex<HashMap<String, usize>>>,
    },
    Fixed(usize),
}

/// 单次选择的节点游标
///
/// 由 `Strategy::apply` 创建，不能重置。节点池只有一个节点时永远返回该节点。
#[derive(Debug)]
pub struct NodeIterator {
    nodes: Vec<Node>,
    picker: Picker,
}

impl NodeIterator {
    /// 取下一个节点
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Node, SelectorError> {
        let len = self.nodes.len();
        if len == 0 {
            return Err(SelectorError::NoneAvailable);
        }
        if len == 1 {
            return Ok(self.nodes[0].clone());
        }

        let index = match &self.picker {
            Picker::Random => rand::rng().random_range(0..len),
            Picker::RoundRobin { service, counters } => {
                let mut counters = counters.lock();
                let counter = counters.entry(service.clone()).or_insert(0);
                let index = *counter % len;
                *counter = counter.wrapping_add(1);
                index
            }
            Picker::Fixed(index) => *index,
        };

        tracing::trace!("Picked node {} of {}", index, len);
        Ok(self.nodes[index].clone())
    }

    /// 候选节点（按展开顺序）
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
