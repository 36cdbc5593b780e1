use async_trait::async_trait;
use ferry_core::{Discovery, SelectorError, Service};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// 缓存条目
#[derive(Debug, Clone)]
struct CacheEntry {
    services: Vec<Service>,
    created_at: Instant,
}

impl CacheEntry {
    fn new(services: Vec<Service>) -> Self {
        Self {
            services,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// 带TTL的服务发现缓存
///
/// 包装任意服务发现来源，按服务名缓存 `get_service` 的结果。
/// 每次返回的都是副本，调用方拿到的快照互不影响。
/// 过期条目不会主动清理，只在容量满时按时间淘汰；底层查询失败时
/// 继续使用过期数据。`NotFound` 或空结果会立即移除对应条目。
pub struct CachingDiscovery {
    inner: Arc<dyn Discovery>,
    cache: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
    // 统计信息
    total_requests: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    evictions: AtomicU64,
}

impl CachingDiscovery {
    /// 创建新的缓存实例
    pub fn new(inner: Arc<dyn Discovery>, ttl: Duration) -> Self {
        Self::with_capacity(inner, ttl, 1000)
    }

    pub fn with_capacity(inner: Arc<dyn Discovery>, ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
            total_requests: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// 移除单个服务的缓存
    pub async fn invalidate(&self, name: &str) {
        if self.cache.write().await.remove(name).is_some() {
            debug!("Invalidated discovery cache for service '{}'", name);
        }
    }

    /// 清空缓存
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        let count = cache.len();
        cache.clear();
        debug!("Cleared {} discovery cache entries", count);
    }

    /// 获取缓存统计信息
    pub async fn stats(&self) -> CacheStats {
        let cache = self.cache.read().await;
        CacheStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: cache.len(),
        }
    }

    async fn lookup(&self, name: &str) -> Option<Vec<Service>> {
        let cache = self.cache.read().await;
        let entry = cache.get(name)?;
        if entry.is_expired(self.ttl) {
            debug!("Discovery cache entry expired for service '{}'", name);
            return None;
        }
        Some(entry.services.clone())
    }

    async fn store(&self, name: &str, services: Vec<Service>) {
        let mut cache = self.cache.write().await;

        if cache.len() >= self.max_entries && !cache.contains_key(name) {
            let oldest = cache
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                cache.remove(&key);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                debug!("Evicted discovery cache entry for service '{}'", key);
            }
        }

        cache.insert(name.to_string(), CacheEntry::new(services));
    }

    async fn remove(&self, name: &str) {
        if self.cache.write().await.remove(name).is_some() {
            debug!("Dropped discovery cache entry for missing service '{}'", name);
        }
    }

    async fn stale(&self, name: &str) -> Option<Vec<Service>> {
        let cache = self.cache.read().await;
        cache
            .get(name)
            .filter(|entry| !entry.services.is_empty())
            .map(|entry| entry.services.clone())
    }
}

#[async_trait]
impl Discovery for CachingDiscovery {
    async fn get_service(&self, name: &str) -> Result<Vec<Service>, SelectorError> {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        if let Some(services) = self.lookup(name).await {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            trace!("Discovery cache hit for service '{}'", name);
            return Ok(services);
        }

        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        trace!("Discovery cache miss for service '{}'", name);

        match self.inner.get_service(name).await {
            Ok(services) => {
                if services.is_empty() {
                    self.remove(name).await;
                } else {
                    self.store(name, services.clone()).await;
                }
                Ok(services)
            }
            Err(e @ SelectorError::NotFound(_)) => {
                self.remove(name).await;
                Err(e)
            }
            Err(e) => match self.stale(name).await {
                Some(services) => {
                    warn!(
                        "Discovery lookup for service '{}' failed ({}), serving stale cache",
                        name, e
                    );
                    Ok(services)
                }
                None => Err(e),
            },
        }
    }

    async fn list_services(&self) -> Result<Vec<Service>, SelectorError> {
        self.inner.list_services().await
    }

    fn kind(&self) -> &'static str {
        "cache"
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

impl CacheStats {
    /// 命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests > 0 {
            self.cache_hits as f64 / self.total_requests as f64
        } else {
            0.0
        }
    }
}
