use async_trait::async_trait;
use ferry_core::CallContext;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::relay::chain::Wrapper;
use crate::relay::client::{CallOptions, Client, ClientError, Request, Response};

/// 令牌桶
///
/// 桶的容量为 `burst`，以 `requests_per_second` 的速度补充令牌。
/// 初始时桶是满的。速率不是正的有限值时不限流。
#[derive(Debug)]
pub struct TokenBucket {
    requests_per_second: f64,
    unlimited: bool,
    burst: f64,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl BucketState {
    fn refill(&mut self, requests_per_second: f64, burst: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * requests_per_second).min(burst);
        self.last_refill = now;
    }
}

impl TokenBucket {
    pub fn new(requests_per_second: f64, burst: u32) -> Self {
        let burst = f64::from(burst.max(1));
        let unlimited = !(requests_per_second.is_finite() && requests_per_second > 0.0);
        if unlimited {
            tracing::warn!(
                "Invalid rate limit of {} requests per second, calls will not be limited",
                requests_per_second
            );
        }
        Self {
            requests_per_second,
            unlimited,
            burst,
            state: Mutex::new(BucketState {
                tokens: burst,
                last_refill: Instant::now(),
            }),
        }
    }

    /// 尝试立即取一个令牌，取不到时返回需要等待的时间
    pub fn try_acquire(&self) -> Result<(), Duration> {
        if self.unlimited {
            return Ok(());
        }

        let mut state = self.state.lock();
        state.refill(self.requests_per_second, self.burst);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - state.tokens;
            Err(Duration::from_secs_f64(missing / self.requests_per_second))
        }
    }

    /// 等待直到取得一个令牌
    ///
    /// 没有超时，调用方需要自行限制等待时间
    pub async fn acquire(&self) {
        loop {
            match self.try_acquire() {
                Ok(()) => return,
                Err(wait) => {
                    tracing::trace!("Rate limit reached, waiting {:?} for a token", wait);
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// 当前可用的令牌数（包含尚未结算的补充）
    pub fn available(&self) -> f64 {
        if self.unlimited {
            return f64::INFINITY;
        }

        let mut state = self.state.lock();
        state.refill(self.requests_per_second, self.burst);
        state.tokens
    }
}

/// 限流客户端
///
/// 只控制调用节奏，不改变调用选项，也不会因为限流返回错误
pub struct RateLimitClient {
    bucket: Arc<TokenBucket>,
    inner: Arc<dyn Client>,
}

impl RateLimitClient {
    pub fn new(bucket: Arc<TokenBucket>, inner: Arc<dyn Client>) -> Self {
        Self { bucket, inner }
    }
}

#[async_trait]
impl Client for RateLimitClient {
    async fn call(
        &self,
        ctx: &CallContext,
        request: &Request,
        opts: CallOptions,
    ) -> Result<Response, ClientError> {
        self.bucket.acquire().await;
        self.inner.call(ctx, request, opts).await
    }
}

/// 创建限流包装器，同一个包装器产生的所有客户端共享一个令牌桶
pub fn rate_limit_wrapper(requests_per_second: f64, burst: u32) -> Wrapper {
    let bucket = Arc::new(TokenBucket::new(requests_per_second, burst));
    Box::new(move |inner: Arc<dyn Client>| -> Arc<dyn Client> {
        Arc::new(RateLimitClient::new(bucket.clone(), inner))
    })
}
