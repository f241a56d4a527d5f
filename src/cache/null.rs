//! 空缓存实现：`REDIS_URL` 未配置或 Redis 不可达时的降级模式

use async_trait::async_trait;
use tracing::trace;

use crate::cache::{CachedLookup, LocationCache};

pub struct NullLocationCache;

impl NullLocationCache {
    pub fn new() -> Self {
        trace!("Using NullLocationCache: lookups always go to the database");
        NullLocationCache
    }
}

impl Default for NullLocationCache {
    fn default() -> Self {
        NullLocationCache::new()
    }
}

#[async_trait]
impl LocationCache for NullLocationCache {
    async fn get(&self, ip: &str) -> Option<CachedLookup> {
        trace!("NullLocationCache.get called for IP: {}", ip);
        None
    }

    async fn set(&self, ip: &str, _value: &CachedLookup, _ttl_seconds: u64) {
        trace!("NullLocationCache.set called for IP: {}", ip);
    }

    async fn ping(&self) -> bool {
        false
    }
}
