//! 外部查询缓存
//!
//! 缓存只被当作尽力而为的旁路：读写失败一律记录日志后吞掉，
//! 绝不上抛给请求方。`REDIS_URL` 未配置时使用 [`null::NullLocationCache`]
//! 降级为每次直连数据库。

pub mod null;
pub mod redis;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::storage::LocationRecord;

pub use null::NullLocationCache;
pub use redis::RedisLocationCache;

/// 缓存键前缀，完整键形如 `ip_location:8.8.8.8`
pub const CACHE_KEY_PREFIX: &str = "ip_location:";

/// 缓存中的查询结果
///
/// 未命中数据库的查询也会以显式的 `NotFound` 标记写入缓存，
/// 避免同一地址反复打到数据库。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "record", rename_all = "snake_case")]
pub enum CachedLookup {
    Found(LocationRecord),
    NotFound,
}

#[async_trait]
pub trait LocationCache: Send + Sync {
    /// 读取缓存；未命中和任何缓存故障都返回 `None`
    async fn get(&self, ip: &str) -> Option<CachedLookup>;

    /// 带过期时间写入缓存；失败只记录日志
    async fn set(&self, ip: &str, value: &CachedLookup, ttl_seconds: u64);

    /// 缓存服务是否可达（用于 /health 与 /metrics）
    async fn ping(&self) -> bool;
}

pub(crate) fn make_key(ip: &str) -> String {
    format!("{CACHE_KEY_PREFIX}{ip}")
}
