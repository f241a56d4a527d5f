//! Redis 缓存实现
//!
//! 维护一条缓存起来的 multiplexed 异步连接，出错时重置，下次访问重建。

use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::{debug, error, trace, warn};

use crate::cache::{CachedLookup, LocationCache, make_key};
use crate::errors::{IpLocationError, Result};

pub struct RedisLocationCache {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
}

impl RedisLocationCache {
    /// 创建客户端并用同步 PING 验证可达性
    ///
    /// PING 失败返回错误，由调用方决定是否降级为空缓存。
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            IpLocationError::cache_connection(format!("failed to create Redis client: {e}"))
        })?;

        match client.get_connection() {
            Ok(mut conn) => match redis::cmd("PING").query::<String>(&mut conn) {
                Ok(response) => {
                    debug!("Redis connection test successful: {}", response);
                }
                Err(e) => {
                    error!(
                        "Failed to ping Redis server: {}. Check Redis server status and URL: {}",
                        e, url
                    );
                    return Err(IpLocationError::cache_connection(format!(
                        "Redis ping failed: {e}"
                    )));
                }
            },
            Err(e) => {
                error!(
                    "Failed to connect to Redis server: {}. Check Redis server status and URL: {}",
                    e, url
                );
                return Err(IpLocationError::cache_connection(format!(
                    "Redis connection failed: {e}"
                )));
            }
        }

        Ok(RedisLocationCache {
            client,
            connection: Arc::new(RwLock::new(None)),
        })
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> std::result::Result<MultiplexedConnection, redis::RedisError> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }
}

#[async_trait]
impl LocationCache for RedisLocationCache {
    async fn get(&self, ip: &str) -> Option<CachedLookup> {
        let redis_key = make_key(ip);

        let mut conn = match self.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                warn!("Redis cache read error for IP {}: {}", ip, e);
                self.reset_connection().await;
                return None;
            }
        };

        let result: redis::RedisResult<Option<String>> = conn.get(&redis_key).await;

        match result {
            Ok(Some(data)) => match serde_json::from_str(&data) {
                Ok(cached) => {
                    trace!("Cache hit for key: {}", redis_key);
                    Some(cached)
                }
                Err(e) => {
                    error!("Failed to deserialize cached lookup for '{}': {}", redis_key, e);
                    None
                }
            },
            Ok(None) => {
                trace!("Cache miss for key: {}", redis_key);
                None
            }
            Err(e) => {
                warn!("Redis cache read error for IP {}: {}", ip, e);
                self.reset_connection().await;
                None
            }
        }
    }

    async fn set(&self, ip: &str, value: &CachedLookup, ttl_seconds: u64) {
        let redis_key = make_key(ip);

        let serialized = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to serialize lookup result for '{}': {}", redis_key, e);
                return;
            }
        };

        let mut conn = match self.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                warn!("Redis cache write error for IP {}: {}", ip, e);
                self.reset_connection().await;
                return;
            }
        };

        match conn
            .set_ex::<String, String, ()>(redis_key, serialized, ttl_seconds)
            .await
        {
            Ok(_) => {
                trace!("Cached lookup result for IP {} (ttl {}s)", ip, ttl_seconds);
            }
            Err(e) => {
                warn!("Redis cache write error for IP {}: {}", ip, e);
                self.reset_connection().await;
            }
        }
    }

    async fn ping(&self) -> bool {
        let mut conn = match self.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                warn!("Redis health check failed: {}", e);
                self.reset_connection().await;
                return false;
            }
        };

        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Redis health check failed: {}", e);
                self.reset_connection().await;
                false
            }
        }
    }
}
