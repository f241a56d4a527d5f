//! Cache-aside 查询编排
//!
//! 先查缓存，未命中再从连接池借连接查数据库，并把结果按
//! 命中/未命中各自的 TTL 回写缓存。同一地址的并发未命中会各自
//! 查库、各自回写（last write wins），不做 single-flight 合并。

use std::sync::Arc;

use tracing::{debug, error};

use crate::cache::{CachedLookup, LocationCache};
use crate::storage::{DatabasePool, LocationRecord};

/// 命中结果的缓存时长
pub const FOUND_TTL_SECONDS: u64 = 3600;
/// 未命中标记的缓存时长，短一些以免长期遮蔽新导入的数据
pub const NOT_FOUND_TTL_SECONDS: u64 = 300;

/// 单次查询的终态
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(LocationRecord),
    NotFound,
    /// 池中借不到连接或查询失败；与"未收录"严格区分
    BackendUnavailable,
}

pub struct LookupService {
    pool: Arc<DatabasePool>,
    cache: Arc<dyn LocationCache>,
    found_ttl: u64,
    not_found_ttl: u64,
}

impl LookupService {
    pub fn new(pool: Arc<DatabasePool>, cache: Arc<dyn LocationCache>) -> Self {
        LookupService {
            pool,
            cache,
            found_ttl: FOUND_TTL_SECONDS,
            not_found_ttl: NOT_FOUND_TTL_SECONDS,
        }
    }

    /// 覆盖默认 TTL（测试和特殊部署用）
    pub fn with_ttls(mut self, found_ttl: u64, not_found_ttl: u64) -> Self {
        self.found_ttl = found_ttl;
        self.not_found_ttl = not_found_ttl;
        self
    }

    /// 查询一个已通过格式校验的地址
    ///
    /// 缓存命中时完全不触碰数据库。缓存故障等同于未命中，
    /// 降级为直查数据库，不影响请求结果。
    pub async fn lookup(&self, ip: &str) -> LookupOutcome {
        if let Some(cached) = self.cache.get(ip).await {
            debug!("Cache hit for IP: {}", ip);
            return match cached {
                CachedLookup::Found(record) => LookupOutcome::Found(record),
                CachedLookup::NotFound => LookupOutcome::NotFound,
            };
        }

        debug!("Cache miss for IP: {}", ip);

        let conn = match self.pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Database connection unavailable for IP {}: {}", ip, e);
                return LookupOutcome::BackendUnavailable;
            }
        };

        let result = conn.lookup_ip(ip).await;
        // 无论成败都归还；坏掉的连接由池负责丢弃
        self.pool.release(conn);

        match result {
            Ok(Some(record)) => {
                self.cache
                    .set(ip, &CachedLookup::Found(record.clone()), self.found_ttl)
                    .await;
                LookupOutcome::Found(record)
            }
            Ok(None) => {
                self.cache
                    .set(ip, &CachedLookup::NotFound, self.not_found_ttl)
                    .await;
                LookupOutcome::NotFound
            }
            Err(e) => {
                error!("Database query error for IP {}: {}", ip, e);
                LookupOutcome::BackendUnavailable
            }
        }
    }
}
