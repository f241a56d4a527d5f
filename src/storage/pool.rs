//! 有界数据库连接池
//!
//! 池只保存空闲连接；连接借出后归调用方独占，用完通过 [`DatabasePool::release`]
//! 归还。借出时没有空闲连接不会排队等待，而是直接新建一条，宁可短暂超配
//! 也不增加尾延迟。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::errors::{IpLocationError, Result};
use crate::storage::models::LocationRecord;

/// 连接建立的重试上限与间隔
const MAX_RETRIES: u32 = 10;
const RETRY_DELAY: Duration = Duration::from_secs(3);

/// 单条后端连接
///
/// 生产实现包装一条 PostgreSQL 连接；测试中用 mock 实现。
#[async_trait]
pub trait StoreConnection: Send + Sync + std::fmt::Debug {
    /// 连接是否仍然可用（上一次操作失败后应返回 false）
    fn is_open(&self) -> bool;

    /// 一次最小往返查询，用于健康检查
    async fn ping(&self) -> Result<()>;

    /// 范围表查询：返回包含该地址的最具体区段对应的记录
    async fn lookup_ip(&self, ip: &str) -> Result<Option<LocationRecord>>;
}

/// 连接工厂，负责单次连接建立（不含重试）
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>>;
}

pub struct DatabasePool {
    connector: Arc<dyn StoreConnector>,
    /// 空闲连接集合；锁只在列表操作期间持有，绝不跨 await
    idle: Mutex<Vec<Box<dyn StoreConnection>>>,
    pool_size: usize,
    healthy: AtomicBool,
}

impl DatabasePool {
    /// 创建连接池并急切地填充到容量上限
    ///
    /// 一条连接都建不起来时进入 unhealthy 状态，但不会中止进程：
    /// 健康状态通过 `/health` 和 `/metrics` 暴露，后续请求仍会尝试重连。
    pub async fn initialize(connector: Arc<dyn StoreConnector>, pool_size: usize) -> Self {
        let pool = DatabasePool {
            connector,
            idle: Mutex::new(Vec::with_capacity(pool_size)),
            pool_size,
            healthy: AtomicBool::new(false),
        };

        for _ in 0..pool_size {
            if let Some(conn) = pool.create_connection().await {
                pool.idle.lock().push(conn);
            }
        }

        let established = pool.idle.lock().len();
        if established == 0 {
            error!("Failed to create any database connections!");
        } else {
            pool.healthy.store(true, Ordering::Relaxed);
            info!("Database pool initialized with {} connections", established);
        }

        pool
    }

    /// 借出一条连接
    ///
    /// 优先复用空闲连接；已关闭的空闲连接直接丢弃。没有可用连接时
    /// 新建一条，新建失败返回 `ConnectionUnavailable`，由调用方按
    /// 单次请求的可恢复错误处理。
    pub async fn acquire(&self) -> Result<Box<dyn StoreConnection>> {
        loop {
            let candidate = self.idle.lock().pop();
            match candidate {
                Some(conn) if conn.is_open() => return Ok(conn),
                Some(_) => {
                    debug!("Discarding broken idle connection");
                    continue;
                }
                None => break,
            }
        }

        self.create_connection().await.ok_or_else(|| {
            IpLocationError::connection_unavailable(
                "no idle connection and connection establishment failed",
            )
        })
    }

    /// 归还一条连接
    ///
    /// 只有仍然可用且池未满时才回收，否则丢弃。归还数量超过容量时
    /// 多余的连接被关闭，空闲集合永远不会超过 `pool_size`。
    pub fn release(&self, conn: Box<dyn StoreConnection>) {
        if !conn.is_open() {
            debug!("Dropping closed connection instead of re-pooling");
            return;
        }

        let mut idle = self.idle.lock();
        if idle.len() < self.pool_size {
            idle.push(conn);
        }
    }

    /// 健康检查：借出一条连接做最小往返，再归还
    ///
    /// 探测中的任何失败都只更新健康标志，不向外传播。
    pub async fn health_check(&self) -> bool {
        let conn = match self.acquire().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Health check could not acquire a connection: {}", e);
                self.healthy.store(false, Ordering::Relaxed);
                return false;
            }
        };

        match conn.ping().await {
            Ok(()) => {
                self.release(conn);
                self.healthy.store(true, Ordering::Relaxed);
                true
            }
            Err(e) => {
                error!("Health check failed: {}", e);
                self.healthy.store(false, Ordering::Relaxed);
                false
            }
        }
    }

    /// 最近一次初始化/健康检查得到的健康状态
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    /// 当前空闲连接数
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// 建立一条新连接，最多重试 [`MAX_RETRIES`] 次，间隔 [`RETRY_DELAY`]
    ///
    /// 重试耗尽返回 `None` 而不是错误：调用方必须把"拿不到连接"
    /// 当作单次请求的可恢复状况。
    async fn create_connection(&self) -> Option<Box<dyn StoreConnection>> {
        for attempt in 1..=MAX_RETRIES {
            match self.connector.connect().await {
                Ok(conn) => return Some(conn),
                Err(e) => {
                    error!("Database connection attempt {} failed: {}", attempt, e);
                    if attempt < MAX_RETRIES {
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
            }
        }
        None
    }
}

impl Drop for DatabasePool {
    fn drop(&mut self) {
        // 空闲连接随池一起销毁
        self.idle.lock().clear();
    }
}
