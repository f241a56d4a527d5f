//! PostgreSQL 后端连接实现
//!
//! 每条 [`PostgresConnection`] 包装一条独立的数据库连接
//! （`max_connections = 1`），池化行为完全由 [`super::pool::DatabasePool`]
//! 负责，不叠加 sqlx 自己的池。

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, Statement,
};
use tracing::{debug, warn};

use crate::errors::{IpLocationError, Result};
use crate::storage::models::LocationRecord;
use crate::storage::pool::{StoreConnection, StoreConnector};

/// 范围表查询：包含测试 + 按区段起点升序，重叠时最具体的区段胜出
const IP_LOOKUP_SQL: &str = "SELECT country, city, region, latitude, longitude, postal_code, timezone \
     FROM ip_locations \
     WHERE $1::inet >= start_ip AND $1::inet <= end_ip \
     ORDER BY start_ip \
     LIMIT 1";

pub struct PostgresConnector {
    database_url: String,
}

impl PostgresConnector {
    pub fn new(database_url: impl Into<String>) -> Self {
        PostgresConnector {
            database_url: database_url.into(),
        }
    }
}

#[async_trait]
impl StoreConnector for PostgresConnector {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>> {
        let mut opt = ConnectOptions::new(self.database_url.clone());
        opt.max_connections(1)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await.map_err(|e| {
            IpLocationError::database_connection(format!(
                "unable to connect to PostgreSQL: {e}"
            ))
        })?;

        debug!("PostgreSQL connection established");
        Ok(Box::new(PostgresConnection {
            conn,
            open: AtomicBool::new(true),
        }))
    }
}

#[derive(Debug)]
pub struct PostgresConnection {
    conn: DatabaseConnection,
    /// 操作因连接层错误失败后置为 false，池归还时据此丢弃
    open: AtomicBool,
}

impl PostgresConnection {
    fn mark_broken_if_connection_error(&self, err: &DbErr) {
        if matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_)) {
            warn!("PostgreSQL connection marked broken: {}", err);
            self.open.store(false, Ordering::Relaxed);
        }
    }
}

#[async_trait]
impl StoreConnection for PostgresConnection {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }

    async fn ping(&self) -> Result<()> {
        self.conn.ping().await.map_err(|e| {
            self.mark_broken_if_connection_error(&e);
            IpLocationError::database_operation(format!("ping failed: {e}"))
        })
    }

    async fn lookup_ip(&self, ip: &str) -> Result<Option<LocationRecord>> {
        let stmt =
            Statement::from_sql_and_values(DbBackend::Postgres, IP_LOOKUP_SQL, [ip.into()]);

        let row = self.conn.query_one(stmt).await.map_err(|e| {
            self.mark_broken_if_connection_error(&e);
            IpLocationError::database_operation(format!("range lookup failed: {e}"))
        })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let record = LocationRecord {
            ip: ip.to_string(),
            country: row.try_get("", "country")?,
            city: row.try_get("", "city")?,
            region: row.try_get("", "region")?,
            latitude: row.try_get("", "latitude")?,
            longitude: row.try_get("", "longitude")?,
            postal_code: row.try_get("", "postal_code")?,
            timezone: row.try_get("", "timezone")?,
        };
        Ok(Some(record))
    }
}
