//! `GET /health` 健康检查
//!
//! 数据库和缓存都健康 → healthy 200；仅数据库健康 → degraded 200
//! （服务仍可用，只是每次直查数据库）；数据库不健康 → unhealthy 503。

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use tracing::trace;

use crate::cache::LocationCache;
use crate::storage::DatabasePool;

/// 应用启动时间，main 构造一次后注入
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
struct DependencyStatus {
    status: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
    database: DependencyStatus,
    cache: DependencyStatus,
}

fn dependency(healthy: bool) -> DependencyStatus {
    DependencyStatus {
        status: if healthy { "healthy" } else { "unhealthy" },
    }
}

pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        pool: web::Data<Arc<DatabasePool>>,
        cache: web::Data<Arc<dyn LocationCache>>,
    ) -> impl Responder {
        trace!("Received health check request");

        // 主动探测：借一条连接做最小往返，顺带刷新池的健康标志
        let db_healthy = pool.health_check().await;
        let cache_healthy = cache.ping().await;

        let status = if db_healthy && cache_healthy {
            "healthy"
        } else if db_healthy {
            "degraded"
        } else {
            "unhealthy"
        };

        let body = HealthResponse {
            status,
            timestamp: chrono::Utc::now().timestamp(),
            database: dependency(db_healthy),
            cache: dependency(cache_healthy),
        };

        if db_healthy {
            HttpResponse::Ok().json(body)
        } else {
            HttpResponse::ServiceUnavailable().json(body)
        }
    }
}
