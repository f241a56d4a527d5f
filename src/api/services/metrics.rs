//! `GET /metrics` 运行指标

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;

use crate::api::services::AppStartTime;
use crate::cache::LocationCache;
use crate::storage::DatabasePool;

#[derive(Serialize)]
struct MetricsResponse {
    database_healthy: bool,
    cache_healthy: bool,
    uptime_seconds: i64,
}

pub struct MetricsService;

impl MetricsService {
    pub async fn metrics(
        pool: web::Data<Arc<DatabasePool>>,
        cache: web::Data<Arc<dyn LocationCache>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let uptime = chrono::Utc::now() - app_start_time.start_datetime;

        HttpResponse::Ok().json(MetricsResponse {
            // 读取池的健康标志，不在指标路径上做主动探测
            database_healthy: pool.is_healthy(),
            cache_healthy: cache.ping().await,
            uptime_seconds: uptime.num_seconds(),
        })
    }
}
