pub mod health;
pub mod lookup;
pub mod metrics;

pub use health::{AppStartTime, HealthService};
pub use lookup::IpLookupService;
pub use metrics::MetricsService;

use serde::Serialize;

/// 统一的错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    pub timestamp: i64,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, code: &'static str) -> Self {
        ErrorBody {
            error: error.into(),
            code,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// `GET /` 服务横幅
pub async fn service_banner() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(serde_json::json!({
        "message": "IP Location Service API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
