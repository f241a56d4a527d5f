//! `GET /ip-location` 请求管线
//!
//! 各阶段按固定顺序求值，任一阶段失败即为该请求的终态：
//! 限流 → 参数缺失 → 格式校验 → 编排层查询。本层不做任何重试。

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::trace;

use crate::api::services::ErrorBody;
use crate::ratelimit::SlidingWindowLimiter;
use crate::services::{LookupOutcome, LookupService};
use crate::utils::ip::{client_identity, is_valid_ip};

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub ip: Option<String>,
}

pub struct IpLookupService;

impl IpLookupService {
    pub async fn handle_lookup(
        req: HttpRequest,
        query: web::Query<LookupQuery>,
        limiter: web::Data<Arc<SlidingWindowLimiter>>,
        lookup: web::Data<Arc<LookupService>>,
    ) -> impl Responder {
        // 限流最先判定：被拒绝的请求不消耗任何后端资源
        let client = client_identity(req.headers());
        if !limiter.is_allowed(&client) {
            trace!("Rate limit exceeded for client: {}", client);
            return HttpResponse::TooManyRequests()
                .json(ErrorBody::new("Rate limit exceeded", "RATE_LIMIT_EXCEEDED"));
        }

        let Some(ip) = query.ip.as_deref().filter(|s| !s.is_empty()) else {
            return HttpResponse::BadRequest().json(ErrorBody::new(
                "IP address parameter 'ip' is missing",
                "MISSING_PARAMETER",
            ));
        };

        if !is_valid_ip(ip) {
            return HttpResponse::BadRequest().json(ErrorBody::new(
                "Invalid IP address format",
                "INVALID_IP_FORMAT",
            ));
        }

        match lookup.lookup(ip).await {
            LookupOutcome::Found(record) => HttpResponse::Ok().json(record),
            LookupOutcome::NotFound => HttpResponse::NotFound().json(ErrorBody::new(
                "IP address location not found",
                "IP_NOT_FOUND",
            )),
            LookupOutcome::BackendUnavailable => HttpResponse::InternalServerError().json(
                ErrorBody::new("Database connection unavailable", "DB_CONNECTION_ERROR"),
            ),
        }
    }
}
