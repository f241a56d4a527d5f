use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{error, info, warn};

use iplocation::api::services::{
    AppStartTime, HealthService, IpLookupService, MetricsService, service_banner,
};
use iplocation::cache::{LocationCache, NullLocationCache, RedisLocationCache};
use iplocation::config::Config;
use iplocation::ratelimit::SlidingWindowLimiter;
use iplocation::services::LookupService;
use iplocation::storage::{DatabasePool, PostgresConnector};
use iplocation::system::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // 配置错误属于启动失败，直接中止进程
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Fatal error: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.log_level);
    info!("Starting IP Location Service...");

    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    info!("Initializing database connection pool...");
    let connector = Arc::new(PostgresConnector::new(config.database_url.clone()));
    let pool = Arc::new(DatabasePool::initialize(connector, config.db_pool_size).await);
    if !pool.is_healthy() {
        // 不中止：健康状态通过 /health 暴露，请求路径会继续尝试重连
        error!("Database pool started without any connections; serving in degraded mode");
    }

    let cache: Arc<dyn LocationCache> = match &config.redis_url {
        Some(url) => match RedisLocationCache::new(url) {
            Ok(cache) => {
                info!("Redis connection established successfully");
                Arc::new(cache)
            }
            Err(e) => {
                warn!("Failed to connect to Redis: {}; lookups will bypass the cache", e);
                Arc::new(NullLocationCache::new())
            }
        },
        None => {
            info!("REDIS_URL not set, cache layer disabled");
            Arc::new(NullLocationCache::new())
        }
    };

    let limiter = Arc::new(SlidingWindowLimiter::new(
        config.rate_limit_requests,
        config.rate_limit_window_seconds,
    ));
    let lookup = Arc::new(LookupService::new(pool.clone(), cache.clone()));

    let bind_address = format!("{}:{}", config.server_host, config.server_port);
    info!("Server starting on http://{}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION]);

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(cache.clone()))
            .app_data(web::Data::new(limiter.clone()))
            .app_data(web::Data::new(lookup.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .route("/", web::get().to(service_banner))
            .route("/health", web::get().to(HealthService::health_check))
            .route("/ip-location", web::get().to(IpLookupService::handle_lookup))
            .route("/metrics", web::get().to(MetricsService::metrics))
    })
    .bind(bind_address)?
    .run()
    .await
}
