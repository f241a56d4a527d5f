//! 环境变量配置加载
//!
//! 所有配置项都从环境变量读取（`.env` 文件由 main 在启动时加载）。
//! `DATABASE_URL` 是唯一的必填项，其余均有默认值。

use std::env;

use crate::errors::{IpLocationError, Result};

/// 服务配置，进程启动时加载一次
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub db_pool_size: usize,
    pub rate_limit_requests: usize,
    pub rate_limit_window_seconds: u64,
    /// 未设置时缓存层降级为直连数据库
    pub redis_url: Option<String>,
    pub log_level: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 缺失 `DATABASE_URL` 视为启动失败；其他配置项解析失败时
    /// 打印警告并回退默认值，不中断启动。
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").map_err(|_| {
            IpLocationError::config("DATABASE_URL environment variable not set")
        })?;

        Ok(Config {
            database_url,
            server_host: env_or("SERVER_HOST", "0.0.0.0"),
            server_port: env_parse_or("SERVER_PORT", 8080),
            db_pool_size: env_parse_or("DB_POOL_SIZE", 10),
            rate_limit_requests: env_parse_or("RATE_LIMIT_REQUESTS", 100),
            rate_limit_window_seconds: env_parse_or("RATE_LIMIT_WINDOW", 60),
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            log_level: env_or("LOG_LEVEL", "info"),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            eprintln!("Warning: invalid value for {name}, using default: {default}");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_or_default_on_garbage() {
        // 使用独有的变量名避免与其他测试相互影响
        unsafe { env::set_var("IPLOC_TEST_PORT", "not-a-number") };
        let port: u16 = env_parse_or("IPLOC_TEST_PORT", 8080);
        assert_eq!(port, 8080);
        unsafe { env::remove_var("IPLOC_TEST_PORT") };
    }

    #[test]
    fn test_env_parse_or_reads_value() {
        unsafe { env::set_var("IPLOC_TEST_POOL", "32") };
        let size: usize = env_parse_or("IPLOC_TEST_POOL", 10);
        assert_eq!(size, 32);
        unsafe { env::remove_var("IPLOC_TEST_POOL") };
    }

    #[test]
    fn test_missing_database_url_is_config_error() {
        unsafe { env::remove_var("DATABASE_URL") };
        let err = Config::from_env().unwrap_err();
        assert_eq!(err.code(), "E001");
    }
}
