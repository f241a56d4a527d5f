//! IP 地址处理工具
//!
//! - 查询参数的严格 IPv4/IPv6 语法校验
//! - 限流用客户端身份提取（X-Forwarded-For → X-Real-IP → "unknown"）

use std::net::{Ipv4Addr, Ipv6Addr};

use actix_web::http::header::HeaderMap;

/// 缺失转发头时的哨兵身份
pub const UNKNOWN_CLIENT: &str = "unknown";

/// 严格的 IP 语法校验
///
/// 只接受能被标准地址解析器完整解析的字符串，不做任何宽松回退。
pub fn is_valid_ip(ip: &str) -> bool {
    is_valid_ipv4(ip) || is_valid_ipv6(ip)
}

pub fn is_valid_ipv4(ip: &str) -> bool {
    ip.parse::<Ipv4Addr>().is_ok()
}

pub fn is_valid_ipv6(ip: &str) -> bool {
    ip.parse::<Ipv6Addr>().is_ok()
}

/// 提取限流用的客户端身份
///
/// 身份对限流器完全不透明，这里不校验取到的值是不是合法 IP。
pub fn client_identity(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
