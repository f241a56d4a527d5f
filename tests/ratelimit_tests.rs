//! 滑动窗口限流器公开接口测试

use std::time::{Duration, Instant};

use iplocation::ratelimit::SlidingWindowLimiter;

#[test]
fn test_exactly_max_requests_admitted_within_window() {
    let limiter = SlidingWindowLimiter::new(5, 60);
    let now = Instant::now();

    for _ in 0..5 {
        assert!(limiter.is_allowed_at("client", now));
    }
    assert!(!limiter.is_allowed_at("client", now));
}

#[test]
fn test_admission_resumes_after_window_elapses() {
    let limiter = SlidingWindowLimiter::new(3, 60);
    let start = Instant::now();

    for _ in 0..3 {
        assert!(limiter.is_allowed_at("client", start));
    }
    assert!(!limiter.is_allowed_at("client", start + Duration::from_secs(59)));
    assert!(limiter.is_allowed_at("client", start + Duration::from_secs(61)));
}

#[test]
fn test_sliding_window_is_not_bucketed() {
    let limiter = SlidingWindowLimiter::new(2, 10);
    let start = Instant::now();

    assert!(limiter.is_allowed_at("client", start));
    assert!(limiter.is_allowed_at("client", start + Duration::from_secs(9)));
    // 固定分桶会在第 10 秒重置计数；滑动窗口不会
    assert!(!limiter.is_allowed_at("client", start + Duration::from_secs(10)));
    // 第一个时间戳滑出窗口后放行
    assert!(limiter.is_allowed_at("client", start + Duration::from_secs(11)));
}

#[test]
fn test_distinct_clients_have_independent_budgets() {
    let limiter = SlidingWindowLimiter::new(3, 60);
    let now = Instant::now();

    for _ in 0..3 {
        assert!(limiter.is_allowed_at("client-a", now));
    }
    // A 的第 4 次被拒，B 的前 3 次不受影响
    assert!(!limiter.is_allowed_at("client-a", now));
    for _ in 0..3 {
        assert!(limiter.is_allowed_at("client-b", now));
    }
    assert!(!limiter.is_allowed_at("client-b", now));
}

#[test]
fn test_default_configuration_is_100_per_60s() {
    let limiter = SlidingWindowLimiter::default();
    let now = Instant::now();

    for _ in 0..100 {
        assert!(limiter.is_allowed_at("unknown", now));
    }
    assert!(!limiter.is_allowed_at("unknown", now));
}

#[test]
fn test_real_clock_entrypoint() {
    let limiter = SlidingWindowLimiter::new(2, 60);

    assert!(limiter.is_allowed("client"));
    assert!(limiter.is_allowed("client"));
    assert!(!limiter.is_allowed("client"));
}
