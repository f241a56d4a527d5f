//! 滑动窗口限流器
//!
//! 每个客户端身份维护一个窗口内的请求时间戳队列。窗口相对"当前时刻"
//! 连续滑动，不做固定分桶，任意 `window` 区间内的放行数严格不超过
//! `max_requests`。
//!
//! 客户端身份对限流器不透明：空串、`"unknown"` 都是合法可追踪的身份。

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

/// 全量清扫的最小间隔
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

pub const DEFAULT_MAX_REQUESTS: usize = 100;
pub const DEFAULT_WINDOW_SECONDS: u64 = 60;

struct LimiterState {
    requests: HashMap<String, VecDeque<Instant>>,
    last_cleanup: Instant,
}

pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    state: Mutex<LimiterState>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: usize, window_seconds: u64) -> Self {
        SlidingWindowLimiter {
            max_requests,
            window: Duration::from_secs(window_seconds),
            state: Mutex::new(LimiterState {
                requests: HashMap::new(),
                last_cleanup: Instant::now(),
            }),
        }
    }

    /// 判断某客户端的请求是否放行
    ///
    /// 放行的请求记录当前时间戳；被拒绝的请求不留痕迹，不计入窗口。
    pub fn is_allowed(&self, client_id: &str) -> bool {
        self.is_allowed_at(client_id, Instant::now())
    }

    /// 以显式时刻做放行判定（测试用确定性入口，语义与 [`Self::is_allowed`] 一致）
    pub fn is_allowed_at(&self, client_id: &str, now: Instant) -> bool {
        let mut state = self.state.lock();

        // 顺带做周期性清扫：清扫与放行共用同一把锁，互不交错
        if now.duration_since(state.last_cleanup) > CLEANUP_INTERVAL {
            Self::cleanup_old_requests(&mut state, self.window, now);
            state.last_cleanup = now;
        }

        let timestamps = state.requests.entry(client_id.to_string()).or_default();

        while let Some(front) = timestamps.front() {
            if now.duration_since(*front) > self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push_back(now);
        true
    }

    /// 当前被追踪的客户端数量
    pub fn tracked_clients(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// 丢弃时间戳已全部过期的客户端，把内存占用限定在活跃客户端上
    ///
    /// 纯粹的内存回收，不影响任何放行判定。
    fn cleanup_old_requests(state: &mut LimiterState, window: Duration, now: Instant) {
        let before = state.requests.len();
        state.requests.retain(|_, timestamps| {
            while let Some(front) = timestamps.front() {
                if now.duration_since(*front) > window {
                    timestamps.pop_front();
                } else {
                    break;
                }
            }
            !timestamps.is_empty()
        });

        let dropped = before - state.requests.len();
        if dropped > 0 {
            debug!("Rate limiter cleanup dropped {} idle clients", dropped);
        }
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        SlidingWindowLimiter::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_boundary_is_exact() {
        let limiter = SlidingWindowLimiter::new(2, 10);
        let start = Instant::now();

        assert!(limiter.is_allowed_at("client", start));
        assert!(limiter.is_allowed_at("client", start + Duration::from_secs(1)));
        // 窗口内第三次请求被拒绝
        assert!(!limiter.is_allowed_at("client", start + Duration::from_secs(5)));
        // 首个时间戳过期后重新放行
        assert!(limiter.is_allowed_at("client", start + Duration::from_secs(11)));
    }

    #[test]
    fn test_rejected_requests_leave_no_trace() {
        let limiter = SlidingWindowLimiter::new(1, 60);
        let start = Instant::now();

        assert!(limiter.is_allowed_at("client", start));
        for i in 1..=10 {
            assert!(!limiter.is_allowed_at("client", start + Duration::from_secs(i)));
        }
        // 被拒绝的 10 次不计入窗口：首个时间戳过期后立即恢复
        assert!(limiter.is_allowed_at("client", start + Duration::from_secs(61)));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = SlidingWindowLimiter::new(3, 60);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.is_allowed_at("client-a", now));
        }
        assert!(!limiter.is_allowed_at("client-a", now));

        // A 被限流不影响 B
        for _ in 0..3 {
            assert!(limiter.is_allowed_at("client-b", now));
        }
    }

    #[test]
    fn test_empty_identity_is_trackable() {
        let limiter = SlidingWindowLimiter::new(1, 60);
        let now = Instant::now();

        assert!(limiter.is_allowed_at("", now));
        assert!(!limiter.is_allowed_at("", now));
        assert!(limiter.is_allowed_at("unknown", now));
    }

    #[test]
    fn test_cleanup_drops_expired_clients() {
        let limiter = SlidingWindowLimiter::new(5, 10);
        let start = Instant::now();

        assert!(limiter.is_allowed_at("idle-client", start));
        assert_eq!(limiter.tracked_clients(), 1);

        // 超过清扫间隔后的下一次调用触发清扫
        let later = start + CLEANUP_INTERVAL + Duration::from_secs(1);
        assert!(limiter.is_allowed_at("active-client", later));
        assert_eq!(limiter.tracked_clients(), 1);
        assert!(limiter.state.lock().requests.contains_key("active-client"));
    }

    #[test]
    fn test_cleanup_keeps_fresh_history() {
        let limiter = SlidingWindowLimiter::new(5, 600);
        let start = Instant::now();

        assert!(limiter.is_allowed_at("client", start));
        // 窗口 600s 大于清扫间隔，历史尚未过期，客户端必须保留
        let later = start + CLEANUP_INTERVAL + Duration::from_secs(1);
        assert!(limiter.is_allowed_at("other", later));
        assert_eq!(limiter.tracked_clients(), 2);
    }
}
