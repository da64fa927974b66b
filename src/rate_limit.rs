use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sliding window in-memory rate limiter (process local).
#[derive(Clone)]
pub struct InMemoryRateLimiter {
    store: Arc<DashMap<String, VecDeque<Instant>>>,
    pub enabled: bool,
}

impl InMemoryRateLimiter {
    pub fn new(enabled: bool) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            enabled,
        }
    }

    /// Returns true if allowed, false if limited.
    pub fn check(&self, key: &str, limit: usize, window: Duration) -> bool {
        if !self.enabled {
            return true;
        }
        let now = Instant::now();
        let mut entry = self.store.entry(key.to_string()).or_default();
        while let Some(front) = entry.front() {
            if now.duration_since(*front) >= window {
                entry.pop_front();
            } else {
                break;
            }
        }
        if entry.len() < limit {
            entry.push_back(now);
            true
        } else {
            false
        }
    }
}

/// Per-action limits derived from env. The guarded actions are the public
/// (unauthenticated) writes plus forum posting.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub thread_limit: usize,
    pub thread_window: Duration,
    pub comment_limit: usize,
    pub comment_window: Duration,
    pub contact_limit: usize,
    pub contact_window: Duration,
    pub subscribe_limit: usize,
    pub subscribe_window: Duration,
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        fn usize_env(name: &str, default: usize) -> usize {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
        fn dur_env(name: &str, default: u64) -> Duration {
            Duration::from_secs(
                std::env::var(name)
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(default),
            )
        }
        Self {
            thread_limit: usize_env("RL_THREAD_LIMIT", 3),
            thread_window: dur_env("RL_THREAD_WINDOW", 300),
            comment_limit: usize_env("RL_COMMENT_LIMIT", 10),
            comment_window: dur_env("RL_COMMENT_WINDOW", 60),
            contact_limit: usize_env("RL_CONTACT_LIMIT", 5),
            contact_window: dur_env("RL_CONTACT_WINDOW", 3600),
            subscribe_limit: usize_env("RL_SUBSCRIBE_LIMIT", 5),
            subscribe_window: dur_env("RL_SUBSCRIBE_WINDOW", 3600),
        }
    }
}

/// High level guard used by handlers.
#[derive(Clone)]
pub struct RateLimiterFacade {
    pub limiter: InMemoryRateLimiter,
    pub cfg: RateLimitConfig,
}

impl RateLimiterFacade {
    pub fn new(limiter: InMemoryRateLimiter, cfg: RateLimitConfig) -> Self {
        Self { limiter, cfg }
    }

    pub fn from_env() -> Self {
        let enabled = std::env::var("RL_ENABLED")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        Self::new(InMemoryRateLimiter::new(enabled), RateLimitConfig::from_env())
    }

    /// No-op limiter for tests.
    pub fn disabled() -> Self {
        Self::new(InMemoryRateLimiter::new(false), RateLimitConfig::from_env())
    }

    pub fn allow_thread(&self, ip: &str) -> bool {
        self.limiter
            .check(&format!("thread:{ip}"), self.cfg.thread_limit, self.cfg.thread_window)
    }
    pub fn allow_comment(&self, ip: &str) -> bool {
        self.limiter.check(
            &format!("comment:{ip}"),
            self.cfg.comment_limit,
            self.cfg.comment_window,
        )
    }
    pub fn allow_contact(&self, ip: &str) -> bool {
        self.limiter.check(
            &format!("contact:{ip}"),
            self.cfg.contact_limit,
            self.cfg.contact_window,
        )
    }
    pub fn allow_subscribe(&self, ip: &str) -> bool {
        self.limiter.check(
            &format!("subscribe:{ip}"),
            self.cfg.subscribe_limit,
            self.cfg.subscribe_window,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sliding_window_basic() {
        let rl = InMemoryRateLimiter::new(true);
        let window = Duration::from_millis(50);
        for _ in 0..3 {
            assert!(rl.check("k", 3, window));
        }
        assert!(!rl.check("k", 3, window));
    }

    #[test]
    fn disabled_limiter_always_allows() {
        let facade = RateLimiterFacade::disabled();
        for _ in 0..100 {
            assert!(facade.allow_contact("10.0.0.1"));
        }
    }
}
