//! Login rate limiter for slowing down password guessing

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of attempts allowed
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,
            ban_duration_seconds: 3600,
        }
    }
}

#[derive(Debug)]
struct LoginAttempts {
    attempts: u32,
    window_started: Instant,
    ban_expires: Option<Instant>,
}

impl LoginAttempts {
    /// Neither a ban nor the attempt window is still running
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        match self.ban_expires {
            Some(ban_expires) => now >= ban_expires,
            None => now.duration_since(self.window_started) >= window,
        }
    }
}

/// Per-key login attempt limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, LoginAttempts>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key` and report whether it may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_seconds);

        entries.retain(|_, entry| !entry.is_stale(now, window));

        let entry = entries.entry(key.to_string()).or_insert(LoginAttempts {
            attempts: 0,
            window_started: now,
            ban_expires: None,
        });

        if entry.ban_expires.is_some() {
            return false;
        }

        if entry.attempts >= self.config.max_attempts {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            warn!(
                "Banned login key {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
            return false;
        }

        entry.attempts += 1;
        true
    }

    /// Forget the attempts recorded for `key` after a successful login
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts: 3,
            window_seconds: 60,
            ban_duration_seconds: 600,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_bans_after_max_attempts() {
        let limiter = limiter();
        for _ in 0..3 {
            assert!(limiter.is_allowed("guard@neu.edu.ph").await);
        }
        assert!(!limiter.is_allowed("guard@neu.edu.ph").await);
        assert!(limiter.is_allowed("other@neu.edu.ph").await);

        tokio::time::advance(Duration::from_secs(599)).await;
        assert!(!limiter.is_allowed("guard@neu.edu.ph").await);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(limiter.is_allowed("guard@neu.edu.ph").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_expiry_resets_attempts() {
        let limiter = limiter();
        for _ in 0..3 {
            assert!(limiter.is_allowed("guard@neu.edu.ph").await);
        }

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(limiter.is_allowed("guard@neu.edu.ph").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_dropped() {
        let limiter = limiter();
        for i in 0..100 {
            assert!(limiter.is_allowed(&format!("visitor{}@neu.edu.ph", i)).await);
        }
        for _ in 0..4 {
            limiter.is_allowed("guard@neu.edu.ph").await;
        }
        assert_eq!(limiter.entries.lock().await.len(), 101);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(limiter.is_allowed("late@neu.edu.ph").await);
        assert_eq!(limiter.entries.lock().await.len(), 2);

        tokio::time::advance(Duration::from_secs(600)).await;
        assert!(limiter.is_allowed("guard@neu.edu.ph").await);
        assert_eq!(limiter.entries.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_clears_attempts() {
        let limiter = limiter();
        for _ in 0..3 {
            assert!(limiter.is_allowed("guard@neu.edu.ph").await);
        }

        limiter.reset("guard@neu.edu.ph").await;
        assert!(limiter.is_allowed("guard@neu.edu.ph").await);
    }
}
