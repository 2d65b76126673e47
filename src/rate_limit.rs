/// Rate limiting module for preventing abuse
///
/// Implements sliding window rate limiting using in-memory storage (DashMap).
/// This is suitable for single-instance deployments. For multi-instance
/// deployments, consider using Redis as a backing store.
///
/// Window sizes and limits come from the [rate_limit] section of the
/// application config.
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global rate limiter instance
pub static RATE_LIMITER: Lazy<Arc<RateLimiter>> = Lazy::new(|| Arc::new(RateLimiter::new()));

/// Rate limiter using in-memory storage
pub struct RateLimiter {
    /// Map of (action_type:identifier) -> Request timestamps
    requests: DashMap<String, Vec<Instant>>,
}

/// Error returned when rate limit is exceeded
#[derive(Debug, Clone)]
pub struct RateLimitError {
    /// Number of seconds until the rate limit resets
    pub retry_after_seconds: u64,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
        }
    }

    /// Check if a request should be rate limited
    ///
    /// # Arguments
    /// * `action` - The action being rate limited (e.g., "login", "comment")
    /// * `identifier` - Unique identifier for the requester (e.g., IP address, user ID)
    /// * `max_requests` - Maximum number of requests allowed in the window
    /// * `window` - Time window for the rate limit
    ///
    /// # Returns
    /// * `Ok(())` if the request is allowed
    /// * `Err(RateLimitError)` if the rate limit is exceeded
    pub fn check_rate_limit(
        &self,
        action: &str,
        identifier: &str,
        max_requests: usize,
        window: Duration,
    ) -> Result<(), RateLimitError> {
        let key = format!("{}:{}", action, identifier);
        let now = Instant::now();

        let mut entry = self.requests.entry(key).or_default();

        // Remove requests outside the time window (sliding window)
        entry.retain(|&timestamp| now.duration_since(timestamp) < window);

        if entry.len() >= max_requests {
            // Calculate how long until the oldest request expires
            let oldest = entry[0];
            let retry_after = window.saturating_sub(now.duration_since(oldest));

            return Err(RateLimitError {
                retry_after_seconds: retry_after.as_secs() + 1, // Round up
            });
        }

        entry.push(now);

        Ok(())
    }

    /// Clean up old entries to prevent memory leaks
    ///
    /// This should be called periodically (e.g., every 5 minutes) to remove
    /// entries for keys that haven't been used recently.
    pub fn cleanup_old_entries(&self) {
        self.requests.retain(|_, timestamps| !timestamps.is_empty());
    }

    /// Get the number of tracked keys (for monitoring/debugging)
    pub fn tracked_keys_count(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helper functions for common rate-limited actions
// ============================================================================

/// Check rate limit for login attempts, per IP+email combination
pub fn check_login_rate_limit(ip: &str, email: &str) -> Result<(), RateLimitError> {
    let config = crate::app_config::rate_limit();
    RATE_LIMITER.check_rate_limit(
        "login",
        &format!("{}:{}", ip, email),
        config.login_max_attempts as usize,
        Duration::from_secs(config.login_window_seconds as u64),
    )
}

/// Check rate limit for user registration, per IP address
pub fn check_registration_rate_limit(ip: &str) -> Result<(), RateLimitError> {
    let config = crate::app_config::rate_limit();
    RATE_LIMITER.check_rate_limit(
        "register",
        ip,
        config.registration_per_hour as usize,
        Duration::from_secs(3600),
    )
}

/// Check rate limit for comment creation, per user
pub fn check_comment_rate_limit(user_id: i32) -> Result<(), RateLimitError> {
    let config = crate::app_config::rate_limit();
    RATE_LIMITER.check_rate_limit(
        "comment",
        &user_id.to_string(),
        config.comments_per_minute as usize,
        Duration::from_secs(60),
    )
}

/// Check rate limit for report submissions
///
/// Reports can be anonymous, so the identifier is the submitting user id when
/// known and the client IP otherwise.
pub fn check_report_rate_limit(identifier: &str) -> Result<(), RateLimitError> {
    let config = crate::app_config::rate_limit();
    RATE_LIMITER.check_rate_limit(
        "report",
        identifier,
        config.reports_per_hour as usize,
        Duration::from_secs(3600),
    )
}

/// Periodic cleanup entry point for the background task in main.
pub fn cleanup_old_entries_public() {
    RATE_LIMITER.cleanup_old_entries();
}
