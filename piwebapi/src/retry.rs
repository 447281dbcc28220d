//! Bounded retry schedule for the "database is being crawled" state.

use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 12;
const DEFAULT_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// How often, and how long apart, a GET is reissued while the server reports
/// that its database is being crawled.
///
/// `max_attempts` counts every HTTP call, the first one included. The delay
/// before retry `n` (1-based) is `delay * multiplier^(n-1)`, capped at
/// `max_delay`. A multiplier of `1.0` gives a fixed interval.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlRetry {
    pub max_attempts: u32,
    pub delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for CrawlRetry {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
            multiplier: 1.0,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl CrawlRetry {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            ..Default::default()
        }
    }

    /// Reads overrides from `PIWEBAPI_CRAWL_*` environment variables.
    /// Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: env_parse("PIWEBAPI_CRAWL_MAX_ATTEMPTS", defaults.max_attempts),
            delay: Duration::from_millis(env_parse(
                "PIWEBAPI_CRAWL_DELAY_MS",
                defaults.delay.as_millis() as u64,
            )),
            multiplier: env_parse("PIWEBAPI_CRAWL_MULTIPLIER", defaults.multiplier),
            max_delay: Duration::from_millis(env_parse(
                "PIWEBAPI_CRAWL_MAX_DELAY_MS",
                defaults.max_delay.as_millis() as u64,
            )),
        }
    }

    /// Grow the delay geometrically between attempts.
    pub fn with_exponential(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Whether another call may be issued after `attempts` calls were made.
    pub fn allows_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }

    /// Delay to wait before retry number `retry` (1-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(30) as i32;
        let factor = self.multiplier.max(1.0).powi(exp);
        let scaled = self.delay.as_secs_f64() * factor;
        if !scaled.is_finite() || scaled >= self.max_delay.as_secs_f64() {
            return self.max_delay.max(self.delay);
        }
        Duration::from_secs_f64(scaled)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<T>().ok())
        .unwrap_or(default)
}
