//! Environment-supplied configuration for the sports data crate.
//!
//! All knobs are named options with documented defaults. API keys default
//! to empty strings and are never hard-coded; an empty key simply produces
//! an unauthorized upstream response, which surfaces as a typed error.
//!
//! | Env var | Default |
//! |---|---|
//! | `CF_CRICAPI_URL` | `https://api.cricapi.com/v1` |
//! | `CF_CRICAPI_KEY` | *(empty)* |
//! | `CF_MSN_URL` | `https://api.msn.com/sports` |
//! | `CF_MSN_KEY` | *(empty)* |
//! | `CF_MSN_LEAGUE_ID` | `Cricket_IPL` |
//! | `CF_NEWS_URL` | `https://news.crickapi.com/api` |
//! | `CF_HTTP_TIMEOUT_SECS` | `8` |
//! | `CF_MAX_RETRIES` | `2` |
//! | `CF_BACKOFF_MS` | `250` |
//! | `CF_LIVE_TTL_SECS` | `15` |
//! | `CF_SCHEDULE_TTL_SECS` | `300` |
//! | `CF_STANDINGS_TTL_SECS` | `300` |
//! | `CF_NEWS_TTL_SECS` | `180` |

use std::time::Duration;

use crate::resilience::ResiliencePolicy;

const DEFAULT_CRICAPI_URL: &str = "https://api.cricapi.com/v1";
const DEFAULT_MSN_URL: &str = "https://api.msn.com/sports";
const DEFAULT_NEWS_URL: &str = "https://news.crickapi.com/api";
const DEFAULT_MSN_LEAGUE_ID: &str = "Cricket_IPL";

const DEFAULT_TIMEOUT_SECS: u64 = 8;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_BACKOFF_MS: u64 = 250;

/// Live scores move ball by ball; everything else moves on a slower clock.
const DEFAULT_LIVE_TTL_SECS: u64 = 15;
const DEFAULT_SCHEDULE_TTL_SECS: u64 = 300;
const DEFAULT_STANDINGS_TTL_SECS: u64 = 300;
const DEFAULT_NEWS_TTL_SECS: u64 = 180;

/// Base URL and query-string API key for one upstream.
#[derive(Clone, Debug)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub api_key: String,
}

/// Assembled configuration for the aggregation facade.
///
/// The core never reads global mutable state at call time; the facade takes
/// this struct at construction.
#[derive(Clone, Debug)]
pub struct SportsDataConfig {
    /// CricAPI (live scores + match detail).
    pub cric_api: ProviderEndpoint,
    /// MSN sports (schedule + standings).
    pub msn: ProviderEndpoint,
    /// MSN league identifier the schedule adapter follows.
    pub msn_league_id: String,
    /// News upstream base URL (no key required).
    pub news_base_url: String,

    /// Per-attempt upstream timeout.
    pub request_timeout: Duration,
    /// Retry attempts after the first try, for retryable failures only.
    pub max_retries: u32,
    /// Initial exponential backoff delay.
    pub backoff_base: Duration,

    pub live_ttl: Duration,
    pub schedule_ttl: Duration,
    pub standings_ttl: Duration,
    pub news_ttl: Duration,
}

impl Default for SportsDataConfig {
    fn default() -> Self {
        Self {
            cric_api: ProviderEndpoint {
                base_url: DEFAULT_CRICAPI_URL.to_string(),
                api_key: String::new(),
            },
            msn: ProviderEndpoint {
                base_url: DEFAULT_MSN_URL.to_string(),
                api_key: String::new(),
            },
            msn_league_id: DEFAULT_MSN_LEAGUE_ID.to_string(),
            news_base_url: DEFAULT_NEWS_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_MS),
            live_ttl: Duration::from_secs(DEFAULT_LIVE_TTL_SECS),
            schedule_ttl: Duration::from_secs(DEFAULT_SCHEDULE_TTL_SECS),
            standings_ttl: Duration::from_secs(DEFAULT_STANDINGS_TTL_SECS),
            news_ttl: Duration::from_secs(DEFAULT_NEWS_TTL_SECS),
        }
    }
}

impl SportsDataConfig {
    /// Assemble the configuration from `CF_*` environment variables,
    /// falling back to the documented defaults for anything unset or
    /// unparsable.
    pub fn from_env() -> Self {
        Self {
            cric_api: ProviderEndpoint {
                base_url: env_or("CF_CRICAPI_URL", DEFAULT_CRICAPI_URL),
                api_key: env_or("CF_CRICAPI_KEY", ""),
            },
            msn: ProviderEndpoint {
                base_url: env_or("CF_MSN_URL", DEFAULT_MSN_URL),
                api_key: env_or("CF_MSN_KEY", ""),
            },
            msn_league_id: env_or("CF_MSN_LEAGUE_ID", DEFAULT_MSN_LEAGUE_ID),
            news_base_url: env_or("CF_NEWS_URL", DEFAULT_NEWS_URL),
            request_timeout: Duration::from_secs(env_u64(
                "CF_HTTP_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            max_retries: env_u64("CF_MAX_RETRIES", DEFAULT_MAX_RETRIES as u64) as u32,
            backoff_base: Duration::from_millis(env_u64("CF_BACKOFF_MS", DEFAULT_BACKOFF_MS)),
            live_ttl: Duration::from_secs(env_u64("CF_LIVE_TTL_SECS", DEFAULT_LIVE_TTL_SECS)),
            schedule_ttl: Duration::from_secs(env_u64(
                "CF_SCHEDULE_TTL_SECS",
                DEFAULT_SCHEDULE_TTL_SECS,
            )),
            standings_ttl: Duration::from_secs(env_u64(
                "CF_STANDINGS_TTL_SECS",
                DEFAULT_STANDINGS_TTL_SECS,
            )),
            news_ttl: Duration::from_secs(env_u64("CF_NEWS_TTL_SECS", DEFAULT_NEWS_TTL_SECS)),
        }
    }

    /// Resilience policy for one upstream concern, given its cache TTL.
    pub fn policy(&self, ttl: Duration) -> ResiliencePolicy {
        ResiliencePolicy {
            timeout: self.request_timeout,
            max_retries: self.max_retries,
            backoff_base: self.backoff_base,
            ttl,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
