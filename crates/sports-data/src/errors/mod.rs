//! Error types and retry classification for the sports data crate.
//!
//! This module provides:
//! - [`FetchError`]: The main error enum for all upstream operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching or assembling sports data.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method, which determines how the
/// resilience guard should handle the error.
///
/// All variants carry owned strings (upstream name and cause) rather than
/// source errors so the type is `Clone` - a coalesced in-flight request
/// fans its outcome out to every waiter.
#[derive(Clone, Error, Debug, PartialEq)]
pub enum FetchError {
    /// The upstream could not be reached or answered with a server error.
    /// Transient - retry with exponential backoff.
    #[error("Provider unavailable: {provider} - {message}")]
    ProviderUnavailable {
        /// The upstream that failed
        provider: String,
        /// Network or HTTP-level cause
        message: String,
    },

    /// The upstream throttled the request (HTTP 429 or a provider-specific
    /// throttling signal). Not retried in-process; stale cache may be served.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The upstream that throttled the request
        provider: String,
    },

    /// The request to the upstream timed out.
    /// Transient - retry with exponential backoff.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The upstream that timed out
        provider: String,
    },

    /// The upstream answered, but the payload was missing an expected
    /// envelope member or was otherwise malformed. Terminal - a malformed
    /// payload will not fix itself on a re-request.
    #[error("Parse error: {provider} - {message}")]
    ParseError {
        /// The upstream whose payload failed to parse
        provider: String,
        /// What was missing or malformed
        message: String,
    },

    /// Multiple records from the same upstream landed in one correlation
    /// group (e.g. a doubleheader). The records are listed uncorrelated
    /// rather than merged by guesswork; this variant is a data-quality
    /// signal, never surfaced as a call failure.
    #[error("Correlation ambiguous: {key}")]
    CorrelationAmbiguous {
        /// The group key that had conflicting candidates
        key: String,
    },

    /// No canonical entity exists for the requested identifier.
    #[error("Not found: {id}")]
    NotFound {
        /// The identifier that could not be resolved
        id: String,
    },
}

impl FetchError {
    /// Build a [`FetchError`] from a `reqwest` transport error, mapping
    /// timeouts to [`Timeout`](Self::Timeout) and everything else to
    /// [`ProviderUnavailable`](Self::ProviderUnavailable).
    pub fn from_transport(provider: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else {
            Self::ProviderUnavailable {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Build a [`FetchError`] from an HTTP status code, mapping 429 to
    /// [`RateLimited`](Self::RateLimited) and other non-success codes to
    /// [`ProviderUnavailable`](Self::ProviderUnavailable).
    pub fn from_status(provider: &str, status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited {
                provider: provider.to_string(),
            }
        } else {
            Self::ProviderUnavailable {
                provider: provider.to_string(),
                message: format!("HTTP {}", status),
            }
        }
    }

    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use cricketfusion_sports_data::errors::{FetchError, RetryClass};
    ///
    /// let error = FetchError::Timeout { provider: "CRIC_API".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = FetchError::ParseError {
    ///     provider: "MSN_STANDINGS".to_string(),
    ///     message: "missing value[0].standings".to_string(),
    /// };
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // Transient availability failures - retry with backoff
            Self::ProviderUnavailable { .. } | Self::Timeout { .. } => RetryClass::WithBackoff,

            // Throttled - don't add load, but stale data is acceptable
            Self::RateLimited { .. } => RetryClass::StaleOnly,

            // Terminal - retrying won't change the outcome
            Self::ParseError { .. } | Self::CorrelationAmbiguous { .. } | Self::NotFound { .. } => {
                RetryClass::Never
            }
        }
    }

    /// The upstream this error names, where applicable.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::ProviderUnavailable { provider, .. }
            | Self::RateLimited { provider }
            | Self::Timeout { provider }
            | Self::ParseError { provider, .. } => Some(provider),
            Self::CorrelationAmbiguous { .. } | Self::NotFound { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_retries_with_backoff() {
        let error = FetchError::Timeout {
            provider: "CRIC_API".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_provider_unavailable_retries_with_backoff() {
        let error = FetchError::ProviderUnavailable {
            provider: "MSN_SCHEDULE".to_string(),
            message: "HTTP 503".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_rate_limited_is_stale_only() {
        let error = FetchError::RateLimited {
            provider: "CRIC_API".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::StaleOnly);
    }

    #[test]
    fn test_parse_error_never_retries() {
        let error = FetchError::ParseError {
            provider: "MSN_STANDINGS".to_string(),
            message: "missing value[0].standings".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_not_found_never_retries() {
        let error = FetchError::NotFound {
            id: "abc123".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_correlation_ambiguous_never_retries() {
        let error = FetchError::CorrelationAmbiguous {
            key: "india|pakistan|2025-03-22".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_from_status_maps_429_to_rate_limited() {
        let error = FetchError::from_status("CRIC_API", reqwest::StatusCode::TOO_MANY_REQUESTS);
        assert!(matches!(error, FetchError::RateLimited { .. }));
    }

    #[test]
    fn test_from_status_maps_5xx_to_unavailable() {
        let error = FetchError::from_status("CRIC_API", reqwest::StatusCode::BAD_GATEWAY);
        assert!(matches!(error, FetchError::ProviderUnavailable { .. }));
    }

    #[test]
    fn test_error_display() {
        let error = FetchError::Timeout {
            provider: "CRIC_API".to_string(),
        };
        assert_eq!(format!("{}", error), "Timeout: CRIC_API");

        let error = FetchError::ParseError {
            provider: "CRICKET_NEWS".to_string(),
            message: "missing topics".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Parse error: CRICKET_NEWS - missing topics"
        );
    }
}
