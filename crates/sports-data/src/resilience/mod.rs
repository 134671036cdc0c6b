//! Resilience guard wrapping adapter calls.
//!
//! One [`Guard`] sits in front of each upstream concern and provides:
//! - a per-attempt timeout bound (expiry yields a typed `Timeout`, never a
//!   hang)
//! - retry with exponential backoff, but only for failures classified
//!   [`RetryClass::WithBackoff`] - a malformed payload is never re-requested
//! - a short-lived response cache with stale-but-available fallback when
//!   the upstream stays down past the retries
//! - coalescing of concurrent identical requests into a single upstream
//!   call, fanning the outcome out to every waiter
//!
//! A guard call never panics and never hangs: it resolves to a value
//! (fresh or stale-flagged) or a typed [`FetchError`].

mod cache;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use tokio::sync::broadcast;

use crate::errors::{FetchError, RetryClass};
use cache::TtlCache;

/// Timeout, retry, and cache knobs for one upstream concern.
#[derive(Clone, Debug)]
pub struct ResiliencePolicy {
    /// Bound on each individual upstream attempt.
    pub timeout: Duration,
    /// Retry attempts after the first try.
    pub max_retries: u32,
    /// Initial backoff delay; doubles per retry.
    pub backoff_base: Duration,
    /// How long a successful response stays fresh.
    pub ttl: Duration,
}

impl Default for ResiliencePolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(8),
            max_retries: 2,
            backoff_base: Duration::from_millis(250),
            ttl: Duration::from_secs(60),
        }
    }
}

/// A guarded fetch outcome: the value plus its provenance.
#[derive(Clone, Debug)]
pub struct Fetched<T> {
    pub value: T,
    /// When the value was last successfully fetched from the upstream.
    pub fetched_at: DateTime<Utc>,
    /// True when the value was served past its freshness window because
    /// the upstream is currently unreachable.
    pub stale: bool,
}

type Outcome<T> = Result<Fetched<T>, FetchError>;

/// Resilience guard for one upstream concern.
pub struct Guard<T> {
    provider: &'static str,
    policy: ResiliencePolicy,
    cache: TtlCache<T>,
    /// Cache key -> broadcast channel of the in-flight leader request.
    in_flight: Mutex<HashMap<String, broadcast::Sender<Outcome<T>>>>,
}

impl<T: Clone + Send + 'static> Guard<T> {
    pub fn new(provider: &'static str, policy: ResiliencePolicy) -> Self {
        let ttl = policy.ttl;
        Self {
            provider,
            policy,
            cache: TtlCache::new(ttl),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the in-flight map, recovering from poison if necessary.
    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<Outcome<T>>>> {
        self.in_flight.lock().unwrap_or_else(|poisoned| {
            warn!("In-flight map mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Drive one guarded fetch.
    ///
    /// `key` is the normalized request-parameter cache key; `fetch` builds
    /// the adapter future for one attempt. The closure is invoked once per
    /// attempt, so retries re-issue the request rather than re-polling a
    /// spent future.
    pub async fn call<F, Fut>(&self, key: &str, fetch: F) -> Outcome<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        if let Some((value, fetched_at)) = self.cache.get_fresh(key) {
            debug!("Guard[{}]: cache hit for '{}'", self.provider, key);
            return Ok(Fetched {
                value,
                fetched_at,
                stale: false,
            });
        }

        // Coalesce: exactly one caller per key becomes the leader and
        // issues the upstream request; everyone else subscribes to its
        // outcome.
        let follower_rx = {
            let mut in_flight = self.lock_in_flight();
            match in_flight.get(key) {
                Some(tx) => Some(tx.subscribe()),
                None => {
                    let (tx, _) = broadcast::channel(1);
                    in_flight.insert(key.to_string(), tx);
                    None
                }
            }
        };

        if let Some(mut rx) = follower_rx {
            debug!(
                "Guard[{}]: coalescing onto in-flight request for '{}'",
                self.provider, key
            );
            return match rx.recv().await {
                Ok(outcome) => outcome,
                // Leader was cancelled before settling (e.g. the caller's
                // deadline elapsed). Fall back to stale data if any.
                Err(_) => self.stale_or(FetchError::Timeout {
                    provider: self.provider.to_string(),
                }, key),
            };
        }

        // Leader path. The cleanup guard removes the in-flight entry if
        // this future is dropped mid-attempt, so followers are never left
        // waiting on an abandoned channel.
        let mut cleanup = InFlightCleanup {
            guard: self,
            key,
            armed: true,
        };
        let outcome = self.attempt(key, &fetch).await;

        let tx = self.lock_in_flight().remove(key);
        cleanup.disarm();
        if let Some(tx) = tx {
            let _ = tx.send(outcome.clone());
        }
        outcome
    }

    /// Run the attempt loop: timeout-bounded tries with exponential
    /// backoff, then stale fallback.
    async fn attempt<F, Fut>(&self, key: &str, fetch: &F) -> Outcome<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut delay = self.policy.backoff_base;
        let mut last_error: Option<FetchError> = None;

        for attempt_no in 0..=self.policy.max_retries {
            if attempt_no > 0 {
                debug!(
                    "Guard[{}]: retry {} for '{}' after {:?}",
                    self.provider, attempt_no, key, delay
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }

            let result = match tokio::time::timeout(self.policy.timeout, fetch()).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout {
                    provider: self.provider.to_string(),
                }),
            };

            match result {
                Ok(value) => {
                    let fetched_at = Utc::now();
                    self.cache.insert(key, value.clone(), fetched_at);
                    return Ok(Fetched {
                        value,
                        fetched_at,
                        stale: false,
                    });
                }
                Err(e) => match e.retry_class() {
                    RetryClass::WithBackoff => {
                        warn!(
                            "Guard[{}]: attempt {} for '{}' failed: {}",
                            self.provider,
                            attempt_no + 1,
                            key,
                            e
                        );
                        last_error = Some(e);
                    }
                    RetryClass::StaleOnly => {
                        last_error = Some(e);
                        break;
                    }
                    // Terminal: a malformed payload or unknown entity
                    // won't change on a re-request, and stale data would
                    // mask a real contract break.
                    RetryClass::Never => return Err(e),
                },
            }
        }

        let error = last_error.unwrap_or_else(|| FetchError::ProviderUnavailable {
            provider: self.provider.to_string(),
            message: "no attempt was made".to_string(),
        });
        self.stale_or(error, key)
    }

    /// Serve the last known good value flagged stale, or surface `error`.
    fn stale_or(&self, error: FetchError, key: &str) -> Outcome<T> {
        if let Some((value, fetched_at)) = self.cache.get_any(key) {
            warn!(
                "Guard[{}]: serving stale data for '{}' after failure: {}",
                self.provider, key, error
            );
            return Ok(Fetched {
                value,
                fetched_at,
                stale: true,
            });
        }
        Err(error)
    }
}

/// Removes the in-flight entry if the leader future is dropped before it
/// settles, waking followers instead of stranding them.
struct InFlightCleanup<'g, T> {
    guard: &'g Guard<T>,
    key: &'g str,
    armed: bool,
}

impl<T> InFlightCleanup<'_, T> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<T> Drop for InFlightCleanup<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut in_flight = self.guard.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        in_flight.remove(self.key);
    }
}
