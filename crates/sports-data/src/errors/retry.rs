/// Classification for the resilience policy.
///
/// Determines how the guard wrapping an adapter call should respond to a
/// failure from that adapter.
///
/// # Behavior Summary
///
/// | Class | Retry with backoff? | Stale-cache fallback? |
/// |-------|--------------------|-----------------------|
/// | `Never` | No | No |
/// | `WithBackoff` | Yes | Yes (after retries are exhausted) |
/// | `StaleOnly` | No | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - malformed payload, unknown entity, or terminal failure.
    /// The outcome is fundamentally not going to change on a re-request.
    Never,

    /// Retry with exponential backoff, then fall back to the last cached
    /// value if one exists.
    ///
    /// Used for transient availability failures: timeouts and network/5xx
    /// errors. A second attempt a moment later has a real chance of
    /// succeeding.
    WithBackoff,

    /// Do not re-request, but serve the last cached value if one exists.
    ///
    /// Used for rate limiting (429): issuing more requests inside the
    /// throttling window only extends it, while yesterday's answer is still
    /// better than no answer.
    StaleOnly,
}
