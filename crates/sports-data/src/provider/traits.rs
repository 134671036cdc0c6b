//! Adapter trait definitions, one per upstream concern.
//!
//! Each adapter owns exactly one upstream's transport and schema quirks and
//! converts raw payloads into canonical records. Adapters never retry
//! internally; retry policy belongs to the resilience guard. No adapter
//! failure may propagate as an unhandled fault - every failure is a typed
//! [`FetchError`](crate::errors::FetchError).

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::models::{MatchPartial, NewsArticle, Standing};

/// Source of live match state and per-match detail.
#[async_trait]
pub trait LiveScoreSource: Send + Sync {
    /// Unique identifier for this upstream, e.g. "CRIC_API".
    /// Used for logging, cache keys, and external-id bookkeeping.
    fn id(&self) -> &'static str;

    /// Fetch the current set of matches with their live state.
    async fn fetch_live(&self) -> Result<Vec<MatchPartial>, FetchError>;

    /// Fetch full detail (innings, toss, winner) for one match by the
    /// upstream's native identifier.
    async fn fetch_match_detail(&self, external_id: &str) -> Result<MatchPartial, FetchError>;
}

/// Source of the official match schedule with static metadata
/// (venue, official start time, series name).
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    fn id(&self) -> &'static str;

    async fn fetch_schedule(&self) -> Result<Vec<MatchPartial>, FetchError>;
}

/// Source of tournament points tables.
#[async_trait]
pub trait StandingsSource: Send + Sync {
    fn id(&self) -> &'static str;

    async fn fetch_standings(&self, tournament_id: &str) -> Result<Vec<Standing>, FetchError>;
}

/// Source of cricket news articles.
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn id(&self) -> &'static str;

    /// Fetch up to `limit` recent articles.
    async fn fetch_articles(&self, limit: u32) -> Result<Vec<NewsArticle>, FetchError>;
}
