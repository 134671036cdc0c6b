//! Cricket Fusion Sports Data Crate
//!
//! This crate provides provider-agnostic cricket data aggregation for the
//! Cricket Fusion application.
//!
//! # Overview
//!
//! The sports data crate supports:
//! - Multiple upstreams: CricAPI live scores, MSN sports schedule and
//!   standings, the cricket news feed
//! - Normalization of every upstream payload into one canonical model
//! - Cross-provider correlation of live and schedule records into single
//!   match entities
//! - Per-upstream resilience: timeouts, classified retries, short-TTL
//!   caching with stale fallback, and request coalescing
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | SportsDataService|  (aggregation facade)
//! +------------------+
//!         |
//!         v
//! +------------------+
//! |      Guard       |  (timeout / retry / cache / coalescing)
//! +------------------+
//!         |
//!         v
//! +------------------+
//! |     Adapter      |  (CricAPI, MSN sports, cricket news)
//! +------------------+
//!         |
//!         v
//! +------------------+
//! |  MatchPartial    |  (per-provider record)
//! +------------------+
//!         |
//!         v
//! +------------------+
//! |    correlate     |  (canonical Match entities)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Match`] - Canonical match entity, merged across providers
//! - [`MatchPartial`] - One provider's pre-correlation view of a match
//! - [`Standing`] - Tournament points-table row
//! - [`NewsArticle`] - Normalized news article
//! - [`FetchError`] - Typed failure taxonomy with retry classification
//! - [`SportsDataService`] - The facade every consumer talks to

pub mod config;
pub mod correlate;
pub mod errors;
pub mod facade;
pub mod models;
pub mod provider;
pub mod resilience;

// Re-export all public types from models
pub use models::{
    InningsScore, Match, MatchPartial, MatchStatus, NewsArticle, Standing, TeamRef, TossInfo,
};

// Re-export error types
pub use errors::{FetchError, RetryClass};

// Re-export provider traits and adapters
pub use provider::cric_api::CricApiProvider;
pub use provider::cricket_news::CricketNewsProvider;
pub use provider::msn_sports::{MsnScheduleProvider, MsnStandingsProvider};
pub use provider::{LiveScoreSource, NewsSource, ScheduleSource, StandingsSource};

// Re-export the resilience and facade surface
pub use config::{ProviderEndpoint, SportsDataConfig};
pub use correlate::{correlate, link_news, Batch, Correlated, CorrelationReport};
pub use facade::{LiveMatchesView, NewsView, SourceState, SourceStatus, SportsDataService};
pub use resilience::{Fetched, Guard, ResiliencePolicy};
