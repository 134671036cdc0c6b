//! Upstream adapter abstractions and implementations.
//!
//! This module contains:
//! - The per-concern adapter traits (`LiveScoreSource`, `ScheduleSource`,
//!   `StandingsSource`, `NewsSource`)
//! - Concrete adapter implementations, one module per upstream
//!
//! Adapters are deliberately thin: build the request for their one
//! upstream, parse the envelope failing closed on anything missing, and
//! normalize into canonical shapes. Timeouts, retries, caching, and
//! coalescing all live in the resilience guard, not here.

mod traits;

pub mod cric_api;
pub mod cricket_news;
pub mod msn_sports;

pub use traits::{LiveScoreSource, NewsSource, ScheduleSource, StandingsSource};
