//! Canonical data models
//!
//! This module contains the provider-agnostic data types all adapters
//! normalize into:
//! - `match_entity` - Canonical match identity and per-provider partials
//! - `standing` - Tournament points-table rows
//! - `news` - Normalized news articles

mod match_entity;
mod news;
mod standing;

pub use match_entity::{InningsScore, Match, MatchPartial, MatchStatus, TeamRef, TossInfo};
pub use news::NewsArticle;
pub use standing::Standing;
