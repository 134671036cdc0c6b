use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a match, normalized across upstreams.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Scheduled but not started.
    Upcoming,
    /// In progress.
    Live,
    /// Finished with a result.
    Completed,
    /// Called off (rain, forfeit, etc.).
    Abandoned,
    /// The backing record carried no usable state signal.
    Unknown,
}

impl MatchStatus {
    /// Whether score data is meaningful for this state.
    pub fn has_score(&self) -> bool {
        matches!(self, Self::Live | Self::Completed | Self::Abandoned)
    }
}

/// Normalized team reference: display name plus optional logo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamRef {
    /// Display name as the upstream reports it (whitespace-trimmed).
    pub name: String,

    /// Logo URL, when the upstream provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl TeamRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            logo_url: None,
        }
    }

    pub fn with_logo(name: impl Into<String>, logo_url: Option<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            logo_url: logo_url.filter(|l| !l.is_empty()),
        }
    }
}

/// One innings line on the scoreboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InningsScore {
    /// Innings label, e.g. "India Inning 1".
    pub inning: String,
    /// Runs scored.
    pub runs: u32,
    /// Wickets fallen.
    pub wickets: u32,
    /// Overs bowled in upstream notation (40.3 = 40 overs, 3 balls).
    pub overs: f64,
}

/// Toss outcome, when the upstream reports it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TossInfo {
    /// Team that won the toss.
    pub winner: String,
    /// What the winner elected to do ("bat" / "bowl").
    pub decision: String,
}

/// The canonical match entity: one real-world cricket match, merged from
/// possibly several provider-specific records.
///
/// Invariant: `external_ids` is never empty - a `Match` always has at least
/// one backing provider record. `canonical_id` is deterministic for the
/// same merge inputs (a stable hash, no clock or randomness involvement).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Match {
    /// Internally generated identifier, stable across calls for the same
    /// real match.
    pub canonical_id: String,

    /// Provider name -> that provider's native identifier.
    pub external_ids: HashMap<String, String>,

    pub team_a: TeamRef,
    pub team_b: TeamRef,

    pub status: MatchStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,

    /// Scheduled start, normalized to UTC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// Free-text tournament label, e.g. "Indian Premier League 2025".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,

    /// Format label, e.g. "T20", "ODI".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub toss: Option<TossInfo>,

    /// Winning team, once the match has a result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,

    /// Score per innings; populated only once the match is at least Live.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub innings: Vec<InningsScore>,

    /// Provider name -> timestamp of the last successful fetch that
    /// contributed to this entity.
    pub source_freshness: HashMap<String, DateTime<Utc>>,
}

/// One provider's partial view of a match, before correlation.
///
/// Adapters emit these; the correlation engine merges them into [`Match`]
/// entities. Every field except identity and teams is optional because no
/// single upstream reports everything.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchPartial {
    /// The adapter that produced this record.
    pub provider: &'static str,

    /// The provider's native match identifier.
    pub external_id: String,

    pub team_a: TeamRef,
    pub team_b: TeamRef,

    pub status: Option<MatchStatus>,
    pub venue: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub series: Option<String>,
    pub match_type: Option<String>,
    pub toss: Option<TossInfo>,
    pub winner: Option<String>,
    pub innings: Vec<InningsScore>,
}

impl MatchPartial {
    /// A record with only identity and teams; everything else unset.
    pub fn new(
        provider: &'static str,
        external_id: impl Into<String>,
        team_a: TeamRef,
        team_b: TeamRef,
    ) -> Self {
        Self {
            provider,
            external_id: external_id.into(),
            team_a,
            team_b,
            status: None,
            venue: None,
            start_time: None,
            series: None,
            match_type: None,
            toss: None,
            winner: None,
            innings: Vec::new(),
        }
    }
}
