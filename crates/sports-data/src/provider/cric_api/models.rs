//! Response envelope structures for the CricAPI endpoints.
//!
//! Only the fields the adapter consumes are declared; the API returns many
//! more, which serde ignores (additive drift is tolerated by default).

use serde::Deserialize;

/// `GET /cricScore` envelope.
#[derive(Debug, Deserialize)]
pub(super) struct CricScoreResponse {
    /// Absent on malformed or error responses - treated as a parse failure.
    pub data: Option<Vec<CricScoreEntry>>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CricScoreEntry {
    pub id: String,
    #[serde(default)]
    pub t1: String,
    #[serde(default)]
    pub t2: String,
    #[serde(default)]
    pub t1s: String,
    #[serde(default)]
    pub t2s: String,
    #[serde(default)]
    pub t1img: Option<String>,
    #[serde(default)]
    pub t2img: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(rename = "matchType", default)]
    pub match_type: Option<String>,
    /// Free-text status line, e.g. "India opt to bat".
    #[serde(default)]
    pub status: Option<String>,
    /// Machine-readable state: "fixture" | "live" | "result".
    #[serde(default)]
    pub ms: Option<String>,
    #[serde(rename = "dateTimeGMT", default)]
    pub date_time_gmt: Option<String>,
}

/// `GET /match_info` envelope.
#[derive(Debug, Deserialize)]
pub(super) struct MatchInfoResponse {
    pub data: Option<MatchInfoData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MatchInfoData {
    pub id: String,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(rename = "dateTimeGMT", default)]
    pub date_time_gmt: Option<String>,
    #[serde(rename = "matchType", default)]
    pub match_type: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "matchStarted", default)]
    pub match_started: Option<bool>,
    #[serde(rename = "matchEnded", default)]
    pub match_ended: Option<bool>,
    #[serde(rename = "tossWinner", default)]
    pub toss_winner: Option<String>,
    #[serde(rename = "tossChoice", default)]
    pub toss_choice: Option<String>,
    #[serde(rename = "matchWinner", default)]
    pub match_winner: Option<String>,
    #[serde(default)]
    pub score: Vec<MatchInfoInnings>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MatchInfoInnings {
    #[serde(default)]
    pub inning: String,
    /// Numeric fields are coerced and defaulted to 0 rather than left
    /// undefined when the upstream drops them mid-innings.
    #[serde(default)]
    pub r: u32,
    #[serde(default)]
    pub w: u32,
    #[serde(default)]
    pub o: f64,
}
