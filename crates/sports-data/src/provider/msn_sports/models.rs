//! Response envelope structures for the MSN sports endpoints.
//!
//! MSN wraps everything in deeply nested arrays (`value[0].schedules[0]
//! .games[]`, `value[0].standings[]`). Every level of the chain is optional
//! here; the adapters fail closed with a parse error when a level is
//! missing instead of indexing blindly.

use serde::Deserialize;

// ── liveschedules ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(super) struct ScheduleResponse {
    #[serde(default)]
    pub value: Vec<ScheduleValue>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ScheduleValue {
    #[serde(default)]
    pub schedules: Vec<ScheduleBlock>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ScheduleBlock {
    #[serde(default)]
    pub games: Vec<Game>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Game {
    pub id: String,
    #[serde(rename = "startDateTime", default)]
    pub start_date_time: Option<String>,
    #[serde(rename = "gameState", default)]
    pub game_state: Option<GameState>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub venue: Option<Venue>,
    #[serde(default)]
    pub league: Option<League>,
    #[serde(rename = "gameType", default)]
    pub game_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GameState {
    #[serde(rename = "gameStatus", default)]
    pub game_status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Participant {
    #[serde(default)]
    pub team: Option<Team>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Team {
    #[serde(rename = "schoolName", default)]
    pub school_name: Option<String>,
    #[serde(rename = "shortName", default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub image: Option<TeamImage>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TeamImage {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Venue {
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct League {
    #[serde(default)]
    pub name: Option<String>,
}

// ── standings ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(super) struct StandingsResponse {
    #[serde(default)]
    pub value: Vec<StandingsValue>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StandingsValue {
    /// Absent on malformed responses - treated as a parse failure.
    pub standings: Option<Vec<StandingEntry>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StandingEntry {
    #[serde(rename = "overallRank", default)]
    pub overall_rank: u32,
    #[serde(rename = "gamesPlayed", default)]
    pub games_played: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(rename = "winLoss", default)]
    pub win_loss: Option<WinLoss>,
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(rename = "netRunRate", default)]
    pub net_run_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct WinLoss {
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
}
