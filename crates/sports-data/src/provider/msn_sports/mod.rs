//! MSN sports provider implementations.
//!
//! One upstream, two adapters sharing the envelope models:
//! - [`MsnScheduleProvider`] - the league schedule via `liveschedules`
//! - [`MsnStandingsProvider`] - tournament points tables via `standings`
//!
//! MSN identifies matches by its own game ids which no other upstream
//! shares. Schedule records carry the static metadata (venue, official
//! start time, series) the live upstream omits.

mod models;

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::config::ProviderEndpoint;
use crate::errors::FetchError;
use crate::models::{MatchPartial, MatchStatus, Standing, TeamRef};
use crate::provider::{ScheduleSource, StandingsSource};

use models::{Game, ScheduleResponse, StandingEntry, StandingsResponse, Team};

pub(crate) const SCHEDULE_PROVIDER_ID: &str = "MSN_SCHEDULE";
pub(crate) const STANDINGS_PROVIDER_ID: &str = "MSN_STANDINGS";

/// Bing sports thumbnail endpoint; MSN standings reference logos by
/// image id only.
const IMAGE_BASE: &str = "https://www.bing.com/th";

/// Make a request to an MSN sports endpoint with the API key attached.
async fn fetch(
    client: &Client,
    provider: &str,
    base_url: &str,
    path: &str,
    api_key: &str,
    extra: &[(&str, &str)],
) -> Result<String, FetchError> {
    let mut params: Vec<(&str, &str)> =
        vec![("apikey", api_key), ("version", "1.0"), ("cm", "en-in")];
    params.extend_from_slice(extra);

    let url = reqwest::Url::parse_with_params(&format!("{}/{}", base_url, path), &params)
        .map_err(|e| FetchError::ProviderUnavailable {
            provider: provider.to_string(),
            message: format!("Failed to build URL: {}", e),
        })?;

    debug!("MSN request: {}", url.as_str().replace(api_key, "***"));

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::from_transport(provider, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::from_status(provider, status));
    }

    response
        .text()
        .await
        .map_err(|e| FetchError::from_transport(provider, &e))
}

/// Display name for an MSN team record. MSN uses `schoolName` for the full
/// name (a leftover of its US-sports schema) and `shortName` as fallback.
fn team_ref(team: Option<&Team>) -> Option<TeamRef> {
    let team = team?;
    let name = team
        .school_name
        .as_deref()
        .or(team.short_name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())?;

    let logo = team.image.as_ref().and_then(|i| i.id.as_deref()).map(|id| {
        format!("{}?id={}&pid=MSports&w=50&h=50&qlt=90", IMAGE_BASE, id)
    });

    Some(TeamRef::with_logo(name, logo))
}

// ── Schedule ─────────────────────────────────────────────────────────────────

/// MSN league schedule provider.
pub struct MsnScheduleProvider {
    client: Client,
    base_url: String,
    api_key: String,
    /// MSN league identifier, e.g. "Cricket_IPL".
    league_id: String,
}

impl MsnScheduleProvider {
    pub fn new(endpoint: &ProviderEndpoint, league_id: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            api_key: endpoint.api_key.clone(),
            league_id: league_id.into(),
        }
    }

    fn map_status(game_status: Option<&str>) -> Option<MatchStatus> {
        match game_status? {
            "PreGame" => Some(MatchStatus::Upcoming),
            "InProgress" => Some(MatchStatus::Live),
            "Final" => Some(MatchStatus::Completed),
            "Postponed" | "Canceled" | "Cancelled" => Some(MatchStatus::Abandoned),
            _ => None,
        }
    }

    /// Convert one scheduled game into a canonical match partial. Games
    /// with fewer than two resolvable participants are dropped (logged),
    /// not faulted on.
    fn to_partial(game: Game) -> Option<MatchPartial> {
        let mut teams = game
            .participants
            .iter()
            .filter_map(|p| team_ref(p.team.as_ref()));
        let team_a = teams.next()?;
        let team_b = teams.next()?;

        Some(MatchPartial {
            provider: SCHEDULE_PROVIDER_ID,
            external_id: game.id,
            team_a,
            team_b,
            status: Self::map_status(
                game.game_state
                    .as_ref()
                    .and_then(|s| s.game_status.as_deref()),
            ),
            venue: game
                .venue
                .and_then(|v| v.full_name)
                .filter(|v| !v.trim().is_empty()),
            start_time: game
                .start_date_time
                .as_deref()
                .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
                .map(|dt| dt.with_timezone(&chrono::Utc)),
            series: game.league.and_then(|l| l.name),
            match_type: game.game_type,
            toss: None,
            winner: None,
            innings: Vec::new(),
        })
    }
}

#[async_trait]
impl ScheduleSource for MsnScheduleProvider {
    fn id(&self) -> &'static str {
        SCHEDULE_PROVIDER_ID
    }

    async fn fetch_schedule(&self) -> Result<Vec<MatchPartial>, FetchError> {
        let text = fetch(
            &self.client,
            SCHEDULE_PROVIDER_ID,
            &self.base_url,
            "liveschedules",
            &self.api_key,
            &[
                ("ids", &self.league_id),
                ("type", "leagueupcoming"),
                ("withcalendar", "false"),
            ],
        )
        .await?;

        let response: ScheduleResponse =
            serde_json::from_str(&text).map_err(|e| FetchError::ParseError {
                provider: SCHEDULE_PROVIDER_ID.to_string(),
                message: format!("Failed to parse liveschedules response: {}", e),
            })?;

        let block = response
            .value
            .into_iter()
            .next()
            .and_then(|v| v.schedules.into_iter().next())
            .ok_or_else(|| FetchError::ParseError {
                provider: SCHEDULE_PROVIDER_ID.to_string(),
                message: "liveschedules response missing value[0].schedules[0]".to_string(),
            })?;

        let total = block.games.len();
        let partials: Vec<MatchPartial> = block
            .games
            .into_iter()
            .filter_map(Self::to_partial)
            .collect();

        if partials.len() < total {
            debug!(
                "MSN schedule: dropped {} games without two participants",
                total - partials.len()
            );
        }

        debug!("MSN schedule: fetched {} games", partials.len());
        Ok(partials)
    }
}

// ── Standings ────────────────────────────────────────────────────────────────

/// MSN tournament standings provider.
pub struct MsnStandingsProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MsnStandingsProvider {
    pub fn new(endpoint: &ProviderEndpoint, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            api_key: endpoint.api_key.clone(),
        }
    }

    fn to_standing(entry: StandingEntry) -> Option<Standing> {
        let team = team_ref(entry.team.as_ref())?;
        let win_loss = entry.win_loss.unwrap_or_default();

        Some(Standing {
            team,
            rank: entry.overall_rank,
            played: entry.games_played,
            won: win_loss.wins,
            lost: win_loss.losses,
            points: entry.points,
            net_run_rate: entry.net_run_rate,
        })
    }
}

#[async_trait]
impl StandingsSource for MsnStandingsProvider {
    fn id(&self) -> &'static str {
        STANDINGS_PROVIDER_ID
    }

    async fn fetch_standings(&self, tournament_id: &str) -> Result<Vec<Standing>, FetchError> {
        let text = fetch(
            &self.client,
            STANDINGS_PROVIDER_ID,
            &self.base_url,
            "standings",
            &self.api_key,
            &[
                ("id", tournament_id),
                ("idtype", "league"),
                ("seasonPhase", "entireSeason"),
            ],
        )
        .await?;

        let response: StandingsResponse =
            serde_json::from_str(&text).map_err(|e| FetchError::ParseError {
                provider: STANDINGS_PROVIDER_ID.to_string(),
                message: format!("Failed to parse standings response: {}", e),
            })?;

        let entries = response
            .value
            .into_iter()
            .next()
            .and_then(|v| v.standings)
            .ok_or_else(|| FetchError::ParseError {
                provider: STANDINGS_PROVIDER_ID.to_string(),
                message: "standings response missing value[0].standings".to_string(),
            })?;

        let mut standings: Vec<Standing> = entries
            .into_iter()
            .filter_map(Self::to_standing)
            .collect();
        standings.sort_by_key(|s| s.rank);

        debug!("MSN standings: fetched {} rows", standings.len());
        Ok(standings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEDULE_FIXTURE: &str = r#"{
        "value": [{
            "schedules": [{
                "games": [
                    {
                        "id": "Cricket_Game_4411",
                        "startDateTime": "2025-03-22T03:00:00Z",
                        "gameState": {"gameStatus": "PreGame"},
                        "participants": [
                            {"team": {"schoolName": "india", "image": {"id": "AAind"}}},
                            {"team": {"schoolName": "australia", "image": {"id": "AAaus"}}}
                        ],
                        "venue": {"fullName": "Eden Gardens, Kolkata"},
                        "league": {"name": "Indian Premier League 2025"}
                    },
                    {
                        "id": "Cricket_Game_4412",
                        "startDateTime": "2025-03-23T14:00:00Z",
                        "gameState": {"gameStatus": "SomethingNew"},
                        "participants": [
                            {"team": {"shortName": "CSK"}},
                            {"team": {"shortName": "MI"}}
                        ]
                    }
                ]
            }]
        }]
    }"#;

    const STANDINGS_FIXTURE: &str = r#"{
        "value": [{
            "standings": [
                {
                    "overallRank": 2,
                    "gamesPlayed": 5,
                    "points": 8,
                    "winLoss": {"wins": 4, "losses": 1},
                    "team": {"schoolName": "Chennai Super Kings", "image": {"id": "AAcsk"}}
                },
                {
                    "overallRank": 1,
                    "gamesPlayed": 5,
                    "points": 10,
                    "winLoss": {"wins": 5, "losses": 0},
                    "team": {"schoolName": "Gujarat Titans", "image": {"id": "AAgt"}},
                    "netRunRate": 1.45
                }
            ]
        }]
    }"#;

    fn parse_schedule(json: &str) -> Vec<MatchPartial> {
        let response: ScheduleResponse = serde_json::from_str(json).unwrap();
        response
            .value
            .into_iter()
            .next()
            .unwrap()
            .schedules
            .into_iter()
            .next()
            .unwrap()
            .games
            .into_iter()
            .filter_map(MsnScheduleProvider::to_partial)
            .collect()
    }

    #[test]
    fn test_schedule_parsing() {
        let partials = parse_schedule(SCHEDULE_FIXTURE);
        assert_eq!(partials.len(), 2);

        let first = &partials[0];
        assert_eq!(first.provider, SCHEDULE_PROVIDER_ID);
        assert_eq!(first.external_id, "Cricket_Game_4411");
        assert_eq!(first.team_a.name, "india");
        assert_eq!(first.team_b.name, "australia");
        assert_eq!(first.status, Some(MatchStatus::Upcoming));
        assert_eq!(first.venue.as_deref(), Some("Eden Gardens, Kolkata"));
        assert_eq!(first.series.as_deref(), Some("Indian Premier League 2025"));
        assert!(first
            .team_a
            .logo_url
            .as_deref()
            .unwrap()
            .starts_with("https://www.bing.com/th?id=AAind"));

        // Unrecognized game status maps to no status, not a fault
        let second = &partials[1];
        assert_eq!(second.status, None);
        assert_eq!(second.team_a.name, "CSK");
    }

    #[test]
    fn test_schedule_drops_games_without_two_teams() {
        let json = r#"{
            "value": [{"schedules": [{"games": [
                {"id": "g1", "participants": [{"team": {"schoolName": "Lone Team"}}]}
            ]}]}]
        }"#;
        assert!(parse_schedule(json).is_empty());
    }

    #[test]
    fn test_schedule_missing_envelope_levels() {
        let response: ScheduleResponse = serde_json::from_str(r#"{"value": []}"#).unwrap();
        assert!(response
            .value
            .into_iter()
            .next()
            .and_then(|v| v.schedules.into_iter().next())
            .is_none());

        let response: ScheduleResponse =
            serde_json::from_str(r#"{"value": [{"schedules": []}]}"#).unwrap();
        assert!(response
            .value
            .into_iter()
            .next()
            .and_then(|v| v.schedules.into_iter().next())
            .is_none());
    }

    #[test]
    fn test_standings_parsing_sorted_by_rank() {
        let response: StandingsResponse = serde_json::from_str(STANDINGS_FIXTURE).unwrap();
        let entries = response
            .value
            .into_iter()
            .next()
            .unwrap()
            .standings
            .unwrap();

        let mut standings: Vec<Standing> = entries
            .into_iter()
            .filter_map(MsnStandingsProvider::to_standing)
            .collect();
        standings.sort_by_key(|s| s.rank);

        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[0].team.name, "Gujarat Titans");
        assert_eq!(standings[0].points, 10);
        assert_eq!(standings[0].net_run_rate, Some(1.45));

        assert_eq!(standings[1].rank, 2);
        assert_eq!(standings[1].won, 4);
        assert_eq!(standings[1].lost, 1);
        // Upstream omitted NRR - left unset, never fabricated
        assert_eq!(standings[1].net_run_rate, None);
    }

    #[test]
    fn test_standings_missing_member_is_detected() {
        // The end-to-end property: a response missing value[0].standings
        // must surface as a parse failure, and a later healthy response
        // must parse cleanly.
        let broken: StandingsResponse =
            serde_json::from_str(r#"{"value": [{"seasonPhase": "entireSeason"}]}"#).unwrap();
        assert!(broken
            .value
            .into_iter()
            .next()
            .and_then(|v| v.standings)
            .is_none());

        let healthy: StandingsResponse = serde_json::from_str(STANDINGS_FIXTURE).unwrap();
        assert!(healthy
            .value
            .into_iter()
            .next()
            .and_then(|v| v.standings)
            .is_some());
    }
}
