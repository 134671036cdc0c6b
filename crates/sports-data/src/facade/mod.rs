//! Aggregation facade: the crate's public entry point.
//!
//! [`SportsDataService`] holds the four upstream adapters behind their
//! traits, one resilience guard per upstream concern, and the assembled
//! config. Every operation fans out the guarded fetches it needs, waits
//! for all of them to settle, and assembles an immutable snapshot. A
//! failed upstream degrades its slice of the response; it never fails a
//! multi-source call wholesale.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::config::SportsDataConfig;
use crate::correlate::{correlate, link_news, Batch, CorrelationReport};
use crate::errors::FetchError;
use crate::models::{Match, MatchPartial, NewsArticle, Standing};
use crate::provider::cric_api::CricApiProvider;
use crate::provider::cricket_news::CricketNewsProvider;
use crate::provider::msn_sports::{MsnScheduleProvider, MsnStandingsProvider};
use crate::provider::{LiveScoreSource, NewsSource, ScheduleSource, StandingsSource};
use crate::resilience::{Fetched, Guard};

const LIVE_KEY: &str = "live";
const SCHEDULE_KEY: &str = "schedule";

/// How one upstream fared in a facade call.
#[derive(Clone, Debug)]
pub struct SourceStatus {
    pub provider: String,
    pub state: SourceState,
}

#[derive(Clone, Debug)]
pub enum SourceState {
    /// Fresh data from the upstream (or a fresh cache hit).
    Ok { fetched_at: DateTime<Utc> },
    /// The upstream is currently unreachable; data served from an expired
    /// cache entry.
    Stale { fetched_at: DateTime<Utc> },
    /// The upstream failed and no cached data was available.
    Failed { error: FetchError },
}

/// Correlated live view plus per-upstream provenance.
#[derive(Clone, Debug)]
pub struct LiveMatchesView {
    pub matches: Vec<Match>,
    pub report: CorrelationReport,
    pub sources: Vec<SourceStatus>,
}

/// News articles plus per-upstream provenance.
#[derive(Clone, Debug)]
pub struct NewsView {
    pub articles: Vec<NewsArticle>,
    pub sources: Vec<SourceStatus>,
}

/// The aggregation service.
///
/// Construction wires adapters and guards once; operations are `&self`
/// and safe to call concurrently. No locks are held across upstream
/// awaits beyond the guards' own bookkeeping maps.
pub struct SportsDataService {
    live: Arc<dyn LiveScoreSource>,
    schedule: Arc<dyn ScheduleSource>,
    standings: Arc<dyn StandingsSource>,
    news: Arc<dyn NewsSource>,

    live_guard: Guard<Vec<MatchPartial>>,
    schedule_guard: Guard<Vec<MatchPartial>>,
    detail_guard: Guard<MatchPartial>,
    standings_guard: Guard<Vec<Standing>>,
    news_guard: Guard<Vec<NewsArticle>>,
}

impl SportsDataService {
    /// Wire the service from explicit adapters. Tests inject mocks here;
    /// production wiring goes through [`from_config`](Self::from_config).
    pub fn new(
        live: Arc<dyn LiveScoreSource>,
        schedule: Arc<dyn ScheduleSource>,
        standings: Arc<dyn StandingsSource>,
        news: Arc<dyn NewsSource>,
        config: &SportsDataConfig,
    ) -> Self {
        let live_guard = Guard::new(live.id(), config.policy(config.live_ttl));
        let schedule_guard = Guard::new(schedule.id(), config.policy(config.schedule_ttl));
        let detail_guard = Guard::new(live.id(), config.policy(config.live_ttl));
        let standings_guard = Guard::new(standings.id(), config.policy(config.standings_ttl));
        let news_guard = Guard::new(news.id(), config.policy(config.news_ttl));

        Self {
            live,
            schedule,
            standings,
            news,
            live_guard,
            schedule_guard,
            detail_guard,
            standings_guard,
            news_guard,
        }
    }

    /// Wire the service against the real upstreams described by `config`.
    pub fn from_config(config: &SportsDataConfig) -> Self {
        Self::new(
            Arc::new(CricApiProvider::new(&config.cric_api, config.request_timeout)),
            Arc::new(MsnScheduleProvider::new(
                &config.msn,
                config.msn_league_id.clone(),
                config.request_timeout,
            )),
            Arc::new(MsnStandingsProvider::new(&config.msn, config.request_timeout)),
            Arc::new(CricketNewsProvider::new(
                &config.news_base_url,
                config.request_timeout,
            )),
            config,
        )
    }

    /// The correlated live view: live scores and schedule fetched
    /// concurrently, merged, optionally filtered by series.
    ///
    /// `deadline` additionally bounds each branch; a branch that misses it
    /// counts as timed out and contributes nothing, the rest of the call
    /// proceeds with whatever settled. This never fails wholesale: a fully
    /// degraded call returns an empty match list with both sources marked
    /// `Failed`.
    pub async fn get_live_matches(
        &self,
        series_filter: Option<&str>,
        deadline: Option<Duration>,
    ) -> LiveMatchesView {
        let (live_res, schedule_res) = self.fetch_match_views(deadline).await;

        let live_batch = batch_of(&live_res);
        let schedule_batch = batch_of(&schedule_res);
        let correlated = correlate(live_batch.as_ref(), schedule_batch.as_ref());

        let mut matches = correlated.matches;
        if let Some(filter) = series_filter {
            let needle = normalize_text(filter);
            if !needle.is_empty() {
                matches.retain(|m| {
                    m.series
                        .as_deref()
                        .map(|s| normalize_text(s).contains(&needle))
                        .unwrap_or(false)
                });
            }
        }

        debug!(
            "Live view assembled: {} matches, {} ambiguous groups",
            matches.len(),
            correlated.report.ambiguous.len()
        );

        LiveMatchesView {
            matches,
            report: correlated.report,
            sources: vec![
                source_status(self.live.id(), &live_res),
                source_status(self.schedule.id(), &schedule_res),
            ],
        }
    }

    /// One match by canonical id, enriched with scoreboard detail.
    ///
    /// Rebuilds the correlated view (cache hits make repeat calls cheap),
    /// then re-queries the live upstream's detail endpoint for innings,
    /// toss, and winner when the match carries a live-source external id.
    /// A degraded detail fetch returns the correlated match as-is.
    pub async fn get_match_detail(
        &self,
        canonical_id: &str,
        deadline: Option<Duration>,
    ) -> Result<Match, FetchError> {
        let view = self.get_live_matches(None, deadline).await;
        let mut found = view
            .matches
            .into_iter()
            .find(|m| m.canonical_id == canonical_id)
            .ok_or_else(|| FetchError::NotFound {
                id: canonical_id.to_string(),
            })?;

        let Some(external_id) = found.external_ids.get(self.live.id()).cloned() else {
            return Ok(found);
        };

        let key = format!("detail:{}", external_id);
        let detail_res = bounded(
            deadline,
            self.live.id(),
            self.detail_guard
                .call(&key, || self.live.fetch_match_detail(&external_id)),
        )
        .await;

        match detail_res {
            Ok(fetched) => {
                let detail = fetched.value;
                if let Some(status) = detail.status {
                    found.status = status;
                }
                if !detail.innings.is_empty() {
                    found.innings = detail.innings;
                }
                if detail.toss.is_some() {
                    found.toss = detail.toss;
                }
                if detail.winner.is_some() {
                    found.winner = detail.winner;
                }
                if found.venue.is_none() {
                    found.venue = detail.venue;
                }
                found
                    .source_freshness
                    .insert(self.live.id().to_string(), fetched.fetched_at);
            }
            Err(e) => {
                // Best effort: the correlated view already has teams and
                // status, so a failed detail fetch degrades rather than
                // errors.
                warn!("Detail fetch for '{}' degraded: {}", canonical_id, e);
            }
        }

        Ok(found)
    }

    /// Tournament points table. Single upstream, no correlation; the
    /// guard's stale fallback applies.
    pub async fn get_standings(
        &self,
        tournament_id: &str,
    ) -> Result<Fetched<Vec<Standing>>, FetchError> {
        let key = format!("standings:{}", tournament_id);
        self.standings_guard
            .call(&key, || self.standings.fetch_standings(tournament_id))
            .await
    }

    /// Recent news, annotated with `related_match_id` where an article
    /// unambiguously names a known match.
    ///
    /// The match view is fetched best-effort alongside the articles; if it
    /// degrades, articles are returned unannotated.
    pub async fn get_news(&self, limit: u32, deadline: Option<Duration>) -> NewsView {
        let news_key = format!("news:{}", limit);
        let news_fut = bounded(
            deadline,
            self.news.id(),
            self.news_guard
                .call(&news_key, || self.news.fetch_articles(limit)),
        );

        let (news_res, (live_res, schedule_res)) =
            tokio::join!(news_fut, self.fetch_match_views(deadline));

        let mut articles = match &news_res {
            Ok(fetched) => fetched.value.clone(),
            Err(e) => {
                warn!("News fetch failed: {}", e);
                Vec::new()
            }
        };

        let live_batch = batch_of(&live_res);
        let schedule_batch = batch_of(&schedule_res);
        let correlated = correlate(live_batch.as_ref(), schedule_batch.as_ref());
        link_news(&mut articles, &correlated.matches);

        NewsView {
            articles,
            sources: vec![
                source_status(self.news.id(), &news_res),
                source_status(self.live.id(), &live_res),
                source_status(self.schedule.id(), &schedule_res),
            ],
        }
    }

    /// Fan out the live and schedule fetches under the shared deadline.
    async fn fetch_match_views(
        &self,
        deadline: Option<Duration>,
    ) -> (
        Result<Fetched<Vec<MatchPartial>>, FetchError>,
        Result<Fetched<Vec<MatchPartial>>, FetchError>,
    ) {
        let live_fut = bounded(
            deadline,
            self.live.id(),
            self.live_guard.call(LIVE_KEY, || self.live.fetch_live()),
        );
        let schedule_fut = bounded(
            deadline,
            self.schedule.id(),
            self.schedule_guard
                .call(SCHEDULE_KEY, || self.schedule.fetch_schedule()),
        );
        tokio::join!(live_fut, schedule_fut)
    }
}

/// Bound a guarded fetch by the caller-supplied deadline.
async fn bounded<T>(
    deadline: Option<Duration>,
    provider: &str,
    fut: impl Future<Output = Result<Fetched<T>, FetchError>>,
) -> Result<Fetched<T>, FetchError> {
    match deadline {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchError::Timeout {
                provider: provider.to_string(),
            }),
        },
        None => fut.await,
    }
}

fn batch_of(result: &Result<Fetched<Vec<MatchPartial>>, FetchError>) -> Option<Batch> {
    result
        .as_ref()
        .ok()
        .map(|fetched| Batch::new(fetched.value.clone(), fetched.fetched_at))
}

fn source_status<T>(provider: &str, result: &Result<Fetched<T>, FetchError>) -> SourceStatus {
    let state = match result {
        Ok(fetched) if fetched.stale => SourceState::Stale {
            fetched_at: fetched.fetched_at,
        },
        Ok(fetched) => SourceState::Ok {
            fetched_at: fetched.fetched_at,
        },
        Err(e) => SourceState::Failed { error: e.clone() },
    };
    SourceStatus {
        provider: provider.to_string(),
        state,
    }
}

/// Case- and punctuation-insensitive text for series matching.
fn normalize_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            cleaned.extend(ch.to_lowercase());
        } else if ch.is_whitespace() {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
