//! Correlation engine: merges per-provider [`MatchPartial`] records into
//! canonical [`Match`] entities.
//!
//! Grouping is deliberately coarse - an unordered normalized team pair
//! plus the UTC calendar date of the scheduled start. Within a group,
//! exactly one candidate per provider merges cleanly; more than one from
//! the same provider (a doubleheader) means the records stay separate
//! and the group is flagged ambiguous. Mis-merging two real matches is
//! worse than listing them twice.

mod aliases;

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;

use crate::models::{Match, MatchPartial, MatchStatus, NewsArticle};

/// A batch of partials from one provider, stamped with when the fetch
/// that produced it settled.
#[derive(Clone, Debug)]
pub struct Batch {
    pub partials: Vec<MatchPartial>,
    pub fetched_at: DateTime<Utc>,
}

impl Batch {
    pub fn new(partials: Vec<MatchPartial>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            partials,
            fetched_at,
        }
    }
}

/// Data-quality signals from a correlation pass. Ambiguity is reported,
/// never raised as a failure: the affected records are still listed, just
/// unmerged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CorrelationReport {
    /// Group keys (rendered as `teamA|teamB|date`) that held more than
    /// one candidate from a single provider.
    pub ambiguous: Vec<String>,
}

/// Result of correlating the live and schedule views.
#[derive(Clone, Debug)]
pub struct Correlated {
    pub matches: Vec<Match>,
    pub report: CorrelationReport,
}

/// Normalizes a team name for grouping: lowercase, punctuation stripped,
/// whitespace collapsed, aliases resolved.
pub fn normalize_team(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            cleaned.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '.' {
            cleaned.push(' ');
        }
        // Other punctuation (brackets, apostrophes) is dropped outright.
    }
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    aliases::resolve(&collapsed).to_string()
}

/// Coarse identity of a match: unordered normalized team pair plus the
/// UTC calendar date of the scheduled start.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct GroupKey {
    /// Lexicographically smaller normalized team name.
    first: String,
    second: String,
    date: Option<NaiveDate>,
}

impl GroupKey {
    fn of(partial: &MatchPartial) -> Self {
        let a = normalize_team(&partial.team_a.name);
        let b = normalize_team(&partial.team_b.name);
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first,
            second,
            date: partial.start_time.map(|t| t.date_naive()),
        }
    }

    fn render(&self) -> String {
        let date = self
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unscheduled".to_string());
        format!("{}|{}|{}", self.first, self.second, date)
    }

    /// Deterministic canonical id for a merged group: md5 over the
    /// rendered key. No clock or randomness involved.
    fn canonical_id(&self) -> String {
        format!("{:x}", md5::compute(self.render()))
    }
}

/// Canonical id for a record that stands alone (ambiguous group or no
/// merge partner on the other side having happened yet is fine - the key
/// only depends on the provider's own identity, so it is stable for as
/// long as the ambiguity persists).
fn standalone_id(partial: &MatchPartial) -> String {
    format!(
        "{:x}",
        md5::compute(format!("{}|{}", partial.provider, partial.external_id))
    )
}

/// Merges a live-score batch and a schedule batch into canonical matches.
///
/// Either side may be absent (that upstream failed or was skipped); the
/// surviving side's records are emitted on their own. Ordering of the
/// output is deterministic: by start time, then canonical id.
pub fn correlate(live: Option<&Batch>, schedule: Option<&Batch>) -> Correlated {
    #[derive(Default)]
    struct Bucket {
        live: Vec<usize>,
        schedule: Vec<usize>,
    }

    let live_partials = live.map(|b| b.partials.as_slice()).unwrap_or(&[]);
    let schedule_partials = schedule.map(|b| b.partials.as_slice()).unwrap_or(&[]);

    let mut groups: HashMap<GroupKey, Bucket> = HashMap::new();
    for (i, p) in live_partials.iter().enumerate() {
        groups.entry(GroupKey::of(p)).or_default().live.push(i);
    }
    for (i, p) in schedule_partials.iter().enumerate() {
        groups.entry(GroupKey::of(p)).or_default().schedule.push(i);
    }

    let mut matches = Vec::new();
    let mut report = CorrelationReport::default();

    for (key, bucket) in groups {
        if bucket.live.len() > 1 || bucket.schedule.len() > 1 {
            // Doubleheader: same teams, same day, more than one record
            // from one provider. Never merge; emit each record under its
            // provider-native identity.
            debug!(
                "Ambiguous correlation group {} ({} live, {} schedule records)",
                key.render(),
                bucket.live.len(),
                bucket.schedule.len()
            );
            report.ambiguous.push(key.render());
            for &i in &bucket.live {
                let p = &live_partials[i];
                matches.push(standalone_match(p, batch_time(live)));
            }
            for &i in &bucket.schedule {
                let p = &schedule_partials[i];
                matches.push(standalone_match(p, batch_time(schedule)));
            }
            continue;
        }

        let live_p = bucket.live.first().map(|&i| &live_partials[i]);
        let schedule_p = bucket.schedule.first().map(|&i| &schedule_partials[i]);

        match (live_p, schedule_p) {
            (Some(l), Some(s)) => {
                matches.push(merge(
                    &key,
                    l,
                    batch_time(live),
                    s,
                    batch_time(schedule),
                ));
            }
            (Some(l), None) => matches.push(single_source(&key, l, batch_time(live))),
            (None, Some(s)) => matches.push(single_source(&key, s, batch_time(schedule))),
            (None, None) => unreachable!("empty correlation bucket"),
        }
    }

    report.ambiguous.sort();
    matches.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.canonical_id.cmp(&b.canonical_id))
    });

    Correlated { matches, report }
}

fn batch_time(batch: Option<&Batch>) -> DateTime<Utc> {
    batch.map(|b| b.fetched_at).unwrap_or_else(Utc::now)
}

fn base_match(canonical_id: String, partial: &MatchPartial, fetched_at: DateTime<Utc>) -> Match {
    Match {
        canonical_id,
        external_ids: HashMap::from([(
            partial.provider.to_string(),
            partial.external_id.clone(),
        )]),
        team_a: partial.team_a.clone(),
        team_b: partial.team_b.clone(),
        status: partial.status.unwrap_or(MatchStatus::Unknown),
        venue: partial.venue.clone(),
        start_time: partial.start_time,
        series: partial.series.clone(),
        match_type: partial.match_type.clone(),
        toss: partial.toss.clone(),
        winner: partial.winner.clone(),
        innings: partial.innings.clone(),
        source_freshness: HashMap::from([(partial.provider.to_string(), fetched_at)]),
    }
}

fn standalone_match(partial: &MatchPartial, fetched_at: DateTime<Utc>) -> Match {
    base_match(standalone_id(partial), partial, fetched_at)
}

fn single_source(key: &GroupKey, partial: &MatchPartial, fetched_at: DateTime<Utc>) -> Match {
    base_match(key.canonical_id(), partial, fetched_at)
}

/// Merges one live record and one schedule record for the same group.
///
/// Live wins the in-play fields (status, innings, toss, winner); schedule
/// wins the static fields (venue, series, start time, match type); team
/// display names and logos go to whichever batch was fetched more
/// recently. Identity fields union.
fn merge(
    key: &GroupKey,
    live: &MatchPartial,
    live_at: DateTime<Utc>,
    schedule: &MatchPartial,
    schedule_at: DateTime<Utc>,
) -> Match {
    // The two providers may list the teams in opposite order; align the
    // schedule record to the live record's orientation before picking
    // display fields.
    let live_a = normalize_team(&live.team_a.name);
    let sched_a = normalize_team(&schedule.team_a.name);
    let (sched_team_a, sched_team_b) = if live_a == sched_a {
        (&schedule.team_a, &schedule.team_b)
    } else {
        (&schedule.team_b, &schedule.team_a)
    };

    let (team_a, team_b) = if live_at >= schedule_at {
        (live.team_a.clone(), live.team_b.clone())
    } else {
        (sched_team_a.clone(), sched_team_b.clone())
    };

    Match {
        canonical_id: key.canonical_id(),
        external_ids: HashMap::from([
            (live.provider.to_string(), live.external_id.clone()),
            (schedule.provider.to_string(), schedule.external_id.clone()),
        ]),
        team_a,
        team_b,
        status: live
            .status
            .or(schedule.status)
            .unwrap_or(MatchStatus::Unknown),
        venue: schedule.venue.clone().or_else(|| live.venue.clone()),
        start_time: schedule.start_time.or(live.start_time),
        series: schedule.series.clone().or_else(|| live.series.clone()),
        match_type: schedule
            .match_type
            .clone()
            .or_else(|| live.match_type.clone()),
        toss: live.toss.clone(),
        winner: live.winner.clone(),
        innings: live.innings.clone(),
        source_freshness: HashMap::from([
            (live.provider.to_string(), live_at),
            (schedule.provider.to_string(), schedule_at),
        ]),
    }
}

/// Annotates articles with `related_match_id` where the article text names
/// the teams of exactly one known match.
///
/// An article qualifies for a match when its normalized headline-plus-
/// excerpt mentions both of that match's normalized team names. Zero or
/// several qualifying matches leave the article unannotated.
pub fn link_news(articles: &mut [NewsArticle], matches: &[Match]) {
    if matches.is_empty() {
        return;
    }

    // (canonical id, normalized team pair), one entry per distinct match.
    let keys: Vec<(&str, String, String)> = matches
        .iter()
        .map(|m| {
            (
                m.canonical_id.as_str(),
                normalize_team(&m.team_a.name),
                normalize_team(&m.team_b.name),
            )
        })
        .collect();

    for article in articles.iter_mut() {
        let mut text = normalize_team(&article.headline);
        if let Some(excerpt) = &article.excerpt {
            text.push(' ');
            text.push_str(&normalize_team(excerpt));
        }
        let text = format!(" {} ", text);

        let mut candidate: Option<&str> = None;
        let mut unique = true;
        for (id, team_a, team_b) in &keys {
            if mentions(&text, team_a) && mentions(&text, team_b) {
                match candidate {
                    None => candidate = Some(id),
                    // Two distinct matches both fit: leave unlinked.
                    Some(existing) if existing != *id => {
                        unique = false;
                        break;
                    }
                    Some(_) => {}
                }
            }
        }
        if unique {
            article.related_match_id = candidate.map(str::to_string);
        }
    }
}

/// Word-boundary containment on already-normalized text. `text` must be
/// padded with a leading and trailing space.
fn mentions(text: &str, team: &str) -> bool {
    !team.is_empty() && text.contains(&format!(" {} ", team))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InningsScore, TeamRef};

    fn live_partial(id: &str, a: &str, b: &str, start: DateTime<Utc>) -> MatchPartial {
        let mut p = MatchPartial::new("CRIC_API", id, TeamRef::new(a), TeamRef::new(b));
        p.status = Some(MatchStatus::Live);
        p.start_time = Some(start);
        p.innings = vec![InningsScore {
            inning: format!("{} Inning 1", a),
            runs: 245,
            wickets: 3,
            overs: 40.3,
        }];
        p
    }

    fn schedule_partial(id: &str, a: &str, b: &str, start: DateTime<Utc>) -> MatchPartial {
        let mut p = MatchPartial::new("MSN_SCHEDULE", id, TeamRef::new(a), TeamRef::new(b));
        p.status = Some(MatchStatus::Upcoming);
        p.start_time = Some(start);
        p.venue = Some("Narendra Modi Stadium".to_string());
        p.series = Some("ICC Champions Trophy 2025".to_string());
        p.match_type = Some("ODI".to_string());
        p
    }

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_normalize_team() {
        assert_eq!(normalize_team("  India "), "india");
        assert_eq!(normalize_team("IND"), "india");
        assert_eq!(normalize_team("New-Zealand"), "new zealand");
        assert_eq!(normalize_team("St. Kitts & Nevis Patriots"), "st kitts nevis patriots");
    }

    #[test]
    fn test_group_key_is_order_insensitive() {
        let start = ts("2025-03-22T03:00:00Z");
        let a = MatchPartial {
            start_time: Some(start),
            ..MatchPartial::new("CRIC_API", "1", TeamRef::new("India"), TeamRef::new("Australia"))
        };
        let b = MatchPartial {
            start_time: Some(start),
            ..MatchPartial::new("MSN_SCHEDULE", "2", TeamRef::new("australia"), TeamRef::new("india"))
        };
        assert_eq!(GroupKey::of(&a), GroupKey::of(&b));
    }

    #[test]
    fn test_correlation_merges_to_one_match() {
        let start = ts("2025-03-22T03:00:00Z");
        let live = Batch::new(
            vec![live_partial("cric-77", "India", "Australia", start)],
            ts("2025-03-22T05:00:00Z"),
        );
        let schedule = Batch::new(
            vec![schedule_partial("msn-9", "india", "australia", start)],
            ts("2025-03-22T04:00:00Z"),
        );

        let out = correlate(Some(&live), Some(&schedule));
        assert_eq!(out.matches.len(), 1);
        assert!(out.report.ambiguous.is_empty());

        let m = &out.matches[0];
        assert_eq!(m.external_ids.len(), 2);
        assert_eq!(m.external_ids["CRIC_API"], "cric-77");
        assert_eq!(m.external_ids["MSN_SCHEDULE"], "msn-9");
        // Live wins in-play fields, schedule wins static fields.
        assert_eq!(m.status, MatchStatus::Live);
        assert_eq!(m.innings.len(), 1);
        assert_eq!(m.venue.as_deref(), Some("Narendra Modi Stadium"));
        assert_eq!(m.series.as_deref(), Some("ICC Champions Trophy 2025"));
        assert_eq!(m.match_type.as_deref(), Some("ODI"));
        // Live batch is fresher, so its display names win.
        assert_eq!(m.team_a.name, "India");
        assert_eq!(m.source_freshness.len(), 2);
    }

    #[test]
    fn test_correlation_is_deterministic() {
        let start = ts("2025-03-22T03:00:00Z");
        let live = Batch::new(
            vec![live_partial("cric-77", "India", "Australia", start)],
            ts("2025-03-22T05:00:00Z"),
        );
        let schedule = Batch::new(
            vec![schedule_partial("msn-9", "australia", "india", start)],
            ts("2025-03-22T04:00:00Z"),
        );

        let first = correlate(Some(&live), Some(&schedule));
        let second = correlate(Some(&live), Some(&schedule));
        assert_eq!(
            first.matches[0].canonical_id,
            second.matches[0].canonical_id
        );
    }

    #[test]
    fn test_doubleheader_never_merges() {
        // Two live records for the same team pair on the same day (an IPL
        // doubleheader) plus one schedule record: nothing may merge.
        let d1 = ts("2025-04-05T10:00:00Z");
        let d2 = ts("2025-04-05T14:00:00Z");
        let live = Batch::new(
            vec![
                live_partial("cric-1", "Mumbai Indians", "Chennai Super Kings", d1),
                live_partial("cric-2", "Mumbai Indians", "Chennai Super Kings", d2),
            ],
            ts("2025-04-05T11:00:00Z"),
        );
        let schedule = Batch::new(
            vec![schedule_partial("msn-1", "MI", "CSK", d1)],
            ts("2025-04-05T09:00:00Z"),
        );

        let out = correlate(Some(&live), Some(&schedule));
        // All three records share one group (same normalized pair, same
        // UTC date); the duplicate live side poisons the whole group.
        assert_eq!(out.matches.len(), 3);
        assert_eq!(out.report.ambiguous.len(), 1);
        for m in &out.matches {
            assert_eq!(m.external_ids.len(), 1);
        }
    }

    #[test]
    fn test_standalone_ids_are_stable() {
        let d = ts("2025-04-05T10:00:00Z");
        let p = live_partial("cric-1", "Mumbai Indians", "Chennai Super Kings", d);
        assert_eq!(standalone_id(&p), standalone_id(&p.clone()));
    }

    #[test]
    fn test_live_only_view() {
        let start = ts("2025-03-22T03:00:00Z");
        let live = Batch::new(
            vec![live_partial("cric-77", "India", "Australia", start)],
            ts("2025-03-22T05:00:00Z"),
        );
        let out = correlate(Some(&live), None);
        assert_eq!(out.matches.len(), 1);
        assert_eq!(out.matches[0].status, MatchStatus::Live);
    }

    #[test]
    fn test_schedule_only_records_without_state_are_unknown() {
        let start = ts("2025-03-22T03:00:00Z");
        let mut p = schedule_partial("msn-9", "India", "Australia", start);
        p.status = None;
        let schedule = Batch::new(vec![p], ts("2025-03-22T04:00:00Z"));

        let out = correlate(None, Some(&schedule));
        assert_eq!(out.matches.len(), 1);
        assert_eq!(out.matches[0].status, MatchStatus::Unknown);
    }

    #[test]
    fn test_link_news_exactly_one_candidate() {
        let start = ts("2025-03-22T03:00:00Z");
        let live = Batch::new(
            vec![
                live_partial("cric-77", "India", "Australia", start),
                live_partial("cric-78", "England", "Pakistan", start),
            ],
            ts("2025-03-22T05:00:00Z"),
        );
        let out = correlate(Some(&live), None);

        let mut articles = vec![
            article("n1", "India edge Australia in a last-over thriller"),
            article("n2", "Ticket sales open for the final"),
        ];
        link_news(&mut articles, &out.matches);

        let india_match = out
            .matches
            .iter()
            .find(|m| m.team_a.name == "India")
            .unwrap();
        assert_eq!(
            articles[0].related_match_id.as_deref(),
            Some(india_match.canonical_id.as_str())
        );
        assert!(articles[1].related_match_id.is_none());
    }

    #[test]
    fn test_link_news_skips_ambiguous_mentions() {
        let d1 = ts("2025-04-05T10:00:00Z");
        let d2 = ts("2025-04-06T10:00:00Z");
        let live = Batch::new(
            vec![
                live_partial("cric-1", "India", "Australia", d1),
                live_partial("cric-2", "India", "Australia", d2),
            ],
            ts("2025-04-06T11:00:00Z"),
        );
        let out = correlate(Some(&live), None);
        assert_eq!(out.matches.len(), 2);

        let mut articles = vec![article("n1", "India and Australia meet again")];
        link_news(&mut articles, &out.matches);
        assert!(articles[0].related_match_id.is_none());
    }

    fn article(id: &str, headline: &str) -> NewsArticle {
        NewsArticle {
            id: id.to_string(),
            headline: headline.to_string(),
            excerpt: None,
            image_url: None,
            published_at: None,
            author: None,
            source_url: format!("https://cricket.one/news/{}", id),
            topic: None,
            related_match_id: None,
        }
    }
}
