//! Cricket news provider implementation.
//!
//! Fetches topic-grouped articles from the news upstream. The envelope is
//! `topics[].articles[]`; the topic title is carried onto each article as
//! its label, and relative article links are made absolute against the
//! source site.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::FetchError;
use crate::models::NewsArticle;
use crate::provider::NewsSource;

pub(crate) const PROVIDER_ID: &str = "CRICKET_NEWS";

/// The news upstream links articles relative to its own site.
const ARTICLE_SITE: &str = "https://cricket.one";

#[derive(Debug, Deserialize)]
struct TopicsResponse {
    /// Absent on malformed or error responses - treated as a parse failure.
    topics: Option<Vec<Topic>>,
}

#[derive(Debug, Deserialize)]
struct Topic {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    id: serde_json::Value,
    #[serde(default)]
    header: String,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    cover_image_url: Option<String>,
    #[serde(default)]
    publ_date: Option<String>,
    #[serde(default)]
    assigned_by_name: Option<String>,
    #[serde(rename = "newsUrl", default)]
    news_url: Option<String>,
}

/// Cricket news provider.
pub struct CricketNewsProvider {
    client: Client,
    base_url: String,
}

impl CricketNewsProvider {
    /// Create a new news provider. This upstream needs no API key.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Parse the upstream's publish stamps, which drift between RFC 3339
    /// and naive UTC forms.
    fn parse_publ_date(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Utc.from_local_datetime(&dt).single();
            }
        }
        None
    }

    /// Absolute article link; relative paths are joined onto the site root.
    fn absolute_url(news_url: Option<&str>) -> String {
        match news_url {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.to_string()
            }
            Some(path) if path.starts_with('/') => format!("{}{}", ARTICLE_SITE, path),
            Some(path) => format!("{}/{}", ARTICLE_SITE, path),
            None => ARTICLE_SITE.to_string(),
        }
    }

    fn to_article(topic: Option<&str>, raw: RawArticle) -> NewsArticle {
        // Article ids arrive as numbers or strings depending on endpoint
        let id = match &raw.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        NewsArticle {
            id,
            headline: raw.header.trim().to_string(),
            excerpt: raw.excerpt.filter(|e| !e.trim().is_empty()),
            image_url: raw.cover_image_url.filter(|u| !u.is_empty()),
            published_at: raw.publ_date.as_deref().and_then(Self::parse_publ_date),
            author: raw.assigned_by_name.filter(|a| !a.trim().is_empty()),
            source_url: Self::absolute_url(raw.news_url.as_deref()),
            topic: topic.map(|t| t.to_string()),
            related_match_id: None,
        }
    }
}

#[async_trait]
impl NewsSource for CricketNewsProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_articles(&self, limit: u32) -> Result<Vec<NewsArticle>, FetchError> {
        let limit_str = limit.to_string();
        let url = reqwest::Url::parse_with_params(
            &format!("{}/articlesOC/topics", self.base_url),
            &[("page", "1"), ("limit", limit_str.as_str())],
        )
        .map_err(|e| FetchError::ProviderUnavailable {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to build URL: {}", e),
        })?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_transport(PROVIDER_ID, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(PROVIDER_ID, status));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::from_transport(PROVIDER_ID, &e))?;

        let parsed: TopicsResponse =
            serde_json::from_str(&text).map_err(|e| FetchError::ParseError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse topics response: {}", e),
            })?;

        let topics = parsed.topics.ok_or_else(|| FetchError::ParseError {
            provider: PROVIDER_ID.to_string(),
            message: "topics response missing topics array".to_string(),
        })?;

        let articles: Vec<NewsArticle> = topics
            .into_iter()
            .flat_map(|topic| {
                let label = topic.title;
                topic
                    .articles
                    .into_iter()
                    .map(move |raw| Self::to_article(label.as_deref(), raw))
            })
            .take(limit as usize)
            .collect();

        debug!("Cricket news: fetched {} articles", articles.len());
        Ok(articles)
    }
}
