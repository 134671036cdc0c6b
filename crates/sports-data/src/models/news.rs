use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized news article from the news upstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// The upstream's article identifier.
    pub id: String,

    pub headline: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Publish time, normalized to UTC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Absolute link to the article on the source site.
    pub source_url: String,

    /// Topic label the upstream groups this article under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    /// Canonical id of the match this article is about. Set only when the
    /// correlation engine finds exactly one confident team-name match;
    /// under-linking is preferred over mis-linking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_match_id: Option<String>,
}
