//! The external post feed: windowed search requests and timestamp parsing.
//!
//! [`PostFeed`] is the seam between the collector and the network. The
//! production implementation is [`SearchClient`], a blocking `reqwest` client
//! for the xAI live-search endpoint; tests substitute scripted feeds.

use chrono::NaiveDateTime;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::{ApiKey, XEntropyConfig};
use crate::error::{FetchError, Result, XEntropyError};

/// Width of every search window in seconds.
pub const WINDOW_SECS: i64 = 60;

/// Layout of `created_at`, e.g. `2025-03-14T15:09:26.535897Z`.
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// `%.f` also accepts a missing fraction and nanoseconds; the feed sends
/// microseconds at most.
const MAX_FRACTION_DIGITS: usize = 6;

/// Inclusive `[start, end]` range of Unix seconds to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    #[serde(rename = "from")]
    pub start: i64,
    #[serde(rename = "to")]
    pub end: i64,
}

impl TimeWindow {
    /// The minute ending at `end`.
    pub fn ending_at(end: i64) -> Self {
        Self {
            start: end - WINDOW_SECS,
            end,
        }
    }
}

/// One search result. Only the creation time matters here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    pub created_at: Option<String>,
}

impl Post {
    pub fn created_at(ts: impl Into<String>) -> Self {
        Self {
            created_at: Some(ts.into()),
        }
    }

    /// Entropy word for this post, if its timestamp parses.
    pub fn entropy(&self) -> Option<u32> {
        self.created_at.as_deref().and_then(timestamp_entropy)
    }
}

/// Source of recent posts for a time window.
pub trait PostFeed: Send + Sync {
    fn fetch(&self, window: TimeWindow) -> std::result::Result<Vec<Post>, FetchError>;
}

/// Lower 32 bits of `created_at` expressed in nanoseconds since the epoch.
///
/// Returns `None` for anything that is not `YYYY-MM-DDTHH:MM:SS.ffffffZ` or
/// that falls outside the range representable in `i64` nanoseconds.
pub fn timestamp_entropy(created_at: &str) -> Option<u32> {
    if !has_subsecond_fraction(created_at) {
        return None;
    }
    let parsed = NaiveDateTime::parse_from_str(created_at, CREATED_AT_FORMAT).ok()?;
    let nanos = parsed.and_utc().timestamp_nanos_opt()?;
    Some(nanos as u32)
}

/// True when the text before the trailing `Z` ends in `.` plus 1 to 6 digits.
fn has_subsecond_fraction(created_at: &str) -> bool {
    let Some((_, fraction)) = created_at
        .strip_suffix('Z')
        .and_then(|rest| rest.rsplit_once('.'))
    else {
        return false;
    };
    (1..=MAX_FRACTION_DIGITS).contains(&fraction.len())
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_parameters: SearchParameters<'a>,
}

#[derive(Serialize)]
struct SearchParameters<'a> {
    domain_list: &'a [String],
    date_range: TimeWindow,
    max_results: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<serde_json::Value>>,
}

/// Blocking client for the live-search endpoint.
#[derive(Debug)]
pub struct SearchClient {
    http: Client,
    endpoint: String,
    api_key: ApiKey,
    query: String,
    domains: Vec<String>,
    max_results: u32,
}

impl SearchClient {
    pub fn new(config: &XEntropyConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| XEntropyError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            query: config.query.clone(),
            domains: config.domains.clone(),
            max_results: config.max_results,
        })
    }

    fn request_body(&self, window: TimeWindow) -> SearchRequest<'_> {
        SearchRequest {
            query: &self.query,
            search_parameters: SearchParameters {
                domain_list: &self.domains,
                date_range: window,
                max_results: self.max_results,
            },
        }
    }
}

impl PostFeed for SearchClient {
    fn fetch(&self, window: TimeWindow) -> std::result::Result<Vec<Post>, FetchError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&self.request_body(window))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_posts(&body)
    }
}

/// Decode a search response body into posts.
///
/// A missing or null `results` key means no posts. Elements that are not objects, or
/// whose `created_at` is absent or not a string, become posts without a
/// timestamp so the collector can skip them.
pub fn parse_posts(body: &str) -> std::result::Result<Vec<Post>, FetchError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .unwrap_or_default()
        .iter()
        .map(|item| Post {
            created_at: item
                .get("created_at")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned),
        })
        .collect())
}
