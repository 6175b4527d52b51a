use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{
    CommentRecord, CommentThread, PlatformError, ThreadPage, ThreadQuery, VideoId, VideoInfo,
    VideoPlatform,
};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube Data API v3 client, keyed by an API key.
pub struct YouTubeClient {
    api_key: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl YouTubeClient {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(api_key: String, base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build YouTube HTTP client")?;
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key,
            base_url,
            client,
        })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<T, PlatformError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "GET");

        // The key goes in as a query pair so it never shows up in `url`.
        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .map_err(|e| PlatformError::Transport(format!("Failed to GET {url}: {}", e.without_url())))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(api_error(status.as_u16(), &text));
        }

        resp.json().map_err(|e| {
            PlatformError::Decode(format!("Failed to parse YouTube response: {}", e.without_url()))
        })
    }
}

impl VideoPlatform for YouTubeClient {
    fn video_info(&self, video_id: &VideoId) -> std::result::Result<VideoInfo, PlatformError> {
        let list: ListResponse<RawVideo> = self.get_json(
            "/videos",
            &[("part", "snippet,statistics"), ("id", video_id.as_str())],
        )?;

        let video = list
            .items
            .into_iter()
            .next()
            .ok_or_else(|| PlatformError::NotFound("Video not found".to_string()))?;

        video.into_video_info()
    }

    fn comment_threads(
        &self,
        query: &ThreadQuery<'_>,
    ) -> std::result::Result<ThreadPage, PlatformError> {
        let part = if query.include_replies {
            "snippet,replies"
        } else {
            "snippet"
        };
        let max_results = query.max_results.to_string();

        let mut params = vec![
            ("part", part),
            ("videoId", query.video_id.as_str()),
            ("maxResults", max_results.as_str()),
            ("order", "relevance"),
            ("textFormat", "html"),
        ];
        if let Some(token) = query.page_token {
            params.push(("pageToken", token));
        }

        let list: ListResponse<RawThread> = self.get_json("/commentThreads", &params)?;

        Ok(ThreadPage {
            threads: list.items.into_iter().map(RawThread::into_thread).collect(),
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

/// Classify a non-2xx response body: `{"error": {"code", "message", "errors": [{"reason"}]}}`.
pub(crate) fn api_error(status: u16, body: &str) -> PlatformError {
    let envelope: Option<ErrorEnvelope> = serde_json::from_str(body).ok();

    let (reason, message) = match envelope {
        Some(env) => (
            env.error.errors.into_iter().find_map(|d| d.reason),
            env.error.message,
        ),
        None => (None, body.trim().to_string()),
    };

    match reason.as_deref() {
        Some("commentsDisabled") => PlatformError::CommentsDisabled,
        Some("videoNotFound") => PlatformError::NotFound(message),
        _ => PlatformError::Api {
            status,
            reason,
            message,
        },
    }
}

fn parse_count(field: &str, raw: Option<&str>) -> std::result::Result<u64, PlatformError> {
    match raw {
        // Hidden statistics are simply absent.
        None => Ok(0),
        Some(s) => s
            .trim()
            .parse()
            .map_err(|_| PlatformError::Decode(format!("Invalid {field} value: {s:?}"))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawVideo {
    snippet: RawVideoSnippet,
    #[serde(default)]
    statistics: RawStatistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVideoSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    published_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

impl RawVideo {
    fn into_video_info(self) -> std::result::Result<VideoInfo, PlatformError> {
        let stats = &self.statistics;
        Ok(VideoInfo {
            view_count: parse_count("viewCount", stats.view_count.as_deref())?,
            like_count: parse_count("likeCount", stats.like_count.as_deref())?,
            comment_count: parse_count("commentCount", stats.comment_count.as_deref())?,
            title: self.snippet.title,
            channel_title: self.snippet.channel_title,
            published_at: self.snippet.published_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawThread {
    snippet: RawThreadSnippet,
    replies: Option<RawReplies>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawThreadSnippet {
    top_level_comment: RawComment,
}

#[derive(Debug, Deserialize)]
struct RawReplies {
    #[serde(default)]
    comments: Vec<RawComment>,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    snippet: RawCommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCommentSnippet {
    #[serde(default)]
    text_display: String,
    #[serde(default)]
    author_display_name: String,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    published_at: String,
    updated_at: Option<String>,
}

impl RawComment {
    fn into_record(self) -> CommentRecord {
        let s = self.snippet;
        CommentRecord {
            text: s.text_display,
            author: s.author_display_name,
            like_count: s.like_count,
            published_at: s.published_at,
            updated_at: s.updated_at,
            is_reply: None,
        }
    }
}

impl RawThread {
    fn into_thread(self) -> CommentThread {
        CommentThread {
            top_level: self.snippet.top_level_comment.into_record(),
            replies: self
                .replies
                .map(|r| r.comments.into_iter().map(RawComment::into_record).collect())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}
