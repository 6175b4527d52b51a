pub mod client;
pub mod collector;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

use crate::error::{AnalyzerError, Result};

pub use client::YouTubeClient;
pub use collector::{collect_comments, collect_with_replies, DEFAULT_MAX_COMMENTS, PAGE_SIZE_LIMIT};

// watch?v=, youtu.be/, /embed/, /v/, /e/ and /<user>/<x>/ shapes.
static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#,
    )
    .expect("video id pattern compiles")
});

/// An 11-character YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Pull the video identifier out of any supported YouTube URL shape.
    /// Returns `None` for anything that doesn't match.
    pub fn from_url(url: &str) -> Option<Self> {
        VIDEO_ID_RE
            .captures(url)
            .and_then(|cap| cap.get(1))
            .map(|m| VideoId(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snippet and statistics of a single video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub title: String,
    pub channel_title: String,
    pub published_at: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

/// One comment, top-level or reply, as returned by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub text: String,
    pub author: String,
    pub like_count: u64,
    pub published_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_reply: Option<bool>,
}

impl CommentRecord {
    fn tagged(mut self, is_reply: bool) -> Self {
        self.is_reply = Some(is_reply);
        self
    }
}

/// A top-level comment with whatever replies the listing returned inline.
#[derive(Debug, Clone)]
pub struct CommentThread {
    pub top_level: CommentRecord,
    pub replies: Vec<CommentRecord>,
}

/// Parameters for one commentThreads page request.
#[derive(Debug, Clone)]
pub struct ThreadQuery<'a> {
    pub video_id: &'a VideoId,
    pub max_results: usize,
    pub page_token: Option<&'a str>,
    pub include_replies: bool,
}

/// One page of comment threads, in relevance order.
#[derive(Debug, Clone, Default)]
pub struct ThreadPage {
    pub threads: Vec<CommentThread>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("{0}")]
    NotFound(String),

    #[error("Comments are disabled for this video")]
    CommentsDisabled,

    #[error("YouTube API returned {status}: {message}")]
    Api {
        status: u16,
        reason: Option<String>,
        message: String,
    },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Decode(String),
}

impl PlatformError {
    /// Typed reason first; the "disabled" substring is only a fallback for
    /// error bodies that carry no reason code.
    pub fn indicates_comments_disabled(&self) -> bool {
        match self {
            PlatformError::CommentsDisabled => true,
            PlatformError::Api {
                reason: Some(reason),
                ..
            } => reason == "commentsDisabled",
            other => other.to_string().contains("disabled"),
        }
    }
}

/// Video-info lookup and paginated comment listing.
///
/// Implementations are shared across concurrent analyses and must not keep
/// per-request state.
pub trait VideoPlatform: Send + Sync {
    fn video_info(&self, video_id: &VideoId) -> std::result::Result<VideoInfo, PlatformError>;

    fn comment_threads(
        &self,
        query: &ThreadQuery<'_>,
    ) -> std::result::Result<ThreadPage, PlatformError>;
}

/// Look up a video, folding platform errors into the analyzer taxonomy.
pub fn fetch_video_info(platform: &dyn VideoPlatform, video_id: &VideoId) -> Result<VideoInfo> {
    platform.video_info(video_id).map_err(|e| match e {
        PlatformError::NotFound(_) => AnalyzerError::NotFound(video_id.to_string()),
        other => AnalyzerError::UpstreamFailure(format!("Failed to get video info: {other}")),
    })
}
