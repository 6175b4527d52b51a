use tracing::{debug, info};

use super::{CommentRecord, PlatformError, ThreadQuery, VideoId, VideoPlatform};
use crate::error::{AnalyzerError, Result};

/// Largest page the commentThreads listing will return.
pub const PAGE_SIZE_LIMIT: usize = 100;
pub const DEFAULT_MAX_COMMENTS: usize = 500;

/// Collect up to `max_comments` top-level comments in relevance order.
///
/// Issues at most `ceil(max_comments / 100)` page requests; any upstream error
/// fails the whole collection.
pub fn collect_comments(
    platform: &dyn VideoPlatform,
    video_id: &VideoId,
    max_comments: usize,
) -> Result<Vec<CommentRecord>> {
    collect(platform, video_id, max_comments, false)
}

/// Like [`collect_comments`], but each top-level comment is followed by the
/// replies returned inline with its thread. Replies count against the same cap.
pub fn collect_with_replies(
    platform: &dyn VideoPlatform,
    video_id: &VideoId,
    max_comments: usize,
) -> Result<Vec<CommentRecord>> {
    collect(platform, video_id, max_comments, true)
}

fn collect(
    platform: &dyn VideoPlatform,
    video_id: &VideoId,
    max_comments: usize,
    include_replies: bool,
) -> Result<Vec<CommentRecord>> {
    let max_requests = max_comments.div_ceil(PAGE_SIZE_LIMIT);
    let mut comments: Vec<CommentRecord> = Vec::new();
    let mut page_token: Option<String> = None;
    let mut requests = 0usize;

    while requests < max_requests && comments.len() < max_comments {
        let query = ThreadQuery {
            video_id,
            max_results: (max_comments - comments.len()).min(PAGE_SIZE_LIMIT),
            page_token: page_token.as_deref(),
            include_replies,
        };
        let page = platform
            .comment_threads(&query)
            .map_err(listing_error)?;
        requests += 1;

        debug!(
            page = requests,
            threads = page.threads.len(),
            more = page.next_page_token.is_some(),
            "comment page received"
        );

        'threads: for thread in page.threads {
            if comments.len() >= max_comments {
                break;
            }
            if !include_replies {
                comments.push(thread.top_level);
                continue;
            }

            comments.push(thread.top_level.tagged(false));
            for reply in thread.replies {
                if comments.len() >= max_comments {
                    break 'threads;
                }
                comments.push(reply.tagged(true));
            }
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    info!(
        video_id = %video_id,
        collected = comments.len(),
        requests,
        "comment collection finished"
    );
    Ok(comments)
}

fn listing_error(err: PlatformError) -> AnalyzerError {
    if err.indicates_comments_disabled() {
        return AnalyzerError::CommentsDisabled;
    }
    match err {
        PlatformError::NotFound(msg) => AnalyzerError::NotFound(msg),
        other => AnalyzerError::UpstreamFailure(format!("Failed to fetch comments: {other}")),
    }
}
