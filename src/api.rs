use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, warn};

use crate::analysis::{format_for_display, AnalysisSettings, ChatCompletion, DisplayDocument, InsightPipeline};
use crate::error::{AnalyzerError, Result};
use crate::youtube::{
    collect_comments, collect_with_replies, fetch_video_info, VideoId, VideoInfo, VideoPlatform,
    DEFAULT_MAX_COMMENTS,
};

/// Where a single analysis is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collecting,
    Extracting,
    GeneratingIdeas,
    Formatting,
    Done,
    Failed,
}

impl Stage {
    /// Strictly forward, one step at a time; any live stage may fail.
    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Collecting, Extracting)
                | (Extracting, GeneratingIdeas)
                | (GeneratingIdeas, Formatting)
                | (Formatting, Done)
                | (Collecting | Extracting | GeneratingIdeas | Formatting, Failed)
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            Stage::Collecting => "collecting",
            Stage::Extracting => "extracting",
            Stage::GeneratingIdeas => "generating_ideas",
            Stage::Formatting => "formatting",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug_assert!(stage.can_advance_to(next), "{stage:?} -> {next:?}");
    info!(from = stage.as_str(), to = next.as_str(), "stage");
    *stage = next;
}

#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    pub max_comments: usize,
    pub with_replies: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            max_comments: DEFAULT_MAX_COMMENTS,
            with_replies: false,
        }
    }
}

/// Everything a successful analysis returns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub video_info: VideoInfo,
    pub analysis: DisplayDocument,
}

/// Runs analyses against shared upstream clients. Holds no per-request state.
pub struct Analyzer<'a> {
    platform: &'a dyn VideoPlatform,
    llm: &'a dyn ChatCompletion,
    settings: AnalysisSettings,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        platform: &'a dyn VideoPlatform,
        llm: &'a dyn ChatCompletion,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            platform,
            llm,
            settings,
        }
    }

    /// Validate the URL, then analyze the video it points at.
    pub fn analyze_url(&self, url: &str, opts: AnalyzeOptions) -> Result<AnalysisReport> {
        if url.trim().is_empty() {
            warn!("rejecting analyze request without a URL");
            return Err(AnalyzerError::InvalidInput("YouTube URL is required".to_string()));
        }
        let Some(video_id) = VideoId::from_url(url) else {
            warn!(%url, "rejecting analyze request with an unrecognized URL");
            return Err(AnalyzerError::InvalidInput("Invalid YouTube URL".to_string()));
        };
        self.analyze(&video_id, opts)
    }

    pub fn analyze(&self, video_id: &VideoId, opts: AnalyzeOptions) -> Result<AnalysisReport> {
        let request_id = uuid::Uuid::new_v4();
        let span = info_span!("analysis", %request_id, video_id = %video_id);
        let _guard = span.enter();

        let mut stage = Stage::Collecting;
        let result = self.run(video_id, opts, &mut stage);

        match &result {
            Ok(_) => advance(&mut stage, Stage::Done),
            Err(e) => {
                error!(stage = stage.as_str(), error = %e, detail = ?e, "analysis failed");
                advance(&mut stage, Stage::Failed);
            }
        }
        result
    }

    fn run(
        &self,
        video_id: &VideoId,
        opts: AnalyzeOptions,
        stage: &mut Stage,
    ) -> Result<AnalysisReport> {
        info!(max_comments = opts.max_comments, with_replies = opts.with_replies, "starting analysis");

        let video_info = fetch_video_info(self.platform, video_id)?;
        info!(title = %video_info.title, "video info retrieved");

        let comments = if opts.with_replies {
            collect_with_replies(self.platform, video_id, opts.max_comments)?
        } else {
            collect_comments(self.platform, video_id, opts.max_comments)?
        };
        if comments.is_empty() {
            return Err(AnalyzerError::NoComments);
        }

        let pipeline = InsightPipeline::new(self.llm, self.settings.clone());

        advance(stage, Stage::Extracting);
        let insights = pipeline.extract(&comments, &video_info.title)?;

        advance(stage, Stage::GeneratingIdeas);
        let ideas = pipeline.generate_ideas(&insights)?;

        advance(stage, Stage::Formatting);
        let analysis = format_for_display(&insights, &ideas);

        Ok(AnalysisReport {
            video_info,
            analysis,
        })
    }
}

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub max_comments: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub report: AnalysisReport,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl From<&AnalyzerError> for ErrorResponse {
    fn from(err: &AnalyzerError) -> Self {
        ErrorResponse {
            error: err.to_string(),
            // Rejections carry only the message; mid-pipeline failures also say success: false.
            success: if err.is_client_error() { None } else { Some(false) },
        }
    }
}

/// Status code plus JSON body, ready for any transport.
#[derive(Debug, Clone, Serialize)]
pub struct ApiReply {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiReply {
    fn json<T: Serialize>(status: u16, body: &T) -> Self {
        let body = serde_json::to_value(body).unwrap_or_else(|e| {
            error!(error = %e, "failed to serialize response body");
            serde_json::json!({ "error": "An error occurred during analysis", "success": false })
        });
        ApiReply { status, body }
    }

    fn from_error(err: &AnalyzerError) -> Self {
        Self::json(err.status_code(), &ErrorResponse::from(err))
    }
}

/// Handle a raw `POST /api/analyze` body, producing the status code and JSON
/// body a transport layer should send back.
pub fn handle_analyze(analyzer: &Analyzer<'_>, body: &str, default_max_comments: usize) -> ApiReply {
    let request: AnalyzeRequest = if body.trim().is_empty() {
        AnalyzeRequest::default()
    } else {
        match serde_json::from_str(body) {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "rejecting malformed request body");
                return ApiReply::from_error(&AnalyzerError::InvalidInput("Invalid JSON body".to_string()));
            }
        }
    };

    let opts = AnalyzeOptions {
        max_comments: request.max_comments.unwrap_or(default_max_comments),
        with_replies: false,
    };

    let url = request.url.unwrap_or_default();
    match analyzer.analyze_url(&url, opts) {
        Ok(report) => ApiReply::json(200, &AnalyzeResponse { report, success: true }),
        Err(e) => ApiReply::from_error(&e),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    #[serde(rename = "videoAPI")]
    pub video_api: bool,
    #[serde(rename = "analysisAPI")]
    pub analysis_api: bool,
}

/// Body of `GET /api/health`. Reports configuration only; nothing is dialed.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub services: ServiceStatus,
}

/// `GET /api/health`: reports configured credentials, never probes upstream.
pub fn health(video_api: bool, analysis_api: bool) -> HealthReport {
    HealthReport {
        status: "healthy",
        timestamp: Utc::now(),
        services: ServiceStatus {
            video_api,
            analysis_api,
        },
    }
}
