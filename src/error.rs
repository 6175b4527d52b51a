use thiserror::Error;

/// Message returned when a video yields no comments at all.
pub const NO_COMMENTS_MESSAGE: &str =
    "No comments found for this video. Comments may be disabled or the video may have no comments.";

/// Every way an analysis request can fail.
///
/// The display text is what callers get to see; full detail goes to the log.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Missing or malformed request input (URL, body).
    #[error("{0}")]
    InvalidInput(String),

    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("{}", NO_COMMENTS_MESSAGE)]
    NoComments,

    #[error("Comments are disabled for this video")]
    CommentsDisabled,

    /// A video-platform or language-model call failed. The message already
    /// names the step and carries the upstream text.
    #[error("{0}")]
    UpstreamFailure(String),

    /// The model answered, but not with the JSON document we asked for.
    #[error("Failed to parse {what}: {source}")]
    AnalysisParseFailure {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("An error occurred during analysis")]
    Unexpected(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<anyhow::Error> for AnalyzerError {
    fn from(err: anyhow::Error) -> Self {
        AnalyzerError::Unexpected(err.into())
    }
}

impl AnalyzerError {
    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            AnalyzerError::InvalidInput(_)
            | AnalyzerError::NotFound(_)
            | AnalyzerError::NoComments
            | AnalyzerError::CommentsDisabled => 400,
            AnalyzerError::UpstreamFailure(_)
            | AnalyzerError::AnalysisParseFailure { .. }
            | AnalyzerError::Unexpected(_) => 500,
        }
    }

    /// Client errors are rejected before the pipeline produces anything;
    /// everything else failed mid-pipeline.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_and_lookup_errors_map_to_400() {
        assert_eq!(AnalyzerError::InvalidInput("Invalid YouTube URL".into()).status_code(), 400);
        assert_eq!(AnalyzerError::NotFound("abc".into()).status_code(), 400);
        assert_eq!(AnalyzerError::NoComments.status_code(), 400);
        assert_eq!(AnalyzerError::CommentsDisabled.status_code(), 400);
    }

    #[test]
    fn pipeline_errors_map_to_500() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AnalyzerError::AnalysisParseFailure {
            what: "analysis results",
            source: parse,
        };
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().starts_with("Failed to parse analysis results"));
        assert_eq!(AnalyzerError::UpstreamFailure("x".into()).status_code(), 500);
    }

    #[test]
    fn unexpected_hides_detail() {
        let err = AnalyzerError::from(anyhow::anyhow!("socket closed at 0xdeadbeef"));
        assert_eq!(err.to_string(), "An error occurred during analysis");
        assert!(!err.is_client_error());
    }

    #[test]
    fn no_comments_message_is_stable() {
        assert!(AnalyzerError::NoComments.to_string().starts_with("No comments found"));
    }
}
