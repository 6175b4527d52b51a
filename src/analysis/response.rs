use serde::de::DeserializeOwned;

use crate::error::{AnalyzerError, Result};

/// Strip a markdown code fence the model may have wrapped its JSON in.
///
/// Handles a leading "```json" or bare "```" marker and a trailing "```".
/// Text without a fence is returned trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let body = match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.trim_start_matches([' ', '\t']);
            if rest.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
                &rest[4..]
            } else {
                rest
            }
        }
        None => trimmed,
    };

    let body = body.trim();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse model output as `T` after fence-stripping. No retry, no salvage.
pub fn parse_model_json<T: DeserializeOwned>(text: &str, what: &'static str) -> Result<T> {
    serde_json::from_str(strip_code_fences(text))
        .map_err(|source| AnalyzerError::AnalysisParseFailure { what, source })
}
