use tracing::{debug, info, warn};

use super::llm::{ChatCompletion, ChatRequest};
use super::models::{
    AnalysisMetadata, DisplayDocument, IdeaDocument, InsightDocument, InsightFindings, Insights,
    Overview,
};
use super::prompts;
use super::response::parse_model_json;
use super::AnalysisSettings;
use crate::error::{AnalyzerError, Result};
use crate::youtube::CommentRecord;

/// The two language-model stages: insight extraction, then idea generation.
pub struct InsightPipeline<'a> {
    llm: &'a dyn ChatCompletion,
    settings: AnalysisSettings,
}

impl<'a> InsightPipeline<'a> {
    pub fn new(llm: &'a dyn ChatCompletion, settings: AnalysisSettings) -> Self {
        Self { llm, settings }
    }

    /// Stage A: analyze the first 200 comments and stamp the result with metadata.
    pub fn extract(&self, comments: &[CommentRecord], video_title: &str) -> Result<InsightDocument> {
        if comments.is_empty() {
            return Err(AnalyzerError::NoComments);
        }

        let corpus = prompts::build_corpus(comments);
        debug!(
            analyzed = corpus.analyzed,
            corpus_chars = corpus.text.len(),
            "built analysis corpus"
        );

        let request = ChatRequest {
            model: self.settings.extraction_model.clone(),
            system: prompts::INSIGHT_SYSTEM.to_string(),
            user: prompts::insight_prompt(video_title, &corpus),
            temperature: self.settings.extraction_temperature,
            max_tokens: self.settings.extraction_max_tokens,
        };

        let text = self.llm.complete(&request).map_err(|e| {
            warn!(error = %e, "insight extraction call failed");
            AnalyzerError::UpstreamFailure(format!("Analysis failed: {e}"))
        })?;

        let mut findings: InsightFindings = parse_model_json(&text, "analysis results")?;
        findings.extra.remove("metadata");

        info!(
            questions = findings.frequent_questions.len(),
            pain_points = findings.pain_points.len(),
            themes = findings.themes.len(),
            "insights extracted"
        );

        Ok(InsightDocument {
            findings,
            metadata: AnalysisMetadata {
                total_comments: comments.len(),
                analyzed_comments: corpus.analyzed,
                video_title: video_title.to_string(),
                analyzed_at: chrono::Utc::now(),
            },
        })
    }

    /// Stage B: ask for 8–12 video ideas from a condensed view of the insights.
    pub fn generate_ideas(&self, insights: &InsightDocument) -> Result<IdeaDocument> {
        let summary = prompts::condense(&insights.findings);
        let user = prompts::ideas_prompt(&summary).map_err(anyhow::Error::from)?;

        let request = ChatRequest {
            model: self.settings.ideas_model.clone(),
            system: prompts::IDEAS_SYSTEM.to_string(),
            user,
            temperature: self.settings.ideas_temperature,
            max_tokens: self.settings.ideas_max_tokens,
        };

        let text = self.llm.complete(&request).map_err(|e| {
            warn!(error = %e, "idea generation call failed");
            AnalyzerError::UpstreamFailure(format!("Video idea generation failed: {e}"))
        })?;

        let ideas: IdeaDocument = parse_model_json(&text, "video ideas")?;
        info!(ideas = ideas.video_ideas.len(), "video ideas generated");
        Ok(ideas)
    }
}

fn top<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items.iter().take(n).cloned().collect()
}

/// Merge both stages into the display contract. Pure: same inputs, same output.
pub fn format_for_display(insights: &InsightDocument, ideas: &IdeaDocument) -> DisplayDocument {
    let f = &insights.findings;
    let meta = &insights.metadata;

    DisplayDocument {
        overview: Overview {
            total_comments: meta.total_comments,
            analyzed_comments: meta.analyzed_comments,
            overall_sentiment: f.sentiment.overall,
            video_title: meta.video_title.clone(),
        },
        insights: Insights {
            top_questions: top(&f.frequent_questions, 5),
            main_pain_points: top(&f.pain_points, 5),
            requested_topics: top(&f.content_requests, 5),
            learning_interests: top(&f.learning_topics, 5),
            common_misconceptions: top(&f.misconceptions, 3),
        },
        sentiment: f.sentiment.clone(),
        video_ideas: ideas.video_ideas.clone(),
        themes: f.themes.clone(),
    }
}
