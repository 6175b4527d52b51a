use super::models::{
    ContentRequest, FrequentQuestion, InsightFindings, LearningTopic, Misconception, PainPoint,
};
use crate::youtube::CommentRecord;

/// Only the first this-many comments are sent for analysis.
pub const CORPUS_LIMIT: usize = 200;
pub const CORPUS_DELIMITER: &str = "\n---\n";

pub const INSIGHT_SYSTEM: &str = "You are an expert content strategist who analyzes YouTube comments to help creators understand their audience and generate video ideas. Provide detailed, actionable insights in valid JSON format.";

pub const INSIGHT_TEMPLATE: &str = r#"
Analyze these YouTube comments for a video titled "{video_title}".

Comments:
{comments}

Please provide a comprehensive analysis in JSON format with the following structure:
{
  "frequentQuestions": [
    {"question": "specific question", "frequency": number, "examples": ["comment1", "comment2"]}
  ],
  "painPoints": [
    {"issue": "specific problem", "severity": "high|medium|low", "examples": ["comment1", "comment2"]}
  ],
  "contentRequests": [
    {"topic": "requested topic", "demand": "high|medium|low", "examples": ["comment1", "comment2"]}
  ],
  "sentiment": {
    "overall": "positive|negative|neutral|mixed",
    "breakdown": {
      "excited": number,
      "frustrated": number,
      "confused": number,
      "satisfied": number,
      "grateful": number
    }
  },
  "learningTopics": [
    {"topic": "topic name", "interest": "high|medium|low", "examples": ["comment1", "comment2"]}
  ],
  "misconceptions": [
    {"misconception": "what people got wrong", "clarification": "what should be explained", "examples": ["comment1", "comment2"]}
  ],
  "themes": [
    {"theme": "main theme", "prevalence": "high|medium|low", "description": "brief description"}
  ]
}

Focus on actionable insights that would help a content creator make better videos. Be specific and concrete."#;

pub const IDEAS_SYSTEM: &str = "You are a YouTube content strategist who creates winning video ideas based on audience feedback. Generate specific, actionable video concepts that would get high engagement.";

pub const IDEAS_TEMPLATE: &str = r#"
Based on this comment analysis, generate 8-12 specific, actionable YouTube video ideas that would serve this audience well.

Analysis Summary:
- Frequent Questions: {questions}
- Pain Points: {pain_points}
- Content Requests: {requests}
- Learning Topics: {learning_topics}
- Misconceptions: {misconceptions}

Generate video ideas in JSON format:
{
  "videoIdeas": [
    {
      "title": "Specific, clickable video title",
      "type": "FAQ|Tutorial|Deep Dive|Problem Solver|Myth Buster|Follow-up",
      "description": "2-3 sentence description of what the video would cover",
      "estimatedInterest": "high|medium|low",
      "reasoning": "Why this video would perform well based on the comments",
      "keyPoints": ["point 1", "point 2", "point 3"]
    }
  ]
}

Make titles engaging and specific. Focus on solving real problems mentioned in the comments."#;

/// Comment text as submitted to the extraction model.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    pub text: String,
    pub analyzed: usize,
}

/// Truncate (not sample) to the first [`CORPUS_LIMIT`] comments, in order.
pub fn build_corpus(comments: &[CommentRecord]) -> Corpus {
    let taken = &comments[..comments.len().min(CORPUS_LIMIT)];
    Corpus {
        text: taken
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(CORPUS_DELIMITER),
        analyzed: taken.len(),
    }
}

/// Fill `{name}` slots in one left-to-right pass. Substituted text is never
/// rescanned, and braces that open no known slot are copied through.
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(
        template.len() + slots.iter().map(|(_, value)| value.len()).sum::<usize>(),
    );
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let slot = slots
            .iter()
            .find(|(name, _)| after.strip_prefix(*name).is_some_and(|tail| tail.starts_with('}')));
        match slot {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn insight_prompt(video_title: &str, corpus: &Corpus) -> String {
    fill(
        INSIGHT_TEMPLATE,
        &[("video_title", video_title), ("comments", corpus.text.as_str())],
    )
}

/// The slice of stage-one findings that idea generation gets to see.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightSummary<'a> {
    pub questions: &'a [FrequentQuestion],
    pub pain_points: &'a [PainPoint],
    pub requests: &'a [ContentRequest],
    pub learning_topics: &'a [LearningTopic],
    pub misconceptions: &'a [Misconception],
}

fn head<T>(items: &[T], n: usize) -> &[T] {
    &items[..items.len().min(n)]
}

/// Top 3 of each category and top 2 misconceptions, in existing order.
pub fn condense(findings: &InsightFindings) -> InsightSummary<'_> {
    InsightSummary {
        questions: head(&findings.frequent_questions, 3),
        pain_points: head(&findings.pain_points, 3),
        requests: head(&findings.content_requests, 3),
        learning_topics: head(&findings.learning_topics, 3),
        misconceptions: head(&findings.misconceptions, 2),
    }
}

pub fn ideas_prompt(summary: &InsightSummary<'_>) -> serde_json::Result<String> {
    let questions = serde_json::to_string(summary.questions)?;
    let pain_points = serde_json::to_string(summary.pain_points)?;
    let requests = serde_json::to_string(summary.requests)?;
    let learning_topics = serde_json::to_string(summary.learning_topics)?;
    let misconceptions = serde_json::to_string(summary.misconceptions)?;

    Ok(fill(
        IDEAS_TEMPLATE,
        &[
            ("questions", questions.as_str()),
            ("pain_points", pain_points.as_str()),
            ("requests", requests.as_str()),
            ("learning_topics", learning_topics.as_str()),
            ("misconceptions", misconceptions.as_str()),
        ],
    ))
}
