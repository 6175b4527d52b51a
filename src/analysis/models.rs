use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Model output sometimes writes `null` where a list or string belongs.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counts may come back fractional or negative; round and clamp at zero.
fn rounded_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(raw.round().clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// high | medium | low, as used for severity, demand, interest and prevalence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl TryFrom<String> for Level {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "high" => Ok(Level::High),
            "medium" => Ok(Level::Medium),
            "low" => Ok(Level::Low),
            _ => Err(format!("unknown level {value:?}, expected high|medium|low")),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Level::High => "high",
            Level::Medium => "medium",
            Level::Low => "low",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OverallSentiment {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl TryFrom<String> for OverallSentiment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "positive" => Ok(OverallSentiment::Positive),
            "negative" => Ok(OverallSentiment::Negative),
            "neutral" => Ok(OverallSentiment::Neutral),
            "mixed" => Ok(OverallSentiment::Mixed),
            _ => Err(format!(
                "unknown sentiment {value:?}, expected positive|negative|neutral|mixed"
            )),
        }
    }
}

impl fmt::Display for OverallSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            OverallSentiment::Positive => "positive",
            OverallSentiment::Negative => "negative",
            OverallSentiment::Neutral => "neutral",
            OverallSentiment::Mixed => "mixed",
        })
    }
}

/// Kind of video an idea proposes. Serialized in display form ("Deep Dive").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum IdeaType {
    #[serde(rename = "FAQ")]
    Faq,
    #[serde(rename = "Tutorial")]
    Tutorial,
    #[serde(rename = "Deep Dive")]
    DeepDive,
    #[serde(rename = "Problem Solver")]
    ProblemSolver,
    #[serde(rename = "Myth Buster")]
    MythBuster,
    #[serde(rename = "Follow-up")]
    FollowUp,
}

impl IdeaType {
    pub fn label(&self) -> &'static str {
        match self {
            IdeaType::Faq => "FAQ",
            IdeaType::Tutorial => "Tutorial",
            IdeaType::DeepDive => "Deep Dive",
            IdeaType::ProblemSolver => "Problem Solver",
            IdeaType::MythBuster => "Myth Buster",
            IdeaType::FollowUp => "Follow-up",
        }
    }
}

impl TryFrom<String> for IdeaType {
    type Error = String;

    // "Deep Dive", "DeepDive", "deep-dive" and "deep_dive" are all the same type.
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let key: String = value
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "faq" => Ok(IdeaType::Faq),
            "tutorial" => Ok(IdeaType::Tutorial),
            "deepdive" => Ok(IdeaType::DeepDive),
            "problemsolver" => Ok(IdeaType::ProblemSolver),
            "mythbuster" => Ok(IdeaType::MythBuster),
            "followup" => Ok(IdeaType::FollowUp),
            _ => Err(format!("unknown video idea type {value:?}")),
        }
    }
}

impl fmt::Display for IdeaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequentQuestion {
    pub question: String,
    #[serde(default, deserialize_with = "rounded_count")]
    pub frequency: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainPoint {
    pub issue: String,
    pub severity: Level,
    #[serde(default, deserialize_with = "null_as_default")]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRequest {
    pub topic: String,
    pub demand: Level,
    #[serde(default, deserialize_with = "null_as_default")]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningTopic {
    pub topic: String,
    pub interest: Level,
    #[serde(default, deserialize_with = "null_as_default")]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Misconception {
    pub misconception: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clarification: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub theme: String,
    pub prevalence: Level,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Emotion counts over the analyzed comments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentBreakdown {
    #[serde(deserialize_with = "rounded_count")]
    pub excited: u32,
    #[serde(deserialize_with = "rounded_count")]
    pub frustrated: u32,
    #[serde(deserialize_with = "rounded_count")]
    pub confused: u32,
    #[serde(deserialize_with = "rounded_count")]
    pub satisfied: u32,
    #[serde(deserialize_with = "rounded_count")]
    pub grateful: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub overall: OverallSentiment,
    #[serde(default, deserialize_with = "null_as_default")]
    pub breakdown: SentimentBreakdown,
}

/// What the extraction model returns, before we stamp metadata on it.
///
/// Top-level keys beyond the known collections are kept in `extra` and
/// written back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightFindings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub frequent_questions: Vec<FrequentQuestion>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pain_points: Vec<PainPoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_requests: Vec<ContentRequest>,
    pub sentiment: Sentiment,
    #[serde(default, deserialize_with = "null_as_default")]
    pub learning_topics: Vec<LearningTopic>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub misconceptions: Vec<Misconception>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub themes: Vec<Theme>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub total_comments: usize,
    pub analyzed_comments: usize,
    pub video_title: String,
    pub analyzed_at: DateTime<Utc>,
}

/// Stage-one result: findings plus where they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightDocument {
    #[serde(flatten)]
    pub findings: InsightFindings,
    pub metadata: AnalysisMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoIdea {
    pub title: String,
    #[serde(rename = "type")]
    pub idea_type: IdeaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub estimated_interest: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_points: Option<Vec<String>>,
    /// Anything else the model attached to the idea, passed through as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stage-two result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_ideas: Vec<VideoIdea>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_comments: usize,
    pub analyzed_comments: usize,
    pub overall_sentiment: OverallSentiment,
    pub video_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub top_questions: Vec<FrequentQuestion>,
    pub main_pain_points: Vec<PainPoint>,
    pub requested_topics: Vec<ContentRequest>,
    pub learning_interests: Vec<LearningTopic>,
    pub common_misconceptions: Vec<Misconception>,
}

/// The merged document handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayDocument {
    pub overview: Overview,
    pub insights: Insights,
    pub sentiment: Sentiment,
    pub video_ideas: Vec<VideoIdea>,
    pub themes: Vec<Theme>,
}
