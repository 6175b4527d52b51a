mod common;

use common::*;
use yca::analysis::models::{IdeaType, OverallSentiment};
use yca::analysis::AnalysisSettings;
use yca::api::{handle_analyze, AnalyzeOptions, Analyzer};
use yca::error::AnalyzerError;
use yca::youtube::{PlatformError, VideoId};

fn id() -> VideoId {
    VideoId::from_url(VIDEO_URL).unwrap()
}

fn ok_chat() -> FakeChat {
    FakeChat::new(vec![
        Ok(format!("```json\n{INSIGHTS_JSON}\n```")),
        Ok(IDEAS_JSON.to_string()),
    ])
}

#[test]
fn full_run_merges_both_stages() {
    let platform = FakePlatform::new(
        Ok(video_info(150)),
        vec![Ok(page("a", 100, Some("CAE"))), Ok(page("b", 50, None))],
    );
    let chat = ok_chat();
    let analyzer = Analyzer::new(&platform, &chat, AnalysisSettings::default());

    let report = analyzer
        .analyze(
            &id(),
            AnalyzeOptions {
                max_comments: 150,
                with_replies: false,
            },
        )
        .unwrap();

    // 150 records in exactly two page requests.
    assert_eq!(platform.request_count(), 2);
    assert_eq!(
        *platform.page_requests.lock().unwrap(),
        vec![(100, None), (50, Some("CAE".to_string()))]
    );

    let analysis = &report.analysis;
    assert_eq!(report.video_info.title, "Ownership Explained");
    assert_eq!(analysis.overview.total_comments, 150);
    assert_eq!(analysis.overview.analyzed_comments, 150);
    assert_eq!(analysis.overview.video_title, "Ownership Explained");
    assert_eq!(analysis.overview.overall_sentiment, OverallSentiment::Positive);
    assert_eq!(analysis.insights.top_questions.len(), 5);
    assert_eq!(analysis.insights.top_questions[0].question, "When should I use Rc?");
    assert_eq!(analysis.sentiment.breakdown.satisfied, 20);
    assert_eq!(analysis.video_ideas.len(), 2);
    assert_eq!(analysis.video_ideas[0].idea_type, IdeaType::DeepDive);
    assert_eq!(analysis.themes[0].theme, "Memory safety");

    // Stage B saw the condensed summary, not the sixth question.
    assert_eq!(chat.call_count(), 2);
    let requests = chat.requests.lock().unwrap();
    assert!(requests[1].user.contains("When should I use Rc?"));
    assert!(!requests[1].user.contains("Where's part 2?"));
}

#[test]
fn success_reply_has_expected_shape() {
    let platform = FakePlatform::new(Ok(video_info(3)), vec![Ok(page("c", 3, None))]);
    let chat = ok_chat();
    let analyzer = Analyzer::new(&platform, &chat, AnalysisSettings::default());

    let body = format!(r#"{{"url": "{VIDEO_URL}"}}"#);
    let reply = handle_analyze(&analyzer, &body, 500);

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["success"], true);
    assert_eq!(reply.body["videoInfo"]["channelTitle"], "Rustacean Station");
    assert_eq!(reply.body["analysis"]["overview"]["totalComments"], 3);
    assert_eq!(reply.body["analysis"]["videoIdeas"][1]["type"], "Myth Buster");
    assert_eq!(
        reply.body["analysis"]["insights"]["commonMisconceptions"][0]["clarification"],
        "cheap for Rc"
    );
    // Default cap of 500 means one page request of 100.
    assert_eq!(platform.page_requests.lock().unwrap()[0].0, 100);
}

#[test]
fn zero_comments_is_a_400() {
    let platform = FakePlatform::new(Ok(video_info(0)), vec![Ok(page("x", 0, None))]);
    let chat = FakeChat::new(vec![]);
    let analyzer = Analyzer::new(&platform, &chat, AnalysisSettings::default());

    let reply = handle_analyze(&analyzer, &format!(r#"{{"url": "{VIDEO_URL}"}}"#), 500);
    assert_eq!(reply.status, 400);
    assert!(reply.body["error"]
        .as_str()
        .unwrap()
        .starts_with("No comments found"));
    assert!(reply.body.get("success").is_none());
    assert_eq!(chat.call_count(), 0);
}

#[test]
fn missing_and_invalid_urls_are_rejected_before_any_call() {
    let platform = FakePlatform::new(Ok(video_info(1)), vec![]);
    let chat = FakeChat::new(vec![]);
    let analyzer = Analyzer::new(&platform, &chat, AnalysisSettings::default());

    let reply = handle_analyze(&analyzer, "{}", 500);
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["error"], "YouTube URL is required");

    let reply = handle_analyze(&analyzer, "", 500);
    assert_eq!(reply.body["error"], "YouTube URL is required");

    let reply = handle_analyze(&analyzer, r#"{"url": "https://example.com/video"}"#, 500);
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["error"], "Invalid YouTube URL");

    let reply = handle_analyze(&analyzer, "{not json", 500);
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["error"], "Invalid JSON body");

    assert_eq!(platform.request_count(), 0);
}

#[test]
fn rejected_urls_are_logged() {
    let platform = FakePlatform::new(Ok(video_info(1)), vec![]);
    let chat = FakeChat::new(vec![]);
    let analyzer = Analyzer::new(&platform, &chat, AnalysisSettings::default());
    let logs = CapturedLogs::default();

    let missing = logs.capture(|| handle_analyze(&analyzer, "{}", 500));
    let invalid = logs.capture(|| {
        handle_analyze(&analyzer, r#"{"url": "https://example.com/watch"}"#, 500)
    });

    assert_eq!(missing.status, 400);
    assert_eq!(invalid.status, 400);
    let out = logs.contents();
    assert!(out.contains("WARN"), "{out}");
    assert!(out.contains("rejecting analyze request without a URL"), "{out}");
    assert!(out.contains("rejecting analyze request with an unrecognized URL"), "{out}");
    assert!(out.contains("https://example.com/watch"), "{out}");
}

#[test]
fn comments_disabled_is_distinct() {
    let platform = FakePlatform::new(Ok(video_info(0)), vec![Err(PlatformError::CommentsDisabled)]);
    let chat = FakeChat::new(vec![]);
    let analyzer = Analyzer::new(&platform, &chat, AnalysisSettings::default());

    let reply = handle_analyze(&analyzer, &format!(r#"{{"url": "{VIDEO_URL}"}}"#), 500);
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["error"], "Comments are disabled for this video");
}

#[test]
fn missing_video_is_not_found() {
    let platform = FakePlatform::new(Err(PlatformError::NotFound("Video not found".into())), vec![]);
    let chat = FakeChat::new(vec![]);
    let analyzer = Analyzer::new(&platform, &chat, AnalysisSettings::default());

    let err = analyzer.analyze(&id(), AnalyzeOptions::default()).unwrap_err();
    assert!(matches!(err, AnalyzerError::NotFound(_)));
    assert_eq!(err.status_code(), 400);
    assert_eq!(platform.request_count(), 0);
}

#[test]
fn upstream_listing_failure_is_a_500_with_success_false() {
    let platform = FakePlatform::new(
        Ok(video_info(10)),
        vec![Err(PlatformError::Api {
            status: 403,
            reason: Some("quotaExceeded".into()),
            message: "The request cannot be completed because you have exceeded your quota.".into(),
        })],
    );
    let chat = FakeChat::new(vec![]);
    let analyzer = Analyzer::new(&platform, &chat, AnalysisSettings::default());

    let reply = handle_analyze(&analyzer, &format!(r#"{{"url": "{VIDEO_URL}", "maxComments": 20}}"#), 500);
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body["success"], false);
    assert!(reply.body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to fetch comments: YouTube API returned 403"));
}

#[test]
fn unparseable_stage_b_fails_whole_request() {
    let platform = FakePlatform::new(Ok(video_info(2)), vec![Ok(page("c", 2, None))]);
    let chat = FakeChat::new(vec![
        Ok(INSIGHTS_JSON.to_string()),
        Ok("Here are twelve great ideas for you!".to_string()),
    ]);
    let analyzer = Analyzer::new(&platform, &chat, AnalysisSettings::default());

    let reply = handle_analyze(&analyzer, &format!(r#"{{"url": "{VIDEO_URL}"}}"#), 500);
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body["success"], false);
    assert!(reply.body.get("analysis").is_none());
    assert!(reply.body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to parse video ideas"));
    // No retry.
    assert_eq!(chat.call_count(), 2);
}

#[test]
fn request_max_comments_bounds_pages() {
    let pages = (0..10)
        .map(|i| Ok(page(&format!("p{i}-"), 100, Some("more"))))
        .collect();
    let platform = FakePlatform::new(Ok(video_info(5_000)), pages);
    let chat = ok_chat();
    let analyzer = Analyzer::new(&platform, &chat, AnalysisSettings::default());

    let reply = handle_analyze(&analyzer, &format!(r#"{{"url": "{VIDEO_URL}", "maxComments": 250}}"#), 500);
    assert_eq!(reply.status, 200);
    assert_eq!(platform.request_count(), 3);
    assert_eq!(reply.body["analysis"]["overview"]["totalComments"], 250);
    assert_eq!(reply.body["analysis"]["overview"]["analyzedComments"], 200);
}
