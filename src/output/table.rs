use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::analysis::models::{DisplayDocument, Level};
use crate::api::{AnalysisReport, HealthReport};
use crate::youtube::{CommentRecord, VideoInfo};

/// Abbreviate large counts: 950, 1.2K, 3.4M.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.1}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Truncate a string to fit within max_width (respecting unicode width).
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

/// Comment bodies arrive as HTML fragments; flatten them onto one line.
fn one_line(s: &str) -> String {
    s.replace("<br>", " ").replace('\n', " ")
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::High => "HIGH",
        Level::Medium => "MED ",
        Level::Low => "LOW ",
    }
}

pub fn print_video_info(info: &VideoInfo) {
    println!("Video: {}", info.title);
    println!("  Channel:   {}", info.channel_title);
    println!("  Published: {}", info.published_at.get(..10).unwrap_or(&info.published_at));
    println!(
        "  Views: {}   Likes: {}   Comments: {}",
        format_count(info.view_count),
        format_count(info.like_count),
        format_count(info.comment_count)
    );
}

/// Print a full analysis report for `yca analyze`.
pub fn print_report(report: &AnalysisReport) {
    print_video_info(&report.video_info);
    println!();
    print_analysis(&report.analysis);
}

fn print_analysis(doc: &DisplayDocument) {
    let o = &doc.overview;
    println!(
        "Analyzed {} of {} comments. Overall sentiment: {}",
        o.analyzed_comments, o.total_comments, o.overall_sentiment
    );

    let b = &doc.sentiment.breakdown;
    println!(
        "  excited {}  frustrated {}  confused {}  satisfied {}  grateful {}",
        b.excited, b.frustrated, b.confused, b.satisfied, b.grateful
    );

    let i = &doc.insights;
    if !i.top_questions.is_empty() {
        println!("\nTop questions:");
        for q in &i.top_questions {
            println!("  {:>4}x  {}", q.frequency, truncate(&q.question, 70));
        }
    }
    if !i.main_pain_points.is_empty() {
        println!("\nPain points:");
        for p in &i.main_pain_points {
            println!("  [{}] {}", level_tag(p.severity), truncate(&p.issue, 68));
        }
    }
    if !i.requested_topics.is_empty() {
        println!("\nRequested topics:");
        for r in &i.requested_topics {
            println!("  [{}] {}", level_tag(r.demand), truncate(&r.topic, 68));
        }
    }
    if !i.learning_interests.is_empty() {
        println!("\nLearning interests:");
        for l in &i.learning_interests {
            println!("  [{}] {}", level_tag(l.interest), truncate(&l.topic, 68));
        }
    }
    if !i.common_misconceptions.is_empty() {
        println!("\nMisconceptions:");
        for m in &i.common_misconceptions {
            println!("  - {}", truncate(&m.misconception, 74));
            if !m.clarification.is_empty() {
                println!("    → {}", truncate(&m.clarification, 72));
            }
        }
    }
    if !doc.themes.is_empty() {
        println!("\nThemes:");
        for t in &doc.themes {
            println!("  [{}] {}", level_tag(t.prevalence), truncate(&t.theme, 68));
        }
    }

    if doc.video_ideas.is_empty() {
        println!("\nNo video ideas generated.");
        return;
    }

    println!("\n{} video idea{}:\n", doc.video_ideas.len(), if doc.video_ideas.len() == 1 { "" } else { "s" });
    println!("  {:<56} {:<15} {:<8}", "TITLE", "TYPE", "INTEREST");
    println!("  {}", "-".repeat(80));
    for idea in &doc.video_ideas {
        println!(
            "  {:<56} {:<15} {:<8}",
            truncate(&idea.title, 54),
            idea.idea_type.label(),
            idea.estimated_interest,
        );
        if let Some(description) = idea.description.as_deref().filter(|d| !d.is_empty()) {
            println!("    {}", truncate(&one_line(description), 76));
        }
        for point in idea.key_points.iter().flatten() {
            println!("    • {}", truncate(point, 74));
        }
        println!();
    }
}

/// Print collected comments for `yca comments`.
pub fn print_comments(comments: &[CommentRecord]) {
    if comments.is_empty() {
        println!("No comments found.");
        return;
    }

    println!("{} comment{}:\n", comments.len(), if comments.len() == 1 { "" } else { "s" });
    println!("  {:<20} {:>6}  {:<10}  TEXT", "AUTHOR", "LIKES", "DATE");
    println!("  {}", "-".repeat(80));

    for c in comments {
        let indent = if c.is_reply == Some(true) { "  ↳ " } else { "" };
        println!(
            "  {:<20} {:>6}  {:<10}  {}{}",
            truncate(&c.author, 20),
            format_count(c.like_count),
            c.published_at.get(..10).unwrap_or(&c.published_at),
            indent,
            truncate(&one_line(&c.text), 40),
        );
    }
}

pub fn print_health(report: &HealthReport) {
    let mark = |ok: bool| if ok { "configured" } else { "missing" };
    println!("Status: {} ({})", report.status, report.timestamp.format("%Y-%m-%dT%H:%M:%SZ"));
    println!("  YouTube Data API: {}", mark(report.services.video_api));
    println!("  Analysis API:     {}", mark(report.services.analysis_api));
}
