#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use yca::analysis::{ChatCompletion, ChatRequest, LlmError};
use yca::youtube::{
    CommentRecord, CommentThread, PlatformError, ThreadPage, ThreadQuery, VideoId, VideoInfo,
    VideoPlatform,
};

pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

pub fn video_info(comment_count: u64) -> VideoInfo {
    VideoInfo {
        title: "Ownership Explained".to_string(),
        channel_title: "Rustacean Station".to_string(),
        published_at: "2024-03-01T12:00:00Z".to_string(),
        view_count: 10_000,
        like_count: 900,
        comment_count,
    }
}

pub fn page(prefix: &str, n: usize, next: Option<&str>) -> ThreadPage {
    ThreadPage {
        threads: (0..n)
            .map(|i| CommentThread {
                top_level: CommentRecord {
                    text: format!("{prefix}{i}"),
                    author: format!("@viewer{i}"),
                    like_count: i as u64,
                    published_at: "2024-03-02T00:00:00Z".to_string(),
                    updated_at: Some("2024-03-02T00:00:00Z".to_string()),
                    is_reply: None,
                },
                replies: Vec::new(),
            })
            .collect(),
        next_page_token: next.map(str::to_string),
    }
}

/// In-memory video platform with scripted pages.
pub struct FakePlatform {
    info: Mutex<Option<Result<VideoInfo, PlatformError>>>,
    pages: Mutex<VecDeque<Result<ThreadPage, PlatformError>>>,
    pub page_requests: Mutex<Vec<(usize, Option<String>)>>,
}

impl FakePlatform {
    pub fn new(info: Result<VideoInfo, PlatformError>, pages: Vec<Result<ThreadPage, PlatformError>>) -> Self {
        Self {
            info: Mutex::new(Some(info)),
            pages: Mutex::new(pages.into()),
            page_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.page_requests.lock().unwrap().len()
    }
}

impl VideoPlatform for FakePlatform {
    fn video_info(&self, _: &VideoId) -> Result<VideoInfo, PlatformError> {
        self.info
            .lock()
            .unwrap()
            .take()
            .expect("video info requested once")
    }

    fn comment_threads(&self, query: &ThreadQuery<'_>) -> Result<ThreadPage, PlatformError> {
        self.page_requests
            .lock()
            .unwrap()
            .push((query.max_results, query.page_token.map(str::to_string)));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ThreadPage::default()))
    }
}

/// Chat model returning canned replies in order.
pub struct FakeChat {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl FakeChat {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl ChatCompletion for FakeChat {
    fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Transport("unexpected call".into())))
    }
}

pub const INSIGHTS_JSON: &str = r#"{
  "frequentQuestions": [
    {"question": "When should I use Rc?", "frequency": 12, "examples": ["rc vs arc?"]},
    {"question": "Why does the borrow checker reject this?", "frequency": 9, "examples": []},
    {"question": "Is clone() bad?", "frequency": 7, "examples": []},
    {"question": "What about async lifetimes?", "frequency": 5, "examples": []},
    {"question": "Box vs Vec?", "frequency": 3, "examples": []},
    {"question": "Where's part 2?", "frequency": 2, "examples": []}
  ],
  "painPoints": [
    {"issue": "Lifetime annotations are confusing", "severity": "high", "examples": []}
  ],
  "contentRequests": [
    {"topic": "Smart pointers", "demand": "high", "examples": []}
  ],
  "sentiment": {
    "overall": "positive",
    "breakdown": {"excited": 10, "frustrated": 4, "confused": 6, "satisfied": 20, "grateful": 15}
  },
  "learningTopics": [
    {"topic": "Interior mutability", "interest": "medium", "examples": []}
  ],
  "misconceptions": [
    {"misconception": "clone is always slow", "clarification": "cheap for Rc", "examples": []}
  ],
  "themes": [
    {"theme": "Memory safety", "prevalence": "high", "description": "Viewers love the guarantees"}
  ]
}"#;

pub const IDEAS_JSON: &str = r#"{
  "videoIdeas": [
    {
      "title": "Rc vs Arc vs Box: Pick the Right Pointer",
      "type": "Deep Dive",
      "description": "Walk through each smart pointer with real examples.",
      "estimatedInterest": "high",
      "reasoning": "Most asked question in the comments.",
      "keyPoints": ["ownership", "reference counting", "thread safety"]
    },
    {
      "title": "5 Clone Myths",
      "type": "Myth Buster",
      "description": "Debunk the idea that clone is always expensive.",
      "estimatedInterest": "medium",
      "reasoning": "Common misconception.",
      "keyPoints": ["Rc::clone", "Copy types"]
    }
  ]
}"#;

/// In-memory sink for a `tracing_subscriber::fmt` subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Run `f` with every event at DEBUG and above written here.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
