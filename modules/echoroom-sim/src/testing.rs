// Test doubles for the generation seam.
//
// - ScriptedGenerator: replays a queue of canned outcomes, records requests
// - GatedGenerator: holds every call until the test opens the gate
//
// Plus fixtures for articles and simulation results.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ai_client::{AiError, GenerationRequest, StructuredGenerator};
use async_trait::async_trait;
use chrono::TimeZone;
use echoroom_common::{
    Article, Category, Comment, MediaCoverage, Reply, Sentiment, SimulationResult,
};
use tokio::sync::Notify;

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

/// Replays outcomes in order. Fails with a network error once exhausted.
#[derive(Default)]
pub struct ScriptedGenerator {
    outcomes: Mutex<VecDeque<Result<Option<String>, AiError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.push(Ok(Some(text.into())))
    }

    pub fn then_empty(self) -> Self {
        self.push(Ok(None))
    }

    pub fn then_error(self, err: AiError) -> Self {
        self.push(Err(err))
    }

    fn push(self, outcome: Result<Option<String>, AiError>) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructuredGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, AiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AiError::Network("ScriptedGenerator: script exhausted".into())))
    }
}

// ---------------------------------------------------------------------------
// GatedGenerator
// ---------------------------------------------------------------------------

/// Waits for `open()` before each call is answered by the inner script.
pub struct GatedGenerator {
    gate: Arc<Notify>,
    inner: ScriptedGenerator,
}

impl GatedGenerator {
    pub fn new(inner: ScriptedGenerator) -> Self {
        Self {
            gate: Arc::new(Notify::new()),
            inner,
        }
    }

    pub fn gate(&self) -> Arc<Notify> {
        self.gate.clone()
    }

    pub fn calls(&self) -> usize {
        self.inner.calls()
    }
}

#[async_trait]
impl StructuredGenerator for GatedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, AiError> {
        self.gate.notified().await;
        self.inner.generate(request).await
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn article() -> Article {
    let mut article = Article::new(
        "City announces free public transit",
        Category::Society,
        "Starting next month, all city buses and subways will be free of charge.",
        "Park Ji-woo",
    );
    article.timestamp = chrono::Utc
        .with_ymd_and_hms(2026, 10, 1, 8, 0, 0)
        .single()
        .unwrap_or_default();
    article
}

pub fn comment(platform: &str, username: &str, content: &str) -> Comment {
    Comment {
        platform: platform.to_string(),
        username: username.to_string(),
        content: content.to_string(),
        likes: 3,
        sentiment: Sentiment::Neutral,
        replies: Vec::new(),
    }
}

pub fn result_with(comments: Vec<Comment>) -> SimulationResult {
    SimulationResult {
        virality_score: 72,
        reliability_score: 64,
        controversy_score: 58,
        public_sentiment: "Divided".to_string(),
        editor_feedback: "Solid, add numbers.".to_string(),
        impact_summary: "Commuters cheer, taxpayers worry.".to_string(),
        predicted_views: 150_000,
        predicted_shares: 4_200,
        comments,
        other_media_coverage: vec![MediaCoverage {
            outlet: "Morning Rival".to_string(),
            headline: "Free ride, who pays?".to_string(),
        }],
        stock_analysis: None,
        extra_indices: None,
    }
}

/// Four comments across four platform families, in a fixed order.
pub fn four_comments() -> Vec<Comment> {
    vec![
        comment("X (Twitter)", "commuter01", "Finally!"),
        comment("theqoo", "qoo_reader", "Is this real?"),
        comment("DC Inside", "anon_gall", "Taxes going up lol"),
        comment("Naver News", "portal_user", "Good policy."),
    ]
}

pub fn replies_json(replies: &[Reply]) -> String {
    serde_json::json!({ "replies": replies }).to_string()
}
