//! Session archive of finished simulations, newest first.

use chrono::{DateTime, Utc};
use echoroom_common::{Article, SimulationResult};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub archived_at: DateTime<Utc>,
    pub article: Article,
    pub result: SimulationResult,
}

#[derive(Debug, Clone, Default)]
pub struct SimulationHistory {
    entries: Vec<HistoryEntry>,
}

impl SimulationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot an article and its result. Returns the new entry's id.
    pub fn archive(&mut self, article: &Article, result: &SimulationResult) -> Uuid {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            archived_at: Utc::now(),
            article: article.clone(),
            result: result.clone(),
        };
        let id = entry.id;
        self.entries.insert(0, entry);
        debug!(%id, title = %article.title, total = self.entries.len(), "Simulation archived");
        id
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Context text for a follow-up article continuing the archived story.
    pub fn continuation_context(&self, id: Uuid) -> Option<String> {
        self.get(id).map(|entry| {
            format!(
                "Previous article: \"{}\"\nOutcome: {}\nPublic sentiment: {}",
                entry.article.title, entry.result.impact_summary, entry.result.public_sentiment
            )
        })
    }
}
