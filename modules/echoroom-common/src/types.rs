//! Articles going in, simulated reception coming out.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Indicator simulated when the article selects none.
pub const DEFAULT_MARKET_INDICATOR: &str = "KOSPI";

/// Upper bound of every score and gauge.
pub const MAX_SCORE: u8 = 100;

// --- Article ---------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Politics,
    Economy,
    Society,
    Culture,
    #[serde(alias = "it", alias = "science")]
    Tech,
    World,
    Entertainment,
    Sports,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Politics => "Politics",
            Category::Economy => "Economy",
            Category::Society => "Society",
            Category::Culture => "Culture",
            Category::Tech => "IT/Science",
            Category::World => "World",
            Category::Entertainment => "Entertainment",
            Category::Sports => "Sports",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scenario toggles. Any combination may be on at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModeFlags {
    pub fake_news: bool,
    pub crazy_mode: bool,
    pub emergency_mode: bool,
    pub time_machine_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub category: Category,
    pub content: String,
    pub author: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub modes: ModeFlags,
    /// A number or a numeric string. Blank or unreadable text counts as unset.
    #[serde(default, deserialize_with = "deserialize_year")]
    pub target_year: Option<i32>,
    /// Carried over from an earlier simulation for serialized storytelling.
    #[serde(default)]
    pub previous_article_context: Option<String>,
    #[serde(default)]
    pub market_indicators: Vec<String>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        category: Category,
        content: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            category,
            content: content.into(),
            author: author.into(),
            timestamp: Utc::now(),
            modes: ModeFlags::default(),
            target_year: None,
            previous_article_context: None,
            market_indicators: Vec::new(),
        }
    }

    /// Year the simulation takes place in. Only time travel moves it away
    /// from `current_year`.
    pub fn effective_year(&self, current_year: i32) -> i32 {
        match (self.modes.time_machine_mode, self.target_year) {
            (true, Some(year)) => year,
            _ => current_year,
        }
    }

    pub fn indicators(&self) -> Vec<String> {
        let selected: Vec<String> = self
            .market_indicators
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect();
        if selected.is_empty() {
            vec![DEFAULT_MARKET_INDICATOR.to_string()]
        } else {
            selected
        }
    }

    pub fn prior_context(&self) -> Option<&str> {
        self.previous_article_context
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

// --- Simulation result -----------------------------------------------------

fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(ref n) => n
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("targetYear {n} is not a whole year"))),
        serde_json::Value::String(ref s) => Ok(s.trim().parse().ok()),
        _ => Err(de::Error::custom(
            "targetYear must be a number or numeric string",
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub username: String,
    pub content: String,
    pub likes: u64,
}

impl Reply {
    pub fn new(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            content: content.into(),
            likes: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Free-form platform name; classified when rendered.
    pub platform: String,
    pub username: String,
    pub content: String,
    pub likes: u64,
    pub sentiment: Sentiment,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaCoverage {
    pub outlet: String,
    pub headline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub time: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectorChange {
    pub name: String,
    /// Percent change; positive means the sector rose.
    pub change: f64,
}

impl SectorChange {
    pub fn trend(&self) -> Trend {
        Trend::from_delta(self.change)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAnalysis {
    pub index_name: String,
    pub start_value: f64,
    pub end_value: f64,
    pub chart_data: Vec<ChartPoint>,
    pub affected_sectors: Vec<SectorChange>,
    pub commentary: String,
}

impl StockAnalysis {
    pub fn change(&self) -> f64 {
        self.end_value - self.start_value
    }

    pub fn change_percent(&self) -> Option<f64> {
        (self.start_value != 0.0).then(|| self.change() / self.start_value * 100.0)
    }

    pub fn trend(&self) -> Trend {
        Trend::from_delta(self.change())
    }
}

/// Direction marker shared by index moves and sector moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            Trend::Up
        } else if delta < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Flat => "-",
        }
    }
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let score = u8::deserialize(deserializer)?;
    if score > MAX_SCORE {
        return Err(de::Error::custom(format!(
            "score {score} is outside 0..={MAX_SCORE}"
        )));
    }
    Ok(score)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtraIndices {
    #[serde(deserialize_with = "deserialize_score")]
    #[schemars(range(max = 100))]
    pub national_anxiety: u8,
    #[serde(deserialize_with = "deserialize_score")]
    #[schemars(range(max = 100))]
    pub economic_stability: u8,
    #[serde(deserialize_with = "deserialize_score")]
    #[schemars(range(max = 100))]
    pub anger_index: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    #[serde(deserialize_with = "deserialize_score")]
    #[schemars(range(max = 100))]
    pub virality_score: u8,
    #[serde(deserialize_with = "deserialize_score")]
    #[schemars(range(max = 100))]
    pub reliability_score: u8,
    #[serde(deserialize_with = "deserialize_score")]
    #[schemars(range(max = 100))]
    pub controversy_score: u8,
    pub public_sentiment: String,
    pub editor_feedback: String,
    pub impact_summary: String,
    pub predicted_views: u64,
    pub predicted_shares: u64,
    /// Order is significant: comments are addressed by position.
    pub comments: Vec<Comment>,
    pub other_media_coverage: Vec<MediaCoverage>,
    /// Always requested; a response without it is still accepted.
    #[serde(default)]
    pub stock_analysis: Option<Vec<StockAnalysis>>,
    #[serde(default)]
    pub extra_indices: Option<ExtraIndices>,
}
