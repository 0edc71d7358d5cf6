//! Caller-facing entry point for simulations and reply threads.
//!
//! Owns the generator and request settings. Everything is passed in at
//! construction; nothing is read from the environment here.

use ai_client::{AiError, GenerationRequest, RetryPolicy, StructuredGenerator};
use chrono::{Datelike, Utc};
use echoroom_common::{Article, Comment, Config, Reply, SimulationError, SimulationResult};
use tracing::{info, warn};

use crate::decode::decode;
use crate::reply::react_to_reply;
use crate::request::{RequestBuilder, SimulationContext};

pub struct Simulator<G> {
    generator: G,
    builder: RequestBuilder,
    retry: RetryPolicy,
    current_year: i32,
}

impl<G: StructuredGenerator> Simulator<G> {
    pub fn new(generator: G, config: &Config) -> Self {
        Self {
            generator,
            builder: RequestBuilder::new(&config.model),
            retry: config.retry_policy(),
            current_year: Utc::now().year(),
        }
    }

    /// Pin the year used as "now" for era resolution.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn context(&self, article: &Article) -> SimulationContext {
        SimulationContext::for_article(article, self.current_year)
    }

    /// The request `submit_simulation` would send, without sending it.
    pub fn preview(&self, article: &Article) -> GenerationRequest {
        self.builder.simulation(article, &self.context(article))
    }

    /// Run the full simulation for an article snapshot.
    ///
    /// Either the complete result or a single error; nothing partial.
    pub async fn submit_simulation(
        &self,
        article: &Article,
    ) -> Result<SimulationResult, SimulationError> {
        let snapshot = article.clone();
        let ctx = self.context(&snapshot);
        let request = self.builder.simulation(&snapshot, &ctx);

        info!(
            title = %snapshot.title,
            category = %snapshot.category,
            year = ctx.era.year,
            era = ?ctx.era.bracket,
            modes = ?ctx.modes.iter().map(|m| m.label()).collect::<Vec<_>>(),
            "Submitting simulation"
        );

        let mut attempts = 0u32;
        let raw = self
            .retry
            .run(AiError::is_rate_limit, || {
                attempts += 1;
                self.generator.generate(&request)
            })
            .await
            .map_err(|e| {
                warn!(error = %e, attempts, "Simulation call failed");
                SimulationError::from_ai(e, attempts)
            })?;

        let result: SimulationResult =
            decode(raw.as_deref()).map_err(|e| SimulationError::from_ai(e, attempts))?;

        info!(
            attempts,
            comments = result.comments.len(),
            coverage = result.other_media_coverage.len(),
            has_market = result.stock_analysis.is_some(),
            virality = result.virality_score,
            "Simulation complete"
        );
        Ok(result)
    }

    /// Reactions to the author's reply on one comment. Never fails outward.
    pub async fn submit_reply(
        &self,
        article: &Article,
        comment: &Comment,
        reply_text: &str,
    ) -> Vec<Reply> {
        let ctx = self.context(article);
        react_to_reply(
            &self.generator,
            &self.builder,
            &self.retry,
            article,
            &ctx,
            comment,
            reply_text,
        )
        .await
    }
}
