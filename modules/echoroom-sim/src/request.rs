//! Assembly of schema-bound generation requests.
//!
//! Everything here is a pure transform: the same article and context always
//! produce the same request.

use ai_client::{truncate_to_char_boundary, GenerationRequest, StructuredOutput};
use echoroom_common::{Article, Comment, SimulationResult};

use crate::era::EraContext;
use crate::modes::{compose, ModeInstruction, ModeSet};
use crate::reply::ReplyReactions;

/// Article bodies longer than this are cut before prompting.
pub const MAX_ARTICLE_BYTES: usize = 12_000;
const MAX_REPLY_BYTES: usize = 2_000;

pub const SIMULATION_SCHEMA_NAME: &str = "simulation_result";
pub const REPLY_SCHEMA_NAME: &str = "reply_reactions";

pub const SYSTEM_INSTRUCTION: &str = "You are a news reception simulator. Given an article, you \
predict how readers, rival outlets and financial markets react. Reactions must feel realistic \
but stay within content policy: no slurs, no harassment of real private individuals, no \
instructions for harm. Your output must be valid JSON that matches the provided schema exactly.";

pub const REPLY_SYSTEM_INSTRUCTION: &str = "You continue a comment thread under a news article. \
Write short, realistic replies from other readers or the original commenter. Stay within content \
policy. Your output must be valid JSON that matches the provided schema exactly.";

/// Vocabulary that replies may never contain.
pub const BANNED_VOCABULARY: &[&str] = &[
    "ethnic, racial or regional slurs",
    "misogynistic or misandrist slurs",
    "slurs targeting disability or sexual orientation",
    "slang from extremist online communities",
    "glorification of terrorism or mass violence",
];

/// Era and mode context shared by the simulation and its reply sub-flows.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationContext {
    pub era: EraContext,
    pub modes: Vec<ModeInstruction>,
}

impl SimulationContext {
    pub fn for_article(article: &Article, current_year: i32) -> Self {
        let era = EraContext::resolve(
            article.effective_year(current_year),
            article.modes.time_machine_mode,
            current_year,
        );
        Self {
            era,
            modes: compose(&ModeSet::from_flags(&article.modes)),
        }
    }

    fn mode_section(&self) -> String {
        let blocks = self
            .modes
            .iter()
            .map(ModeInstruction::render)
            .collect::<Vec<_>>()
            .join("\n\n");
        if self.modes.len() > 1 {
            format!(
                "Several modes are active at once. Blend all of them; none overrides another.\n\n{blocks}"
            )
        } else {
            blocks
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    model: String,
}

impl RequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The primary simulation request.
    pub fn simulation(&self, article: &Article, ctx: &SimulationContext) -> GenerationRequest {
        GenerationRequest::new(
            &self.model,
            SYSTEM_INSTRUCTION,
            simulation_guidance(article, ctx),
        )
        .with_schema(SIMULATION_SCHEMA_NAME, SimulationResult::strict_schema())
    }

    /// The reply-reaction request for one comment thread.
    pub fn reply_reaction(
        &self,
        article: &Article,
        ctx: &SimulationContext,
        comment: &Comment,
        reply_text: &str,
    ) -> GenerationRequest {
        GenerationRequest::new(
            &self.model,
            REPLY_SYSTEM_INSTRUCTION,
            reply_guidance(article, ctx, comment, reply_text),
        )
        .with_schema(REPLY_SCHEMA_NAME, ReplyReactions::strict_schema())
    }
}

/// Guidance text for the primary simulation, sections in fixed order:
/// era, prior context (when present), article, modes, output requirements.
pub fn simulation_guidance(article: &Article, ctx: &SimulationContext) -> String {
    let mut sections = vec![section("ERA", &ctx.era.framing())];

    if let Some(prior) = article.prior_context() {
        sections.push(section(
            "PREVIOUS STORY",
            &format!(
                "This article continues an earlier story. Readers remember it and react to the \
                 development, not to a fresh event.\n{prior}"
            ),
        ));
    }

    sections.push(section("ARTICLE", &article_metadata(article)));
    sections.push(section("MODES", &ctx.mode_section()));
    sections.push(section(
        "OUTPUT REQUIREMENTS",
        &output_requirements(&article.indicators()),
    ));

    sections.join("\n\n")
}

fn reply_guidance(
    article: &Article,
    ctx: &SimulationContext,
    comment: &Comment,
    reply_text: &str,
) -> String {
    let perception = ctx
        .modes
        .iter()
        .map(|m| format!("- {}: {}", m.label(), m.framing()))
        .collect::<Vec<_>>()
        .join("\n");
    let banned = BANNED_VOCABULARY
        .iter()
        .map(|b| format!("- {b}"))
        .collect::<Vec<_>>()
        .join("\n");

    let thread = format!(
        "Article: \"{title}\" by {author}\n\nOriginal comment on {platform} by {username}:\n\"{comment}\"\n\nThe article's author, {author}, replied:\n\"{reply}\"",
        title = article.title,
        author = article.author,
        platform = comment.platform,
        username = comment.username,
        comment = comment.content,
        reply = truncate_to_char_boundary(reply_text.trim(), MAX_REPLY_BYTES),
    );

    [
        section("ERA", &ctx.era.framing()),
        section("MODES", &perception),
        section("THREAD", &thread),
        section(
            "TASK",
            &format!(
                "Write 1-2 replies reacting to the author's reply, in the voice and slang of \
                 {platform}. One may come from the original commenter ({username}), others from \
                 bystanders. Keep each reply under 200 characters. likes is a non-negative integer.",
                platform = comment.platform,
                username = comment.username,
            ),
        ),
        section(
            "HARD RULES",
            &format!("Never use any of the following, even censored or paraphrased:\n{banned}"),
        ),
    ]
    .join("\n\n")
}

fn article_metadata(article: &Article) -> String {
    let content = truncate_to_char_boundary(article.content.trim(), MAX_ARTICLE_BYTES);
    format!(
        "Title: {title}\nCategory: {category}\nAuthor: {author}\nPublished: {published}\n\n{content}",
        title = article.title,
        category = article.category,
        author = article.author,
        published = article.timestamp.format("%Y-%m-%d %H:%M UTC"),
    )
}

fn output_requirements(indicators: &[String]) -> String {
    let indicator_list = indicators.join(", ");
    format!(
        r#"1. viralityScore, reliabilityScore, controversyScore: integers from 0 to 100.
2. publicSentiment: a short label for the overall mood (e.g. "Outraged", "Divided", "Supportive").
3. editorFeedback: blunt feedback from the editor-in-chief to the author, 2-3 sentences.
4. impactSummary: 2-3 sentences on the article's wider impact.
5. predictedViews, predictedShares: non-negative integer estimates.
6. comments: 8-12 comments spread across the reaction channels listed in the ERA section. Use those channel names verbatim in `platform`. sentiment is one of positive, negative, neutral. replies holds 0-2 short replies each.
7. otherMediaCoverage: 3-5 rival outlets of the same era, each with a headline in its own house style.
8. stockAnalysis: exactly one entry per indicator, in this order: {indicator_list}. chartData has 7 points from market open to close labelled by time of day. startValue equals the first point and endValue the last. affectedSectors lists 3-5 sectors with percent change, positive meaning the sector rose; their overall direction must agree with endValue - startValue. commentary explains the move in one or two sentences.
9. extraIndices: nationalAnxiety, economicStability, angerIndex, integers from 0 to 100."#
    )
}

fn section(title: &str, body: &str) -> String {
    format!("=== {title} ===\n{body}")
}
