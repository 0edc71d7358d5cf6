use std::path::{Path, PathBuf};

use ai_client::OpenAi;
use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use echoroom_common::config::DEFAULT_MODEL;
use echoroom_common::{Article, Config, SimulationResult};
use echoroom_sim::{
    classify, Conversation, ConversationSession, PlatformFamily, PlatformFilter, RequestBuilder,
    SimulationContext, SimulationHistory, Simulator,
};

#[derive(Parser)]
#[command(name = "echoroom")]
#[command(about = "Simulate how the public reacts to a news article")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and print the result
    Simulate {
        /// Article JSON file
        article: PathBuf,

        /// Travel to this year (enables time machine mode)
        #[arg(long)]
        year: Option<i32>,

        /// Only show comments from one platform family
        #[arg(long, value_enum)]
        platform: Option<FamilyArg>,

        /// Reply as the author to the Nth shown comment
        #[arg(long, requires = "reply")]
        reply_to: Option<usize>,

        /// Reply text
        #[arg(long, requires = "reply_to")]
        reply: Option<String>,

        /// Print the archived entry as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Print the assembled request without calling the model
    Prompt {
        /// Article JSON file
        article: PathBuf,

        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FamilyArg {
    Social,
    Female,
    Male,
    Anonymous,
    Portal,
    Legacy,
}

impl From<FamilyArg> for PlatformFilter {
    fn from(arg: FamilyArg) -> Self {
        PlatformFilter::Family(match arg {
            FamilyArg::Social => PlatformFamily::IntegratedSocial,
            FamilyArg::Female => PlatformFamily::FemaleCommunity,
            FamilyArg::Male => PlatformFamily::MaleCommunity,
            FamilyArg::Anonymous => PlatformFamily::AnonymousBoard,
            FamilyArg::Portal => PlatformFamily::NewsPortal,
            FamilyArg::Legacy => PlatformFamily::Legacy,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("echoroom=info".parse()?))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Simulate {
            article,
            year,
            platform,
            reply_to,
            reply,
            json,
        } => {
            let article = load_article(&article, year)?;
            let filter = platform.map(PlatformFilter::from).unwrap_or_default();
            let thread = reply_to.zip(reply);
            simulate(article, filter, thread, json).await
        }
        Commands::Prompt { article, year } => {
            let article = load_article(&article, year)?;
            print_prompt(&article)
        }
    }
}

async fn simulate(
    article: Article,
    filter: PlatformFilter,
    thread: Option<(usize, String)>,
    json: bool,
) -> Result<()> {
    let config = Config::from_env();
    config.log_redacted();

    let mut provider = OpenAi::new(config.openai_api_key.clone());
    if let Some(url) = &config.openai_base_url {
        provider = provider.with_base_url(url);
    }
    let simulator = Simulator::new(provider, &config);

    let mut result = simulator.submit_simulation(&article).await?;

    if let Some((index, text)) = thread {
        let session = ConversationSession::new(Conversation::from_result(&result));
        let reactions = session
            .reply_visible(&simulator, &article, filter, index, &text)
            .await?;
        info!(reactions = reactions.len(), "Reply thread updated");
        result.comments = session.snapshot().await.into_comments();
    }

    let mut history = SimulationHistory::new();
    let id = history.archive(&article, &result);

    if json {
        let entry = history.get(id).context("archived entry missing")?;
        println!("{}", serde_json::to_string_pretty(entry)?);
        return Ok(());
    }

    print_summary(&article, &result, filter);
    if let Some(follow_up) = history.continuation_context(id) {
        println!("\n--- Follow-up context ---\n{follow_up}");
    }
    Ok(())
}

fn load_article(path: &Path, year: Option<i32>) -> Result<Article> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading article from {}", path.display()))?;
    let mut article: Article = serde_json::from_str(&raw)
        .with_context(|| format!("parsing article JSON in {}", path.display()))?;

    if let Some(year) = year {
        article.modes.time_machine_mode = true;
        article.target_year = Some(year);
    }
    Ok(article)
}

fn print_prompt(article: &Article) -> Result<()> {
    let model = std::env::var("ECHOROOM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    let ctx = SimulationContext::for_article(article, Utc::now().year());
    let request = RequestBuilder::new(model).simulation(article, &ctx);

    println!("=== Model: {} ===", request.model);
    println!("\n=== System ===\n{}", request.system);
    println!("\n=== Prompt ===\n{}", request.prompt);
    println!(
        "\n=== Schema ({}) ===\n{}",
        request.schema_name,
        serde_json::to_string_pretty(&request.schema)?
    );
    Ok(())
}

fn print_summary(article: &Article, result: &SimulationResult, filter: PlatformFilter) {
    println!("\n=== {} [{}] ===", article.title, article.category);
    println!(
        "Virality: {}  |  Reliability: {}  |  Controversy: {}",
        result.virality_score, result.reliability_score, result.controversy_score
    );
    println!(
        "Views: {}  |  Shares: {}  |  Sentiment: {}",
        result.predicted_views, result.predicted_shares, result.public_sentiment
    );
    println!("\nEditor: {}", result.editor_feedback);
    println!("Impact: {}", result.impact_summary);

    if let Some(extra) = &result.extra_indices {
        println!(
            "\nAnxiety: {}  |  Economic stability: {}  |  Anger: {}",
            extra.national_anxiety, extra.economic_stability, extra.anger_index
        );
    }

    println!("\n--- Comments ---");
    let conversation = Conversation::from_result(result);
    for (shown, (_, comment)) in conversation.visible(filter).into_iter().enumerate() {
        println!(
            "[{shown}] {} ({:?}) @{} +{} {:?}",
            comment.platform,
            classify(&comment.platform),
            comment.username,
            comment.likes,
            comment.sentiment
        );
        println!("    {}", comment.content);
        for reply in &comment.replies {
            println!("      ↳ @{}: {}", reply.username, reply.content);
        }
    }

    if !result.other_media_coverage.is_empty() {
        println!("\n--- Other outlets ---");
        for coverage in &result.other_media_coverage {
            println!("{}: {}", coverage.outlet, coverage.headline);
        }
    }

    for stock in result.stock_analysis.iter().flatten() {
        let percent = stock
            .change_percent()
            .map(|p| format!(" ({p:+.2}%)"))
            .unwrap_or_default();
        println!(
            "\n--- {} {} {:.2} → {:.2}{percent} ---",
            stock.index_name,
            stock.trend().marker(),
            stock.start_value,
            stock.end_value
        );
        for sector in &stock.affected_sectors {
            println!("  {} {} {:+.2}%", sector.trend().marker(), sector.name, sector.change);
        }
        println!("  {}", stock.commentary);
    }
}
