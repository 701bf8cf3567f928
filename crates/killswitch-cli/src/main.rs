//! Kill Switch CLI
//!
//! The `killswitch` command runs business ideas through four validation gates
//! and stops at the first one that fails.
//!
//! ## Commands
//!
//! - `validate`: Run a full session against live search and analysis services
//! - `score`: Classify and score an offline complaint corpus
//! - `profiles`: Show the threshold profiles in effect
//! - `export`: Render a saved session report
//! - `survey`: Print the willingness-to-pay survey for an idea

mod input;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use killswitch_core::{
    evaluate_all, init_tracing, score, Classifier, ProfileConfig, ProfileCriteria, ProfileName,
    PricingInput, ProfileRegistry, ScoringResult, SessionReport, SurveyDefinition, TierReport,
};
use killswitch_pipeline::{Collaborators, ValidationPipeline};
use killswitch_providers::{AnthropicClient, ProviderSettings, SearchCache, SerperClient};
use serde::Serialize;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "killswitch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kill bad business ideas early with staged, evidence-based gates", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Threshold configuration file (TOML)
    #[arg(long, global = true, env = "KILLSWITCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an idea through the pain, market, content and pricing gates
    Validate {
        /// Problem statement (10-500 characters)
        #[arg(short, long)]
        problem: String,

        /// Target audience (5-200 characters)
        #[arg(short, long)]
        audience: String,

        /// Threshold profile: easy, medium or difficult
        #[arg(long, env = "KILLSWITCH_PROFILE")]
        profile: Option<ProfileName>,

        /// Survey answers: JSON array of answers or response objects, or one answer per line
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Write the session report to this path (JSON)
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[arg(long, env = "SERPER_API_KEY", hide_env_values = true)]
        serper_key: Option<String>,

        #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
        anthropic_key: Option<String>,

        /// Analysis model override
        #[arg(long)]
        model: Option<String>,

        /// Results requested per search query
        #[arg(long, default_value = "10")]
        result_limit: usize,

        /// Search queries in flight at once
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Retrieval deadline per stage, in seconds
        #[arg(long, default_value = "120")]
        deadline_secs: u64,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Classify and score a saved corpus without calling any service
    Score {
        /// Corpus file: JSON array of texts or {text, url, source} items, or one text per line
        corpus: PathBuf,

        /// Evaluate against a single profile instead of all three
        #[arg(long, env = "KILLSWITCH_PROFILE")]
        profile: Option<ProfileName>,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Show threshold profiles and stage thresholds
    Profiles {
        /// Print the effective configuration as TOML
        #[arg(long)]
        toml: bool,
    },

    /// Render a saved session report
    Export {
        /// Session report produced by `validate --out`
        session: PathBuf,

        /// Write a normalized copy of the report here
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Print the willingness-to-pay survey to send to prospects
    Survey {
        /// Solution named in the pricing question
        #[arg(short, long)]
        solution: String,

        /// Write the survey definition here (JSON)
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json, level);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate {
            problem,
            audience,
            profile,
            answers,
            out,
            serper_key,
            anthropic_key,
            model,
            result_limit,
            concurrency,
            deadline_secs,
            format,
        } => {
            let settings = ProviderSettings {
                result_limit,
                max_concurrent_queries: concurrency,
                stage_deadline_ms: deadline_secs.saturating_mul(1_000),
                ..ProviderSettings::default()
            };
            let keys = ApiKeys {
                serper: serper_key.unwrap_or_default(),
                anthropic: anthropic_key.unwrap_or_default(),
                model,
            };
            let profile = profile.unwrap_or(config.default_profile);
            cmd_validate(
                config,
                settings,
                keys,
                &problem,
                &audience,
                profile,
                answers.as_deref(),
                out.as_deref(),
                format,
            )
            .await
        }
        Commands::Score {
            corpus,
            profile,
            format,
        } => cmd_score(&config, &corpus, profile, format),
        Commands::Profiles { toml } => cmd_profiles(&config, toml),
        Commands::Export {
            session,
            out,
            format,
        } => cmd_export(&session, out.as_deref(), format),
        Commands::Survey {
            solution,
            out,
            format,
        } => cmd_survey(&solution, out.as_deref(), format),
    }
}

fn load_config(path: Option<&Path>) -> Result<ProfileConfig> {
    match path {
        Some(path) => ProfileConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ProfileConfig::default()),
    }
}

struct ApiKeys {
    serper: String,
    anthropic: String,
    model: Option<String>,
}

/// Run a full validation session
#[allow(clippy::too_many_arguments)]
async fn cmd_validate(
    config: ProfileConfig,
    settings: ProviderSettings,
    keys: ApiKeys,
    problem: &str,
    audience: &str,
    profile: ProfileName,
    answers: Option<&Path>,
    out: Option<&Path>,
    format: Format,
) -> Result<()> {
    let survey = match answers {
        Some(path) => input::load_answers(path)?,
        None => PricingInput::default(),
    };

    let retrieval =
        SerperClient::new(keys.serper, &settings).context("cannot build search client")?;
    let mut analysis =
        AnthropicClient::new(keys.anthropic, &settings).context("cannot build analysis client")?;
    if let Some(model) = keys.model {
        analysis = analysis.with_model(model);
    }
    let cache = Arc::new(SearchCache::new(settings.cache_ttl()));
    let collaborators =
        Collaborators::new(Arc::new(retrieval), Arc::new(analysis), settings).with_cache(cache);

    info!(profile = %profile, answers = survey.answers.len(), "starting validation");
    let session = ValidationPipeline::new(collaborators, config)
        .with_survey(survey)
        .run(problem, audience, profile)
        .await?;

    let report = SessionReport::from_session(&session);
    if let Some(path) = out {
        report
            .write_json(path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "session report written");
    }
    print_report(&report, format)
}

#[derive(Serialize)]
struct ScoreOutput<'a> {
    items: usize,
    result: &'a ScoringResult,
    report: &'a TierReport,
}

/// Score an offline corpus
fn cmd_score(
    config: &ProfileConfig,
    corpus: &Path,
    profile: Option<ProfileName>,
    format: Format,
) -> Result<()> {
    let items = input::load_corpus(corpus)?;
    let classified = Classifier::standard().classify_all(items);
    let result = score(&classified);

    let registry = ProfileRegistry::from_config(config).context("invalid profile configuration")?;
    let mut report = evaluate_all(&result, &registry);
    if let Some(name) = profile {
        report.verdicts.retain(|(n, _)| *n == name);
    }

    match format {
        Format::Json => {
            let output = ScoreOutput {
                items: classified.len(),
                result: &result,
                report: &report,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Format::Text => {
            let c = &result.tier_counts;
            println!("Items scored:       {}", classified.len());
            println!(
                "Tiers (0/1/2/3):    {}/{}/{}/{}",
                c.tier0, c.tier1, c.tier2, c.tier3
            );
            println!("Weighted score:     {:.1}", result.weighted_score);
            println!("Quality multiplier: {:.1}", result.quality_multiplier);
            println!("Effective:          {:.1}", result.effective_complaints);
            println!("Pain score:         {:.1}/10", result.pain_score);
            println!("Quality rating:     {}", result.quality_rating);
            println!(
                "Urgency/emotional:  {:.1}% / {:.1}%",
                result.urgency_pct, result.emotional_pct
            );
            println!();
            for (name, verdict) in &report.verdicts {
                let mark = if verdict.passed { "PASS" } else { "KILL" };
                println!("  {:<10} {}  {}", name.as_str(), mark, verdict.reason);
            }
            if profile.is_none() {
                match report.highest_passed {
                    Some(name) => println!("\nHighest profile passed: {name}"),
                    None => println!("\nNo profile passed"),
                }
            }
        }
    }
    Ok(())
}

fn fmt_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn print_criteria(name: ProfileName, c: &ProfileCriteria, is_default: bool) {
    let marker = if is_default { "*" } else { " " };
    println!(
        "{marker} {:<10} {:>9} {:>6} {:>8} {:>8} {:>10}",
        name.as_str(),
        fmt_opt(c.min_weighted_complaints),
        fmt_opt(c.min_pain_score),
        fmt_opt(c.min_quality_rating.map(|q| q.as_str())),
        fmt_opt(c.min_urgency_pct),
        fmt_opt(c.min_emotional_pct),
    );
}

/// Show threshold profiles
fn cmd_profiles(config: &ProfileConfig, as_toml: bool) -> Result<()> {
    if as_toml {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    println!(
        "  {:<10} {:>9} {:>6} {:>8} {:>8} {:>10}",
        "profile", "weighted", "pain", "quality", "urgency%", "emotional%"
    );
    for name in ProfileName::ALL {
        print_criteria(name, config.criteria(name), name == config.default_profile);
    }

    let m = &config.market;
    let c = &config.content;
    let p = &config.pricing;
    let w = &config.viability;
    println!();
    println!(
        "market:    >= {} paying competitors (>= ${}/mo), avg price >= ${}, opportunity >= {}",
        m.min_paying_competitors, m.paying_price_floor, m.min_avg_monthly_price, m.min_opportunity_score
    );
    println!(
        "content:   conversion >= {:.1}%, messaging >= {}",
        c.min_predicted_conversion * 100.0,
        c.min_messaging_score
    );
    println!(
        "pricing:   avg WTP >= ${}, >= {}% at or above ${}",
        p.min_avg_wtp, p.min_pct_above_floor, p.price_floor
    );
    println!(
        "viability: pain {:.2}, market {:.2}, content {:.2}, pricing {:.2}",
        w.pain, w.market, w.content, w.pricing
    );
    Ok(())
}

/// Render a saved session report
fn cmd_export(session: &Path, out: Option<&Path>, format: Format) -> Result<()> {
    let raw = std::fs::read_to_string(session)
        .with_context(|| format!("failed to read session report {}", session.display()))?;
    let report = SessionReport::from_json(&raw).context("not a session report")?;

    if let Some(path) = out {
        report
            .write_json(path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }
    print_report(&report, format)
}

/// Print the pricing survey
fn cmd_survey(solution: &str, out: Option<&Path>, format: Format) -> Result<()> {
    if solution.trim().is_empty() {
        anyhow::bail!("--solution must not be empty");
    }
    let survey = SurveyDefinition::default_for(solution);
    let json = survey.to_json()?;

    if let Some(path) = out {
        std::fs::write(path, &json)
            .with_context(|| format!("failed to write survey to {}", path.display()))?;
        info!(path = %path.display(), "survey written");
    }
    match format {
        Format::Json => println!("{json}"),
        Format::Text => print!("{}", survey.render_text()),
    }
    Ok(())
}

fn print_report(report: &SessionReport, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", report.to_json()?),
        Format::Text => {
            for line in report.summary_lines() {
                println!("{line}");
            }
            if let (Some(stage), Some(reason)) = (report.killed_at, &report.kill_reason) {
                println!("\nKilled at {stage}: {reason}");
            }
        }
    }
    Ok(())
}
