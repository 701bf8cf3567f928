//! Typed schemas for language-analysis responses.
//!
//! Model output is untrusted: it may arrive wrapped in markdown fences, with
//! prose around the JSON, with lists of objects where strings were asked for,
//! or with fields missing. Everything is coerced here, at the boundary, so the
//! rest of the pipeline only ever sees the typed structs below.

use std::sync::OnceLock;

use killswitch_core::{ClassifiedItem, Competitor, LandingPageDraft};
use regex::Regex;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::traits::{AnalysisKind, AnalysisRequest};

const MAX_THEMES: usize = 5;
const MAX_QUOTES: usize = 5;
/// Items included in a pain-analysis prompt.
const MAX_PROMPT_ITEMS: usize = 50;

const ANALYST_SYSTEM: &str =
    "You are an expert business analyst evaluating market problems. Respond with JSON only.";
const COPYWRITER_SYSTEM: &str =
    "You are a conversion copywriter for early-stage products. Respond with JSON only.";

// ---------------------------------------------------------------------------
// Wrapping and coercion
// ---------------------------------------------------------------------------

fn fence_open() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```(?:json|JSON)?\s*").expect("fence pattern is valid"))
}

fn fence_close() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*```\s*$").expect("fence pattern is valid"))
}

/// Remove markdown code fences around a JSON payload.
pub fn strip_json_wrapping(raw: &str) -> &str {
    let trimmed = raw.trim();
    let start = fence_open().find(trimmed).map_or(0, |m| m.end());
    let body = &trimmed[start..];
    let end = fence_close().find(body).map_or(body.len(), |m| m.start());
    body[..end].trim()
}

/// Parse a model response into `T`.
///
/// Tries the unwrapped text first, then the outermost `{...}` span, so
/// responses with a sentence of preamble still parse.
pub fn parse_lenient<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let body = strip_json_wrapping(raw);
    if body.is_empty() {
        return Err(ProviderError::Parse("empty response".to_string()));
    }
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(first) => match (body.find('{'), body.rfind('}')) {
            (Some(open), Some(close)) if open < close => {
                serde_json::from_str(&body[open..=close]).map_err(ProviderError::from)
            }
            _ => Err(first.into()),
        },
    }
}

const TEXT_KEYS: &[&str] = &["text", "theme", "name", "quote", "title", "description", "gap"];

fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => TEXT_KEYS
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(|s| s.trim().to_string())?,
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn flatten_texts(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Array(_) => flatten_texts(item, out),
                    other => out.extend(value_to_text(other)),
                }
            }
        }
        // Platform-keyed maps such as {"LinkedIn": [...], "Twitter": [...]}.
        Value::Object(map) if value_to_text(value).is_none() => {
            for v in map.values() {
                flatten_texts(v, out);
            }
        }
        other => out.extend(value_to_text(other)),
    }
}

/// Accept a string, a list of strings, a list of objects or a keyed map of lists.
fn string_list<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Vec<String>, D::Error> {
    let value = Value::deserialize(de)?;
    let mut out = Vec::new();
    flatten_texts(&value, &mut out);
    Ok(out)
}

fn lenient_text<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<String, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(value_to_text(&value).unwrap_or_default())
}

/// Accept `49`, `49.0`, `"49"` or `"$49/mo"`.
fn lenient_price<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<f64>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let digits: String = s
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
                .filter(|c| *c != ',')
                .collect();
            digits.parse().ok()
        }
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Pain analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PainAnalysis {
    #[serde(default, deserialize_with = "string_list")]
    pub themes: Vec<String>,
    #[serde(default, alias = "sample_quotes", alias = "quotes", deserialize_with = "string_list")]
    pub key_quotes: Vec<String>,
    #[serde(default, alias = "analysis_summary", deserialize_with = "lenient_text")]
    pub summary: String,
}

pub fn parse_pain_analysis(raw: &str) -> Result<PainAnalysis> {
    let mut analysis: PainAnalysis = parse_lenient(raw)?;
    analysis.themes.truncate(MAX_THEMES);
    analysis.key_quotes.truncate(MAX_QUOTES);
    Ok(analysis)
}

pub fn pain_analysis_request(problem: &str, items: &[ClassifiedItem]) -> AnalysisRequest {
    let snippets: Vec<Value> = items
        .iter()
        .filter(|c| c.tier.level() > 0)
        .take(MAX_PROMPT_ITEMS)
        .map(|c| {
            serde_json::json!({
                "text": c.item.text,
                "source": c.item.source,
                "tier": c.tier.level(),
            })
        })
        .collect();
    let snippets = serde_json::to_string_pretty(&snippets).unwrap_or_else(|_| "[]".to_string());

    AnalysisRequest {
        kind: AnalysisKind::PainThemes,
        system: ANALYST_SYSTEM.to_string(),
        prompt: format!(
            "Analyze these complaints about: {problem}\n\n{snippets}\n\n\
             Identify the top 3-5 recurring pain themes and up to 5 quotes that best show the \
             pain. Return only JSON:\n\
             {{\"themes\": [\"...\"], \"key_quotes\": [\"...\"], \"analysis_summary\": \"...\"}}"
        ),
    }
}

// ---------------------------------------------------------------------------
// Competitor analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct CompetitorWire {
    #[serde(default, alias = "title", deserialize_with = "lenient_text")]
    name: String,
    #[serde(default, alias = "link")]
    url: Option<String>,
    #[serde(default, alias = "snippet", deserialize_with = "lenient_text")]
    description: String,
    #[serde(default, alias = "price", deserialize_with = "lenient_price")]
    monthly_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CompetitorAnalysisWire {
    #[serde(default, alias = "top_competitors")]
    competitors: Vec<Value>,
    #[serde(default, deserialize_with = "string_list")]
    gaps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompetitorAnalysis {
    pub competitors: Vec<Competitor>,
    pub gaps: Vec<String>,
}

/// Competitors may arrive as objects or as bare names; malformed entries are skipped.
pub fn parse_competitors(raw: &str) -> Result<CompetitorAnalysis> {
    let wire: CompetitorAnalysisWire = parse_lenient(raw)?;
    let competitors = wire
        .competitors
        .into_iter()
        .filter_map(|value| match value {
            Value::String(name) if !name.trim().is_empty() => {
                Some(Competitor::new(name.trim(), String::new()))
            }
            Value::Object(_) => serde_json::from_value::<CompetitorWire>(value)
                .ok()
                .filter(|w| !w.name.is_empty())
                .map(|w| Competitor {
                    name: w.name,
                    url: w.url,
                    description: w.description,
                    monthly_price: w.monthly_price,
                }),
            _ => None,
        })
        .collect();
    Ok(CompetitorAnalysis {
        competitors,
        gaps: wire.gaps,
    })
}

pub fn competitor_analysis_request(
    problem: &str,
    themes: &[String],
    competitors: &[Competitor],
) -> AnalysisRequest {
    let listing = serde_json::to_string_pretty(competitors).unwrap_or_else(|_| "[]".to_string());
    AnalysisRequest {
        kind: AnalysisKind::Competitors,
        system: ANALYST_SYSTEM.to_string(),
        prompt: format!(
            "Problem: {problem}\nPain themes: {}\n\nCompetitors found:\n{listing}\n\n\
             List the gaps current solutions leave open for these pain themes, and any \
             competitors with a known monthly price. Return only JSON:\n\
             {{\"competitors\": [{{\"name\": \"...\", \"monthly_price\": 0}}], \"gaps\": [\"...\"]}}",
            themes.join(", ")
        ),
    }
}

// ---------------------------------------------------------------------------
// Landing page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
struct LandingPageWire {
    #[serde(default, deserialize_with = "lenient_text")]
    headline: String,
    #[serde(default, deserialize_with = "lenient_text")]
    subheadline: String,
    #[serde(default, deserialize_with = "string_list")]
    benefits: Vec<String>,
    #[serde(default, alias = "cta_text", alias = "cta", deserialize_with = "lenient_text")]
    call_to_action: String,
    #[serde(default, alias = "posts", deserialize_with = "string_list")]
    social_posts: Vec<String>,
}

/// A draft without a headline is rejected so the caller falls back.
pub fn parse_landing_page(raw: &str) -> Result<LandingPageDraft> {
    let wire: LandingPageWire = parse_lenient(raw)?;
    if wire.headline.is_empty() {
        return Err(ProviderError::Parse("landing page has no headline".to_string()));
    }
    Ok(LandingPageDraft {
        headline: wire.headline,
        subheadline: wire.subheadline,
        benefits: wire.benefits,
        call_to_action: wire.call_to_action,
        social_posts: wire.social_posts,
    })
}

pub fn landing_page_request(
    problem: &str,
    audience: &str,
    pain_points: &[String],
    gaps: &[String],
) -> AnalysisRequest {
    AnalysisRequest {
        kind: AnalysisKind::LandingPage,
        system: COPYWRITER_SYSTEM.to_string(),
        prompt: format!(
            "Write landing page copy for a solution to: {problem}\nTarget audience: {audience}\n\
             Pain points: {}\nGaps to highlight: {}\n\n\
             Return only JSON:\n\
             {{\"headline\": \"...\", \"subheadline\": \"...\", \"benefits\": [\"...\", \"...\", \"...\"], \
             \"cta_text\": \"...\", \"social_posts\": [\"...\"]}}",
            pain_points.join("; "),
            gaps.join("; ")
        ),
    }
}
