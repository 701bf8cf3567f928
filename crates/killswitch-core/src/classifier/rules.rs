//! Tier rules and the lexical signals they are built from.
//!
//! Each [`TierRule`] is an independent predicate over a snippet. The
//! [`Classifier`](super::Classifier) walks its rules in order and the first
//! match decides the tier. Signal helpers are public so every lexicon can be
//! tested and tuned in isolation.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::Tier;

// ---------------------------------------------------------------------------
// Lexicons
// ---------------------------------------------------------------------------

const PROMOTIONAL: &[&str] = &[
    "buy now",
    "limited offer",
    "limited time offer",
    "discount code",
    "promo code",
    "coupon code",
    "use code",
    "affiliate",
    "sponsored",
    "advertisement",
    "press release",
];

const TUTORIAL: &[&str] = &[
    "tutorial",
    "step-by-step",
    "step by step",
    "ultimate guide",
    "complete guide",
    "beginner's guide",
    "walkthrough",
];

const STRONG_NEGATIVE: &[&str] = &[
    "hate",
    "hated",
    "hates",
    "worst",
    "lost",
    "lose",
    "losing",
    "wasted",
    "waste",
    "wasting",
    "nightmare",
    "terrible",
    "horrible",
    "awful",
    "disaster",
    "ruined",
];

const ALTERNATIVE_SEEKING: &[&str] = &[
    "looking for alternative",
    "looking for alternatives",
    "looking for an alternative",
    "alternative to",
    "alternatives to",
    "switching from",
    "switched from",
    "switch away from",
    "moving away from",
    "replacement for",
    "too expensive",
    "overpriced",
    "cancel my subscription",
    "cancelled my subscription",
    "canceled my subscription",
];

const PROBLEM_STATEMENT: &[&str] = &[
    "doesn't work",
    "does not work",
    "not working",
    "stopped working",
    "broken",
    "frustrated",
    "frustrating",
    "annoying",
    "annoyed",
    "struggling",
    "struggle with",
    "problem with",
    "issue with",
    "fed up",
    "can't stand",
    "sick of",
    "tired of",
    "buggy",
    "unusable",
    "keeps crashing",
    "disappointed",
    "useless",
];

const MILD_REQUEST: &[&str] = &[
    "how do i",
    "how to",
    "how can i",
    "how do you",
    "is there a way",
    "is it possible",
    "would be nice",
    "it'd be nice",
    "i wish",
    "feature request",
    "any tips",
    "any advice",
    "any recommendations",
    "does anyone know",
    "what's the best",
    "what is the best",
    "can someone explain",
];

const EMOTIONAL: &[&str] = &[
    "hate",
    "furious",
    "worst",
    "awful",
    "terrible",
    "horrible",
    "ridiculous",
    "insane",
    "sick of",
    "fed up",
    "damn",
    "dammit",
    "wtf",
    "sucks",
    "crap",
    "hell",
    "nightmare",
    "pissed",
    "livid",
    "infuriating",
];

const URGENT: &[&str] = &[
    "need a fix",
    "need a solution",
    "need help",
    "need this fixed",
    "asap",
    "urgent",
    "urgently",
    "anyone solved",
    "has anyone solved",
    "anyone found a",
    "any workaround",
    "any solution",
    "right now",
    "immediately",
    "desperate",
    "desperately",
    "as soon as possible",
];

fn build_lexicon(words: &[&str]) -> Regex {
    let alternatives = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternatives})\b")).expect("lexicon pattern is valid")
}

macro_rules! lexicon {
    ($fn_name:ident, $words:expr) => {
        fn $fn_name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| build_lexicon($words))
        }
    };
}

lexicon!(promotional, PROMOTIONAL);
lexicon!(tutorial, TUTORIAL);
lexicon!(strong_negative, STRONG_NEGATIVE);
lexicon!(alternative_seeking, ALTERNATIVE_SEEKING);
lexicon!(problem_statement, PROBLEM_STATEMENT);
lexicon!(mild_request, MILD_REQUEST);
lexicon!(emotional, EMOTIONAL);
lexicon!(urgent, URGENT);

fn currency_amount() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:[$€£]\s?\d[\d,]*(?:\.\d+)?\s?[km]?\b|\b\d[\d,]*(?:\.\d+)?\s?k?\s?(?:usd|dollars|bucks|eur|euros|gbp|pounds)\b)",
        )
        .expect("currency pattern is valid")
    })
}

fn time_duration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:\d+(?:\.\d+)?\+?|one|two|three|four|five|six|seven|eight|nine|ten|twelve|several|countless)\s?(?:hours?|hrs?|minutes?|mins?|days?|weeks?|months?|years?)\b",
        )
        .expect("duration pattern is valid")
    })
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Text mentions a currency amount (`$500`, `2k dollars`, `€40`).
pub fn has_currency_amount(text: &str) -> bool {
    currency_amount().is_match(text)
}

/// Text mentions an explicit time duration (`3 hours`, `two weeks`).
pub fn has_time_duration(text: &str) -> bool {
    time_duration().is_match(text)
}

/// Measurable impact: a currency amount or an explicit duration.
pub fn has_quantified_loss(text: &str) -> bool {
    has_currency_amount(text) || has_time_duration(text)
}

pub fn has_strong_negative(text: &str) -> bool {
    strong_negative().is_match(text)
}

pub fn is_promotional(text: &str) -> bool {
    promotional().is_match(text)
}

pub fn is_tutorial(text: &str) -> bool {
    tutorial().is_match(text)
}

pub fn seeks_alternative(text: &str) -> bool {
    alternative_seeking().is_match(text)
}

pub fn states_problem(text: &str) -> bool {
    problem_statement().is_match(text) || has_strong_negative(text)
}

pub fn is_mild_request(text: &str) -> bool {
    mild_request().is_match(text)
}

/// Upper-case technical terms that carry no emphasis.
const ACRONYMS: &[&str] = &[
    "HTML", "HTTP", "HTTPS", "JSON", "YAML", "REST", "AJAX", "OAUTH", "SAAS", "SMTP", "IMAP",
    "CRUD", "UUID", "ASAP", "NASA", "GDPR", "HIPAA", "AWS", "API", "CSV", "PDF", "SQL", "USB",
    "WIFI", "IOS", "MACOS", "LINUX", "SDK", "CRM", "ERP",
];

/// Fully upper-case words of four or more letters, known acronyms excluded.
fn shouted_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphabetic()).filter(|w| {
        w.chars().count() >= 4
            && w.chars().all(|c| c.is_uppercase())
            && !ACRONYMS.contains(w)
    })
}

/// Two shouted words, or one shouted word in a text that ends with `!`.
pub fn has_caps_emphasis(text: &str) -> bool {
    match shouted_words(text).count() {
        0 => false,
        1 => text.trim_end().ends_with('!'),
        _ => true,
    }
}

/// Two consecutive exclamation marks, or three anywhere.
pub fn has_exclamation_cluster(text: &str) -> bool {
    text.contains("!!") || text.matches('!').count() >= 3
}

/// Strong language, caps emphasis, or exclamation clustering.
pub fn is_emotional(text: &str) -> bool {
    emotional().is_match(text) || has_caps_emphasis(text) || has_exclamation_cluster(text)
}

/// Forward-looking, solution-seeking phrasing.
pub fn is_urgent(text: &str) -> bool {
    urgent().is_match(text)
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A single classification rule: a predicate plus the tier it assigns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TierRule {
    /// Commercial solicitation (ads, affiliate posts, press releases).
    Promotional,
    /// Quantified loss combined with strong negative sentiment.
    QuantifiedLoss,
    /// Looking for alternatives, price objections, switching away.
    AlternativeSeeking,
    /// A clear problem statement without quantified loss.
    ProblemStatement,
    /// Tutorials and guides; suppresses the question rule below it.
    Tutorial,
    /// Mild question or feature request.
    MildRequest,
}

impl TierRule {
    /// The standard rule order. Tier 0 guards sit in front of the rules they
    /// would otherwise be mistaken for; complaint rules run highest tier first.
    pub const STANDARD: [TierRule; 6] = [
        TierRule::Promotional,
        TierRule::QuantifiedLoss,
        TierRule::AlternativeSeeking,
        TierRule::ProblemStatement,
        TierRule::Tutorial,
        TierRule::MildRequest,
    ];

    /// Tier assigned when this rule matches.
    pub fn tier(&self) -> Tier {
        match self {
            TierRule::Promotional | TierRule::Tutorial => Tier::NotComplaint,
            TierRule::QuantifiedLoss => Tier::HighImpact,
            TierRule::AlternativeSeeking | TierRule::ProblemStatement => Tier::Moderate,
            TierRule::MildRequest => Tier::LowValue,
        }
    }

    /// Whether this rule matches the given text.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            TierRule::Promotional => is_promotional(text),
            TierRule::QuantifiedLoss => has_quantified_loss(text) && has_strong_negative(text),
            TierRule::AlternativeSeeking => seeks_alternative(text),
            TierRule::ProblemStatement => states_problem(text),
            TierRule::Tutorial => is_tutorial(text),
            TierRule::MildRequest => is_mild_request(text),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TierRule::Promotional => "promotional",
            TierRule::QuantifiedLoss => "quantified_loss",
            TierRule::AlternativeSeeking => "alternative_seeking",
            TierRule::ProblemStatement => "problem_statement",
            TierRule::Tutorial => "tutorial",
            TierRule::MildRequest => "mild_request",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_amounts() {
        assert!(has_currency_amount("we lost $5,000 last quarter"));
        assert!(has_currency_amount("paying 200 dollars a month"));
        assert!(has_currency_amount("it cost me €40"));
        assert!(has_currency_amount("burned $2k on this"));
        assert!(!has_currency_amount("version 2 is out"));
    }

    #[test]
    fn test_time_durations() {
        assert!(has_time_duration("I waste 3 hours every day"));
        assert!(has_time_duration("took two weeks to migrate"));
        assert!(has_time_duration("10+ hours a week"));
        assert!(!has_time_duration("every single time"));
    }

    #[test]
    fn test_strong_negative_respects_word_boundaries() {
        assert!(has_strong_negative("I hate this"));
        assert!(has_strong_negative("worst purchase"));
        assert!(!has_strong_negative("whatever works for you"));
        assert!(!has_strong_negative("closet organiser"));
    }

    #[test]
    fn test_quantified_loss_needs_both_signals() {
        assert!(TierRule::QuantifiedLoss.matches("Lost $5k due to this bug"));
        assert!(TierRule::QuantifiedLoss.matches("I wasted 3 hours on invoices again"));
        assert!(!TierRule::QuantifiedLoss.matches("It costs $50 per month"));
        assert!(!TierRule::QuantifiedLoss.matches("I hate invoicing"));
    }

    #[test]
    fn test_alternative_seeking() {
        assert!(TierRule::AlternativeSeeking.matches("Looking for alternative to QuickBooks"));
        assert!(TierRule::AlternativeSeeking.matches("Switching from Trello, it is too expensive"));
        assert!(!TierRule::AlternativeSeeking.matches("QuickBooks is great"));
    }

    #[test]
    fn test_problem_statement() {
        assert!(TierRule::ProblemStatement.matches("The sync feature is broken"));
        assert!(TierRule::ProblemStatement.matches("so frustrating to reconcile"));
        assert!(TierRule::ProblemStatement.matches("worst onboarding ever"));
        assert!(!TierRule::ProblemStatement.matches("works nicely for us"));
    }

    #[test]
    fn test_mild_request() {
        assert!(TierRule::MildRequest.matches("How do I export invoices?"));
        assert!(TierRule::MildRequest.matches("Would be nice if it had dark mode"));
        assert!(!TierRule::MildRequest.matches("Shipped a new release today"));
    }

    #[test]
    fn test_promotional_and_tutorial_guards() {
        assert!(TierRule::Promotional.matches("Use code SAVE20 - buy now!"));
        assert!(TierRule::Promotional.matches("Sponsored: the best CRM"));
        assert!(TierRule::Tutorial.matches("How to set up invoicing: a step-by-step tutorial"));
        assert!(!TierRule::Promotional.matches("I hate this CRM"));
    }

    #[test]
    fn test_emotional_markers() {
        assert!(is_emotional("this is a nightmare"));
        assert!(is_emotional("this is SLOW and BROKEN again"));
        assert!(is_emotional("please fix!!"));
        assert!(is_emotional("fix it! now! please!"));
        assert!(!is_emotional("The API is slow."));
        assert!(!is_emotional("Could you help?"));
    }

    #[test]
    fn test_caps_emphasis_ignores_acronyms() {
        assert!(!has_caps_emphasis("The JSON export breaks our HTML templates over HTTPS"));
        assert!(!is_emotional("Our OAUTH flow fails with a CSV upload"));
        // A single shouted word needs a closing exclamation.
        assert!(!has_caps_emphasis("the sync is BROKEN again"));
        assert!(has_caps_emphasis("the sync is BROKEN again!"));
        assert!(has_caps_emphasis("NEVER AGAIN will I use this"));
        assert!(has_caps_emphasis("JSON parsing is NEVER EVER fixed"));
    }

    #[test]
    fn test_urgency_markers() {
        assert!(is_urgent("need a fix now"));
        assert!(is_urgent("Has anyone solved this?"));
        assert!(is_urgent("need help ASAP"));
        assert!(!is_urgent("it was slow last year"));
    }

    #[test]
    fn test_rule_tiers() {
        assert_eq!(TierRule::QuantifiedLoss.tier(), Tier::HighImpact);
        assert_eq!(TierRule::AlternativeSeeking.tier(), Tier::Moderate);
        assert_eq!(TierRule::ProblemStatement.tier(), Tier::Moderate);
        assert_eq!(TierRule::MildRequest.tier(), Tier::LowValue);
        assert_eq!(TierRule::Promotional.tier(), Tier::NotComplaint);
        assert_eq!(TierRule::Tutorial.tier(), Tier::NotComplaint);
    }
}
