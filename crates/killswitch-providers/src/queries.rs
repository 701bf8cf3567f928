//! Search query construction.

use std::sync::OnceLock;

use killswitch_core::DerivedContext;
use regex::Regex;

/// Longest search term used verbatim; longer problems are reduced to key words.
const MAX_TERM_CHARS: usize = 50;
const MAX_KEY_WORDS: usize = 5;
/// Pain themes folded into competitor queries.
const MAX_THEME_QUERIES: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "with", "for", "to", "that", "which", "gives", "provides",
    "of", "in", "on", "is", "are", "i", "my", "our", "their", "who",
];

const COMPLAINT_TEMPLATES: &[&str] = &[
    "{} frustrated reddit",
    "{} annoying reddit",
    "{} problem reddit",
    "{} help reddit",
    "{} problem quora",
    "{} frustrating forum",
    "{} issue discussion",
    "{} review negative",
    "{} cons downsides",
    "{} complaints",
    "{} alternative",
    "{} better than",
    "switching from {}",
    "{} waste time",
    "{} waste money",
    "{} biggest problem",
    "{} not working",
    "{} difficult to use",
];

const COMPETITOR_TEMPLATES: &[&str] = &[
    "{} software",
    "{} tools",
    "{} platform",
    "{} app",
    "{} pricing",
    "best {}",
    "{} alternatives",
    "{} competitors",
];

fn solution_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"i want to (?:make|build|create|develop) (?:a |an )?(.+)",
            r"(?:web app|app|platform|tool|software|system) for (.+?) (?:that|which)",
            r"solution for (.+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("solution pattern is valid"))
        .collect()
    })
}

fn fill(template: &str, term: &str) -> String {
    template.replacen("{}", term, 1)
}

/// Reduce a long phrase to its first few meaningful words.
fn key_words(text: &str) -> String {
    let cleaned = text.trim().trim_end_matches(&['.', '!', '?'][..]);
    if cleaned.chars().count() <= MAX_TERM_CHARS {
        return cleaned.to_string();
    }
    cleaned
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .take(MAX_KEY_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Core subject of a problem statement, with "I want to build..." phrasing removed.
pub fn search_base(problem: &str) -> String {
    let lower = problem.to_lowercase();
    let subject = solution_patterns()
        .iter()
        .find_map(|re| re.captures(&lower).and_then(|c| c.get(1)))
        .map(|m| m.as_str().to_string())
        .unwrap_or(lower);
    key_words(&subject)
}

/// Queries aimed at complaint-bearing discussions about the problem.
pub fn complaint_queries(problem: &str) -> Vec<String> {
    let term = search_base(problem);
    if term.is_empty() {
        return Vec::new();
    }
    COMPLAINT_TEMPLATES.iter().map(|t| fill(t, &term)).collect()
}

/// Queries aimed at existing paid solutions, steered by the pain themes
/// carried forward from the previous stage.
pub fn competitor_queries(problem: &str, context: &DerivedContext) -> Vec<String> {
    let base = search_base(problem);
    if base.is_empty() {
        return Vec::new();
    }
    let mut queries: Vec<String> = COMPETITOR_TEMPLATES.iter().map(|t| fill(t, &base)).collect();
    for theme in context.themes.iter().take(MAX_THEME_QUERIES) {
        let theme = key_words(&theme.to_lowercase());
        if theme.is_empty() {
            continue;
        }
        let query = format!("{theme} software pricing");
        if !queries.contains(&query) {
            queries.push(query);
        }
    }
    queries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_problem_used_verbatim() {
        let queries = complaint_queries("invoice reconciliation");
        assert_eq!(queries.len(), COMPLAINT_TEMPLATES.len());
        assert_eq!(queries[0], "invoice reconciliation frustrated reddit");
        assert!(queries.contains(&"switching from invoice reconciliation".to_string()));
    }

    #[test]
    fn test_long_problem_reduced_to_key_words() {
        let base = search_base(
            "Freelancers waste hours every single month reconciling invoices with their bank feeds",
        );
        assert_eq!(base, "freelancers waste hours every single");
    }

    #[test]
    fn test_solution_phrasing_is_stripped() {
        assert_eq!(
            search_base("I want to build a tool for tracking freelance invoices"),
            "tool for tracking freelance invoices"
        );
        assert_eq!(
            search_base("A solution for dentists scheduling"),
            "dentists scheduling"
        );
    }

    #[test]
    fn test_competitor_queries_include_themes() {
        let ctx = DerivedContext {
            themes: vec!["Manual data entry".into(), "Slow bank sync".into()],
            gaps: vec![],
        };
        let queries = competitor_queries("invoice reconciliation", &ctx);
        assert_eq!(queries[0], "invoice reconciliation software");
        assert!(queries.contains(&"manual data entry software pricing".to_string()));
        assert!(queries.contains(&"slow bank sync software pricing".to_string()));
        assert_eq!(queries.len(), COMPETITOR_TEMPLATES.len() + 2);
    }

    #[test]
    fn test_empty_problem_yields_no_queries() {
        assert!(complaint_queries("   ").is_empty());
        assert!(competitor_queries("", &DerivedContext::default()).is_empty());
    }
}
