//! Input validation and text sanitisation.
//!
//! User-supplied problem and audience descriptions are validated before a
//! session starts. Retrieved snippets are sanitised before classification and
//! deduplicated by their normalized form so repeated hits from overlapping
//! queries are only scored once.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{KillSwitchError, Result};

/// Maximum length of a sanitised snippet, in characters.
pub const MAX_SANITIZED_CHARS: usize = 1000;

const PROBLEM_MIN_CHARS: usize = 10;
const PROBLEM_MAX_CHARS: usize = 500;
const AUDIENCE_MIN_CHARS: usize = 5;
const AUDIENCE_MAX_CHARS: usize = 200;

fn script_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("script pattern is valid")
    })
}

fn html_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"))
}

fn meaningful_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z]{3,}").expect("word pattern is valid"))
}

/// Strip script blocks and HTML tags, collapse whitespace, and truncate.
pub fn sanitize_text(text: &str) -> String {
    let without_scripts = script_block().replace_all(text, "");
    let without_tags = html_tag().replace_all(&without_scripts, "");
    let collapsed = without_tags.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_SANITIZED_CHARS).collect()
}

/// Normalized key used to deduplicate a corpus: lowercase alphanumerics
/// separated by single spaces.
pub fn normalize_for_dedup(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validate a problem description and return its trimmed form.
pub fn validate_problem(problem: &str) -> Result<String> {
    let problem = problem.trim();
    let len = problem.chars().count();
    if len == 0 {
        return Err(KillSwitchError::InvalidInput(
            "problem description is required".to_string(),
        ));
    }
    if len < PROBLEM_MIN_CHARS {
        return Err(KillSwitchError::InvalidInput(format!(
            "problem description must be at least {PROBLEM_MIN_CHARS} characters"
        )));
    }
    if len > PROBLEM_MAX_CHARS {
        return Err(KillSwitchError::InvalidInput(format!(
            "problem description must be less than {PROBLEM_MAX_CHARS} characters"
        )));
    }
    if !meaningful_word().is_match(problem) {
        return Err(KillSwitchError::InvalidInput(
            "problem description must contain meaningful text".to_string(),
        ));
    }
    Ok(sanitize_text(problem))
}

/// Validate a target audience description and return its trimmed form.
pub fn validate_audience(audience: &str) -> Result<String> {
    let audience = audience.trim();
    let len = audience.chars().count();
    if len == 0 {
        return Err(KillSwitchError::InvalidInput(
            "target audience is required".to_string(),
        ));
    }
    if len < AUDIENCE_MIN_CHARS {
        return Err(KillSwitchError::InvalidInput(format!(
            "target audience must be at least {AUDIENCE_MIN_CHARS} characters"
        )));
    }
    if len > AUDIENCE_MAX_CHARS {
        return Err(KillSwitchError::InvalidInput(format!(
            "target audience must be less than {AUDIENCE_MAX_CHARS} characters"
        )));
    }
    Ok(sanitize_text(audience))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_script_and_tags() {
        assert_eq!(sanitize_text("<script>alert('xss')</script>Hello"), "Hello");
        assert_eq!(sanitize_text("<b>bold</b> text"), "bold text");
    }

    #[test]
    fn test_sanitize_collapses_whitespace_and_truncates() {
        assert_eq!(sanitize_text("Too    many \n\t spaces"), "Too many spaces");
        let long = "a".repeat(1500);
        assert_eq!(sanitize_text(&long).len(), MAX_SANITIZED_CHARS);
    }

    #[test]
    fn test_normalize_for_dedup_ignores_case_and_punctuation() {
        assert_eq!(
            normalize_for_dedup("I HATE this tool!!!"),
            normalize_for_dedup("i hate   this tool")
        );
    }

    #[test]
    fn test_validate_problem() {
        assert!(validate_problem("Small businesses struggle with inventory management").is_ok());
        assert!(validate_problem("").is_err());
        assert!(validate_problem("Too short").is_err());
        assert!(validate_problem(&"x".repeat(501)).is_err());
        assert!(validate_problem("12345 67890 !!!").is_err());
    }

    #[test]
    fn test_validate_audience() {
        assert_eq!(
            validate_audience("  Small business owners ").unwrap(),
            "Small business owners"
        );
        assert!(validate_audience("Bad").is_err());
        assert!(validate_audience("").is_err());
    }
}
