//! Reading corpora and survey answers from disk.
//!
//! Both accept either a JSON array or plain text with one entry per line.
//! Survey files may also hold full response objects.

use std::path::Path;

use anyhow::{Context, Result};
use killswitch_core::{PricingInput, SourceKind, SurveyResponse, TextItem};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CorpusEntry {
    Text(String),
    Item {
        text: String,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        source: Option<SourceKind>,
    },
}

impl CorpusEntry {
    fn into_item(self) -> TextItem {
        match self {
            CorpusEntry::Text(text) => TextItem::new(text, SourceKind::General),
            CorpusEntry::Item { text, url, source } => match (url, source) {
                (url, Some(source)) => TextItem { text, source, url },
                (Some(url), None) => TextItem::from_url(text, url),
                (None, None) => TextItem::new(text, SourceKind::General),
            },
        }
    }
}

fn non_empty_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().map(str::trim).filter(|l| !l.is_empty())
}

pub fn parse_corpus(raw: &str) -> Result<Vec<TextItem>> {
    if raw.trim_start().starts_with('[') {
        let entries: Vec<CorpusEntry> =
            serde_json::from_str(raw).context("corpus is not a JSON array of texts or items")?;
        return Ok(entries.into_iter().map(CorpusEntry::into_item).collect());
    }
    Ok(non_empty_lines(raw)
        .map(|line| TextItem::new(line, SourceKind::General))
        .collect())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnswerEntry {
    Response(SurveyResponse),
    Text(String),
    Other(serde_json::Value),
}

impl AnswerEntry {
    fn into_response(self) -> SurveyResponse {
        match self {
            AnswerEntry::Response(response) => response,
            AnswerEntry::Text(text) => SurveyResponse::new(text),
            AnswerEntry::Other(value) => SurveyResponse::new(value.to_string()),
        }
    }
}

pub fn parse_answers(raw: &str) -> Result<PricingInput> {
    if raw.trim_start().starts_with('[') {
        let entries: Vec<AnswerEntry> = serde_json::from_str(raw)
            .context("answers are not a JSON array of answers or responses")?;
        let responses: Vec<SurveyResponse> =
            entries.into_iter().map(AnswerEntry::into_response).collect();
        return Ok(PricingInput::from_responses(&responses));
    }
    Ok(PricingInput::new(non_empty_lines(raw)))
}

pub fn load_corpus(path: &Path) -> Result<Vec<TextItem>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read corpus file {}", path.display()))?;
    parse_corpus(&raw)
}

pub fn load_answers(path: &Path) -> Result<PricingInput> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers file {}", path.display()))?;
    parse_answers(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_from_lines() {
        let items = parse_corpus("first complaint\n\n  second complaint  \n").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].text, "second complaint");
        assert_eq!(items[0].source, SourceKind::General);
    }

    #[test]
    fn test_corpus_from_mixed_json() {
        let raw = r#"[
            "plain text",
            {"text": "from reddit", "url": "https://www.reddit.com/r/x/1"},
            {"text": "a review", "source": "review"}
        ]"#;
        let items = parse_corpus(raw).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].source, SourceKind::Reddit);
        assert_eq!(items[2].source, SourceKind::Review);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(parse_corpus("[1, 2").is_err());
    }

    #[test]
    fn test_answers_from_json_and_lines() {
        assert_eq!(
            parse_answers(r#"["$50-100", 75, "Nothing"]"#).unwrap().answers,
            vec!["$50-100", "75", "Nothing"]
        );
        assert_eq!(
            parse_answers("$25-50\n$250+\n").unwrap().answers,
            vec!["$25-50", "$250+"]
        );
    }

    #[test]
    fn test_answers_from_survey_responses() {
        let raw = r#"[
            {"willingness_to_pay": "$50-100", "top_features": ["Automation", "Security"], "urgency": 5},
            {"wtp": "$25-50", "features": ["Automation"]},
            "$100-250"
        ]"#;
        let survey = parse_answers(raw).unwrap();
        assert_eq!(survey.answers, vec!["$50-100", "$25-50", "$100-250"]);
        assert_eq!(survey.feature_picks, vec!["Automation", "Security", "Automation"]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.txt");
        std::fs::write(&path, "$50-100\n$100-250\n").unwrap();
        assert_eq!(load_answers(&path).unwrap().answers.len(), 2);
        assert!(load_corpus(&dir.path().join("missing.txt")).is_err());
    }
}
