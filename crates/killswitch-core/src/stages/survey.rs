//! Willingness-to-pay survey: the questions sent to prospects and the shape of
//! the responses that come back.

use serde::{Deserialize, Serialize};

use super::pricing::DEFAULT_WTP_OPTIONS;
use crate::error::Result;

pub const CURRENT_SPEND_OPTIONS: [&str; 5] =
    ["Nothing", "$1-50/mo", "$50-100/mo", "$100-500/mo", "$500+/mo"];

pub const FEATURE_OPTIONS: [&str; 6] = [
    "Ease of use",
    "Integration",
    "Automation",
    "Reporting",
    "Support",
    "Security",
];

pub const URGENCY_SCALE: [&str; 5] = ["1", "2", "3", "4", "5"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    Scale,
    OpenEnded,
    Email,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurveyQuestion {
    /// Response field this question fills.
    pub id: String,
    pub question: String,
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Maximum selections for multiple choice, 1 when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<u8>,
}

impl SurveyQuestion {
    fn new(id: &str, question: impl Into<String>, kind: QuestionKind, options: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            question: question.into(),
            kind,
            options: options.iter().map(|o| o.to_string()).collect(),
            max_selections: None,
        }
    }
}

/// A survey ready to hand to a form builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurveyDefinition {
    pub solution: String,
    pub questions: Vec<SurveyQuestion>,
}

impl SurveyDefinition {
    /// The standard pricing survey: willingness to pay, current spend, feature
    /// priorities, urgency, an open question and a launch sign-up.
    pub fn default_for(solution: &str) -> Self {
        let solution = solution.trim();
        let mut features = SurveyQuestion::new(
            "top_features",
            "Which features are most important to you? (Select top 3)",
            QuestionKind::MultipleChoice,
            &FEATURE_OPTIONS,
        );
        features.max_selections = Some(3);

        Self {
            solution: solution.to_string(),
            questions: vec![
                SurveyQuestion::new(
                    "willingness_to_pay",
                    format!("How much would you pay monthly for {solution}?"),
                    QuestionKind::MultipleChoice,
                    &DEFAULT_WTP_OPTIONS,
                ),
                SurveyQuestion::new(
                    "current_spend",
                    "What do you currently spend on solving this problem?",
                    QuestionKind::MultipleChoice,
                    &CURRENT_SPEND_OPTIONS,
                ),
                features,
                SurveyQuestion::new(
                    "urgency",
                    "How urgently do you need a solution?",
                    QuestionKind::Scale,
                    &URGENCY_SCALE,
                ),
                SurveyQuestion::new(
                    "decision_factor",
                    "What would make you choose this over alternatives?",
                    QuestionKind::OpenEnded,
                    &[],
                ),
                SurveyQuestion::new(
                    "email",
                    "If you'd like to be notified when we launch, please enter your email:",
                    QuestionKind::Email,
                    &[],
                ),
            ],
        }
    }

    pub fn question(&self, id: &str) -> Option<&SurveyQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Numbered plain-text rendering.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for (i, q) in self.questions.iter().enumerate() {
            out.push_str(&format!("Q{}: {}\n", i + 1, q.question));
            for option in &q.options {
                out.push_str(&format!("    [ ] {option}\n"));
            }
        }
        out
    }
}

/// One respondent's answers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SurveyResponse {
    #[serde(alias = "wtp", alias = "answer")]
    pub willingness_to_pay: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_spend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<u8>,
    #[serde(default, alias = "features")]
    pub top_features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_factor: Option<String>,
}

impl SurveyResponse {
    pub fn new(willingness_to_pay: impl Into<String>) -> Self {
        Self {
            willingness_to_pay: willingness_to_pay.into(),
            ..Self::default()
        }
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.top_features = features.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_survey_questions() {
        let survey = SurveyDefinition::default_for("  automatic invoice matching ");
        assert_eq!(survey.questions.len(), 6);

        let wtp = survey.question("willingness_to_pay").unwrap();
        assert_eq!(wtp.question, "How much would you pay monthly for automatic invoice matching?");
        assert_eq!(wtp.options, DEFAULT_WTP_OPTIONS.to_vec());
        assert_eq!(wtp.kind, QuestionKind::MultipleChoice);

        assert_eq!(survey.question("top_features").unwrap().max_selections, Some(3));
        assert_eq!(survey.question("urgency").unwrap().kind, QuestionKind::Scale);
        assert!(survey.question("decision_factor").unwrap().options.is_empty());
        assert!(survey.question("phone").is_none());
    }

    #[test]
    fn test_survey_json_shape() {
        let json = SurveyDefinition::default_for("invoice matching").to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["questions"][0]["kind"], "multiple_choice");
        assert_eq!(value["questions"][0]["options"][4], "$250+");
        assert!(value["questions"][4].get("options").is_none());
    }

    #[test]
    fn test_render_text_numbers_questions() {
        let text = SurveyDefinition::default_for("invoice matching").render_text();
        assert!(text.starts_with("Q1: How much would you pay monthly for invoice matching?\n"));
        assert!(text.contains("    [ ] $100-250\n"));
        assert!(text.contains("Q6: "));
    }

    #[test]
    fn test_response_accepts_aliases() {
        let r: SurveyResponse =
            serde_json::from_str(r#"{"wtp": "$50-100", "features": ["Automation"], "urgency": 4}"#)
                .unwrap();
        assert_eq!(r.willingness_to_pay, "$50-100");
        assert_eq!(r.top_features, vec!["Automation"]);
        assert_eq!(r.urgency, Some(4));
    }
}
