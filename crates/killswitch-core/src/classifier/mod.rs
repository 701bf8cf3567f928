//! Complaint classifier.
//!
//! Assigns each retrieved [`TextItem`] a [`Tier`] by walking an ordered list
//! of [`TierRule`]s (first match wins) and attaches the emotional and urgency
//! flags. Classification is pure and deterministic.

pub mod rules;

use std::collections::HashSet;

use crate::model::{ClassifiedItem, TextItem, Tier};
use crate::sanitize::normalize_for_dedup;

pub use rules::TierRule;

/// An ordered rule set. Items matching no rule fall back to tier 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    rules: Vec<TierRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::standard()
    }
}

impl Classifier {
    /// The standard rule order.
    pub fn standard() -> Self {
        Self {
            rules: TierRule::STANDARD.to_vec(),
        }
    }

    /// A classifier with a custom rule order.
    pub fn with_rules(rules: Vec<TierRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[TierRule] {
        &self.rules
    }

    /// The first rule matching `text`, if any.
    pub fn matching_rule(&self, text: &str) -> Option<TierRule> {
        self.rules.iter().copied().find(|rule| rule.matches(text))
    }

    /// Classify a single item.
    pub fn classify(&self, item: TextItem) -> ClassifiedItem {
        let tier = self
            .matching_rule(&item.text)
            .map(|rule| rule.tier())
            .unwrap_or(Tier::NotComplaint);
        let emotional = rules::is_emotional(&item.text);
        let urgent = rules::is_urgent(&item.text);
        ClassifiedItem {
            item,
            tier,
            emotional,
            urgent,
        }
    }

    /// Classify a corpus, dropping items whose normalized text was already seen
    /// and items with no text at all.
    pub fn classify_all<I>(&self, items: I) -> Vec<ClassifiedItem>
    where
        I: IntoIterator<Item = TextItem>,
    {
        let mut seen = HashSet::new();
        items
            .into_iter()
            .filter(|item| {
                let key = normalize_for_dedup(&item.text);
                !key.is_empty() && seen.insert(key)
            })
            .map(|item| self.classify(item))
            .collect()
    }
}

/// Classify with the standard rule order.
pub fn classify(item: TextItem) -> ClassifiedItem {
    Classifier::standard().classify(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceKind;

    fn item(text: &str) -> TextItem {
        TextItem::new(text, SourceKind::Reddit)
    }

    #[test]
    fn test_tiers_for_typical_snippets() {
        let c = Classifier::standard();
        assert_eq!(
            c.classify(item("I hate this tool, lost $2,000 on failed invoices")).tier,
            Tier::HighImpact
        );
        assert_eq!(
            c.classify(item("Looking for alternative to QuickBooks, it's too expensive")).tier,
            Tier::Moderate
        );
        assert_eq!(
            c.classify(item("How do I export my invoices to CSV?")).tier,
            Tier::LowValue
        );
        assert_eq!(
            c.classify(item("Love the new dashboard, great release")).tier,
            Tier::NotComplaint
        );
    }

    #[test]
    fn test_highest_tier_wins_when_several_match() {
        // Matches tier 3, tier 2 and tier 1 keyword sets at once.
        let text = "How do I stop this? Worst tool ever, wasted 10 hours, looking for alternative";
        assert_eq!(classify(item(text)).tier, Tier::HighImpact);
    }

    #[test]
    fn test_promotional_beats_complaint_language() {
        let text = "Tired of losing $500 a month? Buy now and use code SAVE20";
        assert_eq!(classify(item(text)).tier, Tier::NotComplaint);
    }

    #[test]
    fn test_tutorial_suppresses_question_rule() {
        let text = "How to reconcile invoices: a step-by-step tutorial";
        assert_eq!(classify(item(text)).tier, Tier::NotComplaint);
    }

    #[test]
    fn test_flags_are_attached() {
        let classified = classify(item("This is a NIGHTMARE, need a fix now!!"));
        assert!(classified.emotional);
        assert!(classified.urgent);

        let calm = classify(item("How do I change my billing address?"));
        assert!(!calm.emotional);
        assert!(!calm.urgent);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let text = "Switching from Trello because the sync is broken";
        let a = classify(item(text));
        let b = classify(item(text));
        assert_eq!(a, b);
    }

    #[test]
    fn test_classify_all_deduplicates_by_normalized_text() {
        let items = vec![
            item("The sync is broken!"),
            item("the sync is BROKEN"),
            item("   "),
            item("How do I export data?"),
        ];
        let classified = Classifier::standard().classify_all(items);
        assert_eq!(classified.len(), 2);
        assert_eq!(classified[0].tier, Tier::Moderate);
        assert_eq!(classified[1].tier, Tier::LowValue);
    }

    #[test]
    fn test_custom_rule_order() {
        let c = Classifier::with_rules(vec![TierRule::MildRequest]);
        assert_eq!(
            c.classify(item("How do I fix this broken sync?")).tier,
            Tier::LowValue
        );
        assert_eq!(c.matching_rule("nothing relevant"), None);
    }
}
