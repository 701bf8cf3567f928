use std::collections::HashSet;

use async_trait::async_trait;
use killswitch_core::obs::emit_parse_fallback;
use killswitch_core::{
    evaluate_market, Competitor, DerivedContext, MarketInput, MarketScorer, MarketThresholds,
    StageKind, StageMetrics, StageResult,
};
use killswitch_providers::{competitor_analysis_request, competitor_queries, parse_competitors};

use super::StageRunner;
use crate::context::{title_of, Collaborators, StageInput};

/// Competitors sent to the analysis service.
const MAX_ANALYZED_COMPETITORS: usize = 20;

/// Market gate: paying competitors, their prices and the gaps they leave.
#[derive(Debug, Clone)]
pub struct MarketStage {
    collaborators: Collaborators,
    thresholds: MarketThresholds,
}

impl MarketStage {
    pub fn new(collaborators: Collaborators, thresholds: MarketThresholds) -> Self {
        Self {
            collaborators,
            thresholds,
        }
    }
}

/// Host of a URL without scheme or `www.`, used to keep one result per site.
fn host_of(url: &str) -> &str {
    let rest = url.split("://").nth(1).unwrap_or(url);
    let host = rest.split(&['/', '?', '#'][..]).next().unwrap_or(rest);
    host.strip_prefix("www.").unwrap_or(host)
}

/// Fold analysis-reported competitors into the searched ones. A reported
/// competitor matches a searched one whose title contains its name; matches
/// only fill in what the search snippet lacked.
fn merge_competitors(found: &mut Vec<Competitor>, reported: Vec<Competitor>) {
    for competitor in reported {
        let key = competitor.name.to_lowercase();
        match found
            .iter_mut()
            .find(|c| c.name.to_lowercase().contains(&key))
        {
            Some(existing) => {
                if existing.monthly_price.is_none() {
                    existing.monthly_price = competitor.monthly_price;
                }
                if existing.url.is_none() {
                    existing.url = competitor.url;
                }
            }
            None => found.push(competitor),
        }
    }
}

#[async_trait]
impl StageRunner for MarketStage {
    fn stage(&self) -> StageKind {
        StageKind::Market
    }

    async fn run(&self, input: &StageInput<'_>) -> anyhow::Result<StageResult> {
        let queries = competitor_queries(input.problem, input.derived);
        let gathered = self.collaborators.gather(&queries).await;

        let mut hosts = HashSet::new();
        let mut competitors: Vec<Competitor> = gathered
            .items
            .iter()
            .filter(|item| match &item.url {
                Some(url) => hosts.insert(host_of(url).to_lowercase()),
                None => true,
            })
            .map(|item| Competitor {
                name: title_of(item).to_string(),
                url: item.url.clone(),
                description: item.text.clone(),
                monthly_price: None,
            })
            .filter(|c| !c.name.is_empty())
            .collect();

        let mut gaps = Vec::new();
        let shortlist: Vec<Competitor> = competitors
            .iter()
            .take(MAX_ANALYZED_COMPETITORS)
            .cloned()
            .collect();
        let request = competitor_analysis_request(input.problem, &input.derived.themes, &shortlist);
        let parsed = match self.collaborators.analyze(&request).await {
            Ok(raw) => parse_competitors(&raw),
            Err(e) => Err(e),
        };
        match parsed {
            Ok(analysis) => {
                merge_competitors(&mut competitors, analysis.competitors);
                gaps = analysis.gaps;
            }
            Err(e) => emit_parse_fallback(StageKind::Market, &e),
        }

        let metrics = MarketScorer::new(self.thresholds.paying_price_floor)
            .score(&MarketInput { competitors, gaps });
        let verdict = evaluate_market(&metrics, &self.thresholds);
        let context = DerivedContext {
            themes: Vec::new(),
            gaps: metrics.gaps.clone(),
        };
        Ok(
            StageResult::new(metrics.opportunity_score, StageMetrics::Market(metrics), verdict)
                .with_context(context),
        )
    }
}
