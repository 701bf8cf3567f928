//! Scenario tests for the weighted scorer, profile evaluation and the session
//! state machine.

use killswitch_core::{
    evaluate, evaluate_market, score, ClassifiedItem, Classifier, Competitor, Criterion,
    MarketInput, MarketScorer, MarketThresholds, ProfileName, ProfileRegistry, QualityRating,
    ScoringResult, SessionReport, SessionStatus, SourceKind, StageKind, StageMetrics,
    StageOrchestrator, StageResult, TextItem, Tier,
};

fn corpus(t1: usize, t2: usize, t3: usize) -> Vec<ClassifiedItem> {
    let mut items = Vec::new();
    for (tier, n) in [
        (Tier::LowValue, t1),
        (Tier::Moderate, t2),
        (Tier::HighImpact, t3),
    ] {
        for i in 0..n {
            items.push(ClassifiedItem {
                item: TextItem::new(format!("{tier} #{i}"), SourceKind::Forum),
                tier,
                emotional: i % 2 == 0,
                urgent: i % 3 == 0,
            });
        }
    }
    items
}

// Weighted scoring

/// Test: mid-tier heavy corpus gets the 1.2 multiplier
#[test]
fn test_weighted_scenario_applies_mid_tier_multiplier() {
    let result = score(&corpus(20, 15, 10));
    assert_eq!(result.weighted_score, 90.0);
    assert!((result.high_impact_ratio - 10.0 / 45.0).abs() < 1e-9);
    assert_eq!(result.quality_multiplier, 1.2);
    assert!((result.effective_complaints - 108.0).abs() < 1e-9);
}

/// Test: empty corpus fails easy on weighted complaints
#[test]
fn test_empty_corpus_fails_easy_on_weighted_complaints() {
    let result = score(&[]);
    assert_eq!(result.pain_score, 0.0);
    assert_eq!(result.quality_rating, QualityRating::Low);

    let registry = ProfileRegistry::builtin();
    let verdict = evaluate(&result, registry.get("easy").expect("easy is builtin"));
    assert!(!verdict.passed);
    assert_eq!(verdict.failed_criterion(), Some(Criterion::WeightedComplaints));
    assert!(verdict.reason.contains("weighted_complaints"));
    assert!(verdict.reason.contains("short by 20.0"));
}

/// Test: builtin medium passes where builtin difficult fails on pain score
#[test]
fn test_medium_passes_where_difficult_fails_on_pain_score() {
    let result = ScoringResult {
        weighted_score: 50.0,
        quality_multiplier: 1.0,
        effective_complaints: 50.0,
        pain_score: 6.5,
        quality_rating: QualityRating::Medium,
        ..ScoringResult::default()
    };
    let registry = ProfileRegistry::builtin();
    let medium = registry.get("medium").expect("medium is builtin");
    assert!(evaluate(&result, medium).passed, "Medium should pass");

    let difficult = registry.get("difficult").expect("difficult is builtin");
    let verdict = evaluate(&result, difficult);
    assert!(!verdict.passed, "Difficult should kill");
    assert_eq!(verdict.failed_criterion(), Some(Criterion::PainScore));
    assert!(verdict.reason.starts_with("pain_score"));
    assert!(verdict.reason.contains("short by 1.5"));
}

/// Test: adding an item to any tier never lowers the weighted score
#[test]
fn test_weighted_score_is_monotonic_in_each_tier() {
    for (t1, t2, t3) in [(0, 0, 0), (3, 1, 0), (5, 5, 5), (0, 2, 9)] {
        let base = score(&corpus(t1, t2, t3)).weighted_score;
        assert!(base >= 0.0);
        assert!(score(&corpus(t1 + 1, t2, t3)).weighted_score >= base);
        assert!(score(&corpus(t1, t2 + 1, t3)).weighted_score >= base);
        assert!(score(&corpus(t1, t2, t3 + 1)).weighted_score >= base);
    }
}

/// Test: multiplier and pain score stay in range across tier mixes
#[test]
fn test_multiplier_and_pain_score_stay_in_range() {
    for t1 in 0..6 {
        for t2 in 0..6 {
            for t3 in 0..6 {
                let r = score(&corpus(t1 * 7, t2 * 5, t3 * 3));
                assert!([0.8, 1.0, 1.2, 1.5].contains(&r.quality_multiplier));
                assert!((0.0..=10.0).contains(&r.pain_score));
                if t1 + t2 + t3 == 0 {
                    assert_eq!(r.pain_score, 0.0);
                } else {
                    assert!(r.pain_score >= 1.0);
                }
            }
        }
    }
}

/// Test: scoring the same corpus twice gives the same result
#[test]
fn test_scoring_is_reproducible() {
    let items = corpus(4, 7, 3);
    assert_eq!(score(&items), score(&items));
}

// Classifier feeding the scorer

/// Test: raw texts flow through the classifier into the scorer
#[test]
fn test_raw_corpus_flows_through_classifier_and_scorer() {
    let texts = [
        "I hate QuickBooks, lost $3,000 to reconciliation errors last year",
        "Wasted 6 hours this week on invoices. Worst software ever!!",
        "Looking for alternative to FreshBooks, it's too expensive",
        "Our invoicing is broken and support is useless",
        "How do I bulk export invoices?",
        "Buy now: 50% off with discount code INVOICE50",
        "Step-by-step tutorial: invoicing in 10 minutes",
        "Looking for alternative to FreshBooks, it's too expensive!",
    ];
    let items = texts
        .iter()
        .map(|t| TextItem::from_url(*t, "https://www.reddit.com/r/freelance/1"));
    let classified = Classifier::standard().classify_all(items);
    assert_eq!(classified.len(), 7);

    let result = score(&classified);
    assert_eq!(result.tier_counts.tier3, 2);
    assert_eq!(result.tier_counts.tier2, 2);
    assert_eq!(result.tier_counts.tier1, 1);
    assert_eq!(result.tier_counts.tier0, 2);
    assert_eq!(result.weighted_score, 11.0);
    assert_eq!(result.quality_multiplier, 1.5);
    assert!(classified.iter().all(|c| c.item.source == SourceKind::Reddit));
}

// Orchestration and export

/// Test: market kill stops the session and the report still exports
#[test]
fn test_market_kill_stops_session_and_remains_exportable() {
    let mut orchestrator = StageOrchestrator::new(
        "Freelancers waste hours every month reconciling invoices",
        "Freelance designers and developers",
        ProfileName::Easy,
    )
    .expect("valid session input");

    orchestrator.begin_stage().expect("pain stage begins");
    let pain = score(&corpus(20, 15, 10));
    let registry = ProfileRegistry::builtin();
    let verdict = evaluate(&pain, registry.get("easy").expect("easy is builtin"));
    assert!(verdict.passed, "{}", verdict.reason);
    orchestrator
        .complete_stage(StageResult::new(pain.pain_score, StageMetrics::Pain(pain), verdict))
        .expect("pain stage completes");

    assert_eq!(
        orchestrator.begin_stage().expect("market stage begins"),
        StageKind::Market
    );
    let market = MarketScorer::default().score(&MarketInput {
        competitors: vec![
            Competitor::new("InvoiceCo", "Plans from $79 per month"),
            Competitor::new("LedgerLite", "$59/mo"),
            Competitor::new("FreeBooks", "Free forever"),
        ],
        gaps: vec!["automatic reconciliation".into()],
    });
    assert_eq!(market.paying_competitors, 2);
    let verdict = evaluate_market(&market, &MarketThresholds::default());
    assert!(!verdict.passed);
    let status = orchestrator
        .complete_stage(StageResult::new(
            market.opportunity_score,
            StageMetrics::Market(market),
            verdict,
        ))
        .expect("market stage completes");

    assert_eq!(status, SessionStatus::Killed, "Session should be killed");
    assert!(
        orchestrator.begin_stage().is_err(),
        "No stage may begin after a kill"
    );

    let session = orchestrator.into_session();
    assert_eq!(session.current_stage_index(), 1);
    assert_eq!(session.viability_score(), None);

    let report = SessionReport::from_session(&session);
    assert_eq!(report.killed_at, Some(StageKind::Market));
    assert_eq!(
        report.kill_reason.as_deref(),
        Some("paying_competitors 2 below required 3 (short by 1)")
    );
    assert!(report.to_json().is_ok());
}
