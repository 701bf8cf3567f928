//! Weighted scorer.
//!
//! Aggregates a classified corpus into a [`ScoringResult`]: tier tallies, the
//! weighted score, the quality multiplier, effective complaints, the pain score
//! and the quality rating. Pure and bit-for-bit reproducible.

use crate::model::{ClassifiedItem, QualityRating, ScoringResult, Tier, TierCounts};

/// Effective-complaint volume at which the volume component saturates.
pub const VOLUME_SATURATION: f64 = 150.0;

const VOLUME_WEIGHT: f64 = 0.4;
const IMPACT_WEIGHT: f64 = 0.3;
const INTENSITY_WEIGHT: f64 = 0.3;

/// Score a classified corpus.
pub fn score(items: &[ClassifiedItem]) -> ScoringResult {
    let mut counts = TierCounts::default();
    let mut urgent = 0u32;
    let mut emotional = 0u32;

    for item in items {
        counts.increment(item.tier);
        if item.tier != Tier::NotComplaint {
            urgent += u32::from(item.urgent);
            emotional += u32::from(item.emotional);
        }
    }

    let total_nonzero = counts.total_nonzero();
    let weighted_score = f64::from(counts.weighted_sum());
    let quality_multiplier = quality_multiplier(&counts);
    let effective_complaints = weighted_score * quality_multiplier;

    if total_nonzero == 0 {
        return ScoringResult {
            tier_counts: counts,
            weighted_score,
            quality_multiplier,
            effective_complaints,
            pain_score: 0.0,
            quality_rating: QualityRating::Low,
            ..ScoringResult::default()
        };
    }

    let n = f64::from(total_nonzero);
    let high_impact_ratio = f64::from(counts.tier3) / n;
    let urgency_pct = f64::from(urgent) / n * 100.0;
    let emotional_pct = f64::from(emotional) / n * 100.0;

    ScoringResult {
        tier_counts: counts,
        weighted_score,
        quality_multiplier,
        effective_complaints,
        pain_score: pain_score(
            effective_complaints,
            high_impact_ratio,
            urgency_pct,
            emotional_pct,
        ),
        quality_rating: quality_rating(effective_complaints, high_impact_ratio),
        high_impact_ratio,
        urgency_pct,
        emotional_pct,
        themes: Vec::new(),
        sample_quotes: Vec::new(),
    }
}

/// Multiplier rewarding high-impact-heavy corpora and penalising low-value-heavy
/// ones. Conditions are checked in priority order; the first match wins.
pub fn quality_multiplier(counts: &TierCounts) -> f64 {
    let total = counts.total_nonzero();
    if total == 0 {
        return 1.0;
    }
    let n = f64::from(total);
    let t1 = f64::from(counts.tier1);
    let t2 = f64::from(counts.tier2);
    let t3 = f64::from(counts.tier3);

    if t3 / n > 0.30 {
        1.5
    } else if (t1 + t2) / n > 0.50 {
        1.2
    } else if t1 / n > 0.50 {
        // Never reached: t1/n > 0.5 implies (t1 + t2)/n > 0.5, so the 1.2 rule
        // matches first. Kept in place to preserve the documented rule order.
        0.8
    } else {
        1.0
    }
}

/// Saturating volume component in `[0, 1]`. Logarithmic, so each extra complaint
/// counts for less, reaching 1 at [`VOLUME_SATURATION`].
pub fn volume_component(effective_complaints: f64) -> f64 {
    if effective_complaints <= 0.0 {
        return 0.0;
    }
    ((1.0 + effective_complaints).ln() / (1.0 + VOLUME_SATURATION).ln()).min(1.0)
}

/// Blend of volume (40%), high-impact ratio (30%) and joint urgency/emotion
/// (30%), scaled to 1–10.
pub fn pain_score(
    effective_complaints: f64,
    high_impact_ratio: f64,
    urgency_pct: f64,
    emotional_pct: f64,
) -> f64 {
    let volume = volume_component(effective_complaints);
    let impact = high_impact_ratio.clamp(0.0, 1.0);
    let intensity = ((urgency_pct + emotional_pct) / 200.0).clamp(0.0, 1.0);
    let blended = VOLUME_WEIGHT * volume + IMPACT_WEIGHT * impact + INTENSITY_WEIGHT * intensity;
    (blended * 10.0).clamp(1.0, 10.0)
}

pub fn quality_rating(effective_complaints: f64, high_impact_ratio: f64) -> QualityRating {
    if effective_complaints >= 60.0 && high_impact_ratio >= 0.25 {
        QualityRating::High
    } else if effective_complaints >= 30.0 {
        QualityRating::Medium
    } else {
        QualityRating::Low
    }
}
