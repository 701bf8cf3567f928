//! Threshold configuration.
//!
//! [`ProfileConfig::default`] carries the built-in values. An override file is
//! TOML; every section is optional:
//!
//! ```toml
//! default_profile = "medium"
//!
//! [profiles.easy]          # replaces the easy profile's criteria entirely
//! min_weighted_complaints = 25.0
//! min_pain_score = 4.5
//!
//! [market]
//! min_paying_competitors = 2
//!
//! [viability]
//! pain = 0.4
//! market = 0.2
//! content = 0.2
//! pricing = 0.2
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KillSwitchError, Result};
use crate::orchestrator::ViabilityWeights;
use crate::stages::{ContentThresholds, MarketThresholds, PricingThresholds};
use crate::threshold::{ProfileCriteria, ProfileName};

/// Criteria for each named profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProfileSet {
    #[serde(default = "easy_criteria")]
    pub easy: ProfileCriteria,
    #[serde(default = "medium_criteria")]
    pub medium: ProfileCriteria,
    #[serde(default = "difficult_criteria")]
    pub difficult: ProfileCriteria,
}

fn easy_criteria() -> ProfileCriteria {
    ProfileCriteria::builtin(ProfileName::Easy)
}

fn medium_criteria() -> ProfileCriteria {
    ProfileCriteria::builtin(ProfileName::Medium)
}

fn difficult_criteria() -> ProfileCriteria {
    ProfileCriteria::builtin(ProfileName::Difficult)
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self {
            easy: easy_criteria(),
            medium: medium_criteria(),
            difficult: difficult_criteria(),
        }
    }
}

/// All thresholds and weights the pipeline evaluates against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    pub default_profile: ProfileName,
    pub profiles: ProfileSet,
    pub market: MarketThresholds,
    pub content: ContentThresholds,
    pub pricing: PricingThresholds,
    pub viability: ViabilityWeights,
}

impl ProfileConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: ProfileConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| KillSwitchError::InvalidConfig(format!("cannot render config: {e}")))
    }

    pub fn criteria(&self, name: ProfileName) -> &ProfileCriteria {
        match name {
            ProfileName::Easy => &self.profiles.easy,
            ProfileName::Medium => &self.profiles.medium,
            ProfileName::Difficult => &self.profiles.difficult,
        }
    }

    /// Reject values no evaluation could sensibly use.
    pub fn validate(&self) -> Result<()> {
        for name in ProfileName::ALL {
            validate_criteria(name, self.criteria(name))?;
        }

        let m = &self.market;
        non_negative("market.min_avg_monthly_price", m.min_avg_monthly_price)?;
        non_negative("market.paying_price_floor", m.paying_price_floor)?;
        within("market.min_opportunity_score", m.min_opportunity_score, 0.0, 10.0)?;

        let c = &self.content;
        within("content.min_predicted_conversion", c.min_predicted_conversion, 0.0, 1.0)?;
        within("content.min_messaging_score", c.min_messaging_score, 0.0, 10.0)?;

        let p = &self.pricing;
        non_negative("pricing.min_avg_wtp", p.min_avg_wtp)?;
        non_negative("pricing.price_floor", p.price_floor)?;
        within("pricing.min_pct_above_floor", p.min_pct_above_floor, 0.0, 100.0)?;

        self.viability.validate()
    }
}

fn validate_criteria(name: ProfileName, c: &ProfileCriteria) -> Result<()> {
    let invalid = |reason: String| KillSwitchError::InvalidProfile {
        profile: name.to_string(),
        reason,
    };
    let checks = [
        ("min_weighted_complaints", c.min_weighted_complaints, f64::INFINITY),
        ("min_pain_score", c.min_pain_score, 10.0),
        ("min_urgency_pct", c.min_urgency_pct, 100.0),
        ("min_emotional_pct", c.min_emotional_pct, 100.0),
    ];
    for (field, value, max) in checks {
        if let Some(v) = value {
            if !(0.0..=max).contains(&v) {
                return Err(invalid(format!("{field} = {v} is outside 0..={max}")));
            }
        }
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(KillSwitchError::InvalidConfig(format!(
            "{field} must be a non-negative number, got {value}"
        )))
    }
}

fn within(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(KillSwitchError::InvalidConfig(format!(
            "{field} must be within {min}..={max}, got {value}"
        )))
    }
}
