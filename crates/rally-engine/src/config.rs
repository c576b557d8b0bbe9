//! Engine configuration.
//!
//! [`EngineConfig`] is what a caller hands to [`ScoringEngine::new`]. Every
//! field is optional; the match format falls back to the competition format's
//! and then to [`DEFAULT_MATCH_UP_FORMAT`].
//!
//! ```
//! use rally_engine::config::EngineConfig;
//!
//! let config: EngineConfig = serde_json::from_str(
//!     r#"{ "competitionFormat": { "matchUpFormat": "SET1-S:T20P" } }"#,
//! ).unwrap();
//! assert_eq!(config.resolved_format(), "SET1-S:T20P");
//! assert_eq!(EngineConfig::default().resolved_format(), "SET3-S:6/TB7");
//! ```
//!
//! [`ScoringEngine::new`]: crate::engine::ScoringEngine::new

use rally_model::point::PointMultiplier;
use serde::{Deserialize, Serialize};

/// Best of three tiebreak sets.
pub const DEFAULT_MATCH_UP_FORMAT: &str = "SET3-S:6/TB7";

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Constructor options for a scoring engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub match_up_format: Option<String>,
    /// Generated when absent.
    pub match_up_id: Option<String>,
    pub is_doubles: bool,
    pub competition_format: Option<CompetitionFormat>,
    pub point_multipliers: Option<Vec<PointMultiplier>>,
}

impl EngineConfig {
    /// Explicit format, then the competition's, then the default.
    pub fn resolved_format(&self) -> &str {
        self.match_up_format
            .as_deref()
            .or_else(|| {
                self.competition_format
                    .as_ref()
                    .and_then(|c| c.match_up_format.as_deref())
            })
            .unwrap_or(DEFAULT_MATCH_UP_FORMAT)
    }

    /// Explicit multipliers, then the competition's, then none.
    pub fn resolved_point_multipliers(&self) -> Vec<PointMultiplier> {
        self.point_multipliers
            .clone()
            .or_else(|| {
                self.competition_format
                    .as_ref()
                    .and_then(|c| c.point_multipliers.clone())
            })
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// CompetitionFormat
// ---------------------------------------------------------------------------

/// Rules bundle shared by every match of a competition.
///
/// Only the substitution rules are interpreted here. The timer, timeout,
/// player, penalty and point bundles are carried for callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompetitionFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_up_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_multipliers: Option<Vec<PointMultiplier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution_rules: Option<SubstitutionRules>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalties: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<serde_json::Value>,
}

/// Limits on lineup changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubstitutionRules {
    pub allowed: bool,
    /// Maximum substitutions per side over the whole match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_per_side: Option<u32>,
}

impl Default for SubstitutionRules {
    fn default() -> Self {
        Self {
            allowed: true,
            max_per_side: None,
        }
    }
}

impl SubstitutionRules {
    /// Whether a side that has already made `made` substitutions may make
    /// another.
    pub fn permits(&self, made: usize) -> bool {
        self.allowed && self.max_per_side.map_or(true, |max| made < max as usize)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_settings_win_over_competition() {
        let config: EngineConfig = serde_json::from_value(serde_json::json!({
            "matchUpFormat": "SET5-S:6/TB7",
            "competitionFormat": {
                "matchUpFormat": "SET1-S:T10P",
                "pointMultipliers": [{ "results": ["Ace"], "value": 2 }],
                "timer": { "minutes": 10 }
            }
        }))
        .unwrap();
        assert_eq!(config.resolved_format(), "SET5-S:6/TB7");

        let multipliers = config.resolved_point_multipliers();
        assert_eq!(multipliers.len(), 1);
        assert_eq!(multipliers[0].value, 2);
        assert!(config.competition_format.unwrap().timer.is_some());
    }

    #[test]
    fn substitution_rules_default_to_unlimited() {
        let rules: SubstitutionRules = serde_json::from_str("{}").unwrap();
        assert!(rules.permits(100));

        let capped = SubstitutionRules {
            allowed: true,
            max_per_side: Some(2),
        };
        assert!(capped.permits(1));
        assert!(!capped.permits(2));

        let banned = SubstitutionRules {
            allowed: false,
            max_per_side: None,
        };
        assert!(!banned.permits(0));
    }
}
