//! Distance thresholds and the bridge population offset.
//!
//! The defaults reproduce the standard jump-gate rules: search tiers of
//! 3/5/7/9 pc, GREEN up to 5 pc, ORANGE up to 7 pc, bridges with 5 pc legs,
//! RED hops up to 10 pc and a false-population offset of 10,000.
//!
//! ```
//! use jumpgate_logic::rules::{validate_rules, GateRules};
//!
//! let rules = GateRules::default();
//! assert!(validate_rules(&rules).is_empty());
//! assert_eq!(rules.max_search_radius(), 9.0);
//! ```

use serde::{Deserialize, Serialize};

/// Tunable thresholds for one calculator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateRules {
    /// Tiered search radii, smallest first.
    pub search_radii: Vec<f64>,
    /// Longest direct GREEN link.
    pub green_range: f64,
    /// Longest direct ORANGE link (when no bridge is available).
    pub orange_range: f64,
    /// Longest leg between a bridge and either endpoint.
    pub bridge_leg: f64,
    /// Longest RED hop.
    pub red_range: f64,
    /// Subtracted from the higher endpoint's effective population to give
    /// a bridge's false population.
    pub false_population_offset: i64,
}

impl Default for GateRules {
    fn default() -> Self {
        Self {
            search_radii: vec![3.0, 5.0, 7.0, 9.0],
            green_range: 5.0,
            orange_range: 7.0,
            bridge_leg: 5.0,
            red_range: 10.0,
            false_population_offset: 10_000,
        }
    }
}

impl GateRules {
    /// Outermost search tier; also the Phase A merge range.
    pub fn max_search_radius(&self) -> f64 {
        self.search_radii.last().copied().unwrap_or(0.0)
    }

    /// False population for a bridge serving an endpoint of `higher` effective population.
    pub fn false_population(&self, higher: i64) -> i64 {
        higher.saturating_sub(self.false_population_offset)
    }
}

/// A rules validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("no search radii given")]
    NoSearchRadii,
    #[error("search radius {0} is not a positive finite number")]
    BadRadius(f64),
    #[error("search radii must be strictly ascending ({0} follows {1})")]
    RadiiNotAscending(f64, f64),
    #[error("green range {green} exceeds orange range {orange}")]
    GreenBeyondOrange { green: f64, orange: f64 },
    #[error("orange range {orange} exceeds the largest search radius {max_radius}")]
    OrangeBeyondSearch { orange: f64, max_radius: f64 },
    #[error("{name} {value} is not a positive finite number")]
    BadRange { name: &'static str, value: f64 },
    #[error("false population offset {0} is negative")]
    NegativeOffset(i64),
    #[error("red range {red} is shorter than the largest search radius {max_radius}")]
    RedBelowSearch { red: f64, max_radius: f64 },
}

/// Validate a rule set, returning all errors found.
pub fn validate_rules(rules: &GateRules) -> Vec<RuleError> {
    let mut errors = Vec::new();

    if rules.search_radii.is_empty() {
        errors.push(RuleError::NoSearchRadii);
    }
    for &r in &rules.search_radii {
        if !r.is_finite() || r <= 0.0 {
            errors.push(RuleError::BadRadius(r));
        }
    }
    for pair in rules.search_radii.windows(2) {
        if pair[1] <= pair[0] {
            errors.push(RuleError::RadiiNotAscending(pair[1], pair[0]));
        }
    }

    for (name, value) in [
        ("green range", rules.green_range),
        ("orange range", rules.orange_range),
        ("bridge leg", rules.bridge_leg),
        ("red range", rules.red_range),
    ] {
        if !value.is_finite() || value <= 0.0 {
            errors.push(RuleError::BadRange { name, value });
        }
    }
    if rules.false_population_offset < 0 {
        errors.push(RuleError::NegativeOffset(rules.false_population_offset));
    }

    let max_radius = rules.max_search_radius();
    if rules.green_range > rules.orange_range {
        errors.push(RuleError::GreenBeyondOrange {
            green: rules.green_range,
            orange: rules.orange_range,
        });
    }
    if rules.orange_range > max_radius {
        errors.push(RuleError::OrangeBeyondSearch {
            orange: rules.orange_range,
            max_radius,
        });
    }
    if rules.red_range < max_radius {
        errors.push(RuleError::RedBelowSearch {
            red: rules.red_range,
            max_radius,
        });
    }

    errors
}
