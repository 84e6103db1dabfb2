//! Weighted aggregation and risk classification.
//!
//! The composite is a fixed weighted sum of the five metrics, rounded
//! to two decimals. One threshold gates both the plagiarism verdict
//! and the MEDIUM tier; HIGH starts at a fixed cutoff.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::metrics::{Metric, MetricSet};

/// Composite at or above this is HIGH regardless of threshold.
pub const HIGH_RISK_CUTOFF: f64 = 85.0;

/// Default verdict / MEDIUM threshold.
pub const DEFAULT_THRESHOLD: f64 = 70.0;

/// Policy weights, in canonical metric order. They sum to 1.0.
pub const WEIGHTS: [(Metric, f64); 5] = [
    (Metric::Text, 0.35),
    (Metric::Token, 0.20),
    (Metric::Line, 0.20),
    (Metric::Variable, 0.15),
    (Metric::ControlFlow, 0.10),
];

pub const STATEMENT_PLAGIARISED: &str = "The submitted source code is classified as plagiarised.";
pub const STATEMENT_ORIGINAL: &str = "The submitted source code is classified as original.";

/// Raised when a threshold is outside `[0, 100]` or not finite.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("threshold must be a finite value between 0 and 100, got {0}")]
pub struct InvalidThreshold(pub f64);

/// Validated plagiarism threshold in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, InvalidThreshold> {
        if value.is_finite() && (0.0..=100.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidThreshold(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl TryFrom<f64> for Threshold {
    type Error = InvalidThreshold;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(t: Threshold) -> Self {
        t.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Risk tier of a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round to two decimals, nearest on the exact binary value with exact
/// ties going to even (`0.125 -> 0.12`, `0.135 -> 0.14`).
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let scaled = value * 100.0;
    // `scaled + residual` is exactly `value * 100`.
    let residual = value.mul_add(100.0, -scaled);
    let floor = scaled.floor();
    let frac = scaled - floor;

    let up = if frac != 0.5 {
        frac > 0.5
    } else if residual != 0.0 {
        residual > 0.0
    } else {
        floor % 2.0 != 0.0
    };

    (if up { floor + 1.0 } else { floor }) / 100.0
}

/// Weighted sum of the metrics, rounded to two decimals.
pub fn composite(metrics: &MetricSet) -> f64 {
    let sum: f64 = WEIGHTS
        .iter()
        .map(|&(metric, weight)| weight * metrics.get(metric))
        .sum();
    round2(sum)
}

/// First match wins: HIGH, then MEDIUM, then LOW.
pub fn classify(composite: f64, threshold: Threshold) -> RiskTier {
    if composite >= HIGH_RISK_CUTOFF {
        RiskTier::High
    } else if composite >= threshold.value() {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

pub fn is_plagiarised(composite: f64, threshold: Threshold) -> bool {
    composite >= threshold.value()
}

/// Human-readable verdict sentence.
pub fn statement(plagiarised: bool) -> &'static str {
    if plagiarised {
        STATEMENT_PLAGIARISED
    } else {
        STATEMENT_ORIGINAL
    }
}
