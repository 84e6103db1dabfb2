//! The five similarity metrics.
//!
//! Every metric is the block-matching ratio of one pair of views,
//! scaled to a percentage. All of them are pure functions.

use std::{fmt, hash::Hash};

use serde::{Deserialize, Serialize};

use crate::core::{
    normalize::{ControlKeyword, Fingerprint, Normalizer},
    sequence::{self, MatcherOptions},
};

/// Names of the five metrics in a [`MetricSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Text,
    Token,
    Line,
    Variable,
    ControlFlow,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Text,
        Metric::Token,
        Metric::Line,
        Metric::Variable,
        Metric::ControlFlow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Text => "text",
            Metric::Token => "token",
            Metric::Line => "line",
            Metric::Variable => "variable",
            Metric::ControlFlow => "control_flow",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Percentage similarity of two sequences of any element type.
///
/// The block matcher breaks ties by position in its first argument, so
/// the pair is put in `(len, contents)` order first. The score is then
/// independent of argument order.
pub fn similarity<T: Ord + Hash>(a: &[T], b: &[T], options: MatcherOptions) -> f64 {
    let (first, second) = if (a.len(), a) <= (b.len(), b) { (a, b) } else { (b, a) };
    sequence::ratio(first, second, options) * 100.0
}

pub fn text_similarity(a: &[char], b: &[char], options: MatcherOptions) -> f64 {
    similarity(a, b, options)
}

pub fn token_similarity(a: &[String], b: &[String], options: MatcherOptions) -> f64 {
    similarity(a, b, options)
}

pub fn line_similarity(a: &[String], b: &[String], options: MatcherOptions) -> f64 {
    similarity(a, b, options)
}

/// Compares variable-normalized texts, so pure renames score 100.
pub fn variable_similarity(a: &[char], b: &[char], options: MatcherOptions) -> f64 {
    similarity(a, b, options)
}

/// Compares keyword sequences; blind to names and layout.
pub fn control_flow_similarity(
    a: &[ControlKeyword],
    b: &[ControlKeyword],
    options: MatcherOptions,
) -> f64 {
    similarity(a, b, options)
}

/// All five ratios for one (submission, reference) pair, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    pub text: f64,
    pub token: f64,
    pub line: f64,
    pub variable: f64,
    pub control_flow: f64,
}

impl MetricSet {
    /// Score two fingerprints against each other.
    pub fn between(a: &Fingerprint, b: &Fingerprint, options: MatcherOptions) -> Self {
        Self {
            text: text_similarity(&a.chars, &b.chars, options),
            token: token_similarity(&a.tokens, &b.tokens, options),
            line: line_similarity(&a.lines, &b.lines, options),
            variable: variable_similarity(&a.normalized, &b.normalized, options),
            control_flow: control_flow_similarity(&a.keywords, &b.keywords, options),
        }
    }

    /// Fingerprint both texts and score them.
    pub fn compute(a: &str, b: &str, normalizer: &Normalizer, options: MatcherOptions) -> Self {
        Self::between(&normalizer.fingerprint(a), &normalizer.fingerprint(b), options)
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Text => self.text,
            Metric::Token => self.token,
            Metric::Line => self.line,
            Metric::Variable => self.variable,
            Metric::ControlFlow => self.control_flow,
        }
    }

    /// `(metric, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL
            .into_iter()
            .map(|m| (m, self.get(m)))
    }
}
