//! Corpus comparison: score a submission against every reference
//! document and rank the results.
//!
//! The corpus is fingerprinted once when the [`Comparator`] is built;
//! each submission is fingerprinted once per call. Documents are scored
//! independently (in parallel) and then stably sorted by composite.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    aggregate::{self, InvalidThreshold, RiskTier, Threshold},
    metrics::MetricSet,
    normalize::{Fingerprint, NormalizeError, Normalizer},
    sequence::MatcherOptions,
};

/// Failures of the scoring entry points.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    /// Nothing to compare against, so "most similar" is undefined.
    #[error("reference corpus is empty")]
    EmptyCorpus,

    #[error(transparent)]
    InvalidThreshold(#[from] InvalidThreshold),

    #[error("failed to initialise normalizer: {0}")]
    Normalizer(#[from] NormalizeError),
}

/// One reference file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    name: String,
    text: String,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Reference documents keyed by name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    docs: IndexMap<String, Document>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. A repeated name replaces the earlier text but
    /// keeps its original position.
    pub fn insert(&mut self, doc: Document) -> Option<Document> {
        self.docs.insert(doc.name.clone(), doc)
    }

    pub fn get(&self, name: &str) -> Option<&Document> {
        self.docs.get(name)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.values()
    }
}

impl FromIterator<Document> for Corpus {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut corpus = Corpus::new();
        for doc in iter {
            corpus.insert(doc);
        }
        corpus
    }
}

/// Outcome of one (submission, reference) comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Reference document name.
    pub file: String,
    /// Weighted composite in `[0, 100]`, two decimals.
    pub score: f64,
    pub risk: RiskTier,
    pub plagiarised: bool,
    /// Threshold the verdict was computed against.
    pub threshold: Threshold,
    pub metrics: MetricSet,
}

impl MatchResult {
    /// Aggregate a metric set into a classified result.
    pub fn from_metrics(file: impl Into<String>, metrics: MetricSet, threshold: Threshold) -> Self {
        let score = aggregate::composite(&metrics);
        Self {
            file: file.into(),
            score,
            risk: aggregate::classify(score, threshold),
            plagiarised: aggregate::is_plagiarised(score, threshold),
            threshold,
            metrics,
        }
    }

    pub fn statement(&self) -> &'static str {
        aggregate::statement(self.plagiarised)
    }
}

/// Results ranked by composite, highest first. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    results: Vec<MatchResult>,
}

impl ComparisonReport {
    /// Stable-sort `results` by descending score. Ties keep input order.
    pub fn from_results(mut results: Vec<MatchResult>) -> Result<Self, ScoreError> {
        if results.is_empty() {
            return Err(ScoreError::EmptyCorpus);
        }
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(Self { results })
    }

    pub fn most_similar(&self) -> &MatchResult {
        // Non-empty by construction.
        &self.results[0]
    }

    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn into_results(self) -> Vec<MatchResult> {
        self.results
    }
}

/// Scores submissions against a fixed corpus.
#[derive(Debug)]
pub struct Comparator {
    /// `(name, fingerprint)` in corpus order.
    references: Vec<(String, Fingerprint)>,
    normalizer: Normalizer,
    threshold: Threshold,
    options: MatcherOptions,
}

impl Comparator {
    /// Fingerprint every document of `corpus` up front.
    pub fn new(
        corpus: &Corpus,
        threshold: Threshold,
        options: MatcherOptions,
    ) -> Result<Self, ScoreError> {
        let normalizer = Normalizer::new()?;

        let docs: Vec<&Document> = corpus.iter().collect();
        let references = docs
            .par_iter()
            .map(|doc| (doc.name.clone(), normalizer.fingerprint(&doc.text)))
            .collect();

        Ok(Self {
            references,
            normalizer,
            threshold,
            options,
        })
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn options(&self) -> MatcherOptions {
        self.options
    }

    pub fn corpus_len(&self) -> usize {
        self.references.len()
    }

    /// Rank every reference document against `submission`.
    pub fn score(&self, submission: &str) -> Result<ComparisonReport, ScoreError> {
        if self.references.is_empty() {
            return Err(ScoreError::EmptyCorpus);
        }

        let probe = self.normalizer.fingerprint(submission);

        // Indexed parallel collect preserves corpus order.
        let results: Vec<MatchResult> = self
            .references
            .par_iter()
            .map(|(name, reference)| {
                let metrics = MetricSet::between(&probe, reference, self.options);
                MatchResult::from_metrics(name.as_str(), metrics, self.threshold)
            })
            .collect();

        let report = ComparisonReport::from_results(results)?;

        let top = report.most_similar();
        debug!(
            documents = report.len(),
            top_file = %top.file,
            top_score = top.score,
            risk = %top.risk,
            "submission scored"
        );

        Ok(report)
    }
}

/// Score `submission` against `corpus` with default matcher options.
pub fn score(
    submission: &str,
    corpus: &Corpus,
    threshold: f64,
) -> Result<ComparisonReport, ScoreError> {
    let threshold = Threshold::new(threshold)?;
    if corpus.is_empty() {
        return Err(ScoreError::EmptyCorpus);
    }

    Comparator::new(corpus, threshold, MatcherOptions::default())?.score(submission)
}
