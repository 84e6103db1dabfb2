//! Wire shapes for check requests and responses, plus the terminal
//! table used by `plagcheck check`.

use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled, settings::Style};

use crate::core::{
    aggregate::{RiskTier, round2},
    compare::{ComparisonReport, MatchResult},
};

/// Message returned when a request carries no submission.
pub const NO_CODE_MESSAGE: &str = "No code provided";

/// Request-level failures, raised before any scoring happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("No code provided")]
    NoCode,
}

/// Body of a check request: `{"code": "..."}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub code: Option<String>,
}

impl CheckRequest {
    /// The submission text, or `NoCode` when the field is absent/null.
    pub fn into_code(self) -> Result<String, RequestError> {
        self.code.ok_or(RequestError::NoCode)
    }
}

/// Per-metric breakdown, each rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedMetrics {
    pub overall_similarity: f64,
    pub token_similarity: f64,
    pub line_similarity: f64,
    pub variable_renaming_similarity: f64,
    pub control_flow_similarity: f64,
}

/// One ranked entry as serialized on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub file: String,
    pub match_score: f64,
    pub plagiarism_risk: RiskTier,
    pub threshold: f64,
    pub plagiarised: bool,
    pub plagiarism_statement: String,
    pub detailed_metrics: DetailedMetrics,
}

impl From<&MatchResult> for MatchRecord {
    fn from(r: &MatchResult) -> Self {
        Self {
            file: r.file.clone(),
            match_score: r.score,
            plagiarism_risk: r.risk,
            threshold: r.threshold.value(),
            plagiarised: r.plagiarised,
            plagiarism_statement: r.statement().to_string(),
            detailed_metrics: DetailedMetrics {
                overall_similarity: round2(r.metrics.text),
                token_similarity: round2(r.metrics.token),
                line_similarity: round2(r.metrics.line),
                variable_renaming_similarity: round2(r.metrics.variable),
                control_flow_similarity: round2(r.metrics.control_flow),
            },
        }
    }
}

/// Full response body: the top match plus the ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub most_similar_file: MatchRecord,
    pub all_results: Vec<MatchRecord>,
}

impl From<&ComparisonReport> for CheckResponse {
    fn from(report: &ComparisonReport) -> Self {
        Self {
            most_similar_file: MatchRecord::from(report.most_similar()),
            all_results: report
                .results()
                .iter()
                .map(MatchRecord::from)
                .collect(),
        }
    }
}

/// Error body: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "#")]
    rank: usize,
    file: String,
    score: String,
    risk: String,
    text: String,
    token: String,
    line: String,
    variable: String,
    #[tabled(rename = "control flow")]
    control_flow: String,
}

/// Render the `top` best matches (all when `None`) as a table.
pub fn render_table(report: &ComparisonReport, top: Option<usize>, color: bool) -> String {
    let limit = top.unwrap_or(report.len());

    let rows: Vec<Row> = report
        .results()
        .iter()
        .take(limit)
        .enumerate()
        .map(|(idx, r)| Row {
            rank: idx + 1,
            file: r.file.clone(),
            score: format!("{:.2}", r.score),
            risk: paint_risk(r.risk, color),
            text: format!("{:.2}", r.metrics.text),
            token: format!("{:.2}", r.metrics.token),
            line: format!("{:.2}", r.metrics.line),
            variable: format!("{:.2}", r.metrics.variable),
            control_flow: format!("{:.2}", r.metrics.control_flow),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// One-line verdict for the best match.
pub fn render_summary(report: &ComparisonReport, color: bool) -> String {
    let top = report.most_similar();
    format!(
        "Most similar: {} ({:.2}, {}, threshold {})\n{}",
        top.file,
        top.score,
        paint_risk(top.risk, color),
        top.threshold,
        top.statement()
    )
}

fn paint_risk(risk: RiskTier, color: bool) -> String {
    if !color {
        return risk.to_string();
    }
    match risk {
        RiskTier::High => risk.red().bold().to_string(),
        RiskTier::Medium => risk.yellow().bold().to_string(),
        RiskTier::Low => risk.green().to_string(),
    }
}
