//! **plagcheck** - Composite source-similarity scoring for plagiarism checks
//!
//! Compares a submission against a reference corpus on five metrics
//! (raw text, identifier tokens, lines, variable-normalized text, control
//! flow), folds them into one weighted score and ranks every reference.

/// Command-line interface with clap integration
pub mod cli;

/// Subcommand handlers
pub mod cli_ext {
    /// One-shot scoring of a submission file or stdin
    pub mod check_cmd;

    /// Long-running HTTP service
    pub mod serve_cmd;
}

/// Scoring pipeline - matcher, normalization, metrics, aggregation, ranking
pub mod core {
    /// Ratcliff/Obershelp longest-block sequence matcher
    pub mod sequence;
    pub use sequence::{MatcherOptions, SequenceMatcher};

    /// Tokens, lines, control keywords and variable normalization
    pub mod normalize;
    pub use normalize::{Fingerprint, NameCollector, Normalizer};

    /// The five per-pair similarity metrics
    pub mod metrics;
    pub use metrics::{Metric, MetricSet};

    /// Weighted composite, risk tiers and the plagiarism verdict
    pub mod aggregate;
    pub use aggregate::{RiskTier, Threshold};

    /// Corpus-wide comparison and ranking
    pub mod compare;
    pub use compare::{Comparator, ComparisonReport, Corpus, Document, MatchResult, ScoreError};

    /// Wire shapes and terminal rendering
    pub mod report;
    pub use report::{CheckRequest, CheckResponse};
}

/// Language processing - name collection with tree-sitter
pub mod parsers {
    /// Python bound/referenced name collection
    pub mod python_parser;
    pub use python_parser::PythonNameCollector;
}

/// Infrastructure - Configuration, I/O, corpus loading
pub mod infra {
    /// Layered configuration (defaults, file, environment)
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// UTF-8 source reading with memory mapping for large files
    pub mod io;

    /// Gitignore-aware directory walking
    pub mod walk;
    pub use walk::FileWalker;

    /// Reference corpus loading
    pub mod corpus;
    pub use corpus::{build_comparator, load_corpus};
}

/// HTTP service (axum)
pub mod server;

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use infra::{Config, load_config, load_corpus};

// Core types for external consumers
pub use crate::core::compare::score;
pub use crate::core::{Comparator, ComparisonReport, Corpus, Document, MatchResult, RiskTier, ScoreError, Threshold};
