//! Reference corpus loading.
//!
//! Reads every eligible file under a directory into a [`Corpus`] keyed by
//! its path relative to that directory. Any I/O or decoding failure is
//! fatal: a partially loaded corpus would silently skew every report.

use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::{
    core::{
        aggregate::Threshold,
        compare::{Comparator, Corpus, Document},
    },
    infra::{
        config::{Config, CorpusConfig},
        io::read_source,
        walk::FileWalker,
    },
};

/// Load the documents under `root` selected by `cfg`.
#[instrument(skip(root, cfg), fields(root = %root.display()))]
pub fn load_corpus(
    root: &Path,
    cfg: &CorpusConfig,
) -> Result<Corpus> {
    if !root.is_dir() {
        anyhow::bail!("Corpus directory not found: {}", root.display());
    }

    let walker = FileWalker::new(&cfg.ignore_patterns)?
        .with_extensions(&cfg.extensions)
        .with_include_hidden(cfg.include_hidden)
        .with_gitignore(cfg.respect_gitignore)
        .with_max_depth(if cfg.recursive { None } else { Some(1) });

    let files = walker
        .walk_files(root)
        .with_context(|| format!("Failed to list corpus directory {}", root.display()))?;

    // Read in parallel; the indexed collect keeps the sorted order.
    let docs: Vec<Document> = files
        .par_iter()
        .map(|path| -> Result<Document> {
            let text = read_source(path)
                .with_context(|| format!("Failed to load corpus document {}", path.display()))?;
            Ok(Document::new(document_name(root, path), text))
        })
        .collect::<Result<_>>()?;

    let corpus: Corpus = docs.into_iter().collect();
    info!(documents = corpus.len(), "corpus loaded");

    Ok(corpus)
}

/// Validate the threshold, load the corpus and fingerprint it.
///
/// An empty corpus is not fatal here; scoring against it reports
/// `EmptyCorpus` instead.
pub fn build_comparator(cfg: &Config) -> Result<Comparator> {
    let threshold = Threshold::new(cfg.threshold).context("Invalid threshold in configuration")?;
    let corpus = load_corpus(&cfg.corpus.path, &cfg.corpus)?;

    if corpus.is_empty() {
        warn!(path = %cfg.corpus.path.display(), "corpus has no eligible documents");
    }

    Comparator::new(&corpus, threshold, cfg.matcher).context("Failed to prepare comparator")
}

/// Root-relative name with `/` separators on every platform.
fn document_name(
    root: &Path,
    path: &Path,
) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
