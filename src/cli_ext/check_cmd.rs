//! `plagcheck check`: score one submission against the corpus and print
//! either a ranked table or the JSON response body.

use std::{
    io::IsTerminal,
    path::Path,
};

use anyhow::{Context, Result};
use tracing::instrument;

use crate::{
    cli::{AppContext, CheckArgs},
    core::report::{CheckResponse, render_summary, render_table},
    infra::{
        config::load_config,
        corpus::build_comparator,
        io::{read_source, read_stdin},
    },
};

#[instrument(skip_all)]
pub fn run(
    args: CheckArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let mut cfg = load_config(ctx.config.as_deref())?;

    // CLI flags win over file and environment
    if let Some(corpus) = args.corpus
    {
        cfg.corpus.path = corpus;
    }
    if let Some(threshold) = args.threshold
    {
        cfg.threshold = threshold;
    }

    let comparator = build_comparator(&cfg)?;
    let submission = read_submission(args.submission.as_deref())?;

    let report = comparator
        .score(&submission)
        .context("Failed to score submission")?;

    if args.json
    {
        let body = serde_json::to_string_pretty(&CheckResponse::from(&report))
            .context("Failed to serialize report")?;
        println!("{body}");
        return Ok(());
    }

    let color = !ctx.no_color && std::io::stdout().is_terminal();
    println!("{}", render_table(&report, args.top, color));
    if !ctx.quiet
    {
        println!("{}", render_summary(&report, color));
    }

    Ok(())
}

/// File contents, or stdin for `None` and `-`.
fn read_submission(path: Option<&Path>) -> Result<String>
{
    match path
    {
        Some(p) if p != Path::new("-") => read_source(p),
        _ => read_stdin(),
    }
}
