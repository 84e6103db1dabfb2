//! `plagcheck serve`: load the corpus once and answer `POST /check`.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::{
    cli::{AppContext, ServeArgs},
    infra::{config::load_config, corpus::build_comparator},
    server,
};

pub fn run(
    args: ServeArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let mut cfg = load_config(ctx.config.as_deref())?;

    if let Some(corpus) = args.corpus
    {
        cfg.corpus.path = corpus;
    }
    if let Some(threshold) = args.threshold
    {
        cfg.threshold = threshold;
    }
    if let Some(host) = args.host
    {
        cfg.server.host = host;
    }
    if let Some(port) = args.port
    {
        cfg.server.port = port;
    }

    let comparator = Arc::new(build_comparator(&cfg)?);
    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(server::run(&addr, comparator))
}
