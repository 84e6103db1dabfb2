use anyhow::Result;
use clap::Parser;
use plagcheck::cli::{AppContext, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = cli.context();
    init_tracing(&ctx, matches!(cli.command, Commands::Serve(_)));

    match cli.command {
        Commands::Check(args) => plagcheck::cli_ext::check_cmd::run(args, &ctx),
        Commands::Serve(args) => plagcheck::cli_ext::serve_cmd::run(args, &ctx),
        Commands::Init(args) => plagcheck::infra::config::init(args, &ctx),
    }
}

/// Stderr logging; `RUST_LOG` wins over the flag-derived level.
fn init_tracing(ctx: &AppContext, serving: bool) {
    let level = match ctx.verbose {
        0 if ctx.quiet => "error",
        0 if serving => "info",
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!ctx.no_color)
        .with_writer(std::io::stderr)
        .init();
}
