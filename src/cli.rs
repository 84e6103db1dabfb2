use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub verbose: u8,    // global -v / -vv

    /// Explicit --config path, if any
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "plagcheck")]
#[command(about = "Score a source file against a reference corpus for likely plagiarism")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Read configuration from this file instead of probing the working directory
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Only print results and errors
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn context(&self) -> AppContext {
        AppContext {
            quiet: self.quiet,
            no_color: self.no_color,
            verbose: self.verbose,
            config: self.config.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare one submission against every corpus document
    Check(CheckArgs),

    /// Serve `POST /check` over HTTP
    Serve(ServeArgs),

    /// Initialize a plagcheck.toml config file
    Init(InitArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Submission file; reads stdin when omitted or `-`
    pub submission: Option<PathBuf>,

    /// Reference corpus directory (overrides `corpus.path`)
    #[arg(short, long, value_name = "DIR")]
    pub corpus: Option<PathBuf>,

    /// Plagiarism threshold in [0, 100] (overrides `threshold`)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Show only the N best matches in the table
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Print the JSON response body instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Reference corpus directory (overrides `corpus.path`)
    #[arg(short, long, value_name = "DIR")]
    pub corpus: Option<PathBuf>,

    /// Address to bind (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Plagiarism threshold in [0, 100] (overrides `threshold`)
    #[arg(short, long)]
    pub threshold: Option<f64>,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to write plagcheck.toml into
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}
