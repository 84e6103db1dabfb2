use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    cli::{AppContext, InitArgs},
    core::{aggregate::DEFAULT_THRESHOLD, sequence::MatcherOptions},
};

/// Config files probed in the working directory, first hit wins
const CONFIG_FILES: [&str; 4] = [
    "plagcheck.toml",
    "plagcheck.yaml",
    "plagcheck.json",
    ".plagcheck.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Composite score at which a submission counts as plagiarised
    pub threshold: f64,

    /// Reference corpus discovery
    pub corpus: CorpusConfig,

    /// Sequence matcher tuning
    pub matcher: MatcherOptions,

    /// HTTP listener for `plagcheck serve`
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig
{
    /// Directory holding the reference documents
    pub path: PathBuf,

    /// File extensions (without dot) that count as documents
    pub extensions: Vec<String>,

    /// Descend into subdirectories
    pub recursive: bool,

    /// Extra glob patterns to skip (relative to `path`)
    pub ignore_patterns: Vec<String>,

    /// Load dot-files such as `.copied.py`
    pub include_hidden: bool,

    /// Skip files excluded by .gitignore / .ignore
    pub respect_gitignore: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig
{
    pub host: String,
    pub port: u16,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            threshold: DEFAULT_THRESHOLD,
            corpus: CorpusConfig::default(),
            matcher: MatcherOptions::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for CorpusConfig
{
    fn default() -> Self
    {
        Self {
            path: PathBuf::from("dataset"),
            extensions: vec!["py".to_string()],
            recursive: false,
            ignore_patterns: Vec::new(),
            include_hidden: true,
            respect_gitignore: false,
        }
    }
}

impl Default for ServerConfig
{
    fn default() -> Self
    {
        Self { host: "127.0.0.1".to_string(), port: 5000 }
    }
}

/// Load layered configuration: defaults, then the first config file
/// found (or `explicit`), then `PLAGCHECK_*` environment variables.
pub fn load_config(explicit: Option<&Path>) -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Start from serialized defaults so partial files are fine
    let defaults =
        config::Config::try_from(&Config::default()).context("Failed to build default config")?;
    builder = builder.add_source(defaults);

    match explicit
    {
        Some(path) =>
        {
            if !path.exists()
            {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            builder = builder.add_source(config::File::from(path));
        }
        None =>
        {
            for path in &CONFIG_FILES
            {
                if Path::new(path).exists()
                {
                    builder = builder.add_source(config::File::with_name(path));
                    break;
                }
            }
        }
    }

    // PLAGCHECK_THRESHOLD, PLAGCHECK_SERVER__PORT, ...
    builder = builder.add_source(
        config::Environment::with_prefix("PLAGCHECK")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("plagcheck.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
