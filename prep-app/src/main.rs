use anyhow::Result;
use clap::Parser;
use prep_common::observability::LogConfig;
use prep_common::observability::init_logging;
use prep_config::{PrepConfig, PrepConfigLoader};
use std::path::PathBuf;

mod report;
mod session;

/// Interview prep guide generator: encyclopedia infobox + financial profile
/// + an AI-written prep guide with follow-up Q&A and practice questions.
#[derive(Parser, Debug)]
#[command(name = "prep", version)]
pub struct Cli {
    /// Company name, as titled on the encyclopedia
    pub company: String,

    /// Role you are applying for
    #[arg(long, default_value = "Software Engineer")]
    pub role: String,

    /// Path to a YAML config file (optional; `PREP_` env vars also work)
    #[arg(long, default_value = "prep.yaml")]
    pub config: PathBuf,

    /// Write the generated guide to this file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Print the report and exit without the follow-up loop
    #[arg(long)]
    pub non_interactive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let cfg: PrepConfig = PrepConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()?;

    init_logging(LogConfig::default())?;

    session::run(cli, cfg).await
}
