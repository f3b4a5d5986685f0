use anyhow::{Context, Result};
use clap::Parser;
use feedprobe::cli::{self, Cli, Command};
use feedprobe::config::Config;
use std::path::PathBuf;

/// Get the config directory path (~/.config/feedprobe/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("feedprobe"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for the URL list
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let config = Config::load(&get_config_dir()?.join("config.toml"))?;

    match args.command {
        Command::Check(check) => cli::run_check(check, &config).await,
    }
}
