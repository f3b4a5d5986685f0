//! Command-line surface and human-readable reporting for the `check`
//! command. Flags override the config file; the config file supplies
//! defaults.

use crate::config::Config;
use crate::feed::{
    check_limit, feed_url, FeedClient, FeedParams, ProbeProgress, SearchError, SearchOutcome,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(
    name = "feedprobe",
    about = "Check and find a valid product feed configuration",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find working limit parameter values and paginated feed URLs
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Store domain to probe
    pub domain: String,

    /// Limit the number of products per feed page
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Find a working limit parameter automatically
    #[arg(short = 'a', long)]
    pub auto_limit: bool,

    /// Omit all but the first available variant per product
    #[arg(short, long)]
    pub no_variants: bool,

    /// Limit the number of concurrent requests per host
    #[arg(short = 'c', long)]
    pub max_concurrent_requests: Option<usize>,
}

/// Runs the `check` command end to end and prints the outcome.
///
/// Fatal conditions (bad domain, metadata fetch failure) bubble up as
/// errors and exit non-zero. A manual-mode page failure is an expected
/// outcome: it prints the cause and a corrective hint, then exits zero.
pub async fn run_check(args: CheckArgs, config: &Config) -> Result<()> {
    let limit = args.limit.unwrap_or(config.limit);
    let max_concurrent = args
        .max_concurrent_requests
        .unwrap_or(config.max_concurrent_requests);
    let no_variants = args.no_variants || config.no_variants;

    let client = FeedClient::new(
        max_concurrent,
        Duration::from_secs(config.request_timeout_secs),
    )
    .context("failed to build HTTP client")?;

    let params = FeedParams {
        domain: args.domain.clone(),
        page: 0,
        limit,
        no_variants,
    };

    // Progress goes to the same terminal as the summary, rewritten in place.
    let (progress_tx, mut progress_rx) = mpsc::channel::<ProbeProgress>(32);
    let printer = tokio::spawn(async move {
        while let Some((succeeded, total)) = progress_rx.recv().await {
            print!("\rFetching feed pages ({succeeded} of {total} succeeded) ");
            let _ = std::io::stdout().flush();
        }
    });

    let outcome = check_limit(&client, &params, args.auto_limit, Some(progress_tx)).await;
    // The sender was moved into check_limit, so the printer has drained by now.
    let _ = printer.await;

    match outcome {
        Ok(SearchOutcome::NotPaginated) => {
            println!("Free plan - no pagination available");
            Ok(())
        }
        Ok(SearchOutcome::Found { page_count, limit }) => {
            println!("\nA limit of {limit} works. The feed URLs are:");
            for page in 1..=page_count {
                let url = feed_url(&FeedParams {
                    domain: args.domain.clone(),
                    page,
                    limit,
                    no_variants,
                })?;
                println!("{url}");
            }
            Ok(())
        }
        Err(SearchError::Generation { limit, source }) => {
            println!("\nSome feed pages did not work at limit {limit}.");
            println!("{source}");
            println!("Lower the limit (hint: use the --limit flag) and try again!");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
