mod cache;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod text;
mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::jql::{self, JqlCommandArgs};
use crate::cmd::refresh;
use crate::cmd::update::{self, UpdateCommandArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::{ConsoleNotifier, FileBlockStore, JiraClient};

const LOG_ENV: &str = "TICKETLINK_LOG";
const DEFAULT_FILTER: &str = "warn,notify=info";

#[derive(Parser)]
#[command(
    name = "ticketlink",
    author,
    version,
    about = "Turn Jira ticket keys in notes into live, formatted links"
)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every ticket reference in a block with fresh ticket data.
    Update(UpdateArgs),
    /// Append the results of a JQL query as child blocks.
    Jql(JqlArgs),
    /// Re-run `update` for every block updated before.
    Refresh,
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct UpdateArgs {
    /// Block file to rewrite.
    block: PathBuf,
    /// Use the second configured organization.
    #[arg(long)]
    second: bool,
}

#[derive(Args)]
struct JqlArgs {
    /// Block file receiving the results.
    block: PathBuf,
    /// Use the second configured organization.
    #[arg(long)]
    second: bool,
    /// Query to run instead of the configured one.
    #[arg(short, long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,ticketlink=debug,notify=info")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Config(args) = cli.command {
        return config_cmd::run(args.command);
    }

    let context = AppContext::new(
        AppConfig::load()?,
        Arc::new(JiraClient::new()),
        Arc::new(FileBlockStore::new()),
        Arc::new(ConsoleNotifier),
    );

    match cli.command {
        Commands::Update(args) => {
            let outcome = update::run(
                &context,
                UpdateCommandArgs {
                    block: args.block,
                    second: args.second,
                },
            )
            .await?;
            if outcome.written {
                println!(
                    "Updated {} of {} tickets.",
                    outcome.fetched,
                    outcome.keys.len()
                );
            } else {
                println!("No tickets could be fetched; block left unchanged.");
            }
        }
        Commands::Jql(args) => {
            let inserted = jql::run(
                &context,
                JqlCommandArgs {
                    block: args.block,
                    second: args.second,
                    query: args.query,
                },
            )
            .await?;
            println!("Inserted {inserted} issues.");
        }
        Commands::Refresh => {
            let summary = refresh::run(&context).await?;
            println!(
                "Refreshed {} blocks ({} removed, {} failed).",
                summary.refreshed, summary.removed, summary.failed
            );
        }
        Commands::Config(_) => {}
    }

    Ok(())
}
