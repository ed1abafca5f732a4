use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nakama_cli::cli::{commands, resolve_config, TerminalNotifier, BASE_URL_ENV};
use nakama_core::tracing_setup;
use nakama_core::transport::HttpTransport;
use nakama_core::CoreRuntime;

#[derive(Parser)]
#[command(name = "nakama")]
#[command(about = "Live feed and notifications for a nakama server")]
struct Cli {
    /// Path to JSON config file (baseUrl, pageSize, authToken, ...)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Server origin, overrides the config file and NAKAMA_BASE_URL
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the home feed
    Feed {
        /// Older pages to load after the first one
        #[arg(long, default_value_t = 0)]
        pages: usize,
        /// Keep running and show live posts
        #[arg(long, short)]
        follow: bool,
        /// How often queued live posts are flushed into view
        #[arg(long, default_value_t = 10)]
        flush_secs: u64,
    },

    /// Show notifications
    Notifications {
        #[arg(long, short)]
        follow: bool,
        #[arg(long, default_value_t = 2)]
        flush_secs: u64,
    },

    /// Run in the background and report notifications and unread badges
    Watch {
        /// Allow notifications to be shown (otherwise permission is denied)
        #[arg(long)]
        notify: bool,
    },

    /// Publish a post
    Post {
        content: String,
        /// Mark the post as a spoiler of this subject
        #[arg(long)]
        spoiler_of: Option<String>,
    },

    /// Check for unread notifications
    Unread,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init_tracing_with_service("nakama-cli").context("Failed to open log file")?;

    let base_url = cli.base_url.or_else(|| std::env::var(BASE_URL_ENV).ok());
    let config = resolve_config(cli.config.as_deref(), base_url, cli.token)?;
    tracing::debug!(base_url = %config.base_url, page_size = config.page_size, "config resolved");

    let transport = Arc::new(HttpTransport::new(&config).context("Failed to build HTTP client")?);
    let unauthorized = transport.watch_unauthorized();
    let notify = matches!(cli.command, Commands::Watch { notify: true });
    let runtime = CoreRuntime::new(config, transport, Arc::new(TerminalNotifier::new(notify)));

    let result = match cli.command {
        Commands::Feed {
            pages,
            follow,
            flush_secs,
        } => commands::feed(&runtime, pages, follow, Duration::from_secs(flush_secs)).await,
        Commands::Notifications { follow, flush_secs } => {
            commands::notifications(&runtime, follow, Duration::from_secs(flush_secs)).await
        }
        Commands::Watch { .. } => commands::watch(&runtime, unauthorized).await,
        Commands::Post {
            content,
            spoiler_of,
        } => commands::post(&runtime, &content, spoiler_of.as_deref()).await,
        Commands::Unread => commands::unread(&runtime).await,
    };

    runtime.shutdown();
    result
}
