//! CLI administration tool for shortlink.
//!
//! Runs the same services as the HTTP server against the configured
//! backends, so links can be managed without going through the API.
//!
//! # Usage
//!
//! ```bash
//! # Create a link (prompts for confirmation)
//! cargo run --bin admin -- link create https://example.com --alias docs
//!
//! # Show a link and its statistics
//! cargo run --bin admin -- link show docs
//! cargo run --bin admin -- link stats docs
//!
//! # Soft-delete a link by id
//! cargo run --bin admin -- link delete 42
//!
//! # Check backend connectivity
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see `shortlink::config`.

use shortlink::application::services::{CreateShortLink, short_url};
use shortlink::config::{self, Config, StorageBackend};
use shortlink::server::{self, Backends};
use shortlink::state::{DynLinkService, DynStatsService};

use anyhow::Result;
use chrono::TimeDelta;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;

/// Longest lifetime accepted by `link create`, matching the HTTP API.
const MAX_TTL_HOURS: i64 = 87_600;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Backend operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Create a short link
    Create {
        /// Target URL (http or https)
        url: String,

        /// Custom alias to use as the code
        #[arg(short, long)]
        alias: Option<String>,

        /// Lifetime in hours (0 = never expires, at most 87600)
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..=MAX_TTL_HOURS))]
        ttl_hours: Option<i64>,

        /// Creator recorded on the link
        #[arg(long, default_value = "admin")]
        created_by: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Resolve a code or alias, applying the expiry and deletion checks
    Show {
        code: String,
    },

    /// Show click statistics for a code
    Stats {
        code: String,
    },

    /// Soft-delete a link by id
    Delete {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Backend operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check storage and cache connectivity
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    if config.storage_backend == StorageBackend::Memory {
        println!(
            "{}",
            "⚠️  STORAGE_BACKEND=memory: changes are discarded when this command exits".yellow()
        );
    }

    let backends = server::connect_backends(&config).await?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &config, backends).await?,
        Commands::Db { action } => handle_db_action(action, backends).await?,
    }

    Ok(())
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, config: &Config, backends: Backends) -> Result<()> {
    let (links, stats) = server::build_services(config, backends);

    match action {
        LinkAction::Create {
            url,
            alias,
            ttl_hours,
            created_by,
            yes,
        } => {
            let request = CreateShortLink {
                target: url,
                alias,
                created_by,
                ttl: ttl_hours.map(TimeDelta::hours),
            };
            create_link(links, request, &config.base_url, yes).await?;
        }
        LinkAction::Show { code } => show_link(links, &code, &config.base_url).await?,
        LinkAction::Stats { code } => show_stats(stats, &code).await?,
        LinkAction::Delete { id, yes } => delete_link(links, id, yes).await?,
    }

    Ok(())
}

async fn create_link(
    service: Arc<DynLinkService>,
    request: CreateShortLink,
    base_url: &str,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔗 Create Short Link".bright_blue().bold());
    println!();
    println!("  Target: {}", request.target.cyan());
    if let Some(alias) = &request.alias {
        println!("  Alias:  {}", alias.cyan());
    }
    if let Some(ttl) = request.ttl {
        println!("  TTL:    {}h", ttl.num_hours().to_string().cyan());
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this link?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let link = service
        .create_short_link(request)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✅ Link created".green().bold());
    println!("  ID:        {}", link.id.to_string().bright_black());
    println!(
        "  Short URL: {}",
        short_url(base_url, &link.code).bright_yellow().bold()
    );
    println!();

    Ok(())
}

async fn show_link(service: Arc<DynLinkService>, code: &str, base_url: &str) -> Result<()> {
    let link = service
        .get_short_link(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{}", "🔎 Short Link".bright_blue().bold());
    println!();
    println!("  ID:        {}", link.id.to_string().bright_black());
    println!("  Short URL: {}", short_url(base_url, &link.code).cyan());
    println!("  Target:    {}", link.target.bright_white());
    println!("  Created:   {} by {}", link.created_at.format("%Y-%m-%d %H:%M"), link.created_by);
    match link.expires_at {
        Some(expires_at) => println!("  Expires:   {}", expires_at.format("%Y-%m-%d %H:%M")),
        None => println!("  Expires:   {}", "never".bright_black()),
    }
    println!("  Clicks:    {}", link.click_count.to_string().bright_green());
    println!();

    Ok(())
}

async fn show_stats(service: Arc<DynStatsService>, code: &str) -> Result<()> {
    let stats = service
        .get_stats(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let status = if stats.link.active {
        "ACTIVE".green()
    } else {
        "DELETED".red()
    };
    println!("  Code:    {} ({})", stats.link.code.cyan(), status);
    println!(
        "  Clicks:  {}",
        stats.link.click_count.to_string().bright_green().bold()
    );
    println!("  Events:  {}", stats.recorded_events);
    println!();

    if stats.recent_clicks.is_empty() {
        println!("{}", "  No clicks recorded".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<20} {:<16} {}",
        "When".bright_white().bold(),
        "IP".bright_white().bold(),
        "User agent".bright_white().bold()
    );
    println!("  {}", "─".repeat(70).bright_black());

    for click in &stats.recent_clicks {
        println!(
            "  {:<20} {:<16} {}",
            click
                .occurred_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .bright_black(),
            click.client_ip.as_deref().unwrap_or("-"),
            click.user_agent.as_deref().unwrap_or("-")
        );
    }
    println!();

    Ok(())
}

async fn delete_link(service: Arc<DynLinkService>, id: i64, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Short Link".bright_blue().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete link {id}?"))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_short_link(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "✅ Link deleted".green().bold());
    println!();

    Ok(())
}

/// Handles backend diagnostic commands.
async fn handle_db_action(action: DbAction, backends: Backends) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking backends...".bright_blue());

            let storage_ok = backends.links.health_check().await;
            if storage_ok {
                println!("{}", "✅ Storage OK".green().bold());
            } else {
                println!("{}", "❌ Storage did not answer".red().bold());
            }

            if backends.cache.health_check().await {
                println!("{}", "✅ Cache OK".green().bold());
            } else {
                println!("{}", "⚠️  Cache unreachable".yellow());
            }

            if !storage_ok {
                anyhow::bail!("storage check failed");
            }
        }
    }

    Ok(())
}
