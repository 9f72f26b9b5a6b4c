#![allow(
    dead_code,
    unused_imports,
    unused_variables,
    unused_mut,
    clippy::too_many_arguments,
    clippy::needless_borrows_for_generic_args,
    clippy::useless_format,
    clippy::len_zero,
    clippy::field_reassign_with_default,
    clippy::format_in_format_args
)]

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use beehive_core::sync::ResourceFetcher;
use beehive_core::{
    NotificationsFetcher, ResourceKey, RouteTable, UploadScope, UploadsFetcher, NOTIFICATIONS_KEY,
};

mod commands;
mod config;

use commands::{
    handle_admin_command, handle_chat_command, handle_config_command,
    handle_notifications_command, handle_routes_command, handle_uploads_command, AdminCommand,
    ChatCommand, ConfigArgs, NotificationsArgs, RoutesArgs, UploadsCommand,
};
use config::CliConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "beehive")]
#[command(version = VERSION)]
#[command(about = "Beehive - chat, notifications and media gallery from the terminal")]
#[command(long_about = r#"
Beehive talks to a media-sharing backend on behalf of a signed-in user or admin.
Users chat with the admin channel and manage their own gallery; admins see
notifications, browse every user's uploads and read the dashboard.

Set auth.token and auth.user_id in ~/.config/beehive/config.toml, or export
BEEHIVE_TOKEN and BEEHIVE_USER_ID, then run 'beehive status'.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true, help = "Configuration file to use")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show the session and check that the backend answers")]
    Status {
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    #[command(about = "Read and send chat messages")]
    Chat {
        #[command(subcommand)]
        action: Option<ChatCommand>,
    },

    #[command(about = "List or acknowledge admin notifications")]
    Notifications(NotificationsArgs),

    #[command(about = "Manage gallery uploads")]
    Uploads {
        #[command(subcommand)]
        action: Option<UploadsCommand>,
    },

    #[command(about = "Admin dashboard, user directory and analytics")]
    Admin {
        #[command(subcommand)]
        action: Option<AdminCommand>,
    },

    #[command(about = "Show which pages a role can reach")]
    Routes(RoutesArgs),

    #[command(about = "Show the effective configuration")]
    Config(ConfigArgs),

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    if !config.colors_enabled() {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose, &config);

    match run(cli.command, &config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, config: &CliConfig) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.core.log_level()))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.core.logging.json_format {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

async fn run(command: Commands, config: &CliConfig) -> anyhow::Result<()> {
    match command {
        Commands::Status { format } => cmd_status(config, &format).await,
        Commands::Chat { action } => handle_chat_command(config, action).await,
        Commands::Notifications(args) => handle_notifications_command(config, args).await,
        Commands::Uploads { action } => handle_uploads_command(config, action).await,
        Commands::Admin { action } => handle_admin_command(config, action).await,
        Commands::Routes(args) => handle_routes_command(config, args).await,
        Commands::Config(args) => handle_config_command(config, args).await,
        Commands::Version { detailed } => cmd_version(detailed),
    }
}

async fn cmd_status(config: &CliConfig, format: &str) -> anyhow::Result<()> {
    let wiring = config.wiring()?;
    let session = &wiring.session;
    let home = RouteTable::standard().home_for(session.role());

    // Admins probe the notification feed, users their own gallery.
    let started = Instant::now();
    let probe = if session.is_admin() {
        NotificationsFetcher::new(wiring.client.clone())
            .fetch(&ResourceKey::from(NOTIFICATIONS_KEY), session.credential())
            .await
            .map(|items| items.len())
    } else {
        UploadsFetcher::new(wiring.client.clone(), UploadScope::Own)
            .fetch(&ResourceKey::new(session.user_id()), session.credential())
            .await
            .map(|items| items.len())
    };
    let latency_ms = started.elapsed().as_millis();

    if format == "json" {
        let output = serde_json::json!({
            "base_url": config.core.api.base_url,
            "user_id": session.user_id(),
            "role": session.role(),
            "home": home,
            "backend": match &probe {
                Ok(_) => "reachable".to_string(),
                Err(e) => e.to_string(),
            },
            "latency_ms": latency_ms,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Beehive Status".cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();
    println!("  {:<12} {}", "Backend:".bold(), config.core.api.base_url);
    println!("  {:<12} {}", "Signed in:".bold(), session.display_name());
    println!("  {:<12} {}", "Role:".bold(), session.role());
    println!("  {:<12} {}", "Home:".bold(), home);
    println!();

    match probe {
        Ok(count) => {
            let what = if session.is_admin() {
                "unseen notifications"
            } else {
                "uploads"
            };
            println!(
                "  {} Reachable in {} ms ({} {})",
                "✓".green().bold(),
                latency_ms,
                count,
                what
            );
        }
        Err(e) => {
            println!("  {} {}", "✗".red().bold(), e.to_string().red());
            if e.is_transient() {
                println!("    {}", "The backend may be restarting; try again shortly.".dimmed());
            }
        }
    }
    Ok(())
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "Beehive Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!();
        println!("  {}", "Polled resources:".bold());
        println!("    ✉ Chat messages");
        println!("    ● Admin notifications");
        println!("    ▦ Gallery uploads");
        println!("    ◫ Admin dashboard");
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("beehive {}", VERSION);
    }

    Ok(())
}
