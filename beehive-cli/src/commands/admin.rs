use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;

use beehive_core::models::{RecentUpload, UploadKind};
use beehive_core::sync::ResourceFetcher;
use beehive_core::{
    Analytics, DashboardFetcher, DashboardSnapshot, ResourceKey, UserDirectory, UserQuery,
    Wiring, DASHBOARD_KEY,
};

use super::{new_table, print_json, truncate};
use crate::config::CliConfig;

#[derive(Subcommand)]
pub enum AdminCommand {
    #[command(about = "Show totals and the most recent uploads")]
    Dashboard {
        #[arg(short, long, default_value = "10", help = "How many recent uploads to show")]
        limit: u32,

        #[arg(short, long, default_value = "text", help = "Output format (text, json)")]
        format: String,
    },

    #[command(about = "Browse the user directory")]
    Users {
        #[arg(short, long, help = "Search by name or email")]
        query: Option<String>,

        #[arg(short, long, default_value = "1", help = "Page number, starting at 1")]
        page: u32,

        #[arg(short, long, default_value = "10", help = "Users per page")]
        limit: u32,

        #[arg(short, long, default_value = "text", help = "Output format (text, json)")]
        format: String,
    },

    #[command(about = "Summarize media counts and sentiment")]
    Analytics {
        #[arg(short, long, default_value = "text", help = "Output format (text, json)")]
        format: String,
    },
}

pub async fn handle_admin_command(config: &CliConfig, cmd: Option<AdminCommand>) -> Result<()> {
    let wiring = config.wiring()?;
    if !wiring.session.is_admin() {
        bail!("Admin commands need an admin session");
    }

    match cmd.unwrap_or(AdminCommand::Dashboard {
        limit: 10,
        format: "text".to_string(),
    }) {
        AdminCommand::Dashboard { limit, format } => {
            cmd_dashboard(config, &wiring, limit, &format).await
        }
        AdminCommand::Users {
            query,
            page,
            limit,
            format,
        } => cmd_users(config, &wiring, query, page, limit, &format).await,
        AdminCommand::Analytics { format } => cmd_analytics(&wiring, &format).await,
    }
}

async fn fetch_dashboard(wiring: &Wiring, limit: u32) -> Result<DashboardSnapshot> {
    let snapshot = DashboardFetcher::new(wiring.client.clone(), limit)
        .fetch(
            &ResourceKey::from(DASHBOARD_KEY),
            wiring.session.credential(),
        )
        .await?;
    Ok(snapshot)
}

async fn cmd_dashboard(config: &CliConfig, wiring: &Wiring, limit: u32, format: &str) -> Result<()> {
    let snapshot = fetch_dashboard(wiring, limit).await?;

    if format == "json" {
        return print_json(&snapshot);
    }

    let stats = &snapshot.stats;
    println!("{}", "Admin Dashboard".cyan().bold());
    println!("{}", "═".repeat(50).dimmed());
    println!("  {:<14} {}", "Users:".bold(), stats.total_users);
    println!("  {:<14} {}", "Images:".bold(), stats.total_images);
    println!("  {:<14} {}", "Voice notes:".bold(), stats.total_voice_notes);
    println!("  {:<14} {}", "Total media:".bold(), stats.total_media);
    println!();

    if snapshot.recent_uploads.is_empty() {
        println!("{}", "No recent uploads.".dimmed());
        return Ok(());
    }

    println!("{}", "Recent Uploads".cyan().bold());
    let mut table = new_table(&["ID", "Type", "Title", "User", "Sentiment", "When"]);
    for upload in &snapshot.recent_uploads {
        table.add_row(recent_row(config, upload));
    }
    println!("{table}");
    Ok(())
}

fn recent_row(config: &CliConfig, upload: &RecentUpload) -> Vec<Cell> {
    let kind = match upload.kind {
        UploadKind::Image => "image".normal(),
        UploadKind::Voice => "voice".magenta(),
    };
    vec![
        Cell::new(&upload.id),
        Cell::new(kind),
        Cell::new(truncate(&upload.title, 30)),
        Cell::new(&upload.user),
        Cell::new(upload.sentiment.as_deref().unwrap_or("-")),
        Cell::new(
            upload
                .timestamp
                .map(|at| config.format_time(&at))
                .unwrap_or_else(|| "-".to_string()),
        ),
    ]
}

async fn cmd_users(
    config: &CliConfig,
    wiring: &Wiring,
    query: Option<String>,
    page: u32,
    limit: u32,
    format: &str,
) -> Result<()> {
    if page == 0 || limit == 0 {
        bail!("--page and --limit must be at least 1");
    }
    let query = UserQuery {
        limit,
        offset: (page - 1) * limit,
        query,
    };

    let result = UserDirectory::new(wiring.client.clone())
        .page(&query, wiring.session.credential())
        .await?;

    if format == "json" {
        return print_json(&result);
    }

    if result.users.is_empty() {
        println!("{}", "No users found.".yellow());
        return Ok(());
    }

    let mut table = new_table(&["ID", "Name", "Email", "Role", "Last Active"]);
    for user in &result.users {
        let role = if user.role == "admin" {
            user.role.red().bold()
        } else {
            user.role.normal()
        };
        table.add_row(vec![
            Cell::new(&user.id),
            Cell::new(user.display_name()),
            Cell::new(&user.email),
            Cell::new(role),
            Cell::new(
                user.last_active_at()
                    .map(|at| config.format_time(&at))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }
    println!("{table}");

    let pages = result.total_count.div_ceil(limit as usize).max(1);
    println!();
    println!(
        "Page {} of {} ({} users total)",
        page,
        pages,
        result.total_count
    );
    Ok(())
}

async fn cmd_analytics(wiring: &Wiring, format: &str) -> Result<()> {
    let snapshot = fetch_dashboard(wiring, beehive_core::wiring::DASHBOARD_RECENT_LIMIT).await?;
    let analytics = Analytics::from_snapshot(&snapshot);

    if format == "json" {
        return print_json(&analytics);
    }

    println!("{}", "Analytics".cyan().bold());
    println!("{}", "═".repeat(50).dimmed());
    println!("  {:<16} {}", "Images:".bold(), analytics.images);
    println!("  {:<16} {}", "Voice notes:".bold(), analytics.voice_notes);
    println!("  {:<16} {}", "Total media:".bold(), analytics.total_media);
    println!();
    println!(
        "{} {} images, {} voice notes",
        "Recent:".bold(),
        analytics.recent_images,
        analytics.recent_voice_notes
    );
    println!();

    let breakdown = analytics.sentiment;
    println!("{}", "Sentiment".cyan().bold());
    println!("  {:<10} {}", "positive".green(), bar(breakdown.positive));
    println!("  {:<10} {}", "neutral".yellow(), bar(breakdown.neutral));
    println!("  {:<10} {}", "negative".red(), bar(breakdown.negative));
    if breakdown.untagged > 0 {
        println!("  {}", format!("{} untagged", breakdown.untagged).dimmed());
    }
    Ok(())
}

fn bar(percent: f64) -> String {
    let filled = (percent / 5.0).round() as usize;
    format!("{}{} {:>5.1}%", "█".repeat(filled), "░".repeat(20 - filled.min(20)), percent)
}
