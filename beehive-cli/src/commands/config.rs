use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use beehive_core::{get_config_dir, BeehiveConfig};

use super::print_json;
use crate::config::CliConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[arg(short, long, default_value = "text", help = "Output format (text, json, toml)")]
    pub format: String,

    #[arg(long, help = "Write the effective configuration to a file (token omitted)")]
    pub save: Option<PathBuf>,
}

pub async fn handle_config_command(config: &CliConfig, args: ConfigArgs) -> Result<()> {
    if let Some(path) = args.save {
        config
            .core
            .save_to(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} Saved configuration to {}", "✓".green().bold(), path.display());
        return Ok(());
    }

    let redacted = redacted(&config.core);
    match args.format.as_str() {
        "json" => print_json(&redacted),
        "toml" => {
            println!("{}", toml::to_string_pretty(&redacted)?);
            Ok(())
        }
        _ => {
            print_text(config, &redacted);
            Ok(())
        }
    }
}

fn redacted(core: &BeehiveConfig) -> BeehiveConfig {
    let mut copy = core.clone();
    if copy.auth.token.is_some() {
        copy.auth.token = Some("********".to_string());
    }
    copy
}

fn print_text(config: &CliConfig, core: &BeehiveConfig) {
    let source = config
        .source
        .clone()
        .or_else(|| get_config_dir().map(|dir| dir.join("config.toml")))
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());

    println!("{}", "Configuration".cyan().bold());
    println!("{}", "═".repeat(50).dimmed());
    println!("  {:<22} {}", "Source:".bold(), source.dimmed());
    println!();
    println!("{}", "API".bold());
    println!("  {:<22} {}", "base_url", core.api.base_url);
    println!(
        "  {:<22} {}",
        "root_url",
        core.api.root_url.as_deref().unwrap_or("(origin of base_url)")
    );
    println!("  {:<22} {}s", "timeout", core.api.timeout_secs);
    println!();
    println!("{}", "Session".bold());
    println!(
        "  {:<22} {}",
        "user_id",
        core.auth.user_id.as_deref().unwrap_or("-")
    );
    println!("  {:<22} {}", "role", core.auth.role.as_deref().unwrap_or("user"));
    println!(
        "  {:<22} {}",
        "token",
        if core.auth.token.is_some() {
            "set".green()
        } else {
            "missing".red()
        }
    );
    println!();
    println!("{}", "Polling (ms)".bold());
    let polling = &core.polling;
    println!("  {:<22} {}", "messages", polling.messages_interval_ms);
    println!("  {:<22} {}", "notifications", polling.notifications_interval_ms);
    println!("  {:<22} {}", "dashboard", polling.dashboard_interval_ms);
    println!("  {:<22} {}", "uploads", polling.uploads_interval_ms);
    println!("  {:<22} {}", "request timeout", polling.request_timeout_ms);
    println!(
        "  {:<22} {} up to {}",
        "backoff",
        polling.backoff_step_ms,
        polling.backoff_max_ms
    );
}
