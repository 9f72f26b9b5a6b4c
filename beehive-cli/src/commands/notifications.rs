use std::collections::HashSet;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::Cell;

use beehive_core::sync::{PollState, Reconcile, ResourceFetcher};
use beehive_core::{
    Ack, Action, ActionSubmitter, Notification, NotificationView, NotificationsFetcher,
    ResourceKey, NOTIFICATIONS_KEY,
};

use super::{new_table, print_json, truncate};
use crate::config::CliConfig;

#[derive(Args)]
pub struct NotificationsArgs {
    #[arg(long, help = "Mark every notification as seen")]
    pub mark_seen: bool,

    #[arg(short, long, help = "Keep polling and report new notifications")]
    pub watch: bool,

    #[arg(short, long, default_value = "text", help = "Output format (text, json)")]
    pub format: String,
}

pub async fn handle_notifications_command(config: &CliConfig, args: NotificationsArgs) -> Result<()> {
    let wiring = config.wiring()?;
    if !wiring.session.is_admin() {
        bail!("Notifications are only available to admins");
    }

    if args.watch {
        return watch_notifications(config).await;
    }

    let view = if args.mark_seen {
        let ack = wiring
            .submitter
            .submit(&Action::MarkNotificationsSeen, &wiring.session)
            .await?;
        NotificationView::default().acknowledge(&ack)
    } else {
        let snapshot = NotificationsFetcher::new(wiring.client.clone())
            .fetch(
                &ResourceKey::from(NOTIFICATIONS_KEY),
                wiring.session.credential(),
            )
            .await?;
        NotificationView::default().reconcile(&snapshot)
    };

    if args.format == "json" {
        return print_json(&serde_json::json!({
            "badge": view.badge,
            "notifications": view.items,
        }));
    }

    print_view(config, &view, args.mark_seen);
    Ok(())
}

fn print_view(config: &CliConfig, view: &NotificationView, marked: bool) {
    let badge = if view.has_badge() {
        format!("({} new)", view.badge).red().bold().to_string()
    } else {
        "(none new)".dimmed().to_string()
    };
    println!("{} {}", "Notifications".cyan().bold(), badge);
    println!();

    if view.items.is_empty() {
        println!("{}", "No new notifications".dimmed());
        return;
    }

    let mut table = new_table(&["", "When", "From", "Summary"]);
    for notification in &view.items {
        table.add_row(vec![
            Cell::new(if notification.seen { " " } else { "●" }),
            Cell::new(config.format_time(&notification.timestamp)),
            Cell::new(&notification.username),
            Cell::new(truncate(&notification.summary(), 60)),
        ]);
    }
    println!("{table}");

    if marked {
        println!();
        println!(
            "{} Marked {} notification(s) as seen",
            "✓".green().bold(),
            view.items.len()
        );
    }
}

fn print_line(config: &CliConfig, notification: &Notification) {
    println!(
        "{} {} {}",
        config.format_time(&notification.timestamp).dimmed(),
        "●".yellow(),
        notification.summary()
    );
}

/// Unseen notifications not yet announced. `announced` is trimmed to what is still unseen,
/// so it never outgrows the current list.
fn fresh_unseen<'v>(
    announced: &mut HashSet<String>,
    view: &'v NotificationView,
) -> Vec<&'v Notification> {
    announced.retain(|id| view.unseen().any(|n| &n.id == id));
    view.unseen()
        .filter(|n| announced.insert(n.id.clone()))
        .collect()
}

async fn watch_notifications(config: &CliConfig) -> Result<()> {
    let wiring = config.wiring()?;
    let bell = wiring.notifications();
    let mut views = bell.subscribe();
    let mut statuses = bell.scheduler().watch_status();
    bell.mount(NOTIFICATIONS_KEY).await?;

    println!(
        "{} {}",
        "Watching notifications".cyan().bold(),
        "(Ctrl+C to stop)".dimmed()
    );

    let mut last_badge = None;
    let mut announced = HashSet::new();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if last_badge != Some(view.badge) {
                    println!("{} {}", "Unseen:".bold(), view.badge.to_string().yellow());
                    last_badge = Some(view.badge);
                }
                for notification in fresh_unseen(&mut announced, &view) {
                    print_line(config, notification);
                }
            }
            changed = statuses.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = statuses.borrow_and_update().clone();
                if !status.in_flight && status.last_outcome() == Some(PollState::Failed) {
                    if let Some(error) = &status.last_error {
                        eprintln!("{} {}", "!".yellow(), error.to_string().dimmed());
                    }
                }
            }
        }
    }

    bell.unmount().await;
    Ok(())
}
