pub mod admin;
pub mod chat;
pub mod config;
pub mod notifications;
pub mod routes;
pub mod uploads;

pub use admin::{handle_admin_command, AdminCommand};
pub use chat::{handle_chat_command, ChatCommand};
pub use config::{handle_config_command, ConfigArgs};
pub use notifications::{handle_notifications_command, NotificationsArgs};
pub use routes::{handle_routes_command, RoutesArgs};
pub use uploads::{handle_uploads_command, UploadsCommand};

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use serde::Serialize;

pub(crate) fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            headers
                .iter()
                .map(|header| Cell::new(header).fg(Color::White))
                .collect::<Vec<_>>(),
        );
    table
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
