use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use std::collections::HashSet;

use beehive_core::sync::{PollState, Reconcile, ResourceFetcher};
use beehive_core::views::{bubbles, conversation_key, Alignment, ChatView};
use beehive_core::{
    Action, ActionSubmitter, ChatUsersFetcher, ConversationEndpoint, MessagesFetcher, ResourceKey,
    Session, CHAT_USERS_KEY,
};

use super::{new_table, print_json};
use crate::config::CliConfig;

#[derive(Subcommand)]
pub enum ChatCommand {
    #[command(about = "List users an admin can chat with")]
    Users {
        #[arg(short, long, default_value = "text", help = "Output format (text, json)")]
        format: String,
    },

    #[command(about = "Show the message history of a conversation")]
    Show {
        #[arg(short, long, help = "User id to talk to (admins only)")]
        with: Option<String>,

        #[arg(short, long, default_value = "text", help = "Output format (text, json)")]
        format: String,
    },

    #[command(about = "Send a message")]
    Send {
        #[arg(help = "Message text")]
        message: String,

        #[arg(short, long, help = "User id to talk to (admins only)")]
        with: Option<String>,
    },

    #[command(about = "Follow a conversation as new messages arrive")]
    Watch {
        #[arg(short, long, help = "User id to talk to (admins only)")]
        with: Option<String>,
    },
}

pub async fn handle_chat_command(config: &CliConfig, cmd: Option<ChatCommand>) -> Result<()> {
    match cmd.unwrap_or(ChatCommand::Show {
        with: None,
        format: "text".to_string(),
    }) {
        ChatCommand::Users { format } => cmd_chat_users(config, &format).await,
        ChatCommand::Show { with, format } => cmd_chat_show(config, with, &format).await,
        ChatCommand::Send { message, with } => cmd_chat_send(config, with, &message).await,
        ChatCommand::Watch { with } => cmd_chat_watch(config, with).await,
    }
}

pub(crate) fn resolve_endpoint(session: &Session, with: Option<String>) -> Result<ConversationEndpoint> {
    match (ConversationEndpoint::default_for(session), with) {
        (Some(endpoint), _) => Ok(endpoint),
        (None, Some(id)) if !id.trim().is_empty() => Ok(ConversationEndpoint::User(id)),
        (None, _) => bail!("Admins must pick a conversation with --with <user-id>"),
    }
}

async fn cmd_chat_users(config: &CliConfig, format: &str) -> Result<()> {
    let wiring = config.wiring()?;
    if !wiring.session.is_admin() {
        bail!("Only admins have a contact list; users always chat with the admin channel");
    }

    let users = ChatUsersFetcher::new(wiring.client.clone())
        .fetch(
            &ResourceKey::from(CHAT_USERS_KEY),
            wiring.session.credential(),
        )
        .await?;

    if format == "json" {
        return print_json(&users);
    }

    if users.is_empty() {
        println!("{}", "No users found.".yellow());
        return Ok(());
    }

    println!("{}", "Chat Users".cyan().bold());
    println!();

    let mut table = new_table(&["ID", "Name", "Email", "Last Active"]);
    for user in &users {
        let last_active = user
            .last_active_at()
            .map(|at| config.format_time(&at))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&user.id),
            Cell::new(user.display_name()),
            Cell::new(&user.email),
            Cell::new(last_active),
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn cmd_chat_show(config: &CliConfig, with: Option<String>, format: &str) -> Result<()> {
    let wiring = config.wiring()?;
    let endpoint = resolve_endpoint(&wiring.session, with)?;
    let key = conversation_key(&endpoint, &wiring.session);

    let snapshot = MessagesFetcher::new(wiring.client.clone())
        .fetch(&key, wiring.session.credential())
        .await?;
    let mut view = ChatView::for_session(&wiring.session);
    view.select(endpoint.clone());
    let view = view.reconcile(&snapshot);

    if format == "json" {
        return print_json(&view.messages);
    }

    println!("{} {}", "Conversation".cyan().bold(), endpoint.to_string().dimmed());
    println!("{}", "─".repeat(50).dimmed());

    if view.is_empty() {
        println!("{}", "No messages yet.".dimmed());
        return Ok(());
    }

    for bubble in bubbles(&view, wiring.session.user_id()) {
        print_bubble(config, bubble.alignment, bubble.message);
    }
    Ok(())
}

fn print_bubble(config: &CliConfig, alignment: Alignment, message: &beehive_core::Message) {
    let time = config.format_time(&message.timestamp);
    match alignment {
        Alignment::Outgoing => println!(
            "{:>50}\n{:>50}",
            message.content.green(),
            time.dimmed()
        ),
        Alignment::Incoming => println!("{}\n{}", message.content, time.dimmed()),
    }
}

async fn cmd_chat_send(config: &CliConfig, with: Option<String>, message: &str) -> Result<()> {
    let wiring = config.wiring()?;
    let endpoint = resolve_endpoint(&wiring.session, with)?;

    wiring
        .submitter
        .submit(&Action::send_message(endpoint.clone(), message), &wiring.session)
        .await?;

    println!(
        "{} Message sent to {}",
        "✓".green().bold(),
        endpoint.to_string().cyan()
    );
    Ok(())
}

async fn cmd_chat_watch(config: &CliConfig, with: Option<String>) -> Result<()> {
    let wiring = config.wiring()?;
    let endpoint = resolve_endpoint(&wiring.session, with)?;
    let chat = wiring.chat();
    chat.update_view(|view| view.select(endpoint.clone()));

    let mut views = chat.subscribe();
    let mut statuses = chat.scheduler().watch_status();
    chat.mount(conversation_key(&endpoint, &wiring.session)).await?;

    println!(
        "{} {} {}",
        "Watching".cyan().bold(),
        endpoint.to_string().bold(),
        "(Ctrl+C to stop)".dimmed()
    );

    let viewer = wiring.session.user_id().to_string();
    let mut printed: HashSet<String> = HashSet::new();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                for bubble in bubbles(&view, &viewer) {
                    if printed.insert(bubble.message.id.clone()) {
                        print_bubble(config, bubble.alignment, bubble.message);
                    }
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

    chat.unmount().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use beehive_core::{Credential, Role};

    #[test]
    fn test_resolve_endpoint() {
        let user = Session::new(Credential::bearer("t"), "user-42", Role::User);
        assert_eq!(
            resolve_endpoint(&user, None).unwrap(),
            ConversationEndpoint::AdminChannel
        );

        let admin = Session::new(Credential::bearer("t"), "admin-1", Role::Admin);
        assert!(resolve_endpoint(&admin, None).is_err());
        assert!(resolve_endpoint(&admin, Some(" ".to_string())).is_err());
        assert_eq!(
            resolve_endpoint(&admin, Some("user-42".to_string())).unwrap(),
            ConversationEndpoint::User("user-42".to_string())
        );
    }
}
