use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use std::io::{self, Write};
use std::path::PathBuf;

use beehive_core::sync::{Reconcile, ResourceFetcher};
use beehive_core::{
    Ack, Action, ActionSubmitter, GalleryView, NewUpload, ResourceKey, Sentiment,
    SentimentFilter, Session, UploadEdit, UploadScope, UploadsFetcher,
};

use super::{new_table, print_json, truncate};
use crate::config::CliConfig;

#[derive(Subcommand)]
pub enum UploadsCommand {
    #[command(about = "List uploads in the gallery")]
    List {
        #[arg(short, long, help = "Whose uploads to list (admins only)")]
        user: Option<String>,

        #[arg(
            short,
            long,
            value_delimiter = ',',
            help = "Only show uploads tagged with these sentiments"
        )]
        sentiment: Vec<String>,

        #[arg(long, help = "Require every sentiment instead of any")]
        all: bool,

        #[arg(short, long, default_value = "text", help = "Output format (text, json)")]
        format: String,
    },

    #[command(about = "Upload images or PDFs with an optional voice note")]
    Add {
        #[arg(required = true, help = "Files to upload")]
        files: Vec<PathBuf>,

        #[arg(short, long, help = "Title")]
        title: String,

        #[arg(short, long, help = "Description")]
        description: String,

        #[arg(short, long, default_value = "neutral", help = "positive, neutral or negative")]
        sentiment: Sentiment,

        #[arg(short, long, help = "Recorded voice note to attach")]
        audio: Option<PathBuf>,
    },

    #[command(about = "Edit the title, description or sentiment of an upload")]
    Edit {
        #[arg(help = "Upload id")]
        id: String,

        #[arg(short, long, help = "New title")]
        title: String,

        #[arg(short, long, help = "New description")]
        description: String,

        #[arg(short, long, help = "New sentiment")]
        sentiment: Option<Sentiment>,
    },

    #[command(about = "Delete an upload")]
    Delete {
        #[arg(help = "Upload id")]
        id: String,

        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle_uploads_command(config: &CliConfig, cmd: Option<UploadsCommand>) -> Result<()> {
    match cmd.unwrap_or(UploadsCommand::List {
        user: None,
        sentiment: Vec::new(),
        all: false,
        format: "text".to_string(),
    }) {
        UploadsCommand::List {
            user,
            sentiment,
            all,
            format,
        } => cmd_uploads_list(config, user, sentiment, all, &format).await,
        UploadsCommand::Add {
            files,
            title,
            description,
            sentiment,
            audio,
        } => {
            let upload = NewUpload {
                files,
                title,
                description,
                sentiment,
                audio,
            };
            submit(config, Action::CreateUpload(upload)).await
        }
        UploadsCommand::Edit {
            id,
            title,
            description,
            sentiment,
        } => {
            let edit = UploadEdit {
                id,
                title,
                description,
                sentiment,
            };
            submit(config, Action::EditUpload(edit)).await
        }
        UploadsCommand::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete upload {}?", id))? {
                println!("{}", "Cancelled.".dimmed());
                return Ok(());
            }
            submit(config, Action::DeleteUpload { id }).await
        }
    }
}

pub(crate) fn gallery_scope(session: &Session, user: Option<String>) -> Result<(UploadScope, ResourceKey)> {
    match user.filter(|id| !id.trim().is_empty()) {
        Some(id) if session.is_admin() => Ok((UploadScope::Admin, ResourceKey::new(id))),
        Some(_) => bail!("Only admins can browse another user's uploads"),
        None if session.is_admin() => bail!("Admins must pick whose uploads to list with --user <user-id>"),
        None => Ok((UploadScope::Own, ResourceKey::new(session.user_id()))),
    }
}

async fn cmd_uploads_list(
    config: &CliConfig,
    user: Option<String>,
    sentiment: Vec<String>,
    all: bool,
    format: &str,
) -> Result<()> {
    let wiring = config.wiring()?;
    let (scope, key) = gallery_scope(&wiring.session, user)?;

    let snapshot = UploadsFetcher::new(wiring.client.clone(), scope)
        .fetch(&key, wiring.session.credential())
        .await?;

    let mut view = GalleryView::default().reconcile(&snapshot);
    view.set_filter(if all {
        SentimentFilter::all(sentiment)
    } else {
        SentimentFilter::any(sentiment)
    });
    let visible = view.visible();

    if format == "json" {
        return print_json(&visible);
    }

    if visible.is_empty() {
        println!("{}", "No uploads found.".yellow());
        return Ok(());
    }

    println!("{} {}", "Gallery".cyan().bold(), key.as_str().dimmed());
    println!();

    let mut table = new_table(&["ID", "Title", "File", "Sentiment", "Voice", "Uploaded"]);
    for upload in &visible {
        let uploaded = upload
            .created_at
            .map(|at| config.format_time(&at))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&upload.id),
            Cell::new(truncate(&upload.title, 30)),
            Cell::new(truncate(&upload.filename, 30)),
            Cell::new(upload.sentiment.as_deref().unwrap_or("-")),
            Cell::new(upload.audio().unwrap_or("-")),
            Cell::new(uploaded),
        ]);
    }
    println!("{table}");
    println!();
    println!("Showing {} of {} upload(s)", visible.len(), view.uploads.len());
    Ok(())
}

async fn submit(config: &CliConfig, action: Action) -> Result<()> {
    let wiring = config.wiring()?;
    let ack = wiring.submitter.submit(&action, &wiring.session).await?;

    match ack {
        Ack::UploadCreated { message } => {
            println!("{} {}", "✓".green().bold(), message);
        }
        Ack::UploadUpdated { id } => {
            println!("{} Updated upload {}", "✓".green().bold(), id.cyan());
        }
        Ack::Deleted { id } => {
            println!("{} Deleted upload {}", "✓".green().bold(), id.cyan());
        }
        other => {
            println!("{} {:?}", "✓".green().bold(), other);
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
