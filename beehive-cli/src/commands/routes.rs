use anyhow::Result;
use clap::Args;
use colored::Colorize;
use comfy_table::Cell;

use beehive_core::{Capability, Credential, Resolution, Role, RouteTable, Session};

use super::new_table;
use crate::config::CliConfig;

#[derive(Args)]
pub struct RoutesArgs {
    #[arg(short, long, help = "Preview as this role instead of the configured session")]
    pub role: Option<Role>,

    #[arg(long, help = "Preview as a signed-out visitor")]
    pub anonymous: bool,

    #[arg(long, help = "Resolve a single path")]
    pub resolve: Option<String>,
}

pub async fn handle_routes_command(config: &CliConfig, args: RoutesArgs) -> Result<()> {
    let table = RouteTable::standard();
    let session = preview_session(config, &args);

    if let Some(path) = args.resolve {
        print_resolution(&path, &table.resolve(&path, session.as_ref()));
        return Ok(());
    }

    let viewer = session
        .as_ref()
        .map(|s| s.role().to_string())
        .unwrap_or_else(|| "anonymous".to_string());
    println!("{} {}", "Routes for".cyan().bold(), viewer.bold());
    println!();

    let mut routes = new_table(&["Path", "Page", "Requires", "Outcome"]);
    for route in table.routes() {
        let requires = match route.capability {
            Capability::Public => "-".to_string(),
            Capability::Role(role) => role.to_string(),
        };
        let outcome = match table.resolve(route.pattern, session.as_ref()) {
            Resolution::Render { .. } => "render".green().to_string(),
            Resolution::Redirect(to) => format!("→ {}", to).yellow().to_string(),
            Resolution::NotFound => "not found".red().to_string(),
        };
        routes.add_row(vec![
            Cell::new(route.pattern),
            Cell::new(route.page.title()),
            Cell::new(requires),
            Cell::new(outcome),
        ]);
    }
    println!("{routes}");

    if let Some(session) = &session {
        let nav: Vec<&str> = table
            .nav_for(session.role())
            .iter()
            .map(|route| route.page.title())
            .collect();
        println!();
        println!("{} {}", "Navigation:".bold(), nav.join(" · "));
        println!("{} {}", "Home:".bold(), table.home_for(session.role()));
    }
    Ok(())
}

fn preview_session(config: &CliConfig, args: &RoutesArgs) -> Option<Session> {
    if args.anonymous {
        return None;
    }
    match args.role {
        Some(role) => Some(Session::new(Credential::bearer(""), "preview", role)),
        None => config.session().ok(),
    }
}

fn print_resolution(path: &str, resolution: &Resolution) {
    match resolution {
        Resolution::Render { page, params } => {
            println!("{} {} renders {}", "✓".green().bold(), path, page.title().bold());
            let mut params: Vec<_> = params.iter().collect();
            params.sort();
            for (name, value) in params {
                println!("  {} = {}", name.dimmed(), value);
            }
        }
        Resolution::Redirect(to) => {
            println!("{} {} redirects to {}", "→".yellow().bold(), path, to.bold());
        }
        Resolution::NotFound => {
            println!("{} {} matches no route", "✗".red().bold(), path);
        }
    }
}
