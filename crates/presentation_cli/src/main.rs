//! placefinder CLI
//!
//! Search for a place, see nearby POIs and the weather there, compute
//! routes and manage search history.

#![allow(clippy::print_stdout)]

use anyhow::{Context, bail};
use application::{PanelState, SearchHandle, SearchOutcome};
use clap::Parser;
use futures::StreamExt;
use infrastructure::{AppConfig, init_telemetry};
use presentation_cli::cli::{Cli, Commands, HistoryCommand, log_filter_from_verbosity};
use presentation_cli::output::{render_history, render_route, render_session, render_update};
use presentation_cli::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;
    if cli.verbose > 0 {
        config.telemetry.log_filter = log_filter_from_verbosity(cli.verbose).to_string();
    }
    config.validate()?;
    init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Search {
            query,
            user,
            category,
        } => {
            let app = App::from_config(&config, category)?;
            let handle = app.orchestrator.run_search(&query, user)?;
            follow(handle, cli.json).await?;
        },

        Commands::Route { from, to, name } => {
            let app = App::from_config(&config, None)?;
            let route = app.routes.compute_route(&from, &to, &name).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&route.to_geojson_feature())?);
            } else {
                println!("{}", render_route(&route));
            }
        },

        Commands::History(command) => {
            let app = App::from_config(&config, None)?;
            match command {
                HistoryCommand::List { user, limit } => {
                    let limit = limit.unwrap_or(app.settings().history_limit);
                    let entries = app.history.list_recent(&user, limit).await;
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    } else {
                        print!("{}", render_history(&entries, chrono::Utc::now()));
                    }
                },

                HistoryCommand::Replay { user, index } => {
                    let mut panel = app.history_panel(user.clone());
                    if let PanelState::Error(message) = panel.open().await {
                        bail!("{message}");
                    }
                    let Some(entry) = panel.select(index) else {
                        bail!("no recent search at index {index}");
                    };
                    let handle = app.orchestrator.replay(&entry, Some(user));
                    follow(handle, cli.json).await?;
                },

                HistoryCommand::Clear { user } => {
                    app.history.clear(&user).await;
                    println!("History cleared for {user}");
                },
            }
        },
    }

    Ok(())
}

/// Print every update of a search, then its final state
async fn follow(mut handle: SearchHandle, json: bool) -> anyhow::Result<()> {
    while let Some(update) = handle.next().await {
        if json {
            println!("{}", serde_json::to_string(&update)?);
        } else {
            println!("{}", render_update(&update));
        }
    }

    let session = match handle.finish().await? {
        SearchOutcome::Completed(session) => session,
        SearchOutcome::Superseded { generation } => bail!("search #{generation} was superseded"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!();
        print!("{}", render_session(&session));
    }

    if session.failure().is_some() {
        std::process::exit(1);
    }
    Ok(())
}
