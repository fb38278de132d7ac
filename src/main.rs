//! Binary entry point for the `ghibli` command line client.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// The binary talks to the terminal.
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use futures::StreamExt;
use ghibli_core::config::{CONFIG_PATH_ENV, GhibliConfig};
use ghibli_core::observability::{self, InitOptions};
use ghibli_core::storage::EXTERNAL_COMMIT_POLL_INTERVAL;
use ghibli_core::{
    Error, FilmDetailUiModel, FilmUiModel, FilterUiModel, ServiceContainer, SqliteLocalStore,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Browse the Studio Ghibli catalog and manage favorites.
#[derive(Parser)]
#[command(name = "ghibli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// List the films visible under the selected filters.
    Films,

    /// Show one film.
    Film {
        /// Film id.
        id: String,
    },

    /// List the filters and their selection state.
    Filters,

    /// Mark a film as favorite.
    Favorite {
        /// Film id.
        id: String,

        /// Remove the film from the favorites instead.
        #[arg(long)]
        remove: bool,
    },

    /// Select a filter.
    Filter {
        /// Filter id, as listed by `ghibli filters`.
        id: String,

        /// Deselect the filter instead.
        #[arg(long)]
        remove: bool,
    },

    /// Clear the filters, optionally switching to favorites only.
    View {
        /// Show favorites only.
        #[arg(long)]
        favorites: bool,
    },

    /// Print the favorite film ids on every change until interrupted.
    ///
    /// Changes made by other `ghibli` processes are picked up by polling.
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_settings(
        &config.logging,
        InitOptions {
            verbose: cli.verbose,
            json_logs: cli.json_logs,
        },
    ) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration and applies environment overrides.
fn load_config(path: Option<&Path>) -> CliResult<GhibliConfig> {
    let config = if let Some(path) = path {
        GhibliConfig::load_from_file(path)?
    } else if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        GhibliConfig::load_from_file(Path::new(&path))?
    } else {
        GhibliConfig::load_default()
    };

    Ok(config.with_env_overrides()?)
}

/// Runs the selected command.
async fn run_command(cli: Cli, config: &GhibliConfig) -> CliResult<()> {
    let store = Arc::new(SqliteLocalStore::open(config.database_path())?);
    let services = ServiceContainer::from_config_with_store(config, Arc::clone(&store))?;
    let json = cli.json;

    match cli.command {
        Commands::Films => {
            let films = services.get_film_list().execute().await?;
            output(json, films.as_slice(), print_films)
        },
        Commands::Film { id } => {
            let film = services.get_film_detail().execute(&id).await?;
            output(json, &film, print_film)
        },
        Commands::Filters => {
            let filters = services.get_filters().execute().await?;
            output(json, filters.as_slice(), print_filters)
        },
        Commands::Favorite { id, remove } => {
            services.toggle_favorite().execute(&id, !remove).await?;
            println!("{} {id}", if remove { "Unfavorited" } else { "Favorited" });
            Ok(())
        },
        Commands::Filter { id, remove } => {
            let filters = services.get_filters().execute().await?;
            let Some(filter) = filters.into_iter().find(|f| f.id == id) else {
                return Err(Error::InvalidInput(format!("unknown filter: {id}")).into());
            };
            services
                .toggle_filter()
                .execute(&filter.to_filter(), !remove)
                .await?;
            println!(
                "{} filter {}",
                if remove { "Deselected" } else { "Selected" },
                filter.name
            );
            Ok(())
        },
        Commands::View { favorites } => {
            services.view_films().execute(favorites).await?;
            println!(
                "{}",
                if favorites { "Showing favorites" } else { "Showing all films" }
            );
            Ok(())
        },
        Commands::Watch => {
            let poller = store.spawn_external_commit_poller(EXTERNAL_COMMIT_POLL_INTERVAL);
            let watched = watch_favorites(&services, json).await;
            poller.abort();
            watched
        },
    }
}

async fn watch_favorites(services: &ServiceContainer, json: bool) -> CliResult<()> {
    let mut favorites = services.observe_favorite_films().execute();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            ids = favorites.next() => match ids {
                Some(ids) if json => println!("{}", serde_json::to_string(&ids)?),
                Some(ids) => println!("{}", ids.into_iter().collect::<Vec<_>>().join(", ")),
                None => return Ok(()),
            },
        }
    }
}

fn output<T: Serialize + ?Sized>(json: bool, value: &T, print: fn(&T)) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print(value);
    }
    Ok(())
}

fn print_films(films: &[FilmUiModel]) {
    for film in films {
        let marker = if film.is_favorite { "*" } else { " " };
        println!("{marker} {:<6} {:<40} {}", film.release_date, film.title, film.id);
    }
}

fn print_film(film: &FilmDetailUiModel) {
    let marker = if film.is_favorite { " (favorite)" } else { "" };
    println!("{}{marker}", film.title);
    println!("  Released:  {}", film.release_date);
    println!("  Director:  {}", film.director);
    println!("  Producer:  {}", film.producer);
    println!("  Runtime:   {} min", film.running_time);
    println!("  RT score:  {}", film.rt_score);
    if !film.people.is_empty() {
        println!("  People:    {}", film.people.join(", "));
    }
    println!();
    println!("{}", film.description);
}

fn print_filters(filters: &[FilterUiModel]) {
    for filter in filters {
        let marker = if filter.is_selected { "x" } else { " " };
        println!("[{marker}] {:<24} {} ({})", filter.name, filter.id, filter.kind);
    }
}
