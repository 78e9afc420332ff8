//! Repocache CLI - GitHub repository search with a local result cache

mod commands;

use clap::{Parser, Subcommand};
use repocache::config::{self, Overrides, Settings};
use repocache::output::{emit_error, OutputMode};
use repocache::record::{Page, DEFAULT_PER_PAGE};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "repocache")]
#[command(version)]
#[command(about = "Search GitHub repositories and keep a deduplicated local cache of the results")]
#[command(long_about = r#"
Repocache proxies GitHub repository search and stores every result, keyed by
its URL, in a local SQLite database that can be browsed sorted by stars.

Example usage:
  repocache serve --port 5000
  repocache search --keyword tokio --page 2
  repocache list --page 1 --per-page 10
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file
    #[arg(short, long, global = true, default_value = "repocache.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Path to the database file
        #[arg(short, long, env = "DATABASE_URL")]
        database: Option<PathBuf>,
    },

    /// Search GitHub and store the results
    Search {
        /// Search keyword
        #[arg(short, long)]
        keyword: String,

        /// Result page (5 results per page)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Path to the database file
        #[arg(short, long, env = "DATABASE_URL")]
        database: Option<PathBuf>,
    },

    /// List stored repositories, most starred first
    List {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Results per page
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,

        /// Path to the database file
        #[arg(short, long, env = "DATABASE_URL")]
        database: Option<PathBuf>,
    },

    /// Show statistics about the stored results
    Stats {
        /// Path to the database file
        #[arg(short, long, env = "DATABASE_URL")]
        database: Option<PathBuf>,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Serve { .. } => "serve",
            Commands::Search { .. } => "search",
            Commands::List { .. } => "list",
            Commands::Stats { .. } => "stats",
            Commands::Init { .. } => "init",
        }
    }

    fn overrides(&self) -> Overrides {
        match self {
            Commands::Serve { port, database } => Overrides { database: database.clone(), port: *port },
            Commands::Search { database, .. }
            | Commands::List { database, .. }
            | Commands::Stats { database } => Overrides { database: database.clone(), port: None },
            Commands::Init { .. } => Overrides::default(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = OutputMode::from_flag(cli.json);
    let command = cli.command.name();

    match run(cli, output_mode).await {
        Ok(()) => Ok(()),
        Err(e) if !output_mode.is_human() => {
            emit_error(command, &e);
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}

async fn run(cli: Cli, output_mode: OutputMode) -> anyhow::Result<()> {
    let file_config = match cli.command {
        Commands::Init { .. } => config::load_config_for_init(&cli.config),
        _ => config::load_config(Some(&cli.config))?,
    };
    let settings = Settings::from_env(file_config.as_ref(), cli.command.overrides());
    tracing::debug!("Resolved settings: database={:?} port={} api={}", settings.database, settings.port, settings.api_url);

    match cli.command {
        Commands::Serve { .. } => commands::run_serve(settings).await,
        Commands::Search { keyword, page, .. } => {
            commands::run_search(&settings, &keyword, page, output_mode).await
        }
        Commands::List { page, per_page, .. } => {
            let page = Page::new(page, per_page.min(repocache::record::MAX_PER_PAGE))?;
            commands::run_list(&settings, page, output_mode)
        }
        Commands::Stats { .. } => commands::run_stats(&settings, output_mode),
        Commands::Init { force } => commands::run_init(&cli.config, &settings, force, output_mode),
    }
}
