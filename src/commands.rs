use owo_colors::OwoColorize;
use repocache::config::{self, RepocacheConfig, Settings};
use repocache::ingest::search_and_store;
use repocache::output::{emit_success, OutputMode};
use repocache::record::Page;
use repocache::ui::{self, Icons, Spinner};
use repocache::{GitHubClient, RepoStore};
use std::path::Path;

fn open_store(settings: &Settings) -> anyhow::Result<RepoStore> {
    config::ensure_db_dir(&settings.database)?;
    Ok(RepoStore::open(&settings.database)?)
}

pub async fn run_serve(settings: Settings) -> anyhow::Result<()> {
    repocache::server::start_server(settings).await
}

pub async fn run_search(
    settings: &Settings,
    keyword: &str,
    page: u32,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let page = Page::search(page)?;
    let client = GitHubClient::new(settings.api_url.clone(), settings.token.clone())?;

    // Search still works without a database; results just aren't cached
    let store = match open_store(settings) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!("Database unavailable, results will not be stored: {}", e);
            RepoStore::new()
        }
    };

    let spinner = output_mode
        .is_human()
        .then(|| Spinner::new(&format!("Searching GitHub for '{}'...", keyword)));
    let results = search_and_store(&client, &store, keyword, page).await;
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }
    let results = results?;

    if !output_mode.is_human() {
        return emit_success("search", serde_json::to_value(&results)?);
    }

    if results.repos.is_empty() {
        println!("{} No repositories found.", Icons::EMPTY);
        return Ok(());
    }

    println!("{}", ui::repos_table(&results.repos, page.offset() + 1));
    ui::summary_row(
        "Page",
        &format!("{} ({} of {} total)", page.number, results.repos.len(), results.total_count),
    );
    Ok(())
}

pub fn run_list(settings: &Settings, page: Page, output_mode: OutputMode) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let results = store.list(page)?;

    if !output_mode.is_human() {
        return emit_success("list", serde_json::to_value(&results)?);
    }

    if results.repos.is_empty() {
        println!("{} No stored repositories on page {}.", Icons::EMPTY, page.number);
        return Ok(());
    }

    println!(
        "{}",
        ui::repos_table(results.repos.iter().map(|r| &r.record), page.offset() + 1)
    );
    ui::summary_row(
        "Page",
        &format!("{} ({} of {} stored)", page.number, results.repos.len(), results.total_count),
    );
    Ok(())
}

pub fn run_stats(settings: &Settings, output_mode: OutputMode) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let stats = store.stats()?;

    if !output_mode.is_human() {
        return emit_success("stats", serde_json::to_value(&stats)?);
    }

    let repos = stats.repos.to_string();
    let database = settings.database.display().to_string();
    println!("{} Repocache Statistics", Icons::STATS);
    println!(
        "{}",
        ui::stats_table(&[
            ("Repositories", repos.as_str()),
            ("Connection", stats.state.as_str()),
            ("Database", database.as_str()),
        ])
    );
    Ok(())
}

pub fn run_init(
    config_path: &Path,
    settings: &Settings,
    force: bool,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let config = RepocacheConfig {
        database: Some(settings.database.display().to_string()),
        port: Some(settings.port),
        api_url: None,
        token: None,
    };
    config::write_config(config_path, &config, force)?;
    config::ensure_gitignore(Path::new("."))?;

    if output_mode.is_human() {
        ui::banner(
            &format!("{}", "Repocache".bold().style(ui::theme().info.clone())),
            &format!("Version {}", env!("CARGO_PKG_VERSION")),
        );
        ui::success(&format!("Wrote {}", config_path.display()));
        ui::info("Database", &settings.database.display().to_string());
    } else {
        let data = serde_json::json!({
            "config": config_path.display().to_string(),
            "database": settings.database.display().to_string(),
        });
        emit_success("init", data)?;
    }
    Ok(())
}
