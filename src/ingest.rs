//! Search-then-store flow shared by the HTTP server and the CLI

use crate::github::{GitHubClient, SearchResults};
use crate::record::Page;
use crate::storage::RepoStore;
use crate::Result;

/// Search upstream and upsert every returned record.
///
/// Only the upstream call can fail this function. Write failures are logged
/// and dropped, so the returned results (and `total_count`) are exactly what
/// the upstream reported.
pub async fn search_and_store(
    client: &GitHubClient,
    store: &RepoStore,
    keyword: &str,
    page: Page,
) -> Result<SearchResults> {
    let results = client.search(keyword, page).await?;

    match store.upsert_many(&results.repos) {
        Ok(summary) => {
            tracing::debug!(
                "Stored {} repos ({} new, {} updated)",
                summary.written(),
                summary.inserted,
                summary.updated
            );
            for (url, message) in &summary.failed {
                tracing::warn!("Failed to store {}: {}", url, message);
            }
        }
        Err(e) => {
            tracing::warn!("Skipped storing {} repos: {}", results.repos.len(), e);
        }
    }

    Ok(results)
}
