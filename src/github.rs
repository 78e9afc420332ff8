//! GitHub repository search client

use reqwest::Client;
use serde::{Deserialize, Serialize};
use crate::record::{Page, RepoRecord};
use crate::{Error, Result};

/// Public GitHub API base URL
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const ACCEPT: &str = "application/vnd.github+json";

/// Upstream search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    total_count: u64,
    #[serde(default)]
    items: Vec<GitHubRepo>,
}

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
    html_url: String,
    #[serde(default)]
    stargazers_count: u32,
    owner: Option<GitHubOwner>,
    description: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubOwner {
    login: String,
}

/// Error body GitHub returns alongside non-2xx statuses
#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

impl From<GitHubRepo> for RepoRecord {
    fn from(repo: GitHubRepo) -> Self {
        Self {
            name: repo.name,
            url: repo.html_url,
            stars: repo.stargazers_count,
            username: repo.owner.map(|o| o.login),
            description: repo.description,
            language: repo.language,
        }
    }
}

/// One page of normalized search results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub repos: Vec<RepoRecord>,
    pub total_count: u64,
}

/// Trim a raw keyword, rejecting missing or blank input
pub fn normalize_keyword(raw: Option<&str>) -> Result<&str> {
    raw.map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::InvalidInput("Keyword is required".to_string()))
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("repocache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Search repositories matching `keyword` and normalize the results.
    ///
    /// Results keep the upstream order. Non-2xx responses become
    /// [`Error::Upstream`] carrying the upstream status and message.
    pub async fn search(&self, keyword: &str, page: Page) -> Result<SearchResults> {
        let keyword = normalize_keyword(Some(keyword))?;
        let url = format!("{}/search/repositories", self.api_url);
        tracing::debug!("GitHub search q={:?} page={} per_page={}", keyword, page.number, page.per_page);

        let mut request = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .query(&[
                ("q", keyword.to_string()),
                ("page", page.number.to_string()),
                ("per_page", page.per_page.to_string()),
            ]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GitHubErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());
            tracing::debug!("GitHub search failed with {}: {}", status, message);
            return Err(Error::Upstream { status: status.as_u16(), message });
        }

        let body: SearchResponse = response.json().await?;
        tracing::debug!("GitHub returned {} items (total {})", body.items.len(), body.total_count);

        Ok(SearchResults {
            repos: body.items.into_iter().map(RepoRecord::from).collect(),
            total_count: body.total_count,
        })
    }
}
