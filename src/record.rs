//! Repository records and pagination arithmetic

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// Page size used for upstream searches
pub const SEARCH_PAGE_SIZE: u32 = 5;

/// Default page size for stored-result browsing
pub const DEFAULT_PER_PAGE: u32 = 5;

/// Largest page size accepted for stored-result browsing
pub const MAX_PER_PAGE: u32 = 100;

/// A normalized repository search result.
///
/// `url` is the identity of a record: storing the same url twice updates the
/// existing row instead of adding a second one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub name: String,
    pub url: String,
    pub stars: u32,
    pub username: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
}

impl RepoRecord {
    pub fn new(name: impl Into<String>, url: impl Into<String>, stars: u32) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            stars,
            username: None,
            description: None,
            language: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// A record as read back from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRepo {
    pub id: i64,
    #[serde(flatten)]
    pub record: RepoRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub per_page: u32,
}

impl Page {
    pub fn new(number: u32, per_page: u32) -> Result<Self> {
        if number == 0 {
            return Err(Error::InvalidInput("page must be a positive integer".to_string()));
        }
        if per_page == 0 {
            return Err(Error::InvalidInput("per_page must be a positive integer".to_string()));
        }
        Ok(Self { number, per_page })
    }

    /// Page of upstream search results (fixed page size)
    pub fn search(number: u32) -> Result<Self> {
        Self::new(number, SEARCH_PAGE_SIZE)
    }

    /// Parse raw query values. Missing or blank values take their defaults;
    /// `per_page` is capped at [`MAX_PER_PAGE`].
    pub fn from_query(page: Option<&str>, per_page: Option<&str>) -> Result<Self> {
        let number = parse_positive(page, "page")?.unwrap_or(1);
        let per_page = parse_positive(per_page, "per_page")?
            .unwrap_or(DEFAULT_PER_PAGE)
            .min(MAX_PER_PAGE);
        Self::new(number, per_page)
    }

    /// Number of rows to skip before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { number: 1, per_page: DEFAULT_PER_PAGE }
    }
}

/// Parse an optional query value as a positive integer
pub fn parse_positive(raw: Option<&str>, field: &str) -> Result<Option<u32>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<u32>() {
        Ok(0) | Err(_) => Err(Error::InvalidInput(format!("{} must be a positive integer", field))),
        Ok(n) => Ok(Some(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_arithmetic() {
        assert_eq!(Page::new(1, 5).unwrap().offset(), 0);
        assert_eq!(Page::new(2, 5).unwrap().offset(), 5);
        assert_eq!(Page::new(4, 10).unwrap().offset(), 30);
    }

    #[test]
    fn test_from_query_defaults() {
        let page = Page::from_query(None, None).unwrap();
        assert_eq!(page, Page { number: 1, per_page: 5 });

        let page = Page::from_query(Some(""), Some("  ")).unwrap();
        assert_eq!(page, Page::default());
    }

    #[test]
    fn test_from_query_rejects_bad_values() {
        assert!(Page::from_query(Some("0"), None).is_err());
        assert!(Page::from_query(Some("abc"), None).is_err());
        assert!(Page::from_query(None, Some("-3")).is_err());
        assert!(Page::new(1, 0).is_err());
    }

    #[test]
    fn test_per_page_is_capped() {
        let page = Page::from_query(Some("2"), Some("1000")).unwrap();
        assert_eq!(page.per_page, MAX_PER_PAGE);
        assert_eq!(page.offset(), 100);
    }

    #[test]
    fn test_stored_repo_serializes_flat_camel_case() {
        let now = Utc::now();
        let stored = StoredRepo {
            id: 7,
            record: RepoRecord::new("tokio", "https://github.com/tokio-rs/tokio", 30000)
                .with_username("tokio-rs")
                .with_language("Rust"),
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["url"], "https://github.com/tokio-rs/tokio");
        assert_eq!(value["stars"], 30000);
        assert_eq!(value["username"], "tokio-rs");
        assert!(value["description"].is_null());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }
}
