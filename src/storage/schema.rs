//! Database schema definitions

/// SQL to create the repos table
pub const CREATE_REPOS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS repos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(name) > 0),
    url TEXT NOT NULL UNIQUE CHECK (length(url) > 0),
    stars INTEGER NOT NULL DEFAULT 0 CHECK (stars >= 0),
    username TEXT,
    description TEXT,
    language TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_repos_stars ON repos(stars DESC)",
];

/// Update-or-insert keyed on url. `created_at` survives updates.
pub const UPSERT_REPO: &str = r#"
INSERT INTO repos (name, url, stars, username, description, language, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
ON CONFLICT(url) DO UPDATE SET
    name = excluded.name,
    stars = excluded.stars,
    username = excluded.username,
    description = excluded.description,
    language = excluded.language,
    updated_at = excluded.updated_at
"#;

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_REPOS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
