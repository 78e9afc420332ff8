use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::github::DEFAULT_API_URL;

pub const DEFAULT_PORT: u16 = 5000;

/// Contents of `repocache.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RepocacheConfig {
    pub database: Option<String>,
    pub port: Option<u16>,
    pub api_url: Option<String>,
    pub token: Option<String>,
}

/// Values given on the command line (clap already folds in `PORT` and
/// `DATABASE_URL`)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<PathBuf>,
    pub port: Option<u16>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: PathBuf,
    pub port: u16,
    pub api_url: String,
    pub token: Option<String>,
}

impl Settings {
    /// Resolve settings with precedence: command line / environment, then
    /// config file, then defaults. `env` looks up environment variables.
    pub fn resolve(
        file: Option<&RepocacheConfig>,
        overrides: Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let file = file.cloned().unwrap_or_default();
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let database = overrides
            .database
            .or_else(|| file.database.map(PathBuf::from))
            .unwrap_or_else(|| default_database_path_in(Path::new(".")));

        let port = overrides.port.or(file.port).unwrap_or(DEFAULT_PORT);

        let api_url = env("GITHUB_API_URL")
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let token = env("GITHUB_TOKEN").or(file.token.filter(|t| !t.trim().is_empty()));

        Self { database, port, api_url, token }
    }

    /// Resolve against the process environment
    pub fn from_env(file: Option<&RepocacheConfig>, overrides: Overrides) -> Self {
        Self::resolve(file, overrides, |key| std::env::var(key).ok())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("repocache.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".repocache").join("repos.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<RepocacheConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: RepocacheConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// Load the config file for `init`, which rewrites it anyway: an unreadable
/// or malformed file counts as absent.
pub fn load_config_for_init(path: &Path) -> Option<RepocacheConfig> {
    match load_config(Some(path)) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring existing config at {}: {}", path.display(), e);
            None
        }
    }
}

pub fn write_config(path: &Path, config: &RepocacheConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn ensure_gitignore(project_root: &Path) -> anyhow::Result<()> {
    let gitignore_path = project_root.join(".gitignore");
    let entry = ".repocache/";

    let mut content = String::new();
    if gitignore_path.exists() {
        content = std::fs::read_to_string(&gitignore_path)?;
        if content.lines().any(|line| line.trim() == entry) {
            return Ok(());
        }
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
    }
    content.push_str(entry);
    content.push('\n');
    std::fs::write(&gitignore_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(None, Overrides::default(), env_of(&[]));
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.token, None);
        assert!(settings.database.ends_with(".repocache/repos.db"));
    }

    #[test]
    fn test_precedence() {
        let file = RepocacheConfig {
            database: Some("from-file.db".into()),
            port: Some(8080),
            api_url: Some("http://file.example".into()),
            token: Some("file-token".into()),
        };
        let overrides = Overrides { database: None, port: Some(9000) };
        let env = env_of(&[("GITHUB_TOKEN", "env-token")]);

        let settings = Settings::resolve(Some(&file), overrides, env);
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.database, PathBuf::from("from-file.db"));
        assert_eq!(settings.api_url, "http://file.example");
        assert_eq!(settings.token.as_deref(), Some("env-token"));
    }

    #[test]
    fn test_blank_env_token_is_unset() {
        let env = env_of(&[("GITHUB_TOKEN", "  ")]);
        let settings = Settings::resolve(None, Overrides::default(), env);
        assert_eq!(settings.token, None);
    }

    #[test]
    fn test_config_roundtrip_and_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repocache.toml");
        let config = RepocacheConfig { port: Some(7000), ..Default::default() };

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.port, Some(7000));
        assert!(load_config(Some(&dir.path().join("missing.toml"))).unwrap().is_none());
    }

    #[test]
    fn test_malformed_config_can_be_replaced_by_init() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repocache.toml");
        std::fs::write(&path, "port = \"not a number\"\n").unwrap();

        assert!(load_config(Some(&path)).is_err());
        assert!(load_config_for_init(&path).is_none());

        let config = RepocacheConfig { port: Some(5001), ..Default::default() };
        write_config(&path, &config, true).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().unwrap().port, Some(5001));
    }

    #[test]
    fn test_ensure_gitignore_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "target").unwrap();

        ensure_gitignore(dir.path()).unwrap();
        ensure_gitignore(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "target\n.repocache/\n");
    }
}
