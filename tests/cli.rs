use repocache::{RepoRecord, RepoStore};
use std::process::Command;

fn repocache(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_repocache"));
    cmd.current_dir(dir)
        .env_remove("DATABASE_URL")
        .env_remove("PORT")
        .env("REPOCACHE_QUIET", "1");
    cmd
}

#[test]
fn test_init_force_replaces_malformed_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("repocache.toml");
    std::fs::write(&config, "port = \"not a number\"\n").unwrap();

    let output = repocache(dir.path()).args(["init", "--force"]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("port = 5000"), "{written}");
    let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert!(gitignore.contains(".repocache/"));
}

#[test]
fn test_init_without_force_keeps_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("repocache.toml");
    std::fs::write(&config, "port = \"not a number\"\n").unwrap();

    let output = repocache(dir.path()).args(["init"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--force"));
    assert_eq!(std::fs::read_to_string(&config).unwrap(), "port = \"not a number\"\n");
}

#[test]
fn test_quiet_list_prints_table_without_summary() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("repos.db");
    let store = RepoStore::open(&db).unwrap();
    store
        .upsert_many(&[RepoRecord::new("tokio", "https://github.com/tokio-rs/tokio", 30000)])
        .unwrap();
    store.close().unwrap();

    let output = repocache(dir.path())
        .args(["list", "--database"])
        .arg(&db)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tokio"));
    assert!(!stdout.contains("Page"), "{stdout}");
}

#[test]
fn test_stats_json_reports_count_and_state() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("repos.db");
    let store = RepoStore::open(&db).unwrap();
    store
        .upsert_many(&[
            RepoRecord::new("serde", "https://github.com/serde-rs/serde", 9000),
            RepoRecord::new("axum", "https://github.com/tokio-rs/axum", 20000),
        ])
        .unwrap();
    store.close().unwrap();

    let output = repocache(dir.path())
        .args(["--json", "stats", "--database"])
        .arg(&db)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["ok"], true);
    assert_eq!(value["command"], "stats");
    assert_eq!(value["data"]["repos"], 2);
    assert_eq!(value["data"]["state"], "connected");
}
