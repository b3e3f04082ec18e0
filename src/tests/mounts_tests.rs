// `mounts` listing

use std::time::Duration;
use tempfile::TempDir;

use crate::cli::mounts::summarize_mounts;
use crate::cli::{OutputFormat, list_mounts};
use crate::config::NotifyConfig;
use crate::database::FileCacheDatabase;

fn config(temp_dir: &TempDir) -> NotifyConfig {
    let share = temp_dir.path().join("share");
    std::fs::create_dir(&share).unwrap();

    let mut config = NotifyConfig::from_toml(&format!(
        r#"
        [[mounts]]
        id = 42
        mount_point = "/shared"
        backend = "local"
        root = "{}"

        [[mounts]]
        id = 43
        mount_point = "/team"
        backend = "smb"
        host = "files.lan"
        share = "team"

        [[mounts]]
        id = 44
        mount_point = "/private"
        backend = "sftp"
        host = "files.lan"
        auth = "user_provided"
        "#,
        share.display()
    ))
    .unwrap();
    config.database.path = temp_dir.path().join("filecache.db").display().to_string();
    config
}

#[test]
fn test_summaries_show_capability_and_storages() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(&temp_dir);
    let db = FileCacheDatabase::new(config.database_path(), Duration::from_millis(500)).unwrap();
    db.register_mount_storage(42, 7, "/shared").unwrap();
    db.register_mount_storage(42, 9, "/shared").unwrap();

    let summaries = summarize_mounts(&config, Some(&db));

    assert_eq!(summaries.len(), 3);
    assert!(summaries[0].notify);
    assert_eq!(summaries[0].storage_ids, Some(vec![7, 9]));
    assert!(!summaries[1].notify);
    assert_eq!(summaries[1].location.as_deref(), Some("smb://files.lan/team"));
    assert!(summaries[2].error.is_some());
}

#[test]
fn test_summaries_without_database() {
    let temp_dir = TempDir::new().unwrap();
    let summaries = summarize_mounts(&config(&temp_dir), None);
    assert!(summaries.iter().all(|s| s.storage_ids.is_none()));
}

#[test]
fn test_json_listing() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(&temp_dir);

    let mut out = Vec::new();
    list_mounts(&config, OutputFormat::Json, &mut out).unwrap();

    let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["id"], 42);
    assert_eq!(rows[0]["backend"], "local");
    assert_eq!(rows[1]["notify"], false);
}

#[test]
fn test_table_listing() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(&temp_dir);

    let mut out = Vec::new();
    list_mounts(&config, OutputFormat::Table, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("ID"));
    assert!(text.contains("/team"));
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn test_unresolvable_local_mount_is_not_notify_capable() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("gone");

    let config = NotifyConfig::from_toml(&format!(
        r#"
        [[mounts]]
        id = 50
        mount_point = "/gone"
        backend = "local"
        root = "{}"

        [[mounts]]
        id = 51
        mount_point = "/rootless"
        backend = "local"
        "#,
        missing.display()
    ))
    .unwrap();

    let summaries = summarize_mounts(&config, None);

    assert_eq!(summaries.len(), 2);
    for summary in &summaries {
        assert!(!summary.notify, "mount {} listed as notify-capable", summary.id);
        assert!(summary.error.is_some());
        assert!(summary.location.is_none());
    }
}
