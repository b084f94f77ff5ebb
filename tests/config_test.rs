//! Configuration loading tests.

use std::io::Write;
use vplyer::config::{load_config, load_config_or_default};

#[test]
fn loads_full_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        [api]
        base_url = "https://stream.example.com"
        token = "tok"
        timeout_secs = 5

        [playback]
        poll_interval_secs = 3
        persist_window_secs = 15

        [ads]
        enabled = false
        "#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.api.base_url, "https://stream.example.com");
    assert_eq!(config.api.token.as_deref(), Some("tok"));
    assert_eq!(config.playback.poll_interval_secs, 3);
    assert_eq!(config.playback.persist_window_secs, 15);
    // Unspecified fields keep their defaults.
    assert_eq!(config.playback.reapply_grace_ms, 2000);
    assert!(!config.ads.enabled);
}

#[test]
fn rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        [playback]
        persist_window_secs = 0
        "#
    )
    .unwrap();

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("persist_window_secs"));
}

#[test]
fn rejects_malformed_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "this is not toml [").unwrap();
    assert!(load_config(file.path()).is_err());
}

#[test]
fn missing_file_errors_but_no_path_defaults() {
    let missing = std::path::Path::new("/nonexistent/vplyer.toml");
    assert!(load_config(missing).is_err());
    assert!(load_config_or_default(Some(missing)).is_err());
    // No explicit path falls back to defaults when nothing is on disk.
    assert!(load_config_or_default(None).is_ok());
}
