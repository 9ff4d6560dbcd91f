use stagehand_core::{
    ConfigError, DEFAULT_HISTORY_LIMIT, EngineConfig, FsError, MAX_HISTORY_LIMIT, TransferMode,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_builder_defaults() {
    let config = EngineConfig::builder().build().unwrap();

    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
    assert!(config.use_trash);
    assert!(config.preserve_timestamps);
    assert!(config.history_enabled());
}

#[test]
fn test_config_builder_overrides() {
    let config = EngineConfig::builder()
        .history_limit(0usize)
        .use_trash(false)
        .build()
        .unwrap();

    assert!(!config.history_enabled());
    assert!(!config.use_trash);
}

#[test]
fn test_config_builder_rejects_huge_limit() {
    let result = EngineConfig::builder()
        .history_limit(MAX_HISTORY_LIMIT + 1)
        .build();
    assert!(result.is_err());
}

#[test]
fn test_config_load_partial_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "history_limit = 5\n").unwrap();

    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.history_limit, 5);
    assert!(config.use_trash);
}

#[test]
fn test_config_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = EngineConfig::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(missing, ConfigError::Read { .. }));

    let path = dir.path().join("bad.toml");
    fs::write(&path, "history_limit = \"many\"").unwrap();
    let bad = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(bad, ConfigError::Parse { .. }));

    let too_big = EngineConfig::from_toml("history_limit = 1000000", Path::new("inline"));
    assert!(matches!(too_big, Err(ConfigError::Invalid { .. })));
}

#[test]
fn test_transfer_mode_names() {
    assert_eq!(TransferMode::Copy.to_string(), "copy");
    assert_eq!(TransferMode::Move.to_string(), "move");
    assert_eq!(TransferMode::Move.past_tense(), "Moved");
}

#[test]
fn test_fs_error_path() {
    let err = FsError::io(
        "/some/file",
        std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    );
    assert_eq!(err.path(), Some(Path::new("/some/file")));
    assert!(err.to_string().contains("/some/file"));

    let err = FsError::invalid_name("a/b", "name cannot contain '/'");
    assert!(err.path().is_none());
}
