use super::*;
use tempfile::TempDir;

#[test]
fn missing_file_gives_defaults() {
    let tmp = TempDir::new().unwrap();
    let settings = Settings::load_from(&tmp.path().join("settings.toml")).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.concurrency, 10);
    assert_eq!(settings.conflict_strategy, ConflictStrategy::AppendNumber);
}

#[test]
fn partial_file_fills_in_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("settings.toml");
    std::fs::write(
        &path,
        r#"
concurrency = 3
conflict_strategy = "skip"

[[directories]]
path = "/media/tv"
kind = "tv"
recursive = false
conflict_strategy = "prompt_user"

[[directories]]
path = "/media/movies"
"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.concurrency, 3);
    assert_eq!(settings.requests_per_second, 4.0);
    assert_eq!(settings.directories.len(), 2);

    let tv = &settings.directories[0];
    assert_eq!(tv.kind, MediaKind::Episode);
    assert!(!tv.recursive);
    let opts = settings.scan_options(tv);
    assert_eq!(opts.strategy, ConflictStrategy::PromptUser);

    let movies = &settings.directories[1];
    assert_eq!(movies.kind, MediaKind::Unknown);
    assert!(movies.recursive);
    assert_eq!(settings.scan_options(movies).strategy, ConflictStrategy::Skip);
}

#[test]
fn save_then_load_round_trips() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested/settings.toml");
    let mut settings = Settings::default();
    settings.directories.push(DirectoryConfig {
        kind: MediaKind::Movie,
        ..DirectoryConfig::new("/media/movies")
    });
    settings.journal_path = Some(tmp.path().join("j.json"));

    settings.save_to(&path).unwrap();
    assert!(!path.with_extension("toml.tmp").exists());
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("kind = \"movie\""));
    assert_eq!(Settings::load_from(&path).unwrap(), settings);
}

#[test]
fn validation_rejects_bad_values() {
    let zero = Settings {
        concurrency: 0,
        ..Settings::default()
    };
    assert!(matches!(zero.validate(), Err(SettingsError::Invalid { ref field, .. }) if field == "concurrency"));

    let negative = Settings {
        requests_per_second: -1.0,
        ..Settings::default()
    };
    assert!(negative.validate().is_err());

    let mut empty_dir = Settings::default();
    empty_dir.directories.push(DirectoryConfig::new(""));
    assert!(empty_dir.validate().is_err());
}

#[test]
fn invalid_file_is_reported() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("settings.toml");
    std::fs::write(&path, "concurrency = 0\n").unwrap();
    assert!(matches!(Settings::load_from(&path), Err(SettingsError::Invalid { .. })));

    std::fs::write(&path, "conflict_strategy = \"sometimes\"\n").unwrap();
    assert!(matches!(Settings::load_from(&path), Err(SettingsError::Parse(_))));
}

#[test]
fn set_value_parses_and_validates() {
    let mut settings = Settings::default();
    settings.set_value("conflict_strategy", "timestamp").unwrap();
    assert_eq!(settings.conflict_strategy, ConflictStrategy::AppendTimestamp);

    settings.set_value("provider_timeout_secs", "0").unwrap();
    assert_eq!(settings.pipeline_config().item_timeout, None);

    assert!(settings.set_value("concurrency", "0").is_err());
    assert_eq!(settings.concurrency, DEFAULT_CONCURRENCY);
    assert!(matches!(
        settings.set_value("colour", "red"),
        Err(SettingsError::UnknownKey(_))
    ));
}

#[test]
fn zero_rate_disables_limiter() {
    let mut settings = Settings::default();
    assert!(settings.rate_limiter().is_some());
    settings.requests_per_second = 0.0;
    assert!(settings.rate_limiter().is_none());
}

#[test]
fn journal_path_override_is_used() {
    let settings = Settings {
        journal_path: Some(PathBuf::from("/tmp/custom.json")),
        ..Settings::default()
    };
    assert_eq!(
        settings.journal_store().unwrap().path(),
        Path::new("/tmp/custom.json")
    );
}

#[test]
fn unschedulable_rate_is_rejected() {
    let tiny = Settings {
        requests_per_second: 1e-30,
        ..Settings::default()
    };
    assert!(matches!(
        tiny.validate(),
        Err(SettingsError::Invalid { ref field, .. }) if field == "requests_per_second"
    ));
    assert!(tiny.rate_limiter().is_none());

    let mut settings = Settings::default();
    assert!(settings.set_value("requests_per_second", "1e-30").is_err());
    assert_eq!(settings.requests_per_second, 4.0);
}
