use super::*;

fn entry(name: &str, offset_secs: i64, reverted: bool) -> StateEntry {
    StateEntry {
        id: name.to_string(),
        timestamp: DateTime::from_timestamp(offset_secs, 0).unwrap(),
        original_path: PathBuf::from(format!("/m/{name}.orig.mkv")),
        new_path: PathBuf::from(format!("/m/{name}.mkv")),
        original_name: format!("{name}.orig.mkv"),
        new_name: format!("{name}.mkv"),
        metadata: None,
        reverted,
    }
}

#[test]
fn last_active_picks_newest_non_reverted() {
    let state = State {
        entries: vec![entry("a", 10, false), entry("b", 30, true), entry("c", 20, false)],
        ..Default::default()
    };
    assert_eq!(state.last_active().map(|e| e.id.as_str()), Some("c"));
}

#[test]
fn last_active_prefers_later_entry_on_equal_timestamps() {
    let state = State {
        entries: vec![entry("a", 10, false), entry("b", 10, false)],
        ..Default::default()
    };
    assert_eq!(state.last_active().map(|e| e.id.as_str()), Some("b"));
}

#[test]
fn last_active_is_none_when_everything_reverted() {
    let state = State {
        entries: vec![entry("a", 10, true)],
        ..Default::default()
    };
    assert!(state.last_active().is_none());
    assert_eq!(state.active().count(), 0);
}

#[test]
fn status_follows_reverted_flag() {
    assert_eq!(entry("a", 0, false).status(), EntryStatus::Active);
    assert_eq!(entry("a", 0, true).status(), EntryStatus::Reverted);
}

#[test]
fn version_check_accepts_same_or_older_major() {
    let mut state = State::default();
    assert!(state.is_supported_version());
    state.version = "1.7".into();
    assert!(state.is_supported_version());
    state.version = "0.9".into();
    assert!(state.is_supported_version());
    state.version = "2.0".into();
    assert!(!state.is_supported_version());
    state.version = "garbage".into();
    assert!(!state.is_supported_version());
}

#[test]
fn entry_without_metadata_or_reverted_field_deserializes() {
    let json = r#"{
        "version": "1.0",
        "entries": [{
            "id": "x",
            "timestamp": "2024-01-02T03:04:05Z",
            "original_path": "/a/old.mkv",
            "new_path": "/a/new.mkv",
            "original_name": "old.mkv",
            "new_name": "new.mkv"
        }]
    }"#;
    let state: State = serde_json::from_str(json).unwrap();
    assert_eq!(state.entries.len(), 1);
    assert!(state.entries[0].is_active());
    assert!(state.entries[0].metadata.is_none());
}

#[test]
fn from_change_copies_paths_and_metadata() {
    use crate::metadata::{Metadata, Movie};
    use crate::plan::{Change, FileRef};

    let change = Change::new(
        FileRef::new("/m/Movie.Name.2020.mkv"),
        FileRef::new("/m/Movie Name (2020).mkv"),
    )
    .with_metadata(Some(Metadata::Movie(Movie::new("Movie Name").with_year(2020))));

    let entry = StateEntry::from_change(&change);
    assert_eq!(entry.original_name, "Movie.Name.2020.mkv");
    assert_eq!(entry.new_path, PathBuf::from("/m/Movie Name (2020).mkv"));
    assert_eq!(entry.metadata, change.metadata);
    assert_eq!(entry.status(), EntryStatus::Active);
}
