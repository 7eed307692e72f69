use super::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reelname_core::{Action, ConflictKind, Episode, MediaKind, Metadata, Movie, ProviderError, Show};

use crate::conflict::PathProbe;
use crate::formatter::PlexFormatter;
use crate::pipeline::MetadataFailure;

fn probe(existing: &[&str]) -> PathProbe {
    let set: HashSet<PathBuf> = existing.iter().map(PathBuf::from).collect();
    Arc::new(move |p: &Path| set.contains(p))
}

fn builder(existing: &[&str]) -> PlanBuilder<PlexFormatter> {
    PlanBuilder::new(PlexFormatter).with_conflict_handling(
        ConflictDetector::with_probe(probe(existing)),
        ConflictResolver::with_probe(probe(existing)),
    )
}

fn movie_file(path: &str, title: &str, year: i32) -> MediaFile {
    MediaFile::new(path)
        .with_kind(MediaKind::Movie)
        .with_metadata(Metadata::Movie(Movie::new(title).with_year(year)))
}

#[test]
fn classifies_rename_and_noop() {
    let files = vec![
        movie_file("/m/Movie.Name.2020.mkv", "Movie Name", 2020),
        movie_file("/m/Other (1999).mkv", "Other", 1999),
    ];
    let plan = builder(&[]).build(&files).unwrap();

    assert_eq!(plan.changes.len(), 2);
    assert_eq!(plan.changes[0].action, Action::Rename);
    assert_eq!(plan.changes[0].after.path, PathBuf::from("/m/Movie Name (2020).mkv"));
    assert_eq!(plan.changes[1].action, Action::Noop);
    assert!(plan.conflicts.is_empty());
}

#[test]
fn format_errors_drop_the_file_into_plan_errors() {
    let files = vec![
        MediaFile::new("/m/unknown.mkv"),
        movie_file("/m/a.mkv", "A", 2001),
    ];
    let plan = builder(&[]).build(&files).unwrap();
    assert_eq!(plan.changes.len(), 1);
    assert_eq!(plan.errors.len(), 1);
    assert_eq!(plan.errors[0].file, PathBuf::from("/m/unknown.mkv"));
    assert_eq!(plan.errors[0].message, "file has no metadata");
}

#[test]
fn building_twice_gives_the_same_targets() {
    let files = vec![
        movie_file("/m/Movie.Name.2020.1080p.mkv", "Movie Name", 2020),
        movie_file("/m/Movie.Name.2020.720p.mkv", "Movie Name", 2020),
        movie_file("/m/Other.mkv", "Other", 2010),
    ];
    let b = builder(&["/m/Other (2010).mkv"]);
    let first = b.build(&files).unwrap();
    let second = b.build(&files).unwrap();

    let shape = |p: &Plan| -> Vec<(Action, PathBuf)> {
        p.changes.iter().map(|c| (c.action, c.after.path.clone())).collect()
    };
    assert_eq!(shape(&first), shape(&second));
    assert_ne!(first.id, second.id);
}

#[test]
fn duplicate_movies_are_renumbered_by_default() {
    let files = vec![
        movie_file("/m/Movie.Name.2020.1080p.mkv", "Movie Name", 2020),
        movie_file("/m/Movie.Name.2020.720p.mkv", "Movie Name", 2020),
    ];
    let plan = builder(&[]).build(&files).unwrap();

    assert_eq!(plan.conflicts.len(), 1);
    assert_eq!(plan.conflicts[0].kind, ConflictKind::MultipleSource);
    assert!(plan.conflicts[0].resolved);
    let names: Vec<&str> = plan.changes.iter().map(|c| c.after.filename.as_str()).collect();
    assert_eq!(names, vec!["Movie Name (2020).mkv", "Movie Name (2020) (1).mkv"]);
    assert_eq!(plan.applicable_changes().count(), 2);
}

#[test]
fn file_strategy_tag_drives_resolution() {
    let files = vec![
        movie_file("/m/a.mkv", "Same", 2000).with_strategy(ConflictStrategy::Skip),
        movie_file("/m/b.mkv", "Same", 2000).with_strategy(ConflictStrategy::Skip),
    ];
    let plan = builder(&[]).build(&files).unwrap();
    assert!(plan.changes.iter().all(|c| c.action == Action::Skip));

    let overridden = builder(&[])
        .with_options(PlanOptions {
            strategy_override: Some(ConflictStrategy::Overwrite),
        })
        .build(&files)
        .unwrap();
    assert_eq!(overridden.changes[0].action, Action::Rename);
    assert_eq!(overridden.changes[1].action, Action::Skip);
}

#[test]
fn prompt_user_tag_leaves_conflict_open() {
    let files = vec![
        movie_file("/m/a.mkv", "Same", 2000).with_strategy(ConflictStrategy::PromptUser),
        movie_file("/m/b.mkv", "Same", 2000).with_strategy(ConflictStrategy::PromptUser),
    ];
    let b = builder(&[]);
    let mut plan = b.build(&files).unwrap();
    assert!(plan.has_unresolved_conflicts());
    assert_eq!(plan.applicable_changes().count(), 0);

    let id = plan.conflicts[0].id.clone();
    b.resolver()
        .resolve_conflict(&mut plan, &id, ConflictStrategy::AppendNumber)
        .unwrap();
    assert_eq!(plan.applicable_changes().count(), 2);
}

#[test]
fn report_failures_become_plan_errors_with_provider_message() {
    let episode = Metadata::Episode(Episode::new(Show::new("Show"), 1, 1).with_title("Pilot"));
    let report = EnrichReport {
        files: vec![
            MediaFile::new("/tv/z.mkv"),
            MediaFile::new("/tv/Show.S01E01.mkv")
                .with_kind(MediaKind::Episode)
                .with_metadata(episode),
        ],
        failures: vec![MetadataFailure {
            path: PathBuf::from("/tv/z.mkv"),
            error: ProviderError::not_found("z.mkv"),
        }],
    };

    let plan = builder(&[]).build_from_report(&report).unwrap();
    assert_eq!(plan.changes.len(), 1);
    assert_eq!(plan.changes[0].after.filename, "Show - S01E01 - Pilot.mkv");
    assert!(plan.changes[0].metadata.is_some());
    assert_eq!(plan.errors.len(), 1);
    assert!(plan.errors[0].message.contains("no metadata found"));
}

#[test]
fn existing_target_is_skipped_by_default() {
    let files = vec![movie_file("/m/a.mkv", "Taken", 2000)];
    let plan = builder(&["/m/Taken (2000).mkv"]).build(&files).unwrap();
    assert_eq!(plan.conflicts[0].kind, ConflictKind::TargetExists);
    assert_eq!(plan.changes[0].action, Action::Skip);
}
