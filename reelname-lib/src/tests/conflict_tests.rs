use super::*;
use std::collections::HashSet;

use reelname_core::Change;

fn probe(existing: &[&str]) -> PathProbe {
    let set: HashSet<PathBuf> = existing.iter().map(PathBuf::from).collect();
    Arc::new(move |p: &Path| set.contains(p))
}

fn plan_of(pairs: &[(&str, &str)], existing: &[&str]) -> Plan {
    let mut plan = Plan::new();
    plan.changes = pairs
        .iter()
        .map(|(from, to)| Change::new(FileRef::new(*from), FileRef::new(*to)))
        .collect();
    ConflictDetector::with_probe(probe(existing)).detect_into(&mut plan);
    plan
}

fn targets(plan: &Plan) -> Vec<String> {
    plan.changes.iter().map(|c| c.after.filename.clone()).collect()
}

#[test]
fn two_sources_one_target_append_number() {
    let mut plan = plan_of(
        &[
            ("/m/Movie.Name.2020.1080p.mkv", "/m/Movie Name (2020).mkv"),
            ("/m/Movie.Name.2020.720p.mkv", "/m/Movie Name (2020).mkv"),
        ],
        &[],
    );

    assert_eq!(plan.conflicts.len(), 1);
    let conflict = &plan.conflicts[0];
    assert_eq!(conflict.kind, ConflictKind::MultipleSource);
    assert_eq!(conflict.change_ids, vec![plan.changes[0].id.clone(), plan.changes[1].id.clone()]);
    assert!(plan.changes.iter().all(|c| c.is_conflicting()));
    assert!(plan.broken_links().is_empty());

    ConflictResolver::with_probe(probe(&[]))
        .resolve_all(&mut plan, ConflictStrategy::AppendNumber)
        .unwrap();

    assert_eq!(targets(&plan), vec!["Movie Name (2020).mkv", "Movie Name (2020) (1).mkv"]);
    assert_eq!(plan.changes[1].after.path, PathBuf::from("/m/Movie Name (2020) (1).mkv"));
    assert!(!plan.has_unresolved_conflicts());
    assert!(plan.changes.iter().all(|c| c.is_applicable()));

    let resolution = plan.conflicts[0].resolution.as_ref().unwrap();
    assert_eq!(resolution.strategy, "append_number");
    assert_eq!(
        resolution.modifications.get(&plan.changes[1].id),
        Some(&PathBuf::from("/m/Movie Name (2020) (1).mkv"))
    );
    assert!(plan.broken_links().is_empty());
}

#[test]
fn existing_target_is_a_single_change_conflict() {
    let plan = plan_of(
        &[("/m/a.mkv", "/m/A.mkv"), ("/m/b.mkv", "/m/B.mkv")],
        &["/m/B.mkv"],
    );
    assert_eq!(plan.conflicts.len(), 1);
    assert_eq!(plan.conflicts[0].kind, ConflictKind::TargetExists);
    assert_eq!(plan.conflicts[0].change_ids, vec![plan.changes[1].id.clone()]);
    assert!(!plan.changes[0].is_conflicting());
}

#[test]
fn contested_target_on_disk_is_only_multiple_source() {
    let plan = plan_of(
        &[("/m/a.mkv", "/m/X.mkv"), ("/m/b.mkv", "/m/X.mkv")],
        &["/m/X.mkv"],
    );
    assert_eq!(plan.conflicts.len(), 1);
    assert_eq!(plan.conflicts[0].kind, ConflictKind::MultipleSource);
}

#[test]
fn noop_and_skip_changes_are_ignored() {
    let mut plan = Plan::new();
    let noop = Change::new(FileRef::new("/m/X.mkv"), FileRef::new("/m/X.mkv"));
    let mut skipped = Change::new(FileRef::new("/m/a.mkv"), FileRef::new("/m/X.mkv"));
    skipped.action = Action::Skip;
    let rename = Change::new(FileRef::new("/m/b.mkv"), FileRef::new("/m/Y.mkv"));
    plan.changes = vec![noop, skipped, rename];

    let conflicts = ConflictDetector::with_probe(probe(&["/m/X.mkv"])).detect(&plan.changes);
    assert!(conflicts.is_empty());
}

#[test]
fn append_number_avoids_disk_and_other_targets() {
    let target = "/m/T.mkv";
    let mut plan = plan_of(
        &[
            ("/m/1.mkv", target),
            ("/m/2.mkv", target),
            ("/m/3.mkv", target),
            ("/m/4.mkv", target),
            ("/m/5.mkv", "/m/T (4).mkv"),
        ],
        &[],
    );
    let on_disk = ["/m/T (1).mkv", "/m/T (3).mkv"];
    ConflictResolver::with_probe(probe(&on_disk))
        .resolve_all(&mut plan, ConflictStrategy::AppendNumber)
        .unwrap();

    let paths: Vec<&PathBuf> = plan.changes.iter().map(|c| &c.after.path).collect();
    let unique: HashSet<&PathBuf> = paths.iter().copied().collect();
    assert_eq!(unique.len(), paths.len(), "targets collide: {paths:?}");
    for path in &paths[..4] {
        assert!(!on_disk.iter().any(|d| Path::new(d) == path.as_path()));
    }
    assert_eq!(
        targets(&plan)[..4],
        ["T.mkv", "T (2).mkv", "T (5).mkv", "T (6).mkv"]
    );
}

#[test]
fn skip_marks_every_contender() {
    let mut plan = plan_of(&[("/m/a.mkv", "/m/X.mkv"), ("/m/b.mkv", "/m/X.mkv")], &[]);
    ConflictResolver::with_probe(probe(&[]))
        .resolve_all(&mut plan, ConflictStrategy::Skip)
        .unwrap();
    assert!(plan.changes.iter().all(|c| c.action == Action::Skip));
    assert_eq!(plan.applicable_changes().count(), 0);
    assert_eq!(plan.summary().skipped_changes, 2);
}

#[test]
fn overwrite_keeps_only_the_first_writer() {
    let mut plan = plan_of(
        &[("/m/a.mkv", "/m/X.mkv"), ("/m/b.mkv", "/m/X.mkv"), ("/m/c.mkv", "/m/X.mkv")],
        &[],
    );
    ConflictResolver::with_probe(probe(&[]))
        .resolve_all(&mut plan, ConflictStrategy::Overwrite)
        .unwrap();
    let actions: Vec<Action> = plan.changes.iter().map(|c| c.action).collect();
    assert_eq!(actions, vec![Action::Rename, Action::Skip, Action::Skip]);
}

#[test]
fn target_exists_overwrite_keeps_rename_others_skip() {
    for (strategy, expected) in [
        (ConflictStrategy::Overwrite, Action::Rename),
        (ConflictStrategy::Skip, Action::Skip),
        (ConflictStrategy::AppendNumber, Action::Skip),
        (ConflictStrategy::AppendTimestamp, Action::Skip),
    ] {
        let mut plan = plan_of(&[("/m/a.mkv", "/m/X.mkv")], &["/m/X.mkv"]);
        ConflictResolver::with_probe(probe(&["/m/X.mkv"]))
            .resolve_all(&mut plan, strategy)
            .unwrap();
        assert_eq!(plan.changes[0].action, expected, "{strategy}");
        assert_eq!(plan.changes[0].after.filename, "X.mkv");
        assert!(!plan.changes[0].is_conflicting());
        assert_eq!(
            plan.conflicts[0].resolution.as_ref().map(|r| r.strategy.as_str()),
            Some(strategy.name())
        );
    }
}

#[test]
fn append_timestamp_suffixes_are_distinct() {
    let pairs: Vec<(String, &str)> = (0..6).map(|i| (format!("/m/{i}.mkv"), "/m/X.mkv")).collect();
    let pairs: Vec<(&str, &str)> = pairs.iter().map(|(a, b)| (a.as_str(), *b)).collect();
    let mut plan = plan_of(&pairs, &[]);

    ConflictResolver::with_probe(probe(&[]))
        .resolve_all(&mut plan, ConflictStrategy::AppendTimestamp)
        .unwrap();

    let names = targets(&plan);
    assert_eq!(names[0], "X.mkv");
    let unique: HashSet<&String> = names.iter().collect();
    assert_eq!(unique.len(), names.len(), "{names:?}");
    for name in &names[1..] {
        assert!(name.starts_with("X (") && name.ends_with(").mkv"), "{name}");
    }
}

#[test]
fn suffix_clock_is_strictly_increasing() {
    let clock = SuffixClock::default();
    let mut prev = clock.next();
    for _ in 0..1000 {
        let next = clock.next();
        assert!(next > prev);
        prev = next;
    }
}

#[test]
fn prompt_user_leaves_conflicts_for_targeted_resolution() {
    let mut plan = plan_of(&[("/m/a.mkv", "/m/X.mkv"), ("/m/b.mkv", "/m/X.mkv")], &[]);
    let resolver = ConflictResolver::with_probe(probe(&[]));

    resolver.resolve_all(&mut plan, ConflictStrategy::PromptUser).unwrap();
    assert!(plan.has_unresolved_conflicts());

    let id = plan.conflicts[0].id.clone();
    assert!(matches!(
        resolver.resolve_conflict(&mut plan, &id, ConflictStrategy::PromptUser),
        Err(ResolveError::UnsupportedStrategy(_))
    ));

    resolver.resolve_conflict(&mut plan, &id, ConflictStrategy::Skip).unwrap();
    assert!(!plan.has_unresolved_conflicts());
    assert!(matches!(
        resolver.resolve_conflict(&mut plan, &id, ConflictStrategy::Skip),
        Err(ResolveError::AlreadyResolved(_))
    ));
    assert!(matches!(
        resolver.resolve_conflict(&mut plan, "missing", ConflictStrategy::Skip),
        Err(ResolveError::UnknownConflict(_))
    ));
}

#[test]
fn malformed_conflict_stops_resolution() {
    let mut plan = plan_of(
        &[("/m/a.mkv", "/m/X.mkv"), ("/m/b.mkv", "/m/Y.mkv")],
        &["/m/X.mkv", "/m/Y.mkv"],
    );
    assert_eq!(plan.conflicts.len(), 2);
    // Corrupt the first conflict: a target_exists conflict with two changes.
    let extra = plan.changes[1].id.clone();
    plan.conflicts[0].change_ids.push(extra);

    let err = ConflictResolver::with_probe(probe(&[]))
        .resolve_all(&mut plan, ConflictStrategy::Skip)
        .unwrap_err();
    assert!(matches!(err, ResolveError::MalformedConflict { .. }));
    assert!(!plan.conflicts[0].resolved);
    assert!(!plan.conflicts[1].resolved, "later conflicts stay untouched");
    assert_eq!(plan.changes[1].action, Action::Rename);
}

#[test]
fn per_conflict_strategy_selection() {
    let mut plan = plan_of(
        &[
            ("/m/a.mkv", "/m/X.mkv"),
            ("/m/b.mkv", "/m/X.mkv"),
            ("/m/c.mkv", "/m/Y.mkv"),
            ("/m/d.mkv", "/m/Y.mkv"),
        ],
        &[],
    );
    let first = plan.conflicts[0].id.clone();
    ConflictResolver::with_probe(probe(&[]))
        .resolve_all_by(&mut plan, |_, c| {
            if c.id == first {
                ConflictStrategy::Skip
            } else {
                ConflictStrategy::AppendNumber
            }
        })
        .unwrap();
    assert_eq!(plan.changes[0].action, Action::Skip);
    assert_eq!(plan.changes[3].after.filename, "Y (1).mkv");
}
