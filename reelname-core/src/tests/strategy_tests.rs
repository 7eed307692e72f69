use super::*;

#[test]
fn canonical_names_round_trip() {
    for &strategy in ConflictStrategy::all() {
        let parsed: ConflictStrategy = strategy.name().parse().unwrap();
        assert_eq!(parsed, strategy, "round-trip failed for {:?}", strategy);
    }
}

#[test]
fn aliases_resolve_correctly() {
    let cases = [
        ("number", ConflictStrategy::AppendNumber),
        ("Append-Number", ConflictStrategy::AppendNumber),
        ("timestamp", ConflictStrategy::AppendTimestamp),
        ("prompt", ConflictStrategy::PromptUser),
        (" SKIP ", ConflictStrategy::Skip),
    ];
    for (input, expected) in cases {
        let parsed: ConflictStrategy = input.parse().unwrap();
        assert_eq!(parsed, expected, "alias '{}' should parse to {:?}", input, expected);
    }
}

#[test]
fn unknown_strategy_is_rejected() {
    let err = "rename_everything".parse::<ConflictStrategy>().unwrap_err();
    assert!(err.to_string().contains("rename_everything"));
}

#[test]
fn default_is_append_number() {
    assert_eq!(ConflictStrategy::default(), ConflictStrategy::AppendNumber);
}

#[test]
fn only_prompt_user_needs_interaction() {
    let interactive: Vec<_> = ConflictStrategy::all()
        .iter()
        .filter(|s| !s.is_automatic())
        .collect();
    assert_eq!(interactive, vec![&ConflictStrategy::PromptUser]);
}

#[test]
fn serde_uses_snake_case_names() {
    let json = serde_json::to_string(&ConflictStrategy::AppendTimestamp).unwrap();
    assert_eq!(json, "\"append_timestamp\"");
    let back: ConflictStrategy = serde_json::from_str("\"overwrite\"").unwrap();
    assert_eq!(back, ConflictStrategy::Overwrite);
}
