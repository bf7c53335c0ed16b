use causagraph::{
    add_node, deps_from_model, parse_scm, remove_edge, remove_node, rename_node,
    upsert_edge_coefficient, UpsertOptions,
};

#[test]
fn add_then_remove_is_idempotent_on_variable_set() {
    let original = "U = 2\nX = 1 + 0.5*U\nY = -1 + 2*X";
    let added = add_node(original, "W").expect("add");
    assert!(parse_scm(&added).expect("parse").is_assigned("W"));
    let restored = remove_node(&added, "W").expect("remove");
    assert_eq!(
        parse_scm(original).expect("parse").vars(),
        parse_scm(&restored).expect("parse").vars()
    );
}

#[test]
fn rename_updates_the_whole_diagram() {
    let out = rename_node("U = 2\nX = 1 + 0.5*U\nY = U + U_total", "U", "Cause")
        .expect("rename");
    assert_eq!(out, "Cause = 2\nX = 1 + 0.5*Cause\nY = Cause + U_total");
    let model = parse_scm(&out).expect("parse");
    assert!(!model.contains("U"));
    assert!(model.contains("U_total"));
}

#[test]
fn remove_node_keeps_graph_consistent() {
    let out = remove_node("Z = 1\nX = 2*Z + 3\nY = X + Z + 1", "Z").expect("remove");
    let model = parse_scm(&out).expect("parse");
    assert!(!model.contains("Z"));
    let eqs = deps_from_model(&model);
    assert!(eqs["Y"].contains("X"));
    assert!(!eqs["Y"].contains("Z"));
}

#[test]
fn remove_node_falls_back_to_textual_substitution() {
    let out = remove_node("Z = 1\nY = exp(Z) * X", "Z").expect("remove");
    assert_eq!(out, "Y = exp(0) * X");
}

#[test]
fn remove_edge_preserves_orphaned_parent() {
    let out = remove_edge("X = 2*Z", "Z", "X").expect("remove edge");
    let model = parse_scm(&out).expect("parse");
    assert!(model.contains("Z"), "Z should remain a diagram node: {}", out);
    assert!(deps_from_model(&model)["X"].is_empty());
}

#[test]
fn upsert_matches_pinned_output() {
    let out = upsert_edge_coefficient("Y = 2*A + 1", "B", "Y", 3.0, UpsertOptions::default())
        .expect("upsert");
    assert_eq!(out, "Y = 2*A + 3*B + 1");
}

#[test]
fn upsert_round_trips_through_parser() {
    let out = upsert_edge_coefficient("Y = 2*A + 1", "B", "Y", 0.125, UpsertOptions::default())
        .expect("upsert");
    assert_eq!(out, "Y = 2*A + 0.125*B + 1");
    parse_scm(&out).expect("output is valid SCM text");
}

#[test]
fn upsert_refuses_new_arrow_when_guarded() {
    let opts = UpsertOptions {
        require_existing_term: true,
    };
    let err = upsert_edge_coefficient("Y = 2*A + 1", "B", "Y", 3.0, opts).expect_err("guarded");
    assert!(err.to_string().contains("no existing term"));
}

#[test]
fn operations_validate_identifiers() {
    assert!(add_node("X = 1", "not an ident").is_err());
    assert!(rename_node("X = 1", "X", "9Y").is_err());
    assert!(remove_node("X = 1", "a-b").is_err());
    assert!(remove_edge("Y = X", "X", "").is_err());
}

#[test]
fn failed_operations_change_nothing() {
    // all-or-nothing: a failing edit returns Err and the caller keeps the
    // original text untouched
    let original = "X = 1\nY = sin(X)";
    assert!(upsert_edge_coefficient(original, "X", "Y", 2.0, UpsertOptions::default()).is_err());
    let model = parse_scm(original).expect("original still parses");
    assert_eq!(model.get("Y").expect("Y").source_text, "sin(X)");
}
