use std::collections::BTreeSet;

use causagraph::{
    classify_control_edges, deps_from_model, noise_id, parse_scm, EdgeStatus, PathSearchLimits,
};

fn controls(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn confounder_from_parsed_model() {
    let model = parse_scm("X = 2*Z + error\nY = -Z + error\nZ = 1").expect("parse");
    let eqs = deps_from_model(&model);
    let statuses = classify_control_edges(
        &eqs,
        "X",
        "Y",
        &controls(&["Z"]),
        &BTreeSet::new(),
        &PathSearchLimits::default(),
    );
    assert_eq!(statuses.get("Z->X"), Some(&EdgeStatus::Good));
    assert_eq!(statuses.get("Z->Y"), Some(&EdgeStatus::Good));
}

#[test]
fn mediator_from_parsed_model() {
    let model = parse_scm("Z = 2*X\nY = 3*Z\nX = 0").expect("parse");
    let eqs = deps_from_model(&model);
    let statuses = classify_control_edges(
        &eqs,
        "X",
        "Y",
        &controls(&["Z"]),
        &BTreeSet::new(),
        &PathSearchLimits::default(),
    );
    assert_eq!(statuses.get("X->Z"), Some(&EdgeStatus::Maybe));
    assert_eq!(statuses.get("Z->Y"), Some(&EdgeStatus::Maybe));
}

#[test]
fn collider_from_parsed_model() {
    let model = parse_scm("Z = X + Y\nX = 0\nY = 0").expect("parse");
    let eqs = deps_from_model(&model);
    let statuses = classify_control_edges(
        &eqs,
        "X",
        "Y",
        &controls(&["Z"]),
        &BTreeSet::new(),
        &PathSearchLimits::default(),
    );
    assert_eq!(statuses.get("X->Z"), Some(&EdgeStatus::Bad));
    assert_eq!(statuses.get("Y->Z"), Some(&EdgeStatus::Bad));
}

#[test]
fn noise_nodes_are_excluded_from_analysis() {
    use causagraph::build_noise_augmented_graph;

    let model = parse_scm("X = 2*Z\nY = 3*Z\nZ = 1").expect("parse");
    let aug = build_noise_augmented_graph(&deps_from_model(&model));
    let excluded: BTreeSet<String> = aug
        .keys()
        .filter(|k| causagraph::is_noise_id(k))
        .cloned()
        .collect();
    assert!(excluded.contains(&noise_id("X")));
    let statuses = classify_control_edges(
        &aug,
        "X",
        "Y",
        &controls(&["Z"]),
        &excluded,
        &PathSearchLimits::default(),
    );
    // identical to the unaugmented analysis once noise nodes are excluded
    assert_eq!(statuses.get("Z->X"), Some(&EdgeStatus::Good));
    assert_eq!(statuses.get("Z->Y"), Some(&EdgeStatus::Good));
    assert!(statuses.keys().all(|k| !k.contains("noise:")));
}

#[test]
fn missing_endpoints_classify_nothing() {
    let model = parse_scm("X = 1\nY = 2").expect("parse");
    let eqs = deps_from_model(&model);
    let statuses = classify_control_edges(
        &eqs,
        "X",
        "Q",
        &controls(&["Y"]),
        &BTreeSet::new(),
        &PathSearchLimits::default(),
    );
    assert!(statuses.is_empty());
}

#[test]
fn limits_are_respected_on_dense_graphs() {
    // ladder graph with many X-Y paths; tiny limits must still terminate
    let text = "\
        A = X\nB = X\nC = A + B\nD = A + C\nE1 = B + D\nY = C + D + E1\nX = 0";
    let model = parse_scm(text).expect("parse");
    let eqs = deps_from_model(&model);
    let tight = PathSearchLimits {
        max_depth: 3,
        max_paths: 2,
    };
    let a = classify_control_edges(&eqs, "X", "Y", &controls(&["C"]), &BTreeSet::new(), &tight);
    let b = classify_control_edges(&eqs, "X", "Y", &controls(&["C"]), &BTreeSet::new(), &tight);
    assert_eq!(a, b);
}
