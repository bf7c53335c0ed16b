use causagraph::{deps_from_model, parse_scm, topo_sort, ScmError};

#[test]
fn parses_minimal_model() {
    let model = parse_scm("X = 1").expect("parse minimal model");
    assert!(model.is_assigned("X"));
    assert_eq!(model.vars().len(), 1);
}

#[test]
fn parses_full_example() {
    let src = "U = 2\nX = 1 + 0.5*U; Y = -1 + 2*X\nZ = X > 0 ? sin(Y) : cos(U)";
    let model = parse_scm(src).expect("parse");
    assert_eq!(model.vars().len(), 4);
    assert!(model.is_assigned("Z"));

    let z = model.get("Z").expect("Z entry");
    assert_eq!(z.dependencies, vec!["X", "Y", "U"]);
    assert_eq!(z.source_text, "X > 0 ? sin(Y) : cos(U)");
}

#[test]
fn blank_statements_are_skipped() {
    let model = parse_scm("\n;;  \nX = 1\n\n").expect("parse");
    assert_eq!(model.vars().len(), 1);
}

#[test]
fn referenced_only_variables_become_derived() {
    let model = parse_scm("Y = 2*X + error").expect("parse");
    let x = model.get("X").expect("X hoisted");
    assert!(x.is_derived);
    assert!(x.expr.is_none());
    // the special `error` identifier is not a variable
    assert!(!model.contains("error"));
}

#[test]
fn malformed_statement_is_fatal() {
    let err = parse_scm("X = 1\nY = *3").expect_err("malformed");
    match err {
        ScmError::Parse(msg) => assert!(msg.contains("Cannot parse: 'Y = *3'"), "{}", msg),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn duplicate_assignment_is_fatal() {
    assert!(parse_scm("X = 1\nX = 2").is_err());
}

#[test]
fn disallowed_function_is_fatal() {
    assert!(parse_scm("X = tan(1)").is_err());
    assert!(parse_scm("X = foo(1, 2)").is_err());
}

#[test]
fn topology_follows_dependencies() {
    let model = parse_scm("Y = 2*X\nX = U + V\nU = 1").expect("parse");
    let eqs = deps_from_model(&model);
    let order = topo_sort(&eqs).expect("acyclic");
    let pos = |name: &str| order.iter().position(|n| n == name).expect("present");
    assert!(pos("X") < pos("Y"));
    assert!(pos("U") < pos("X"));
    assert!(pos("V") < pos("X"));
}

#[test]
fn cyclic_model_fails_topology() {
    let model = parse_scm("A = B + 1\nB = C\nC = A").expect("parse is fine");
    let eqs = deps_from_model(&model);
    let err = topo_sort(&eqs).expect_err("cycle");
    assert_eq!(err.to_string(), "SCM contains a cycle (not a DAG)");
}
