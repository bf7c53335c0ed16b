use causagraph::frontend::parser::parse_expression;
use causagraph::{
    build_linear_expression, get_linear_summary, update_linear_coefficient,
};

fn summary(src: &str) -> causagraph::LinearSummary {
    get_linear_summary(&parse_expression(src).expect("parse")).expect("linear")
}

#[test]
fn affine_forms_reduce() {
    let s = summary("3*A - B/4 + 2 - 1");
    assert_eq!(s.coefficient("A"), 3.0);
    assert_eq!(s.coefficient("B"), -0.25);
    assert_eq!(s.constant, 1.0);
}

#[test]
fn non_affine_forms_do_not() {
    for src in ["A*B", "A/B", "abs(A)", "A^2", "A > B", "A ? 1 : 0"] {
        let expr = parse_expression(src).expect("parse");
        assert!(get_linear_summary(&expr).is_none(), "{} should be non-linear", src);
    }
}

#[test]
fn round_trip_evaluates_identically() {
    // serialization may reformat, but coefficients and constant survive
    for src in ["2*A + 3*B + 1", "-X + 0.125*Y", "(A - B)/2 + A*3"] {
        let first = summary(src);
        let text = build_linear_expression(&first);
        let second = summary(&text);
        assert_eq!(first.order, second.order, "order drift for {}", src);
        for var in &first.order {
            assert!((first.coefficient(var) - second.coefficient(var)).abs() < 1e-4);
        }
        assert!((first.constant - second.constant).abs() < 1e-4);
    }
}

#[test]
fn coefficient_updates_preserve_term_order() {
    let mut s = summary("2*A + 3*B + 1");
    update_linear_coefficient(&mut s, "B", 5.0);
    assert_eq!(build_linear_expression(&s), "2*A + 5*B + 1");
    update_linear_coefficient(&mut s, "C", -1.0);
    assert_eq!(build_linear_expression(&s), "2*A + 5*B - C + 1");
    update_linear_coefficient(&mut s, "A", 0.0);
    assert_eq!(build_linear_expression(&s), "5*B - C + 1");
}

#[test]
fn serialization_rounds_to_four_decimals() {
    let s = summary("X/3 + 0.00001");
    assert_eq!(build_linear_expression(&s), "0.3333*X");
}
