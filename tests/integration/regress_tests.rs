use causagraph::{
    build_loess_line, compute_residualized_samples, fit_linear_regression, Residualized,
};
use rustc_hash::FxHashMap;

fn sample(pairs: &[(&str, f64)]) -> FxHashMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn ols_recovers_known_line() {
    let points: Vec<_> = (0..50).map(|i| (i as f64, 0.5 * i as f64 - 3.0)).collect();
    let fit = fit_linear_regression(&points).expect("fit");
    assert!((fit.slope - 0.5).abs() < 1e-10);
    assert!((fit.intercept + 3.0).abs() < 1e-10);
}

#[test]
fn residualization_removes_confounding_trend() {
    // X and Y both driven by Z plus an offset orthogonal to Z: each Z value
    // sees both offset signs, so the X residuals are exactly the offsets
    let samples: Vec<_> = (0..40)
        .map(|i| {
            let z = (i / 2 % 10) as f64;
            let offset = if i % 2 == 0 { 1.0 } else { -1.0 };
            sample(&[("Z", z), ("X", 2.0 * z + offset), ("Y", -z)])
        })
        .collect();
    let controls = vec!["Z".to_string()];
    let points = match compute_residualized_samples(&samples, "X", "Y", &controls) {
        Residualized::Points(points) => points,
        other => panic!("expected points, got {:?}", other),
    };
    assert_eq!(points.len(), 40);
    for (i, (rx, ry)) in points.iter().enumerate() {
        let expected = if i % 2 == 0 { 1.0 } else { -1.0 };
        assert!((rx - expected).abs() < 1e-8, "sample {}: {}", i, rx);
        assert!(ry.abs() < 1e-8, "sample {}: {}", i, ry);
    }
}

#[test]
fn two_controls_use_multi_predictor_solve() {
    let samples: Vec<_> = (0..30)
        .map(|i| {
            let a = i as f64;
            let b = (i * i % 7) as f64;
            sample(&[("A", a), ("B", b), ("X", a + b), ("Y", 2.0 * a - b)])
        })
        .collect();
    let controls = vec!["A".to_string(), "B".to_string()];
    match compute_residualized_samples(&samples, "X", "Y", &controls) {
        Residualized::Points(points) => {
            for (rx, ry) in points {
                assert!(rx.abs() < 1e-6);
                assert!(ry.abs() < 1e-6);
            }
        }
        other => panic!("expected points, got {:?}", other),
    }
}

#[test]
fn degenerate_inputs_report_their_kind() {
    let controls = vec!["Z".to_string()];
    let few = vec![sample(&[("X", 1.0), ("Y", 1.0), ("Z", 1.0)]); 2];
    assert_eq!(
        compute_residualized_samples(&few, "X", "Y", &controls),
        Residualized::Insufficient
    );

    let constant: Vec<_> = (0..8)
        .map(|i| sample(&[("X", i as f64), ("Y", i as f64), ("Z", 5.0)]))
        .collect();
    assert_eq!(
        compute_residualized_samples(&constant, "X", "Y", &controls),
        Residualized::Singular
    );

    let broken = vec![sample(&[("X", f64::INFINITY), ("Y", 0.0)])];
    assert_eq!(
        compute_residualized_samples(&broken, "X", "Y", &[]),
        Residualized::Invalid
    );
}

#[test]
fn loess_smooths_a_noiseless_quadratic_closely() {
    let points: Vec<_> = (0..40)
        .map(|i| {
            let x = i as f64 / 10.0;
            (x, x * x)
        })
        .collect();
    let curve = build_loess_line(&points, 0.3, 15).expect("curve");
    assert_eq!(curve.len(), 15);
    for (x, y) in curve {
        // local linear fits track a smooth curve with small bias
        assert!((y - x * x).abs() < 0.15, "({}, {})", x, y);
    }
}
