//! # Regression Utilities
//!
//! Least-squares fitting, residualization against control variables, and a
//! LOESS smoother. Consumed by the scatter-overlay panel; none of this
//! feeds back into evaluation.

use rustc_hash::FxHashMap;

/// Pivots below this magnitude make a system singular.
const PIVOT_EPSILON: f64 = 1e-10;

/// Variance below this magnitude makes a regression undefined.
const VARIANCE_EPSILON: f64 = 1e-12;

/// An ordinary least squares line.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearFit {
    /// The fitted slope
    pub slope: f64,
    /// The fitted intercept
    pub intercept: f64,
}

/// Outcome of residualizing samples against control variables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Residualized {
    /// Residual (or raw, with no controls) (x, y) pairs
    Points(Vec<(f64, f64)>),
    /// Fewer samples than `controls.len() + 2`
    Insufficient,
    /// The normal equations are degenerate
    Singular,
    /// A sample value was non-finite
    Invalid,
}

/// Fits a least-squares line through the points.
///
/// Returns `None` with fewer than 2 points or ~zero x-variance.
pub fn fit_linear_regression(points: &[(f64, f64)]) -> Option<LinearFit> {
    let n = points.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / nf;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in points {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }
    if sxx.abs() < VARIANCE_EPSILON {
        return None;
    }
    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Solves `a * x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` when a pivot magnitude falls below `1e-10`.
pub fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return None;
    }
    for col in 0..n {
        // partial pivot: largest magnitude in this column
        let mut pivot_row = col;
        for row in col + 1..n {
            if a[row][col].abs() > a[pivot_row][col].abs() {
                pivot_row = row;
            }
        }
        if a[pivot_row][col].abs() < PIVOT_EPSILON {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = b[row];
        for col in row + 1..n {
            acc -= a[row][col] * x[col];
        }
        x[row] = acc / a[row][row];
    }
    Some(x)
}

/// Removes the linear effect of the controls from x and y.
///
/// With no controls, returns raw (x, y) pairs. Otherwise regresses x and y
/// separately on the design `[1, control_1, ...]` via normal equations and
/// returns the residual pairs. Missing sample keys read as 0, matching the
/// evaluator's scope semantics.
pub fn compute_residualized_samples(
    samples: &[FxHashMap<String, f64>],
    x_key: &str,
    y_key: &str,
    controls: &[String],
) -> Residualized {
    let value = |sample: &FxHashMap<String, f64>, key: &str| -> f64 {
        sample.get(key).copied().unwrap_or(0.0)
    };

    for sample in samples {
        let mut all_finite = value(sample, x_key).is_finite() && value(sample, y_key).is_finite();
        all_finite &= controls.iter().all(|c| value(sample, c).is_finite());
        if !all_finite {
            return Residualized::Invalid;
        }
    }

    if controls.is_empty() {
        return Residualized::Points(
            samples
                .iter()
                .map(|s| (value(s, x_key), value(s, y_key)))
                .collect(),
        );
    }

    let n = samples.len();
    if n < controls.len() + 2 {
        return Residualized::Insufficient;
    }

    let k = controls.len() + 1;
    let design: Vec<Vec<f64>> = samples
        .iter()
        .map(|s| {
            let mut row = Vec::with_capacity(k);
            row.push(1.0);
            for c in controls {
                row.push(value(s, c));
            }
            row
        })
        .collect();

    let xs: Vec<f64> = samples.iter().map(|s| value(s, x_key)).collect();
    let ys: Vec<f64> = samples.iter().map(|s| value(s, y_key)).collect();

    let coeffs_x = match solve_normal_equations(&design, &xs) {
        Some(c) => c,
        None => return Residualized::Singular,
    };
    let coeffs_y = match solve_normal_equations(&design, &ys) {
        Some(c) => c,
        None => return Residualized::Singular,
    };

    let residual = |row: &[f64], observed: f64, coeffs: &[f64]| -> f64 {
        let predicted: f64 = row.iter().zip(coeffs).map(|(d, c)| d * c).sum();
        observed - predicted
    };
    let points = design
        .iter()
        .enumerate()
        .map(|(i, row)| {
            (
                residual(row, xs[i], &coeffs_x),
                residual(row, ys[i], &coeffs_y),
            )
        })
        .collect();
    Residualized::Points(points)
}

/// Solves the normal equations `(AᵀA) β = Aᵀy`.
fn solve_normal_equations(design: &[Vec<f64>], observed: &[f64]) -> Option<Vec<f64>> {
    let k = design.first()?.len();
    let mut ata = vec![vec![0.0; k]; k];
    let mut aty = vec![0.0; k];
    for (row, y) in design.iter().zip(observed) {
        for i in 0..k {
            for j in 0..k {
                ata[i][j] += row[i] * row[j];
            }
            aty[i] += row[i] * y;
        }
    }
    solve_linear_system(ata, aty)
}

/// Builds a LOESS overlay curve with a tricube kernel.
///
/// For each of `num_samples` evenly spaced x positions, fits a weighted
/// line over the nearest `ceil(bandwidth * n)` neighbors (at least 3).
/// Returns `None` with fewer than 3 points or a degenerate x-range.
pub fn build_loess_line(
    points: &[(f64, f64)],
    bandwidth: f64,
    num_samples: usize,
) -> Option<Vec<(f64, f64)>> {
    let n = points.len();
    if n < 3 || num_samples < 2 {
        return None;
    }
    let mut sorted: Vec<(f64, f64)> = points.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    let x_min = sorted[0].0;
    let x_max = sorted[n - 1].0;
    if (x_max - x_min).abs() < VARIANCE_EPSILON {
        return None;
    }

    let window = ((bandwidth * n as f64).ceil() as usize).clamp(3, n);
    let step = (x_max - x_min) / (num_samples - 1) as f64;

    let mut curve = Vec::with_capacity(num_samples);
    for i in 0..num_samples {
        let x0 = x_min + step * i as f64;

        let mut by_distance: Vec<(f64, f64, f64)> = sorted
            .iter()
            .map(|&(x, y)| ((x - x0).abs(), x, y))
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));
        let neighbors = &by_distance[..window];
        let d_max = neighbors[window - 1].0;

        // tricube weights over the window
        let mut sw = 0.0;
        let mut swx = 0.0;
        let mut swy = 0.0;
        let mut swxx = 0.0;
        let mut swxy = 0.0;
        for &(d, x, y) in neighbors {
            let u = if d_max < VARIANCE_EPSILON { 0.0 } else { d / d_max };
            let w = (1.0 - u * u * u).powi(3).max(0.0);
            sw += w;
            swx += w * x;
            swy += w * y;
            swxx += w * x * x;
            swxy += w * x * y;
        }
        if sw < VARIANCE_EPSILON {
            continue;
        }
        let denom = sw * swxx - swx * swx;
        let y0 = if denom.abs() < VARIANCE_EPSILON {
            // weighted mean when the local fit is degenerate
            swy / sw
        } else {
            let slope = (sw * swxy - swx * swy) / denom;
            let intercept = (swy - slope * swx) / sw;
            slope * x0 + intercept
        };
        curve.push((x0, y0));
    }
    Some(curve)
}
