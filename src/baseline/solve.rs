//! Small dense linear solver for the normal equations.

use ndarray::{Array1, Array2};

/// Solve `a * x = b` by Gauss-Jordan elimination with partial pivoting.
///
/// Returns `None` when a pivot collapses (singular system). The matrices
/// here are tiny (one row/column per parent plus intercept), so a dense
/// elimination is both adequate and deterministic.
pub fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols());
    debug_assert_eq!(n, b.len());

    // Augmented matrix [a | b].
    let mut m = Array2::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            m[[i, j]] = a[[i, j]];
        }
        m[[i, n]] = b[i];
    }

    for col in 0..n {
        // Partial pivot: largest magnitude in the column at or below the row.
        let mut pivot_row = col;
        let mut pivot_val = m[[col, col]].abs();
        for row in (col + 1)..n {
            let v = m[[row, col]].abs();
            if v > pivot_val {
                pivot_row = row;
                pivot_val = v;
            }
        }
        if pivot_val < 1e-12 {
            return None;
        }
        if pivot_row != col {
            for j in 0..=n {
                m.swap([col, j], [pivot_row, j]);
            }
        }
        let pivot = m[[col, col]];
        for j in col..=n {
            m[[col, j]] /= pivot;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = m[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in col..=n {
                m[[row, j]] -= factor * m[[col, j]];
            }
        }
    }

    Some(Array1::from_iter((0..n).map(|i| m[[i, n]])))
}

/// Solve `a * x = b`, falling back to a ridge-regularized system when `a`
/// is singular (collinear parents in the training data).
pub fn solve_with_ridge(a: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    if let Some(x) = solve(a, b) {
        return x;
    }
    let n = a.nrows();
    let scale = (0..n).map(|i| a[[i, i]].abs()).fold(0.0f64, f64::max).max(1.0);
    let mut ridged = a.clone();
    let mut lambda = 1e-8 * scale;
    loop {
        for i in 0..n {
            ridged[[i, i]] = a[[i, i]] + lambda;
        }
        if let Some(x) = solve(&ridged, b) {
            return x;
        }
        lambda *= 10.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_solve_identity() {
        let a = array![[1.0, 0.0], [0.0, 1.0]];
        let b = array![3.0, -2.0];
        let x = solve(&a, &b).unwrap();
        assert_abs_diff_eq!(x[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_requires_pivoting() {
        // Zero on the leading diagonal forces a row swap.
        let a = array![[0.0, 2.0], [3.0, 1.0]];
        let b = array![4.0, 5.0];
        let x = solve(&a, &b).unwrap();
        assert_abs_diff_eq!(3.0 * x[0] + x[1], 5.0, epsilon = 1e-10);
        assert_abs_diff_eq!(2.0 * x[1], 4.0, epsilon = 1e-10);
    }

    #[test]
    fn test_solve_singular_returns_none() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        assert!(solve(&a, &b).is_none());
    }

    #[test]
    fn test_ridge_fallback_on_singular() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        let x = solve_with_ridge(&a, &b);
        // The ridged solution still roughly satisfies the consistent system.
        assert_abs_diff_eq!(x[0] + 2.0 * x[1], 1.0, epsilon = 1e-3);
    }
}
