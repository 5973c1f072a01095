//! Tail probability approximations.

/// Error function approximation (Abramowitz & Stegun 7.1.26, max error 1.5e-7).
pub fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

/// Two-tailed p-value for a standard normal statistic.
pub fn normal_two_tailed_p(z: f64) -> f64 {
    let upper = 0.5 * (1.0 - erf(z.abs() / std::f64::consts::SQRT_2));
    (2.0 * upper).clamp(0.0, 1.0)
}

/// Asymptotic Kolmogorov tail: P(D > d) for lambda = d * sqrt(n_eff).
pub fn ks_p_value(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    // P ≈ 2 * sum_{k=1}^∞ (-1)^{k+1} * exp(-2 k² λ²)
    let mut p = 0.0;
    for k in 1..=100 {
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        let term = sign * (-2.0 * f64::from(k).powi(2) * lambda.powi(2)).exp();
        p += term;
        if term.abs() < 1e-10 {
            break;
        }
    }
    (2.0 * p).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_erf_reference_points() {
        assert_abs_diff_eq!(erf(0.0), 0.0, epsilon = 1e-7);
        assert_abs_diff_eq!(erf(1.0), 0.8427008, epsilon = 1e-6);
        assert_abs_diff_eq!(erf(-1.0), -0.8427008, epsilon = 1e-6);
        assert_abs_diff_eq!(erf(3.0), 0.9999779, epsilon = 1e-6);
    }

    #[test]
    fn test_normal_two_tailed_p() {
        // z = 0 is maximally insignificant; z = 1.96 is the classic 5% point.
        assert_abs_diff_eq!(normal_two_tailed_p(0.0), 1.0, epsilon = 1e-7);
        assert_abs_diff_eq!(normal_two_tailed_p(1.96), 0.05, epsilon = 1e-3);
        assert!(normal_two_tailed_p(6.0) < 1e-8);
        // Symmetric in the sign of z.
        assert_abs_diff_eq!(
            normal_two_tailed_p(-2.5),
            normal_two_tailed_p(2.5),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_ks_p_value_bounds() {
        assert_abs_diff_eq!(ks_p_value(0.0), 1.0, epsilon = 1e-12);
        assert!(ks_p_value(0.5) > 0.9);
        assert!(ks_p_value(2.0) < 0.001);
        let p = ks_p_value(1.0);
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_ks_p_value_monotone() {
        let mut prev = 1.0;
        for i in 1..20 {
            let p = ks_p_value(f64::from(i) * 0.2);
            assert!(p <= prev + 1e-12);
            prev = p;
        }
    }
}
