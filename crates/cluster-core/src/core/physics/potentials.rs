use super::params::{ELEMENTARY_CHARGE, PhysicalParams, VACUUM_PERMITTIVITY};
use std::f64::consts::PI;

const NM: f64 = 1e-9;

/// Screened Coulomb potential in V exerted by a unit charge at distance `dist_nm`.
///
/// Returns 0 for coincident positions.
#[inline]
pub fn screened_coulomb(dist_nm: f64, params: &PhysicalParams) -> f64 {
    if dist_nm <= 0.0 {
        return 0.0;
    }
    let dist = dist_nm * NM;
    params.k() / dist * (-dist_nm / params.lambda_tf).exp() * ELEMENTARY_CHARGE
}

/// Distance in m at which the magnitude of the screened potential's gradient drops to 1 V/m.
///
/// Found by bisection on `[a, b]`; used as the reference length that scales the
/// observation regions of the cone-angle hierarchy.
pub fn unit_gradient_distance(
    params: &PhysicalParams,
    mut a: f64,
    mut b: f64,
    max_iter: usize,
    tolerance: f64,
) -> f64 {
    let lambda_tf = params.lambda_tf * NM;
    let epsilon_r = params.epsilon_r;
    let f = |r: f64| {
        1.0 - ELEMENTARY_CHARGE * (-r / lambda_tf).exp() * (lambda_tf + r)
            / (4.0 * PI * VACUUM_PERMITTIVITY * epsilon_r * r * r * lambda_tf)
    };

    let mut root = (a + b) / 2.0;
    let mut iter = 0;
    while iter < max_iter && f(root).abs() > tolerance {
        if f(a) * f(root) < 0.0 {
            b = root;
        } else {
            a = root;
        }
        root = (a + b) / 2.0;
        iter += 1;
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn screened_coulomb_is_zero_at_zero_distance() {
        assert_eq!(screened_coulomb(0.0, &PhysicalParams::default()), 0.0);
    }

    #[test]
    fn screened_coulomb_matches_closed_form_at_one_nm() {
        let params = PhysicalParams::default();
        let expected = 8.987_551_792_3e9 / 5.6 / 1e-9 * (-0.2f64).exp() * 1.602_176_634e-19;
        assert!(f64_approx_equal(screened_coulomb(1.0, &params), expected));
    }

    #[test]
    fn screened_coulomb_decreases_with_distance() {
        let params = PhysicalParams::default();
        let near = screened_coulomb(0.5, &params);
        let far = screened_coulomb(2.0, &params);
        assert!(near > far);
        assert!(far > 0.0);
    }

    #[test]
    fn unit_gradient_distance_lies_inside_the_bracket() {
        let params = PhysicalParams::default();
        let d0 = unit_gradient_distance(&params, 1e-10, 1e-7, 100, 1e-12);
        assert!(d0 > 1e-10 && d0 < 1e-7);
    }
}
