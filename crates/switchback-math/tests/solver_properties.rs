//! Property checks for the root finders.

use proptest::prelude::*;
use switchback_math::prelude::*;

fn bond_price(y: f64, coupon: f64, years: i32) -> f64 {
    let mut pv = 0.0;
    for t in 1..=years {
        pv += coupon / (1.0 + y).powi(t);
    }
    pv + 100.0 / (1.0 + y).powi(years)
}

fn bond_dprice(y: f64, coupon: f64, years: i32) -> f64 {
    let mut dpv = 0.0;
    for t in 1..=years {
        dpv -= f64::from(t) * coupon / (1.0 + y).powi(t + 1);
    }
    dpv - f64::from(years) * 100.0 / (1.0 + y).powi(years + 1)
}

proptest! {
    #[test]
    fn hybrid_recovers_yield(y in -0.02f64..0.25, coupon in 0.0f64..12.0, years in 1i32..40) {
        let target = bond_price(y, coupon, years);
        let f = |x: f64| bond_price(x, coupon, years) - target;
        let df = |x: f64| bond_dprice(x, coupon, years);
        let (a, b) = expand_bracket(f, -0.99, 1.0, -0.99, 20).unwrap();
        let result = hybrid(f, df, 0.05, Some((a, b)), &SolverConfig::default()).unwrap();
        prop_assert!((result.root - y).abs() < 1e-8);
    }

    #[test]
    fn brent_matches_bisection(root in -5.0f64..5.0) {
        let f = |x: f64| (x - root) * (1.0 + x * x);
        let config = SolverConfig::default().with_max_iterations(300);
        let b = brent(f, -10.0, 10.0, &config).unwrap();
        let bi = bisection(f, -10.0, 10.0, &config).unwrap();
        prop_assert!((b.root - root).abs() < 1e-9);
        prop_assert!((bi.root - root).abs() < 1e-9);
    }
}

#[test]
fn brent_is_deterministic() {
    let f = |x: f64| x.exp() - 3.0;
    let first = brent(f, 0.0, 2.0, &SolverConfig::default()).unwrap();
    let second = brent(f, 0.0, 2.0, &SolverConfig::default()).unwrap();
    assert_eq!(first.root.to_bits(), second.root.to_bits());
    assert_eq!(first.iterations, second.iterations);
}
