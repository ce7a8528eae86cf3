//! Property checks across curve types.

use std::sync::Arc;

use proptest::prelude::*;
use switchback_core::types::{Compounding, Date};
use switchback_curves::prelude::*;

fn reference() -> Date {
    Date::from_ymd(2025, 1, 15).unwrap()
}

fn sofr_like(method: InterpolationMethod) -> ZeroCurve {
    ZeroCurveBuilder::new(reference())
        .add_pillars(&[
            (1.0 / 12.0, 0.0433),
            (0.25, 0.0431),
            (0.5, 0.0425),
            (1.0, 0.0410),
            (2.0, 0.0395),
            (5.0, 0.0390),
            (10.0, 0.0405),
            (30.0, 0.0420),
        ])
        .with_interpolation(method)
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn discount_factors_decrease(t in 0.0f64..35.0, dt in 0.01f64..5.0) {
        for method in [InterpolationMethod::Linear, InterpolationMethod::LogLinear] {
            let curve = sofr_like(method);
            let later = curve.discount_factor(t + dt).unwrap();
            prop_assert!(later < curve.discount_factor(t).unwrap());
        }
    }

    #[test]
    fn interior_lookups_never_fail(t in 0.0f64..30.0) {
        let curve = ZeroCurveBuilder::new(reference())
            .add_pillars(&[(0.5, 0.04), (30.0, 0.045)])
            .with_extrapolation(ExtrapolationMethod::None)
            .build()
            .unwrap();
        prop_assert!(curve.discount_factor(t).is_ok());
    }

    #[test]
    fn shifted_curve_scales_discount_factor(t in 0.0f64..30.0, z in -0.05f64..0.2) {
        let curve = sofr_like(InterpolationMethod::Linear);
        let shifted = ShiftedCurve::new(&curve, z);
        let ratio = shifted.discount_factor(t).unwrap() / curve.discount_factor(t).unwrap();
        prop_assert!((ratio - (-z * t).exp()).abs() < 1e-12);
    }
}

#[test]
fn shared_curve_across_threads() {
    let curve: Arc<dyn Curve> = Arc::new(sofr_like(InterpolationMethod::LogLinear));
    let expected = curve.discount_factor(7.0).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let c = Arc::clone(&curve);
            std::thread::spawn(move || c.discount_factor(7.0).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn zero_rate_compounding_conversion() {
    let curve = sofr_like(InterpolationMethod::Linear);
    let cont = curve.zero_rate(5.0, Compounding::Continuous).unwrap();
    let semi = curve.zero_rate(5.0, Compounding::SemiAnnual).unwrap();
    assert!((semi - 2.0 * ((cont / 2.0).exp() - 1.0)).abs() < 1e-12);
}

#[test]
fn benchmark_curve_serde_preserves_yields() {
    let points = vec![(10.0, 0.0425), (2.0, 0.0380), (5.0, 0.0400)];
    let curve = BenchmarkCurve::new(reference(), points).unwrap();

    let json = serde_json::to_string(&curve).unwrap();
    let restored: BenchmarkCurve = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.reference_date(), reference());
    assert_eq!(restored.points(), curve.points());
    assert_eq!(restored.yield_at(7.5).unwrap(), curve.yield_at(7.5).unwrap());
}

#[test]
fn interpolation_method_deserializes_from_json() {
    let method: InterpolationMethod = serde_json::from_str("\"LogLinear\"").unwrap();
    assert_eq!(method, InterpolationMethod::LogLinear);
    let curve = sofr_like(method);
    assert!(curve.discount_factor(3.0).unwrap() < 1.0);
}
