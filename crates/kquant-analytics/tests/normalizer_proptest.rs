//! 정규화 / 랭킹 속성 테스트.

use kquant_analytics::{mean_std, normalize, rank, zscore};
use proptest::prelude::*;

fn column() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.85, -1.0e6f64..1.0e6), 2..60)
}

proptest! {
    #[test]
    fn zscore_has_zero_mean(values in column()) {
        let z = zscore(&values);
        if let Some((mean, _)) = mean_std(&z) {
            prop_assert!(mean.abs() < 1e-6);
        }
    }

    #[test]
    fn missing_positions_are_preserved(values in column()) {
        let z = normalize(&values, 0.01, 0.99);
        prop_assert_eq!(z.len(), values.len());
        for (raw, out) in values.iter().zip(&z) {
            prop_assert_eq!(raw.is_some(), out.is_some());
        }
    }

    #[test]
    fn zscore_is_scale_invariant(values in column(), scale in 0.5f64..50.0) {
        let scaled: Vec<Option<f64>> = values.iter().map(|v| v.map(|x| x * scale)).collect();
        let a = normalize(&values, 0.01, 0.99);
        let b = normalize(&scaled, 0.01, 0.99);
        for (x, y) in a.iter().zip(&b) {
            match (x, y) {
                (Some(x), Some(y)) => prop_assert!((x - y).abs() < 1e-6),
                (None, None) => {}
                _ => prop_assert!(false, "결측 위치 불일치"),
            }
        }
    }

    #[test]
    fn ranks_sum_to_triangular_number(values in column()) {
        let ranks = rank(&values, false);
        let n = ranks.iter().flatten().count() as f64;
        let total: f64 = ranks.iter().flatten().sum();
        prop_assert!((total - n * (n + 1.0) / 2.0).abs() < 1e-6);
    }
}
