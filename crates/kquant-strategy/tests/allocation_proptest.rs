//! 섹터 배분 속성 테스트

use std::collections::BTreeMap;

use chrono::NaiveDate;
use kquant_core::{FactorName, Market, Sector, StockRecord};
use kquant_strategy::{Allocation, FactorStrategy, ScoringParams, SectorFactor, SectorNeutral};
use proptest::prelude::*;

fn sector_sizes() -> impl Strategy<Value = BTreeMap<Sector, usize>> {
    prop::collection::btree_map(prop::sample::select(Sector::ALL.to_vec()), 1usize..40, 1..8)
}

fn proportional(top_n: usize) -> SectorNeutral {
    SectorNeutral::new(
        ScoringParams::default().with_top_n(top_n),
        SectorFactor::Momentum12m,
        Allocation::Proportional,
    )
}

proptest! {
    #[test]
    fn proportional_sum_is_bounded_by_universe(sizes in sector_sizes(), top_n in 0usize..120) {
        let allocation = proportional(top_n).allocate(&sizes);
        let total: usize = sizes.values().sum();

        prop_assert_eq!(allocation.values().sum::<usize>(), top_n.min(total));
        for (sector, count) in &allocation {
            prop_assert!(*count <= sizes[sector]);
        }
    }

    #[test]
    fn per_sector_takes_at_most_k(sizes in sector_sizes(), k in 0usize..10) {
        let strategy = SectorNeutral::new(
            ScoringParams::default(),
            SectorFactor::Roe,
            Allocation::PerSector { k },
        );
        let allocation = strategy.allocate(&sizes);
        for (sector, size) in &sizes {
            prop_assert_eq!(allocation[sector], k.min(*size));
        }
    }

    #[test]
    fn selection_ranks_are_dense(momentum in prop::collection::vec(-50.0f64..50.0, 1..60), top_n in 1usize..20) {
        let universe: Vec<StockRecord> = momentum
            .iter()
            .enumerate()
            .map(|(i, &m)| {
                StockRecord::new(format!("{:06}", i), "p", Market::Kosdaq, Sector::ALL[i % 4])
                    .with_factor(FactorName::Momentum12m, m)
            })
            .collect();
        let date = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let selection = proportional(top_n).select(&universe, date);

        prop_assert!(selection.selected_count <= top_n);
        let ranks: Vec<usize> = selection.stocks.iter().map(|s| s.rank).collect();
        let expected: Vec<usize> = (1..=selection.selected_count).collect();
        prop_assert_eq!(ranks, expected);
    }
}
