//! 합성 데이터 → 전략 → 스캔 전체 경로 테스트.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use kquant_core::{Market, OhlcvProvider, SnapshotProvider, UniverseProvider};
use kquant_data::{StaticSectorMap, StaticUniverse, SyntheticProvider};
use kquant_strategy::{
    ChartDetectorRegistry, FactorStrategy, MagicFormula, MultiFactor, Scanner, ScoringParams,
    SectorNeutral,
};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

#[tokio::test]
async fn test_magic_formula_is_bit_for_bit_reproducible() {
    let first = SyntheticProvider::default().snapshot(Market::Kospi).await.unwrap();
    let second = SyntheticProvider::default().snapshot(Market::Kospi).await.unwrap();

    let strategy = MagicFormula::new(ScoringParams::default().with_top_n(20));
    let a = strategy.select(&first, date());
    let b = strategy.select(&second, date());

    assert_eq!(a.selected_count, 20);
    assert_eq!(a.codes(), b.codes());
    for (x, y) in a.stocks.iter().zip(&b.stocks) {
        assert_eq!(x.score.to_bits(), y.score.to_bits());
        assert_eq!(x.stock, y.stock);
    }
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[tokio::test]
async fn test_all_strategies_run_on_both_markets() {
    let provider = SyntheticProvider::default();
    let snapshots = join_all(Market::ALL.iter().map(|&m| provider.snapshot(m))).await;

    let strategies: Vec<Box<dyn FactorStrategy>> = vec![
        Box::new(MagicFormula::default()),
        Box::new(MultiFactor::default()),
        Box::new(SectorNeutral::default()),
    ];
    for snapshot in snapshots {
        let snapshot = snapshot.unwrap();
        for strategy in &strategies {
            let selection = strategy.select(&snapshot, date());
            assert!(selection.selected_count > 0, "{} 선정 결과 없음", strategy.id());
            assert!(selection
                .stocks
                .iter()
                .all(|s| !s.stock.sector.is_financial()));
            assert!(selection
                .stocks
                .windows(2)
                .all(|w| w[0].score >= w[1].score || strategy.id() == MagicFormula::ID));
        }
    }
}

#[tokio::test]
async fn test_universe_limit_applies_to_snapshot() {
    let provider = SyntheticProvider::new(StaticUniverse::builtin().with_limit(10), StaticSectorMap::builtin());
    assert_eq!(provider.stocks(Market::Kosdaq).await.unwrap().len(), 10);
    assert_eq!(provider.snapshot(Market::Kosdaq).await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_scan_over_synthetic_history() {
    let provider = Arc::new(SyntheticProvider::new(
        StaticUniverse::builtin().with_limit(15),
        StaticSectorMap::builtin(),
    ));
    let stocks = provider.stocks(Market::Kospi).await.unwrap();
    let from = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();

    let ohlcv: Arc<dyn OhlcvProvider> = provider.clone();
    let scanner = Scanner::new(ohlcv, ChartDetectorRegistry::create_all());
    let first = scanner.scan(&stocks, from, to).await;
    let second = scanner.scan(&stocks, from, to).await;

    assert_eq!(first.scanned, 15);
    assert!(first.skipped.is_empty());
    assert_eq!(first.buys, second.buys);
    assert_eq!(first.sells, second.sells);
    assert!(first
        .buys
        .windows(2)
        .all(|w| w[0].strength >= w[1].strength));
}
