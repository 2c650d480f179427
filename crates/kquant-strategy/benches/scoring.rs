//! 팩터 전략과 차트 스캔 벤치마크.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kquant_core::{FactorName, Market, OhlcvBar, Sector, StockRecord};
use kquant_strategy::{
    scan_series, ChartDetectorRegistry, FactorStrategy, MagicFormula, MultiFactor, SectorNeutral,
};

fn universe(n: usize) -> Vec<StockRecord> {
    let sectors = [Sector::It, Sector::Auto, Sector::Bio, Sector::Chemical, Sector::Consumer];
    (0..n)
        .map(|i| {
            let x = |salt: usize| ((i * 7919 + salt * 104_729) % 1_000) as f64 / 1_000.0;
            StockRecord::new(format!("{:06}", i), "bench", Market::Kospi, sectors[i % sectors.len()])
                .with_factor(FactorName::Per, 3.0 + x(1) * 30.0)
                .with_factor(FactorName::Pbr, 0.3 + x(2) * 3.0)
                .with_factor(FactorName::Roe, x(3) * 25.0)
                .with_factor(FactorName::Roc, 1.0 + x(4) * 40.0)
                .with_factor(FactorName::EarningsYield, 1.0 + x(5) * 20.0)
                .with_factor(FactorName::Gpa, 0.05 + x(6) * 0.5)
                .with_factor(FactorName::Momentum3m, -20.0 + x(7) * 40.0)
                .with_factor(FactorName::Momentum6m, -30.0 + x(8) * 60.0)
                .with_factor(FactorName::Momentum12m, -40.0 + x(9) * 80.0)
        })
        .collect()
}

fn series(len: usize) -> Vec<OhlcvBar> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    (0..len)
        .map(|i| {
            let close = 10_000.0 + (i as f64 * 0.3).sin() * 500.0;
            OhlcvBar::new(
                start + Duration::days(i as i64),
                close,
                close * 1.01,
                close * 0.99,
                close,
                100_000 + (i as u64 % 7) * 10_000,
            )
        })
        .collect()
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("factor_strategies");
    let date = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
    let strategies: Vec<Box<dyn FactorStrategy>> = vec![
        Box::new(MagicFormula::default()),
        Box::new(MultiFactor::default()),
        Box::new(SectorNeutral::default()),
    ];

    for size in [100, 1_000, 2_500] {
        let stocks = universe(size);
        for strategy in &strategies {
            group.bench_with_input(BenchmarkId::new(strategy.id(), size), &stocks, |b, stocks| {
                b.iter(|| strategy.select(black_box(stocks), date));
            });
        }
    }
    group.finish();
}

fn bench_chart_scan(c: &mut Criterion) {
    let detectors = ChartDetectorRegistry::create_all();
    let bars = series(250);
    c.bench_function("scan_series_all_detectors", |b| {
        b.iter(|| scan_series(&detectors, black_box(&bars), "000000", "bench"));
    });
}

criterion_group!(benches, bench_strategies, bench_chart_scan);
criterion_main!(benches);
