//! 팩터 전략 백테스트 (`backtest`).

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tracing::info;

use kquant_analytics::OutlierMethod;
use kquant_core::{validate_universe, AppConfig, Market, SnapshotProvider, StockRecord};
use kquant_strategy::{
    Allocation, BacktestConfig, BacktestReport, Backtester, FactorStrategy, MagicFormula,
    MultiFactor, RebalancePeriod, ScoringParams, SectorFactor, SectorNeutral,
    SectorNeutralMultiFactor,
};

use super::build_provider;
use super::output::{write_output, OutputFormat};
use super::score::StrategyKind;

/// `backtest` 명령 설정.
#[derive(Debug)]
pub struct BacktestCommandConfig {
    pub strategy: StrategyKind,
    pub markets: Vec<Market>,
    pub top_n: Option<usize>,
    pub outlier: Option<OutlierMethod>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rebalance: RebalancePeriod,
    pub initial_capital: f64,
    pub format: OutputFormat,
    pub output: Option<String>,
}

/// 선정 전략을 기본 옵션으로 만듭니다.
fn build_strategy(kind: StrategyKind, params: ScoringParams, app: &AppConfig) -> Box<dyn FactorStrategy> {
    let allocation = Allocation::PerSector {
        k: app.strategy.stocks_per_sector,
    };
    match kind {
        StrategyKind::Magic => Box::new(MagicFormula::new(params)),
        StrategyKind::Multi => Box::new(MultiFactor::new(params, app.strategy.weights)),
        StrategyKind::Sector => Box::new(SectorNeutral::new(params, SectorFactor::Momentum12m, allocation)),
        StrategyKind::SectorMulti => Box::new(SectorNeutralMultiFactor::new(
            params,
            &[SectorFactor::Roe, SectorFactor::Per, SectorFactor::Momentum12m],
            allocation,
        )),
    }
}

/// 스냅샷 유니버스로 전략을 리밸런싱하며 시뮬레이션하고 결과를 출력합니다.
pub async fn run_backtest(config: BacktestCommandConfig, app: &AppConfig) -> Result<BacktestReport> {
    if config.start >= config.end {
        bail!("시작일({})은 종료일({})보다 앞서야 합니다", config.start, config.end);
    }

    let provider = Arc::new(build_provider(app)?);
    let mut universe: Vec<StockRecord> = Vec::new();
    for &market in &config.markets {
        let snapshot = provider
            .snapshot(market)
            .await
            .with_context(|| format!("{} 스냅샷 조회 실패", market))?;
        universe.extend(snapshot);
    }
    validate_universe(&universe).map_err(|e| anyhow::anyhow!("유니버스 검증 실패: {}", e))?;

    let mut params = ScoringParams::from_config(&app.strategy, app.normalizer)
        .context("전략 설정 오류")?;
    if let Some(top_n) = config.top_n {
        params = params.with_top_n(top_n);
    }
    if let Some(method) = config.outlier {
        params = params.with_outlier(method);
    }
    let strategy = build_strategy(config.strategy, params, app);

    let backtester = Backtester::new(
        provider.clone(),
        BacktestConfig::new(config.initial_capital).with_rebalance(config.rebalance),
    );
    let report = backtester
        .run(strategy.as_ref(), &universe, config.start, config.end)
        .await
        .context("백테스트 실패")?;
    info!(strategy = %report.strategy, trades = report.trades.len(), "백테스트 완료");

    let content = match config.format {
        OutputFormat::Table => format_summary(&report),
        OutputFormat::Csv => format_equity_csv(&report),
        OutputFormat::Json => serde_json::to_string_pretty(&report).context("JSON 직렬화 실패")?,
    };
    write_output(&content, config.output.as_deref())?;
    Ok(report)
}

/// 성과 요약.
pub fn format_summary(report: &BacktestReport) -> String {
    let m = &report.metrics;
    let ratio = |v: f64| {
        if v.is_infinite() {
            "∞".to_string()
        } else {
            format!("{:.2}", v)
        }
    };
    let mut output = format!(
        "[{}] {} ~ {}  리밸런싱 {}회, 체결 {}건\n\n",
        report.strategy,
        report.start,
        report.end,
        report.rebalance_dates.len(),
        report.trades.len()
    );
    output.push_str(&format!("  초기 자산     {:>16.0}\n", m.initial_value));
    output.push_str(&format!("  최종 자산     {:>16.0}\n", m.final_value));
    output.push_str(&format!("  총 수익률     {:>15.2}%\n", m.total_return * 100.0));
    output.push_str(&format!("  CAGR          {:>15.2}%\n", m.cagr * 100.0));
    output.push_str(&format!("  변동성        {:>15.2}%\n", m.volatility * 100.0));
    output.push_str(&format!("  최대 낙폭     {:>15.2}%\n", m.max_drawdown * 100.0));
    output.push_str(&format!("  샤프          {:>16}\n", ratio(m.sharpe_ratio)));
    output.push_str(&format!("  소르티노      {:>16}\n", ratio(m.sortino_ratio)));
    output.push_str(&format!("  칼마          {:>16}\n", ratio(m.calmar_ratio)));
    output.push_str(&format!("  승률          {:>15.1}%\n", m.win_rate * 100.0));
    if !report.skipped.is_empty() {
        output.push_str(&format!("\n일봉 없음으로 제외: {}", report.skipped.join(", ")));
    }
    output
}

/// 일별 자산 곡선 CSV.
pub fn format_equity_csv(report: &BacktestReport) -> String {
    let mut output = String::from("date,total_value,cash,positions\n");
    for p in &report.equity_curve {
        output.push_str(&format!(
            "{},{:.0},{:.0},{}\n",
            p.date, p.total_value, p.cash, p.positions
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use kquant_analytics::PerformanceMetrics;
    use kquant_strategy::EquityPoint;

    fn report() -> BacktestReport {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let values = [10_000_000.0, 10_100_000.0, 10_300_000.0];
        BacktestReport {
            strategy: "magic_formula".to_string(),
            start: d(2),
            end: d(4),
            config: BacktestConfig::default(),
            rebalance_dates: vec![d(2)],
            equity_curve: values
                .iter()
                .enumerate()
                .map(|(i, &v)| EquityPoint {
                    date: d(2 + i as u32),
                    total_value: v,
                    cash: 50_000.0,
                    positions: 3,
                })
                .collect(),
            trades: vec![],
            metrics: PerformanceMetrics::from_equity_curve(&values, 1.0, 0.0),
            skipped: vec!["000000".to_string()],
        }
    }

    #[test]
    fn test_summary_marks_unbounded_ratios() {
        let summary = format_summary(&report());
        assert!(summary.contains("리밸런싱 1회"));
        assert!(summary.contains("3.00%"));
        // 낙폭이 없으므로 칼마 비율은 무한대
        assert!(summary.contains("∞"));
        assert!(summary.contains("제외: 000000"));
    }

    #[test]
    fn test_equity_csv() {
        let csv = format_equity_csv(&report());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "2024-01-02,10000000,50000,3");
    }
}
