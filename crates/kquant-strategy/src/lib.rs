//! 팩터 기반 종목 선정과 차트 신호 감지.
//!
//! 이 크레이트가 제공하는 기능:
//! - 팩터 전략 (마법공식, 멀티팩터, 섹터 중립, 섹터 중립 멀티팩터): [`scoring`]
//! - 일봉 차트 패턴 감지기와 레지스트리: [`chart`]
//! - 여러 종목을 순회하는 차트 스캐너: [`scan`]
//! - 팩터 전략 리밸런싱 백테스트: [`backtest`]
//!
//! # 예제
//!
//! ```rust,ignore
//! use kquant_strategy::{ChartDetectorRegistry, FactorStrategy, MagicFormula, Scanner};
//!
//! let selection = MagicFormula::default().select(&universe, date);
//! println!("{}", selection.explain());
//!
//! let detectors = ChartDetectorRegistry::create_many(&["golden_cross", "box_breakout"])?;
//! let report = Scanner::new(provider, detectors).scan(&stocks, from, to).await;
//! ```

pub mod backtest;
pub mod chart;
pub mod scan;
pub mod scoring;

// 주요 타입 재내보내기
pub use backtest::{
    BacktestConfig, BacktestReport, Backtester, EquityPoint, RebalancePeriod, TradeRecord,
    TradeSide,
};
pub use chart::{
    Accumulation, BoxBreakout, ChartDetector, ChartDetectorRegistry, DetectorMeta, GoldenCross,
    MaBounce, TripleMa, VolumeBreakout, technical_indicators,
};
pub use scan::{scan_series, ScanReport, Scanner, SkippedStock};
pub use scoring::{
    Allocation, DistributionSummary, FactorComponents, FactorCorrelations, FactorStrategy,
    MagicFormula, MultiFactor, ScoringParams, SectorComparison, SectorFactor, SectorNeutral,
    SectorNeutralMultiFactor, WeightedFactor,
};
