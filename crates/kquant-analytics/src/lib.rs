//! 팩터 정규화 및 기술적 지표.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 팩터 컬럼 윈저라이징 / Z-score 정규화 (결측값 유지)
//! - 이상치 처리 방법 (트림, 윈저라이징, Z-score, IQR, MAD)
//! - 랭킹 유틸리티 (순위, 백분위, 섹터 중립 Z-score, 팩터 결합)
//! - 종목별 0-100 퀀트 점수
//! - 일봉 기술적 지표 (SMA, EMA, RSI, MACD, 볼린저 밴드, ATR)
//! - 자산 곡선 성과 지표 (CAGR, MDD, 샤프, 소르티노, 칼마, 승률)
//!
//! 모든 함수는 순수 함수이며, 결측값은 `None`으로 표현합니다.

pub mod indicators;
pub mod normalizer;
pub mod outlier;
pub mod performance;
pub mod quant_score;
pub mod ranking;

pub use indicators::{IndicatorError, IndicatorResult};
pub use normalizer::{mean_std, normalize, quantile, winsorize, zscore, Winsorizer};
pub use outlier::OutlierMethod;
pub use performance::PerformanceMetrics;
pub use quant_score::QuantScores;
pub use ranking::{
    combine_factors, combine_sector_neutral, percentile_rank, rank, sector_neutral_zscore,
    zscore_rank, FactorColumn,
};
