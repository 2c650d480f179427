//! 포트폴리오 성과 지표.
//!
//! 일별 자산 곡선에서 다음 지표를 계산합니다:
//! - 총 수익률, CAGR (연평균 복합 성장률)
//! - 연율화 변동성
//! - 샤프 비율, 소르티노 비율 (일간 초과수익 기준, √252 연율화)
//! - 최대 낙폭 (MDD), 칼마 비율 (CAGR / MDD)
//! - 승률 (수익이 난 거래일 비율)
//!
//! 모든 비율은 소수로 표현합니다 (0.15 = 15%).

use serde::{Deserialize, Serialize};

/// 연간 거래일 수
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// 기본 무위험 이자율 (연 3.5%)
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.035;

/// 자산 곡선 성과 지표.
///
/// 하방 위험이나 낙폭이 전혀 없이 초과수익이 양수이면 소르티노/칼마 비율은 무한대입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub initial_value: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub cagr: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub calmar_ratio: f64,
    pub win_rate: f64,
    /// 자산 곡선 길이
    pub periods: usize,
}

impl PerformanceMetrics {
    /// 일별 자산 곡선과 투자 기간(년)으로 모든 지표를 계산합니다.
    ///
    /// 곡선이 비어 있으면 기본값(모두 0)을 반환합니다.
    pub fn from_equity_curve(values: &[f64], years: f64, risk_free_rate: f64) -> Self {
        let (Some(&initial_value), Some(&final_value)) = (values.first(), values.last()) else {
            return Self::default();
        };

        let returns = daily_returns(values);
        let cagr = cagr(initial_value, final_value, years);
        let max_drawdown = max_drawdown(values);

        Self {
            initial_value,
            final_value,
            total_return: total_return(initial_value, final_value),
            cagr,
            volatility: volatility(&returns),
            sharpe_ratio: sharpe_ratio(&returns, risk_free_rate),
            sortino_ratio: sortino_ratio(&returns, risk_free_rate),
            max_drawdown,
            calmar_ratio: calmar_ratio(cagr, max_drawdown),
            win_rate: win_rate(&returns),
            periods: values.len(),
        }
    }

    /// 한 줄 요약.
    pub fn summary(&self) -> String {
        format!(
            "총수익: {:.2}% | CAGR: {:.2}% | 샤프: {:.2} | 소르티노: {:.2} | MDD: {:.2}% | 승률: {:.1}%",
            self.total_return * 100.0,
            self.cagr * 100.0,
            self.sharpe_ratio,
            self.sortino_ratio,
            self.max_drawdown * 100.0,
            self.win_rate * 100.0
        )
    }
}

/// 일간 수익률 (길이 `values.len() - 1`). 이전 값이 0 이하인 구간은 건너뜁니다.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

pub fn total_return(initial_value: f64, final_value: f64) -> f64 {
    if initial_value == 0.0 {
        return 0.0;
    }
    (final_value - initial_value) / initial_value
}

/// `(최종 / 초기)^(1 / 년수) - 1`. 최종 가치가 0 이하이면 -1.
pub fn cagr(initial_value: f64, final_value: f64, years: f64) -> f64 {
    if initial_value <= 0.0 || years <= 0.0 {
        return 0.0;
    }
    if final_value <= 0.0 {
        return -1.0;
    }
    (final_value / initial_value).powf(1.0 / years) - 1.0
}

/// 일간 수익률 표본표준편차 × √252.
pub fn volatility(returns: &[f64]) -> f64 {
    sample_std(returns).map_or(0.0, |std| std * TRADING_DAYS_PER_YEAR.sqrt())
}

/// `mean(초과수익) / std(초과수익) × √252`. 표준편차가 0이면 0.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let excess = excess_returns(returns, risk_free_rate);
    match (mean(&excess), sample_std(&excess)) {
        (Some(mean), Some(std)) if std > 0.0 => mean / std * TRADING_DAYS_PER_YEAR.sqrt(),
        _ => 0.0,
    }
}

/// `mean(초과수익) / std(음의 초과수익) × √252`.
///
/// 음의 초과수익이 2개 미만이거나 편차가 0이면, 평균 초과수익이 양수일 때 무한대, 아니면 0.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let excess = excess_returns(returns, risk_free_rate);
    let Some(mean) = mean(&excess) else {
        return 0.0;
    };
    if excess.len() < 2 {
        return 0.0;
    }

    let downside: Vec<f64> = excess.iter().copied().filter(|r| *r < 0.0).collect();
    match sample_std(&downside) {
        Some(std) if std > 0.0 => mean / std * TRADING_DAYS_PER_YEAR.sqrt(),
        _ if mean > 0.0 => f64::INFINITY,
        _ => 0.0,
    }
}

/// 누적 고점 대비 최대 하락률 (양수).
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut mdd = 0.0_f64;
    for &value in values {
        peak = peak.max(value);
        if peak > 0.0 {
            mdd = mdd.max((peak - value) / peak);
        }
    }
    mdd
}

/// `CAGR / MDD`. 낙폭이 없으면 CAGR이 양수일 때 무한대, 아니면 0.
pub fn calmar_ratio(cagr: f64, max_drawdown: f64) -> f64 {
    if max_drawdown == 0.0 {
        return if cagr > 0.0 { f64::INFINITY } else { 0.0 };
    }
    cagr / max_drawdown
}

/// 수익률이 양수인 기간의 비율.
pub fn win_rate(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    returns.iter().filter(|r| **r > 0.0).count() as f64 / returns.len() as f64
}

fn excess_returns(returns: &[f64], risk_free_rate: f64) -> Vec<f64> {
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    returns.iter().map(|r| r - daily_rf).collect()
}

fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().sum::<f64>() / xs.len() as f64)
}

fn sample_std(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs)?;
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    Some(var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cagr() {
        // 2년 동안 1.21배 → 연 10%
        assert!((cagr(100.0, 121.0, 2.0) - 0.10).abs() < 1e-12);
        assert_eq!(cagr(100.0, 0.0, 1.0), -1.0);
        assert_eq!(cagr(100.0, 150.0, 0.0), 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        // 1000 → 1200(고점) → 1080 → 1300 → 1040
        let values = [1000.0, 1200.0, 1080.0, 1300.0, 1040.0];
        assert!((max_drawdown(&values) - 0.2).abs() < 1e-12);
        assert_eq!(max_drawdown(&[100.0, 110.0, 120.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn test_daily_returns_and_win_rate() {
        let returns = daily_returns(&[100.0, 110.0, 99.0, 99.0]);
        assert_eq!(returns.len(), 3);
        assert!((returns[0] - 0.10).abs() < 1e-12);
        assert!((returns[1] + 0.10).abs() < 1e-12);
        assert!((win_rate(&returns) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sharpe_zero_without_variance() {
        assert_eq!(sharpe_ratio(&[0.01, 0.01, 0.01], 0.0), 0.0);
        assert_eq!(sharpe_ratio(&[0.01], 0.0), 0.0);
    }

    #[test]
    fn test_sharpe_and_sortino() {
        let returns = [0.02, -0.01, 0.03, -0.02, 0.01];
        let sharpe = sharpe_ratio(&returns, 0.0);
        // mean 0.006, 표본표준편차 ≈ 0.020736
        let expected = 0.006 / 0.000_430_f64.sqrt() * TRADING_DAYS_PER_YEAR.sqrt();
        assert!((sharpe - expected).abs() < 1e-9);

        // 하방 편차는 [-0.01, -0.02]의 표본표준편차
        let sortino = sortino_ratio(&returns, 0.0);
        let downside_std = 0.00005_f64.sqrt();
        assert!((sortino - 0.006 / downside_std * TRADING_DAYS_PER_YEAR.sqrt()).abs() < 1e-9);
        assert!(sortino > sharpe);
    }

    #[test]
    fn test_sortino_without_downside() {
        assert_eq!(sortino_ratio(&[0.01, 0.02, 0.03], 0.0), f64::INFINITY);
        assert_eq!(sortino_ratio(&[-0.01, 0.0], 0.0), 0.0);
    }

    #[test]
    fn test_calmar() {
        assert!((calmar_ratio(0.10, 0.20) - 0.5).abs() < 1e-12);
        assert_eq!(calmar_ratio(0.10, 0.0), f64::INFINITY);
        assert_eq!(calmar_ratio(-0.05, 0.0), 0.0);
    }

    #[test]
    fn test_from_equity_curve() {
        let values = [1000.0, 1100.0, 990.0, 1210.0];
        let metrics = PerformanceMetrics::from_equity_curve(&values, 1.0, DEFAULT_RISK_FREE_RATE);

        assert_eq!(metrics.initial_value, 1000.0);
        assert_eq!(metrics.final_value, 1210.0);
        assert!((metrics.total_return - 0.21).abs() < 1e-12);
        assert!((metrics.cagr - 0.21).abs() < 1e-12);
        assert!((metrics.max_drawdown - 0.10).abs() < 1e-12);
        assert!((metrics.calmar_ratio - 2.1).abs() < 1e-9);
        assert!((metrics.win_rate - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(metrics.periods, 4);
        assert!(metrics.summary().contains("MDD: 10.00%"));
    }

    #[test]
    fn test_empty_curve() {
        let metrics = PerformanceMetrics::from_equity_curve(&[], 1.0, 0.0);
        assert_eq!(metrics, PerformanceMetrics::default());
    }
}
