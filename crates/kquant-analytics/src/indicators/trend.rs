//! 추세 지표 (Trend Indicators).
//!
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)

use serde::{Deserialize, Serialize};
use ta::indicators::ExponentialMovingAverage;
use ta::Next;

use super::{require_period, IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간 (span).
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 12 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD 한 시점 값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// 단순 이동평균.
///
/// 처음 `period - 1`개 구간은 지금까지의 값으로 평균을 내는 확장 윈도우입니다.
/// 따라서 결과 길이는 입력과 같고 결측이 없습니다.
pub fn sma(values: &[f64], params: SmaParams) -> IndicatorResult<Vec<f64>> {
    require_period(params.period)?;

    Ok((0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(params.period);
            let window = &values[start..=i];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect())
}

/// 지수 이동평균 (`k = 2 / (period + 1)`, 첫 값으로 시작).
pub fn ema(values: &[f64], params: EmaParams) -> IndicatorResult<Vec<f64>> {
    require_period(params.period)?;

    let mut indicator = ExponentialMovingAverage::new(params.period)
        .map_err(|e| IndicatorError::InvalidParameter(format!("{:?}", e)))?;
    Ok(values.iter().map(|&v| indicator.next(v)).collect())
}

/// MACD 라인, 시그널 라인, 히스토그램.
pub fn macd(values: &[f64], params: MacdParams) -> IndicatorResult<Vec<MacdPoint>> {
    if params.fast_period >= params.slow_period {
        return Err(IndicatorError::InvalidParameter(format!(
            "단기 기간({})은 장기 기간({})보다 짧아야 합니다",
            params.fast_period, params.slow_period
        )));
    }

    let fast = ema(values, EmaParams { period: params.fast_period })?;
    let slow = ema(values, EmaParams { period: params.slow_period })?;
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema(&line, EmaParams { period: params.signal_period })?;

    Ok(line
        .iter()
        .zip(&signal)
        .map(|(&macd, &signal)| MacdPoint {
            macd,
            signal,
            histogram: macd - signal,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_expanding_start() {
        let values = [2.0, 4.0, 6.0, 8.0, 10.0];
        let ma = sma(&values, SmaParams { period: 3 }).unwrap();
        assert_eq!(ma, vec![2.0, 3.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_sma_zero_period() {
        assert!(matches!(
            sma(&[1.0], SmaParams { period: 0 }),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_ema_matches_recursive_definition() {
        let values = [10.0, 11.0, 12.0, 11.0];
        let result = ema(&values, EmaParams { period: 3 }).unwrap();
        let k = 2.0 / 4.0;
        let mut expected = vec![10.0];
        for v in &values[1..] {
            let prev = *expected.last().unwrap();
            expected.push(k * v + (1.0 - k) * prev);
        }
        for (a, b) in result.iter().zip(&expected) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let values = vec![100.0; 40];
        let points = macd(&values, MacdParams::default()).unwrap();
        assert_eq!(points.len(), 40);
        assert!(points.iter().all(|p| p.macd.abs() < 1e-9 && p.histogram.abs() < 1e-9));
    }

    #[test]
    fn test_macd_uptrend_is_positive() {
        let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let points = macd(&values, MacdParams::default()).unwrap();
        assert!(points.last().unwrap().macd > 0.0);
    }

    #[test]
    fn test_macd_invalid_periods() {
        let params = MacdParams {
            fast_period: 26,
            slow_period: 12,
            signal_period: 9,
        };
        assert!(macd(&[1.0, 2.0], params).is_err());
    }
}
