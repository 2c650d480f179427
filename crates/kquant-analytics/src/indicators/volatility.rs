//! 변동성 지표 (Volatility Indicators).
//!
//! - Bollinger Bands
//! - ATR (Average True Range)

use kquant_core::OhlcvBar;
use serde::{Deserialize, Serialize};

use super::{require_period, rolling_mean, IndicatorResult};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_mult: f64,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_mult: 2.0,
        }
    }
}

/// 볼린저 밴드 한 시점 값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBand {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBand {
    /// (상단 - 하단) / 중단.
    pub fn width(&self) -> f64 {
        if self.middle == 0.0 {
            0.0
        } else {
            (self.upper - self.lower) / self.middle
        }
    }
}

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtrParams {
    /// 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 볼린저 밴드. 윈도우가 다 차기 전에는 `None`. 표준편차는 표본 표준편차.
pub fn bollinger_bands(
    prices: &[f64],
    params: BollingerBandsParams,
) -> IndicatorResult<Vec<Option<BollingerBand>>> {
    require_period(params.period)?;
    let period = params.period;

    Ok((0..prices.len())
        .map(|i| {
            if i + 1 < period || period < 2 {
                return None;
            }
            let window = &prices[i + 1 - period..=i];
            let middle = window.iter().sum::<f64>() / period as f64;
            let var = window.iter().map(|p| (p - middle).powi(2)).sum::<f64>()
                / (period - 1) as f64;
            let band = var.sqrt() * params.std_mult;
            Some(BollingerBand {
                upper: middle + band,
                middle,
                lower: middle - band,
            })
        })
        .collect())
}

/// ATR: True Range의 `period`일 단순 평균.
///
/// 첫 봉의 True Range는 고가 - 저가입니다.
pub fn atr(bars: &[OhlcvBar], params: AtrParams) -> IndicatorResult<Vec<Option<f64>>> {
    require_period(params.period)?;

    let true_ranges: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high - bar.low;
            if i == 0 {
                return hl;
            }
            let prev_close = bars[i - 1].close;
            hl.max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        })
        .collect();

    Ok(rolling_mean(&true_ranges, params.period))
}
