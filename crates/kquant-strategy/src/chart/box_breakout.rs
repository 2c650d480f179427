//! 박스권 돌파.
//!
//! 오늘을 제외한 직전 N봉의 최고가/최저가를 박스로 봅니다.
//! 상단 돌파는 거래량이 받쳐줄 때만 매수, 하단 이탈은 거래량과 무관하게
//! 바로 매도 경고를 냅니다.

use serde::{Deserialize, Serialize};

use kquant_core::{ChartSignal, OhlcvBar};

use super::{volume_ratio_at, ChartDetector};

const VOLUME_PERIOD: usize = 20;

/// 박스권 돌파 감지기.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxBreakout {
    /// 박스권 확인 기간 (기본: 20)
    pub lookback_days: usize,
    /// 돌파 기준 (기본: 0.02)
    pub breakout_threshold: f64,
    /// 상단 돌파 시 최소 거래량 배수 (기본: 1.5)
    pub min_volume_ratio: f64,
}

impl Default for BoxBreakout {
    fn default() -> Self {
        Self {
            lookback_days: 20,
            breakout_threshold: 0.02,
            min_volume_ratio: 1.5,
        }
    }
}

impl BoxBreakout {
    pub const ID: &'static str = "box_breakout";

    pub fn new(lookback_days: usize, breakout_threshold: f64, min_volume_ratio: f64) -> Self {
        Self {
            lookback_days,
            breakout_threshold,
            min_volume_ratio,
        }
    }
}

impl ChartDetector for BoxBreakout {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> String {
        format!("박스권 돌파 ({}일)", self.lookback_days)
    }

    fn description(&self) -> String {
        format!("{}일간 고점을 거래량 동반 돌파시 매수", self.lookback_days)
    }

    fn min_bars(&self) -> usize {
        self.lookback_days + 1
    }

    fn analyze(&self, series: &[OhlcvBar], code: &str, name: &str) -> Option<ChartSignal> {
        if self.lookback_days == 0 || series.len() < self.min_bars() {
            return None;
        }
        let t = series.len() - 1;
        let today = &series[t];
        let window = &series[t - self.lookback_days..t];

        let box_high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let box_low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        if box_low <= 0.0 {
            return None;
        }
        let box_range = (box_high - box_low) / box_low;
        let ratio = volume_ratio_at(series, t, VOLUME_PERIOD).unwrap_or(0.0);

        if today.close > box_high * (1.0 + self.breakout_threshold) && ratio >= self.min_volume_ratio {
            return Some(
                ChartSignal::buy(Self::ID, code, name, today.date, today.close)
                    .with_strength(60.0 + ratio * 10.0 + box_range * 100.0)
                    .with_prices(
                        Some(today.close + (box_high - box_low)),
                        Some(box_high * 0.98),
                    )
                    .with_reason(format!(
                        "{}일 박스권 상단({:.0}) 돌파, 거래량 {:.1}배",
                        self.lookback_days, box_high, ratio
                    ))
                    .with_indicator("box_high", box_high)
                    .with_indicator("box_low", box_low)
                    .with_indicator("box_range_pct", box_range * 100.0)
                    .with_indicator("vol_ratio", ratio)
                    .with_indicator("breakout_pct", (today.close / box_high - 1.0) * 100.0),
            );
        }

        if today.close < box_low * (1.0 - self.breakout_threshold) {
            let breakdown = today.close / box_low - 1.0;
            return Some(
                ChartSignal::sell(Self::ID, code, name, today.date, today.close)
                    .with_strength(60.0 + breakdown.abs() * 200.0)
                    .with_reason(format!(
                        "{}일 박스권 하단({:.0}) 이탈 경고",
                        self.lookback_days, box_low
                    ))
                    .with_indicator("box_high", box_high)
                    .with_indicator("box_low", box_low)
                    .with_indicator("breakdown_pct", breakdown * 100.0),
            );
        }

        None
    }
}
