//! 매집봉 탐지.
//!
//! 거래량은 늘었는데 몸통이 짧은 양봉은 큰손이 가격을 크게 올리지 않고
//! 물량을 모으는 흔적으로 봅니다. 직전 5봉 중 비슷한 봉이 많을수록
//! 신호 강도가 올라갑니다.

use serde::{Deserialize, Serialize};

use kquant_core::{ChartSignal, OhlcvBar};

use super::{volume_ratio_at, ChartDetector};

const VOLUME_PERIOD: usize = 20;
const LOOKBACK_DAYS: usize = 5;

/// 매집봉 감지기.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accumulation {
    /// 평균 대비 최소 거래량 배수 (기본: 1.5)
    pub min_volume_ratio: f64,
    /// 봉 범위 대비 최대 몸통 비율 (기본: 0.3)
    pub max_body_ratio: f64,
}

impl Default for Accumulation {
    fn default() -> Self {
        Self {
            min_volume_ratio: 1.5,
            max_body_ratio: 0.3,
        }
    }
}

impl Accumulation {
    pub const ID: &'static str = "accumulation";

    pub fn new(min_volume_ratio: f64, max_body_ratio: f64) -> Self {
        Self {
            min_volume_ratio,
            max_body_ratio,
        }
    }

    /// 직전 봉들 중 느슨한 매집 조건(거래량 1배 이상, 몸통 50% 이하, 양봉)을 만족한 수.
    fn accumulation_days(series: &[OhlcvBar], today: usize) -> usize {
        (today.saturating_sub(LOOKBACK_DAYS)..today)
            .filter(|&i| {
                let bar = &series[i];
                let ratio = volume_ratio_at(series, i, VOLUME_PERIOD).unwrap_or(0.0);
                let body = bar.body_ratio().unwrap_or(f64::INFINITY);
                ratio >= 1.0 && body <= 0.5 && bar.is_bullish()
            })
            .count()
    }
}

impl ChartDetector for Accumulation {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> String {
        "매집봉 탐지".to_string()
    }

    fn description(&self) -> String {
        "거래량 증가 + 짧은 양봉 = 세력 매집 신호".to_string()
    }

    fn min_bars(&self) -> usize {
        VOLUME_PERIOD + 1
    }

    fn analyze(&self, series: &[OhlcvBar], code: &str, name: &str) -> Option<ChartSignal> {
        if series.len() < self.min_bars() {
            return None;
        }
        let t = series.len() - 1;
        let today = &series[t];

        let ratio = volume_ratio_at(series, t, VOLUME_PERIOD)?;
        // 범위가 0이면 몸통 비율을 정의할 수 없다
        let body_ratio = today.body_ratio()?;
        if ratio < self.min_volume_ratio || body_ratio > self.max_body_ratio || !today.is_bullish() {
            return None;
        }

        let days = Self::accumulation_days(series, t);
        Some(
            ChartSignal::buy(Self::ID, code, name, today.date, today.close)
                .with_strength(50.0 + ratio * 10.0 + days as f64 * 10.0)
                .with_prices(Some(today.close * 1.15), Some(today.low * 0.98))
                .with_reason(format!(
                    "매집봉 감지: 거래량 {:.1}배, 몸통비율 {:.1}% (연속 {}일)",
                    ratio,
                    body_ratio * 100.0,
                    days
                ))
                .with_indicator("vol_ratio", ratio)
                .with_indicator("body_ratio", body_ratio)
                .with_indicator("accumulation_days", days as f64)
                .with_indicator("upper_shadow", today.upper_shadow())
                .with_indicator("lower_shadow", today.lower_shadow()),
        )
    }
}
