//! 골든크로스 / 데드크로스.
//!
//! 단기 이동평균이 장기 이동평균을 상향 돌파한 **그 봉**에서만 매수,
//! 하향 돌파한 봉에서만 매도 신호를 냅니다. 이미 정배열 상태가 이어지는
//! 봉에서는 신호가 없습니다 (레벨이 아니라 교차 시점에 반응).

use serde::{Deserialize, Serialize};

use kquant_core::{ChartSignal, OhlcvBar};

use super::{close_sma, ChartDetector};

/// 이동평균 교차 감지기.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenCross {
    /// 단기 이동평균 기간 (기본: 5)
    pub short_period: usize,
    /// 장기 이동평균 기간 (기본: 20)
    pub long_period: usize,
}

impl Default for GoldenCross {
    fn default() -> Self {
        Self {
            short_period: 5,
            long_period: 20,
        }
    }
}

impl GoldenCross {
    pub const ID: &'static str = "golden_cross";

    pub fn new(short_period: usize, long_period: usize) -> Self {
        Self {
            short_period,
            long_period,
        }
    }
}

impl ChartDetector for GoldenCross {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> String {
        format!("골든크로스 ({}/{})", self.short_period, self.long_period)
    }

    fn description(&self) -> String {
        format!(
            "{}일선이 {}일선을 상향 돌파하면 매수, 하향 돌파하면 매도",
            self.short_period, self.long_period
        )
    }

    fn min_bars(&self) -> usize {
        self.long_period + 2
    }

    fn analyze(&self, series: &[OhlcvBar], code: &str, name: &str) -> Option<ChartSignal> {
        if series.len() < self.min_bars() {
            return None;
        }

        let short = close_sma(series, self.short_period)?;
        let long = close_sma(series, self.long_period)?;
        let (t, y) = (series.len() - 1, series.len() - 2);
        let today = &series[t];

        let cross_up = short[y] <= long[y] && short[t] > long[t];
        let cross_down = short[y] >= long[y] && short[t] < long[t];
        if !(cross_up || cross_down) || long[t] <= 0.0 {
            return None;
        }

        let gap = short[t] / long[t] - 1.0;
        let signal = if cross_up {
            ChartSignal::buy(Self::ID, code, name, today.date, today.close)
                .with_strength((gap * 1000.0).min(100.0).max(50.0))
                .with_prices(Some(today.close * 1.10), Some(today.close * 0.95))
                .with_reason(format!(
                    "골든크로스 발생: {}일선({:.0}) > {}일선({:.0})",
                    self.short_period, short[t], self.long_period, long[t]
                ))
        } else {
            ChartSignal::sell(Self::ID, code, name, today.date, today.close)
                .with_strength((-gap * 1000.0).min(100.0).max(50.0))
                .with_reason(format!(
                    "데드크로스 발생: {}일선({:.0}) < {}일선({:.0})",
                    self.short_period, short[t], self.long_period, long[t]
                ))
        };

        Some(
            signal
                .with_indicator("ma_short", short[t])
                .with_indicator("ma_long", long[t]),
        )
    }
}
