//! 거래량 급증.
//!
//! 오늘 거래량이 직전 N일 평균의 일정 배수 이상이고 가격이 충분히 움직이면
//! 방향에 따라 매수 또는 매도 신호를 냅니다. 장중에는 실시간 현재가로
//! 오늘 봉을 대신하는 [`VolumeBreakout::analyze_realtime`]을 사용합니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use kquant_core::{ChartSignal, OhlcvBar, RealtimeQuote};

use super::{close_change, volume_ratio_at, ChartDetector};

/// 거래량 급증 감지기.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeBreakout {
    /// 평균 대비 거래량 배수 (기본: 2.0)
    pub volume_multiple: f64,
    /// 평균 거래량 기간 (기본: 20)
    pub volume_period: usize,
    /// 최소 가격 변화율 (기본: 0.02)
    pub min_change: f64,
}

impl Default for VolumeBreakout {
    fn default() -> Self {
        Self {
            volume_multiple: 2.0,
            volume_period: 20,
            min_change: 0.02,
        }
    }
}

impl VolumeBreakout {
    pub const ID: &'static str = "volume_breakout";

    pub fn new(volume_multiple: f64, volume_period: usize, min_change: f64) -> Self {
        Self {
            volume_multiple,
            volume_period,
            min_change,
        }
    }

    /// 실시간 현재가로 오늘 봉을 대신해 판단합니다.
    ///
    /// `history`는 오늘을 포함하지 않는 과거 일봉이며, 평균 거래량은
    /// 그중 마지막 `volume_period`봉으로 계산합니다.
    /// `quote.change_rate`는 퍼센트 단위입니다.
    pub fn analyze_realtime(
        &self,
        history: &[OhlcvBar],
        quote: &RealtimeQuote,
        code: &str,
        name: &str,
        date: NaiveDate,
    ) -> Option<ChartSignal> {
        if self.volume_period == 0 || history.len() < self.volume_period {
            return None;
        }
        let window = &history[history.len() - self.volume_period..];
        let avg = window.iter().map(|b| b.volume as f64).sum::<f64>() / self.volume_period as f64;
        if avg == 0.0 || quote.price == 0.0 {
            return None;
        }

        let ratio = quote.volume as f64 / avg;
        let change = quote.change_rate / 100.0;
        self.judge(code, name, date, quote.price, ratio, change, true)
            .map(|s| {
                s.with_indicator("volume", quote.volume as f64)
                    .with_indicator("vol_ma", avg)
                    .with_indicator("prev_close", quote.prev_close)
            })
    }

    #[allow(clippy::too_many_arguments)]
    fn judge(
        &self,
        code: &str,
        name: &str,
        date: NaiveDate,
        price: f64,
        ratio: f64,
        change: f64,
        realtime: bool,
    ) -> Option<ChartSignal> {
        if ratio < self.volume_multiple {
            return None;
        }
        let prefix = if realtime { "[실시간] " } else { "" };

        let signal = if change >= self.min_change {
            ChartSignal::buy(Self::ID, code, name, date, price)
                .with_strength(ratio * 20.0 + change * 200.0)
                .with_prices(Some(price * 1.08), Some(price * 0.97))
                .with_reason(format!(
                    "{}거래량 {:.1}배 급증, 가격 {:.1}% 상승",
                    prefix,
                    ratio,
                    change * 100.0
                ))
        } else if change <= -self.min_change {
            ChartSignal::sell(Self::ID, code, name, date, price)
                .with_strength(ratio * 20.0 + change.abs() * 200.0)
                .with_reason(format!(
                    "{}거래량 {:.1}배 급증, 가격 {:.1}% 하락",
                    prefix,
                    ratio,
                    change * 100.0
                ))
        } else {
            return None;
        };

        let signal = signal
            .with_indicator("vol_ratio", ratio)
            .with_indicator("price_change", change);
        Some(if realtime {
            signal.with_indicator("realtime", 1.0)
        } else {
            signal
        })
    }
}

impl ChartDetector for VolumeBreakout {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> String {
        format!("거래량 급증 ({}배)", self.volume_multiple)
    }

    fn description(&self) -> String {
        format!(
            "거래량이 {}일 평균의 {}배 이상이고 가격이 {:.0}% 이상 움직이면 신호",
            self.volume_period,
            self.volume_multiple,
            self.min_change * 100.0
        )
    }

    fn min_bars(&self) -> usize {
        self.volume_period + 1
    }

    fn analyze(&self, series: &[OhlcvBar], code: &str, name: &str) -> Option<ChartSignal> {
        if self.volume_period == 0 || series.len() < self.min_bars() {
            return None;
        }
        let t = series.len() - 1;
        let today = &series[t];
        let ratio = volume_ratio_at(series, t, self.volume_period)?;
        let change = close_change(series)?;

        self.judge(code, name, today.date, today.close, ratio, change, false)
            .map(|s| s.with_indicator("volume", today.volume as f64))
    }
}
