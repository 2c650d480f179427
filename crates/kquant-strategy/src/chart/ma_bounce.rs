//! 이동평균선 지지 반등.
//!
//! 어제 저가가 이동평균선 근처까지 내려왔다가 오늘 양봉으로 반등하면
//! 매수 신호. 장기 이동평균일수록 지지력이 강하다고 보고 강도를 높입니다.

use serde::{Deserialize, Serialize};

use kquant_core::{ChartSignal, OhlcvBar};

use super::{close_sma, ChartDetector};

/// 이동평균 지지 감지기.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaBounce {
    /// 확인할 이동평균 기간 (앞에서부터 먼저 맞는 것 사용)
    pub periods: Vec<usize>,
    /// 이동평균 근접 허용 범위 (기본: 0.02)
    pub tolerance: f64,
}

impl Default for MaBounce {
    fn default() -> Self {
        Self {
            periods: vec![20, 60, 120],
            tolerance: 0.02,
        }
    }
}

impl MaBounce {
    pub const ID: &'static str = "ma_bounce";

    pub fn new(periods: Vec<usize>, tolerance: f64) -> Self {
        Self { periods, tolerance }
    }

    fn max_period(&self) -> usize {
        self.periods.iter().copied().max().unwrap_or(0)
    }

    fn period_label(&self) -> String {
        self.periods
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl ChartDetector for MaBounce {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> String {
        format!("이평선 지지 ({})", self.period_label())
    }

    fn description(&self) -> String {
        format!("{}일선에서 지지받고 반등시 매수", self.period_label())
    }

    fn min_bars(&self) -> usize {
        self.max_period() + 3
    }

    fn analyze(&self, series: &[OhlcvBar], code: &str, name: &str) -> Option<ChartSignal> {
        let max_period = self.max_period();
        if max_period == 0 || series.len() < self.min_bars() {
            return None;
        }
        let (t, y) = (series.len() - 1, series.len() - 2);
        let (today, yesterday) = (&series[t], &series[y]);

        let bounced = today.close > yesterday.close && today.is_bullish();
        if !bounced {
            return None;
        }

        for &period in &self.periods {
            let ma = close_sma(series, period)?;
            if ma[y] <= 0.0 {
                continue;
            }
            let near = (yesterday.low - ma[y]).abs() / ma[y] <= self.tolerance;
            if !near || today.close <= ma[t] {
                continue;
            }

            return Some(
                ChartSignal::buy(Self::ID, code, name, today.date, today.close)
                    .with_strength(60.0 + period as f64 / max_period as f64 * 30.0)
                    .with_prices(Some(today.close * 1.08), Some(ma[t] * 0.98))
                    .with_reason(format!("{}일선({:.0}) 지지 후 반등", period, ma[t]))
                    .with_indicator("support_ma", period as f64)
                    .with_indicator("ma_value", ma[t])
                    .with_indicator("bounce_percent", (today.close / yesterday.low - 1.0) * 100.0),
            );
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use kquant_core::SignalKind;

    fn series(yesterday_low: f64, today_open: f64, today_close: f64) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let mut bars: Vec<OhlcvBar> = (0..123)
            .map(|i| OhlcvBar::new(start + Duration::days(i), 100.0, 101.0, 99.0, 100.0, 1_000))
            .collect();
        let y = bars.len() - 1;
        bars[y].low = yesterday_low;
        bars.push(OhlcvBar::new(
            start + Duration::days(123),
            today_open,
            today_close + 1.0,
            today_open - 1.0,
            today_close,
            1_000,
        ));
        bars
    }

    #[test]
    fn test_bounce_off_first_matching_ma() {
        let bars = series(99.5, 100.0, 103.0);
        let signal = MaBounce::default().analyze(&bars, "A", "A").unwrap();

        assert_eq!(signal.kind, SignalKind::Buy);
        assert_eq!(signal.indicators["support_ma"], 20.0);
        assert!((signal.strength - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_longer_ma_is_stronger() {
        let bars = series(99.5, 100.0, 103.0);
        let detector = MaBounce::new(vec![120], 0.02);
        let signal = detector.analyze(&bars, "A", "A").unwrap();
        assert_eq!(signal.indicators["support_ma"], 120.0);
        assert!((signal.strength - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_requires_bullish_rebound() {
        // 음봉
        let bars = series(99.5, 104.0, 103.0);
        assert!(MaBounce::default().analyze(&bars, "A", "A").is_none());

        // 어제 저가가 이평선에서 너무 멀다
        let bars = series(90.0, 100.0, 103.0);
        assert!(MaBounce::default().analyze(&bars, "A", "A").is_none());
    }

    #[test]
    fn test_needs_max_period_plus_three() {
        let bars = series(99.5, 100.0, 103.0);
        let detector = MaBounce::default();
        assert_eq!(detector.min_bars(), 123);
        assert!(detector.analyze(&bars[bars.len() - 122..], "A", "A").is_none());
    }
}
