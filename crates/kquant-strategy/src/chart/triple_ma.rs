//! 3중 이동평균 정배열 / 역배열 전환.

use serde::{Deserialize, Serialize};

use kquant_core::{ChartSignal, OhlcvBar};

use super::{close_sma, ChartDetector};

/// 5/20/60일선 배열 감지기.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripleMa;

impl TripleMa {
    pub const ID: &'static str = "triple_ma";
    const PERIODS: [usize; 3] = [5, 20, 60];
}

impl ChartDetector for TripleMa {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> String {
        "3중 이평선 정배열".to_string()
    }

    fn description(&self) -> String {
        "5일선 > 20일선 > 60일선 정배열 시작시 매수, 역배열 시작시 매도".to_string()
    }

    fn min_bars(&self) -> usize {
        Self::PERIODS[2] + 2
    }

    fn analyze(&self, series: &[OhlcvBar], code: &str, name: &str) -> Option<ChartSignal> {
        if series.len() < self.min_bars() {
            return None;
        }
        let [p5, p20, p60] = Self::PERIODS;
        let ma5 = close_sma(series, p5)?;
        let ma20 = close_sma(series, p20)?;
        let ma60 = close_sma(series, p60)?;
        let (t, y) = (series.len() - 1, series.len() - 2);
        let today = &series[t];

        let aligned = |i: usize| ma5[i] > ma20[i] && ma20[i] > ma60[i];
        let reversed = |i: usize| ma5[i] < ma20[i] && ma20[i] < ma60[i];
        let levels = format!("5일({:.0}), 20일({:.0}), 60일({:.0})", ma5[t], ma20[t], ma60[t]);

        let signal = if aligned(t) && !aligned(y) && today.close > ma5[t] {
            ChartSignal::buy(Self::ID, code, name, today.date, today.close)
                .with_strength(75.0)
                .with_prices(Some(today.close * 1.12), Some(ma20[t] * 0.98))
                .with_reason(format!("3중 정배열 시작: {}", levels))
        } else if reversed(t) && !reversed(y) {
            ChartSignal::sell(Self::ID, code, name, today.date, today.close)
                .with_strength(70.0)
                .with_reason(format!("3중 역배열 시작: {}", levels))
        } else {
            return None;
        };

        Some(
            signal
                .with_indicator("ma_5", ma5[t])
                .with_indicator("ma_20", ma20[t])
                .with_indicator("ma_60", ma60[t]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::fixtures::bars;
    use kquant_core::SignalKind;

    /// 배열 전환이 처음 일어나는 시점까지 시계열을 늘립니다.
    fn until(mut closes: Vec<f64>, step: f64, pred: impl Fn(&[OhlcvBar]) -> bool) -> Vec<OhlcvBar> {
        for _ in 0..200 {
            let last = *closes.last().unwrap();
            closes.push(last * step);
            let series = bars(&closes, &vec![1_000; closes.len()]);
            if pred(&series) {
                return series;
            }
        }
        panic!("배열 전환이 일어나지 않았습니다");
    }

    fn is_aligned(series: &[OhlcvBar]) -> bool {
        let t = series.len() - 1;
        let (a, b, c) = (
            close_sma(series, 5).unwrap()[t],
            close_sma(series, 20).unwrap()[t],
            close_sma(series, 60).unwrap()[t],
        );
        a > b && b > c
    }

    fn is_reversed(series: &[OhlcvBar]) -> bool {
        let t = series.len() - 1;
        let (a, b, c) = (
            close_sma(series, 5).unwrap()[t],
            close_sma(series, 20).unwrap()[t],
            close_sma(series, 60).unwrap()[t],
        );
        a < b && b < c
    }

    #[test]
    fn test_buy_on_alignment_start() {
        // 70봉 하락 후 상승 전환
        let closes: Vec<f64> = (0..70).map(|i| 200.0 - i as f64).collect();
        let series = until(closes, 1.02, is_aligned);

        let signal = TripleMa.analyze(&series, "A", "A").unwrap();
        assert_eq!(signal.kind, SignalKind::Buy);
        assert_eq!(signal.strength, 75.0);
        assert!(signal.stop_loss.is_some());

        // 다음 봉은 이미 정배열 → 신호 없음
        let mut closes: Vec<f64> = series.iter().map(|b| b.close).collect();
        closes.push(closes.last().unwrap() * 1.02);
        let next = bars(&closes, &vec![1_000; closes.len()]);
        assert!(TripleMa.analyze(&next, "A", "A").is_none());
    }

    #[test]
    fn test_sell_on_reverse_start() {
        let closes: Vec<f64> = (0..70).map(|i| 100.0 + i as f64).collect();
        let series = until(closes, 0.98, is_reversed);

        let signal = TripleMa.analyze(&series, "A", "A").unwrap();
        assert_eq!(signal.kind, SignalKind::Sell);
        assert_eq!(signal.strength, 70.0);
    }

    #[test]
    fn test_requires_62_bars() {
        assert_eq!(TripleMa.min_bars(), 62);
        let series = bars(&[100.0; 61], &[1_000; 61]);
        assert!(TripleMa.analyze(&series, "A", "A").is_none());
    }
}
