//! 차트 신호 스캔.
//!
//! 종목 목록의 일봉을 순서대로 가져와 선택된 감지기를 모두 실행하고,
//! 매수/매도 신호를 강도 내림차순으로 모읍니다. 한 종목의 조회나 분석이
//! 실패해도 경고 로그만 남기고 다음 종목으로 넘어갑니다.
//!
//! 신호에는 감지기가 쓴 지표 외에 RSI, MACD, 볼린저 밴드 위치, ATR 같은
//! 보조 지표가 붙습니다 ([`technical_indicators`]).

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Instrument};

use kquant_core::{
    scan_span, validate_series, ChartSignal, OhlcvBar, OhlcvProvider, ProviderError, QuantError,
    QuantResult,
};

use crate::chart::{technical_indicators, ChartDetector};

/// 건너뛴 종목.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedStock {
    pub code: String,
    pub reason: String,
}

/// 스캔 결과.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    /// 매수 신호 (강도 내림차순)
    pub buys: Vec<ChartSignal>,
    /// 매도 신호 (강도 내림차순)
    pub sells: Vec<ChartSignal>,
    /// 분석을 마친 종목 수
    pub scanned: usize,
    /// 조회/검증 실패로 건너뛴 종목
    pub skipped: Vec<SkippedStock>,
}

impl ScanReport {
    /// 전체 신호 수.
    pub fn signal_count(&self) -> usize {
        self.buys.len() + self.sells.len()
    }

    /// 신호를 추가합니다 (정렬은 [`ScanReport::finish`]에서).
    pub fn push(&mut self, signal: ChartSignal) {
        if signal.is_buy() {
            self.buys.push(signal);
        } else {
            self.sells.push(signal);
        }
    }

    /// 방향별로 강도 내림차순 안정 정렬.
    pub fn finish(mut self) -> Self {
        self.buys.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        self.sells.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        self
    }
}

/// 메모리에 있는 시계열 하나에 모든 감지기를 실행합니다.
///
/// 감지기가 같은 이름의 지표를 이미 기록했으면 그 값을 유지합니다.
pub fn scan_series(
    detectors: &[Box<dyn ChartDetector>],
    series: &[OhlcvBar],
    code: &str,
    name: &str,
) -> Vec<ChartSignal> {
    let mut signals: Vec<ChartSignal> = detectors
        .iter()
        .filter_map(|detector| {
            let signal = detector.analyze(series, code, name);
            if let Some(s) = &signal {
                debug!(detector = detector.id(), kind = %s.kind, strength = s.strength, "신호 감지");
            }
            signal
        })
        .collect();
    if signals.is_empty() {
        return signals;
    }

    let extra = technical_indicators(series);
    for signal in &mut signals {
        for (&key, &value) in &extra {
            signal.indicators.entry(key.to_string()).or_insert(value);
        }
    }
    signals
}

/// 일봉 제공자 기반 스캐너.
pub struct Scanner {
    provider: Arc<dyn OhlcvProvider>,
    detectors: Vec<Box<dyn ChartDetector>>,
    fetch_timeout: Duration,
}

impl Scanner {
    pub fn new(provider: Arc<dyn OhlcvProvider>, detectors: Vec<Box<dyn ChartDetector>>) -> Self {
        Self {
            provider,
            detectors,
            fetch_timeout: Duration::from_secs(10),
        }
    }

    /// 종목당 조회 제한 시간.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn detectors(&self) -> &[Box<dyn ChartDetector>] {
        &self.detectors
    }

    /// `stocks`의 (종목코드, 종목명)을 `from..=to` 구간 일봉으로 스캔합니다.
    pub async fn scan(&self, stocks: &[(String, String)], from: NaiveDate, to: NaiveDate) -> ScanReport {
        self.scan_with_progress(stocks, from, to, |_, _| {}).await
    }

    /// 종목 하나를 처리할 때마다 `progress(완료 수, 전체 수)`를 호출합니다.
    pub async fn scan_with_progress<F>(
        &self,
        stocks: &[(String, String)],
        from: NaiveDate,
        to: NaiveDate,
        mut progress: F,
    ) -> ScanReport
    where
        F: FnMut(usize, usize),
    {
        let total = stocks.len();
        let mut report = ScanReport::default();

        for (done, (code, name)) in stocks.iter().enumerate() {
            let span = scan_span!("scan_stock", code);
            let result = async {
                let series = self.fetch(code, from, to).await?;
                Ok::<_, QuantError>(scan_series(&self.detectors, &series, code, name))
            }
            .instrument(span)
            .await;

            match result {
                Ok(signals) => {
                    report.scanned += 1;
                    for signal in signals {
                        report.push(signal);
                    }
                }
                Err(e) => {
                    warn!(code = %code, error = %e, "종목 스캔 실패, 건너뜀");
                    report.skipped.push(SkippedStock {
                        code: code.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            progress(done + 1, total);
        }

        let report = report.finish();
        info!(
            scanned = report.scanned,
            skipped = report.skipped.len(),
            buys = report.buys.len(),
            sells = report.sells.len(),
            "차트 스캔 완료"
        );
        report
    }

    async fn fetch(&self, code: &str, from: NaiveDate, to: NaiveDate) -> QuantResult<Vec<OhlcvBar>> {
        let series = tokio::time::timeout(self.fetch_timeout, self.provider.ohlcv(code, from, to))
            .await
            .map_err(|_| ProviderError::Network(format!("{} 일봉 조회 시간 초과", code)))??;
        validate_series(&series).map_err(QuantError::Data)?;
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartDetectorRegistry;
    use kquant_core::SignalKind;

    fn signal(kind: SignalKind, strength: f64) -> ChartSignal {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        ChartSignal::new("test", "A", "A", kind, date, 1_000.0).with_strength(strength)
    }

    #[test]
    fn test_report_sorts_by_strength_per_kind() {
        let mut report = ScanReport::default();
        report.push(signal(SignalKind::Buy, 55.0));
        report.push(signal(SignalKind::Sell, 70.0));
        report.push(signal(SignalKind::Buy, 90.0));
        report.push(signal(SignalKind::Sell, 80.0));
        let report = report.finish();

        let buys: Vec<f64> = report.buys.iter().map(|s| s.strength).collect();
        let sells: Vec<f64> = report.sells.iter().map(|s| s.strength).collect();
        assert_eq!(buys, vec![90.0, 55.0]);
        assert_eq!(sells, vec![80.0, 70.0]);
        assert_eq!(report.signal_count(), 4);
    }

    #[test]
    fn test_scan_series_attaches_technical_indicators() {
        let detectors = ChartDetectorRegistry::create_all();
        // 120봉 횡보 후 마지막 봉에서 거래량을 동반한 급등
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut series: Vec<OhlcvBar> = (0..120)
            .map(|i| {
                let c = 100.0 + if i % 2 == 0 { 1.0 } else { -1.0 };
                OhlcvBar::new(start + chrono::Duration::days(i), c, c + 1.0, c - 1.0, c, 1_000)
            })
            .collect();
        series.push(OhlcvBar::new(start + chrono::Duration::days(120), 101.0, 110.0, 100.0, 109.0, 5_000));

        let signals = scan_series(&detectors, &series, "A", "A");
        assert!(!signals.is_empty());
        for signal in &signals {
            assert!(signal.indicators.contains_key("rsi_14"));
            assert!(signal.indicators.contains_key("macd_histogram"));
            assert!(signal.indicators.contains_key("atr_14"));
            assert!(signal.indicators["bb_position"] > 1.0);
        }
    }

    #[test]
    fn test_scan_series_short_history_is_silent() {
        let detectors = ChartDetectorRegistry::create_all();
        assert!(scan_series(&detectors, &[], "A", "A").is_empty());
    }
}
