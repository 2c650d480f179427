//! 일봉 시세 데이터 타입.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 일봉 OHLCV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    /// 거래일
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// 거래량 (주)
    pub volume: u64,
}

impl OhlcvBar {
    /// 새 일봉을 생성합니다.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 캔들 몸통 크기 (|종가 - 시가|).
    pub fn body_size(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// 고가 - 저가 범위.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// 양봉 여부.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 몸통 / 범위 비율. 범위가 0이면 `None`.
    pub fn body_ratio(&self) -> Option<f64> {
        let range = self.range();
        if range > 0.0 {
            Some(self.body_size() / range)
        } else {
            None
        }
    }

    /// 윗꼬리 길이.
    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// 아랫꼬리 길이.
    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }
}

/// 실시간 현재가 스냅샷 (장중 거래량 돌파 감지용).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealtimeQuote {
    /// 현재가
    pub price: f64,
    /// 당일 누적 거래량
    pub volume: u64,
    /// 전일 대비 등락률 (%)
    pub change_rate: f64,
    /// 전일 종가
    pub prev_close: f64,
}

/// 일봉 시계열을 검증합니다.
///
/// 날짜가 엄격히 증가하고 모든 가격이 양수여야 합니다.
pub fn validate_series(bars: &[OhlcvBar]) -> Result<(), String> {
    for (i, bar) in bars.iter().enumerate() {
        if !(bar.open > 0.0 && bar.high > 0.0 && bar.low > 0.0 && bar.close > 0.0) {
            return Err(format!("{}: 가격은 양수여야 합니다", bar.date));
        }
        if i > 0 && bars[i - 1].date >= bar.date {
            return Err(format!(
                "{}: 날짜가 증가하지 않습니다 (이전 {})",
                bar.date,
                bars[i - 1].date
            ));
        }
    }
    Ok(())
}

/// 종가 시계열.
pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// 거래량 시계열 (f64).
pub fn volumes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume as f64).collect()
}
