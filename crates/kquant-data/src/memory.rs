//! 메모리 기반 일봉 제공자.
//!
//! 미리 준비한 시계열을 그대로 돌려줍니다. 테스트 픽스처나 외부에서
//! 한 번에 읽어온 데이터를 스캐너에 넘길 때 사용합니다.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use kquant_core::{OhlcvBar, OhlcvProvider, ProviderError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryOhlcv {
    series: HashMap<String, Vec<OhlcvBar>>,
}

impl InMemoryOhlcv {
    pub fn new() -> Self {
        Self::default()
    }

    /// 종목 시계열을 등록합니다 (빌더). 날짜순으로 정렬해 보관합니다.
    pub fn with_series(mut self, code: impl Into<String>, mut bars: Vec<OhlcvBar>) -> Self {
        bars.sort_by_key(|bar| bar.date);
        self.series.insert(code.into(), bars);
        self
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}

#[async_trait]
impl OhlcvProvider for InMemoryOhlcv {
    async fn ohlcv(
        &self,
        code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ProviderError> {
        let bars = self
            .series
            .get(code)
            .ok_or_else(|| ProviderError::NotFound(code.to_string()))?;
        Ok(bars
            .iter()
            .filter(|bar| bar.date >= from && bar.date <= to)
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> OhlcvBar {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        OhlcvBar::new(date, close, close, close, close, 1_000)
    }

    #[tokio::test]
    async fn test_range_filter() {
        let provider = InMemoryOhlcv::new().with_series("A", vec![bar(3, 3.0), bar(1, 1.0), bar(2, 2.0)]);
        let from = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();

        let bars = provider.ohlcv("A", from, to).await.unwrap();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_unknown_code() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = InMemoryOhlcv::new().ohlcv("ZZ", day, day).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }
}
