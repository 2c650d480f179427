//! 차트 패턴 매매 신호.
//!
//! - `SignalKind` - 신호 방향 (매수/매도)
//! - `ChartSignal` - 감지기가 생성한 신호 엔티티

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::tick_size::{KrxTickSize, RoundMethod, TickSizeProvider};

/// 신호 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Sell => write!(f, "SELL"),
        }
    }
}

/// 차트 감지기가 생성한 매매 신호.
///
/// 가격은 감지 시점의 값을 소수 둘째 자리까지 그대로 보관합니다.
/// 주문용 호가 단위 가격은 [`ChartSignal::tick_rounded`]로 얻습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSignal {
    pub code: String,
    pub name: String,
    pub kind: SignalKind,
    /// 신호를 생성한 감지기 ID
    pub detector: String,
    /// 신호 강도 (0 ~ 100)
    pub strength: f64,
    /// 신호 발생일
    pub date: NaiveDate,
    /// 현재가
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    /// 사람이 읽는 신호 근거
    pub reason: String,
    /// 판단에 사용된 지표 값
    #[serde(default)]
    pub indicators: BTreeMap<String, f64>,
}

impl ChartSignal {
    /// 새 신호를 생성합니다.
    pub fn new(
        detector: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        kind: SignalKind,
        date: NaiveDate,
        price: f64,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            kind,
            detector: detector.into(),
            strength: 0.0,
            date,
            price: to_decimal(price),
            target_price: None,
            stop_loss: None,
            reason: String::new(),
            indicators: BTreeMap::new(),
        }
    }

    /// 매수 신호를 생성합니다.
    pub fn buy(
        detector: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        date: NaiveDate,
        price: f64,
    ) -> Self {
        Self::new(detector, code, name, SignalKind::Buy, date, price)
    }

    /// 매도 신호를 생성합니다.
    pub fn sell(
        detector: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        date: NaiveDate,
        price: f64,
    ) -> Self {
        Self::new(detector, code, name, SignalKind::Sell, date, price)
    }

    /// 신호 강도를 설정합니다 (0 ~ 100으로 제한).
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = if strength.is_finite() {
            strength.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self
    }

    /// 목표가와 손절가를 설정합니다.
    pub fn with_prices(mut self, target: Option<f64>, stop_loss: Option<f64>) -> Self {
        self.target_price = target.map(to_decimal);
        self.stop_loss = stop_loss.map(to_decimal);
        self
    }

    /// 신호 근거를 설정합니다.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// 지표 값을 추가합니다.
    pub fn with_indicator(mut self, name: impl Into<String>, value: f64) -> Self {
        self.indicators.insert(name.into(), value);
        self
    }

    /// 매수 신호 여부.
    pub fn is_buy(&self) -> bool {
        self.kind == SignalKind::Buy
    }

    /// KRX 호가 단위로 맞춘 사본 (표시/주문용).
    ///
    /// 현재가는 반올림, 목표가는 내림, 손절가는 올림합니다.
    pub fn tick_rounded(&self) -> Self {
        let krx = KrxTickSize;
        Self {
            price: krx.round_to_tick(self.price, RoundMethod::Round),
            target_price: self.target_price.map(|p| krx.round_to_tick(p, RoundMethod::Floor)),
            stop_loss: self.stop_loss.map(|p| krx.round_to_tick(p, RoundMethod::Ceil)),
            ..self.clone()
        }
    }
}

/// 원화 가격 소수 자릿수.
const PRICE_DP: u32 = 2;

fn to_decimal(price: f64) -> Decimal {
    Decimal::from_f64(price)
        .map(|d| d.round_dp(PRICE_DP))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_strength_is_clamped() {
        let signal = ChartSignal::buy("golden_cross", "005930", "삼성전자", date(), 71_000.0)
            .with_strength(135.0);
        assert_eq!(signal.strength, 100.0);

        let signal = signal.with_strength(f64::NAN);
        assert_eq!(signal.strength, 0.0);
    }

    #[test]
    fn test_prices_are_kept_as_detected() {
        let signal = ChartSignal::buy("box_breakout", "A", "A", date(), 103.0)
            .with_prices(Some(103.0 * 1.10), Some(98.0));

        assert_eq!(signal.price, dec!(103));
        assert_eq!(signal.target_price, Some(dec!(113.3)));
        assert_eq!(signal.stop_loss, Some(dec!(98)));
    }

    #[test]
    fn test_tick_rounded_copy() {
        // 71,234원 → 100원 단위
        let signal = ChartSignal::buy("volume_breakout", "005930", "삼성전자", date(), 71_234.0)
            .with_prices(Some(76_932.72), Some(69_096.98))
            .with_strength(80.0);
        let rounded = signal.tick_rounded();

        assert_eq!(rounded.price, dec!(71_200));
        assert_eq!(rounded.target_price, Some(dec!(76_900)));
        assert_eq!(rounded.stop_loss, Some(dec!(69_100)));
        assert_eq!(rounded.strength, 80.0);
        assert_eq!(signal.price, dec!(71_234));
        assert_eq!(signal.target_price, Some(dec!(76_932.72)));
    }

    #[test]
    fn test_indicators_serialize_in_order() {
        let signal = ChartSignal::sell("triple_ma", "000660", "SK하이닉스", date(), 150_000.0)
            .with_indicator("ma60", 1.0)
            .with_indicator("ma20", 2.0)
            .with_indicator("ma5", 3.0);
        let json = serde_json::to_value(&signal).unwrap();

        assert_eq!(json["kind"], "SELL");
        assert!(json.get("target_price").is_none());
        let keys: Vec<_> = signal.indicators.keys().cloned().collect();
        assert_eq!(keys, vec!["ma20", "ma5", "ma60"]);
    }
}
