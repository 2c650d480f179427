//! KRX 호가 단위(Tick Size) 처리.
//!
//! 신호의 현재가/목표가/손절가를 실제 주문 가능한 가격으로 맞추는 데 사용합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 호가 단위 라운딩 방법
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundMethod {
    /// 반올림
    Round,
    /// 내림 (목표가에 사용, 보수적)
    Floor,
    /// 올림 (손절가에 사용)
    Ceil,
}

/// 호가 단위 제공자 trait
pub trait TickSizeProvider: Send + Sync {
    /// 주어진 가격 구간의 호가 단위.
    fn tick_size(&self, price: Decimal) -> Decimal;

    /// 가격을 호가 단위로 라운딩합니다.
    fn round_to_tick(&self, price: Decimal, method: RoundMethod) -> Decimal {
        let tick = self.tick_size(price);
        if tick.is_zero() {
            return price;
        }

        let ticks = price / tick;
        let rounded = match method {
            RoundMethod::Round => ticks.round(),
            RoundMethod::Floor => ticks.floor(),
            RoundMethod::Ceil => ticks.ceil(),
        };

        rounded * tick
    }

    /// 가격이 호가 단위에 맞는지 검증합니다.
    fn is_valid_price(&self, price: Decimal) -> bool {
        let tick = self.tick_size(price);
        tick.is_zero() || (price % tick).is_zero()
    }
}

/// KRX (한국거래소) 7단계 호가 단위
///
/// | 가격 구간 | 호가 단위 |
/// |---|---|
/// | ~ 100원 미만 | 1원 |
/// | 100 ~ 1,000원 미만 | 5원 |
/// | 1,000 ~ 10,000원 미만 | 10원 |
/// | 10,000 ~ 50,000원 미만 | 50원 |
/// | 50,000 ~ 100,000원 미만 | 100원 |
/// | 100,000 ~ 500,000원 미만 | 500원 |
/// | 500,000원 이상 | 1,000원 |
#[derive(Debug, Clone, Copy, Default)]
pub struct KrxTickSize;

impl TickSizeProvider for KrxTickSize {
    fn tick_size(&self, price: Decimal) -> Decimal {
        const TIERS: [(Decimal, Decimal); 6] = [
            (dec!(100), dec!(1)),
            (dec!(1_000), dec!(5)),
            (dec!(10_000), dec!(10)),
            (dec!(50_000), dec!(50)),
            (dec!(100_000), dec!(100)),
            (dec!(500_000), dec!(500)),
        ];

        TIERS
            .iter()
            .find(|(upper, _)| price < *upper)
            .map(|(_, tick)| *tick)
            .unwrap_or(dec!(1_000))
    }
}
