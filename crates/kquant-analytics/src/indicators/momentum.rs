//! 모멘텀 지표 (Momentum Indicators).

use serde::{Deserialize, Serialize};

use super::{require_period, rolling_mean, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// RSI (Relative Strength Index).
///
/// RSI = 100 - 100 / (1 + RS), RS = 평균 상승폭 / 평균 하락폭.
/// 평균은 최근 `period`개 가격 변화의 단순 평균입니다.
/// 첫 번째 값의 변화는 0으로 간주하므로 `period - 1`번째부터 값이 나옵니다.
/// 하락이 전혀 없으면 100, 변화가 전혀 없으면 50입니다.
pub fn rsi(prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
    require_period(params.period)?;

    let deltas: Vec<f64> = (0..prices.len())
        .map(|i| if i == 0 { 0.0 } else { prices[i] - prices[i - 1] })
        .collect();
    let gains: Vec<f64> = deltas.iter().map(|d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|d| (-d).max(0.0)).collect();

    let avg_gain = rolling_mean(&gains, params.period);
    let avg_loss = rolling_mean(&losses, params.period);

    Ok(avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(g), Some(l)) => Some(if l == 0.0 {
                if g == 0.0 {
                    50.0
                } else {
                    100.0
                }
            } else {
                100.0 - 100.0 / (1.0 + g / l)
            }),
            _ => None,
        })
        .collect())
}
