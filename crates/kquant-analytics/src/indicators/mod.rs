//! 기술적 지표 모듈.
//!
//! 일봉 차트 감지기가 사용하는 `f64` 시계열 지표를 제공합니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표
//! - **SMA**: 단순 이동평균 (시작 구간은 확장 윈도우)
//! - **EMA**: 지수 이동평균 (ta-rs 기반)
//! - **MACD**: 이동평균 수렴/확산
//!
//! ## 모멘텀 지표
//! - **RSI**: 상대강도지수 (단순 이동평균 방식)
//!
//! ## 변동성 지표
//! - **Bollinger Bands**: 볼린저 밴드
//! - **ATR**: 평균 실제 범위
//!
//! ## 거래량 지표
//! - **Volume MA**: 거래량 이동평균
//! - **직전 N일 평균 대비 거래량 비율**
//!
//! # 사용 예시
//!
//! ```
//! use kquant_analytics::indicators::{sma, SmaParams};
//!
//! let closes = [10.0, 11.0, 12.0, 13.0];
//! let ma = sma(&closes, SmaParams { period: 3 }).unwrap();
//! assert_eq!(ma[3], 12.0);
//! ```

pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

use thiserror::Error;

pub use momentum::{rsi, RsiParams};
pub use trend::{ema, macd, sma, EmaParams, MacdParams, MacdPoint, SmaParams};
pub use volatility::{atr, bollinger_bands, AtrParams, BollingerBand, BollingerBandsParams};
pub use volume::{trailing_mean, volume_ma, volume_ratio};

/// 지표 계산 오류.
#[derive(Debug, Error, PartialEq)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

pub(crate) fn require_period(period: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }
    Ok(())
}

/// 고정 윈도우 단순 평균. 윈도우가 다 차기 전에는 `None`.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}
