//! 일봉 차트 패턴 신호 감지기.
//!
//! 각 감지기는 상태가 없으며 일봉 시계열의 마지막 봉(오늘)을 기준으로
//! 최대 한 개의 신호를 냅니다. 최소 봉 수보다 데이터가 짧으면 조용히 `None`을
//! 반환합니다.
//!
//! 공통 규칙:
//! - 이동평균은 단순 이동평균이며 처음 `period - 1`봉은 확장 윈도우
//! - 거래량 비율은 오늘 거래량 / 오늘을 제외한 직전 `period`봉 평균

mod accumulation;
mod box_breakout;
mod golden_cross;
mod ma_bounce;
mod registry;
mod technical;
mod triple_ma;
mod volume_breakout;

use kquant_analytics::indicators::{sma, trailing_mean, SmaParams};
use kquant_core::{closes, volumes, ChartSignal, OhlcvBar};

pub use accumulation::Accumulation;
pub use box_breakout::BoxBreakout;
pub use golden_cross::GoldenCross;
pub use ma_bounce::MaBounce;
pub use registry::{ChartDetectorRegistry, DetectorMeta};
pub use technical::technical_indicators;
pub use triple_ma::TripleMa;
pub use volume_breakout::VolumeBreakout;

/// 차트 신호 감지기.
pub trait ChartDetector: Send + Sync {
    /// 감지기 ID (영문, snake_case)
    fn id(&self) -> &'static str;

    /// 파라미터가 반영된 표시 이름
    fn name(&self) -> String;

    /// 한 줄 설명
    fn description(&self) -> String;

    /// 분석에 필요한 최소 봉 수
    fn min_bars(&self) -> usize;

    /// 시계열 마지막 봉 기준으로 신호를 판단합니다.
    fn analyze(&self, series: &[OhlcvBar], code: &str, name: &str) -> Option<ChartSignal>;
}

/// 종가 단순 이동평균.
pub(crate) fn close_sma(series: &[OhlcvBar], period: usize) -> Option<Vec<f64>> {
    sma(&closes(series), SmaParams { period }).ok()
}

/// `index`봉 거래량 / 직전 `period`봉 평균 거래량.
///
/// 앞선 봉이 `period`개보다 적으면 있는 만큼으로 평균을 냅니다.
/// 첫 봉이거나 평균이 0이면 `None`.
pub(crate) fn volume_ratio_at(series: &[OhlcvBar], index: usize, period: usize) -> Option<f64> {
    let vols = volumes(&series[..=index]);
    let avg = trailing_mean(&vols, index, period.min(index))?;
    (avg > 0.0).then(|| vols[index] / avg)
}

/// 오늘 봉의 직전 봉 대비 종가 변화율.
pub(crate) fn close_change(series: &[OhlcvBar]) -> Option<f64> {
    let n = series.len();
    if n < 2 {
        return None;
    }
    let prev = series[n - 2].close;
    (prev > 0.0).then(|| series[n - 1].close / prev - 1.0)
}
