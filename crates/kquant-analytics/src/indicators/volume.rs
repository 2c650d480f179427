//! 거래량 지표 (Volume Indicators).

use super::{require_period, IndicatorResult};

/// 거래량 이동평균. 시작 구간은 확장 윈도우입니다.
pub fn volume_ma(volumes: &[f64], period: usize) -> IndicatorResult<Vec<f64>> {
    super::trend::sma(volumes, super::SmaParams { period })
}

/// `values[end - period..end]`의 평균 (당일 `end`는 제외).
///
/// 앞선 값이 `period`개보다 적으면 `None`.
pub fn trailing_mean(values: &[f64], end: usize, period: usize) -> Option<f64> {
    if period == 0 || end < period || end > values.len() {
        return None;
    }
    let window = &values[end - period..end];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// 각 시점 거래량을 직전 `period`일 평균으로 나눈 비율.
///
/// 직전 평균이 없거나 0이면 `None`.
pub fn volume_ratio(volumes: &[f64], period: usize) -> IndicatorResult<Vec<Option<f64>>> {
    require_period(period)?;

    Ok((0..volumes.len())
        .map(|i| {
            trailing_mean(volumes, i, period)
                .filter(|avg| *avg > 0.0)
                .map(|avg| volumes[i] / avg)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_mean_excludes_current() {
        let volumes = [100.0, 100.0, 100.0, 400.0];
        assert_eq!(trailing_mean(&volumes, 3, 3), Some(100.0));
        assert_eq!(trailing_mean(&volumes, 2, 3), None);
        assert_eq!(trailing_mean(&volumes, 5, 3), None);
    }

    #[test]
    fn test_volume_ratio() {
        let volumes = [100.0, 100.0, 100.0, 250.0];
        let ratios = volume_ratio(&volumes, 3).unwrap();
        assert_eq!(ratios[..3], [None, None, None]);
        assert_eq!(ratios[3], Some(2.5));
    }

    #[test]
    fn test_volume_ratio_zero_average() {
        let volumes = [0.0, 0.0, 10.0];
        assert_eq!(volume_ratio(&volumes, 2).unwrap()[2], None);
    }

    #[test]
    fn test_volume_ma_expanding() {
        let ma = volume_ma(&[10.0, 20.0, 30.0], 2).unwrap();
        assert_eq!(ma, vec![10.0, 15.0, 25.0]);
    }
}
