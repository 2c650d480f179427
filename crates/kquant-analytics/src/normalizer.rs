//! 팩터 정규화 (윈저라이징 + Z-score).
//!
//! 팩터 컬럼 하나를 유니버스 전체에 걸쳐 정규화합니다.
//! 결측값(`None`)은 분위수/평균/표준편차 계산에서 제외되고,
//! 출력에서도 같은 위치에 결측으로 남습니다. 컬럼 간에는 절대 섞지 않습니다.

use kquant_core::NormalizerConfig;
use tracing::debug;

/// 선형 보간 분위수 (`pos = p * (n - 1)`).
///
/// 값이 비어 있으면 `None`.
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(quantile_sorted(&sorted, p))
}

/// 정렬된 값에 대한 선형 보간 분위수.
pub(crate) fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// 결측이 아닌 값들.
pub(crate) fn present(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| v.filter(|x| x.is_finite()))
        .collect()
}

/// 평균과 표본 표준편차 (n - 1).
///
/// 값이 없으면 `None`, 값이 하나면 표준편차 0.
pub fn mean_std(values: &[Option<f64>]) -> Option<(f64, f64)> {
    let xs = present(values);
    if xs.is_empty() {
        return None;
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    if xs.len() < 2 {
        return Some((mean, 0.0));
    }
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some((mean, var.sqrt()))
}

/// 상하위 분위수 밖의 값을 분위수 값으로 클리핑합니다.
pub fn winsorize(values: &[Option<f64>], lower: f64, upper: f64) -> Vec<Option<f64>> {
    let mut xs = present(values);
    if xs.is_empty() {
        return values.to_vec();
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    let lo = quantile_sorted(&xs, lower);
    let hi = quantile_sorted(&xs, upper);

    values
        .iter()
        .map(|v| v.filter(|x| x.is_finite()).map(|x| x.clamp(lo, hi)))
        .collect()
}

/// Z-score 변환 `(x - mean) / std`.
///
/// 표준편차가 0이거나 값이 하나뿐이면 결측이 아닌 값은 모두 0.0이 됩니다.
pub fn zscore(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let Some((mean, std)) = mean_std(values) else {
        return vec![None; values.len()];
    };

    let degenerate = std == 0.0 || !std.is_finite();
    if degenerate {
        debug!(mean, "표준편차 0, Z-score를 0으로 대체");
    }
    values
        .iter()
        .map(|v| {
            v.filter(|x| x.is_finite())
                .map(|x| if degenerate { 0.0 } else { (x - mean) / std })
        })
        .collect()
}

/// 윈저라이징 후 Z-score 변환.
pub fn normalize(values: &[Option<f64>], lower: f64, upper: f64) -> Vec<Option<f64>> {
    zscore(&winsorize(values, lower, upper))
}

/// 분위수 설정을 보관하는 정규화기.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Winsorizer {
    pub lower: f64,
    pub upper: f64,
}

impl Default for Winsorizer {
    fn default() -> Self {
        Self {
            lower: 0.01,
            upper: 0.99,
        }
    }
}

impl From<NormalizerConfig> for Winsorizer {
    fn from(config: NormalizerConfig) -> Self {
        Self {
            lower: config.winsorize_lower,
            upper: config.winsorize_upper,
        }
    }
}

impl Winsorizer {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// 윈저라이징.
    pub fn apply(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        winsorize(values, self.lower, self.upper)
    }

    /// 윈저라이징 + Z-score.
    pub fn normalize(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        normalize(values, self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(approx(quantile(&values, 0.5).unwrap(), 3.0));
        assert!(approx(quantile(&values, 0.25).unwrap(), 2.0));
        // pos = 0.01 * 4 = 0.04
        assert!(approx(quantile(&values, 0.01).unwrap(), 1.04));
        assert!(quantile(&[], 0.5).is_none());
    }

    #[test]
    fn test_winsorize_clips_extremes_and_keeps_missing() {
        let mut values: Vec<Option<f64>> = (1..=99).map(|i| Some(i as f64)).collect();
        values.push(Some(10_000.0));
        values.push(None);

        let clipped = winsorize(&values, 0.01, 0.99);
        assert_eq!(clipped.len(), values.len());
        assert_eq!(clipped[100], None);

        let upper = clipped[99].unwrap();
        assert!(upper < 10_000.0);
        // 99번째 백분위: pos = 0.99 * 99 = 98.01 → 99 + (10000 - 99) * 0.01
        assert!(approx(upper, 99.0 + (10_000.0 - 99.0) * 0.01));
        assert!(approx(clipped[0].unwrap(), 1.0 + 0.99));
    }

    #[test]
    fn test_zscore_sample_std() {
        let values = vec![Some(1.0), Some(2.0), Some(3.0), None];
        let z = zscore(&values);
        assert!(approx(z[0].unwrap(), -1.0));
        assert!(approx(z[1].unwrap(), 0.0));
        assert!(approx(z[2].unwrap(), 1.0));
        assert_eq!(z[3], None);
    }

    #[test]
    fn test_zscore_zero_std_is_zero() {
        let values = vec![Some(5.0), None, Some(5.0)];
        assert_eq!(zscore(&values), vec![Some(0.0), None, Some(0.0)]);

        let single = vec![None, Some(3.0)];
        assert_eq!(zscore(&single), vec![None, Some(0.0)]);
    }

    #[test]
    fn test_all_missing() {
        let values = vec![None, None];
        assert_eq!(normalize(&values, 0.01, 0.99), vec![None, None]);
    }

    #[test]
    fn test_nan_treated_as_missing() {
        let values = vec![Some(f64::NAN), Some(1.0), Some(3.0)];
        let z = zscore(&values);
        assert_eq!(z[0], None);
        assert!(approx(z[1].unwrap(), -std::f64::consts::FRAC_1_SQRT_2));
    }

    #[test]
    fn test_winsorizer_from_config() {
        let w = Winsorizer::from(NormalizerConfig {
            winsorize_lower: 0.05,
            winsorize_upper: 0.95,
        });
        assert_eq!(w, Winsorizer::new(0.05, 0.95));
    }
}
