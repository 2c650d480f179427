//! 이상치 처리 방법.
//!
//! | 방법 | 처리 | 기본값 |
//! |---|---|---|
//! | Trim | 분위수 밖 → 결측 | 0.01 / 0.99 |
//! | Winsorize | 분위수 밖 → 분위수 값 | 0.01 / 0.99 |
//! | ZScore | \|z\| > t → 결측 | 3.0 |
//! | Iqr | Q1 - k·IQR ~ Q3 + k·IQR 밖 → 결측 | 1.5 |
//! | Mad | \|0.6745·(x - median)/MAD\| > t → 결측 | 3.0 |

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::normalizer::{mean_std, present, quantile_sorted, winsorize};

/// MAD를 정규분포 표준편차 척도로 맞추는 상수.
const MAD_SCALE: f64 = 0.6745;

/// 이상치 처리 방법.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum OutlierMethod {
    Trim { lower: f64, upper: f64 },
    Winsorize { lower: f64, upper: f64 },
    ZScore { threshold: f64 },
    Iqr { k: f64 },
    Mad { threshold: f64 },
}

impl Default for OutlierMethod {
    fn default() -> Self {
        OutlierMethod::Winsorize {
            lower: 0.01,
            upper: 0.99,
        }
    }
}

impl FromStr for OutlierMethod {
    type Err = String;

    /// 기본 파라미터로 생성합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trim" => Ok(OutlierMethod::Trim {
                lower: 0.01,
                upper: 0.99,
            }),
            "winsorize" => Ok(OutlierMethod::default()),
            "zscore" => Ok(OutlierMethod::ZScore { threshold: 3.0 }),
            "iqr" => Ok(OutlierMethod::Iqr { k: 1.5 }),
            "mad" => Ok(OutlierMethod::Mad { threshold: 3.0 }),
            _ => Err(format!(
                "Unknown outlier method: {}. Use one of: trim, winsorize, zscore, iqr, mad",
                s
            )),
        }
    }
}

impl OutlierMethod {
    /// 설정/메타데이터용 이름.
    pub fn name(&self) -> &'static str {
        match self {
            OutlierMethod::Trim { .. } => "trim",
            OutlierMethod::Winsorize { .. } => "winsorize",
            OutlierMethod::ZScore { .. } => "zscore",
            OutlierMethod::Iqr { .. } => "iqr",
            OutlierMethod::Mad { .. } => "mad",
        }
    }

    /// 컬럼에 이상치 처리를 적용합니다. 입력 길이와 결측 위치는 유지됩니다.
    pub fn apply(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        match *self {
            OutlierMethod::Winsorize { lower, upper } => winsorize(values, lower, upper),
            OutlierMethod::Trim { lower, upper } => {
                let Some(sorted) = sorted_present(values) else {
                    return values.to_vec();
                };
                let lo = quantile_sorted(&sorted, lower);
                let hi = quantile_sorted(&sorted, upper);
                keep_within(values, lo, hi)
            }
            OutlierMethod::ZScore { threshold } => {
                let Some((mean, std)) = mean_std(values) else {
                    return values.to_vec();
                };
                if std == 0.0 {
                    return values.to_vec();
                }
                keep_within(values, mean - threshold * std, mean + threshold * std)
            }
            OutlierMethod::Iqr { k } => {
                let Some(sorted) = sorted_present(values) else {
                    return values.to_vec();
                };
                let q1 = quantile_sorted(&sorted, 0.25);
                let q3 = quantile_sorted(&sorted, 0.75);
                let iqr = q3 - q1;
                keep_within(values, q1 - k * iqr, q3 + k * iqr)
            }
            OutlierMethod::Mad { threshold } => {
                let Some(sorted) = sorted_present(values) else {
                    return values.to_vec();
                };
                let median = quantile_sorted(&sorted, 0.5);
                let mut deviations: Vec<f64> = sorted.iter().map(|x| (x - median).abs()).collect();
                deviations.sort_by(|a, b| a.total_cmp(b));
                let mad = quantile_sorted(&deviations, 0.5);
                if mad == 0.0 {
                    return values.to_vec();
                }
                values
                    .iter()
                    .map(|v| {
                        v.filter(|x| x.is_finite())
                            .filter(|x| (MAD_SCALE * (x - median) / mad).abs() <= threshold)
                    })
                    .collect()
            }
        }
    }

    /// 이상치로 판정되어 제거(또는 클리핑)된 값의 수.
    pub fn count_affected(&self, values: &[Option<f64>]) -> usize {
        self.apply(values)
            .iter()
            .zip(values)
            .filter(|(after, before)| after != before)
            .count()
    }
}

fn sorted_present(values: &[Option<f64>]) -> Option<Vec<f64>> {
    let mut xs = present(values);
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    Some(xs)
}

fn keep_within(values: &[Option<f64>], lo: f64, hi: f64) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|v| v.filter(|x| x.is_finite() && *x >= lo && *x <= hi))
        .collect()
}
