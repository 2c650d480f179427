//! 종목별 0-100 퀀트 점수.
//!
//! 유니버스 순위 없이 종목 한 건의 팩터 값만으로 전략별 요약 점수를 계산합니다.
//! 조회 화면에서 "이 종목은 각 전략 관점에서 어느 정도인가"를 보여주는 용도입니다.

use kquant_core::{FactorName, StockRecord};
use serde::{Deserialize, Serialize};

/// 전략별 0-100 점수.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantScores {
    /// 마법공식 (ROC, 이익수익률)
    pub magic: f64,
    /// 품질 (ROE, GPA)
    pub quality: f64,
    /// 가치 (PER, PBR)
    pub value: f64,
    /// 모멘텀 (3개월, 6개월)
    pub momentum: f64,
    /// 멀티팩터 (품질 0.33 + 가치 0.33 + 모멘텀 0.34)
    pub multi: f64,
    /// 섹터 중립 (ROE)
    pub sector: f64,
}

fn clamp100(x: f64) -> f64 {
    x.clamp(0.0, 100.0)
}

/// 양수일 때만 `x * scale`을 0-100으로 제한, 아니면 0.
fn positive_score(x: Option<f64>, scale: f64) -> f64 {
    match x {
        Some(v) if v > 0.0 => clamp100(v * scale),
        _ => 0.0,
    }
}

impl QuantScores {
    /// 종목 스냅샷으로부터 점수를 계산합니다.
    ///
    /// 결측 팩터는 해당 구성요소를 0점(가치 배수는 중립 50점)으로 처리합니다.
    pub fn from_record(record: &StockRecord) -> Self {
        let roe = record.factor(FactorName::Roe);
        let gpa = record.factor(FactorName::Gpa).unwrap_or(0.0);

        let magic = (positive_score(record.factor(FactorName::Roc), 500.0)
            + positive_score(record.factor(FactorName::EarningsYield), 500.0))
            / 2.0;

        let quality = match roe {
            Some(r) if r > 0.0 => clamp100((r * 200.0 + gpa * 200.0) / 2.0),
            _ => 0.0,
        };

        let per_score = record
            .positive_factor(FactorName::Per)
            .map_or(50.0, |per| (100.0 - per * 3.0).max(0.0));
        let pbr_score = record
            .positive_factor(FactorName::Pbr)
            .map_or(50.0, |pbr| (100.0 - pbr * 20.0).max(0.0));
        let value = (per_score + pbr_score) / 2.0;

        let m3 = record.factor(FactorName::Momentum3m).unwrap_or(0.0);
        let m6 = record.factor(FactorName::Momentum6m).unwrap_or(0.0);
        let momentum = clamp100(50.0 + m3 * 100.0 + m6 * 50.0);

        Self {
            magic,
            quality,
            value,
            momentum,
            multi: quality * 0.33 + value * 0.33 + momentum * 0.34,
            sector: positive_score(roe, 400.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kquant_core::{Market, Sector};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_full_record() {
        let record = StockRecord::new("005930", "삼성전자", Market::Kospi, Sector::It)
            .with_factor(FactorName::Roc, 0.12)
            .with_factor(FactorName::EarningsYield, 0.08)
            .with_factor(FactorName::Roe, 0.15)
            .with_factor(FactorName::Gpa, 0.25)
            .with_factor(FactorName::Per, 10.0)
            .with_factor(FactorName::Pbr, 1.5)
            .with_factor(FactorName::Momentum3m, 0.1)
            .with_factor(FactorName::Momentum6m, -0.2);

        let scores = QuantScores::from_record(&record);
        assert!(approx(scores.magic, (60.0 + 40.0) / 2.0));
        assert!(approx(scores.quality, 40.0));
        assert!(approx(scores.value, (70.0 + 70.0) / 2.0));
        assert!(approx(scores.momentum, 50.0));
        assert!(approx(scores.multi, 40.0 * 0.33 + 70.0 * 0.33 + 50.0 * 0.34));
        assert!(approx(scores.sector, 60.0));
    }

    #[test]
    fn test_missing_and_negative_inputs() {
        let record = StockRecord::new("000001", "적자기업", Market::Kosdaq, Sector::Etc)
            .with_factor(FactorName::Roe, -0.05)
            .with_factor(FactorName::Per, -8.0)
            .with_factor(FactorName::Momentum3m, 1.0);

        let scores = QuantScores::from_record(&record);
        assert_eq!(scores.magic, 0.0);
        assert_eq!(scores.quality, 0.0);
        assert_eq!(scores.value, 50.0);
        assert_eq!(scores.momentum, 100.0);
        assert_eq!(scores.sector, 0.0);
    }
}
