//! 팩터 전략의 종목 선정 결과.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::stock::{FactorName, Sector, StockRecord};

/// 선정된 종목 한 건.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredStock {
    pub stock: StockRecord,
    /// 전략 점수 (마법공식 순위합 모드에서는 낮을수록 좋음)
    pub score: f64,
    /// 1부터 시작하는 순위
    pub rank: usize,
}

/// 섹터별 선정 분포.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorWeight {
    pub sector: Sector,
    pub count: usize,
    pub avg_score: f64,
    /// 선정 종목 중 비중
    pub weight: f64,
}

/// 팩터 요약 통계 (선정 종목 기준).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorStats {
    pub factor: FactorName,
    pub count: usize,
    pub mean: f64,
    /// 표본 표준편차 (값이 1개 이하면 0)
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// 종목 선정 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSelection {
    /// 전략 ID
    pub strategy: String,
    /// 평가일
    pub date: NaiveDate,
    /// 순위순 선정 종목
    pub stocks: Vec<ScoredStock>,
    /// 필터 적용 전 후보 수
    pub total_candidates: usize,
    /// 선정 종목 수
    pub selected_count: usize,
    /// 전략 파라미터
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// 사용자에게 표시할 경고 (치명적이지 않음)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ScoredSelection {
    /// 이미 정렬된 (종목, 점수) 목록으로부터 결과를 생성합니다.
    ///
    /// 순위는 입력 순서대로 1부터 부여됩니다.
    pub fn from_ranked(
        strategy: impl Into<String>,
        date: NaiveDate,
        total_candidates: usize,
        ranked: Vec<(StockRecord, f64)>,
    ) -> Self {
        let stocks: Vec<ScoredStock> = ranked
            .into_iter()
            .enumerate()
            .map(|(i, (stock, score))| ScoredStock {
                stock,
                score,
                rank: i + 1,
            })
            .collect();

        let mut selection = Self {
            strategy: strategy.into(),
            date,
            selected_count: stocks.len(),
            stocks,
            total_candidates,
            metadata: BTreeMap::new(),
            warnings: Vec::new(),
        };
        if selection.stocks.is_empty() {
            selection.warn("선정된 종목이 없습니다. 필터 조건을 확인하세요");
        }
        selection
    }

    /// 파라미터 메타데이터를 추가합니다.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 경고를 추가합니다.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// 선정된 종목 코드 목록 (순위순).
    pub fn codes(&self) -> Vec<&str> {
        self.stocks.iter().map(|s| s.stock.code.as_str()).collect()
    }

    /// 섹터별 분포 (종목 수 내림차순, 동수이면 섹터 순서).
    pub fn sector_distribution(&self) -> Vec<SectorWeight> {
        let mut groups: BTreeMap<Sector, (usize, f64)> = BTreeMap::new();
        for s in &self.stocks {
            let entry = groups.entry(s.stock.sector).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += s.score;
        }

        let total = self.stocks.len().max(1) as f64;
        let mut dist: Vec<SectorWeight> = groups
            .into_iter()
            .map(|(sector, (count, sum))| SectorWeight {
                sector,
                count,
                avg_score: sum / count as f64,
                weight: count as f64 / total,
            })
            .collect();
        dist.sort_by(|a, b| b.count.cmp(&a.count));
        dist
    }

    /// 선정 종목의 팩터별 요약 통계. 값이 하나도 없는 팩터는 생략합니다.
    pub fn factor_summary(&self) -> Vec<FactorStats> {
        FactorName::ALL
            .iter()
            .filter_map(|&factor| {
                let values: Vec<f64> = self
                    .stocks
                    .iter()
                    .filter_map(|s| s.stock.factor(factor))
                    .collect();
                if values.is_empty() {
                    return None;
                }
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                let std = if values.len() > 1 {
                    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
                } else {
                    0.0
                };
                Some(FactorStats {
                    factor,
                    count: values.len(),
                    mean,
                    std,
                    min: values.iter().copied().fold(f64::INFINITY, f64::min),
                    max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                })
            })
            .collect()
    }

    /// 선정 결과 요약 문자열.
    pub fn explain(&self) -> String {
        let mut lines = vec![
            format!("전략: {}", self.strategy),
            format!("선정일: {}", self.date),
            String::new(),
            format!("후보 종목 수: {}개", self.total_candidates),
            format!("선정 종목 수: {}개", self.selected_count),
            String::new(),
            "상위 5개 종목:".to_string(),
        ];
        for s in self.stocks.iter().take(5) {
            lines.push(format!("  - {}: 점수 {:.4}", s.stock.name, s.score));
        }
        for w in &self.warnings {
            lines.push(format!("경고: {}", w));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stock::Market;

    fn stock(code: &str, sector: Sector, roe: f64) -> StockRecord {
        StockRecord::new(code, format!("종목{}", code), Market::Kospi, sector)
            .with_factor(FactorName::Roe, roe)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
    }

    #[test]
    fn test_ranks_are_one_based() {
        let selection = ScoredSelection::from_ranked(
            "magic_formula",
            date(),
            10,
            vec![(stock("A", Sector::It, 0.1), 3.0), (stock("B", Sector::Bio, 0.2), 5.0)],
        );
        let ranks: Vec<_> = selection.stocks.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
        assert_eq!(selection.selected_count, 2);
        assert_eq!(selection.total_candidates, 10);
        assert!(selection.warnings.is_empty());
    }

    #[test]
    fn test_empty_selection_warns() {
        let selection = ScoredSelection::from_ranked("multi_factor", date(), 5, vec![]);
        assert_eq!(selection.warnings.len(), 1);
        assert!(selection.explain().contains("경고"));
    }

    #[test]
    fn test_sector_distribution() {
        let selection = ScoredSelection::from_ranked(
            "sector_neutral",
            date(),
            3,
            vec![
                (stock("A", Sector::Bio, 0.1), 1.0),
                (stock("B", Sector::It, 0.2), 2.0),
                (stock("C", Sector::It, 0.3), 4.0),
            ],
        );
        let dist = selection.sector_distribution();
        assert_eq!(dist[0].sector, Sector::It);
        assert_eq!(dist[0].count, 2);
        assert!((dist[0].avg_score - 3.0).abs() < 1e-12);
        assert!((dist[0].weight - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(dist[1].sector, Sector::Bio);
    }

    #[test]
    fn test_factor_summary() {
        let selection = ScoredSelection::from_ranked(
            "multi_factor",
            date(),
            2,
            vec![(stock("A", Sector::It, 0.1), 1.0), (stock("B", Sector::It, 0.3), 0.5)],
        );
        let summary = selection.factor_summary();
        assert_eq!(summary.len(), 1);
        let roe = &summary[0];
        assert_eq!(roe.factor, FactorName::Roe);
        assert!((roe.mean - 0.2).abs() < 1e-12);
        assert!((roe.min - 0.1).abs() < 1e-12);
        assert!((roe.max - 0.3).abs() < 1e-12);
    }
}
