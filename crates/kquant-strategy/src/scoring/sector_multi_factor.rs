//! 섹터 중립 멀티팩터 전략.
//!
//! 팩터마다 섹터 안에서 `Z-Score(Rank)`를 구해 가중 합산합니다.
//! 기본 팩터는 ROE(높을수록), PER(낮을수록), 12개월 모멘텀(높을수록)이며 가중치는 균등입니다.
//! 한 팩터라도 없는 종목은 제외하고, 선정 수량은 [`Allocation`]으로 섹터별로 나눕니다.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kquant_analytics::{combine_factors, combine_sector_neutral, FactorColumn};
use kquant_core::{ScoredSelection, Sector, StockRecord};

use super::sector_neutral::take_per_sector;
use super::{
    sort_descending, take_top, Allocation, DistributionSummary, FactorStrategy, ScoringParams,
    SectorComparison, SectorFactor,
};

/// 가중치가 붙은 섹터 중립 팩터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedFactor {
    pub factor: SectorFactor,
    pub weight: f64,
}

/// 섹터 중립 멀티팩터 전략.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorNeutralMultiFactor {
    pub params: ScoringParams,
    pub factors: Vec<WeightedFactor>,
    #[serde(default)]
    pub allocation: Allocation,
}

impl Default for SectorNeutralMultiFactor {
    fn default() -> Self {
        Self::new(
            ScoringParams::default(),
            &[SectorFactor::Roe, SectorFactor::Per, SectorFactor::Momentum12m],
            Allocation::default(),
        )
    }
}

impl SectorNeutralMultiFactor {
    pub const ID: &'static str = "sector_neutral_multi_factor";

    /// 균등 가중치로 생성합니다.
    pub fn new(params: ScoringParams, factors: &[SectorFactor], allocation: Allocation) -> Self {
        let weight = if factors.is_empty() {
            0.0
        } else {
            1.0 / factors.len() as f64
        };
        Self {
            params,
            factors: factors
                .iter()
                .map(|&factor| WeightedFactor { factor, weight })
                .collect(),
            allocation,
        }
    }

    pub fn with_weights(mut self, factors: Vec<WeightedFactor>) -> Self {
        self.factors = factors;
        self
    }

    /// 필터를 통과한 후보와 팩터별 전처리된 컬럼.
    fn columns<'a>(&self, universe: &'a [StockRecord]) -> (Vec<&'a StockRecord>, Vec<Vec<Option<f64>>>) {
        let candidates = self.params.filter(universe);
        let columns = self
            .factors
            .iter()
            .map(|wf| {
                let raw: Vec<Option<f64>> = candidates.iter().map(|s| wf.factor.value(s)).collect();
                self.params.prepare(&raw)
            })
            .collect();
        (candidates, columns)
    }

    fn factor_columns<'c>(&self, columns: &'c [Vec<Option<f64>>]) -> Vec<FactorColumn<'c>> {
        self.factors
            .iter()
            .zip(columns)
            .map(|(wf, values)| FactorColumn {
                values,
                ascending: wf.factor.ascending(),
                weight: wf.weight,
            })
            .collect()
    }

    /// 섹터 중립 복합 점수 (높을수록 좋음). 결과 순서는 필터 통과 순서와 같습니다.
    pub fn scores<'a>(&self, universe: &'a [StockRecord]) -> Vec<(&'a StockRecord, f64)> {
        let (candidates, columns) = self.columns(universe);
        let sectors: Vec<Sector> = candidates.iter().map(|s| s.sector).collect();
        // 1위가 가장 낮은 Z이므로 부호를 뒤집는다
        let combined = combine_sector_neutral(&self.factor_columns(&columns), &sectors);

        candidates
            .into_iter()
            .zip(combined)
            .filter_map(|(stock, z)| Some((stock, -z?)))
            .collect()
    }

    /// 섹터 구분 없이 같은 팩터를 전체 유니버스에서 결합한 상위 N과 섹터 분포를 비교합니다.
    pub fn compare_with_global(&self, universe: &[StockRecord], date: NaiveDate) -> SectorComparison {
        let (candidates, columns) = self.columns(universe);
        let combined = combine_factors(&self.factor_columns(&columns));

        let mut global_rows: Vec<(&StockRecord, f64)> = candidates
            .into_iter()
            .zip(combined)
            .filter_map(|(stock, z)| Some((stock, -z?)))
            .collect();
        sort_descending(&mut global_rows);

        let neutral = self.select(universe, date);
        let global_top_n = match self.allocation {
            Allocation::Proportional => self.params.top_n,
            Allocation::PerSector { .. } => neutral.selected_count,
        };
        let global = ScoredSelection::from_ranked(
            "global",
            date,
            universe.len(),
            take_top(global_rows, global_top_n),
        );

        SectorComparison {
            raw: DistributionSummary::from_distribution(global.sector_distribution()),
            neutral: DistributionSummary::from_distribution(neutral.sector_distribution()),
        }
    }
}

impl FactorStrategy for SectorNeutralMultiFactor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "섹터 중립 멀티팩터"
    }

    fn select(&self, universe: &[StockRecord], date: NaiveDate) -> ScoredSelection {
        let scored = self.scores(universe);
        let eligible = scored.len();

        let mut groups: BTreeMap<Sector, Vec<(&StockRecord, f64)>> = BTreeMap::new();
        for (stock, score) in scored {
            groups.entry(stock.sector).or_default().push((stock, score));
        }
        for members in groups.values_mut() {
            sort_descending(members);
        }
        let sizes: BTreeMap<Sector, usize> = groups.iter().map(|(&s, m)| (s, m.len())).collect();
        let allocation = self.allocation.distribute(&sizes, self.params.top_n);
        debug!(?allocation, "섹터별 배분");

        let rows = take_per_sector(groups, &allocation);
        let count = rows.len();
        let factors: Vec<&str> = self.factors.iter().map(|wf| wf.factor.as_str()).collect();

        let mut selection = self
            .params
            .annotate(ScoredSelection::from_ranked(
                Self::ID,
                date,
                universe.len(),
                take_top(rows, count),
            ))
            .with_metadata("factors", factors.join(","))
            .with_metadata("eligible", eligible);
        selection = match self.allocation {
            Allocation::PerSector { k } => selection.with_metadata("stocks_per_sector", k),
            Allocation::Proportional => selection.with_metadata("allocation", "proportional"),
        };

        info!(
            strategy = Self::ID,
            total = selection.total_candidates,
            selected = selection.selected_count,
            sectors = sizes.len(),
            "종목 선정 완료"
        );
        selection
    }
}
