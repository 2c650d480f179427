//! 섹터 중립 전략.
//!
//! 모멘텀 같은 팩터는 상승장에서는 성장 섹터, 하락장에서는 방어 섹터로
//! 쏠리는 경향이 있습니다. 이 전략은 전체 유니버스가 아니라 섹터 안에서
//! 순위를 매기고, 섹터별로 종목 수를 나눠 선정해 편중을 줄입니다.
//!
//! # 배분 방식
//!
//! - [`Allocation::PerSector`] - 섹터마다 최대 `k`개
//! - [`Allocation::Proportional`] - 섹터 크기에 비례해 `top_n`개를 최대 잔여법으로 배분

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kquant_analytics::{rank, zscore_rank};
use kquant_core::{FactorName, ScoredSelection, Sector, SectorWeight, StockRecord};

use super::{sort_descending, take_top, FactorStrategy, ScoringParams};

/// 섹터 내 순위 기준 팩터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorFactor {
    /// 12개월 모멘텀 (높을수록 좋음)
    #[default]
    Momentum12m,
    /// ROE (높을수록 좋음)
    Roe,
    /// PER (낮을수록 좋음, 0 이하는 결측)
    Per,
}

impl SectorFactor {
    pub fn factor(&self) -> FactorName {
        match self {
            SectorFactor::Momentum12m => FactorName::Momentum12m,
            SectorFactor::Roe => FactorName::Roe,
            SectorFactor::Per => FactorName::Per,
        }
    }

    /// 낮을수록 좋은 팩터인지.
    pub fn ascending(&self) -> bool {
        self.factor().lower_is_better()
    }

    pub(crate) fn value(&self, stock: &StockRecord) -> Option<f64> {
        match self {
            SectorFactor::Per => stock.positive_factor(FactorName::Per),
            other => stock.factor(other.factor()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.factor().as_str()
    }
}

impl std::str::FromStr for SectorFactor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "momentum_12m" | "momentum" => Ok(SectorFactor::Momentum12m),
            "roe" => Ok(SectorFactor::Roe),
            "per" => Ok(SectorFactor::Per),
            _ => Err(format!("지원하지 않는 섹터 중립 팩터: {}", s)),
        }
    }
}

/// 섹터별 종목 수 배분 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Allocation {
    /// 섹터마다 `min(k, 섹터 크기)`개
    PerSector { k: usize },
    /// 섹터 비중에 비례해 `top_n`개 배분
    Proportional,
}

impl Allocation {
    /// 섹터별 선정 종목 수.
    pub fn distribute(&self, sizes: &BTreeMap<Sector, usize>, top_n: usize) -> BTreeMap<Sector, usize> {
        match *self {
            Allocation::PerSector { k } => sizes.iter().map(|(&s, &n)| (s, k.min(n))).collect(),
            Allocation::Proportional => largest_remainder(sizes, top_n),
        }
    }
}

impl Default for Allocation {
    fn default() -> Self {
        Allocation::PerSector { k: 3 }
    }
}

/// 선정 결과 한쪽의 섹터 분포 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub distribution: Vec<SectorWeight>,
    /// 가장 큰 섹터의 비중
    pub max_sector_weight: f64,
    pub num_sectors: usize,
}

impl DistributionSummary {
    pub(crate) fn from_distribution(distribution: Vec<SectorWeight>) -> Self {
        Self {
            max_sector_weight: distribution.iter().map(|d| d.weight).fold(0.0, f64::max),
            num_sectors: distribution.len(),
            distribution,
        }
    }
}

/// 원시 팩터 상위 N 선정과 섹터 중립 선정의 분포 비교.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorComparison {
    pub raw: DistributionSummary,
    pub neutral: DistributionSummary,
}

/// 섹터 중립 전략.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectorNeutral {
    pub params: ScoringParams,
    #[serde(default)]
    pub factor: SectorFactor,
    #[serde(default)]
    pub allocation: Allocation,
}

impl SectorNeutral {
    pub const ID: &'static str = "sector_neutral";

    pub fn new(params: ScoringParams, factor: SectorFactor, allocation: Allocation) -> Self {
        Self {
            params,
            factor,
            allocation,
        }
    }

    /// 필터를 통과하고 팩터 값이 있는 종목과 윈저라이징된 팩터 값.
    fn eligible<'a>(&self, universe: &'a [StockRecord]) -> Vec<(&'a StockRecord, f64)> {
        let candidates: Vec<&StockRecord> = self
            .params
            .filter(universe)
            .into_iter()
            .filter(|s| self.factor.value(s).is_some())
            .collect();
        let raw: Vec<Option<f64>> = candidates.iter().map(|s| self.factor.value(s)).collect();
        let clipped = self.params.prepare(&raw);

        candidates
            .into_iter()
            .zip(clipped)
            .filter_map(|(stock, v)| Some((stock, v?)))
            .collect()
    }

    /// 섹터별로 묶고 섹터 안에서 점수 내림차순으로 정렬합니다.
    ///
    /// 점수는 섹터 내 순위의 Z-score로, 좋은 종목일수록 높습니다.
    fn score_by_sector<'a>(
        &self,
        eligible: &[(&'a StockRecord, f64)],
    ) -> BTreeMap<Sector, Vec<(&'a StockRecord, f64)>> {
        let mut groups: BTreeMap<Sector, Vec<(&StockRecord, f64)>> = BTreeMap::new();
        for &(stock, value) in eligible {
            groups.entry(stock.sector).or_default().push((stock, value));
        }

        for members in groups.values_mut() {
            let values: Vec<Option<f64>> = members.iter().map(|(_, v)| Some(*v)).collect();
            // 1위가 가장 낮은 Z가 되도록 순위를 매기고 부호를 뒤집는다
            let z = zscore_rank(&values, self.factor.ascending());
            for (member, z) in members.iter_mut().zip(z) {
                member.1 = -z.unwrap_or(0.0);
            }
            sort_descending(members);
        }
        groups
    }

    /// 섹터별 선정 종목 수.
    pub fn allocate(&self, sizes: &BTreeMap<Sector, usize>) -> BTreeMap<Sector, usize> {
        self.allocation.distribute(sizes, self.params.top_n)
    }

    /// 원시 팩터 기준 전체 상위 N과 섹터 중립 결과의 섹터 분포를 비교합니다.
    pub fn compare_with_raw(&self, universe: &[StockRecord], date: NaiveDate) -> SectorComparison {
        let eligible = self.eligible(universe);
        let values: Vec<Option<f64>> = eligible.iter().map(|(_, v)| Some(*v)).collect();
        let ranks = rank(&values, self.factor.ascending());

        let mut raw_rows: Vec<(&StockRecord, f64)> = eligible
            .iter()
            .zip(ranks)
            .map(|(&(stock, _), r)| (stock, -r.unwrap_or(f64::INFINITY)))
            .collect();
        sort_descending(&mut raw_rows);

        let neutral = self.select(universe, date);
        let raw_top_n = match self.allocation {
            Allocation::Proportional => self.params.top_n,
            Allocation::PerSector { .. } => neutral.selected_count,
        };
        let raw = ScoredSelection::from_ranked("raw", date, universe.len(), take_top(raw_rows, raw_top_n));

        SectorComparison {
            raw: DistributionSummary::from_distribution(raw.sector_distribution()),
            neutral: DistributionSummary::from_distribution(neutral.sector_distribution()),
        }
    }
}

impl FactorStrategy for SectorNeutral {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "섹터 중립"
    }

    fn select(&self, universe: &[StockRecord], date: NaiveDate) -> ScoredSelection {
        let eligible = self.eligible(universe);
        let groups = self.score_by_sector(&eligible);
        let sizes: BTreeMap<Sector, usize> = groups.iter().map(|(&s, m)| (s, m.len())).collect();
        let allocation = self.allocate(&sizes);
        debug!(?allocation, "섹터별 배분");

        let rows = take_per_sector(groups, &allocation);
        let count = rows.len();

        let mut selection = self
            .params
            .annotate(ScoredSelection::from_ranked(
                Self::ID,
                date,
                universe.len(),
                take_top(rows, count),
            ))
            .with_metadata("factor", self.factor.factor().as_str())
            .with_metadata("eligible", eligible.len());
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

/// 섹터별 배분 수만큼 앞에서부터 뽑아 점수 내림차순으로 합칩니다.
///
/// 각 섹터 목록은 이미 점수 내림차순이어야 합니다.
pub(crate) fn take_per_sector<'a>(
    groups: BTreeMap<Sector, Vec<(&'a StockRecord, f64)>>,
    allocation: &BTreeMap<Sector, usize>,
) -> Vec<(&'a StockRecord, f64)> {
    let mut rows: Vec<(&StockRecord, f64)> = groups
        .into_iter()
        .flat_map(|(sector, members)| {
            let take = allocation.get(&sector).copied().unwrap_or(0);
            members.into_iter().take(take)
        })
        .collect();
    sort_descending(&mut rows);
    rows
}

/// 최대 잔여법(largest remainder) 배분.
///
/// 1. 각 섹터의 몫 `top_n × 크기 / 전체`의 내림값을 먼저 배분
/// 2. 남은 수량은 소수부가 큰 섹터부터 1개씩 (동률이면 큰 섹터, 그다음 섹터 순서)
/// 3. 섹터 크기를 넘을 수 없으며, 넘친 수량은 같은 순서로 다른 섹터에 재배분
///
/// 합계는 `min(top_n, 전체 종목 수)`입니다.
pub(crate) fn largest_remainder(
    sizes: &BTreeMap<Sector, usize>,
    top_n: usize,
) -> BTreeMap<Sector, usize> {
    let total: usize = sizes.values().sum();
    let mut allocation: BTreeMap<Sector, usize> = sizes.keys().map(|&s| (s, 0)).collect();
    if total == 0 || top_n == 0 {
        return allocation;
    }

    let mut order: Vec<(Sector, usize, f64)> = Vec::with_capacity(sizes.len());
    for (&sector, &size) in sizes {
        let quota = top_n as f64 * size as f64 / total as f64;
        let base = (quota.floor() as usize).min(size);
        allocation.insert(sector, base);
        order.push((sector, size, quota - quota.floor()));
    }
    order.sort_by(|a, b| {
        b.2.total_cmp(&a.2)
            .then_with(|| b.1.cmp(&a.1))
            .then_with(|| a.0.cmp(&b.0))
    });

    let target = top_n.min(total);
    let mut remaining = target.saturating_sub(allocation.values().sum());
    while remaining > 0 {
        let mut progressed = false;
        for &(sector, size, _) in &order {
            if remaining == 0 {
                break;
            }
            if let Some(slot) = allocation.get_mut(&sector) {
                if *slot < size {
                    *slot += 1;
                    remaining -= 1;
                    progressed = true;
                }
            }
        }
        if !progressed {
            break;
        }
    }
    allocation
}
