//! 멀티팩터 전략.
//!
//! 세 팩터 그룹을 각각 Z-score로 만든 뒤 가중 합산합니다.
//!
//! | 그룹 | 구성 |
//! |------|------|
//! | 품질 | mean(Z(ROE), Z(GPA)) |
//! | 가치 | mean(Z(1/PER), Z(1/PBR)) |
//! | 모멘텀 | Z(2 × 3개월 + 6개월) |
//!
//! 각 원시 컬럼은 Z-score 전에 이상치 처리(설정 시)와 윈저라이징을 거칩니다.
//! 한 그룹이라도 계산할 수 없는 종목은 후보에서 제외합니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use kquant_analytics::zscore;
use kquant_core::{FactorName, FactorWeights, ScoredSelection, StockRecord};

use super::{sort_descending, take_top, FactorStrategy, ScoringParams};

/// 종목별 팩터 그룹 점수.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorComponents {
    pub code: String,
    pub quality: f64,
    pub value: f64,
    pub momentum: f64,
}

impl FactorComponents {
    /// 가중 합산 점수.
    pub fn composite(&self, weights: &FactorWeights) -> f64 {
        weights.quality * self.quality + weights.value * self.value + weights.momentum * self.momentum
    }
}

/// 팩터 그룹 간 피어슨 상관계수.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorCorrelations {
    pub quality_value: f64,
    pub quality_momentum: f64,
    pub value_momentum: f64,
}

/// 멀티팩터 전략.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultiFactor {
    pub params: ScoringParams,
    #[serde(default)]
    pub weights: FactorWeights,
}

impl MultiFactor {
    pub const ID: &'static str = "multi_factor";

    pub fn new(params: ScoringParams, weights: FactorWeights) -> Self {
        Self { params, weights }
    }

    /// 공통 필터를 통과하고 세 그룹 점수가 모두 있는 종목의 그룹 점수.
    ///
    /// 결과 순서는 유니버스 순서와 같습니다.
    pub fn components<'a>(&self, universe: &'a [StockRecord]) -> Vec<(&'a StockRecord, FactorComponents)> {
        let candidates = self.params.filter(universe);

        let z = |f: fn(&StockRecord) -> Option<f64>| -> Vec<Option<f64>> {
            let raw: Vec<Option<f64>> = candidates.iter().map(|s| f(s)).collect();
            zscore(&self.params.prepare(&raw))
        };

        let roe = z(|s| s.factor(FactorName::Roe));
        let gpa = z(|s| s.factor(FactorName::Gpa));
        let inv_per = z(|s| inverse(s, FactorName::Per));
        let inv_pbr = z(|s| inverse(s, FactorName::Pbr));
        // 단기(3개월) 2 : 중기(6개월) 1
        let momentum = z(|s| {
            let m3 = s.factor(FactorName::Momentum3m)?;
            let m6 = s.factor(FactorName::Momentum6m)?;
            Some(2.0 * m3 + m6)
        });

        candidates
            .iter()
            .enumerate()
            .filter_map(|(i, &stock)| {
                let components = FactorComponents {
                    code: stock.code.clone(),
                    quality: (roe[i]? + gpa[i]?) / 2.0,
                    value: (inv_per[i]? + inv_pbr[i]?) / 2.0,
                    momentum: momentum[i]?,
                };
                Some((stock, components))
            })
            .collect()
    }

    /// 세 그룹 점수 간 상관계수. 종목이 2개 미만이면 `None`.
    pub fn factor_correlations(&self, universe: &[StockRecord]) -> Option<FactorCorrelations> {
        let components = self.components(universe);
        if components.len() < 2 {
            return None;
        }
        let quality: Vec<f64> = components.iter().map(|(_, c)| c.quality).collect();
        let value: Vec<f64> = components.iter().map(|(_, c)| c.value).collect();
        let momentum: Vec<f64> = components.iter().map(|(_, c)| c.momentum).collect();

        Some(FactorCorrelations {
            quality_value: pearson(&quality, &value),
            quality_momentum: pearson(&quality, &momentum),
            value_momentum: pearson(&value, &momentum),
        })
    }
}

impl FactorStrategy for MultiFactor {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "멀티팩터"
    }

    fn select(&self, universe: &[StockRecord], date: NaiveDate) -> ScoredSelection {
        let mut rows: Vec<(&StockRecord, f64)> = self
            .components(universe)
            .into_iter()
            .map(|(stock, c)| (stock, c.composite(&self.weights)))
            .collect();
        sort_descending(&mut rows);

        let eligible = rows.len();
        let mut selection = self
            .params
            .annotate(ScoredSelection::from_ranked(
                Self::ID,
                date,
                universe.len(),
                take_top(rows, self.params.top_n),
            ))
            .with_metadata("eligible", eligible)
            .with_metadata("weight_quality", self.weights.quality)
            .with_metadata("weight_value", self.weights.value)
            .with_metadata("weight_momentum", self.weights.momentum);

        if !self.weights.is_normalized() {
            warn!(sum = self.weights.sum(), "멀티팩터 가중치 합계가 1이 아닙니다");
            selection.warn(format!(
                "가중치 합계가 1이 아닙니다 ({:.4}). 점수 규모가 달라질 수 있습니다",
                self.weights.sum()
            ));
        }

        info!(
            strategy = Self::ID,
            total = selection.total_candidates,
            selected = selection.selected_count,
            "종목 선정 완료"
        );
        selection
    }
}

/// 양수인 배수의 역수 (이익/가격 형태로 변환).
fn inverse(stock: &StockRecord, factor: FactorName) -> Option<f64> {
    stock.positive_factor(factor).map(|v| 1.0 / v)
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len()) as f64;
    if n < 2.0 {
        return 0.0;
    }
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let (mut cov, mut vx, mut vy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        cov += (a - mx) * (b - my);
        vx += (a - mx).powi(2);
        vy += (b - my).powi(2);
    }
    if vx == 0.0 || vy == 0.0 {
        0.0
    } else {
        cov / (vx.sqrt() * vy.sqrt())
    }
}
