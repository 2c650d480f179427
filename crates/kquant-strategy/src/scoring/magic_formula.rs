//! 마법공식 (Magic Formula).
//!
//! 조엘 그린블라트의 마법공식:
//! 1. 이익수익률(EBIT / EV) 내림차순 순위
//! 2. 투하자본수익률(EBIT / 투하자본) 내림차순 순위
//! 3. 두 순위의 합이 작은 순으로 선정
//!
//! 간편 모드는 재무제표 대신 ROE와 PER만으로 점수를 냅니다:
//! `Z(ROE) + Z(1 / PER)`, 높을수록 좋음.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kquant_analytics::{rank, zscore};
use kquant_core::{FactorName, ScoredSelection, StockRecord};

use super::{sort_ascending, sort_descending, take_top, FactorStrategy, ScoringParams};

/// 마법공식 전략.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MagicFormula {
    pub params: ScoringParams,
    /// ROE + 1/PER 간편 모드
    #[serde(default)]
    pub use_simplified: bool,
}

impl MagicFormula {
    pub const ID: &'static str = "magic_formula";

    pub fn new(params: ScoringParams) -> Self {
        Self {
            params,
            use_simplified: false,
        }
    }

    pub fn simplified(mut self, enabled: bool) -> Self {
        self.use_simplified = enabled;
        self
    }

    /// 순위합 (낮을수록 좋음).
    ///
    /// 두 팩터는 필터를 통과한 후보 전체에서 각각 순위를 매깁니다. 양수가 아닌 값은
    /// 해당 팩터 순위에서만 결측이 되고, 어느 한쪽 순위라도 없으면 합산 단계에서 제외됩니다.
    fn rank_sum<'a>(&self, candidates: &[&'a StockRecord]) -> Vec<(&'a StockRecord, f64)> {
        let column = |factor: FactorName| -> Vec<Option<f64>> {
            let raw: Vec<Option<f64>> =
                candidates.iter().map(|s| s.positive_factor(factor)).collect();
            self.params.prepare(&raw)
        };
        let ey_rank = rank(&column(FactorName::EarningsYield), false);
        let roc_rank = rank(&column(FactorName::Roc), false);

        let mut rows: Vec<(&StockRecord, f64)> = candidates
            .iter()
            .copied()
            .zip(ey_rank.into_iter().zip(roc_rank))
            .filter_map(|(stock, (ey, roc))| Some((stock, ey? + roc?)))
            .collect();
        sort_ascending(&mut rows);
        rows
    }

    /// `Z(ROE) + Z(1 / PER)` (높을수록 좋음). ROE 또는 PER이 양수가 아니면 제외.
    ///
    /// 두 컬럼 모두 같은 전처리(이상치 처리, 윈저라이징)를 거친 뒤 Z-Score로 변환합니다.
    fn simplified_scores<'a>(&self, candidates: &[&'a StockRecord]) -> Vec<(&'a StockRecord, f64)> {
        let eligible: Vec<&StockRecord> = candidates
            .iter()
            .copied()
            .filter(|s| {
                s.positive_factor(FactorName::Roe).is_some()
                    && s.positive_factor(FactorName::Per).is_some()
            })
            .collect();

        let roe: Vec<Option<f64>> = eligible
            .iter()
            .map(|s| s.positive_factor(FactorName::Roe))
            .collect();
        let earnings_to_price: Vec<Option<f64>> = eligible
            .iter()
            .map(|s| s.positive_factor(FactorName::Per).map(|per| 1.0 / per))
            .collect();

        let z_roe = zscore(&self.params.prepare(&roe));
        let z_ep = zscore(&self.params.prepare(&earnings_to_price));

        let mut rows: Vec<(&StockRecord, f64)> = eligible
            .into_iter()
            .zip(z_roe.into_iter().zip(z_ep))
            .filter_map(|(stock, (a, b))| Some((stock, a? + b?)))
            .collect();
        sort_descending(&mut rows);
        rows
    }
}

impl FactorStrategy for MagicFormula {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "마법공식"
    }

    fn select(&self, universe: &[StockRecord], date: NaiveDate) -> ScoredSelection {
        let candidates = self.params.filter(universe);
        let rows = if self.use_simplified {
            self.simplified_scores(&candidates)
        } else {
            self.rank_sum(&candidates)
        };
        debug!(
            filtered = candidates.len(),
            eligible = rows.len(),
            "마법공식 후보 집계"
        );

        let eligible = rows.len();
        let selection = ScoredSelection::from_ranked(
            Self::ID,
            date,
            universe.len(),
            take_top(rows, self.params.top_n),
        );
        let selection = self
            .params
            .annotate(selection)
            .with_metadata("mode", if self.use_simplified { "simplified" } else { "rank_sum" })
            .with_metadata("eligible", eligible);

        info!(
            strategy = Self::ID,
            total = selection.total_candidates,
            selected = selection.selected_count,
            "종목 선정 완료"
        );
        selection
    }
}
