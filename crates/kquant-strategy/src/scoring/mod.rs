//! 팩터 기반 종목 선정 전략.
//!
//! - [`MagicFormula`] - 이익수익률 + 투하자본수익률 순위합 (간편 모드: ROE + 1/PER)
//! - [`MultiFactor`] - 품질 / 가치 / 모멘텀 가중 결합
//! - [`SectorNeutral`] - 섹터 내 상대 순위 기반 선정
//! - [`SectorNeutralMultiFactor`] - 여러 팩터의 섹터 내 Z-Score(Rank) 가중 결합
//!
//! 모든 전략은 같은 공통 필터(최소 시가총액, 금융주 제외)를 먼저 적용하고,
//! 필요한 팩터가 없는 종목은 0으로 채우지 않고 후보에서 제외합니다.

mod magic_formula;
mod multi_factor;
mod sector_multi_factor;
mod sector_neutral;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use kquant_analytics::{OutlierMethod, Winsorizer};
use kquant_core::{
    NormalizerConfig, QuantError, QuantResult, ScoredSelection, StockRecord, StrategyConfig,
};

pub use magic_formula::MagicFormula;
pub use multi_factor::{FactorComponents, FactorCorrelations, MultiFactor};
pub use sector_multi_factor::{SectorNeutralMultiFactor, WeightedFactor};
pub use sector_neutral::{
    Allocation, DistributionSummary, SectorComparison, SectorFactor, SectorNeutral,
};

/// 팩터 전략 공통 인터페이스.
pub trait FactorStrategy: Send + Sync {
    /// 전략 ID (영문, snake_case)
    fn id(&self) -> &'static str;

    /// 전략 이름 (한글)
    fn name(&self) -> &'static str;

    /// 유니버스를 평가해 상위 종목을 선정합니다.
    fn select(&self, universe: &[StockRecord], date: NaiveDate) -> ScoredSelection;
}

/// 모든 팩터 전략이 공유하는 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringParams {
    /// 선정 종목 수
    pub top_n: usize,
    /// 최소 시가총액 (원). 0이면 필터 없음
    pub min_market_cap: f64,
    /// 금융 섹터 제외 여부
    pub exclude_financials: bool,
    /// 윈저라이징 분위수
    pub normalizer: NormalizerConfig,
    /// 정규화 전에 팩터 컬럼에 적용할 이상치 처리. 없으면 윈저라이징만 수행
    #[serde(default)]
    pub outlier: Option<OutlierMethod>,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            top_n: 30,
            min_market_cap: 0.0,
            exclude_financials: true,
            normalizer: NormalizerConfig::default(),
            outlier: None,
        }
    }
}

impl ScoringParams {
    /// 설정 파일 값으로 생성합니다.
    ///
    /// `outlier_method` 이름을 해석할 수 없으면 설정 오류를 반환합니다.
    pub fn from_config(
        strategy: &StrategyConfig,
        normalizer: NormalizerConfig,
    ) -> QuantResult<Self> {
        let outlier = strategy
            .outlier_method
            .as_deref()
            .map(str::parse::<OutlierMethod>)
            .transpose()
            .map_err(QuantError::Config)?;

        Ok(Self {
            top_n: strategy.top_n,
            min_market_cap: strategy.min_market_cap,
            exclude_financials: strategy.exclude_financials,
            normalizer,
            outlier,
        })
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_min_market_cap(mut self, min_market_cap: f64) -> Self {
        self.min_market_cap = min_market_cap;
        self
    }

    pub fn with_exclude_financials(mut self, exclude: bool) -> Self {
        self.exclude_financials = exclude;
        self
    }

    pub fn with_outlier(mut self, method: OutlierMethod) -> Self {
        self.outlier = Some(method);
        self
    }

    pub(crate) fn winsorizer(&self) -> Winsorizer {
        Winsorizer::from(self.normalizer)
    }

    /// 팩터 컬럼 전처리: 이상치 처리(설정 시) 후 윈저라이징.
    ///
    /// 이상치로 판정된 값은 결측이 되어 이후 순위/Z-Score에서 빠집니다.
    pub(crate) fn prepare(&self, raw: &[Option<f64>]) -> Vec<Option<f64>> {
        match self.outlier {
            Some(method) => self.winsorizer().apply(&method.apply(raw)),
            None => self.winsorizer().apply(raw),
        }
    }

    /// 공통 필터를 통과하는지 확인합니다.
    ///
    /// 시가총액이 없는 종목은 최소 시가총액 조건이 없을 때만 통과합니다.
    pub fn accepts(&self, stock: &StockRecord) -> bool {
        if self.exclude_financials && stock.sector.is_financial() {
            return false;
        }
        if self.min_market_cap > 0.0 {
            return stock
                .market_cap
                .is_some_and(|cap| cap.is_finite() && cap >= self.min_market_cap);
        }
        true
    }

    /// 공통 필터를 통과한 후보.
    pub fn filter<'a>(&self, universe: &'a [StockRecord]) -> Vec<&'a StockRecord> {
        universe.iter().filter(|s| self.accepts(s)).collect()
    }

    /// 선정 결과에 공통 파라미터를 기록합니다.
    pub(crate) fn annotate(&self, selection: ScoredSelection) -> ScoredSelection {
        selection
            .with_metadata("top_n", self.top_n)
            .with_metadata("min_market_cap", self.min_market_cap)
            .with_metadata("exclude_financials", self.exclude_financials)
            .with_metadata(
                "outlier_method",
                self.outlier.map_or("none", |m| m.name()),
            )
    }
}

/// 점수 내림차순 안정 정렬.
pub(crate) fn sort_descending<T>(rows: &mut [(T, f64)]) {
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
}

/// 점수 오름차순 안정 정렬.
pub(crate) fn sort_ascending<T>(rows: &mut [(T, f64)]) {
    rows.sort_by(|a, b| a.1.total_cmp(&b.1));
}

/// 참조 목록을 소유 레코드로 바꾸면서 상위 `top_n`개만 남깁니다.
pub(crate) fn take_top(rows: Vec<(&StockRecord, f64)>, top_n: usize) -> Vec<(StockRecord, f64)> {
    rows.into_iter()
        .take(top_n)
        .map(|(stock, score)| (stock.clone(), score))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kquant_core::{Market, Sector};

    fn stock(code: &str, sector: Sector, cap: Option<f64>) -> StockRecord {
        let mut s = StockRecord::new(code, code, Market::Kospi, sector);
        s.market_cap = cap;
        s
    }

    #[test]
    fn test_filter_market_cap_and_financials() {
        let universe = vec![
            stock("000001", Sector::It, Some(5e11)),
            stock("000002", Sector::It, Some(5e10)),
            stock("000003", Sector::Finance, Some(9e12)),
            stock("000004", Sector::Bio, None),
        ];

        let params = ScoringParams::default().with_min_market_cap(1e11);
        let codes: Vec<&str> = params.filter(&universe).iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["000001"]);

        let params = ScoringParams::default().with_exclude_financials(false);
        assert_eq!(params.filter(&universe).len(), 4);
    }

    #[test]
    fn test_missing_cap_passes_without_minimum() {
        let params = ScoringParams::default();
        assert!(params.accepts(&stock("000004", Sector::Bio, None)));
    }

    #[test]
    fn test_prepare_drops_outliers_before_winsorizing() {
        let mut raw: Vec<Option<f64>> = (1..=20).map(|i| Some(i as f64)).collect();
        raw.push(Some(500.0));
        raw.push(None);

        let plain = ScoringParams::default().prepare(&raw);
        assert!(plain[20].is_some());

        let params = ScoringParams::default().with_outlier(OutlierMethod::Iqr { k: 1.5 });
        let cleaned = params.prepare(&raw);
        assert_eq!(cleaned.len(), raw.len());
        assert_eq!(cleaned[20], None);
        assert_eq!(cleaned[21], None);
        assert!(cleaned[..20].iter().all(Option::is_some));
    }

    #[test]
    fn test_from_config_parses_outlier_method() {
        let mut strategy = StrategyConfig::default();
        let params = ScoringParams::from_config(&strategy, NormalizerConfig::default()).unwrap();
        assert_eq!(params.outlier, None);

        strategy.outlier_method = Some("mad".to_string());
        let params = ScoringParams::from_config(&strategy, NormalizerConfig::default()).unwrap();
        assert_eq!(params.outlier, Some(OutlierMethod::Mad { threshold: 3.0 }));

        strategy.outlier_method = Some("median".to_string());
        let err = ScoringParams::from_config(&strategy, NormalizerConfig::default()).unwrap_err();
        assert!(matches!(err, QuantError::Config(_)));
    }

    #[test]
    fn test_stable_sort_keeps_input_order_for_ties() {
        let mut rows = vec![("a", 1.0), ("b", 2.0), ("c", 1.0), ("d", 2.0)];
        sort_descending(&mut rows);
        let order: Vec<&str> = rows.iter().map(|r| r.0).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);

        sort_ascending(&mut rows);
        let order: Vec<&str> = rows.iter().map(|r| r.0).collect();
        assert_eq!(order, vec!["a", "c", "b", "d"]);
    }
}
