//! 시드 기반 합성 데이터 제공자.
//!
//! 실시간 데이터 없이도 전략과 감지기를 돌려볼 수 있도록 그럴듯한 팩터 스냅샷과
//! 일봉을 생성합니다. 같은 시드와 같은 유니버스면 항상 같은 값을 냅니다.
//!
//! 스냅샷은 두 단계로 생성됩니다:
//! 1. 종목 순서대로 시가총액, 주가, PER, PBR, ROE, 등락률
//! 2. 같은 시드로 다시 시작해 컬럼 단위로 GPA, CFO, PSR, PCR, 모멘텀,
//!    EBIT, 순차입금, 투하자본을 뽑은 뒤 이익수익률과 ROC 계산
//!
//! 시가총액 기준값은 순위가 내려갈수록 2조원씩 줄어들며 100억원 아래로는
//! 내려가지 않습니다.

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use kquant_core::{
    FactorName, Market, OhlcvBar, OhlcvProvider, ProviderError, Sector, SectorLookup,
    SnapshotProvider, StockRecord, UniverseProvider,
};

use crate::sector_map::StaticSectorMap;
use crate::universe::StaticUniverse;

/// 합성 데이터 제공자.
#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    universe: StaticUniverse,
    sectors: StaticSectorMap,
    /// 시장 기본 시드 대신 사용할 시드
    seed: Option<u64>,
}

impl SyntheticProvider {
    pub fn new(universe: StaticUniverse, sectors: StaticSectorMap) -> Self {
        Self {
            universe,
            sectors,
            seed: None,
        }
    }

    /// 모든 시장에 같은 시드를 사용합니다.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn universe(&self) -> &StaticUniverse {
        &self.universe
    }

    fn seed_for(&self, market: Market) -> u64 {
        self.seed.unwrap_or_else(|| market.default_seed())
    }

    /// 시장 전체 종목의 팩터 스냅샷을 생성합니다.
    pub fn generate(&self, market: Market) -> Vec<StockRecord> {
        let seed = self.seed_for(market);
        let stocks = self.universe.list(market);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut records: Vec<StockRecord> = stocks
            .iter()
            .enumerate()
            .map(|(i, (code, name))| {
                let base_cap = (1e13 - i as f64 * 2e9).max(1e10);
                StockRecord::new(code.as_str(), name.as_str(), market, self.sectors.sector(code))
                    .with_factor(FactorName::MarketCap, base_cap * rng.gen_range(0.8..1.2))
                    .with_factor(FactorName::Price, rng.gen_range(10_000.0..500_000.0))
                    .with_factor(FactorName::Per, rng.gen_range(5.0..30.0))
                    .with_factor(FactorName::Pbr, rng.gen_range(0.5..3.0))
                    .with_factor(FactorName::Roe, rng.gen_range(0.05..0.25))
                    .with_factor(FactorName::ChangeRate, rng.gen_range(-5.0..5.0))
            })
            .collect();

        let n = records.len();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut column =
            |low: f64, high: f64| -> Vec<f64> { (0..n).map(|_| rng.gen_range(low..high)).collect() };

        let gpa = column(0.1, 0.4);
        let cfo = column(0.0, 0.15);
        let psr = column(0.5, 5.0);
        let pcr = column(3.0, 20.0);
        let m3 = column(-0.2, 0.3);
        let m6 = column(-0.3, 0.4);
        let m12 = column(-0.4, 0.6);
        let ebit_ratio = column(0.05, 0.12);
        let net_debt_ratio = column(-0.2, 0.4);
        let invested_ratio = column(0.6, 1.2);

        for (i, record) in records.iter_mut().enumerate() {
            let cap = record.market_cap.unwrap_or_default();
            let ebit = cap * ebit_ratio[i];
            let enterprise_value = cap + cap * net_debt_ratio[i];
            let invested = cap * invested_ratio[i];

            record.gpa = Some(gpa[i]);
            record.cfo_ratio = Some(cfo[i]);
            record.psr = Some(psr[i]);
            record.pcr = Some(pcr[i]);
            record.momentum_3m = Some(m3[i]);
            record.momentum_6m = Some(m6[i]);
            record.momentum_12m = Some(m12[i]);
            record.earnings_yield = Some(ebit / enterprise_value);
            record.roc = Some(ebit / invested);
        }

        debug!(%market, seed, count = records.len(), "합성 스냅샷 생성");
        records
    }

    /// 종목코드로 시드를 고정한 일봉 랜덤워크 (주말 제외).
    ///
    /// 같은 종목코드와 같은 시작일이면 항상 같은 시계열을 냅니다.
    pub fn series(&self, code: &str, from: NaiveDate, to: NaiveDate) -> Vec<OhlcvBar> {
        let mut rng = StdRng::seed_from_u64(code_seed(code) ^ self.seed.unwrap_or(0));
        let mut prev = rng.gen_range(10_000.0..200_000.0_f64).round();
        let mut bars = Vec::new();

        let mut date = from;
        while date <= to {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                let open = (prev * (1.0 + rng.gen_range(-0.005..0.005))).round();
                let close = (prev * (1.0 + rng.gen_range(-0.03..0.0305))).round().max(100.0);
                let high = (open.max(close) * (1.0 + rng.gen_range(0.0..0.015))).round();
                let low = (open.min(close) * (1.0 - rng.gen_range(0.0..0.015))).round().max(1.0);
                let mut volume: u64 = rng.gen_range(100_000..1_000_000);
                if rng.gen_bool(0.05) {
                    volume *= 3;
                }

                bars.push(OhlcvBar::new(date, open.max(1.0), high, low, close, volume));
                prev = close;
            }
            date += Duration::days(1);
        }
        bars
    }
}

/// 종목코드의 FNV-1a 해시.
fn code_seed(code: &str) -> u64 {
    code.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl UniverseProvider for SyntheticProvider {
    async fn stocks(&self, market: Market) -> Result<Vec<(String, String)>, ProviderError> {
        self.universe.stocks(market).await
    }
}

impl SectorLookup for SyntheticProvider {
    fn sector(&self, code: &str) -> Sector {
        self.sectors.sector(code)
    }
}

#[async_trait]
impl SnapshotProvider for SyntheticProvider {
    async fn snapshot(&self, market: Market) -> Result<Vec<StockRecord>, ProviderError> {
        Ok(self.generate(market))
    }
}

#[async_trait]
impl OhlcvProvider for SyntheticProvider {
    async fn ohlcv(
        &self,
        code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ProviderError> {
        Ok(self.series(code, from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kquant_core::validate_series;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_snapshot_ranges() {
        let records = SyntheticProvider::default().generate(Market::Kospi);
        assert_eq!(records.len(), crate::KOSPI_DEFAULT.len());

        for r in &records {
            assert!((5.0..30.0).contains(&r.per.unwrap()));
            assert!((0.1..0.4).contains(&r.gpa.unwrap()));
            assert!(r.earnings_yield.unwrap() > 0.0);
            assert!(r.roc.unwrap() > 0.0);
        }
        // 상위 종목 시가총액은 기준값 1경원 근처
        let top = records[0].market_cap.unwrap();
        assert!((0.8e13..1.2e13).contains(&top));
    }

    #[test]
    fn test_markets_use_different_seeds() {
        let provider = SyntheticProvider::new(
            StaticUniverse::new(
                vec![("000001".into(), "A".into())],
                vec![("000001".into(), "A".into())],
            ),
            StaticSectorMap::empty(),
        );
        let kospi = provider.generate(Market::Kospi);
        let kosdaq = provider.generate(Market::Kosdaq);
        assert_ne!(kospi[0].per, kosdaq[0].per);
    }

    #[test]
    fn test_series_is_valid_and_skips_weekends() {
        let provider = SyntheticProvider::default();
        let bars = provider.series("005930", day(2024, 1, 1), day(2024, 3, 31));

        assert!(validate_series(&bars).is_ok());
        assert!(bars
            .iter()
            .all(|b| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(bars.iter().all(|b| b.low <= b.open.min(b.close) && b.high >= b.open.max(b.close)));
        assert_eq!(bars, provider.series("005930", day(2024, 1, 1), day(2024, 3, 31)));
        assert_ne!(bars, provider.series("000660", day(2024, 1, 1), day(2024, 3, 31)));
    }

    #[test]
    fn test_empty_range() {
        assert!(SyntheticProvider::default()
            .series("005930", day(2024, 2, 1), day(2024, 1, 1))
            .is_empty());
    }

    #[test]
    fn test_code_seed_is_stable() {
        assert_eq!(code_seed(""), 0xcbf2_9ce4_8422_2325);
        assert_ne!(code_seed("005930"), code_seed("000660"));
    }
}
