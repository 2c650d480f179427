//! 팩터 전략 리밸런싱 백테스트.
//!
//! 각 리밸런싱일마다 일봉으로 모멘텀을 다시 계산한 유니버스로 전략을 실행하고,
//! 보유 종목을 모두 청산한 뒤 선정 종목을 동일 비중으로 매수합니다.
//! 거래일마다 종가로 평가한 자산 곡선에서 성과 지표를 계산합니다.
//!
//! # 체결 규칙
//!
//! - 매수가 = 종가 × (1 + 슬리피지), 매도가 = 종가 × (1 - 슬리피지)
//! - 수수료 = 체결 금액 × 수수료율
//! - 매수 가능 현금의 1%는 남겨 두고, 주식 수는 내림
//! - 리밸런싱일은 각 주기(월/분기/년)의 첫 거래일

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use kquant_analytics::performance::{PerformanceMetrics, DEFAULT_RISK_FREE_RATE};
use kquant_core::{FactorName, OhlcvBar, OhlcvProvider, QuantError, QuantResult, StockRecord};

use crate::scoring::FactorStrategy;

/// 모멘텀 재계산에 필요한 과거 조회 기간 (달력일).
const MOMENTUM_LOOKBACK_DAYS: i64 = 400;

/// 리밸런싱 주기.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalancePeriod {
    Monthly,
    #[default]
    Quarterly,
    Yearly,
}

impl RebalancePeriod {
    /// 같은 주기에 속하는 날짜는 같은 키를 가집니다.
    fn key(&self, date: NaiveDate) -> (i32, u32) {
        match self {
            RebalancePeriod::Monthly => (date.year(), date.month()),
            RebalancePeriod::Quarterly => (date.year(), (date.month() - 1) / 3),
            RebalancePeriod::Yearly => (date.year(), 0),
        }
    }

    /// 거래일 목록에서 주기별 첫 거래일.
    pub fn rebalance_dates(&self, trading_days: &[NaiveDate]) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut last_key = None;
        for &day in trading_days {
            let key = self.key(day);
            if last_key != Some(key) {
                dates.push(day);
                last_key = Some(key);
            }
        }
        dates
    }
}

impl FromStr for RebalancePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" | "month" => Ok(RebalancePeriod::Monthly),
            "quarterly" | "quarter" => Ok(RebalancePeriod::Quarterly),
            "yearly" | "year" => Ok(RebalancePeriod::Yearly),
            _ => Err(format!(
                "지원하지 않는 리밸런싱 주기: {} (monthly, quarterly, yearly)",
                s
            )),
        }
    }
}

/// 백테스트 설정.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// 초기 자본금 (원)
    pub initial_capital: f64,
    /// 거래 수수료율 (0.00015 = 0.015%)
    pub commission_rate: f64,
    /// 슬리피지율 (0.001 = 0.1%)
    pub slippage_rate: f64,
    /// 매수 시 남겨 둘 현금 비율
    pub cash_buffer: f64,
    pub rebalance: RebalancePeriod,
    /// 연간 무위험 이자율
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000_000.0,
            commission_rate: 0.00015,
            slippage_rate: 0.001,
            cash_buffer: 0.01,
            rebalance: RebalancePeriod::default(),
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }
}

impl BacktestConfig {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            ..Default::default()
        }
    }

    pub fn with_rebalance(mut self, period: RebalancePeriod) -> Self {
        self.rebalance = period;
        self
    }

    pub fn with_commission_rate(mut self, rate: f64) -> Self {
        self.commission_rate = rate;
        self
    }

    pub fn with_slippage_rate(mut self, rate: f64) -> Self {
        self.slippage_rate = rate;
        self
    }

    fn validate(&self) -> QuantResult<()> {
        if self.initial_capital.is_nan() || self.initial_capital <= 0.0 {
            return Err(QuantError::Config(format!(
                "초기 자본금은 0보다 커야 합니다: {}",
                self.initial_capital
            )));
        }
        let rates = [self.commission_rate, self.slippage_rate, self.cash_buffer];
        if rates.iter().any(|r| !(0.0..1.0).contains(r)) {
            return Err(QuantError::Config(
                "수수료율, 슬리피지율, 현금 비율은 0 이상 1 미만이어야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}

/// 체결 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// 체결 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub code: String,
    pub side: TradeSide,
    pub shares: u64,
    /// 슬리피지 반영 체결가
    pub price: f64,
    pub commission: f64,
}

/// 거래일별 자산 상태.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub total_value: f64,
    pub cash: f64,
    pub positions: usize,
}

/// 백테스트 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub strategy: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub config: BacktestConfig,
    pub rebalance_dates: Vec<NaiveDate>,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
    pub metrics: PerformanceMetrics,
    /// 일봉 조회 실패로 제외한 종목
    pub skipped: Vec<String>,
}

#[derive(Debug, Default)]
struct Portfolio {
    cash: f64,
    shares: BTreeMap<String, u64>,
}

impl Portfolio {
    fn value(&self, prices: &PriceBook, date: NaiveDate) -> f64 {
        self.cash
            + self
                .shares
                .iter()
                .filter_map(|(code, &n)| Some(prices.close_on(code, date)? * n as f64))
                .sum::<f64>()
    }
}

/// 종목별 일봉 (날짜 오름차순).
struct PriceBook {
    bars: BTreeMap<String, Vec<OhlcvBar>>,
}

impl PriceBook {
    /// `date` 이전(포함) 일봉.
    fn history(&self, code: &str, date: NaiveDate) -> &[OhlcvBar] {
        let Some(bars) = self.bars.get(code) else {
            return &[];
        };
        let end = bars.partition_point(|b| b.date <= date);
        &bars[..end]
    }

    /// `date` 이전(포함) 마지막 종가.
    fn close_on(&self, code: &str, date: NaiveDate) -> Option<f64> {
        self.history(code, date)
            .last()
            .map(|b| b.close)
            .filter(|c| c.is_finite() && *c > 0.0)
    }

    fn trading_days(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        let days: BTreeSet<NaiveDate> = self
            .bars
            .values()
            .flatten()
            .map(|b| b.date)
            .filter(|d| *d >= from && *d <= to)
            .collect();
        days.into_iter().collect()
    }
}

/// 종가 기준 `lookback` 거래일 수익률. 일봉이 부족하면 `None`.
fn momentum(history: &[OhlcvBar], lookback: usize) -> Option<f64> {
    if history.len() < lookback || lookback == 0 {
        return None;
    }
    let current = history.last()?.close;
    let base = history[history.len() - lookback].close;
    (base > 0.0).then(|| (current - base) / base)
}

/// 리밸런싱일 기준으로 가격/모멘텀을 다시 계산한 레코드.
fn point_in_time(stock: &StockRecord, history: &[OhlcvBar]) -> StockRecord {
    let mut record = stock.clone();
    record.momentum_3m = momentum(history, 63);
    record.momentum_6m = momentum(history, 126);
    record.momentum_12m = momentum(history, 252);
    if let Some(bar) = history.last() {
        record = record.with_factor(FactorName::Price, bar.close);
    }
    record
}

/// 일봉 제공자 기반 백테스터.
pub struct Backtester {
    provider: Arc<dyn OhlcvProvider>,
    config: BacktestConfig,
}

impl Backtester {
    pub fn new(provider: Arc<dyn OhlcvProvider>, config: BacktestConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// `from..=to` 구간에서 전략을 리밸런싱하며 시뮬레이션합니다.
    ///
    /// 재무 팩터는 `universe` 스냅샷 값을 그대로 쓰고, 모멘텀과 가격은 리밸런싱일 일봉으로 다시 계산합니다.
    pub async fn run(
        &self,
        strategy: &dyn FactorStrategy,
        universe: &[StockRecord],
        from: NaiveDate,
        to: NaiveDate,
    ) -> QuantResult<BacktestReport> {
        self.config.validate()?;
        if from > to {
            return Err(QuantError::Config(format!(
                "시작일이 종료일보다 늦습니다: {} > {}",
                from, to
            )));
        }

        let (prices, skipped) = self.load_prices(universe, from, to).await;
        let trading_days = prices.trading_days(from, to);
        if trading_days.is_empty() {
            return Err(QuantError::Data(format!(
                "{} ~ {} 구간에 거래일 데이터가 없습니다",
                from, to
            )));
        }

        let rebalance_dates = self.config.rebalance.rebalance_dates(&trading_days);
        info!(
            strategy = strategy.id(),
            stocks = universe.len(),
            days = trading_days.len(),
            rebalances = rebalance_dates.len(),
            "백테스트 시작"
        );

        let mut portfolio = Portfolio {
            cash: self.config.initial_capital,
            shares: BTreeMap::new(),
        };
        let mut trades = Vec::new();
        let mut equity_curve = Vec::with_capacity(trading_days.len());
        let mut next_rebalance = rebalance_dates.iter().peekable();

        for &day in &trading_days {
            if next_rebalance.next_if(|d| **d == day).is_some() {
                let snapshot: Vec<StockRecord> = universe
                    .iter()
                    .filter(|s| !skipped.contains(&s.code))
                    .map(|s| point_in_time(s, prices.history(&s.code, day)))
                    .collect();
                let selection = strategy.select(&snapshot, day);
                debug!(date = %day, selected = selection.selected_count, "리밸런싱");

                self.liquidate(&mut portfolio, &prices, day, &mut trades);
                let codes: Vec<&str> = selection.codes();
                self.buy_equal_weight(&mut portfolio, &codes, &prices, day, &mut trades);
            }

            equity_curve.push(EquityPoint {
                date: day,
                total_value: portfolio.value(&prices, day),
                cash: portfolio.cash,
                positions: portfolio.shares.len(),
            });
        }

        let values: Vec<f64> = equity_curve.iter().map(|p| p.total_value).collect();
        let start = trading_days[0];
        let end = trading_days[trading_days.len() - 1];
        let years = (end - start).num_days() as f64 / 365.0;
        let metrics = PerformanceMetrics::from_equity_curve(&values, years, self.config.risk_free_rate);

        info!(
            strategy = strategy.id(),
            trades = trades.len(),
            "{}",
            metrics.summary()
        );

        Ok(BacktestReport {
            strategy: strategy.id().to_string(),
            start,
            end,
            config: self.config,
            rebalance_dates,
            equity_curve,
            trades,
            metrics,
            skipped,
        })
    }

    async fn load_prices(
        &self,
        universe: &[StockRecord],
        from: NaiveDate,
        to: NaiveDate,
    ) -> (PriceBook, Vec<String>) {
        let history_from = from - Duration::days(MOMENTUM_LOOKBACK_DAYS);
        let mut bars = BTreeMap::new();
        let mut skipped = Vec::new();

        for stock in universe {
            match self.provider.ohlcv(&stock.code, history_from, to).await {
                Ok(mut series) => {
                    series.sort_by_key(|b| b.date);
                    bars.insert(stock.code.clone(), series);
                }
                Err(e) => {
                    warn!(code = %stock.code, error = %e, "일봉 조회 실패, 백테스트에서 제외");
                    skipped.push(stock.code.clone());
                }
            }
        }
        (PriceBook { bars }, skipped)
    }

    fn liquidate(
        &self,
        portfolio: &mut Portfolio,
        prices: &PriceBook,
        date: NaiveDate,
        trades: &mut Vec<TradeRecord>,
    ) {
        let holdings = std::mem::take(&mut portfolio.shares);
        for (code, shares) in holdings {
            let Some(close) = prices.close_on(&code, date) else {
                warn!(code = %code, date = %date, "청산 가격 없음, 포지션 유지");
                portfolio.shares.insert(code, shares);
                continue;
            };
            let price = close * (1.0 - self.config.slippage_rate);
            let proceeds = price * shares as f64;
            let commission = proceeds * self.config.commission_rate;
            portfolio.cash += proceeds - commission;
            trades.push(TradeRecord {
                date,
                code,
                side: TradeSide::Sell,
                shares,
                price,
                commission,
            });
        }
    }

    fn buy_equal_weight(
        &self,
        portfolio: &mut Portfolio,
        codes: &[&str],
        prices: &PriceBook,
        date: NaiveDate,
        trades: &mut Vec<TradeRecord>,
    ) {
        if codes.is_empty() {
            return;
        }
        let budget = portfolio.cash * (1.0 - self.config.cash_buffer) / codes.len() as f64;

        for &code in codes {
            let Some(close) = prices.close_on(code, date) else {
                continue;
            };
            let price = close * (1.0 + self.config.slippage_rate);
            let shares = (budget / price).floor() as u64;
            if shares == 0 {
                continue;
            }
            let cost = price * shares as f64;
            let commission = cost * self.config.commission_rate;
            if cost + commission > portfolio.cash {
                continue;
            }
            portfolio.cash -= cost + commission;
            *portfolio.shares.entry(code.to_string()).or_insert(0) += shares;
            trades.push(TradeRecord {
                date,
                code: code.to_string(),
                side: TradeSide::Buy,
                shares,
                price,
                commission,
            });
        }
    }
}
