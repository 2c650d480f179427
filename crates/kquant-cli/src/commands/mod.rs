//! CLI 명령어 구현 모듈.

pub mod backtest;
pub mod output;
pub mod scan;
pub mod score;
pub mod universe;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use kquant_core::{AppConfig, Market};
use kquant_data::{StaticSectorMap, StaticUniverse, SyntheticProvider};

/// 설정의 데이터 소스로 제공자를 만듭니다.
pub fn build_provider(config: &AppConfig) -> Result<SyntheticProvider> {
    match config.data.source.to_lowercase().as_str() {
        "synthetic" => Ok(SyntheticProvider::new(
            StaticUniverse::builtin().with_limit(config.data.max_stocks),
            StaticSectorMap::builtin(),
        )),
        other => bail!("지원하지 않는 데이터 소스: {} (사용 가능: synthetic)", other),
    }
}

/// `KOSPI`, `KOSDAQ`, `ALL` 중 하나를 시장 목록으로 변환합니다.
pub fn parse_markets(s: &str) -> Result<Vec<Market>> {
    if s.eq_ignore_ascii_case("all") {
        return Ok(Market::ALL.to_vec());
    }
    let market: Market = s.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    Ok(vec![market])
}

/// YYYY-MM-DD 날짜 파싱.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("잘못된 날짜 형식: {} (YYYY-MM-DD)", s))
}
