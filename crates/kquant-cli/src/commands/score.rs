//! 팩터 전략 종목 선정 (`score`).

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde_json::json;
use tracing::{debug, info, warn};

use kquant_analytics::OutlierMethod;
use kquant_core::{
    validate_universe, AppConfig, Market, ScoredSelection, SnapshotProvider, StockRecord,
};
use kquant_strategy::{
    Allocation, FactorStrategy, MagicFormula, MultiFactor, ScoringParams, SectorComparison,
    SectorFactor, SectorNeutral, SectorNeutralMultiFactor,
};

use super::build_provider;
use super::output::{csv_opt, escape_csv, pad, truncate, write_output, OutputFormat};

/// 선정 전략 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Magic,
    Multi,
    Sector,
    SectorMulti,
}

impl StrategyKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "magic" | "magic_formula" => Ok(Self::Magic),
            "multi" | "multi_factor" => Ok(Self::Multi),
            "sector" | "sector_neutral" => Ok(Self::Sector),
            "snmulti" | "sector_multi" | "sector_neutral_multi_factor" => Ok(Self::SectorMulti),
            _ => bail!("잘못된 전략: {}. 사용 가능: magic, multi, sector, snmulti", s),
        }
    }
}

/// `score` 명령 설정.
#[derive(Debug)]
pub struct ScoreConfig {
    pub strategy: StrategyKind,
    pub markets: Vec<Market>,
    /// 설정 파일의 top_n 대신 사용할 값
    pub top_n: Option<usize>,
    /// 마법공식 간편 모드 (ROE + 1/PER)
    pub simplified: bool,
    /// 섹터 중립 평가 팩터
    pub sector_factor: SectorFactor,
    /// 섹터 중립 비례 배분
    pub proportional: bool,
    /// 섹터 중립 결과를 원시 팩터 상위 N과 비교
    pub compare: bool,
    /// 설정 파일의 outlier_method 대신 사용할 이상치 처리 방법
    pub outlier: Option<OutlierMethod>,
    pub date: NaiveDate,
    pub format: OutputFormat,
    pub output: Option<String>,
}

/// 유니버스 스냅샷을 가져와 전략을 실행하고 결과를 출력합니다.
pub async fn run_score(config: ScoreConfig, app: &AppConfig) -> Result<ScoredSelection> {
    let provider = build_provider(app)?;
    let mut universe: Vec<StockRecord> = Vec::new();
    for &market in &config.markets {
        let snapshot = provider
            .snapshot(market)
            .await
            .with_context(|| format!("{} 스냅샷 조회 실패", market))?;
        universe.extend(snapshot);
    }
    validate_universe(&universe).map_err(|e| anyhow::anyhow!("유니버스 검증 실패: {}", e))?;
    info!(markets = ?config.markets, stocks = universe.len(), "유니버스 로드");

    let mut params = ScoringParams::from_config(&app.strategy, app.normalizer)
        .context("전략 설정 오류")?;
    if let Some(top_n) = config.top_n {
        params = params.with_top_n(top_n);
    }
    if let Some(method) = config.outlier {
        params = params.with_outlier(method);
    }

    let allocation = if config.proportional {
        Allocation::Proportional
    } else {
        Allocation::PerSector {
            k: app.strategy.stocks_per_sector,
        }
    };
    let sector_neutral = || SectorNeutral::new(params, config.sector_factor, allocation);
    let sector_multi = || {
        SectorNeutralMultiFactor::new(
            params,
            &[SectorFactor::Roe, SectorFactor::Per, SectorFactor::Momentum12m],
            allocation,
        )
    };
    let strategy: Box<dyn FactorStrategy> = match config.strategy {
        StrategyKind::Magic => Box::new(MagicFormula::new(params).simplified(config.simplified)),
        StrategyKind::Multi => Box::new(MultiFactor::new(params, app.strategy.weights)),
        StrategyKind::Sector => Box::new(sector_neutral()),
        StrategyKind::SectorMulti => Box::new(sector_multi()),
    };

    let selection = strategy.select(&universe, config.date);
    for warning in &selection.warnings {
        warn!("{}", warning);
    }
    debug!("{}", selection.explain());

    let comparison = match config.strategy {
        _ if !config.compare => None,
        StrategyKind::Sector => Some(sector_neutral().compare_with_raw(&universe, config.date)),
        StrategyKind::SectorMulti => Some(sector_multi().compare_with_global(&universe, config.date)),
        _ => None,
    };

    let content = match config.format {
        OutputFormat::Table => {
            let mut out = format_table(&selection);
            if let Some(c) = &comparison {
                out.push_str("\n\n");
                out.push_str(&format_comparison(c));
            }
            out
        }
        OutputFormat::Csv => format_csv(&selection),
        OutputFormat::Json => {
            let value = match &comparison {
                Some(c) => json!({ "selection": selection, "comparison": c }),
                None => serde_json::to_value(&selection)?,
            };
            serde_json::to_string_pretty(&value).context("JSON 직렬화 실패")?
        }
    };
    write_output(&content, config.output.as_deref())?;

    Ok(selection)
}

/// 테이블 형식 출력.
pub fn format_table(selection: &ScoredSelection) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "[{}] {}  후보 {}개 → 선정 {}개\n\n",
        selection.strategy, selection.date, selection.total_candidates, selection.selected_count
    ));
    output.push_str(&format!(
        "{:>4}  {:<8} {} {} {:>10} {:>10} {:>7} {:>6} {:>7}\n",
        "순위", "코드", pad("종목명", 22), pad("섹터", 8), "점수", "시총(억)", "PER", "PBR", "ROE"
    ));
    output.push_str(&"-".repeat(96));
    output.push('\n');

    let fmt = |v: Option<f64>, digits: usize| match v {
        Some(v) => format!("{:.*}", digits, v),
        None => "-".to_string(),
    };
    for s in &selection.stocks {
        let stock = &s.stock;
        output.push_str(&format!(
            "{:>4}  {:<8} {} {} {:>10.4} {:>10} {:>7} {:>6} {:>7}\n",
            s.rank,
            stock.code,
            pad(&truncate(&stock.name, 11), 22),
            pad(stock.sector.as_str(), 8),
            s.score,
            fmt(stock.market_cap.map(|c| c / 1e8), 0),
            fmt(stock.per, 1),
            fmt(stock.pbr, 2),
            fmt(stock.roe, 3),
        ));
    }

    let distribution = selection.sector_distribution();
    if !distribution.is_empty() {
        output.push_str("\n섹터 분포:\n");
        for w in distribution {
            output.push_str(&format!(
                "  {} {:>3}개 ({:>5.1}%)\n",
                pad(w.sector.as_str(), 8),
                w.count,
                w.weight * 100.0
            ));
        }
    }
    let summary = selection.factor_summary();
    if !summary.is_empty() {
        output.push_str("\n팩터 요약 (평균 / 표준편차 / 최소 / 최대):\n");
        for f in summary {
            output.push_str(&format!(
                "  {:<16} {:>14.3} {:>14.3} {:>14.3} {:>14.3}\n",
                f.factor.as_str(),
                f.mean,
                f.std,
                f.min,
                f.max
            ));
        }
    }
    for warning in &selection.warnings {
        output.push_str(&format!("\n경고: {}", warning));
    }
    output
}

/// CSV 형식 출력.
pub fn format_csv(selection: &ScoredSelection) -> String {
    let mut output = String::new();
    output.push_str("rank,code,name,market,sector,score,market_cap,per,pbr,roe,roc,earnings_yield,momentum_12m\n");
    for s in &selection.stocks {
        let stock = &s.stock;
        output.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            s.rank,
            stock.code,
            escape_csv(&stock.name),
            stock.market,
            stock.sector,
            s.score,
            csv_opt(stock.market_cap),
            csv_opt(stock.per),
            csv_opt(stock.pbr),
            csv_opt(stock.roe),
            csv_opt(stock.roc),
            csv_opt(stock.earnings_yield),
            csv_opt(stock.momentum_12m),
        ));
    }
    output
}

/// 섹터 분포 비교 출력.
pub fn format_comparison(comparison: &SectorComparison) -> String {
    let mut output = String::from("섹터 분포 비교 (원시 상위 N vs 섹터 중립)\n");
    for (label, summary) in [("원시", &comparison.raw), ("섹터 중립", &comparison.neutral)] {
        output.push_str(&format!(
            "  {} 섹터 {}개, 최대 비중 {:.1}%\n",
            pad(label, 10),
            summary.num_sectors,
            summary.max_sector_weight * 100.0
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use kquant_core::{FactorName, Sector};

    fn selection() -> ScoredSelection {
        let date = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let a = StockRecord::new("005930", "삼성전자", Market::Kospi, Sector::It)
            .with_factor(FactorName::Per, 12.5);
        let b = StockRecord::new("033780", "KT&G, Inc", Market::Kospi, Sector::Consumer);
        ScoredSelection::from_ranked("magic_formula", date, 10, vec![(a, 1.5), (b, 0.5)])
    }

    #[test]
    fn test_strategy_kind_aliases() {
        assert_eq!(StrategyKind::parse("magic_formula").unwrap(), StrategyKind::Magic);
        assert_eq!(StrategyKind::parse("Sector").unwrap(), StrategyKind::Sector);
        assert_eq!(StrategyKind::parse("snmulti").unwrap(), StrategyKind::SectorMulti);
        assert!(StrategyKind::parse("momentum").is_err());
    }

    #[test]
    fn test_csv_rows() {
        let csv = format_csv(&selection());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,005930,삼성전자,KOSPI,IT,1.5,,12.5,"));
        assert!(lines[2].contains("\"KT&G, Inc\""));
    }

    #[test]
    fn test_table_lists_sector_distribution() {
        let table = format_table(&selection());
        assert!(table.contains("후보 10개 → 선정 2개"));
        assert!(table.contains("섹터 분포"));
        assert!(table.contains("팩터 요약"));
        assert!(table.contains("per"));
    }
}
