//! 종목 유니버스 조회 (`universe`).

use anyhow::{Context, Result};
use serde::Serialize;

use kquant_analytics::QuantScores;
use kquant_core::{AppConfig, Market, Sector, SnapshotProvider};

use super::build_provider;
use super::output::{escape_csv, pad, truncate, write_output, OutputFormat};

/// `universe` 명령 설정.
#[derive(Debug)]
pub struct UniverseConfig {
    pub markets: Vec<Market>,
    /// 섹터 필터
    pub sector: Option<Sector>,
    pub format: OutputFormat,
    pub output: Option<String>,
}

/// 종목 한 줄 요약.
#[derive(Debug, Clone, Serialize)]
pub struct UniverseRow {
    pub code: String,
    pub name: String,
    pub market: Market,
    pub sector: Sector,
    pub scores: QuantScores,
}

pub async fn run_universe(config: UniverseConfig, app: &AppConfig) -> Result<Vec<UniverseRow>> {
    let provider = build_provider(app)?;
    let mut rows = Vec::new();
    for &market in &config.markets {
        let snapshot = provider
            .snapshot(market)
            .await
            .with_context(|| format!("{} 스냅샷 조회 실패", market))?;
        rows.extend(
            snapshot
                .iter()
                .filter(|s| config.sector.map_or(true, |sector| s.sector == sector))
                .map(|s| UniverseRow {
                    code: s.code.clone(),
                    name: s.name.clone(),
                    market: s.market,
                    sector: s.sector,
                    scores: QuantScores::from_record(s),
                }),
        );
    }

    let content = match config.format {
        OutputFormat::Table => format_table(&rows),
        OutputFormat::Csv => format_csv(&rows),
        OutputFormat::Json => serde_json::to_string_pretty(&rows).context("JSON 직렬화 실패")?,
    };
    write_output(&content, config.output.as_deref())?;
    Ok(rows)
}

/// 테이블 형식 출력.
pub fn format_table(rows: &[UniverseRow]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<8} {} {:<7} {} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}\n",
        "코드", pad("종목명", 22), "시장", pad("섹터", 8), "마법", "품질", "가치", "모멘텀", "멀티", "섹터"
    ));
    output.push_str(&"-".repeat(100));
    output.push('\n');
    for r in rows {
        let s = &r.scores;
        output.push_str(&format!(
            "{:<8} {} {:<7} {} {:>6.1} {:>6.1} {:>6.1} {:>6.1} {:>6.1} {:>6.1}\n",
            r.code,
            pad(&truncate(&r.name, 11), 22),
            r.market.to_string(),
            pad(r.sector.as_str(), 8),
            s.magic,
            s.quality,
            s.value,
            s.momentum,
            s.multi,
            s.sector,
        ));
    }
    output.push_str(&format!("\nTotal: {} 종목", rows.len()));
    output
}

/// CSV 형식 출력.
pub fn format_csv(rows: &[UniverseRow]) -> String {
    let mut output = String::from("code,name,market,sector,magic,quality,value,momentum,multi,sector_score\n");
    for r in rows {
        let s = &r.scores;
        output.push_str(&format!(
            "{},{},{},{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}\n",
            r.code,
            escape_csv(&r.name),
            r.market,
            r.sector,
            s.magic,
            s.quality,
            s.value,
            s.momentum,
            s.multi,
            s.sector,
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use kquant_core::{FactorName, StockRecord};

    fn rows() -> Vec<UniverseRow> {
        let a = StockRecord::new("005930", "삼성전자", Market::Kospi, Sector::It)
            .with_factor(FactorName::Per, 10.0)
            .with_factor(FactorName::Pbr, 1.0);
        let b = StockRecord::new("035720", "카카오, 우선주", Market::Kospi, Sector::It);
        [a, b]
            .iter()
            .map(|s| UniverseRow {
                code: s.code.clone(),
                name: s.name.clone(),
                market: s.market,
                sector: s.sector,
                scores: QuantScores::from_record(s),
            })
            .collect()
    }

    #[test]
    fn test_csv_scores() {
        let csv = format_csv(&rows());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        // 가치 = (PER 점수 70 + PBR 점수 80) / 2
        assert!(lines[1].starts_with("005930,삼성전자,KOSPI,IT,0.00,0.00,75.00,"));
        assert!(lines[2].contains("\"카카오, 우선주\""));
    }

    #[test]
    fn test_table_total() {
        let table = format_table(&rows());
        assert!(table.contains("Total: 2 종목"));
    }
}
