//! 차트 신호 스캔 (`scan`).

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use kquant_core::{AppConfig, ChartSignal, Market, OhlcvProvider, UniverseProvider};
use kquant_strategy::{ChartDetectorRegistry, ScanReport, Scanner};

use super::build_provider;
use super::output::{escape_csv, pad, truncate, write_output, OutputFormat};

/// `scan` 명령 설정.
#[derive(Debug)]
pub struct ScanConfig {
    pub markets: Vec<Market>,
    /// 실행할 감지기 (비어 있으면 설정 파일 값)
    pub detectors: Vec<String>,
    /// 특정 종목만 스캔 (비어 있으면 시장 전체)
    pub codes: Vec<String>,
    /// 기준일 (오늘 봉)
    pub date: NaiveDate,
    /// 조회 기간 (설정 파일 값 대신 사용)
    pub history_days: Option<i64>,
    pub format: OutputFormat,
    pub output: Option<String>,
    /// 진행 표시줄 숨김
    pub quiet: bool,
}

pub async fn run_scan(config: ScanConfig, app: &AppConfig) -> Result<ScanReport> {
    let provider = Arc::new(build_provider(app)?);

    let detector_ids = if config.detectors.is_empty() {
        app.chart.detectors.clone()
    } else {
        config.detectors.clone()
    };
    let detectors = ChartDetectorRegistry::create_many(&detector_ids)
        .with_context(|| format!("감지기 생성 실패 (사용 가능: {})", ChartDetectorRegistry::ids().join(", ")))?;

    let mut stocks: Vec<(String, String)> = Vec::new();
    for &market in &config.markets {
        stocks.extend(provider.stocks(market).await?);
    }
    if !config.codes.is_empty() {
        stocks.retain(|(code, _)| config.codes.contains(code));
    }

    let history_days = config.history_days.unwrap_or(app.chart.history_days);
    let from = config.date - Duration::days(history_days);
    info!(
        stocks = stocks.len(),
        detectors = ?detector_ids,
        %from,
        to = %config.date,
        "차트 스캔 시작"
    );

    let progress = if config.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(stocks.len() as u64)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let ohlcv: Arc<dyn OhlcvProvider> = provider;
    let report = Scanner::new(ohlcv, detectors)
        .scan_with_progress(&stocks, from, config.date, |done, _| progress.set_position(done as u64))
        .await;
    progress.finish_and_clear();

    let content = match config.format {
        OutputFormat::Table => format_table(&report),
        OutputFormat::Csv => format_csv(&report),
        OutputFormat::Json => serde_json::to_string_pretty(&report).context("JSON 직렬화 실패")?,
    };
    write_output(&content, config.output.as_deref())?;

    Ok(report)
}

fn push_rows(output: &mut String, title: &str, signals: &[ChartSignal]) {
    output.push_str(&format!("{} ({}건)\n", title, signals.len()));
    output.push_str(&format!(
        "{:<8} {} {:<16} {:>6} {:>10} {:>10} {:>10}  {}\n",
        "코드", pad("종목명", 20), "감지기", "강도", "현재가", "목표가", "손절가", "근거"
    ));
    output.push_str(&"-".repeat(110));
    output.push('\n');
    // 화면에는 호가 단위 가격, CSV/JSON에는 감지 시점 가격
    for s in signals.iter().map(ChartSignal::tick_rounded) {
        output.push_str(&format!(
            "{:<8} {} {:<16} {:>6.1} {:>10} {:>10} {:>10}  {}\n",
            s.code,
            pad(&truncate(&s.name, 10), 20),
            s.detector,
            s.strength,
            s.price,
            s.target_price.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
            s.stop_loss.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
            s.reason,
        ));
    }
}

/// 테이블 형식 출력.
pub fn format_table(report: &ScanReport) -> String {
    let mut output = String::new();
    push_rows(&mut output, "매수 신호", &report.buys);
    output.push('\n');
    push_rows(&mut output, "매도 신호", &report.sells);
    output.push_str(&format!(
        "\n스캔 {}종목, 건너뜀 {}종목",
        report.scanned,
        report.skipped.len()
    ));
    for skipped in &report.skipped {
        output.push_str(&format!("\n  - {}: {}", skipped.code, skipped.reason));
    }
    output
}

/// CSV 형식 출력 (매수 → 매도 순).
pub fn format_csv(report: &ScanReport) -> String {
    let mut output = String::new();
    output.push_str("kind,code,name,detector,strength,date,price,target_price,stop_loss,reason\n");
    for s in report.buys.iter().chain(&report.sells) {
        output.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            s.kind,
            s.code,
            escape_csv(&s.name),
            s.detector,
            s.strength,
            s.date,
            s.price,
            s.target_price.map(|p| p.to_string()).unwrap_or_default(),
            s.stop_loss.map(|p| p.to_string()).unwrap_or_default(),
            escape_csv(&s.reason),
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use kquant_strategy::SkippedStock;

    fn report() -> ScanReport {
        let date = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        ScanReport {
            buys: vec![ChartSignal::buy("box_breakout", "005930", "삼성전자", date, 71_080.0)
                .with_strength(72.0)
                .with_prices(Some(75_000.0), Some(69_000.0))
                .with_reason("20일 박스권 상단 돌파, 거래량 1.6배")],
            sells: vec![],
            scanned: 2,
            skipped: vec![SkippedStock {
                code: "000660".to_string(),
                reason: "데이터 에러".to_string(),
            }],
        }
    }

    #[test]
    fn test_csv_quotes_reason() {
        let csv = format_csv(&report());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("BUY,005930,삼성전자,box_breakout,72,2024-06-28,71080,75000,69000,"));
        assert!(lines[1].ends_with("\"20일 박스권 상단 돌파, 거래량 1.6배\""));
    }

    #[test]
    fn test_table_reports_skipped() {
        let table = format_table(&report());
        assert!(table.contains("매수 신호 (1건)"));
        assert!(table.contains("건너뜀 1종목"));
        assert!(table.contains("000660"));
    }

    #[test]
    fn test_table_shows_tick_prices() {
        let table = format_table(&report());
        assert!(table.contains("71100"));
        assert!(!table.contains("71080"));
    }
}
