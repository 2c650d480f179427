//! KQuant CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # KOSPI 마법공식 상위 20종목
//! kquant score magic -m KOSPI -n 20
//!
//! # 전체 시장 섹터 중립 (비례 배분) + 원시 순위와 분포 비교
//! kquant score sector -m ALL --proportional --compare
//!
//! # 섹터 중립 멀티팩터 (ROE, PER, 12개월 모멘텀), IQR 이상치 제거
//! kquant score snmulti -m KOSPI --outlier iqr --compare
//!
//! # 골든크로스/박스권 돌파만 스캔, CSV 저장
//! kquant scan -m KOSDAQ -d golden_cross,box_breakout -f csv -o signals.csv
//!
//! # 2023년 분기 리밸런싱 마법공식 백테스트
//! kquant backtest magic -m KOSPI --start 2023-01-02 --end 2023-12-28
//!
//! # 감지기 목록
//! kquant detectors
//! ```

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;

use kquant_cli::commands::backtest::{run_backtest, BacktestCommandConfig};
use kquant_cli::commands::output::OutputFormat;
use kquant_cli::commands::scan::{run_scan, ScanConfig};
use kquant_cli::commands::score::{run_score, ScoreConfig, StrategyKind};
use kquant_cli::commands::universe::{run_universe, UniverseConfig};
use kquant_cli::commands::{parse_date, parse_markets};
use kquant_analytics::OutlierMethod;
use kquant_core::{init_logging, AppConfig, LogConfig, Sector};
use kquant_strategy::{ChartDetector, ChartDetectorRegistry, RebalancePeriod, SectorFactor};

#[derive(Parser)]
#[command(name = "kquant")]
#[command(about = "KQuant - 한국 주식 팩터 스코어링 & 차트 신호 엔진", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 팩터 전략으로 종목 선정
    Score {
        /// 전략 (magic, multi, sector, snmulti)
        strategy: String,

        /// 시장 (KOSPI, KOSDAQ, ALL)
        #[arg(short, long, default_value = "ALL")]
        market: String,

        /// 선정 종목 수 (기본: 설정 파일 값)
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// 마법공식 간편 모드 (ROE + 1/PER)
        #[arg(long)]
        simplified: bool,

        /// 섹터 중립 평가 팩터 (momentum_12m, roe, per)
        #[arg(long, default_value = "momentum_12m")]
        factor: String,

        /// 섹터 중립 비례 배분 (기본: 섹터당 고정 수)
        #[arg(long)]
        proportional: bool,

        /// 섹터 중립 결과를 원시 팩터 상위 N과 비교
        #[arg(long)]
        compare: bool,

        /// 이상치 처리 방법 (trim, winsorize, zscore, iqr, mad)
        #[arg(long)]
        outlier: Option<String>,

        /// 평가일 (YYYY-MM-DD, 기본: 오늘)
        #[arg(long)]
        date: Option<String>,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 팩터 전략 리밸런싱 백테스트
    Backtest {
        /// 전략 (magic, multi, sector, snmulti)
        strategy: String,

        /// 시장 (KOSPI, KOSDAQ, ALL)
        #[arg(short, long, default_value = "KOSPI")]
        market: String,

        /// 시작일 (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// 종료일 (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// 선정 종목 수 (기본: 설정 파일 값)
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// 리밸런싱 주기 (monthly, quarterly, yearly)
        #[arg(long, default_value = "quarterly")]
        rebalance: String,

        /// 초기 자본금 (원)
        #[arg(long, default_value = "10000000")]
        capital: f64,

        /// 이상치 처리 방법 (trim, winsorize, zscore, iqr, mad)
        #[arg(long)]
        outlier: Option<String>,

        /// 출력 형식 (table: 성과 요약, csv: 자산 곡선, json: 전체)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 차트 패턴 신호 스캔
    Scan {
        /// 시장 (KOSPI, KOSDAQ, ALL)
        #[arg(short, long, default_value = "ALL")]
        market: String,

        /// 감지기 ID (쉼표 구분, 기본: 설정 파일 값)
        #[arg(short, long, value_delimiter = ',')]
        detectors: Vec<String>,

        /// 종목코드 (쉼표 구분, 기본: 시장 전체)
        #[arg(short, long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// 기준일 (YYYY-MM-DD, 기본: 오늘)
        #[arg(long)]
        date: Option<String>,

        /// 조회 기간 (일, 기본: 설정 파일 값)
        #[arg(long)]
        days: Option<i64>,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// 진행 표시줄 숨김
        #[arg(short, long)]
        quiet: bool,
    },

    /// 종목 유니버스와 종목별 퀀트 점수
    Universe {
        /// 시장 (KOSPI, KOSDAQ, ALL)
        #[arg(short, long, default_value = "ALL")]
        market: String,

        /// 섹터 필터 (예: IT, 바이오, 금융)
        #[arg(long)]
        sector: Option<String>,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 사용 가능한 차트 감지기 목록
    Detectors,
}

fn resolve_date(date: Option<String>) -> Result<NaiveDate> {
    match date {
        Some(s) => parse_date(&s),
        None => Ok(Local::now().date_naive()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let app = AppConfig::load(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config))?;

    init_logging(LogConfig::from_settings(&app.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;
    info!(config = %cli.config, "KQuant 시작");

    match cli.command {
        Commands::Score {
            strategy,
            market,
            top_n,
            simplified,
            factor,
            proportional,
            compare,
            outlier,
            date,
            format,
            output,
        } => {
            let config = ScoreConfig {
                strategy: StrategyKind::parse(&strategy)?,
                markets: parse_markets(&market)?,
                top_n,
                simplified,
                sector_factor: factor
                    .parse::<SectorFactor>()
                    .map_err(|e| anyhow::anyhow!(e))?,
                proportional,
                compare,
                outlier: outlier
                    .map(|name| name.parse::<OutlierMethod>().map_err(|e| anyhow::anyhow!(e)))
                    .transpose()?,
                date: resolve_date(date)?,
                format: OutputFormat::parse(&format)?,
                output,
            };
            let selection = run_score(config, &app).await?;
            info!(
                strategy = %selection.strategy,
                selected = selection.selected_count,
                "종목 선정 완료"
            );
        }

        Commands::Backtest {
            strategy,
            market,
            start,
            end,
            top_n,
            rebalance,
            capital,
            outlier,
            format,
            output,
        } => {
            let config = BacktestCommandConfig {
                strategy: StrategyKind::parse(&strategy)?,
                markets: parse_markets(&market)?,
                top_n,
                outlier: outlier
                    .map(|name| name.parse::<OutlierMethod>().map_err(|e| anyhow::anyhow!(e)))
                    .transpose()?,
                start: parse_date(&start)?,
                end: parse_date(&end)?,
                rebalance: rebalance
                    .parse::<RebalancePeriod>()
                    .map_err(|e| anyhow::anyhow!(e))?,
                initial_capital: capital,
                format: OutputFormat::parse(&format)?,
                output,
            };
            let report = run_backtest(config, &app).await?;
            info!(
                strategy = %report.strategy,
                cagr = report.metrics.cagr,
                mdd = report.metrics.max_drawdown,
                "백테스트 완료"
            );
        }

        Commands::Scan {
            market,
            detectors,
            symbols,
            date,
            days,
            format,
            output,
            quiet,
        } => {
            let config = ScanConfig {
                markets: parse_markets(&market)?,
                detectors,
                codes: symbols,
                date: resolve_date(date)?,
                history_days: days,
                format: OutputFormat::parse(&format)?,
                output,
                quiet,
            };
            let report = run_scan(config, &app).await?;
            info!(
                buys = report.buys.len(),
                sells = report.sells.len(),
                skipped = report.skipped.len(),
                "스캔 완료"
            );
        }

        Commands::Universe {
            market,
            sector,
            format,
            output,
        } => {
            let sector = sector
                .map(|s| s.parse::<Sector>().map_err(|e| anyhow::anyhow!(e)))
                .transpose()?;
            let config = UniverseConfig {
                markets: parse_markets(&market)?,
                sector,
                format: OutputFormat::parse(&format)?,
                output,
            };
            run_universe(config, &app).await?;
        }

        Commands::Detectors => {
            for meta in ChartDetectorRegistry::all() {
                let detector = (meta.factory)();
                println!(
                    "{:<16} {:<20} 최소 {:>3}봉  {}",
                    meta.id,
                    meta.name,
                    detector.min_bars(),
                    meta.description
                );
            }
        }
    }

    Ok(())
}
