//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 기본값 → TOML 파일 → `KQUANT_` 환경 변수 순서로 덮어씁니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{QuantError, QuantResult};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 팩터 정규화 설정
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    /// 팩터 전략 기본값
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// 차트 신호 스캔 설정
    #[serde(default)]
    pub chart: ChartConfig,
    /// 데이터 소스 설정
    #[serde(default)]
    pub data: DataConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 윈저라이징 분위수 설정.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// 하위 분위수 (기본 0.01)
    pub winsorize_lower: f64,
    /// 상위 분위수 (기본 0.99)
    pub winsorize_upper: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            winsorize_lower: 0.01,
            winsorize_upper: 0.99,
        }
    }
}

/// 멀티팩터 가중치.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FactorWeights {
    pub quality: f64,
    pub value: f64,
    pub momentum: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            quality: 0.333,
            value: 0.333,
            momentum: 0.334,
        }
    }
}

impl FactorWeights {
    /// 가중치 합계.
    pub fn sum(&self) -> f64 {
        self.quality + self.value + self.momentum
    }

    /// 합계가 1.0인지 확인합니다 (허용 오차 1e-6).
    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() <= 1e-6
    }
}

/// 팩터 전략 기본값.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// 선정 종목 수
    pub top_n: usize,
    /// 최소 시가총액 (원)
    pub min_market_cap: f64,
    /// 금융주 제외 여부
    pub exclude_financials: bool,
    /// 섹터당 종목 수 (섹터 중립, 균등 배분)
    pub stocks_per_sector: usize,
    /// 멀티팩터 가중치
    pub weights: FactorWeights,
    /// 이상치 처리 방법 (trim, winsorize, zscore, iqr, mad). 없으면 윈저라이징만
    pub outlier_method: Option<String>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            top_n: 30,
            min_market_cap: 0.0,
            exclude_financials: true,
            stocks_per_sector: 3,
            weights: FactorWeights::default(),
            outlier_method: None,
        }
    }
}

/// 차트 신호 스캔 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartConfig {
    /// 실행할 감지기 ID 목록
    pub detectors: Vec<String>,
    /// 조회할 과거 일수
    pub history_days: i64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            detectors: vec![
                "golden_cross".to_string(),
                "volume_breakout".to_string(),
                "accumulation".to_string(),
                "ma_bounce".to_string(),
                "box_breakout".to_string(),
                "triple_ma".to_string(),
            ],
            history_days: 200,
        }
    }
}

/// 데이터 소스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// 데이터 소스 (현재는 synthetic만 지원)
    pub source: String,
    /// 시장당 최대 종목 수 (0 = 전체)
    pub max_stocks: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: "synthetic".to_string(),
            max_stocks: 0,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> QuantResult<Self> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드 (예: KQUANT_STRATEGY__TOP_N=20)
            .add_source(
                config::Environment::with_prefix("KQUANT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> QuantResult<Self> {
        Self::load("config/default.toml")
    }

    /// 값 범위를 검증합니다.
    pub fn validate(&self) -> QuantResult<()> {
        let n = &self.normalizer;
        if !(0.0..1.0).contains(&n.winsorize_lower)
            || !(0.0..=1.0).contains(&n.winsorize_upper)
            || n.winsorize_lower >= n.winsorize_upper
        {
            return Err(QuantError::Config(format!(
                "윈저라이징 분위수가 올바르지 않습니다: lower={}, upper={}",
                n.winsorize_lower, n.winsorize_upper
            )));
        }

        if self.strategy.top_n == 0 {
            return Err(QuantError::Config("top_n은 0보다 커야 합니다".to_string()));
        }

        if self.chart.history_days <= 0 {
            return Err(QuantError::Config(
                "history_days는 0보다 커야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.strategy.top_n, 30);
        assert_eq!(config.chart.detectors.len(), 6);
        assert!(config.strategy.weights.is_normalized());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let raw = r#"
            [strategy]
            top_n = 10
            min_market_cap = 100000000000.0
            exclude_financials = false
            stocks_per_sector = 2
        "#;
        let config: AppConfig = toml::from_str(raw).unwrap();

        assert_eq!(config.strategy.top_n, 10);
        assert!(!config.strategy.exclude_financials);
        assert_eq!(config.strategy.weights, FactorWeights::default());
        assert_eq!(config.normalizer.winsorize_lower, 0.01);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_winsorize_bounds() {
        let mut config = AppConfig::default();
        config.normalizer.winsorize_lower = 0.5;
        config.normalizer.winsorize_upper = 0.4;
        assert!(matches!(config.validate(), Err(QuantError::Config(_))));
    }

    #[test]
    fn test_weights_sum() {
        let weights = FactorWeights {
            quality: 0.5,
            value: 0.5,
            momentum: 0.5,
        };
        assert!(!weights.is_normalized());
        assert!((weights.sum() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.data.source, "synthetic");
    }
}
