//! 종목 스냅샷 도메인 모델.
//!
//! - `Market` - 상장 시장 (KOSPI / KOSDAQ)
//! - `Sector` - 고정된 섹터 분류
//! - `FactorName` - 팩터 컬럼 이름
//! - `StockRecord` - 평가일 기준 종목 한 건의 팩터 스냅샷

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 상장 시장.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    Kospi,
    Kosdaq,
}

impl Market {
    /// 모든 시장.
    pub const ALL: [Market; 2] = [Market::Kospi, Market::Kosdaq];

    /// 합성 데이터 생성에 사용하는 시장별 시드.
    pub fn default_seed(&self) -> u64 {
        match self {
            Market::Kospi => 42,
            Market::Kosdaq => 123,
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::Kospi => write!(f, "KOSPI"),
            Market::Kosdaq => write!(f, "KOSDAQ"),
        }
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "KOSPI" => Ok(Market::Kospi),
            "KOSDAQ" => Ok(Market::Kosdaq),
            _ => Err(format!("Unknown market: {}. Use: KOSPI, KOSDAQ", s)),
        }
    }
}

/// 섹터 분류.
///
/// 선언 순서가 섹터 간 동점 처리 순서로 사용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sector {
    #[serde(rename = "IT")]
    It,
    #[serde(rename = "자동차")]
    Auto,
    #[serde(rename = "바이오")]
    Bio,
    #[serde(rename = "금융")]
    Finance,
    #[serde(rename = "화학")]
    Chemical,
    #[serde(rename = "에너지")]
    Energy,
    #[serde(rename = "통신")]
    Telecom,
    #[serde(rename = "소비재")]
    Consumer,
    #[serde(rename = "건설")]
    Construction,
    #[serde(rename = "산업재")]
    Industrial,
    #[serde(rename = "엔터")]
    Entertainment,
    #[serde(rename = "기타")]
    Etc,
}

impl Sector {
    /// 모든 섹터 (선언 순서).
    pub const ALL: [Sector; 12] = [
        Sector::It,
        Sector::Auto,
        Sector::Bio,
        Sector::Finance,
        Sector::Chemical,
        Sector::Energy,
        Sector::Telecom,
        Sector::Consumer,
        Sector::Construction,
        Sector::Industrial,
        Sector::Entertainment,
        Sector::Etc,
    ];

    /// 한글 섹터명.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::It => "IT",
            Sector::Auto => "자동차",
            Sector::Bio => "바이오",
            Sector::Finance => "금융",
            Sector::Chemical => "화학",
            Sector::Energy => "에너지",
            Sector::Telecom => "통신",
            Sector::Consumer => "소비재",
            Sector::Construction => "건설",
            Sector::Industrial => "산업재",
            Sector::Entertainment => "엔터",
            Sector::Etc => "기타",
        }
    }

    /// 금융 업종(은행/보험/증권 포함) 여부.
    pub fn is_financial(&self) -> bool {
        matches!(self, Sector::Finance)
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sector {
    type Err = String;

    /// 한글 섹터명을 파싱합니다. 은행/보험/증권은 금융으로 묶습니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if ["금융", "보험", "증권", "은행"].iter().any(|k| s.contains(k)) {
            return Ok(Sector::Finance);
        }
        Sector::ALL
            .iter()
            .copied()
            .find(|sector| sector.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown sector: {}", s))
    }
}

/// 팩터 이름.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorName {
    Price,
    MarketCap,
    Per,
    Pbr,
    Psr,
    Pcr,
    Roe,
    Roc,
    EarningsYield,
    Gpa,
    CfoRatio,
    Momentum3m,
    Momentum6m,
    Momentum12m,
    ChangeRate,
}

impl FactorName {
    /// 모든 팩터.
    pub const ALL: [FactorName; 15] = [
        FactorName::Price,
        FactorName::MarketCap,
        FactorName::Per,
        FactorName::Pbr,
        FactorName::Psr,
        FactorName::Pcr,
        FactorName::Roe,
        FactorName::Roc,
        FactorName::EarningsYield,
        FactorName::Gpa,
        FactorName::CfoRatio,
        FactorName::Momentum3m,
        FactorName::Momentum6m,
        FactorName::Momentum12m,
        FactorName::ChangeRate,
    ];

    /// 컬럼 이름 (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            FactorName::Price => "price",
            FactorName::MarketCap => "market_cap",
            FactorName::Per => "per",
            FactorName::Pbr => "pbr",
            FactorName::Psr => "psr",
            FactorName::Pcr => "pcr",
            FactorName::Roe => "roe",
            FactorName::Roc => "roc",
            FactorName::EarningsYield => "earnings_yield",
            FactorName::Gpa => "gpa",
            FactorName::CfoRatio => "cfo_ratio",
            FactorName::Momentum3m => "momentum_3m",
            FactorName::Momentum6m => "momentum_6m",
            FactorName::Momentum12m => "momentum_12m",
            FactorName::ChangeRate => "change_rate",
        }
    }

    /// 낮을수록 좋은 팩터인지 여부 (가치 배수).
    pub fn lower_is_better(&self) -> bool {
        matches!(
            self,
            FactorName::Per | FactorName::Pbr | FactorName::Psr | FactorName::Pcr
        )
    }
}

impl fmt::Display for FactorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 종목 팩터 스냅샷.
///
/// 팩터 값이 없으면 `None`이며, 0으로 대체하지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// 종목 코드 (6자리)
    pub code: String,
    /// 종목명
    pub name: String,
    pub market: Market,
    pub sector: Sector,
    #[serde(default)]
    pub price: Option<f64>,
    /// 시가총액 (원)
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub per: Option<f64>,
    #[serde(default)]
    pub pbr: Option<f64>,
    #[serde(default)]
    pub psr: Option<f64>,
    #[serde(default)]
    pub pcr: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    /// 투하자본수익률 (EBIT / 투하자본)
    #[serde(default)]
    pub roc: Option<f64>,
    /// 이익수익률 (EBIT / EV)
    #[serde(default)]
    pub earnings_yield: Option<f64>,
    /// 매출총이익 / 총자산
    #[serde(default)]
    pub gpa: Option<f64>,
    /// 영업현금흐름 / 총자산
    #[serde(default)]
    pub cfo_ratio: Option<f64>,
    #[serde(default)]
    pub momentum_3m: Option<f64>,
    #[serde(default)]
    pub momentum_6m: Option<f64>,
    #[serde(default)]
    pub momentum_12m: Option<f64>,
    /// 당일 등락률 (%)
    #[serde(default)]
    pub change_rate: Option<f64>,
}

impl StockRecord {
    /// 팩터 값이 모두 비어 있는 새 레코드를 생성합니다.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        market: Market,
        sector: Sector,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            market,
            sector,
            price: None,
            market_cap: None,
            per: None,
            pbr: None,
            psr: None,
            pcr: None,
            roe: None,
            roc: None,
            earnings_yield: None,
            gpa: None,
            cfo_ratio: None,
            momentum_3m: None,
            momentum_6m: None,
            momentum_12m: None,
            change_rate: None,
        }
    }

    /// 팩터 값을 조회합니다. NaN/무한대는 결측으로 취급합니다.
    pub fn factor(&self, name: FactorName) -> Option<f64> {
        let value = match name {
            FactorName::Price => self.price,
            FactorName::MarketCap => self.market_cap,
            FactorName::Per => self.per,
            FactorName::Pbr => self.pbr,
            FactorName::Psr => self.psr,
            FactorName::Pcr => self.pcr,
            FactorName::Roe => self.roe,
            FactorName::Roc => self.roc,
            FactorName::EarningsYield => self.earnings_yield,
            FactorName::Gpa => self.gpa,
            FactorName::CfoRatio => self.cfo_ratio,
            FactorName::Momentum3m => self.momentum_3m,
            FactorName::Momentum6m => self.momentum_6m,
            FactorName::Momentum12m => self.momentum_12m,
            FactorName::ChangeRate => self.change_rate,
        };
        value.filter(|v| v.is_finite())
    }

    /// 팩터 값을 설정합니다 (빌더).
    pub fn with_factor(mut self, name: FactorName, value: f64) -> Self {
        let slot = match name {
            FactorName::Price => &mut self.price,
            FactorName::MarketCap => &mut self.market_cap,
            FactorName::Per => &mut self.per,
            FactorName::Pbr => &mut self.pbr,
            FactorName::Psr => &mut self.psr,
            FactorName::Pcr => &mut self.pcr,
            FactorName::Roe => &mut self.roe,
            FactorName::Roc => &mut self.roc,
            FactorName::EarningsYield => &mut self.earnings_yield,
            FactorName::Gpa => &mut self.gpa,
            FactorName::CfoRatio => &mut self.cfo_ratio,
            FactorName::Momentum3m => &mut self.momentum_3m,
            FactorName::Momentum6m => &mut self.momentum_6m,
            FactorName::Momentum12m => &mut self.momentum_12m,
            FactorName::ChangeRate => &mut self.change_rate,
        };
        *slot = Some(value);
        self
    }

    /// 양수인 경우에만 팩터 값을 반환합니다 (PER, PBR 등 배수용).
    pub fn positive_factor(&self, name: FactorName) -> Option<f64> {
        self.factor(name).filter(|v| *v > 0.0)
    }
}

/// 종목 유니버스의 코드 중복/공백을 검증합니다.
///
/// 문제가 있는 첫 번째 코드를 에러 메시지로 반환합니다.
pub fn validate_universe(records: &[StockRecord]) -> Result<(), String> {
    let mut seen = std::collections::HashSet::with_capacity(records.len());
    for record in records {
        if record.code.trim().is_empty() {
            return Err(format!("빈 종목 코드: {}", record.name));
        }
        if !seen.insert(record.code.as_str()) {
            return Err(format!("중복 종목 코드: {}", record.code));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_parse_and_display() {
        assert_eq!("kospi".parse::<Market>().unwrap(), Market::Kospi);
        assert_eq!("KOSDAQ".parse::<Market>().unwrap(), Market::Kosdaq);
        assert!("NASDAQ".parse::<Market>().is_err());
        assert_eq!(Market::Kosdaq.to_string(), "KOSDAQ");
    }

    #[test]
    fn test_sector_financial_keywords() {
        assert_eq!("은행".parse::<Sector>().unwrap(), Sector::Finance);
        assert_eq!("손해보험".parse::<Sector>().unwrap(), Sector::Finance);
        assert_eq!("바이오".parse::<Sector>().unwrap(), Sector::Bio);
        assert!(Sector::Finance.is_financial());
        assert!(!Sector::It.is_financial());
    }

    #[test]
    fn test_factor_access_filters_non_finite() {
        let record = StockRecord::new("005930", "삼성전자", Market::Kospi, Sector::It)
            .with_factor(FactorName::Per, 12.5)
            .with_factor(FactorName::Roe, f64::NAN);

        assert_eq!(record.factor(FactorName::Per), Some(12.5));
        assert_eq!(record.factor(FactorName::Roe), None);
        assert_eq!(record.factor(FactorName::Pbr), None);
    }

    #[test]
    fn test_positive_factor() {
        let record = StockRecord::new("000001", "적자기업", Market::Kosdaq, Sector::Etc)
            .with_factor(FactorName::Per, -3.0);
        assert_eq!(record.positive_factor(FactorName::Per), None);
    }

    #[test]
    fn test_validate_universe_duplicates() {
        let a = StockRecord::new("005930", "삼성전자", Market::Kospi, Sector::It);
        let b = StockRecord::new("005930", "삼성전자우", Market::Kospi, Sector::It);
        assert!(validate_universe(&[a.clone()]).is_ok());
        assert!(validate_universe(&[a, b]).is_err());
    }

    #[test]
    fn test_sector_serde_uses_korean_name() {
        let json = serde_json::to_string(&Sector::Construction).unwrap();
        assert_eq!(json, "\"건설\"");
    }
}
