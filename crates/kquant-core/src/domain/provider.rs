//! 외부 데이터 제공자 trait.
//!
//! 종목 유니버스, 섹터 분류, 팩터 스냅샷, 일봉 이력을 가져오는 인터페이스입니다.
//! 실시간 소스와 시드 기반 합성 데이터 생성기가 동일한 계약을 구현하므로
//! 스코어러와 감지기는 데이터 출처와 무관하게 동작합니다.
//!
//! 캐시나 연결은 전역 상태가 아니라 구현체가 소유하며,
//! 호출자는 `Arc<dyn ...>`로 명시적으로 주입합니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use super::market_data::OhlcvBar;
use super::stock::{Market, Sector, StockRecord};

/// 데이터 제공자 에러.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// API 에러
    #[error("API 에러: {0}")]
    Api(String),

    /// 파싱 에러
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 데이터 없음
    #[error("데이터 없음: {0}")]
    NotFound(String),

    /// 지원하지 않는 기능
    #[error("지원하지 않는 기능: {0}")]
    Unsupported(String),
}

impl ProviderError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Network(_))
    }
}

// =============================================================================
// Provider Traits
// =============================================================================

/// 시장별 종목 목록 제공자.
#[async_trait]
pub trait UniverseProvider: Send + Sync {
    /// 시장의 (종목코드, 종목명) 목록을 반환합니다.
    async fn stocks(&self, market: Market) -> Result<Vec<(String, String)>, ProviderError>;
}

/// 종목코드 → 섹터 조회.
pub trait SectorLookup: Send + Sync {
    /// 알 수 없는 종목은 `Sector::Etc`를 반환합니다.
    fn sector(&self, code: &str) -> Sector;
}

/// 평가일 기준 팩터 스냅샷 제공자.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// 시장 전체 종목의 팩터 스냅샷.
    async fn snapshot(&self, market: Market) -> Result<Vec<StockRecord>, ProviderError>;
}

/// 일봉 이력 제공자.
#[async_trait]
pub trait OhlcvProvider: Send + Sync {
    /// `from`..=`to` 구간의 일봉 (날짜 오름차순).
    async fn ohlcv(
        &self,
        code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ProviderError>;
}
