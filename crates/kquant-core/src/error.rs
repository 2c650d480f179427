//! 퀀트 엔진의 에러 타입.
//!
//! 이 모듈은 워크스페이스 전반에서 사용되는 에러 타입을 정의합니다.
//! 데이터 부족은 에러가 아니라 후보 제외(또는 신호 없음)로 처리되므로
//! 여기에는 포함되지 않습니다.

use thiserror::Error;

use crate::domain::ProviderError;

/// 핵심 퀀트 에러.
#[derive(Debug, Error)]
pub enum QuantError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 데이터 제공자 에러
    #[error("제공자 에러: {0}")]
    Provider(#[from] ProviderError),

    /// 전략 에러
    #[error("전략 에러: {0}")]
    Strategy(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 퀀트 작업을 위한 Result 타입.
pub type QuantResult<T> = Result<T, QuantError>;

impl QuantError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            QuantError::Provider(err) => err.is_retryable(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for QuantError {
    fn from(err: serde_json::Error) -> Self {
        QuantError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for QuantError {
    fn from(err: config::ConfigError) -> Self {
        QuantError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let network_err = QuantError::Provider(ProviderError::Network("timeout".to_string()));
        assert!(network_err.is_retryable());

        let data_err = QuantError::Data("bad series".to_string());
        assert!(!data_err.is_retryable());
    }

    #[test]
    fn test_error_message_is_korean() {
        let err = QuantError::NotFound("golden_crossx".to_string());
        assert_eq!(err.to_string(), "찾을 수 없음: golden_crossx");
    }
}
