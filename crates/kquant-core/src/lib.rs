//! # KQuant Core
//!
//! 한국 주식 퀀트 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 종목 스냅샷 (`StockRecord`) 및 팩터 이름
//! - 일봉 OHLCV 데이터
//! - 차트 신호 및 종목 선정 결과
//! - KRX 호가 단위 처리
//! - 데이터 제공자 trait
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
