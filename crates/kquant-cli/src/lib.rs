//! KQuant CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 팩터 전략 종목 선정 (`score`)
//! - 차트 신호 스캔 (`scan`)
//! - 유니버스와 종목별 퀀트 점수 조회 (`universe`)
//! - table / csv / json 출력

pub mod commands;

pub use commands::*;
