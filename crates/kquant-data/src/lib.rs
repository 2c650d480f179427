//! 데이터 제공자 구현.
//!
//! 이 crate는 다음을 제공합니다:
//! - 내장 KOSPI/KOSDAQ 기본 종목 목록 (`StaticUniverse`)
//! - 대표 종목 섹터 매핑 (`StaticSectorMap`)
//! - 시드 기반 합성 스냅샷/일봉 (`SyntheticProvider`)
//! - 메모리 일봉 저장소 (`InMemoryOhlcv`)

pub mod memory;
pub mod sector_map;
pub mod synthetic;
pub mod universe;

pub use memory::InMemoryOhlcv;
pub use sector_map::{StaticSectorMap, SECTOR_MAP};
pub use synthetic::SyntheticProvider;
pub use universe::{StaticUniverse, KOSDAQ_DEFAULT, KOSPI_DEFAULT};
