//! 대표 종목 섹터 분류.

use std::collections::HashMap;

use kquant_core::{Sector, SectorLookup};

/// 내장 종목코드 → 섹터 매핑.
pub const SECTOR_MAP: &[(&str, Sector)] = &[
    ("005930", Sector::It),
    ("000660", Sector::It),
    ("009150", Sector::It),
    ("034220", Sector::It),
    ("035420", Sector::It),
    ("005380", Sector::Auto),
    ("000270", Sector::Auto),
    ("012330", Sector::Auto),
    ("207940", Sector::Bio),
    ("068270", Sector::Bio),
    ("326030", Sector::Bio),
    ("105560", Sector::Finance),
    ("055550", Sector::Finance),
    ("086790", Sector::Finance),
    ("051910", Sector::Chemical),
    ("011170", Sector::Chemical),
    ("011780", Sector::Chemical),
    ("096770", Sector::Energy),
    ("010950", Sector::Energy),
    ("015760", Sector::Energy),
    ("017670", Sector::Telecom),
    ("030200", Sector::Telecom),
    ("032640", Sector::Telecom),
    ("004370", Sector::Consumer),
    ("097950", Sector::Consumer),
    ("000720", Sector::Construction),
    ("006360", Sector::Construction),
    ("010140", Sector::Industrial),
    ("035900", Sector::Entertainment),
    ("352820", Sector::Entertainment),
    ("041510", Sector::Entertainment),
];

/// 고정 매핑 기반 섹터 조회.
#[derive(Debug, Clone)]
pub struct StaticSectorMap {
    map: HashMap<String, Sector>,
}

impl Default for StaticSectorMap {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StaticSectorMap {
    pub fn builtin() -> Self {
        Self {
            map: SECTOR_MAP
                .iter()
                .map(|&(code, sector)| (code.to_string(), sector))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// 매핑을 추가하거나 덮어씁니다.
    pub fn with(mut self, code: impl Into<String>, sector: Sector) -> Self {
        self.map.insert(code.into(), sector);
        self
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl SectorLookup for StaticSectorMap {
    fn sector(&self, code: &str) -> Sector {
        self.map.get(code).copied().unwrap_or(Sector::Etc)
    }
}
