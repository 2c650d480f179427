//! 차트 감지기 레지스트리.
//!
//! 내장 감지기를 ID로 조회하고 기본 파라미터 인스턴스를 생성합니다.

use serde_json::json;

use kquant_core::{QuantError, QuantResult};

use super::{
    Accumulation, BoxBreakout, ChartDetector, GoldenCross, MaBounce, TripleMa, VolumeBreakout,
};

/// 감지기 메타데이터.
#[derive(Clone)]
pub struct DetectorMeta {
    /// 감지기 ID (영문, snake_case)
    pub id: &'static str,
    /// 표시 이름 (한글)
    pub name: &'static str,
    /// 설명
    pub description: &'static str,
    /// 기본 파라미터 인스턴스 생성
    pub factory: fn() -> Box<dyn ChartDetector>,
}

impl std::fmt::Debug for DetectorMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorMeta")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("factory", &"<fn>")
            .finish()
    }
}

static DETECTORS: &[DetectorMeta] = &[
    DetectorMeta {
        id: GoldenCross::ID,
        name: "골든크로스",
        description: "단기 이동평균이 장기 이동평균을 상향 돌파하면 매수, 하향 돌파하면 매도",
        factory: || Box::new(GoldenCross::default()),
    },
    DetectorMeta {
        id: VolumeBreakout::ID,
        name: "거래량 급증",
        description: "거래량이 평균의 2배 이상이고 가격이 2% 이상 움직이면 신호",
        factory: || Box::new(VolumeBreakout::default()),
    },
    DetectorMeta {
        id: Accumulation::ID,
        name: "매집봉 탐지",
        description: "거래량 증가 + 짧은 양봉 = 세력 매집 신호",
        factory: || Box::new(Accumulation::default()),
    },
    DetectorMeta {
        id: MaBounce::ID,
        name: "이평선 지지",
        description: "20/60/120일선에서 지지받고 반등시 매수",
        factory: || Box::new(MaBounce::default()),
    },
    DetectorMeta {
        id: BoxBreakout::ID,
        name: "박스권 돌파",
        description: "박스권 고점을 거래량 동반 돌파시 매수, 저점 이탈시 매도",
        factory: || Box::new(BoxBreakout::default()),
    },
    DetectorMeta {
        id: TripleMa::ID,
        name: "3중 이평선 정배열",
        description: "5일선 > 20일선 > 60일선 정배열 시작시 매수",
        factory: || Box::new(TripleMa),
    },
];

/// 차트 감지기 조회 API.
pub struct ChartDetectorRegistry;

impl ChartDetectorRegistry {
    /// 등록된 모든 감지기 (등록 순서).
    pub fn all() -> impl Iterator<Item = &'static DetectorMeta> + Clone {
        DETECTORS.iter()
    }

    /// ID로 검색.
    pub fn find(id: &str) -> Option<&'static DetectorMeta> {
        Self::all().find(|meta| meta.id == id)
    }

    /// 기본 파라미터 인스턴스 생성.
    pub fn create(id: &str) -> QuantResult<Box<dyn ChartDetector>> {
        Self::find(id)
            .map(|meta| (meta.factory)())
            .ok_or_else(|| QuantError::NotFound(format!("차트 감지기 '{}'", id)))
    }

    /// 여러 ID를 한 번에 생성합니다. 하나라도 모르는 ID면 에러.
    pub fn create_many<S: AsRef<str>>(ids: &[S]) -> QuantResult<Vec<Box<dyn ChartDetector>>> {
        ids.iter().map(|id| Self::create(id.as_ref())).collect()
    }

    /// 모든 감지기 인스턴스.
    pub fn create_all() -> Vec<Box<dyn ChartDetector>> {
        Self::all().map(|meta| (meta.factory)()).collect()
    }

    /// 감지기 ID 목록.
    pub fn ids() -> Vec<&'static str> {
        Self::all().map(|meta| meta.id).collect()
    }

    /// 감지기 목록 JSON.
    pub fn to_json() -> serde_json::Value {
        let detectors: Vec<_> = Self::all()
            .map(|meta| {
                let detector = (meta.factory)();
                json!({
                    "id": meta.id,
                    "name": meta.name,
                    "description": meta.description,
                    "minBars": detector.min_bars(),
                })
            })
            .collect();
        json!({ "detectors": detectors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_in_registration_order() {
        assert_eq!(
            ChartDetectorRegistry::ids(),
            vec![
                "golden_cross",
                "volume_breakout",
                "accumulation",
                "ma_bounce",
                "box_breakout",
                "triple_ma"
            ]
        );
    }

    #[test]
    fn test_factory_ids_match_metadata() {
        for meta in ChartDetectorRegistry::all() {
            assert_eq!((meta.factory)().id(), meta.id);
        }
    }

    #[test]
    fn test_create_unknown() {
        assert!(matches!(
            ChartDetectorRegistry::create("head_and_shoulders"),
            Err(QuantError::NotFound(_))
        ));
        assert!(ChartDetectorRegistry::create_many(&["golden_cross", "nope"]).is_err());
        assert_eq!(
            ChartDetectorRegistry::create_many(&["golden_cross", "triple_ma"])
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_min_bars() {
        let min = |id: &str| ChartDetectorRegistry::create(id).unwrap().min_bars();
        assert_eq!(min("golden_cross"), 22);
        assert_eq!(min("volume_breakout"), 21);
        assert_eq!(min("accumulation"), 21);
        assert_eq!(min("ma_bounce"), 123);
        assert_eq!(min("box_breakout"), 21);
        assert_eq!(min("triple_ma"), 62);
    }

    #[test]
    fn test_to_json() {
        let json = ChartDetectorRegistry::to_json();
        assert_eq!(json["detectors"].as_array().unwrap().len(), 6);
    }
}
