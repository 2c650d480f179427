//! 내장 종목 유니버스.
//!
//! 외부 종목 목록을 가져올 수 없을 때 쓰는 시가총액 상위 기본 목록입니다.

use async_trait::async_trait;

use kquant_core::{Market, ProviderError, UniverseProvider};

/// KOSPI 기본 종목 (시가총액 상위 순).
pub const KOSPI_DEFAULT: &[(&str, &str)] = &[
    ("005930", "삼성전자"), ("000660", "SK하이닉스"), ("373220", "LG에너지솔루션"),
    ("207940", "삼성바이오로직스"), ("005380", "현대차"), ("000270", "기아"),
    ("068270", "셀트리온"), ("035420", "NAVER"), ("006400", "삼성SDI"),
    ("051910", "LG화학"), ("003670", "포스코홀딩스"), ("105560", "KB금융"),
    ("055550", "신한지주"), ("012330", "현대모비스"), ("066570", "LG전자"),
    ("028260", "삼성물산"), ("096770", "SK이노베이션"), ("034730", "SK"),
    ("003550", "LG"), ("032830", "삼성생명"), ("035720", "카카오"),
    ("086790", "하나금융지주"), ("316140", "우리금융지주"), ("010130", "고려아연"),
    ("009150", "삼성전기"), ("033780", "KT&G"), ("011200", "HMM"),
    ("024110", "기업은행"), ("009540", "한국조선해양"), ("017670", "SK텔레콤"),
    ("030200", "KT"), ("034020", "두산에너빌리티"), ("004020", "현대제철"),
    ("011070", "LG이노텍"), ("036570", "NCsoft"), ("047810", "한국항공우주"),
    ("000810", "삼성화재"), ("097950", "CJ제일제당"), ("010950", "S-Oil"),
    ("078930", "GS"), ("090430", "아모레퍼시픽"), ("004990", "롯데지주"),
    ("015760", "한국전력"), ("000100", "유한양행"), ("323410", "카카오뱅크"),
    ("012450", "한화에어로스페이스"), ("011170", "롯데케미칼"), ("009830", "한화솔루션"),
    ("180640", "한진칼"), ("267260", "현대일렉트릭"),
    ("042670", "두산밥캣"), ("010140", "삼성중공업"), ("139480", "이마트"),
    ("377300", "카카오페이"), ("005490", "POSCO"), ("004370", "농심"),
    ("036460", "한국가스공사"), ("011780", "금호석유"), ("018260", "삼성에스디에스"),
    ("088980", "맥쿼리인프라"), ("009240", "한샘"), ("000720", "현대건설"),
    ("006360", "GS건설"), ("003490", "대한항공"), ("020150", "일진머티리얼즈"),
    ("161390", "한국타이어앤테크놀로지"), ("032640", "LG유플러스"), ("047050", "포스코인터내셔널"),
    ("052690", "한전기술"), ("028050", "삼성엔지니어링"), ("008770", "호텔신라"),
    ("014680", "한솔케미칼"), ("000880", "한화"), ("251270", "넷마블"),
    ("361610", "SK아이이테크놀로지"), ("006280", "녹십자"), ("138040", "메리츠금융지주"),
    ("272210", "한화시스템"), ("002790", "아모레G"), ("003230", "삼양식품"),
];

/// KOSDAQ 기본 종목 (시가총액 상위 순).
pub const KOSDAQ_DEFAULT: &[(&str, &str)] = &[
    ("247540", "에코프로비엠"), ("086520", "에코프로"), ("091990", "셀트리온헬스케어"),
    ("263750", "펄어비스"), ("293490", "카카오게임즈"), ("035900", "JYP Ent."),
    ("352820", "하이브"), ("041510", "에스엠"), ("112040", "위메이드"),
    ("196170", "알테오젠"), ("066970", "엘앤에프"), ("028300", "HLB"),
    ("257720", "실리콘투"), ("000250", "삼천당제약"), ("145020", "휴젤"),
    ("095340", "ISC"), ("122870", "와이지엔터테인먼트"), ("039030", "이오테크닉스"),
    ("068760", "셀트리온제약"), ("240810", "원익IPS"), ("005290", "동진쎄미켐"),
    ("357780", "솔브레인"), ("137310", "에스디바이오센서"), ("328130", "루닛"),
    ("053800", "안랩"), ("403870", "HPSP"), ("140410", "메지온"),
    ("058470", "리노공업"), ("214150", "클래시스"), ("041920", "메디아나"),
    ("078600", "대주전자재료"), ("226330", "신테카바이오"), ("067310", "하나마이크론"),
    ("215600", "신라젠"), ("348210", "넥틴"), ("036930", "주성엔지니어링"),
    ("141080", "레고켐바이오"), ("131970", "테스나"), ("083310", "엘오티베큠"),
    ("222080", "씨아이에스"), ("060280", "큐렉소"), ("357550", "석경에이티"),
    ("950140", "잉글우드랩"), ("314930", "바이오다인"), ("039200", "오스코텍"),
    ("090460", "비에이치"), ("043150", "바텍"), ("045970", "코아시아"),
    ("222800", "심텍"), ("038540", "상상인"),
];

/// 고정 목록 기반 유니버스.
#[derive(Debug, Clone)]
pub struct StaticUniverse {
    kospi: Vec<(String, String)>,
    kosdaq: Vec<(String, String)>,
    /// 시장당 최대 종목 수 (0 = 전체)
    limit: usize,
}

impl Default for StaticUniverse {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StaticUniverse {
    /// 내장 기본 목록.
    pub fn builtin() -> Self {
        let own = |list: &[(&str, &str)]| -> Vec<(String, String)> {
            list.iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect()
        };
        Self::new(own(KOSPI_DEFAULT), own(KOSDAQ_DEFAULT))
    }

    pub fn new(kospi: Vec<(String, String)>, kosdaq: Vec<(String, String)>) -> Self {
        Self {
            kospi,
            kosdaq,
            limit: 0,
        }
    }

    /// 시장당 앞에서부터 `limit`개만 사용합니다. 0이면 제한 없음.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// 시장의 종목 목록 (제한 적용).
    pub fn list(&self, market: Market) -> &[(String, String)] {
        let list = match market {
            Market::Kospi => &self.kospi,
            Market::Kosdaq => &self.kosdaq,
        };
        match self.limit {
            0 => list,
            n => &list[..n.min(list.len())],
        }
    }

    /// 코드가 속한 시장.
    pub fn market_of(&self, code: &str) -> Option<Market> {
        Market::ALL
            .into_iter()
            .find(|&m| self.list(m).iter().any(|(c, _)| c == code))
    }

    /// 종목명 조회. 모르는 코드는 코드 그대로 반환합니다.
    pub fn name_of<'a>(&'a self, code: &'a str) -> &'a str {
        self.kospi
            .iter()
            .chain(&self.kosdaq)
            .find(|(c, _)| c == code)
            .map(|(_, name)| name.as_str())
            .unwrap_or(code)
    }
}

#[async_trait]
impl UniverseProvider for StaticUniverse {
    async fn stocks(&self, market: Market) -> Result<Vec<(String, String)>, ProviderError> {
        Ok(self.list(market).to_vec())
    }
}
