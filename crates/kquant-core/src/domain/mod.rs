//! 팩터 스코어링과 차트 신호 감지를 위한 도메인 모델.

mod market_data;
mod provider;
mod selection;
mod signal;
mod stock;
mod tick_size;

pub use market_data::*;
pub use provider::*;
pub use selection::*;
pub use signal::*;
pub use stock::*;
pub use tick_size::*;
