//! 신호에 덧붙일 보조 지표.
//!
//! 감지기 판단에는 쓰지 않고 스캔 결과를 읽는 사람이 참고하도록 마지막 봉 기준 값을 모읍니다.

use std::collections::BTreeMap;

use kquant_analytics::indicators::{
    atr, bollinger_bands, ema, macd, rsi, volume_ma, volume_ratio, AtrParams,
    BollingerBandsParams, EmaParams, MacdParams, RsiParams,
};
use kquant_core::{closes, volumes, OhlcvBar};

/// 마지막 봉 기준 보조 지표.
///
/// 키: `rsi_14`, `macd`, `macd_signal`, `macd_histogram`, `ema_20`, `bb_upper`, `bb_lower`,
/// `bb_position` (하단 0, 상단 1), `atr_14`, `volume_ma_20`, `volume_ratio_20`.
/// 데이터가 부족한 지표는 빠집니다.
pub fn technical_indicators(series: &[OhlcvBar]) -> BTreeMap<&'static str, f64> {
    let mut out = BTreeMap::new();
    if series.is_empty() {
        return out;
    }
    let close = closes(series);
    let vols = volumes(series);
    let today = close[close.len() - 1];

    if let Some(Some(v)) = rsi(&close, RsiParams::default()).ok().and_then(|r| r.last().copied()) {
        out.insert("rsi_14", v);
    }
    // EMA는 첫 값에서 시작하므로 장기 기간만큼 쌓인 뒤에만 의미가 있음
    let macd_params = MacdParams::default();
    if close.len() >= macd_params.slow_period {
        if let Some(p) = macd(&close, macd_params).ok().and_then(|m| m.last().copied()) {
            out.insert("macd", p.macd);
            out.insert("macd_signal", p.signal);
            out.insert("macd_histogram", p.histogram);
        }
    }
    if close.len() >= 20 {
        if let Some(v) = ema(&close, EmaParams { period: 20 }).ok().and_then(|e| e.last().copied()) {
            out.insert("ema_20", v);
        }
    }
    if let Some(Some(band)) = bollinger_bands(&close, BollingerBandsParams::default())
        .ok()
        .and_then(|b| b.last().copied())
    {
        out.insert("bb_upper", band.upper);
        out.insert("bb_lower", band.lower);
        let width = band.upper - band.lower;
        if width > 0.0 {
            out.insert("bb_position", (today - band.lower) / width);
        }
    }
    if let Some(Some(v)) = atr(series, AtrParams::default()).ok().and_then(|a| a.last().copied()) {
        out.insert("atr_14", v);
    }
    if vols.len() >= 20 {
        if let Some(v) = volume_ma(&vols, 20).ok().and_then(|m| m.last().copied()) {
            out.insert("volume_ma_20", v);
        }
    }
    if let Some(Some(v)) = volume_ratio(&vols, 20).ok().and_then(|r| r.last().copied()) {
        out.insert("volume_ratio_20", v);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::bars;
    use super::*;

    #[test]
    fn test_short_series_has_no_window_indicators() {
        let series = bars(&[100.0, 101.0, 102.0], &[1_000, 1_000, 1_000]);
        let ind = technical_indicators(&series);
        assert!(!ind.contains_key("rsi_14"));
        assert!(!ind.contains_key("macd"));
        assert!(!ind.contains_key("bb_position"));
        assert!(technical_indicators(&[]).is_empty());
    }

    #[test]
    fn test_steady_uptrend() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let mut vols = vec![1_000u64; 60];
        vols[59] = 3_000;
        let ind = technical_indicators(&bars(&closes, &vols));

        // 하락이 없으면 RSI 100
        assert_eq!(ind["rsi_14"], 100.0);
        assert!(ind["macd"] > 0.0);
        assert!(ind["ema_20"] < 159.0);
        // 꾸준한 상승에서 종가는 밴드 위쪽
        assert!(ind["bb_position"] > 0.5);
        assert!(ind["atr_14"] > 0.0);
        assert!((ind["volume_ratio_20"] - 3.0).abs() < 1e-12);
    }
}
