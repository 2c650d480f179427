//! 결과 출력 형식과 파일/stdout 기록.

use std::fs::File;
use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!(
                "잘못된 출력 형식: {}. 사용 가능: table, csv, json",
                s
            )),
        }
    }
}

/// 파일 또는 stdout에 출력합니다.
pub fn write_output(content: &str, output_path: Option<&str>) -> Result<()> {
    if let Some(path) = output_path {
        let mut file = File::create(path)
            .with_context(|| format!("출력 파일을 만들 수 없습니다: {}", path))?;
        file.write_all(content.as_bytes())
            .context("출력 파일 쓰기 실패")?;
        info!("결과 저장: {}", path);
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// 문자열 자르기 (UTF-8 안전).
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// 한글 등 전각 문자를 2칸으로 계산해 왼쪽 정렬합니다.
pub fn pad(s: &str, width: usize) -> String {
    let display: usize = s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum();
    format!("{}{}", s, " ".repeat(width.saturating_sub(display)))
}

/// CSV 이스케이프 (콤마나 따옴표 포함 시 따옴표로 감싸기).
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// 선택적 수치 필드의 CSV 표현 (결측은 빈 칸).
pub fn csv_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("CSV").unwrap(), OutputFormat::Csv);
        assert!(OutputFormat::parse("xml").is_err());
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("KT&G"), "KT&G");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_pad_counts_wide_chars() {
        assert_eq!(pad("삼성", 6), "삼성  ");
        assert_eq!(pad("LG", 4), "LG  ");
        assert_eq!(truncate("한국타이어앤테크놀로지", 6), "한국타...");
    }
}
