//! 랭킹 및 팩터 결합 유틸리티.
//!
//! 멀티팩터 전략의 표준 방식인 `Z-Score(Rank(팩터))`를 제공합니다.
//! 동점은 평균 순위로 처리하고, 결측은 순위에서 제외한 채 결측으로 유지합니다.

use std::collections::BTreeMap;

use crate::normalizer::zscore;

/// 순위 계산 (1부터 시작, 동점은 평균 순위).
///
/// `ascending`이 true면 작은 값이 1위입니다.
pub fn rank(values: &[Option<f64>], ascending: bool) -> Vec<Option<f64>> {
    let mut indexed: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|x| x.is_finite()).map(|x| (i, x)))
        .collect();

    indexed.sort_by(|a, b| {
        if ascending {
            a.1.total_cmp(&b.1)
        } else {
            b.1.total_cmp(&a.1)
        }
    });

    let mut ranks = vec![None; values.len()];
    let mut start = 0;
    while start < indexed.len() {
        let mut end = start + 1;
        while end < indexed.len() && indexed[end].1 == indexed[start].1 {
            end += 1;
        }
        // 위치 start+1 ..= end 의 평균
        let avg = (start + 1 + end) as f64 / 2.0;
        for &(i, _) in &indexed[start..end] {
            ranks[i] = Some(avg);
        }
        start = end;
    }
    ranks
}

/// 백분위 순위 (0 ~ 1). 값이 하나뿐이면 0.
pub fn percentile_rank(values: &[Option<f64>], ascending: bool) -> Vec<Option<f64>> {
    let ranks = rank(values, ascending);
    let n = ranks.iter().flatten().count();
    let denom = n.saturating_sub(1).max(1) as f64;
    ranks.into_iter().map(|r| r.map(|r| (r - 1.0) / denom)).collect()
}

/// 순위의 Z-score.
///
/// `ascending = true`(낮을수록 좋은 팩터)이면 좋은 종목일수록 낮은 값이 됩니다.
pub fn zscore_rank(values: &[Option<f64>], ascending: bool) -> Vec<Option<f64>> {
    zscore(&rank(values, ascending))
}

/// 그룹(섹터) 내에서 별도로 `Z-Score(Rank)`를 계산합니다.
pub fn sector_neutral_zscore<K: Ord + Copy>(
    values: &[Option<f64>],
    groups: &[K],
    ascending: bool,
) -> Vec<Option<f64>> {
    let mut buckets: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    for (i, key) in groups.iter().enumerate().take(values.len()) {
        buckets.entry(*key).or_default().push(i);
    }

    let mut result = vec![None; values.len()];
    for indices in buckets.values() {
        let column: Vec<Option<f64>> = indices.iter().map(|&i| values[i]).collect();
        for (&i, z) in indices.iter().zip(zscore_rank(&column, ascending)) {
            result[i] = z;
        }
    }
    result
}

/// 결합할 팩터 컬럼.
#[derive(Debug, Clone, Copy)]
pub struct FactorColumn<'a> {
    pub values: &'a [Option<f64>],
    /// true면 낮을수록 좋은 팩터
    pub ascending: bool,
    pub weight: f64,
}

/// `Σ Z-Score(Rank(팩터_i)) × 가중치_i`.
///
/// 한 팩터라도 결측이면 해당 종목의 점수는 결측입니다.
pub fn combine_factors(columns: &[FactorColumn<'_>]) -> Vec<Option<f64>> {
    let scored: Vec<(Vec<Option<f64>>, f64)> = columns
        .iter()
        .map(|c| (zscore_rank(c.values, c.ascending), c.weight))
        .collect();
    weighted_sum(&scored)
}

/// [`combine_factors`]의 섹터 중립 버전. 팩터마다 그룹 안에서 `Z-Score(Rank)`를 구한 뒤 가중 합산합니다.
///
/// 모든 컬럼이 `ascending`이면 좋은 종목일수록 낮은 값이 됩니다.
pub fn combine_sector_neutral<K: Ord + Copy>(
    columns: &[FactorColumn<'_>],
    groups: &[K],
) -> Vec<Option<f64>> {
    let scored: Vec<(Vec<Option<f64>>, f64)> = columns
        .iter()
        .map(|c| (sector_neutral_zscore(c.values, groups, c.ascending), c.weight))
        .collect();
    weighted_sum(&scored)
}

fn weighted_sum(columns: &[(Vec<Option<f64>>, f64)]) -> Vec<Option<f64>> {
    let len = columns.iter().map(|(z, _)| z.len()).max().unwrap_or(0);
    let mut total = vec![Some(0.0); len];

    for (z, weight) in columns {
        for (i, slot) in total.iter_mut().enumerate() {
            let component = z.get(i).copied().flatten();
            *slot = match (*slot, component) {
                (Some(acc), Some(v)) => Some(acc + v * weight),
                _ => None,
            };
        }
    }
    total
}
