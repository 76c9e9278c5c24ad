//! 贪心最短公共超串（SCS）。
//!
//! 先去掉重复 read 和被其他 read 包含的 read，然后每轮合并后缀 / 前缀重叠最长的
//! 一对 read，直到任何一对的重叠都不足 `min_overlap`，最后把剩余 read 按顺序首尾相接。
//! 每轮 O(R²) 次重叠计算，只适合小规模输入。

use tracing::{debug, info};

use crate::error::{AssemblyError, Result};
use crate::olc::naive_overlap;
use crate::util::CancelToken;

fn is_contained(read: &[u8], other: &[u8]) -> bool {
    other.len() > read.len() && other.windows(read.len()).any(|w| w == read)
}

/// 去重并删除被包含的 read，保持首次出现的顺序
fn substring_free<S: AsRef<[u8]>>(reads: &[S]) -> Vec<Vec<u8>> {
    let mut uniq: Vec<Vec<u8>> = Vec::with_capacity(reads.len());
    for r in reads {
        let r = r.as_ref();
        if !uniq.iter().any(|u| u.as_slice() == r) {
            uniq.push(r.to_vec());
        }
    }
    let keep: Vec<bool> = uniq
        .iter()
        .map(|r| !r.is_empty() && !uniq.iter().any(|o| is_contained(r, o)))
        .collect();
    uniq.into_iter().zip(keep).filter(|(_, k)| *k).map(|(r, _)| r).collect()
}

/// 重叠最长的有序对 (i, j, 重叠长度)，并列时取下标顺序最先的
fn best_pair(reads: &[Vec<u8>], min_overlap: usize) -> Option<(usize, usize, usize)> {
    let mut best: Option<(usize, usize, usize)> = None;
    for (i, a) in reads.iter().enumerate() {
        for (j, b) in reads.iter().enumerate() {
            if i == j {
                continue;
            }
            if let Some(olen) = naive_overlap(a, b, min_overlap) {
                if best.map_or(true, |(_, _, l)| olen > l) {
                    best = Some((i, j, olen));
                }
            }
        }
    }
    best
}

pub fn greedy_scs<S: AsRef<[u8]>>(reads: &[S], min_overlap: usize, cancel: &CancelToken) -> Result<Vec<u8>> {
    if min_overlap == 0 {
        return Err(AssemblyError::InvalidParameter("minimum overlap must be at least 1".to_string()));
    }
    let mut pool = substring_free(reads);
    info!(reads = reads.len(), kept = pool.len(), "greedy superstring");

    let mut merges = 0usize;
    while pool.len() > 1 {
        cancel.check()?;
        let Some((i, j, olen)) = best_pair(&pool, min_overlap) else {
            break;
        };
        let tail = pool[j][olen..].to_vec();
        pool[i].extend_from_slice(&tail);
        pool.remove(j);
        merges += 1;
        debug!(i, j, olen, left = pool.len(), "merged");
    }

    let out: Vec<u8> = pool.concat();
    info!(merges, pieces = pool.len(), len = out.len(), "superstring built");
    Ok(out)
}
