//! 两两重叠检测与重叠图构建。
//!
//! 两种可互换的检测方式：
//! - 朴素后缀匹配：以 A 的末尾若干符号为锚点，在 B 中由右向左寻找锚点，
//!   取第一个能与 A 的后缀完全吻合的 B 前缀；
//! - 打分 DP：等长 read 之间的类编辑距离比对，允许少量错配。
//!
//! 两者都对 read 数量是 O(R²)，DP 每对还要 O(L²)。这是已知的扩展瓶颈，
//! 大数据集上只能靠线程池分摊，无法避免。

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::graph::OverlapGraph;
use crate::error::{AssemblyError, Result};
use crate::util::dna;
use crate::util::{pool, CancelToken};

pub const COST_FULL: u32 = 4;
pub const COST_TRANSITION: u32 = COST_FULL / 2;
pub const COST_GAP: u32 = COST_FULL * 2;

const INF: u32 = u32::MAX / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapStrategy {
    /// 锚点 + 精确后缀 / 前缀匹配
    Naive,
    /// 打分 DP，只适用于等长 read
    Scored,
    /// 基于后缀索引的检测，尚未实现
    SuffixIndex,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapOpt {
    pub min_overlap: usize,
    pub mismatch_fraction: f64,
    pub threads: usize,
}

impl Default for OverlapOpt {
    fn default() -> Self {
        Self { min_overlap: 6, mismatch_fraction: 0.1, threads: 1 }
    }
}

/// A 的后缀与 B 的前缀的最长精确重叠（至少 `min_overlap`，A 比锚点短时锚点取整条 A）
pub fn naive_overlap(a: &[u8], b: &[u8], min_overlap: usize) -> Option<usize> {
    let anchor = &a[a.len().saturating_sub(min_overlap)..];
    let n = anchor.len();
    if n == 0 || b.len() < n {
        return None;
    }
    // 锚点在 B 中越靠右，候选前缀越长
    for start in (0..=b.len() - n).rev() {
        if &b[start..start + n] != anchor {
            continue;
        }
        let end = start + n;
        if a.ends_with(&b[..end]) {
            return Some(end);
        }
    }
    None
}

/// DP 行缓冲，可跨调用复用。整张表只需要保留相邻两行。
#[derive(Debug, Default)]
pub struct DpBuffer {
    prev: Vec<u32>,
    cur: Vec<u32>,
}

impl DpBuffer {
    pub fn new() -> Self {
        Self::default()
    }
}

/// 打分重叠检测。替换代价预先算成 256×256 的查找表。
#[derive(Debug, Clone)]
pub struct ScoredOverlap {
    min_overlap: usize,
    mismatch_fraction: f64,
    subst: Vec<u32>,
}

impl ScoredOverlap {
    pub fn new(min_overlap: usize, mismatch_fraction: f64) -> Self {
        let mut subst = vec![0u32; 256 * 256];
        for a in 0..256usize {
            for b in 0..256usize {
                subst[a * 256 + b] = if a == b {
                    0
                } else if dna::is_transition(a as u8, b as u8) {
                    COST_TRANSITION
                } else {
                    COST_FULL
                };
            }
        }
        Self { min_overlap, mismatch_fraction, subst }
    }

    #[inline]
    pub fn substitution(&self, a: u8, b: u8) -> u32 {
        self.subst[(a as usize) << 8 | b as usize]
    }

    /// 最底一行：第 j 列是 A 的某个后缀与 B 的前 j 个符号比对的最小代价
    pub fn bottom_row(&self, a: &[u8], b: &[u8], buf: &mut DpBuffer) -> Vec<u32> {
        let cols = b.len() + 1;
        buf.prev.clear();
        buf.prev.resize(cols, INF);
        buf.prev[0] = 0;
        buf.cur.clear();
        buf.cur.resize(cols, INF);

        for &ca in a {
            buf.cur[0] = 0;
            for j in 1..cols {
                let up = buf.prev[j].saturating_add(COST_GAP);
                let left = buf.cur[j - 1].saturating_add(COST_GAP);
                let diag = buf.prev[j - 1].saturating_add(self.substitution(ca, b[j - 1]));
                buf.cur[j] = up.min(left).min(diag);
            }
            std::mem::swap(&mut buf.prev, &mut buf.cur);
        }
        buf.prev.clone()
    }

    /// 返回可接受的重叠长度；代价超过 `长度 × 错配比例 × 满代价` 时视为无重叠
    pub fn overlap_with_buf(&self, a: &[u8], b: &[u8], buf: &mut DpBuffer) -> Result<Option<usize>> {
        if a.len() != b.len() {
            return Err(AssemblyError::UnequalReadLengths { left: a.len(), right: b.len() });
        }
        if a.is_empty() || self.min_overlap > b.len() {
            return Ok(None);
        }
        let row = self.bottom_row(a, b, buf);
        let mut best: Option<(usize, u32)> = None;
        for (j, &cost) in row.iter().enumerate().skip(self.min_overlap) {
            if best.map_or(true, |(_, c)| cost < c) {
                best = Some((j, cost));
            }
        }
        Ok(best.and_then(|(len, cost)| {
            let allowed = len as f64 * self.mismatch_fraction * COST_FULL as f64;
            (cost as f64 <= allowed).then_some(len)
        }))
    }

    pub fn overlap(&self, a: &[u8], b: &[u8]) -> Result<Option<usize>> {
        self.overlap_with_buf(a, b, &mut DpBuffer::new())
    }
}

/// 为每个 read 建一个结点，按所选策略为每个有序对检测重叠并建边。
///
/// 每个源结点的检测在线程池中独立进行，之后按源结点顺序插入边，
/// 因此结果与线程数无关。
pub fn build_overlap_graph<S: AsRef<[u8]>>(
    reads: &[S],
    strategy: OverlapStrategy,
    opt: &OverlapOpt,
    cancel: &CancelToken,
) -> Result<OverlapGraph> {
    if opt.min_overlap == 0 {
        return Err(AssemblyError::InvalidParameter("minimum overlap must be at least 1".to_string()));
    }
    let mut graph = OverlapGraph::from_reads(reads);
    let ids: Vec<usize> = graph.node_ids().collect();
    info!(reads = reads.len(), nodes = ids.len(), ?strategy, "building overlap graph");

    let edges: Vec<Vec<(usize, usize)>> = match strategy {
        OverlapStrategy::SuffixIndex => {
            return Err(AssemblyError::Unimplemented("suffix-index overlap detection"));
        }
        OverlapStrategy::Naive => {
            let g = &graph;
            let min = opt.min_overlap;
            pool::install(opt.threads, || {
                ids.par_iter()
                    .map(|&a| {
                        cancel.check()?;
                        let va = g.value(a);
                        Ok(ids
                            .iter()
                            .filter(|&&b| b != a)
                            .filter_map(|&b| naive_overlap(va, g.value(b), min).map(|w| (b, w)))
                            .collect::<Vec<_>>())
                    })
                    .collect::<Result<Vec<Vec<(usize, usize)>>>>()
            })??
        }
        OverlapStrategy::Scored => {
            if let Some(&first) = ids.first() {
                let len = graph.value(first).len();
                if let Some(&bad) = ids.iter().find(|&&id| graph.value(id).len() != len) {
                    return Err(AssemblyError::UnequalReadLengths { left: len, right: graph.value(bad).len() });
                }
            }
            let scorer = ScoredOverlap::new(opt.min_overlap, opt.mismatch_fraction);
            let g = &graph;
            pool::install(opt.threads, || {
                ids.par_iter()
                    .map_init(DpBuffer::new, |buf, &a| {
                        cancel.check()?;
                        let va = g.value(a);
                        let mut found = Vec::new();
                        for &b in ids.iter().filter(|&&b| b != a) {
                            if let Some(w) = scorer.overlap_with_buf(va, g.value(b), buf)? {
                                found.push((b, w));
                            }
                        }
                        Ok(found)
                    })
                    .collect::<Result<Vec<Vec<(usize, usize)>>>>()
            })??
        }
    };

    for (&a, found) in ids.iter().zip(edges) {
        for (b, w) in found {
            graph.add_edge(a, b, w);
        }
    }
    info!(nodes = graph.len(), edges = graph.edge_count(), "overlap graph built");
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_reads(v: &[&str]) -> Vec<Vec<u8>> {
        v.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    #[test]
    fn naive_finds_longest_exact_overlap() {
        assert_eq!(naive_overlap(b"ABCDE", b"CDEFG", 2), Some(3));
        assert_eq!(naive_overlap(b"CDEFG", b"FGHIJ", 2), Some(2));
        assert_eq!(naive_overlap(b"CDEFG", b"FGHIJ", 3), None);
        assert_eq!(naive_overlap(b"ABCDE", b"FGHIJ", 2), None);
    }

    #[test]
    fn naive_falls_back_to_shorter_candidate() {
        // 最右侧的锚点 "AB" 给出前缀 "ABxAB"，A 并不以它结尾；退到 "AB"
        assert_eq!(naive_overlap(b"zzAB", b"ABxAB", 2), Some(2));
        // 重复区：最长的可行前缀优先
        assert_eq!(naive_overlap(b"xABAB", b"ABABy", 2), Some(4));
    }

    #[test]
    fn naive_short_read_uses_whole_read_as_anchor() {
        assert_eq!(naive_overlap(b"CD", b"CDEF", 6), Some(2));
        assert_eq!(naive_overlap(b"", b"CDEF", 6), None);
    }

    #[test]
    fn substitution_costs() {
        let s = ScoredOverlap::new(3, 0.1);
        assert_eq!(s.substitution(b'A', b'A'), 0);
        assert_eq!(s.substitution(b'A', b'G'), COST_TRANSITION);
        assert_eq!(s.substitution(b'C', b'T'), COST_TRANSITION);
        assert_eq!(s.substitution(b'A', b'C'), COST_FULL);
    }

    #[test]
    fn scored_exact_overlap() {
        let s = ScoredOverlap::new(6, 0.1);
        assert_eq!(s.overlap(b"GGGACGTACGTT", b"ACGTACGTTCCC").unwrap(), Some(9));
    }

    #[test]
    fn scored_tolerates_one_transition() {
        let s = ScoredOverlap::new(6, 0.1);
        // 第一个 A 换成 G：代价 2 <= 9 * 0.1 * 4
        assert_eq!(s.overlap(b"GGGACGTACGTT", b"GCGTACGTTCCC").unwrap(), Some(9));
    }

    #[test]
    fn scored_rejects_too_many_mismatches() {
        let s = ScoredOverlap::new(6, 0.1);
        assert_eq!(s.overlap(b"AAAAAAAAAAAA", b"CCCCCCCCCCCC").unwrap(), None);
    }

    #[test]
    fn scored_requires_equal_lengths() {
        let s = ScoredOverlap::new(2, 0.1);
        assert_eq!(
            s.overlap(b"ACGT", b"ACG"),
            Err(AssemblyError::UnequalReadLengths { left: 4, right: 3 })
        );
    }

    #[test]
    fn dp_buffer_reuse() {
        let s = ScoredOverlap::new(6, 0.1);
        let mut buf = DpBuffer::new();
        let r1 = s.overlap_with_buf(b"GGGACGTACGTT", b"ACGTACGTTCCC", &mut buf).unwrap();
        let r2 = s.overlap_with_buf(b"AAAAAAAAAAAA", b"CCCCCCCCCCCC", &mut buf).unwrap();
        let r3 = s.overlap_with_buf(b"GGGACGTACGTT", b"ACGTACGTTCCC", &mut buf).unwrap();
        assert_eq!((r1, r2, r3), (Some(9), None, Some(9)));
    }

    #[test]
    fn builds_naive_graph() {
        let reads = to_reads(&["ABCDE", "CDEFG", "FGHIJ"]);
        let opt = OverlapOpt { min_overlap: 2, ..OverlapOpt::default() };
        let g = build_overlap_graph(&reads, OverlapStrategy::Naive, &opt, &CancelToken::new()).unwrap();
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.weight(0, 1), Some(3));
        assert_eq!(g.weight(1, 2), Some(2));
    }

    #[test]
    fn graph_is_independent_of_thread_count() {
        let reads = to_reads(&["ACGTACGTTA", "GTTACCAGTA", "CAGTAGGATC", "GGATCAAACG", "AAACGTACGT"]);
        let build = |threads| {
            let opt = OverlapOpt { min_overlap: 3, threads, ..OverlapOpt::default() };
            let g = build_overlap_graph(&reads, OverlapStrategy::Naive, &opt, &CancelToken::new()).unwrap();
            g.node_ids().flat_map(|a| g.out_edges(a).map(move |(b, w)| (a, b, w)).collect::<Vec<_>>()).collect::<Vec<_>>()
        };
        assert_eq!(build(1), build(4));
    }

    #[test]
    fn scored_graph_rejects_unequal_reads() {
        let reads = to_reads(&["ACGTAC", "ACGTACG"]);
        let err = build_overlap_graph(&reads, OverlapStrategy::Scored, &OverlapOpt::default(), &CancelToken::new())
            .unwrap_err();
        assert_eq!(err, AssemblyError::UnequalReadLengths { left: 6, right: 7 });
    }

    #[test]
    fn suffix_index_fails_loudly() {
        let reads = to_reads(&["ACGTAC"]);
        let err = build_overlap_graph(&reads, OverlapStrategy::SuffixIndex, &OverlapOpt::default(), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, AssemblyError::Unimplemented(_)));
    }

    #[test]
    fn cancelled_build_stops() {
        let token = CancelToken::new();
        token.cancel();
        let reads = to_reads(&["ABCDE", "CDEFG"]);
        let err = build_overlap_graph(&reads, OverlapStrategy::Naive, &OverlapOpt::default(), &token).unwrap_err();
        assert_eq!(err, AssemblyError::Cancelled);
    }
}
