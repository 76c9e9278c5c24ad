//! Overlap-Layout-Consensus 组装。
//!
//! - [`overlap`] — 两两重叠检测，构建重叠图
//! - [`graph`] — arena 形式的重叠图
//! - [`simplify`] — 删除单跳传递边
//! - [`layout`] — 贪心铺排，生成 contig
//! - [`consensus`] — contig 调和策略

pub mod consensus;
pub mod graph;
pub mod layout;
pub mod overlap;
pub mod simplify;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::util::CancelToken;

pub use consensus::{ConsensusBuilder, Unmerged};
pub use graph::OverlapGraph;
pub use overlap::{build_overlap_graph, naive_overlap, OverlapOpt, OverlapStrategy, ScoredOverlap};

/// OLC 的几种组合方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OlcVariant {
    /// 朴素重叠 + 以每个结点为起点各铺排一次，取最长结果
    Exhaustive,
    /// 朴素重叠 + 传递边化简 + 贪心铺排
    Greedy,
    /// 打分 DP 重叠 + 化简 + 铺排 + 调和
    Scored,
    /// 后缀索引重叠（未实现）
    SuffixIndex,
}

impl OlcVariant {
    pub fn strategy(self) -> OverlapStrategy {
        match self {
            OlcVariant::Exhaustive | OlcVariant::Greedy => OverlapStrategy::Naive,
            OlcVariant::Scored => OverlapStrategy::Scored,
            OlcVariant::SuffixIndex => OverlapStrategy::SuffixIndex,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OlcOpt {
    pub overlap: OverlapOpt,
    pub simplify: bool,
    pub noise_fraction: f64,
}

impl Default for OlcOpt {
    fn default() -> Self {
        Self {
            overlap: OverlapOpt::default(),
            simplify: true,
            noise_fraction: layout::DEFAULT_NOISE_FRACTION,
        }
    }
}

/// 完整的 OLC 流程，返回 contig（可能为空）
pub fn assemble<S, C>(reads: &[S], variant: OlcVariant, opt: &OlcOpt, consensus: &C, cancel: &CancelToken) -> Result<Vec<Vec<u8>>>
where
    S: AsRef<[u8]>,
    C: ConsensusBuilder + ?Sized,
{
    let mut graph = build_overlap_graph(reads, variant.strategy(), &opt.overlap, cancel)?;

    if variant == OlcVariant::Exhaustive {
        return layout::layout_exhaustive(&graph, opt.noise_fraction, cancel);
    }

    // 阈值依赖结点数和平均长度，化简不改变二者
    if opt.simplify {
        simplify::remove_transitive_edges(&mut graph, opt.overlap.threads, cancel)?;
    }
    let contigs = layout::layout(graph, opt.noise_fraction, cancel)?;
    let merged = consensus.build(contigs)?;
    info!(?variant, contigs = merged.len(), "OLC assembly finished");
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssemblyError;

    fn to_reads(v: &[&str]) -> Vec<Vec<u8>> {
        v.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    fn opt(min_overlap: usize) -> OlcOpt {
        OlcOpt { overlap: OverlapOpt { min_overlap, ..OverlapOpt::default() }, ..OlcOpt::default() }
    }

    #[test]
    fn greedy_olc_example() {
        let reads = to_reads(&["ABCDE", "CDEFG", "FGHIJ"]);
        let out = assemble(&reads, OlcVariant::Greedy, &opt(2), &Unmerged, &CancelToken::new()).unwrap();
        assert_eq!(out, vec![b"ABCDEFGHIJ".to_vec()]);
    }

    #[test]
    fn simplification_drops_shortcut_before_layout() {
        // r0 -> r1 -> r2，另有 r0 -> r2 的短重叠
        let reads = to_reads(&["AAAACCCC", "CCCCGGGG", "CCGGGGTT"]);
        let out = assemble(&reads, OlcVariant::Greedy, &opt(2), &Unmerged, &CancelToken::new()).unwrap();
        assert_eq!(out, vec![b"AAAACCCCGGGGTT".to_vec()]);
    }

    #[test]
    fn scored_olc_on_equal_length_reads() {
        let genome = b"ATGGCGTACGTTAGCCTAGGCTAACGTTGCA";
        let reads: Vec<Vec<u8>> = (0..=genome.len() - 12).step_by(4).map(|i| genome[i..i + 12].to_vec()).collect();
        let out = assemble(&reads, OlcVariant::Scored, &opt(6), &Unmerged, &CancelToken::new()).unwrap();
        // 最后一条 read 止于第 28 个碱基
        assert_eq!(out, vec![genome[..28].to_vec()]);
    }

    #[test]
    fn suffix_index_variant_is_unimplemented() {
        let reads = to_reads(&["ABCDE"]);
        let err = assemble(&reads, OlcVariant::SuffixIndex, &opt(2), &Unmerged, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, AssemblyError::Unimplemented(_)));
    }
}
