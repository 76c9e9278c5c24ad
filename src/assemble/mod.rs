//! 组装驱动：参数、算法选择、可选纠错与分发。

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::correct::{self, CorrectOpt};
use crate::debruijn;
use crate::error::{AssemblyError, Result};
use crate::olc::{self, OlcOpt, OlcVariant, OverlapOpt, Unmerged};
use crate::scs;
use crate::util::{dna, CancelToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// 贪心最短公共超串
    Scs,
    /// De Bruijn 图 + 欧拉路径
    DeBruijn,
    /// 朴素重叠，尝试所有起点
    OlcNaive,
    /// 朴素重叠 + 化简 + 贪心铺排
    Olc,
    /// 打分 DP 重叠（read 必须等长）
    OlcDynamic,
    /// 后缀索引重叠（未实现）
    OlcSuffix,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Scs => "scs",
            Algorithm::DeBruijn => "de-bruijn",
            Algorithm::OlcNaive => "olc-naive",
            Algorithm::Olc => "olc",
            Algorithm::OlcDynamic => "olc-dynamic",
            Algorithm::OlcSuffix => "olc-suffix",
        }
    }

    fn olc_variant(self) -> Option<OlcVariant> {
        match self {
            Algorithm::OlcNaive => Some(OlcVariant::Exhaustive),
            Algorithm::Olc => Some(OlcVariant::Greedy),
            Algorithm::OlcDynamic => Some(OlcVariant::Scored),
            Algorithm::OlcSuffix => Some(OlcVariant::SuffixIndex),
            Algorithm::Scs | Algorithm::DeBruijn => None,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 组装参数，可整体从 JSON 配置文件读入；缺省字段取默认值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssembleOpt {
    pub algorithm: Algorithm,
    /// De Bruijn 的 k-mer 长度
    pub k: usize,
    pub correction: CorrectOpt,
    pub min_overlap: usize,
    pub mismatch_fraction: f64,
    pub simplify: bool,
    pub threads: usize,
    pub noise_fraction: f64,
}

impl Default for AssembleOpt {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Olc,
            k: 10,
            correction: CorrectOpt::default(),
            min_overlap: 6,
            mismatch_fraction: 0.1,
            simplify: true,
            threads: 1,
            noise_fraction: olc::layout::DEFAULT_NOISE_FRACTION,
        }
    }
}

impl AssembleOpt {
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| -> Result<()> { Err(AssemblyError::InvalidParameter(msg)) };
        if self.k < 2 {
            return bad(format!("k must be at least 2, got {}", self.k));
        }
        if self.correction.k == 0 {
            return bad("correction k must be at least 1".to_string());
        }
        if self.min_overlap == 0 {
            return bad("minimum overlap must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.mismatch_fraction) {
            return bad(format!("mismatch fraction must lie in [0, 1], got {}", self.mismatch_fraction));
        }
        if !(0.0..=1.0).contains(&self.noise_fraction) {
            return bad(format!("noise fraction must lie in [0, 1], got {}", self.noise_fraction));
        }
        if self.threads == 0 {
            return bad("threads must be at least 1".to_string());
        }
        Ok(())
    }

    fn olc(&self) -> OlcOpt {
        OlcOpt {
            overlap: OverlapOpt {
                min_overlap: self.min_overlap,
                mismatch_fraction: self.mismatch_fraction,
                threads: self.threads,
            },
            simplify: self.simplify,
            noise_fraction: self.noise_fraction,
        }
    }
}

/// contig 的长度统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssemblyStats {
    pub contigs: usize,
    pub total_len: usize,
    pub longest: usize,
    pub n50: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub algorithm: Algorithm,
    pub contigs: Vec<Vec<u8>>,
}

impl Assembly {
    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    pub fn stats(&self) -> AssemblyStats {
        let mut lens: Vec<usize> = self.contigs.iter().map(Vec::len).collect();
        lens.sort_unstable_by(|a, b| b.cmp(a));
        let total_len: usize = lens.iter().sum();
        let mut acc = 0usize;
        let mut n50 = 0usize;
        for &l in &lens {
            acc += l;
            if acc * 2 >= total_len {
                n50 = l;
                break;
            }
        }
        AssemblyStats {
            contigs: lens.len(),
            total_len,
            longest: lens.first().copied().unwrap_or(0),
            n50,
        }
    }
}

fn single(seq: Vec<u8>) -> Vec<Vec<u8>> {
    if seq.is_empty() {
        Vec::new()
    } else {
        vec![seq]
    }
}

fn run<S: AsRef<[u8]>>(reads: &[S], opt: &AssembleOpt, cancel: &CancelToken) -> Result<Vec<Vec<u8>>> {
    match opt.algorithm {
        Algorithm::Scs => scs::greedy_scs(reads, opt.min_overlap, cancel).map(single),
        Algorithm::DeBruijn => debruijn::assemble(reads, opt.k).map(single),
        algo => {
            let variant = algo.olc_variant().ok_or(AssemblyError::Unimplemented("unknown OLC variant"))?;
            olc::assemble(reads, variant, &opt.olc(), &Unmerged, cancel)
        }
    }
}

/// 按 `opt` 组装 read。结果可以没有任何 contig，这不算错误。
pub fn assemble<S: AsRef<[u8]>>(reads: &[S], opt: &AssembleOpt, cancel: &CancelToken) -> Result<Assembly> {
    opt.validate()?;
    info!(reads = reads.len(), mean_len = dna::mean_len(reads), algorithm = %opt.algorithm, "assembly started");

    let contigs = if opt.correction.enabled {
        let corrected = correct::correct_reads(reads, &opt.correction, cancel)?;
        run(&corrected, opt, cancel)?
    } else {
        run(reads, opt, cancel)?
    };

    let asm = Assembly { algorithm: opt.algorithm, contigs };
    let st = asm.stats();
    if asm.is_empty() {
        warn!(algorithm = %opt.algorithm, "assembly produced no contigs");
    } else {
        info!(contigs = st.contigs, total_len = st.total_len, longest = st.longest, n50 = st.n50, "assembly finished");
    }
    Ok(asm)
}

/// 与 [`assemble`] 相同，但当图不满足欧拉条件时改用 `fallback` 算法重试
pub fn assemble_with_fallback<S: AsRef<[u8]>>(
    reads: &[S],
    opt: &AssembleOpt,
    fallback: Algorithm,
    cancel: &CancelToken,
) -> Result<Assembly> {
    match assemble(reads, opt, cancel) {
        Err(err @ AssemblyError::NotEulerian { .. }) if fallback != opt.algorithm => {
            warn!(%err, %fallback, "retrying with fallback algorithm");
            let retry = AssembleOpt { algorithm: fallback, ..*opt };
            assemble(reads, &retry, cancel)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_reads(v: &[&str]) -> Vec<Vec<u8>> {
        v.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    fn opt(algorithm: Algorithm) -> AssembleOpt {
        AssembleOpt {
            algorithm,
            min_overlap: 2,
            correction: CorrectOpt { enabled: false, ..CorrectOpt::default() },
            ..AssembleOpt::default()
        }
    }

    #[test]
    fn default_options() {
        let o = AssembleOpt::default();
        assert_eq!(o.algorithm, Algorithm::Olc);
        assert_eq!(o.k, 10);
        assert_eq!(o.min_overlap, 6);
        assert!(o.correction.enabled && o.simplify);
        assert!(o.validate().is_ok());
    }

    #[test]
    fn every_overlap_strategy_on_the_chain_example() {
        let reads = to_reads(&["ABCDE", "CDEFG", "FGHIJ"]);
        for algo in [Algorithm::Scs, Algorithm::OlcNaive, Algorithm::Olc] {
            let asm = assemble(&reads, &opt(algo), &CancelToken::new()).unwrap();
            assert_eq!(asm.contigs, vec![b"ABCDEFGHIJ".to_vec()], "{}", algo);
            assert_eq!(asm.algorithm, algo);
        }
    }

    #[test]
    fn de_bruijn_example() {
        let reads = to_reads(&["konstantynopoli", "politanczykowianeczka"]);
        let o = AssembleOpt { k: 5, ..opt(Algorithm::DeBruijn) };
        let asm = assemble(&reads, &o, &CancelToken::new()).unwrap();
        assert_eq!(asm.contigs, vec![b"konstantynopolitanczykowianeczka".to_vec()]);
    }

    #[test]
    fn suffix_variant_is_unimplemented() {
        let reads = to_reads(&["ABCDE", "CDEFG"]);
        let err = assemble(&reads, &opt(Algorithm::OlcSuffix), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, AssemblyError::Unimplemented(_)));
    }

    #[test]
    fn dynamic_variant_rejects_unequal_reads() {
        let reads = to_reads(&["ABCDE", "CDEFGH"]);
        let err = assemble(&reads, &opt(Algorithm::OlcDynamic), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, AssemblyError::UnequalReadLengths { .. }));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let reads = to_reads(&["ABCDE"]);
        let cases = [
            AssembleOpt { k: 1, ..opt(Algorithm::DeBruijn) },
            AssembleOpt { min_overlap: 0, ..opt(Algorithm::Olc) },
            AssembleOpt { mismatch_fraction: 1.5, ..opt(Algorithm::OlcDynamic) },
            AssembleOpt { threads: 0, ..opt(Algorithm::Olc) },
            AssembleOpt { noise_fraction: -0.1, ..opt(Algorithm::Olc) },
        ];
        for o in cases {
            let err = assemble(&reads, &o, &CancelToken::new()).unwrap_err();
            assert!(matches!(err, AssemblyError::InvalidParameter(_)), "{:?}", o);
        }
    }

    #[test]
    fn falls_back_when_not_eulerian() {
        // 两条不相干的 read：De Bruijn 图不连通
        let reads = to_reads(&["AAAACCCC", "GGGGTTTT"]);
        let o = AssembleOpt { k: 4, min_overlap: 3, ..opt(Algorithm::DeBruijn) };
        assert!(matches!(
            assemble(&reads, &o, &CancelToken::new()),
            Err(AssemblyError::NotEulerian { .. })
        ));
        let asm = assemble_with_fallback(&reads, &o, Algorithm::Olc, &CancelToken::new()).unwrap();
        assert_eq!(asm.algorithm, Algorithm::Olc);
        assert_eq!(asm.contigs, vec![b"AAAACCCC".to_vec(), b"GGGGTTTT".to_vec()]);
    }

    #[test]
    fn correction_runs_before_assembly() {
        // 第四条 read 的 X 是孤立错误
        let reads = to_reads(&["ABCDEFGH", "ABCDEFGH", "ABCDEFGH", "ABCXEFGH"]);
        let o = AssembleOpt {
            correction: CorrectOpt { enabled: true, k: 3, threshold: 1 },
            ..opt(Algorithm::Scs)
        };
        let asm = assemble(&reads, &o, &CancelToken::new()).unwrap();
        assert_eq!(asm.contigs, vec![b"ABCDEFGH".to_vec()]);
    }

    #[test]
    fn stats_of_contigs() {
        let asm = Assembly {
            algorithm: Algorithm::Olc,
            contigs: vec![vec![b'A'; 2], vec![b'C'; 8], vec![b'G'; 3], vec![b'T'; 5]],
        };
        let st = asm.stats();
        assert_eq!(st.contigs, 4);
        assert_eq!(st.total_len, 18);
        assert_eq!(st.longest, 8);
        // 8 + 5 = 13 >= 9
        assert_eq!(st.n50, 5);
        assert_eq!(Assembly { algorithm: Algorithm::Scs, contigs: Vec::new() }.stats(), AssemblyStats::default());
    }

    #[test]
    fn options_from_partial_json() {
        let o: AssembleOpt =
            serde_json::from_str(r#"{"algorithm":"de-bruijn","k":7,"correction":{"enabled":false}}"#).unwrap();
        assert_eq!(o.algorithm, Algorithm::DeBruijn);
        assert_eq!(o.k, 7);
        assert!(!o.correction.enabled);
        assert_eq!(o.correction.k, 10);
        assert_eq!(o.min_overlap, 6);
    }
}
