//! 基于 k-mer 频数的单错配（1-mismatch）纠错。
//!
//! 先从全部原始 read 统计 k-mer 频数，之后对每条 read 逐位置检查：
//! 频数不超过阈值的 k-mer 视为可疑，在汉明距离为 1 的邻居中
//! 寻找第一个频数超过阈值的 k-mer 替换之。
//!
//! 频数表只在开始时计算一次，纠错后不会重新统计，
//! 因此对纠错结果再跑一遍不保证幂等。

pub mod kmer;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::util::dna;
use crate::util::CancelToken;

pub use kmer::KmerHistogram;

/// 纠错参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectOpt {
    pub enabled: bool,
    pub k: usize,
    /// 频数严格大于该值的 k-mer 才被信任
    pub threshold: u32,
}

impl Default for CorrectOpt {
    fn default() -> Self {
        Self { enabled: true, k: 10, threshold: 2 }
    }
}

pub struct ErrorCorrector {
    threshold: u32,
    alphabet: Vec<u8>,
    hist: KmerHistogram,
}

impl ErrorCorrector {
    pub fn new<S: AsRef<[u8]>>(reads: &[S], k: usize, threshold: u32) -> Self {
        let hist = KmerHistogram::build(reads, k);
        let alphabet = dna::alphabet(reads);
        debug!(
            k,
            distinct_kmers = hist.len(),
            mean_count = hist.mean_count(),
            alphabet = alphabet.len(),
            "k-mer histogram built"
        );
        Self { threshold, alphabet, hist }
    }

    pub fn histogram(&self) -> &KmerHistogram {
        &self.hist
    }

    #[inline]
    fn trusted(&self, kmer: &[u8]) -> bool {
        self.hist.count(kmer) > self.threshold
    }

    /// 按固定顺序（最右位置优先，位置内按字母表顺序）找第一个可信邻居
    fn frequent_neighbor(&self, kmer: &[u8]) -> Option<Vec<u8>> {
        let mut cand = kmer.to_vec();
        for j in (0..kmer.len()).rev() {
            let old = kmer[j];
            for &c in &self.alphabet {
                if c == old {
                    continue;
                }
                cand[j] = c;
                if self.trusted(&cand) {
                    return Some(cand);
                }
            }
            cand[j] = old;
        }
        None
    }

    /// 返回纠错后的 read。替换发生后从下一个原始位置继续扫描，
    /// 已经扫过的重叠位置不会重新检查。
    pub fn correct_read(&self, read: &[u8]) -> Vec<u8> {
        let k = self.hist.k();
        let mut out = read.to_vec();
        if k == 0 || out.len() < k {
            return out;
        }
        for i in 0..=out.len() - k {
            if self.trusted(&out[i..i + k]) {
                continue;
            }
            if let Some(nb) = self.frequent_neighbor(&out[i..i + k]) {
                out[i..i + k].copy_from_slice(&nb);
            }
        }
        out
    }

    /// 按输入顺序纠正全部 read
    pub fn correct_all<S: AsRef<[u8]>>(&self, reads: &[S], cancel: &CancelToken) -> Result<Vec<Vec<u8>>> {
        let mut out = Vec::with_capacity(reads.len());
        let mut changed = 0usize;
        for r in reads {
            cancel.check()?;
            let fixed = self.correct_read(r.as_ref());
            if fixed != r.as_ref() {
                changed += 1;
            }
            out.push(fixed);
        }
        info!(reads = reads.len(), changed, "error correction finished");
        Ok(out)
    }
}

/// 便捷入口：构建频数表并纠正全部 read
pub fn correct_reads<S: AsRef<[u8]>>(reads: &[S], opt: &CorrectOpt, cancel: &CancelToken) -> Result<Vec<Vec<u8>>> {
    ErrorCorrector::new(reads, opt.k, opt.threshold).correct_all(reads, cancel)
}
