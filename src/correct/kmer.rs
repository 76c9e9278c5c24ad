use std::collections::HashMap;

/// k-mer 频数表：对每条 read 做长度为 k 的滑动窗口计数。
/// 与 k 绑定，k 改变时需要重新构建。
#[derive(Debug, Clone)]
pub struct KmerHistogram {
    k: usize,
    counts: HashMap<Vec<u8>, u32>,
}

impl KmerHistogram {
    pub fn build<S: AsRef<[u8]>>(reads: &[S], k: usize) -> Self {
        let mut counts: HashMap<Vec<u8>, u32> = HashMap::new();
        if k > 0 {
            for r in reads {
                for kmer in r.as_ref().windows(k) {
                    *counts.entry(kmer.to_vec()).or_insert(0) += 1;
                }
            }
        }
        Self { k, counts }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// 未出现的 k-mer 返回 0
    #[inline]
    pub fn count(&self, kmer: &[u8]) -> u32 {
        self.counts.get(kmer).copied().unwrap_or(0)
    }

    /// 不同 k-mer 的数量
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// 所有 k-mer 出现次数的平均值
    pub fn mean_count(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        let total: u64 = self.counts.values().map(|&c| c as u64).sum();
        total as f64 / self.counts.len() as f64
    }
}
