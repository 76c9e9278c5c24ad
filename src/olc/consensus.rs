use crate::error::Result;

/// 把铺排得到的 contig 调和为最终输出。
///
/// 具体的合并算法是可插拔的：实现者要么把彼此重叠的 contig 合成一条序列，
/// 要么给出确定性的多 contig 输出顺序。
pub trait ConsensusBuilder {
    fn build(&self, contigs: Vec<Vec<u8>>) -> Result<Vec<Vec<u8>>>;
}

/// 不做合并：铺排结果按原顺序直接作为最终输出
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmerged;

impl ConsensusBuilder for Unmerged {
    fn build(&self, contigs: Vec<Vec<u8>>) -> Result<Vec<Vec<u8>>> {
        Ok(contigs)
    }
}
