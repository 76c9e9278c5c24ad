use thiserror::Error;

/// 组装过程中可能出现的错误。
///
/// "没有找到重叠" 不是错误（只是不建边），"过滤后没有 contig" 也不是错误，
/// 二者都以 `Ok` 返回。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// 图既不存在欧拉路径也不存在欧拉回路，附带平衡统计便于调用方换算法
    #[error(
        "no Eulerian tour: {balanced} balanced, {semi_balanced} semi-balanced, {unbalanced} unbalanced nodes"
    )]
    NotEulerian {
        balanced: usize,
        semi_balanced: usize,
        unbalanced: usize,
    },

    #[error("de Bruijn graph is empty (no read is at least k symbols long)")]
    EmptyGraph,

    /// 打分重叠 DP 要求等长 read
    #[error("scored overlap requires equal-length reads, got {left} and {right}")]
    UnequalReadLengths { left: usize, right: usize },

    #[error("not implemented: {0}")]
    Unimplemented(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("assembly cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, AssemblyError>;
