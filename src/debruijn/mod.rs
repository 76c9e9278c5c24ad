//! De Bruijn 图组装：k-mer 多重图 + 欧拉路径 / 回路。
//!
//! 只有当图满足欧拉条件（没有不平衡结点，且半平衡结点恰为 0 或 2 个）时
//! 才能重建超串，否则返回 [`AssemblyError::NotEulerian`]，由调用方决定是否换算法。

pub mod euler;
pub mod graph;

use tracing::{debug, info};

use crate::error::{AssemblyError, Result};

pub use graph::{Balance, BalanceCounts, DbgNode, DeBruijnGraph};

impl DeBruijnGraph {
    /// 欧拉路径（或回路）上的结点序列。
    ///
    /// 路径情形下临时加一条 tail -> head 的边把图闭合成回路，
    /// 求出回路后再在这一步处断开，使结果以 head 开始、以 tail 结束。
    pub fn eulerian_walk(&self) -> Result<Vec<usize>> {
        if self.is_empty() {
            return Err(AssemblyError::EmptyGraph);
        }
        if !self.is_eulerian() {
            let c = self.balance_counts();
            return Err(AssemblyError::NotEulerian {
                balanced: c.balanced,
                semi_balanced: c.semi_balanced,
                unbalanced: c.unbalanced,
            });
        }

        let mut adj = self.working_adjacency();
        let closing = match (self.has_eulerian_path(), self.head(), self.tail()) {
            (true, Some(h), Some(t)) => {
                adj[t].push(h);
                Some((t, h))
            }
            _ => None,
        };

        // 第一个插入的结点一定是某条边的起点
        let mut walk = euler::eulerian_circuit(&mut adj, 0);

        let unused: usize = adj.iter().map(Vec::len).sum();
        if unused > 0 {
            let c = self.balance_counts();
            debug!(unused, "circuit did not reach every edge; graph is disconnected");
            return Err(AssemblyError::NotEulerian {
                balanced: c.balanced,
                semi_balanced: c.semi_balanced,
                unbalanced: c.unbalanced,
            });
        }

        if let Some((t, h)) = closing {
            let cut = euler::rotate_after_step(&mut walk, t, h);
            debug_assert!(cut, "closing edge must appear in the circuit");
        }
        Ok(walk)
    }

    /// 由欧拉路径拼出超串：首结点完整保留，之后每个结点只追加最后一个符号
    pub fn reconstruct(&self) -> Result<Vec<u8>> {
        let walk = self.eulerian_walk()?;
        let mut out = Vec::with_capacity(walk.len() + self.k());
        for (i, &id) in walk.iter().enumerate() {
            let km1 = &self.node(id).km1mer;
            if i == 0 {
                out.extend_from_slice(km1);
            } else if let Some(&last) = km1.last() {
                out.push(last);
            }
        }
        Ok(out)
    }
}

/// 用给定 k 对 read 做 De Bruijn 组装，返回单条超串
pub fn assemble<S: AsRef<[u8]>>(reads: &[S], k: usize) -> Result<Vec<u8>> {
    if k < 2 {
        return Err(AssemblyError::InvalidParameter(format!("de Bruijn k must be at least 2, got {}", k)));
    }
    let graph = DeBruijnGraph::build(reads, k);
    let c = graph.balance_counts();
    info!(
        k,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        balanced = c.balanced,
        semi_balanced = c.semi_balanced,
        unbalanced = c.unbalanced,
        "de Bruijn graph built"
    );
    let s = graph.reconstruct()?;
    info!(len = s.len(), "superstring reconstructed");
    Ok(s)
}
