use std::collections::HashSet;

use rayon::prelude::*;
use tracing::info;

use super::graph::OverlapGraph;
use crate::error::Result;
use crate::util::{pool, CancelToken};

/// 在未修改的图上找出可能被单跳传递推出的边 node -> X（存在 node -> Y -> X）。
/// 删边只会让见证路径变少，所以真正会被删的边一定在候选集中。
fn transitive_candidates(graph: &OverlapGraph, ids: &[usize], cancel: &CancelToken) -> Result<Vec<HashSet<usize>>> {
    ids.par_iter()
        .map(|&node| {
            cancel.check()?;
            let targets = graph.out_by_weight(node);
            Ok(targets
                .iter()
                .copied()
                .filter(|&x| targets.iter().any(|&y| y != x && graph.has_edge(y, x)))
                .collect::<HashSet<usize>>())
        })
        .collect()
}

/// 删除能由单跳传递推出的边（A -> Y -> X 推出 A -> X），返回删除的边数。
///
/// 对每个结点，先取出边目标按重叠长度降序的快照，再按逆序（重叠最短的先）
/// 逐个检查目标 X：若快照中另一目标 Y 仍与该结点相连且 Y -> X 存在，则删去到 X 的边。
/// 只处理单跳，不追更长的推导链。
///
/// 候选边的查找在线程池中并行完成；实际删除按结点下标顺序串行执行，
/// 结果与纯串行版本一致。每次删除时见证路径都还在，因此可达性不变。
pub fn remove_transitive_edges(graph: &mut OverlapGraph, threads: usize, cancel: &CancelToken) -> Result<usize> {
    let ids: Vec<usize> = graph.node_ids().collect();
    let before = graph.edge_count();
    let candidates = {
        let g = &*graph;
        pool::install(threads, || transitive_candidates(g, &ids, cancel))??
    };

    let mut removed = 0usize;
    for (&node, cands) in ids.iter().zip(&candidates) {
        if cands.is_empty() {
            continue;
        }
        cancel.check()?;
        let order = graph.out_by_weight(node).to_vec();
        for &x in order.iter().rev() {
            if !cands.contains(&x) {
                continue;
            }
            let witness = order
                .iter()
                .any(|&y| y != x && graph.has_edge(node, y) && graph.has_edge(y, x));
            if witness {
                graph.remove_edge(node, x);
                removed += 1;
            }
        }
    }
    info!(before, removed, after = graph.edge_count(), "transitive edges removed");
    Ok(removed)
}
