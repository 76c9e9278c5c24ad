use std::cmp::Reverse;

use tracing::{debug, info};

use super::graph::{OverlapGraph, Snapshot};
use crate::error::Result;
use crate::util::CancelToken;

/// 过滤噪声 contig 时使用的默认比例
pub const DEFAULT_NOISE_FRACTION: f64 = 0.01;

/// 一条 contig 的铺排：依次经过的结点，以及每个结点与前一个结点的重叠长度
/// （首结点的重叠为 0）。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tiling {
    pub steps: Vec<(usize, usize)>,
}

impl Tiling {
    fn start(node: usize) -> Self {
        Self { steps: vec![(node, 0)] }
    }

    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.steps.iter().map(|&(n, _)| n)
    }

    /// 拼接序列：首结点完整，其后每个结点只追加重叠之后的部分
    pub fn spell<'a, F>(&self, value: F) -> Vec<u8>
    where
        F: Fn(usize) -> &'a [u8],
    {
        let mut out = Vec::new();
        for &(node, overlap) in &self.steps {
            let v = value(node);
            out.extend_from_slice(v.get(overlap..).unwrap_or_default());
        }
        out
    }
}

/// 贪心铺排，会消耗整张图。
///
/// 每次取入度最小的存活结点开始新 contig，删除它，然后反复沿重叠最长的出边
/// 走到下一个结点并删除，直到当前结点没有指向存活结点的出边。
/// 所有结点都被访问且只访问一次。
pub fn trace(graph: &mut OverlapGraph, cancel: &CancelToken) -> Result<Vec<Tiling>> {
    let mut tilings = Vec::new();
    while let Some(start) = graph.min_in_degree_node() {
        cancel.check()?;
        let mut tiling = Tiling::start(start);
        let mut out = graph.remove_node(start);
        while let Some(&(next, overlap)) = out.first() {
            tiling.steps.push((next, overlap));
            out = graph.remove_node(next);
        }
        tilings.push(tiling);
    }
    Ok(tilings)
}

fn noise_threshold(node_count: usize, mean_len: f64, noise_fraction: f64) -> f64 {
    node_count as f64 * mean_len * noise_fraction
}

/// OLC 的铺排阶段：贪心遍历并拼出 contig，丢弃长度不超过
/// `结点数 × 平均序列长度 × noise_fraction` 的 contig。结果可能为空。
pub fn layout(mut graph: OverlapGraph, noise_fraction: f64, cancel: &CancelToken) -> Result<Vec<Vec<u8>>> {
    let min_len = noise_threshold(graph.len(), graph.average_value_length(), noise_fraction);
    let tilings = trace(&mut graph, cancel)?;
    let total = tilings.len();
    let contigs: Vec<Vec<u8>> = tilings
        .iter()
        .map(|t| t.spell(|id| graph.value(id)))
        .filter(|c| c.len() as f64 > min_len)
        .collect();
    info!(tilings = total, kept = contigs.len(), min_len, "layout finished");
    Ok(contigs)
}

/// 在快照上从 `start` 出发做一次完整遍历，只修改自己的 visited 掩码。
/// 新 contig 从未访问出邻居最多的未访问结点开始（同数取下标最小）。
fn trace_from(snap: &Snapshot<'_>, start: usize) -> Vec<Tiling> {
    let mut visited: Vec<bool> = (0..snap.capacity()).map(|i| !snap.is_present(i)).collect();
    let mut remaining = snap.len();
    let mut tilings = Vec::new();

    let mut next_start = Some(start);
    while let Some(first) = next_start {
        visited[first] = true;
        remaining -= 1;
        let mut tiling = Tiling::start(first);
        let mut cur = first;
        while let Some(&(next, overlap)) = snap.out(cur).iter().find(|&&(d, _)| !visited[d]) {
            visited[next] = true;
            remaining -= 1;
            tiling.steps.push((next, overlap));
            cur = next;
        }
        tilings.push(tiling);

        next_start = if remaining == 0 {
            None
        } else {
            snap.node_ids()
                .filter(|&i| !visited[i])
                .min_by_key(|&i| Reverse(snap.out(i).iter().filter(|&&(d, _)| !visited[d]).count()))
        };
    }
    tilings
}

/// 依次以每个结点为起点遍历，返回"最长 contig 最长"的那一次的结果（并列取先出现者）。
///
/// 每次尝试的噪声阈值为 `结点数 × 起点序列长度 × noise_fraction`。
/// 所有尝试共享一个不可变快照，不复制图。
pub fn layout_exhaustive(graph: &OverlapGraph, noise_fraction: f64, cancel: &CancelToken) -> Result<Vec<Vec<u8>>> {
    let snap = graph.snapshot();
    let mut best: Option<(usize, Vec<Vec<u8>>)> = None;

    for start in snap.node_ids() {
        cancel.check()?;
        let min_len = noise_threshold(snap.len(), snap.value(start).len() as f64, noise_fraction);
        let contigs: Vec<Vec<u8>> = trace_from(&snap, start)
            .iter()
            .map(|t| t.spell(|id| snap.value(id)))
            .filter(|c| c.len() as f64 > min_len)
            .collect();
        if contigs.is_empty() {
            continue;
        }
        let longest = contigs.iter().map(Vec::len).max().unwrap_or(0);
        debug!(start, contigs = contigs.len(), longest, "layout attempt");
        if best.as_ref().map_or(true, |(l, _)| longest > *l) {
            best = Some((longest, contigs));
        }
    }

    let contigs = best.map(|(_, c)| c).unwrap_or_default();
    info!(starts = snap.len(), kept = contigs.len(), "exhaustive layout finished");
    Ok(contigs)
}
