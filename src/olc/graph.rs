use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

/// 重叠图结点。出边 / 入边都以结点下标为键、重叠长度为值。
///
/// `by_weight` 是出边目标按重叠长度降序（同长按下标升序）排好的列表，
/// 每次出边集合变化时立即重建。
#[derive(Debug, Clone)]
pub struct OverlapNode {
    value: Vec<u8>,
    out: BTreeMap<usize, usize>,
    entries: BTreeMap<usize, usize>,
    by_weight: Vec<usize>,
    alive: bool,
}

impl OverlapNode {
    fn new(value: &[u8]) -> Self {
        Self {
            value: value.to_vec(),
            out: BTreeMap::new(),
            entries: BTreeMap::new(),
            by_weight: Vec::new(),
            alive: true,
        }
    }

    fn refresh_order(&mut self) {
        let mut v: Vec<(usize, usize)> = self.out.iter().map(|(&d, &w)| (d, w)).collect();
        v.sort_by_key(|&(d, w)| (Reverse(w), d));
        self.by_weight = v.into_iter().map(|(d, _)| d).collect();
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

/// 以 arena 存储的有向带权重叠图。
///
/// 结点身份由序列内容决定：相同内容只会建一个结点。
/// 边只保存下标对，删除结点时同时清理所有邻居的出入边表，
/// 不会留下指向已删除结点的边。已删除结点的序列仍可通过下标读取。
#[derive(Debug, Clone, Default)]
pub struct OverlapGraph {
    nodes: Vec<OverlapNode>,
    index: HashMap<Vec<u8>, usize>,
    live: usize,
}

impl OverlapGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_reads<S: AsRef<[u8]>>(reads: &[S]) -> Self {
        let mut g = Self::new();
        for r in reads {
            g.add_node(r.as_ref());
        }
        g
    }

    /// 返回结点下标；内容已存在时返回已有结点
    pub fn add_node(&mut self, value: &[u8]) -> usize {
        if let Some(&id) = self.index.get(value) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(OverlapNode::new(value));
        self.index.insert(value.to_vec(), id);
        self.live += 1;
        id
    }

    /// 添加 from -> to 的边。重复添加时保留较大的重叠长度，自环被忽略。
    pub fn add_edge(&mut self, from: usize, to: usize, overlap: usize) {
        if from == to || !self.contains(from) || !self.contains(to) {
            return;
        }
        let w = self.nodes[from].out.get(&to).map_or(overlap, |&old| old.max(overlap));
        self.nodes[from].out.insert(to, w);
        self.nodes[from].refresh_order();
        self.nodes[to].entries.insert(from, w);
    }

    pub fn remove_edge(&mut self, from: usize, to: usize) -> Option<usize> {
        let w = self.nodes.get_mut(from)?.out.remove(&to)?;
        self.nodes[from].refresh_order();
        self.nodes[to].entries.remove(&from);
        Some(w)
    }

    /// 删除结点，并把它在删除时刻的出边（按重叠长度降序）返回给调用方
    pub fn remove_node(&mut self, id: usize) -> Vec<(usize, usize)> {
        if !self.contains(id) {
            return Vec::new();
        }
        let order = std::mem::take(&mut self.nodes[id].by_weight);
        let out = std::mem::take(&mut self.nodes[id].out);
        let entries = std::mem::take(&mut self.nodes[id].entries);
        for &dst in out.keys() {
            self.nodes[dst].entries.remove(&id);
        }
        for &src in entries.keys() {
            self.nodes[src].out.remove(&id);
            self.nodes[src].refresh_order();
        }
        self.nodes[id].alive = false;
        self.live -= 1;
        order.into_iter().map(|d| (d, out[&d])).collect()
    }

    #[inline]
    pub fn contains(&self, id: usize) -> bool {
        self.nodes.get(id).map_or(false, |n| n.alive)
    }

    pub fn find(&self, value: &[u8]) -> Option<usize> {
        self.index.get(value).copied().filter(|&id| self.contains(id))
    }

    /// 存活结点数
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// 曾经分配过的下标总数（含已删除结点）
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().enumerate().filter(|(_, n)| n.alive).map(|(i, _)| i)
    }

    pub fn value(&self, id: usize) -> &[u8] {
        &self.nodes[id].value
    }

    pub fn weight(&self, from: usize, to: usize) -> Option<usize> {
        self.nodes.get(from)?.out.get(&to).copied()
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.weight(from, to).is_some()
    }

    pub fn out_edges(&self, id: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes[id].out.iter().map(|(&d, &w)| (d, w))
    }

    pub fn in_edges(&self, id: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes[id].entries.iter().map(|(&s, &w)| (s, w))
    }

    /// 出边目标，按重叠长度降序
    pub fn out_by_weight(&self, id: usize) -> &[usize] {
        &self.nodes[id].by_weight
    }

    pub fn in_degree(&self, id: usize) -> usize {
        self.nodes[id].entries.len()
    }

    pub fn out_degree(&self, id: usize) -> usize {
        self.nodes[id].out.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.alive).map(|n| n.out.len()).sum()
    }

    /// 入度最小的存活结点，同入度时取下标最小者
    pub fn min_in_degree_node(&self) -> Option<usize> {
        self.node_ids().min_by_key(|&id| self.in_degree(id))
    }

    pub fn average_value_length(&self) -> f64 {
        if self.live == 0 {
            return 0.0;
        }
        let total: usize = self.node_ids().map(|id| self.nodes[id].value.len()).sum();
        total as f64 / self.live as f64
    }

    /// 当前图的只读邻接快照，已删除结点没有出边且被标记为不可用
    pub fn snapshot(&self) -> Snapshot<'_> {
        let out = self
            .nodes
            .iter()
            .map(|n| n.by_weight.iter().map(|&d| (d, n.out[&d])).collect())
            .collect();
        let present = self.nodes.iter().map(|n| n.alive).collect();
        Snapshot { graph: self, out, present }
    }
}

/// 不可变的邻接快照：每个结点的出边按重叠长度降序排列。
/// 多次遍历共享同一份快照，各自维护 visited 掩码，不再复制整张图。
#[derive(Debug)]
pub struct Snapshot<'g> {
    graph: &'g OverlapGraph,
    out: Vec<Vec<(usize, usize)>>,
    present: Vec<bool>,
}

impl<'g> Snapshot<'g> {
    pub fn value(&self, id: usize) -> &'g [u8] {
        self.graph.value(id)
    }

    pub fn out(&self, id: usize) -> &[(usize, usize)] {
        &self.out[id]
    }

    pub fn capacity(&self) -> usize {
        self.present.len()
    }

    pub fn is_present(&self, id: usize) -> bool {
        self.present[id]
    }

    pub fn node_ids(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.present.len()).filter(|&i| self.present[i])
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (OverlapGraph, usize, usize, usize) {
        let mut g = OverlapGraph::new();
        let a = g.add_node(b"AAAA");
        let b = g.add_node(b"CCCC");
        let c = g.add_node(b"GGGG");
        g.add_edge(a, b, 3);
        g.add_edge(b, c, 2);
        g.add_edge(a, c, 1);
        (g, a, b, c)
    }

    #[test]
    fn identical_values_share_a_node() {
        let g = OverlapGraph::from_reads(&[b"ACGT".to_vec(), b"TTTT".to_vec(), b"ACGT".to_vec()]);
        assert_eq!(g.len(), 2);
        assert_eq!(g.find(b"ACGT"), Some(0));
        assert_eq!(g.find(b"TTTT"), Some(1));
    }

    #[test]
    fn add_edge_keeps_max_weight_and_ignores_self_loops() {
        let (mut g, a, b, _) = triangle();
        g.add_edge(a, b, 1);
        assert_eq!(g.weight(a, b), Some(3));
        g.add_edge(a, b, 4);
        assert_eq!(g.weight(a, b), Some(4));
        g.add_edge(a, a, 2);
        assert!(!g.has_edge(a, a));
        assert_eq!(g.in_edges(b).collect::<Vec<_>>(), vec![(a, 4)]);
    }

    #[test]
    fn neighbours_sorted_by_weight() {
        let (mut g, a, b, c) = triangle();
        assert_eq!(g.out_by_weight(a), &[b, c]);
        g.add_edge(a, c, 5);
        assert_eq!(g.out_by_weight(a), &[c, b]);
        g.remove_edge(a, c);
        assert_eq!(g.out_by_weight(a), &[b]);
        assert_eq!(g.in_degree(c), 1);
    }

    #[test]
    fn remove_node_updates_neighbours() {
        let (mut g, a, b, c) = triangle();
        let out = g.remove_node(b);
        assert_eq!(out, vec![(c, 2)]);
        assert!(!g.contains(b));
        assert_eq!(g.len(), 2);
        assert_eq!(g.out_degree(a), 1);
        assert_eq!(g.in_degree(c), 1);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.value(b), b"CCCC");
        assert!(g.remove_node(b).is_empty());
        assert_eq!(g.find(b"CCCC"), None);
    }

    #[test]
    fn min_in_degree_breaks_ties_by_id() {
        let (mut g, a, b, c) = triangle();
        assert_eq!(g.min_in_degree_node(), Some(a));
        g.remove_node(a);
        // 删除 a 后 b 入度为 0，c 入度为 1
        assert_eq!(g.min_in_degree_node(), Some(b));
        g.remove_edge(b, c);
        assert_eq!(g.min_in_degree_node(), Some(b));
    }

    #[test]
    fn snapshot_reflects_live_nodes() {
        let (mut g, a, b, c) = triangle();
        g.remove_node(c);
        let s = g.snapshot();
        assert_eq!(s.node_ids().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(s.out(a), &[(b, 3)]);
        assert!(s.out(c).is_empty());
        assert_eq!(s.value(c), b"GGGG");
        assert_eq!(s.len(), 2);
        assert!((g.average_value_length() - 4.0).abs() < 1e-9);
    }
}
