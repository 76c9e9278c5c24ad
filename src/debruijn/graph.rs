use std::collections::HashMap;

/// 结点的平衡状态，只由入度 / 出度两个计数决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balance {
    Balanced,
    SemiBalanced,
    Unbalanced,
}

/// De Bruijn 图结点：一个 (k-1)-mer。
/// 只记录入度和出度，不保存逐条边的列表。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbgNode {
    pub km1mer: Vec<u8>,
    pub n_in: usize,
    pub n_out: usize,
}

impl DbgNode {
    fn new(km1mer: &[u8]) -> Self {
        Self { km1mer: km1mer.to_vec(), n_in: 0, n_out: 0 }
    }

    pub fn balance(&self) -> Balance {
        match self.n_in.abs_diff(self.n_out) {
            0 => Balance::Balanced,
            1 => Balance::SemiBalanced,
            _ => Balance::Unbalanced,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceCounts {
    pub balanced: usize,
    pub semi_balanced: usize,
    pub unbalanced: usize,
}

/// De Bruijn 多重图：结点为 (k-1)-mer，每出现一次 k-mer 就加一条边，允许重边。
///
/// 结点存放在 `nodes` 中并以下标寻址，`adj[i]` 是结点 i 的出边目标（按插入顺序）。
#[derive(Debug, Clone)]
pub struct DeBruijnGraph {
    k: usize,
    nodes: Vec<DbgNode>,
    index: HashMap<Vec<u8>, usize>,
    adj: Vec<Vec<usize>>,
    counts: BalanceCounts,
    head: Option<usize>,
    tail: Option<usize>,
}

impl DeBruijnGraph {
    /// 从 read 构建。长度小于 k 的 read 不产生任何边。
    pub fn build<S: AsRef<[u8]>>(reads: &[S], k: usize) -> Self {
        let mut g = Self::empty(k);
        if k >= 2 {
            for r in reads {
                for kmer in r.as_ref().windows(k) {
                    g.push_edge(&kmer[..k - 1], &kmer[1..]);
                }
            }
        }
        g.classify();
        g
    }

    /// 直接用 (k-1)-mer 边构建，主要供测试构造受控的度分布
    pub fn from_edges<'a, I>(k: usize, edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
    {
        let mut g = Self::empty(k);
        for (l, r) in edges {
            g.push_edge(l, r);
        }
        g.classify();
        g
    }

    fn empty(k: usize) -> Self {
        Self {
            k,
            nodes: Vec::new(),
            index: HashMap::new(),
            adj: Vec::new(),
            counts: BalanceCounts::default(),
            head: None,
            tail: None,
        }
    }

    fn node_id(&mut self, km1mer: &[u8]) -> usize {
        if let Some(&id) = self.index.get(km1mer) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(DbgNode::new(km1mer));
        self.adj.push(Vec::new());
        self.index.insert(km1mer.to_vec(), id);
        id
    }

    fn push_edge(&mut self, left: &[u8], right: &[u8]) {
        let l = self.node_id(left);
        let r = self.node_id(right);
        self.nodes[l].n_out += 1;
        self.nodes[r].n_in += 1;
        self.adj[l].push(r);
    }

    /// 统计平衡状态，并记录半平衡结点中的 head（出度多 1）和 tail（入度多 1）
    fn classify(&mut self) {
        let mut counts = BalanceCounts::default();
        for (i, n) in self.nodes.iter().enumerate() {
            match n.balance() {
                Balance::Balanced => counts.balanced += 1,
                Balance::SemiBalanced => {
                    counts.semi_balanced += 1;
                    if n.n_out > n.n_in {
                        self.head = Some(i);
                    } else {
                        self.tail = Some(i);
                    }
                }
                Balance::Unbalanced => counts.unbalanced += 1,
            }
        }
        self.counts = counts;
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn nodes(&self) -> &[DbgNode] {
        &self.nodes
    }

    pub fn node(&self, id: usize) -> &DbgNode {
        &self.nodes[id]
    }

    pub fn find(&self, km1mer: &[u8]) -> Option<usize> {
        self.index.get(km1mer).copied()
    }

    pub fn successors(&self, id: usize) -> &[usize] {
        &self.adj[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn balance_counts(&self) -> BalanceCounts {
        self.counts
    }

    pub fn head(&self) -> Option<usize> {
        self.head
    }

    pub fn tail(&self) -> Option<usize> {
        self.tail
    }

    pub fn has_eulerian_path(&self) -> bool {
        self.counts.unbalanced == 0 && self.counts.semi_balanced == 2
    }

    pub fn has_eulerian_cycle(&self) -> bool {
        self.counts.unbalanced == 0 && self.counts.semi_balanced == 0
    }

    pub fn is_eulerian(&self) -> bool {
        self.has_eulerian_path() || self.has_eulerian_cycle()
    }

    /// 邻接表的可变副本，遍历时独占使用
    pub(crate) fn working_adjacency(&self) -> Vec<Vec<usize>> {
        self.adj.clone()
    }
}
