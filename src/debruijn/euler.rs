/// 迭代版 Hierholzer 算法。
///
/// 从 `start` 出发不断沿未用过的出边前进（总是取邻接表末尾的边），
/// 走不动时把结点压入 tour 并回退；最后反转 tour 得到遍历顺序。
/// 返回的回路不重复末尾的起点。会消耗 `adj` 中经过的所有边。
pub fn eulerian_circuit(adj: &mut [Vec<usize>], start: usize) -> Vec<usize> {
    let mut tour = Vec::new();
    let mut stack = vec![start];
    while let Some(&v) = stack.last() {
        match adj[v].pop() {
            Some(next) => stack.push(next),
            None => {
                tour.push(v);
                stack.pop();
            }
        }
    }
    tour.reverse();
    tour.pop();
    tour
}

/// 在环形序列中找到 `from -> to` 这一步，把回路旋转成以 `to` 开头、以 `from` 结尾
pub fn rotate_after_step(circuit: &mut [usize], from: usize, to: usize) -> bool {
    let n = circuit.len();
    for i in 0..n {
        let prev = circuit[(i + n - 1) % n];
        if prev == from && circuit[i] == to {
            circuit.rotate_left(i);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_cycle() {
        // 0 -> 1 -> 2 -> 0
        let mut adj = vec![vec![1], vec![2], vec![0]];
        let c = eulerian_circuit(&mut adj, 0);
        assert_eq!(c, vec![0, 1, 2]);
        assert!(adj.iter().all(Vec::is_empty));
    }

    #[test]
    fn splices_sub_cycles() {
        // 0 -> 1 -> 0 以及 1 -> 2 -> 1，共 4 条边
        let mut adj = vec![vec![1], vec![0, 2], vec![1]];
        let c = eulerian_circuit(&mut adj, 0);
        assert_eq!(c.len(), 4);
        assert_eq!(c[0], 0);
        assert!(adj.iter().all(Vec::is_empty));
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let n = 200_000;
        let mut adj: Vec<Vec<usize>> = (0..n).map(|i| vec![(i + 1) % n]).collect();
        let c = eulerian_circuit(&mut adj, 0);
        assert_eq!(c.len(), n);
        assert_eq!(c[n - 1], n - 1);
    }

    #[test]
    fn rotation_cuts_at_step() {
        let mut c = vec![2, 3, 0, 1];
        assert!(rotate_after_step(&mut c, 3, 0));
        assert_eq!(c, vec![0, 1, 2, 3]);
        // 跨越末尾的那一步
        let mut c = vec![0, 1, 2, 3];
        assert!(rotate_after_step(&mut c, 3, 0));
        assert_eq!(c, vec![0, 1, 2, 3]);
        assert!(!rotate_after_step(&mut c, 1, 3));
    }
}
