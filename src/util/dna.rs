use std::collections::BTreeSet;

/// 所有 read 中出现过的符号，按字节序排列。
/// 字母表不限于 ACGT，任意文本 read 也可以参与组装。
pub fn alphabet<S: AsRef<[u8]>>(reads: &[S]) -> Vec<u8> {
    let mut set = BTreeSet::new();
    for r in reads {
        set.extend(r.as_ref().iter().copied());
    }
    set.into_iter().collect()
}

#[inline]
fn purine_pyrimidine(b: u8) -> Option<u8> {
    match b.to_ascii_uppercase() {
        b'A' | b'G' => Some(0),
        b'C' | b'T' | b'U' => Some(1),
        _ => None,
    }
}

/// 是否属于同一转换（transition）组：{A,G} 或 {C,T}。相同碱基不算。
#[inline]
pub fn is_transition(a: u8, b: u8) -> bool {
    if a.eq_ignore_ascii_case(&b) {
        return false;
    }
    match (purine_pyrimidine(a), purine_pyrimidine(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

pub fn mean_len<S: AsRef<[u8]>>(seqs: &[S]) -> f64 {
    if seqs.is_empty() {
        return 0.0;
    }
    let total: usize = seqs.iter().map(|s| s.as_ref().len()).sum();
    total as f64 / seqs.len() as f64
}
