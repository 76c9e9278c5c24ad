use crate::error::{AssemblyError, Result};

/// 在大小为 `threads` 的独立 rayon 线程池中执行 `f`。
/// 结果与线程数无关：并行部分只做互不依赖的计算，合并按固定顺序进行。
pub fn install<T, F>(threads: usize, f: F) -> Result<T>
where
    F: FnOnce() -> T + Send,
    T: Send,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|e| AssemblyError::InvalidParameter(format!("cannot build thread pool: {}", e)))?;
    Ok(pool.install(f))
}
