use serde::{Deserialize, Serialize};

use crate::assemble::{AssembleOpt, Assembly, AssemblyStats};

/// 一次运行的 JSON 报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub version: String,
    pub timestamp: String,
    pub input: String,
    pub output: String,
    pub reads: usize,
    /// 实际使用的算法（回退后可能与 `options.algorithm` 不同）
    pub algorithm: String,
    pub options: AssembleOpt,
    pub stats: AssemblyStats,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn new(input: &str, output: &str, reads: usize, opt: &AssembleOpt, asm: &Assembly, elapsed_ms: u64) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            input: input.to_string(),
            output: output.to_string(),
            reads,
            algorithm: asm.algorithm.to_string(),
            options: *opt,
            stats: asm.stats(),
            elapsed_ms,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
