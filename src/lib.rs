//! # seq-assembler
//!
//! 一个小型的序列组装器：把一组相互重叠的短 read 拼接成更长的连续序列（contig）。
//!
//! 同一组 read 可以用三类算法组装：
//!
//! - **贪心最短公共超串（SCS）**：反复合并重叠最长的一对 read
//! - **De Bruijn 图**：k-mer 多重图上的欧拉路径
//! - **Overlap-Layout-Consensus（OLC）**：两两重叠检测、传递边化简、贪心铺排
//!
//! 组装前可以先做基于 k-mer 频数的单错配纠错。
//!
//! ## 快速示例
//!
//! ```rust
//! use seq_assembler::assemble::{assemble, Algorithm, AssembleOpt};
//! use seq_assembler::correct::CorrectOpt;
//! use seq_assembler::util::CancelToken;
//!
//! let reads = ["ABCDE", "CDEFG", "FGHIJ"];
//! let opt = AssembleOpt {
//!     algorithm: Algorithm::Olc,
//!     min_overlap: 2,
//!     correction: CorrectOpt { enabled: false, ..CorrectOpt::default() },
//!     ..AssembleOpt::default()
//! };
//! let asm = assemble(&reads, &opt, &CancelToken::new()).unwrap();
//! assert_eq!(asm.contigs, vec![b"ABCDEFGHIJ".to_vec()]);
//! ```
//!
//! ## 模块说明
//!
//! - [`correct`] — k-mer 频数统计与单错配纠错
//! - [`debruijn`] — De Bruijn 图、平衡性分类、欧拉路径与超串重建
//! - [`olc`] — 重叠图、重叠检测、传递边化简、铺排、contig 调和
//! - [`scs`] — 贪心最短公共超串
//! - [`assemble`] — 参数、算法选择与整体流程
//! - [`io`] — FASTA 读写
//! - [`report`] — JSON 运行报告
//! - [`util`] — 取消令牌、线程池、字母表工具

pub mod assemble;
pub mod correct;
pub mod debruijn;
pub mod error;
pub mod io;
pub mod olc;
pub mod report;
pub mod scs;
pub mod util;

pub use error::{AssemblyError, Result};
