//! # backtrack-bench
//!
//! 在全文索引上定位带噪短读段的基准工具。
//!
//! 本 crate 提供：
//!
//! - **索引视图**：统一的前缀导航接口，附带后缀数组与 FM 索引两种实现
//! - **有界错配回溯**：在替换预算内穷举分支，返回最深匹配与全部位置
//! - **贪心唯一延伸**：零错配基线，延伸到位置唯一为止
//! - **读段模拟**：固定随机算法的可复现突变读段
//! - **评估**：按窗口统计 TP / FN / FP
//!
//! ## 快速示例
//!
//! ```rust
//! use backtrack_bench::eval::{EvalConfig, MatchEvaluator, Orientation};
//! use backtrack_bench::index::{FMIndex, IndexView};
//! use backtrack_bench::search::{bounded_mismatch_search, SearchStrategy, Traversal};
//! use backtrack_bench::util::dna::{self, SubstitutionAlphabet};
//!
//! let reference = dna::encode(b"ACGAACTATAG");
//! let fm = FMIndex::build(&reference, dna::SIGMA as u8, 16);
//!
//! // 两个替换以内的最深匹配
//! let read = dna::encode(b"ANNNNTAGTACG");
//! let out = bounded_mismatch_search(
//!     &fm, fm.root(), &read, 0, 2, SubstitutionAlphabet::Nucleotides, Traversal::Cloning,
//! ).unwrap();
//! assert_eq!(out.depth(), 3);
//!
//! // 按 4bp 窗口评估一条无误差读段
//! let cfg = EvalConfig { window_len: 4, strategy: SearchStrategy::GreedyUnique };
//! let ev = MatchEvaluator::new(&fm, cfg).unwrap();
//! let counters = ev.evaluate(&reference[2..10], 2, Orientation::Forward).unwrap();
//! assert_eq!(counters.windows(), 2);
//! ```
//!
//! ## 模块说明
//!
//! - [`index`] — 索引视图接口、后缀数组与 FM 索引
//! - [`search`] — 有界错配回溯与贪心延伸
//! - [`sim`] — 带噪读段生成
//! - [`eval`] — 窗口评估与计数
//! - [`io`] — FASTA 参考序列读取
//! - [`util`] — DNA 编码 / 反向互补 / 替换字母表

pub mod error;
pub mod eval;
pub mod index;
pub mod io;
pub mod search;
pub mod sim;
pub mod util;

pub use error::SearchError;
