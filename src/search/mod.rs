//! 在前缀导航索引上为读段窗口寻找（近似）出现位置。
//!
//! - [`backtrack`] — 有界错配回溯：在替换预算内穷举分支，取最深匹配及其全部位置
//! - [`greedy`] — 零错配贪心延伸：精确匹配窗口后继续延伸，直到位置唯一
//!
//! 两种策略通过 [`SearchStrategy`] 统一调用，每次评估运行选定一次。

pub mod backtrack;
pub mod greedy;

pub use backtrack::{bounded_mismatch_search, Traversal, MAX_ERROR_BUDGET};
pub use greedy::greedy_unique_extend;

use crate::error::{Result, SearchError};
use crate::index::IndexView;
use crate::util::dna::{self, SubstitutionAlphabet};

/// 最深分支的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// 读段（窗口）已被完全消耗：最强的匹配
    Exhausted,
    /// 遇到没有对应边的字符（NoEdge）
    DeadEnd,
    /// 贪心延伸在位置数降为 1 时停止
    Unique,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowMatch {
    /// 自窗口起点起匹配的长度
    pub depth: usize,
    /// 该深度上的参考起始位置（原始位置，不按深度平移）
    pub occurrences: Vec<usize>,
    pub termination: Termination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// 所有分支都在深度 0 失败，或贪心策略的精确窗口无法匹配
    NoMatch,
    Matched(WindowMatch),
}

impl SearchOutcome {
    pub fn depth(&self) -> usize {
        match self {
            SearchOutcome::NoMatch => 0,
            SearchOutcome::Matched(m) => m.depth,
        }
    }

    pub fn occurrences(&self) -> &[usize] {
        match self {
            SearchOutcome::NoMatch => &[],
            SearchOutcome::Matched(m) => &m.occurrences,
        }
    }
}

/// 每个窗口使用的搜索策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// 窗口内最多 `budget` 个替换
    Backtrack { budget: usize, alphabet: SubstitutionAlphabet, traversal: Traversal },
    /// 精确匹配整个窗口，再沿读段延伸到唯一
    GreedyUnique,
}

impl Default for SearchStrategy {
    fn default() -> Self {
        SearchStrategy::Backtrack {
            budget: 1,
            alphabet: SubstitutionAlphabet::default(),
            traversal: Traversal::default(),
        }
    }
}

impl SearchStrategy {
    /// 搜索 `read[start..start + len]`。
    ///
    /// 回溯策略只在窗口内搜索；贪心策略在窗口之后继续使用读段剩余部分延伸。
    pub fn search_window<I: IndexView>(
        &self,
        index: &I,
        read: &[u8],
        start: usize,
        len: usize,
    ) -> Result<SearchOutcome> {
        if len == 0 {
            return Err(SearchError::EmptyWindow);
        }
        let end = start + len;
        if end > read.len() {
            return Err(SearchError::WindowOutOfBounds { start, len: read.len() });
        }
        match *self {
            SearchStrategy::Backtrack { budget, alphabet, traversal } => {
                bounded_mismatch_search(index, index.root(), &read[..end], start, budget, alphabet, traversal)
            }
            SearchStrategy::GreedyUnique => greedy_unique_extend(index, index.root(), read, start, len),
        }
    }
}

/// `read[from..]` 只能包含 A/C/G/T/N 的编码
pub(crate) fn check_symbols(read: &[u8], from: usize) -> Result<()> {
    match read[from..].iter().position(|&a| a == 0 || a as usize >= dna::SIGMA) {
        Some(i) => Err(SearchError::InvalidSymbol { position: from + i, code: read[from + i] }),
        None => Ok(()),
    }
}

pub(crate) fn check_window_start(read: &[u8], start: usize) -> Result<()> {
    if start >= read.len() {
        return Err(SearchError::WindowOutOfBounds { start, len: read.len() });
    }
    Ok(())
}
