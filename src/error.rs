use thiserror::Error;

/// 调用方违反契约时的错误。
///
/// 搜索过程中的 NoEdge / 读段耗尽 / 完全无匹配都不是错误，
/// 它们由 [`crate::search::SearchOutcome`] 表达；这里只有需要立即失败的输入问题。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    #[error("window start {start} is outside a read of length {len}")]
    WindowOutOfBounds { start: usize, len: usize },
    #[error("read symbol code {code} at position {position} is not a nucleotide")]
    InvalidSymbol { position: usize, code: u8 },
    #[error("error budget {budget} exceeds the supported maximum of {max}")]
    BudgetTooLarge { budget: usize, max: usize },
    #[error("window length must be positive")]
    EmptyWindow,
    #[error("error spacing must be positive")]
    ZeroErrorSpacing,
    #[error("generator alphabet size must be 4 or 5, got {0}")]
    AlphabetSize(usize),
    #[error("reverse fraction must lie in [0, 1], got {0}")]
    ReverseFraction(f64),
    #[error("reference window {start}+{len} exceeds reference length {reference_len}")]
    ReferenceWindowOutOfBounds { start: usize, len: usize, reference_len: usize },
}

pub type Result<T> = std::result::Result<T, SearchError>;
