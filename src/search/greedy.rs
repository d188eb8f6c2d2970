use super::{check_symbols, check_window_start, SearchOutcome, Termination, WindowMatch};
use crate::error::{Result, SearchError};
use crate::index::IndexView;

/// 零错配贪心延伸。
///
/// 先精确匹配 `read[window_start..window_start + min_window_len]`，任一字符失败即
/// [`SearchOutcome::NoMatch`]；之后只要位置数大于 1 且读段还有剩余，就继续用下一个
/// 字面字符下降。位置唯一、读段耗尽或遇到死路时停止。
pub fn greedy_unique_extend<I: IndexView>(
    index: &I,
    mut cursor: I::Cursor,
    read: &[u8],
    window_start: usize,
    min_window_len: usize,
) -> Result<SearchOutcome> {
    check_window_start(read, window_start)?;
    if min_window_len == 0 {
        return Err(SearchError::EmptyWindow);
    }
    if window_start + min_window_len > read.len() {
        return Err(SearchError::WindowOutOfBounds { start: window_start, len: read.len() });
    }
    check_symbols(read, window_start)?;

    let window = &read[window_start..window_start + min_window_len];
    if !window.iter().all(|&a| index.descend(&mut cursor, a)) {
        return Ok(SearchOutcome::NoMatch);
    }

    let mut depth = min_window_len;
    let termination = loop {
        if index.occurrence_count(&cursor) <= 1 {
            break Termination::Unique;
        }
        match read.get(window_start + depth) {
            None => break Termination::Exhausted,
            Some(&a) if index.descend(&mut cursor, a) => depth += 1,
            Some(_) => break Termination::DeadEnd,
        }
    };

    log::trace!("greedy extend at {}: depth={} {:?}", window_start, depth, termination);
    Ok(SearchOutcome::Matched(WindowMatch {
        depth,
        occurrences: index.occurrences(&cursor),
        termination,
    }))
}
