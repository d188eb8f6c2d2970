use std::cmp::Ordering;

use super::{check_symbols, check_window_start, SearchOutcome, Termination, WindowMatch};
use crate::error::{Result, SearchError};
use crate::index::IndexView;
use crate::util::dna::SubstitutionAlphabet;

/// 允许的最大替换预算；分支数按 |字母表|^预算 增长
pub const MAX_ERROR_BUDGET: usize = 8;

/// 回溯时游标的管理方式。两者结果逐位一致，只影响性能。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Traversal {
    /// 每个分支克隆一次父游标
    #[default]
    Cloning,
    /// 复用同一个游标，下降后用 `ascend` 回到父节点；索引不支持时退回克隆
    ParentLinks,
}

/// 有界错配回溯搜索（branch and bound）。
///
/// 从 `cursor` 出发，用 `read[window_start..]` 逐字符下降：
/// - 预算为 0 时只走字面字符；
/// - 预算大于 0 时按规范顺序（A, C, G, T[, N]）尝试所有分支，
///   与字面字符不同的分支消耗 1 个预算。
///
/// 返回所有分支中到达的最大深度，以及所有到达该深度的分支的位置并集。
/// 读段耗尽是最强的终止状态；所有分支都在深度 0 失败时返回 [`SearchOutcome::NoMatch`]。
///
/// 递归被改写为显式栈（LIFO，分支按字母顺序惰性展开），不受读段长度限制。
pub fn bounded_mismatch_search<I: IndexView>(
    index: &I,
    cursor: I::Cursor,
    read: &[u8],
    window_start: usize,
    budget: usize,
    alphabet: SubstitutionAlphabet,
    traversal: Traversal,
) -> Result<SearchOutcome> {
    check_window_start(read, window_start)?;
    if budget > MAX_ERROR_BUDGET {
        return Err(SearchError::BudgetTooLarge { budget, max: MAX_ERROR_BUDGET });
    }
    check_symbols(read, window_start)?;

    let query = &read[window_start..];
    let outcome = match traversal {
        Traversal::ParentLinks if index.supports_parent_links() => {
            explore(index, &mut Linked { cursor, levels: 0 }, query, budget, alphabet)
        }
        _ => explore(index, &mut Cloning { stack: vec![cursor] }, query, budget, alphabet),
    };
    log::trace!("bounded search at {}: depth={}", window_start, outcome.depth());
    Ok(outcome)
}

/// 持有"当前节点"游标并支持下降/回退的栈
trait Walker<I: IndexView> {
    fn top(&self) -> &I::Cursor;
    /// 尝试下降；成功时新节点成为栈顶
    fn try_push(&mut self, index: &I, symbol: u8) -> bool;
    fn pop(&mut self, index: &I);
}

struct Cloning<C> {
    stack: Vec<C>,
}

impl<I: IndexView> Walker<I> for Cloning<I::Cursor> {
    fn top(&self) -> &I::Cursor {
        // 栈在 explore 结束前不会为空
        &self.stack[self.stack.len() - 1]
    }

    fn try_push(&mut self, index: &I, symbol: u8) -> bool {
        let mut child = Walker::<I>::top(self).clone();
        if index.descend(&mut child, symbol) {
            self.stack.push(child);
            true
        } else {
            false
        }
    }

    fn pop(&mut self, _index: &I) {
        self.stack.pop();
    }
}

struct Linked<C> {
    cursor: C,
    levels: usize,
}

impl<I: IndexView> Walker<I> for Linked<I::Cursor> {
    fn top(&self) -> &I::Cursor {
        &self.cursor
    }

    fn try_push(&mut self, index: &I, symbol: u8) -> bool {
        let ok = index.descend(&mut self.cursor, symbol);
        if ok {
            self.levels += 1;
        }
        ok
    }

    fn pop(&mut self, index: &I) {
        if self.levels > 0 {
            index.ascend(&mut self.cursor);
            self.levels -= 1;
        }
    }
}

/// 一层搜索状态：剩余预算、下一个要尝试的分支、是否已记录过死路
struct Frame {
    budget: usize,
    next: usize,
    dead_end: bool,
}

impl Frame {
    fn new(budget: usize) -> Self {
        Self { budget, next: 0, dead_end: false }
    }
}

/// 最大深度与该深度上的位置集合
struct Best {
    depth: usize,
    occurrences: Vec<usize>,
    termination: Termination,
}

impl Best {
    fn record<I: IndexView>(&mut self, index: &I, cursor: &I::Cursor, depth: usize, termination: Termination) {
        // 深度 0 不算匹配
        if depth == 0 {
            return;
        }
        match depth.cmp(&self.depth) {
            Ordering::Greater => {
                self.depth = depth;
                self.occurrences = index.occurrences(cursor);
                self.termination = termination;
            }
            Ordering::Equal => {
                self.occurrences.extend(index.occurrences(cursor));
                if termination == Termination::Exhausted {
                    self.termination = termination;
                }
            }
            Ordering::Less => {}
        }
    }
}

fn explore<I: IndexView, W: Walker<I>>(
    index: &I,
    walker: &mut W,
    query: &[u8],
    budget: usize,
    alphabet: SubstitutionAlphabet,
) -> SearchOutcome {
    let mut best = Best { depth: 0, occurrences: Vec::new(), termination: Termination::DeadEnd };
    let mut frames = vec![Frame::new(budget)];

    while let Some(d) = frames.len().checked_sub(1) {
        if d == query.len() {
            best.record(index, walker.top(), d, Termination::Exhausted);
            frames.pop();
            walker.pop(index);
            continue;
        }

        let literal = query[d];
        let frame = &mut frames[d];
        let symbol = if frame.budget == 0 {
            (frame.next == 0).then_some(literal)
        } else {
            alphabet.branches(literal).nth(frame.next)
        };
        frame.next += 1;

        let Some(symbol) = symbol else {
            frames.pop();
            walker.pop(index);
            continue;
        };

        let child_budget = frame.budget - usize::from(symbol != literal);
        if walker.try_push(index, symbol) {
            frames.push(Frame::new(child_budget));
        } else if !frame.dead_end {
            // 同一节点的多个失败分支共享同一组位置，只记录一次
            frame.dead_end = true;
            best.record(index, walker.top(), d, Termination::DeadEnd);
        }
    }

    if best.depth == 0 {
        SearchOutcome::NoMatch
    } else {
        SearchOutcome::Matched(WindowMatch {
            depth: best.depth,
            occurrences: best.occurrences,
            termination: best.termination,
        })
    }
}
