//! 可按前缀逐字符下降的全文索引。
//!
//! 搜索算法只依赖 [`IndexView`]：从根出发，每次在已匹配前缀的末尾追加一个字符。
//! 若索引还能 O(1) 回到父状态（parent links），则覆盖 [`IndexView::ascend`]，
//! 回溯搜索可以复用同一个游标而不必克隆。

pub mod fm;
pub mod sa;
pub mod suffix;

pub use fm::FMIndex;
pub use suffix::SuffixArrayIndex;

/// 只读的前缀导航索引。构建后不再修改，可被多个线程同时查询。
pub trait IndexView: Sync {
    /// 表示"当前已匹配前缀"的游标
    type Cursor: Clone;

    /// 已匹配长度为 0 的新游标
    fn root(&self) -> Self::Cursor;

    /// 在已匹配前缀后追加 `symbol`。没有对应的边时返回 false，游标保持不变。
    fn descend(&self, cursor: &mut Self::Cursor, symbol: u8) -> bool;

    /// 与当前前缀一致的参考起始位置数量
    fn occurrence_count(&self, cursor: &Self::Cursor) -> usize;

    /// 与当前前缀一致的参考起始位置（升序）
    fn occurrences(&self, cursor: &Self::Cursor) -> Vec<usize>;

    fn matched_depth(&self, cursor: &Self::Cursor) -> usize;

    /// 被索引文本的长度（不含哨兵）
    fn text_len(&self) -> usize;

    /// 是否支持 O(1) 回到父节点
    fn supports_parent_links(&self) -> bool {
        false
    }

    /// 撤销最近一次成功的下降。位于根或不支持 parent links 时返回 false。
    fn ascend(&self, _cursor: &mut Self::Cursor) -> bool {
        false
    }
}

/// 字面下降整个 `pattern`，失败时返回 None
pub fn find_exact<I: IndexView>(index: &I, pattern: &[u8]) -> Option<I::Cursor> {
    let mut cursor = index.root();
    for &a in pattern {
        if !index.descend(&mut cursor, a) {
            return None;
        }
    }
    Some(cursor)
}
