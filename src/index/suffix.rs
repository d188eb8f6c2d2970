use super::{sa, IndexView};

/// 朴素后缀数组索引：保存文本与完整 SA，在 SA 区间内二分查找下一个字符。
///
/// 下降沿文本正向进行（追加到前缀末尾），区间栈提供 O(1) 的回退。
#[derive(Debug, Clone)]
pub struct SuffixArrayIndex {
    text: Vec<u8>,
    sa: Vec<u32>,
}

/// SA 区间 [lo, hi) 加上已匹配深度，`parents` 记录每一层的父区间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaCursor {
    lo: usize,
    hi: usize,
    parents: Vec<(usize, usize)>,
}

impl SaCursor {
    fn depth(&self) -> usize {
        self.parents.len()
    }
}

impl SuffixArrayIndex {
    /// `text` 为数值化参考序列（不含哨兵）
    pub fn build(text: Vec<u8>) -> Self {
        let sa = sa::build_sa(&text);
        log::debug!("suffix array index built: {} suffixes", sa.len());
        Self { text, sa }
    }

    /// 后缀 `sa[i]` 在偏移 `depth` 处的字符；后缀已结束时为 0（小于任何碱基）
    #[inline]
    fn char_at(&self, i: usize, depth: usize) -> u8 {
        let p = self.sa[i] as usize + depth;
        if p < self.text.len() {
            self.text[p]
        } else {
            0
        }
    }

    /// [lo, hi) 中第一个不满足 `before` 的位置（以 depth 处字符判断）
    fn lower_bound(&self, mut lo: usize, mut hi: usize, depth: usize, before: impl Fn(u8) -> bool) -> usize {
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if before(self.char_at(mid, depth)) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

impl IndexView for SuffixArrayIndex {
    type Cursor = SaCursor;

    fn root(&self) -> SaCursor {
        SaCursor { lo: 0, hi: self.sa.len(), parents: Vec::new() }
    }

    fn descend(&self, cursor: &mut SaCursor, symbol: u8) -> bool {
        if symbol == 0 {
            return false;
        }
        let d = cursor.depth();
        // 区间内的后缀在深度 d 处按字符有序
        let nl = self.lower_bound(cursor.lo, cursor.hi, d, |c| c < symbol);
        let nr = self.lower_bound(nl, cursor.hi, d, |c| c <= symbol);
        if nl >= nr {
            return false;
        }
        cursor.parents.push((cursor.lo, cursor.hi));
        cursor.lo = nl;
        cursor.hi = nr;
        true
    }

    fn occurrence_count(&self, cursor: &SaCursor) -> usize {
        cursor.hi - cursor.lo
    }

    fn occurrences(&self, cursor: &SaCursor) -> Vec<usize> {
        let mut pos: Vec<usize> = self.sa[cursor.lo..cursor.hi].iter().map(|&p| p as usize).collect();
        pos.sort_unstable();
        pos
    }

    fn matched_depth(&self, cursor: &SaCursor) -> usize {
        cursor.depth()
    }

    fn text_len(&self) -> usize {
        self.text.len()
    }

    fn supports_parent_links(&self) -> bool {
        true
    }

    fn ascend(&self, cursor: &mut SaCursor) -> bool {
        match cursor.parents.pop() {
            Some((lo, hi)) => {
                cursor.lo = lo;
                cursor.hi = hi;
                true
            }
            None => false,
        }
    }
}
