use super::{sa, IndexView};

/// 建立在**反向**参考序列上的 FM 索引。
///
/// FM 索引的反向搜索每步在模式前端追加一个字符；对反向文本做反向搜索，
/// 等价于在原文本上把查询从左到右逐字符延伸，因此可直接实现 [`IndexView`]。
/// - 字母以 [0..sigma) 编码，0 为 $。
/// - Occ 采用定长分块采样，块内顺扫补偿。
/// - 保存完整 SA，位置换算：反向文本中的 SA 值 j、深度 d 对应原文本起点 n - j - d。
/// - 不支持 O(1) 回退父节点，回溯时需要克隆游标。
#[derive(Debug)]
pub struct FMIndex {
    pub sigma: u8,
    pub block: u32,
    /// 原文本长度（不含哨兵）
    n: usize,
    /// C[i] = 文本中字母 < i 的累计数量
    c: Vec<u32>,
    /// BWT 序列（与 SA 同长度）
    bwt: Vec<u8>,
    /// occ_samples[block_id * sigma + c]
    occ_samples: Vec<u32>,
    sa: Vec<u32>,
}

/// SA 区间 [lo, hi) 与已匹配深度；Copy，克隆开销为常数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmCursor {
    lo: usize,
    hi: usize,
    depth: usize,
}

impl FMIndex {
    /// `text` 为数值化参考序列（不含哨兵），`block` 为 Occ 采样间隔
    pub fn build(text: &[u8], sigma: u8, block: usize) -> Self {
        let n = text.len();
        let mut rev: Vec<u8> = text.iter().rev().copied().collect();
        rev.push(0);
        let sa = sa::build_sa(&rev);
        let bwt: Vec<u8> = sa
            .iter()
            .map(|&p| {
                let i = p as usize;
                if i == 0 { rev[rev.len() - 1] } else { rev[i - 1] }
            })
            .collect();

        let sigma_us = sigma as usize;
        let block = block.max(1);
        // 计算 C 表
        let mut freq = vec![0u32; sigma_us];
        for &ch in &bwt {
            if let Some(f) = freq.get_mut(ch as usize) {
                *f += 1;
            }
        }
        let mut c = vec![0u32; sigma_us];
        let mut acc = 0u32;
        for (slot, f) in c.iter_mut().zip(&freq) {
            *slot = acc;
            acc += f;
        }

        // 记录每块起始位置之前的累计
        let mut occ_samples = Vec::with_capacity((bwt.len() + block - 1) / block * sigma_us);
        let mut running = vec![0u32; sigma_us];
        for chunk in bwt.chunks(block) {
            occ_samples.extend_from_slice(&running);
            for &ch in chunk {
                if let Some(r) = running.get_mut(ch as usize) {
                    *r += 1;
                }
            }
        }

        log::debug!("FM index built: n={} bwt={} block={}", n, bwt.len(), block);
        Self { sigma, block: block as u32, n, c, bwt, occ_samples, sa }
    }

    /// BWT[0..pos) 中 c 的出现次数
    #[inline]
    pub fn occ(&self, c: u8, pos: usize) -> u32 {
        if pos == 0 {
            return 0;
        }
        let sigma_us = self.sigma as usize;
        let block = self.block as usize;
        let bi = (pos - 1) / block;
        let base = self.occ_samples[bi * sigma_us + c as usize];
        let add = self.bwt[bi * block..pos].iter().filter(|&&ch| ch == c).count() as u32;
        base + add
    }

    /// 在区间 [l, r) 上扩展字符 c 后的新区间
    #[inline]
    pub fn rank_range(&self, c: u8, l: usize, r: usize) -> (usize, usize) {
        let c0 = self.c[c as usize] as usize;
        (c0 + self.occ(c, l) as usize, c0 + self.occ(c, r) as usize)
    }
}

impl IndexView for FMIndex {
    type Cursor = FmCursor;

    fn root(&self) -> FmCursor {
        FmCursor { lo: 0, hi: self.bwt.len(), depth: 0 }
    }

    fn descend(&self, cursor: &mut FmCursor, symbol: u8) -> bool {
        if symbol == 0 || symbol >= self.sigma {
            return false;
        }
        let (nl, nr) = self.rank_range(symbol, cursor.lo, cursor.hi);
        if nl >= nr {
            return false;
        }
        *cursor = FmCursor { lo: nl, hi: nr, depth: cursor.depth + 1 };
        true
    }

    fn occurrence_count(&self, cursor: &FmCursor) -> usize {
        // 根区间里多出的一行是哨兵后缀
        if cursor.depth == 0 {
            self.n
        } else {
            cursor.hi - cursor.lo
        }
    }

    fn occurrences(&self, cursor: &FmCursor) -> Vec<usize> {
        if cursor.depth == 0 {
            return (0..self.n).collect();
        }
        let mut pos: Vec<usize> = self.sa[cursor.lo..cursor.hi]
            .iter()
            .map(|&j| self.n - j as usize - cursor.depth)
            .collect();
        pos.sort_unstable();
        pos
    }

    fn matched_depth(&self, cursor: &FmCursor) -> usize {
        cursor.depth
    }

    fn text_len(&self) -> usize {
        self.n
    }
}
