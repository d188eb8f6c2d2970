//! 用已知的真实位置给窗口搜索结果打分（TP / FN / FP）。

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use rayon::prelude::*;

use crate::error::{Result, SearchError};
use crate::index::IndexView;
use crate::search::{SearchOutcome, SearchStrategy};
use crate::sim::SimulatedRead;
use crate::util::dna;

/// 读段相对参考的方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Forward,
    /// 读段是参考片段的反向互补
    ReverseComplement,
}

impl Orientation {
    /// 第 k 个窗口期望落在参考上的起点。
    ///
    /// 正向：`gt + k*w`；反向互补：`gt + L - (k+1)*w`（窗口 k 对应参考片段末端一侧）。
    pub fn expected_offset(self, ground_truth: usize, read_len: usize, window_len: usize, k: usize) -> usize {
        match self {
            Orientation::Forward => ground_truth + k * window_len,
            Orientation::ReverseComplement => ground_truth + read_len - (k + 1) * window_len,
        }
    }
}

/// 在两种方向之间换算同一窗口的期望起点；自身的逆
pub fn flip_offset(offset: usize, ground_truth: usize, read_len: usize, window_len: usize) -> usize {
    2 * ground_truth + read_len - window_len - offset
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub tp: u64,
    pub fn_: u64,
    pub fp: u64,
}

impl Counters {
    pub fn windows(&self) -> u64 {
        self.tp + self.fn_
    }

    /// TP / (TP + FN)
    pub fn sensitivity(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }
}

fn ratio(a: u64, b: u64) -> f64 {
    if b == 0 {
        0.0
    } else {
        a as f64 / b as f64
    }
}

impl Add for Counters {
    type Output = Counters;

    fn add(self, o: Counters) -> Counters {
        Counters { tp: self.tp + o.tp, fn_: self.fn_ + o.fn_, fp: self.fp + o.fp }
    }
}

impl AddAssign for Counters {
    fn add_assign(&mut self, o: Counters) {
        *self = *self + o;
    }
}

impl Sum for Counters {
    fn sum<It: Iterator<Item = Counters>>(iter: It) -> Counters {
        iter.fold(Counters::default(), Add::add)
    }
}

/// 评估参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    pub window_len: usize,
    pub strategy: SearchStrategy,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { window_len: 20, strategy: SearchStrategy::default() }
    }
}

/// 将读段切成定长窗口，逐个搜索并与真实位置比对。
pub struct MatchEvaluator<'a, I: IndexView> {
    index: &'a I,
    cfg: EvalConfig,
}

impl<'a, I: IndexView> MatchEvaluator<'a, I> {
    pub fn new(index: &'a I, cfg: EvalConfig) -> Result<Self> {
        if cfg.window_len == 0 {
            return Err(SearchError::EmptyWindow);
        }
        Ok(Self { index, cfg })
    }

    /// 评估一条读段。
    ///
    /// - 末尾不足一个窗口的部分直接丢弃；
    /// - 反向互补读段先整体反向互补，窗口 k 对应其中 `[L-(k+1)w, L-kw)`；
    /// - 位置按索引报告的原始起点比较，不按匹配深度平移。
    pub fn evaluate(&self, read: &[u8], ground_truth: usize, orientation: Orientation) -> Result<Counters> {
        let w = self.cfg.window_len;
        let len = read.len();
        let oriented = match orientation {
            Orientation::Forward => std::borrow::Cow::Borrowed(read),
            Orientation::ReverseComplement => std::borrow::Cow::Owned(dna::revcomp_codes(read)),
        };

        let mut counters = Counters::default();
        for k in 0..len / w {
            let start = match orientation {
                Orientation::Forward => k * w,
                Orientation::ReverseComplement => len - (k + 1) * w,
            };
            let expected = orientation.expected_offset(ground_truth, len, w, k);
            let outcome = self.cfg.strategy.search_window(self.index, &oriented, start, w)?;
            counters += score_window(&outcome, expected);
        }
        Ok(counters)
    }

    pub fn evaluate_read(&self, read: &SimulatedRead) -> Result<Counters> {
        self.evaluate(&read.sequence, read.ground_truth, read.orientation)
    }

    /// 并行评估一批读段；每条读段独立计数后归约，无共享可变状态
    pub fn evaluate_batch(&self, reads: &[SimulatedRead]) -> Result<Counters> {
        let total = reads
            .par_iter()
            .map(|r| self.evaluate_read(r))
            .try_reduce(Counters::default, |a, b| Ok(a + b))?;
        log::debug!("evaluated {} reads: tp={} fn={} fp={}", reads.len(), total.tp, total.fn_, total.fp);
        Ok(total)
    }
}

/// 单个窗口的计分：无匹配记 FN；否则每个错误位置记一次 FP，命中期望位置记 TP，否则 FN
pub fn score_window(outcome: &SearchOutcome, expected: usize) -> Counters {
    let SearchOutcome::Matched(m) = outcome else {
        return Counters { fn_: 1, ..Counters::default() };
    };
    let mut c = Counters::default();
    let mut found = false;
    for &pos in &m.occurrences {
        if pos == expected {
            found = true;
        } else {
            c.fp += 1;
        }
    }
    if found {
        c.tp += 1;
    } else {
        c.fn_ += 1;
    }
    c
}
