pub const SIGMA: usize = 6; // {0:$, 1:A, 2:C, 3:G, 4:T, 5:N}

/// 歧义碱基 N 的编码
pub const AMBIGUOUS: u8 = 5;

/// 规范的替换枚举顺序：A, C, G, T, N
pub const CANONICAL_ORDER: [u8; 5] = [1, 2, 3, 4, 5];

#[inline]
pub fn to_alphabet(b: u8) -> u8 {
    if b == 0 {
        return 0;
    }
    match b.to_ascii_uppercase() {
        b'A' => 1,
        b'C' => 2,
        b'G' => 3,
        b'T' | b'U' => 4,
        _ => AMBIGUOUS, // N 以及其他 IUPAC 字符都归为 N
    }
}

#[inline]
pub fn from_alphabet(a: u8) -> u8 {
    match a {
        0 => b'$',
        1 => b'A',
        2 => b'C',
        3 => b'G',
        4 => b'T',
        _ => b'N',
    }
}

/// ASCII 序列 -> 数值化序列
pub fn encode(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|&b| to_alphabet(b)).collect()
}

/// 数值化序列 -> ASCII 序列
pub fn decode(codes: &[u8]) -> Vec<u8> {
    codes.iter().map(|&a| from_alphabet(a)).collect()
}

/// 数值化碱基的互补（N 与 $ 保持不变）
#[inline]
pub fn complement_code(a: u8) -> u8 {
    match a {
        1..=4 => 5 - a,
        _ => a,
    }
}

/// 数值化序列的反向互补
pub fn revcomp_codes(codes: &[u8]) -> Vec<u8> {
    codes.iter().rev().map(|&a| complement_code(a)).collect()
}

/// 碱基在生成器字母表中的下标：A=0, C=1, G=2, T=3, N=4
#[inline]
pub fn symbol_index(a: u8) -> usize {
    (a as usize).saturating_sub(1)
}

/// 下标 -> 数值化碱基
#[inline]
pub fn symbol_from_index(i: usize) -> u8 {
    (i + 1) as u8
}

/// 回溯搜索中可作为替换目标的字母集合。
///
/// 查询中的字面碱基总是会被尝试（零代价），这里只决定"错配"分支
/// 是否包含歧义碱基 N。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubstitutionAlphabet {
    /// A, C, G, T
    #[default]
    Nucleotides,
    /// A, C, G, T, N
    WithAmbiguity,
}

impl SubstitutionAlphabet {
    pub fn symbols(self) -> &'static [u8] {
        match self {
            SubstitutionAlphabet::Nucleotides => &CANONICAL_ORDER[..4],
            SubstitutionAlphabet::WithAmbiguity => &CANONICAL_ORDER[..],
        }
    }

    /// 枚举某个位置的分支：规范顺序下的替换集合，若字面碱基不在其中则补在末尾
    pub fn branches(self, literal: u8) -> impl Iterator<Item = u8> {
        let syms = self.symbols();
        let extra = if syms.contains(&literal) { None } else { Some(literal) };
        syms.iter().copied().chain(extra)
    }
}
