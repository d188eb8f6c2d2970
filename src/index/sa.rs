/// 构建后缀数组（倍增法，每轮按 (rank[i], rank[i+k]) 排序）。
///
/// 输入为数值化文本（0:$,1:A,2:C,3:G,4:T,5:N），末尾通常带一个 0 哨兵；
/// 不带哨兵时较短的后缀排在以它为前缀的后缀之前。
pub fn build_sa(text: &[u8]) -> Vec<u32> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    let mut sa: Vec<usize> = (0..n).collect();
    let mut rank: Vec<usize> = text.iter().map(|&b| b as usize + 1).collect();
    let mut next = vec![0usize; n];

    let mut k = 1usize;
    loop {
        // 越界的第二关键字记为 0，小于任何实际 rank
        let key = |i: usize| (rank[i], if i + k < n { rank[i + k] } else { 0 });
        sa.sort_unstable_by_key(|&i| key(i));

        next[sa[0]] = 1;
        for w in 1..n {
            let bump = usize::from(key(sa[w - 1]) != key(sa[w]));
            next[sa[w]] = next[sa[w - 1]] + bump;
        }
        std::mem::swap(&mut rank, &mut next);

        if rank[sa[n - 1]] == n || k >= n {
            break;
        }
        k <<= 1;
    }

    sa.into_iter().map(|x| x as u32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::dna;

    fn naive_sa(text: &[u8]) -> Vec<u32> {
        let mut idx: Vec<usize> = (0..text.len()).collect();
        idx.sort_by(|&a, &b| text[a..].cmp(&text[b..]));
        idx.into_iter().map(|i| i as u32).collect()
    }

    #[test]
    fn sa_of_short_text_with_sentinel() {
        // A C G T $
        let sa = build_sa(&[1, 2, 3, 4, 0]);
        assert_eq!(sa, vec![4, 0, 1, 2, 3]);
    }

    #[test]
    fn sa_matches_naive_sort() {
        let mut x: u32 = 7_654_321;
        for len in 1..=40 {
            let text: Vec<u8> = (0..len)
                .map(|_| {
                    x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                    ((x >> 16) % 6) as u8
                })
                .collect();
            assert_eq!(build_sa(&text), naive_sa(&text), "len={}", len);
        }
    }

    #[test]
    fn sa_without_sentinel_orders_prefixes_first() {
        let text = dna::encode(b"ACGAACTATAG");
        assert_eq!(build_sa(&text), naive_sa(&text));
    }
}
