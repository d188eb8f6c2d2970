use proptest::prelude::*;

use backtrack_bench::eval::{flip_offset, Counters, EvalConfig, MatchEvaluator, Orientation};
use backtrack_bench::index::{find_exact, FMIndex, IndexView, SuffixArrayIndex};
use backtrack_bench::search::{bounded_mismatch_search, SearchOutcome, SearchStrategy, Traversal};
use backtrack_bench::sim::{self, NoisyReadGenerator};
use backtrack_bench::util::dna::{self, SubstitutionAlphabet};

fn bases(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(prop_oneof![Just(1u8), Just(2u8), Just(3u8), Just(4u8)], 1..max_len)
}

fn with_n(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(1u8..=5, 1..max_len)
}

fn search<I: IndexView>(idx: &I, read: &[u8], budget: usize, alphabet: SubstitutionAlphabet, traversal: Traversal) -> SearchOutcome {
    bounded_mismatch_search(idx, idx.root(), read, 0, budget, alphabet, traversal).expect("valid input")
}

/// 不分支的字面下降
fn literal_walk<I: IndexView>(idx: &I, read: &[u8]) -> (usize, Vec<usize>) {
    let mut cur = idx.root();
    let mut depth = 0;
    while depth < read.len() && idx.descend(&mut cur, read[depth]) {
        depth += 1;
    }
    if depth == 0 {
        (0, Vec::new())
    } else {
        (depth, idx.occurrences(&cur))
    }
}

fn hamming(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

proptest! {
    #[test]
    fn zero_budget_equals_literal_walk(reference in with_n(80), read in with_n(12)) {
        let idx = SuffixArrayIndex::build(reference);
        let out = search(&idx, &read, 0, SubstitutionAlphabet::Nucleotides, Traversal::Cloning);
        let (depth, occ) = literal_walk(&idx, &read);
        prop_assert_eq!(out.depth(), depth);
        prop_assert_eq!(out.occurrences(), &occ[..]);
    }

    #[test]
    fn parent_links_are_bit_identical(reference in with_n(60), read in with_n(10), budget in 0usize..3, n_target in any::<bool>()) {
        let alphabet = if n_target { SubstitutionAlphabet::WithAmbiguity } else { SubstitutionAlphabet::Nucleotides };
        let idx = SuffixArrayIndex::build(reference);
        prop_assert_eq!(
            search(&idx, &read, budget, alphabet, Traversal::Cloning),
            search(&idx, &read, budget, alphabet, Traversal::ParentLinks)
        );
    }

    #[test]
    fn suffix_array_and_fm_agree(reference in with_n(60), read in with_n(10), budget in 0usize..3) {
        let sa = SuffixArrayIndex::build(reference.clone());
        let fm = FMIndex::build(&reference, dna::SIGMA as u8, 5);
        let a = search(&sa, &read, budget, SubstitutionAlphabet::Nucleotides, Traversal::ParentLinks);
        let b = search(&fm, &read, budget, SubstitutionAlphabet::Nucleotides, Traversal::Cloning);
        prop_assert_eq!(a.depth(), b.depth());
        let mut oa = a.occurrences().to_vec();
        let mut ob = b.occurrences().to_vec();
        oa.sort_unstable();
        ob.sort_unstable();
        prop_assert_eq!(oa, ob);
    }

    #[test]
    fn result_is_the_deepest_reachable_prefix(reference in bases(50), read in bases(8), budget in 0usize..3) {
        let idx = SuffixArrayIndex::build(reference.clone());
        let out = search(&idx, &read, budget, SubstitutionAlphabet::Nucleotides, Traversal::Cloning);

        // 暴力：每个起点上，错配不超过预算的最长前缀
        let reach = |start: usize| {
            let mut mm = 0;
            let mut d = 0;
            while d < read.len() && start + d < reference.len() {
                mm += usize::from(reference[start + d] != read[d]);
                if mm > budget {
                    break;
                }
                d += 1;
            }
            d
        };
        let best = (0..reference.len()).map(reach).max().unwrap_or(0);
        prop_assert_eq!(out.depth(), best);
        let mut expected: Vec<usize> = if best == 0 {
            Vec::new()
        } else {
            (0..reference.len()).filter(|&s| reach(s) == best).collect()
        };
        let mut got = out.occurrences().to_vec();
        got.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn larger_budget_never_reaches_less_deep(reference in bases(60), read in bases(10)) {
        let idx = SuffixArrayIndex::build(reference);
        let mut last = 0;
        for budget in 0..3 {
            let d = search(&idx, &read, budget, SubstitutionAlphabet::Nucleotides, Traversal::ParentLinks).depth();
            prop_assert!(d >= last);
            last = d;
        }
    }

    #[test]
    fn generator_is_deterministic(reference in bases(200), spacing in 1usize..40, seed in any::<u64>()) {
        let g = NoisyReadGenerator::default();
        let a = g.generate(&reference, 0, reference.len(), spacing, seed).unwrap();
        let b = g.generate(&reference, 0, reference.len(), spacing, seed).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.mutations.len(), reference.len() / spacing + 1);
        // 只被突变一次的位置一定与参考不同
        for m in &a.mutations {
            let hits = a.mutations.iter().filter(|o| o.position == m.position).count();
            if hits == 1 {
                prop_assert_ne!(a.sequence[m.position], reference[m.position]);
            }
        }
        prop_assert!(hamming(&a.sequence, &reference) <= a.mutations.len());
    }

    #[test]
    fn orientation_flip_round_trips(gt in 0usize..10_000, windows in 1usize..10, w in 1usize..50, tail in 0usize..50) {
        let len = windows * w + tail % w;
        for k in 0..windows {
            let fwd = Orientation::Forward.expected_offset(gt, len, w, k);
            let rev = flip_offset(fwd, gt, len, w);
            prop_assert_eq!(rev, Orientation::ReverseComplement.expected_offset(gt, len, w, k));
            prop_assert_eq!(flip_offset(rev, gt, len, w), fwd);
        }
    }
}

#[test]
fn ambiguous_query_example() {
    let reference = dna::encode(b"ACGAACTATAG");
    let read = dna::encode(b"ANNNNTAGTACG");
    let sa = SuffixArrayIndex::build(reference.clone());
    let fm = FMIndex::build(&reference, dna::SIGMA as u8, 2);
    for alphabet in [SubstitutionAlphabet::Nucleotides, SubstitutionAlphabet::WithAmbiguity] {
        let a = search(&sa, &read, 2, alphabet, Traversal::ParentLinks);
        let b = search(&fm, &read, 2, alphabet, Traversal::Cloning);
        assert_eq!(a.depth(), 3);
        assert_eq!(a, search(&sa, &read, 2, alphabet, Traversal::ParentLinks));
        assert_eq!(b.depth(), 3);
        let mut occ = b.occurrences().to_vec();
        occ.sort_unstable();
        assert_eq!(occ, vec![0, 3, 4, 7]);
    }
}

#[test]
fn greedy_example_stops_at_uniqueness() {
    let idx = SuffixArrayIndex::build(dna::encode(b"ACGATCATAGCCATACG"));
    assert_eq!(find_exact(&idx, &dna::encode(b"CAT")).map(|c| idx.occurrence_count(&c)), Some(2));
    let read = dna::encode(b"CATAGCCATACG");
    let out = SearchStrategy::GreedyUnique.search_window(&idx, &read, 0, 3).unwrap();
    assert_eq!(out.depth(), 5);
    assert_eq!(out.occurrences(), &[5]);
}

#[test]
fn clean_reads_resolve_to_true_positives() {
    let reference = sim::random_reference(5_000, 11);
    let fm = FMIndex::build(&reference, dna::SIGMA as u8, 32);
    let strategies = [
        SearchStrategy::GreedyUnique,
        SearchStrategy::Backtrack { budget: 0, alphabet: SubstitutionAlphabet::Nucleotides, traversal: Traversal::Cloning },
    ];
    for strategy in strategies {
        let ev = MatchEvaluator::new(&fm, EvalConfig { window_len: 20, strategy }).unwrap();
        let mut total = Counters::default();
        for start in (0..4_800).step_by(97) {
            let read = &reference[start..start + 105];
            total += ev.evaluate(read, start, Orientation::Forward).unwrap();
            let rc = dna::revcomp_codes(read);
            total += ev.evaluate(&rc, start, Orientation::ReverseComplement).unwrap();
        }
        assert_eq!(total.fn_, 0, "{:?}", strategy);
        assert_eq!(total.fp, 0, "{:?}", strategy);
        assert_eq!(total.tp, 50 * 2 * 5);
    }
}
