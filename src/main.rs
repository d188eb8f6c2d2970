use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use backtrack_bench::eval::{Counters, EvalConfig, MatchEvaluator};
use backtrack_bench::index::{FMIndex, IndexView, SuffixArrayIndex};
use backtrack_bench::io::fasta::{self, Contig, Reference};
use backtrack_bench::search::{SearchStrategy, Traversal};
use backtrack_bench::sim::{self, NoisyReadGenerator, SimConfig};
use backtrack_bench::util::dna::{self, SubstitutionAlphabet};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "backtrack-bench", author, version, about = "Benchmark approximate read location over full-text indexes", arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IndexKind {
    /// Plain suffix array (supports parent links)
    Sa,
    /// FM index over the reversed reference
    Fm,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyKind {
    /// Bounded-mismatch backtracking
    Backtrack,
    /// Exact window, then extend until unique
    Greedy,
}

#[derive(clap::Args, Debug)]
struct ReferenceArgs {
    /// Reference FASTA file
    #[arg(short, long, conflicts_with = "random_len")]
    reference: Option<String>,
    /// Generate a random reference of this length instead of reading FASTA
    #[arg(long)]
    random_len: Option<usize>,
    #[arg(long = "index", value_enum, default_value_t = IndexKind::Fm)]
    index: IndexKind,
    /// Occ sampling interval of the FM index
    #[arg(long = "occ-block", default_value_t = 64)]
    occ_block: usize,
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    #[arg(long, value_enum, default_value_t = StrategyKind::Backtrack)]
    strategy: StrategyKind,
    /// Substitutions allowed per window (backtracking only)
    #[arg(short = 'k', long, default_value_t = 1)]
    budget: usize,
    /// Allow N as a substitution target
    #[arg(long = "with-n")]
    with_n: bool,
    /// Reuse one cursor with parent links instead of cloning
    #[arg(long = "parent-links")]
    parent_links: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate noisy reads, search every window and report TP/FN/FP
    Run {
        #[command(flatten)]
        reference: ReferenceArgs,
        #[command(flatten)]
        search: SearchArgs,
        #[arg(short = 'n', long = "reads", default_value_t = 1000)]
        reads: usize,
        #[arg(short = 'l', long = "read-len", default_value_t = 100)]
        read_len: usize,
        #[arg(short = 'w', long = "window", default_value_t = 20)]
        window: usize,
        /// One substitution per this many bases (plus one)
        #[arg(long = "spacing", default_value_t = 50)]
        spacing: usize,
        #[arg(long = "seed", default_value_t = 42)]
        seed: u64,
        /// Fraction of reads drawn from the reverse strand
        #[arg(long = "reverse-fraction", default_value_t = 0.0)]
        reverse_fraction: f64,
        /// Use a 5-letter mutation alphabet (ACGTN)
        #[arg(long = "mutate-to-n")]
        mutate_to_n: bool,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },
    /// Search one query against the reference and print the deepest match
    Query {
        #[command(flatten)]
        reference: ReferenceArgs,
        #[command(flatten)]
        search: SearchArgs,
        /// Query sequence (ACGTN)
        query: String,
        /// Window length for the greedy strategy (defaults to the whole query)
        #[arg(short = 'w', long = "window")]
        window: Option<usize>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            reference,
            search,
            reads,
            read_len,
            window,
            spacing,
            seed,
            reverse_fraction,
            mutate_to_n,
            threads,
        } => {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .context("cannot configure the thread pool")?;
            let generator = NoisyReadGenerator::new(if mutate_to_n { 5 } else { 4 })?;
            let sim_cfg = SimConfig {
                read_count: reads,
                read_len,
                error_spacing: spacing,
                seed,
                reverse_fraction,
                generator,
            };
            let eval_cfg = EvalConfig { window_len: window, strategy: strategy_of(&search) };
            // 参考与读段使用不同的随机流
            let text = load_reference(&reference, seed.wrapping_add(1))?.text;
            match reference.index {
                IndexKind::Sa => run_benchmark(
                    &timed_build("suffix array", || SuffixArrayIndex::build(text.clone())),
                    &text,
                    &sim_cfg,
                    eval_cfg,
                ),
                IndexKind::Fm => run_benchmark(
                    &timed_build("FM index", || FMIndex::build(&text, dna::SIGMA as u8, reference.occ_block)),
                    &text,
                    &sim_cfg,
                    eval_cfg,
                ),
            }
        }
        Commands::Query { reference, search, query, window } => {
            let refseq = load_reference(&reference, 0)?;
            let read = dna::encode(query.as_bytes());
            if read.is_empty() {
                bail!("query is empty");
            }
            let window = window.unwrap_or(read.len());
            if window == 0 || window > read.len() {
                bail!("window length {} must be between 1 and the query length {}", window, read.len());
            }
            let strategy = strategy_of(&search);
            match reference.index {
                IndexKind::Sa => run_query(
                    &timed_build("suffix array", || SuffixArrayIndex::build(refseq.text.clone())),
                    &refseq,
                    &read,
                    strategy,
                    window,
                ),
                IndexKind::Fm => run_query(
                    &timed_build("FM index", || FMIndex::build(&refseq.text, dna::SIGMA as u8, reference.occ_block)),
                    &refseq,
                    &read,
                    strategy,
                    window,
                ),
            }
        }
    }
}

fn strategy_of(args: &SearchArgs) -> SearchStrategy {
    match args.strategy {
        StrategyKind::Backtrack => SearchStrategy::Backtrack {
            budget: args.budget,
            alphabet: if args.with_n { SubstitutionAlphabet::WithAmbiguity } else { SubstitutionAlphabet::Nucleotides },
            traversal: if args.parent_links { Traversal::ParentLinks } else { Traversal::Cloning },
        },
        StrategyKind::Greedy => SearchStrategy::GreedyUnique,
    }
}

fn load_reference(args: &ReferenceArgs, seed: u64) -> Result<Reference> {
    match (&args.reference, args.random_len) {
        (Some(path), _) => {
            let fh = std::fs::File::open(path).map_err(|e| anyhow::anyhow!("cannot open reference FASTA '{}': {}", path, e))?;
            let reference = fasta::read_reference(std::io::BufReader::new(fh))?;
            log::info!("reference: {} ({} records, {} bp)", path, reference.contigs.len(), reference.text.len());
            Ok(reference)
        }
        (None, Some(len)) => {
            let text = sim::random_reference(len, seed);
            log::info!("reference: random ({} bp, seed {})", len, seed);
            Ok(Reference { contigs: vec![Contig { name: "random".to_string(), offset: 0, len }], text })
        }
        (None, None) => bail!("either --reference or --random-len is required"),
    }
}

fn timed_build<I: IndexView>(what: &str, build: impl FnOnce() -> I) -> I {
    let t0 = Instant::now();
    let index = build();
    log::info!("{} over {} bp built in {:.3}s", what, index.text_len(), t0.elapsed().as_secs_f64());
    index
}

fn run_benchmark<I: IndexView>(index: &I, text: &[u8], sim_cfg: &SimConfig, eval_cfg: EvalConfig) -> Result<()> {
    let started = chrono::Utc::now();
    let t0 = Instant::now();
    let reads = sim::simulate_reads(text, sim_cfg)?;
    let t_sim = t0.elapsed();

    let t1 = Instant::now();
    let evaluator = MatchEvaluator::new(index, eval_cfg)?;
    let counters = evaluator.evaluate_batch(&reads)?;
    let t_eval = t1.elapsed();

    print_report(&started, &eval_cfg, reads.len(), &counters);
    println!("simulate_secs\t{:.3}", t_sim.as_secs_f64());
    println!("search_secs\t{:.3}", t_eval.as_secs_f64());
    Ok(())
}

fn print_report(started: &chrono::DateTime<chrono::Utc>, cfg: &EvalConfig, reads: usize, c: &Counters) {
    println!("started\t{}", started.to_rfc3339());
    println!("strategy\t{:?}", cfg.strategy);
    println!("window\t{}", cfg.window_len);
    println!("reads\t{}", reads);
    println!("windows\t{}", c.windows());
    println!("TP\t{}", c.tp);
    println!("FN\t{}", c.fn_);
    println!("FP\t{}", c.fp);
    println!("sensitivity\t{:.4}", c.sensitivity());
    println!("precision\t{:.4}", c.precision());
}

fn run_query<I: IndexView>(
    index: &I,
    reference: &Reference,
    read: &[u8],
    strategy: SearchStrategy,
    window: usize,
) -> Result<()> {
    let outcome = strategy.search_window(index, read, 0, window)?;
    println!("query\t{}", String::from_utf8_lossy(&dna::decode(read)));
    println!("depth\t{}", outcome.depth());
    let occ = outcome.occurrences();
    let positions: Vec<String> = occ.iter().map(ToString::to_string).collect();
    println!("occurrences\t{}", join_or_star(&positions));
    // 多条记录拼接时换算回 contig 内坐标
    let located: Vec<String> = occ
        .iter()
        .filter_map(|&p| reference.locate(p).map(|(c, off)| format!("{}:{}", c.name, off)))
        .collect();
    println!("contig_positions\t{}", join_or_star(&located));
    Ok(())
}

fn join_or_star(items: &[String]) -> String {
    if items.is_empty() {
        "*".to_string()
    } else {
        items.join(",")
    }
}
