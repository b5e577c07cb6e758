use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use gram_search::config::{Parameters, DEFAULT_MAX_READ_SIZE};
use gram_search::{build, quasimap};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(
    name = "gram",
    author,
    version,
    about = "Variant-aware read search over population reference graphs",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a PRG, build its FM index and masks, and precompute the k-mer cache
    Build {
        /// Output directory for all index files
        #[arg(long = "gram")]
        gram: PathBuf,
        /// PRG text file
        #[arg(long)]
        prg: PathBuf,
        #[arg(short = 'k', long = "kmer-size", default_value_t = 15)]
        kmer_size: usize,
        #[arg(long = "max-read-size", default_value_t = DEFAULT_MAX_READ_SIZE)]
        max_read_size: usize,
        /// Precompute every k-mer over ACGT (one k-mer source is required)
        #[arg(long = "all-kmers", conflicts_with_all = ["kmers", "reads"])]
        all_kmers: bool,
        /// File with one k-mer per line
        #[arg(long, conflicts_with = "reads")]
        kmers: Option<PathBuf>,
        /// Reads whose seed k-mers should be cached
        #[arg(long, num_args = 1..)]
        reads: Vec<PathBuf>,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },
    /// Search reads against a built gram directory and write allele coverage
    Quasimap {
        #[arg(long = "gram")]
        gram: PathBuf,
        /// FASTA / FASTQ reads files
        #[arg(long, num_args = 1.., required = true)]
        reads: Vec<PathBuf>,
        #[arg(short = 'k', long = "kmer-size", default_value_t = 15)]
        kmer_size: usize,
        #[arg(long = "max-read-size", default_value_t = DEFAULT_MAX_READ_SIZE)]
        max_read_size: usize,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build { gram, prg, kmer_size, max_read_size, all_kmers, kmers, reads, threads } => {
            let mut params = Parameters::new(gram, Some(prg));
            params.kmer_size = kmer_size;
            params.max_read_size = max_read_size;
            params.all_kmers = all_kmers;
            params.kmers_file = kmers;
            params.reads = reads;
            params.threads = threads;
            run_build(&params)
        }
        Commands::Quasimap { gram, reads, kmer_size, max_read_size, threads } => {
            let mut params = Parameters::new(gram, None);
            params.kmer_size = kmer_size;
            params.max_read_size = max_read_size;
            params.reads = reads;
            params.threads = threads;
            run_quasimap(&params)
        }
    }
}

fn run_build(params: &Parameters) -> Result<()> {
    let summary =
        build::run(params).with_context(|| format!("build failed for PRG '{}'", params.prg.display()))?;
    println!("prg: {}", params.prg.display());
    println!("prg_length: {}", summary.prg_length);
    println!("variant_sites: {}", summary.num_sites);
    println!("max_alphabet_num: {}", summary.max_alphabet_num);
    println!("kmers: {} (k={})", summary.kmers.total_kmers, summary.kmers.kmer_size);
    println!("gram directory: {}", params.gram_dir().display());
    Ok(())
}

fn run_quasimap(params: &Parameters) -> Result<()> {
    let stats = quasimap::run(params)
        .with_context(|| format!("quasimap failed for gram directory '{}'", params.gram_dir().display()))?;
    println!("reads_processed: {}", stats.reads_processed);
    println!("reads_skipped: {}", stats.reads_skipped);
    println!("reads_mapped: {}", stats.reads_mapped);
    println!("allele_sum_coverage: {}", params.allele_sum_coverage.display());
    Ok(())
}
