//! 读段到 PRG 的准比对（quasimap）：每条读段及其反向互补从缓存的 k-mer 出发
//! 搜索，存活路径上经过的等位基因计入覆盖度。

pub mod coverage;

use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

pub use coverage::AlleleSumCoverage;

use crate::config::Parameters;
use crate::error::{GramError, Result};
use crate::index::FmIndex;
use crate::io::{ReadBatches, ReadRecord};
use crate::kmers::{load_kmer_index, KmerIndex};
use crate::prg::{parse_masks, PrgInfo};
use crate::search::{search_pattern, Direction, SearchOutcome, SearchStates};
use crate::util::dna;

const READ_BATCH: usize = 50_000;

/// 一次 quasimap 的汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuasimapStats {
    pub reads_processed: u64,
    pub reads_skipped: u64,
    pub reads_mapped: u64,
}

impl QuasimapStats {
    fn merge(mut self, other: QuasimapStats) -> Self {
        self.reads_processed += other.reads_processed;
        self.reads_skipped += other.reads_skipped;
        self.reads_mapped += other.reads_mapped;
        self
    }
}

/// 搜索一条已编码的模式：先取缓存的种子 k-mer，未命中时回退到完整搜索
pub fn search_read(pattern: &[u64], kmer_index: &KmerIndex, prg_info: &PrgInfo) -> SearchOutcome {
    let direction = prg_info.direction;
    let Some((seed, rest)) = direction.split_seed(pattern, kmer_index.kmer_size).filter(|_| kmer_index.kmer_size > 0)
    else {
        return search_pattern(pattern, SearchStates::new(), prg_info);
    };
    let kmer: Vec<dna::Base> = seed.iter().map(|&s| s as dna::Base).collect();
    match kmer_index.lookup(&kmer) {
        Some(states) if states.is_empty() => SearchOutcome {
            states,
            // 种子本身无匹配；报告种子中最后被消费的符号
            stopped_at: Some(direction.position(pattern.len(), seed.len() - 1)),
            primary_lost: true,
        },
        Some(states) => search_pattern(rest, states, prg_info),
        None => {
            debug!("k-mer {} not cached, falling back to a full search", dna::decode_seq(&kmer));
            search_pattern(pattern, SearchStates::new(), prg_info)
        }
    }
}

/// 处理一条读段；返回 None 表示读段被跳过，否则返回是否比对上
pub fn quasimap_read(
    read: &ReadRecord,
    max_read_size: usize,
    kmer_index: &KmerIndex,
    prg_info: &PrgInfo,
    coverage: &mut AlleleSumCoverage,
) -> Option<bool> {
    if read.seq.len() > max_read_size {
        return None;
    }
    let bases = dna::encode_seq(&read.seq)?;
    let mut states = SearchStates::new();
    for strand in [bases.clone(), dna::revcomp(&bases)] {
        let pattern: Vec<u64> = strand.iter().map(|&b| u64::from(b)).collect();
        let outcome = search_read(&pattern, kmer_index, prg_info);
        if outcome.is_match() {
            states.extend(outcome.states);
        }
    }
    if states.is_empty() {
        return Some(false);
    }
    coverage.record_read(&states);
    Some(true)
}

#[derive(Debug, Clone)]
struct Partial {
    coverage: AlleleSumCoverage,
    stats: QuasimapStats,
}

impl Partial {
    fn reduce(mut self, other: Partial) -> Partial {
        self.coverage.merge(&other.coverage);
        self.stats = self.stats.merge(other.stats);
        self
    }
}

/// 并行处理一批读段，覆盖度累加到 `coverage`
pub fn quasimap_batch(
    reads: &[ReadRecord],
    max_read_size: usize,
    kmer_index: &KmerIndex,
    prg_info: &PrgInfo,
    coverage: &mut AlleleSumCoverage,
) -> QuasimapStats {
    let empty = Partial { coverage: coverage.zeroed(), stats: QuasimapStats::default() };
    let result = reads
        .par_iter()
        .fold(
            || empty.clone(),
            |mut acc, read| {
                acc.stats.reads_processed += 1;
                match quasimap_read(read, max_read_size, kmer_index, prg_info, &mut acc.coverage) {
                    None => acc.stats.reads_skipped += 1,
                    Some(true) => acc.stats.reads_mapped += 1,
                    Some(false) => {}
                }
                acc
            },
        )
        .reduce(|| empty.clone(), Partial::reduce);
    coverage.merge(&result.coverage);
    result.stats
}

/// 从 gram 目录加载反向搜索所需的索引与 mask
pub fn load_prg_info(params: &Parameters) -> Result<PrgInfo> {
    let fm_index = FmIndex::load_from_file(&params.fm_index)?;
    let mask = parse_masks(&params.sites_mask, &params.allele_mask)?;
    PrgInfo::from_parts(fm_index, mask, Direction::Backward)
}

/// quasimap 子命令：加载索引与 k-mer 缓存，处理所有读段，写出覆盖度
pub fn run(params: &Parameters) -> Result<QuasimapStats> {
    params.validate_quasimap()?;
    let t0 = Instant::now();
    let prg_info = load_prg_info(params)?;
    let kmer_index = load_kmer_index(&params.kmer_index)?;
    info!(
        "loaded index ({} symbols) and {} cached k-mers (k={}) in {:.2?}",
        prg_info.fm_index.size(),
        kmer_index.len(),
        kmer_index.kmer_size,
        t0.elapsed()
    );
    if !kmer_index.is_empty() && kmer_index.kmer_size != params.kmer_size {
        info!("using the cached k-mer size {} instead of {}", kmer_index.kmer_size, params.kmer_size);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.threads)
        .build()
        .map_err(|e| GramError::Config(format!("cannot start {} worker threads: {}", params.threads, e)))?;

    let mut coverage = AlleleSumCoverage::from_mask(&prg_info.mask);
    let mut stats = QuasimapStats::default();
    let mut batches = ReadBatches::new(&params.reads, READ_BATCH);
    while let Some(batch) = batches.next_batch()? {
        let batch_stats =
            pool.install(|| quasimap_batch(&batch, params.max_read_size, &kmer_index, &prg_info, &mut coverage));
        stats = stats.merge(batch_stats);
        debug!("processed {} reads so far", stats.reads_processed);
    }

    coverage.save(&params.allele_sum_coverage)?;
    info!(
        "quasimap: {} reads processed, {} skipped, {} mapped in {:.2?}",
        stats.reads_processed,
        stats.reads_skipped,
        stats.reads_mapped,
        t0.elapsed()
    );
    Ok(stats)
}
