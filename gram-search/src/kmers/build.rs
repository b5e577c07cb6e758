use std::collections::BTreeSet;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::error::{GramError, Result};
use crate::io::ReadBatches;
use crate::kmers::{Kmer, KmerEntry, KmerIndex};
use crate::prg::PrgInfo;
use crate::search::{search_pattern, Direction, SearchStates};
use crate::util::dna;

const READ_BATCH: usize = 10_000;

/// 需要预先搜索哪些 k-mer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KmerSource {
    /// 字母表上全部 4^k 个 k-mer
    All,
    /// 每行一个 k-mer 的文本文件
    List(PathBuf),
    /// 读段搜索时用作种子的那一端（含反向互补）
    Reads { paths: Vec<PathBuf>, max_read_size: usize },
}

impl KmerSource {
    /// 按字典序排列、去重后的 k-mer
    pub fn kmers(&self, k: usize, direction: Direction) -> Result<Vec<Kmer>> {
        match self {
            KmerSource::All => Ok(dna::all_kmers(k)),
            KmerSource::List(path) => kmers_from_file(path, k),
            KmerSource::Reads { paths, max_read_size } => kmers_from_reads(paths, k, *max_read_size, direction),
        }
    }
}

pub fn kmers_from_file(path: &Path, k: usize) -> Result<Vec<Kmer>> {
    let reader = std::io::BufReader::new(std::fs::File::open(path)?);
    let mut kmers = BTreeSet::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let kmer = dna::encode_seq(text.as_bytes())
            .ok_or_else(|| GramError::kmer_record(i + 1, format!("'{}' is not an ACGT sequence", text)))?;
        if kmer.len() != k {
            return Err(GramError::kmer_record(i + 1, format!("k-mer has length {}, expected {}", kmer.len(), k)));
        }
        kmers.insert(kmer);
    }
    Ok(kmers.into_iter().collect())
}

pub fn kmers_from_reads(paths: &[PathBuf], k: usize, max_read_size: usize, direction: Direction) -> Result<Vec<Kmer>> {
    let mut kmers = BTreeSet::new();
    let mut batches = ReadBatches::new(paths, READ_BATCH);
    while let Some(batch) = batches.next_batch()? {
        for read in batch {
            if read.seq.len() > max_read_size {
                continue;
            }
            let Some(bases) = dna::encode_seq(&read.seq) else { continue };
            for strand in [bases.clone(), dna::revcomp(&bases)] {
                let symbols: Vec<u64> = strand.iter().map(|&b| u64::from(b)).collect();
                if let Some((seed, _)) = direction.split_seed(&symbols, k) {
                    kmers.insert(seed.iter().map(|&s| s as dna::Base).collect::<Kmer>());
                }
            }
        }
    }
    Ok(kmers.into_iter().collect())
}

/// 并行地对每个 k-mer 做完整搜索；结果与输入顺序一致
pub fn index_kmers(kmers: &[Kmer], kmer_size: usize, prg_info: &PrgInfo) -> KmerIndex {
    let t0 = Instant::now();
    let entries: Vec<KmerEntry> = kmers
        .par_iter()
        .map(|kmer| {
            let pattern: Vec<u64> = kmer.iter().map(|&b| u64::from(b)).collect();
            let outcome = search_pattern(&pattern, SearchStates::new(), prg_info);
            KmerEntry::new(outcome.states)
        })
        .collect();

    let mut index = KmerIndex::new(kmer_size);
    for (kmer, entry) in kmers.iter().zip(entries) {
        debug!("k-mer {}: {} states", dna::decode_seq(kmer), entry.search_states.len());
        index.insert(kmer.clone(), entry);
    }
    info!("indexed {} k-mers of size {} in {:.2?}", index.len(), kmer_size, t0.elapsed());
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SaInterval;
    use crate::search::VariantSite;

    #[test]
    fn kmer_list_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kmers.txt");
        std::fs::write(&path, "tga\n\nAAC\ntga\n").unwrap();
        assert_eq!(kmers_from_file(&path, 3).unwrap(), vec![vec![1, 1, 2], vec![4, 3, 1]]);

        std::fs::write(&path, "ACGT\n").unwrap();
        assert!(matches!(kmers_from_file(&path, 3), Err(GramError::KmerRecord { line: 1, .. })));
        std::fs::write(&path, "ACN\n").unwrap();
        assert!(kmers_from_file(&path, 3).is_err());
    }

    #[test]
    fn read_seeds_follow_direction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.fa");
        std::fs::write(&path, ">r1\nAACGT\n>r2\nNNNNN\n>r3\nACGTACGTACGT\n").unwrap();
        let paths = vec![path];

        // r1 = AACGT，反向互补 ACGTT；r2 含 N，r3 超长
        let bwd = kmers_from_reads(&paths, 2, 8, Direction::Backward).unwrap();
        assert_eq!(bwd, vec![vec![3, 4], vec![4, 4]]);
        let fwd = kmers_from_reads(&paths, 2, 8, Direction::Forward).unwrap();
        assert_eq!(fwd, vec![vec![1, 1], vec![1, 2]]);
    }

    #[test]
    fn index_kmers_records_paths() {
        let prg = PrgInfo::from_raw("gcgct5c6g6a5agtcct", Direction::Backward).unwrap();
        let kmers = vec![vec![4, 3, 1], vec![3, 2, 4], vec![1, 1, 1]];
        let index = index_kmers(&kmers, 3, &prg);
        assert_eq!(index.len(), 3);

        let tga = index.get(&[4, 3, 1]).unwrap();
        assert!(!tga.is_non_variant);
        assert_eq!(tga.search_states.len(), 1);
        assert_eq!(tga.search_states[0].sa_interval, SaInterval::singleton(14));
        assert_eq!(tga.search_states[0].variant_site_path, vec![VariantSite::new(5, vec![2])]);

        let gct = index.get(&[3, 2, 4]).unwrap();
        assert!(gct.is_non_variant);

        assert!(index.get(&[1, 1, 1]).unwrap().is_unmatched());
    }
}
