//! k-mer 索引：预先对 k-mer 做完整搜索，读段搜索时直接从缓存的状态继续。

pub mod build;
pub mod record;
pub mod stats;

use std::collections::HashMap;
use std::path::Path;

use log::{info, warn};

use crate::error::Result;
use crate::prg::PrgInfo;
use crate::search::SearchStates;
use crate::util::dna::Base;

pub use build::{index_kmers, kmers_from_file, kmers_from_reads, KmerSource};
pub use record::{dump_kmer_index, load_kmer_index, parse_kmer_record, write_kmer_record};
pub use stats::KmerStats;

/// 以符号序列为键的映射，键按结构相等与哈希
pub type SequenceMap<S, T> = HashMap<Vec<S>, T>;

/// 按模式中的顺序排列的 k 个碱基
pub type Kmer = Vec<Base>;

/// 一个 k-mer 完整搜索后的结果（状态已 finalize）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KmerEntry {
    pub search_states: SearchStates,
    /// 所有状态都未经过任何位点
    pub is_non_variant: bool,
}

impl KmerEntry {
    pub fn new(search_states: SearchStates) -> Self {
        let is_non_variant = !search_states.is_empty() && search_states.iter().all(|s| s.is_non_variant());
        Self { search_states, is_non_variant }
    }

    pub fn is_unmatched(&self) -> bool {
        self.search_states.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KmerIndex {
    pub kmer_size: usize,
    pub entries: SequenceMap<Base, KmerEntry>,
}

impl KmerIndex {
    pub fn new(kmer_size: usize) -> Self {
        Self { kmer_size, entries: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, kmer: Kmer, entry: KmerEntry) {
        self.entries.insert(kmer, entry);
    }

    pub fn get(&self, kmer: &[Base]) -> Option<&KmerEntry> {
        self.entries.get(kmer)
    }

    /// 缓存命中时返回该 k-mer 的搜索状态副本；`None` 表示需要回退到完整搜索
    pub fn lookup(&self, kmer: &[Base]) -> Option<SearchStates> {
        self.get(kmer).map(|entry| entry.search_states.clone())
    }

    /// 按 k-mer 排序的条目
    pub fn sorted_entries(&self) -> Vec<(&Kmer, &KmerEntry)> {
        let mut items: Vec<(&Kmer, &KmerEntry)> = self.entries.iter().collect();
        items.sort_unstable_by(|a, b| a.0.cmp(b.0));
        items
    }

    pub fn stats(&self) -> KmerStats {
        KmerStats::collect(self)
    }
}

/// 已有的 k-mer 索引文件覆盖了本次需要的全部 k-mer 时直接加载，
/// 否则重新构建并写出（同时写出统计文件）
pub fn get_kmer_index(
    kmer_index_path: &Path,
    stats_path: &Path,
    kmer_size: usize,
    source: &KmerSource,
    prg_info: &PrgInfo,
) -> Result<KmerIndex> {
    let kmers = source.kmers(kmer_size, prg_info.direction)?;
    if kmer_index_path.exists() {
        info!("loading k-mer index from {}", kmer_index_path.display());
        let index = load_kmer_index(kmer_index_path)?;
        let size_matches = index.kmer_size == kmer_size || index.is_empty();
        let missing = kmers.iter().filter(|kmer| index.get(kmer).is_none()).count();
        if size_matches && missing == 0 {
            return Ok(index);
        }
        if !size_matches {
            warn!("cached k-mer index has k={} but k={} was requested; rebuilding", index.kmer_size, kmer_size);
        } else {
            warn!("cached k-mer index lacks {} of {} requested k-mers; rebuilding", missing, kmers.len());
        }
    }
    let index = index_kmers(&kmers, kmer_size, prg_info);
    dump_kmer_index(&index, kmer_index_path)?;
    index.stats().save(stats_path)?;
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SaInterval;
    use crate::search::{Direction, SearchState, VariantSite};

    #[test]
    fn entry_flags() {
        let plain = KmerEntry::new(vec![SearchState::new(SaInterval::new(3, 4))]);
        assert!(plain.is_non_variant);
        assert!(!plain.is_unmatched());

        let mut crossed = SearchState::new(SaInterval::singleton(16));
        crossed.variant_site_path.push(VariantSite::new(5, vec![2]));
        let variant = KmerEntry::new(vec![SearchState::new(SaInterval::new(3, 4)), crossed]);
        assert!(!variant.is_non_variant);

        let none = KmerEntry::new(Vec::new());
        assert!(none.is_unmatched());
        assert!(!none.is_non_variant);
    }

    #[test]
    fn lookup_distinguishes_miss_from_no_match() {
        let mut index = KmerIndex::new(2);
        index.insert(vec![1, 1], KmerEntry::new(Vec::new()));
        assert_eq!(index.lookup(&[1, 1]), Some(Vec::new()));
        assert_eq!(index.lookup(&[2, 2]), None);
    }

    #[test]
    fn get_kmer_index_builds_then_loads() {
        let dir = tempfile::tempdir().unwrap();
        let index_path = dir.path().join("kmers");
        let stats_path = dir.path().join("kmers_stats");
        let prg = PrgInfo::from_raw("gcgct5c6g6a5agtcct", Direction::Backward).unwrap();

        let built = get_kmer_index(&index_path, &stats_path, 3, &KmerSource::All, &prg).unwrap();
        assert_eq!(built.len(), 64);
        assert!(index_path.exists());
        assert!(stats_path.exists());

        let loaded = get_kmer_index(&index_path, &stats_path, 3, &KmerSource::All, &prg).unwrap();
        assert_eq!(loaded, built);
    }

    #[test]
    fn cached_index_missing_kmers_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let index_path = dir.path().join("kmers");
        let stats_path = dir.path().join("kmers_stats");
        let list_path = dir.path().join("kmers.txt");
        std::fs::write(&list_path, "agt\n").unwrap();
        let prg = PrgInfo::from_raw("gcgct5c6g6a5agtcct", Direction::Backward).unwrap();

        let listed = get_kmer_index(&index_path, &stats_path, 3, &KmerSource::List(list_path.clone()), &prg).unwrap();
        assert_eq!(listed.len(), 1);

        // 全量请求不能被只含一个 k-mer 的旧文件满足
        let all = get_kmer_index(&index_path, &stats_path, 3, &KmerSource::All, &prg).unwrap();
        assert_eq!(all.len(), 64);
        assert_eq!(load_kmer_index(&index_path).unwrap(), all);

        // 反过来，子集请求直接复用全量文件
        let reused = get_kmer_index(&index_path, &stats_path, 3, &KmerSource::List(list_path), &prg).unwrap();
        assert_eq!(reused.len(), 64);
    }
}
