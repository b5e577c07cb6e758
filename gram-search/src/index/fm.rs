use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{GramError, Result};
use crate::index::monitor::ConstructionMonitor;
use crate::index::{bwt, sa};

/// 最小的位点标记值；1..=4 是碱基，0 是 $
pub const FIRST_MARKER: u64 = 5;

/// 稠密采样的符号：$ 与四个碱基
const DENSE_SIGMA: usize = 5;

/// 后缀数组上的闭区间 [left, right]，区间内的后缀共享同一个已匹配前缀。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SaInterval {
    pub left: u64,
    pub right: u64,
}

impl SaInterval {
    #[inline]
    pub fn new(left: u64, right: u64) -> Self {
        debug_assert!(left <= right);
        Self { left, right }
    }

    /// 只含一行的区间，对应文本中唯一的一个位置
    #[inline]
    pub fn singleton(row: u64) -> Self {
        Self { left: row, right: row }
    }

    pub fn rows(&self) -> RangeInclusive<u64> {
        self.left..=self.right
    }
}

/// `range_query_markers` 的一个结果：BWT 第 `sa_index` 行之前的符号是 `marker`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHit {
    pub sa_index: u64,
    pub marker: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexMeta {
    pub prg_file: Option<String>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
}

/// 整数字母表上的 FM 索引：
/// - 只为文本中实际出现的符号建表，标记的数值大小不影响索引占用；
/// - `$` 与碱基的 Occ 采用定长分块采样（块内顺扫补偿），与原先 DNA 版一致；
/// - 标记符号（>=5）在 BWT 中很稀疏，每个标记单独保存其出现的行号，rank 即二分；
/// - 所有含标记的行另存一份有序列表，供二维区间枚举使用；
/// - 保存完整 SA 与原文本，locate / 取符号均为 O(1)。
#[derive(Debug, Serialize, Deserialize)]
pub struct FmIndex {
    pub block: u32,
    pub max_symbol: u64,
    /// 文本中出现过的全部符号，严格升序
    pub alphabet: Vec<u64>,
    /// c[i] = 文本中小于 alphabet[i] 的符号数量；末尾追加文本长度
    pub c: Vec<u64>,
    pub text: Vec<u64>,
    pub bwt: Vec<u64>,
    pub sa: Vec<u64>,
    /// occ_samples[block_id * DENSE_SIGMA + s]：块起点之前 s 的累计出现次数
    occ_samples: Vec<u64>,
    /// BWT 中符号 >= FIRST_MARKER 的所有行，升序
    marker_rows: Vec<u64>,
    /// marker_occ[i]：alphabet[i] 为标记时它出现的行，升序；$ 与碱基留空
    marker_occ: Vec<Vec<u64>>,
    pub meta: IndexMeta,
}

impl FmIndex {
    /// 从以单个 0 结尾的编码文本构建索引。
    pub fn build(text: Vec<u64>, block: usize, monitor: &mut dyn ConstructionMonitor) -> Result<Self> {
        let n = text.len();
        if text.last() != Some(&0) || text[..n - 1].contains(&0) {
            return Err(GramError::IndexCorrupt("text must end with exactly one 0 sentinel".into()));
        }
        if block == 0 {
            return Err(GramError::IndexCorrupt("occ block size must be positive".into()));
        }

        let started = Instant::now();
        let sa = sa::build_sa(&text);
        monitor.stage("suffix_array", started.elapsed(), sa.len() * std::mem::size_of::<u64>());

        let started = Instant::now();
        let bwt = bwt::build_bwt(&text, &sa);
        monitor.stage("bwt", started.elapsed(), bwt.len() * std::mem::size_of::<u64>());

        let started = Instant::now();
        let mut alphabet = text.clone();
        alphabet.sort_unstable();
        alphabet.dedup();
        let max_symbol = alphabet.last().copied().unwrap_or(0);

        // C 表与标记的稀疏 rank
        let mut freq = vec![0u64; alphabet.len()];
        let mut marker_occ: Vec<Vec<u64>> = vec![Vec::new(); alphabet.len()];
        let mut marker_rows = Vec::new();
        for (row, &s) in bwt.iter().enumerate() {
            let i = alphabet.partition_point(|&a| a < s);
            freq[i] += 1;
            if s >= FIRST_MARKER {
                marker_rows.push(row as u64);
                marker_occ[i].push(row as u64);
            }
        }
        let mut c = Vec::with_capacity(freq.len() + 1);
        let mut acc = 0u64;
        for f in &freq {
            c.push(acc);
            acc += f;
        }
        c.push(acc);

        // 稠密符号的 Occ 采样
        let num_blocks = (n + block - 1) / block;
        let mut occ_samples = vec![0u64; num_blocks * DENSE_SIGMA];
        let mut running = [0u64; DENSE_SIGMA];
        for bi in 0..num_blocks {
            occ_samples[bi * DENSE_SIGMA..(bi + 1) * DENSE_SIGMA].copy_from_slice(&running);
            let end = ((bi + 1) * block).min(n);
            for &s in &bwt[bi * block..end] {
                if (s as usize) < DENSE_SIGMA {
                    running[s as usize] += 1;
                }
            }
        }

        let rank_bytes = (occ_samples.len() + marker_rows.len() * 2) * std::mem::size_of::<u64>();
        monitor.stage("rank_support", started.elapsed(), rank_bytes);

        Ok(Self {
            block: block as u32,
            max_symbol,
            alphabet,
            c,
            text,
            bwt,
            sa,
            occ_samples,
            marker_rows,
            marker_occ,
            meta: IndexMeta::default(),
        })
    }

    pub fn set_meta(&mut self, meta: IndexMeta) {
        self.meta = meta;
    }

    /// 文本长度（含末尾 $）
    #[inline]
    pub fn size(&self) -> u64 {
        self.bwt.len() as u64
    }

    /// 空模式对应的整个 SA 区间
    #[inline]
    pub fn full_interval(&self) -> SaInterval {
        SaInterval::new(0, self.size() - 1)
    }

    /// 符号在 `alphabet` 中的下标；文本中没有该符号时为 None
    #[inline]
    fn symbol_rank(&self, symbol: u64) -> Option<usize> {
        self.alphabet.binary_search(&symbol).ok()
    }

    /// 文本中小于 `symbol` 的符号数量；文本中没有该符号时为 None
    #[inline]
    pub fn c_of(&self, symbol: u64) -> Option<u64> {
        self.symbol_rank(symbol).map(|i| self.c[i])
    }

    /// BWT[0..pos) 中 `symbol` 的出现次数
    pub fn occ(&self, symbol: u64, pos: usize) -> u64 {
        if symbol >= FIRST_MARKER {
            return match self.symbol_rank(symbol) {
                Some(i) => self.marker_occ[i].partition_point(|&r| (r as usize) < pos) as u64,
                None => 0,
            };
        }
        if pos == 0 {
            return 0;
        }
        let block = self.block as usize;
        let bi = (pos - 1) / block;
        let base = self.occ_samples[bi * DENSE_SIGMA + symbol as usize];
        let add = self.bwt[bi * block..pos].iter().filter(|&&s| s == symbol).count() as u64;
        base + add
    }

    /// 标准的 FM 反向搜索一步：在当前区间所有后缀前面接上 `symbol`。
    /// 没有任何后缀前面是 `symbol` 时返回 None。
    pub fn backward_extend(&self, interval: SaInterval, symbol: u64) -> Option<SaInterval> {
        let c0 = self.c_of(symbol)?;
        let lo = self.occ(symbol, interval.left as usize);
        let hi = self.occ(symbol, interval.right as usize + 1);
        if hi <= lo {
            return None;
        }
        Some(SaInterval::new(c0 + lo, c0 + hi - 1))
    }

    /// 以 `symbol` 开头的全部后缀
    pub fn symbol_interval(&self, symbol: u64) -> Option<SaInterval> {
        let i = self.symbol_rank(symbol)?;
        Some(SaInterval::new(self.c[i], self.c[i + 1] - 1))
    }

    /// 二维区间枚举：SA 子区间内、BWT 符号落在 [min_marker, max_marker] 的所有行。
    /// 结果按 (marker, sa_index) 升序。
    pub fn range_query_markers(&self, interval: SaInterval, min_marker: u64, max_marker: u64) -> Vec<MarkerHit> {
        let from = self.marker_rows.partition_point(|&r| r < interval.left);
        let to = self.marker_rows.partition_point(|&r| r <= interval.right);
        let mut hits: Vec<MarkerHit> = self.marker_rows[from..to]
            .iter()
            .map(|&row| MarkerHit { sa_index: row, marker: self.bwt[row as usize] })
            .filter(|hit| hit.marker >= min_marker && hit.marker <= max_marker)
            .collect();
        hits.sort_unstable_by_key(|hit| (hit.marker, hit.sa_index));
        hits
    }

    /// SA 行号 -> 文本位置
    #[inline]
    pub fn locate(&self, sa_index: u64) -> u64 {
        self.sa[sa_index as usize]
    }

    #[inline]
    pub fn text_symbol(&self, text_index: u64) -> u64 {
        self.text[text_index as usize]
    }

    /// 内部结构之间的一致性检查；从磁盘加载后调用
    pub fn validate(&self) -> Result<()> {
        let n = self.text.len();
        let corrupt = |msg: &str| Err(GramError::IndexCorrupt(msg.to_string()));
        if n == 0 || self.bwt.len() != n || self.sa.len() != n {
            return corrupt("text, BWT and SA lengths differ");
        }
        if self.alphabet.first() != Some(&0)
            || self.alphabet.last() != Some(&self.max_symbol)
            || self.alphabet.windows(2).any(|w| w[0] >= w[1])
        {
            return corrupt("alphabet is not a sorted symbol set");
        }
        if self.c.len() != self.alphabet.len() + 1
            || self.c.last().copied() != Some(n as u64)
            || self.c.windows(2).any(|w| w[0] >= w[1])
        {
            return corrupt("C table does not match the text");
        }
        if self.block == 0 {
            return corrupt("occ block size is zero");
        }
        let num_blocks = (n + self.block as usize - 1) / self.block as usize;
        if self.occ_samples.len() != num_blocks * DENSE_SIGMA {
            return corrupt("occ sample table has the wrong size");
        }
        if self.marker_occ.len() != self.alphabet.len() {
            return corrupt("marker rank table has the wrong size");
        }
        if self.sa.iter().any(|&p| p as usize >= n) {
            return corrupt("suffix array entry out of bounds");
        }
        Ok(())
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let f = std::fs::File::create(path)?;
        bincode::serialize_into(std::io::BufWriter::new(f), self)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let f = std::fs::File::open(path)?;
        let idx: Self = bincode::deserialize_from(std::io::BufReader::new(f))?;
        idx.validate()?;
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::monitor::{MemoryLog, NullMonitor};

    // gcgctggagtgctgt$
    const PLAIN: [u64; 16] = [3, 2, 3, 2, 4, 3, 3, 1, 3, 4, 3, 2, 4, 3, 4, 0];
    // gcgct5c6g6a5agtcct$
    const ONE_SITE: [u64; 19] = [3, 2, 3, 2, 4, 5, 2, 6, 3, 6, 1, 5, 1, 3, 4, 2, 2, 4, 0];

    fn build(text: &[u64], block: usize) -> FmIndex {
        FmIndex::build(text.to_vec(), block, &mut NullMonitor).unwrap()
    }

    #[test]
    fn occ_matches_naive_count() {
        for block in [1usize, 3, 4, 64] {
            let fm = build(&ONE_SITE, block);
            for s in 0..=6u64 {
                for pos in 0..=fm.bwt.len() {
                    let naive = fm.bwt[..pos].iter().filter(|&&x| x == s).count() as u64;
                    assert_eq!(fm.occ(s, pos), naive, "symbol {} pos {} block {}", s, pos, block);
                }
            }
        }
    }

    #[test]
    fn backward_extend_single_symbols() {
        let fm = build(&PLAIN, 4);
        let full = fm.full_interval();
        assert_eq!(full, SaInterval::new(0, 15));
        let g = fm.backward_extend(full, 3).unwrap();
        assert_eq!(g, SaInterval::new(5, 11));
        assert_eq!(fm.backward_extend(g, 4), Some(SaInterval::new(13, 15)));
        let a = fm.backward_extend(full, 1).unwrap();
        assert_eq!(a, SaInterval::singleton(1));
        assert_eq!(fm.backward_extend(a, 3), Some(SaInterval::singleton(5)));
        assert_eq!(fm.backward_extend(a, 2), None);
    }

    #[test]
    fn backward_extend_unknown_symbol_is_empty() {
        let fm = build(&PLAIN, 4);
        assert_eq!(fm.backward_extend(fm.full_interval(), 9), None);
        assert_eq!(fm.symbol_interval(9), None);
    }

    #[test]
    fn symbol_interval_covers_marker_rows() {
        let fm = build(&ONE_SITE, 4);
        assert_eq!(fm.symbol_interval(5), Some(SaInterval::new(15, 16)));
        assert_eq!(fm.symbol_interval(6), Some(SaInterval::new(17, 18)));
        assert_eq!(fm.symbol_interval(1), Some(SaInterval::new(1, 2)));
    }

    #[test]
    fn range_query_is_sorted_by_marker_then_row() {
        let fm = build(&ONE_SITE, 4);
        let hits = fm.range_query_markers(fm.full_interval(), FIRST_MARKER, fm.max_symbol);
        let pairs: Vec<(u64, u64)> = hits.iter().map(|h| (h.marker, h.sa_index)).collect();
        assert_eq!(pairs, vec![(5, 1), (5, 7), (6, 2), (6, 11)]);

        let a_rows = fm.range_query_markers(SaInterval::new(1, 2), FIRST_MARKER, fm.max_symbol);
        assert_eq!(a_rows, vec![MarkerHit { sa_index: 1, marker: 5 }, MarkerHit { sa_index: 2, marker: 6 }]);

        let only_six = fm.range_query_markers(fm.full_interval(), 6, 6);
        assert_eq!(only_six.len(), 2);
        assert!(fm.range_query_markers(SaInterval::new(12, 14), FIRST_MARKER, fm.max_symbol).is_empty());
    }

    #[test]
    fn large_marker_values_stay_compact() {
        // ac [g | t] ca$，位点标记取很大的值
        let big = 50_000_000_001u64;
        let text = vec![1, 2, big, 3, big + 1, 4, big, 2, 1, 0];
        let fm = build(&text, 4);
        assert_eq!(fm.alphabet, vec![0, 1, 2, 3, 4, big, big + 1]);
        assert_eq!(fm.c.len(), 8);
        assert_eq!(fm.max_symbol, big + 1);
        for s in [0, 1, 2, 3, 4, big, big + 1, big + 2] {
            for pos in 0..=fm.bwt.len() {
                let naive = fm.bwt[..pos].iter().filter(|&&x| x == s).count() as u64;
                assert_eq!(fm.occ(s, pos), naive);
            }
        }
        let starts = fm.symbol_interval(big).unwrap();
        assert_eq!(starts.right - starts.left, 1);
        assert_eq!(fm.symbol_interval(big + 2), None);
        let hits = fm.range_query_markers(fm.full_interval(), FIRST_MARKER, fm.max_symbol);
        assert_eq!(hits.len(), 3);
        assert!(fm.validate().is_ok());
    }

    #[test]
    fn locate_and_text_symbol() {
        let fm = build(&ONE_SITE, 4);
        assert_eq!(fm.locate(16), 5);
        assert_eq!(fm.text_symbol(fm.locate(16)), 5);
        assert_eq!(fm.text_symbol(fm.locate(18)), 6);
    }

    #[test]
    fn build_rejects_missing_sentinel() {
        let err = FmIndex::build(vec![1, 2, 3], 4, &mut NullMonitor).unwrap_err();
        assert!(matches!(err, GramError::IndexCorrupt(_)));
        let err = FmIndex::build(vec![1, 0, 3, 0], 4, &mut NullMonitor).unwrap_err();
        assert!(matches!(err, GramError::IndexCorrupt(_)));
    }

    #[test]
    fn build_reports_stages() {
        let mut log = MemoryLog::new();
        FmIndex::build(ONE_SITE.to_vec(), 4, &mut log).unwrap();
        let names: Vec<&str> = log.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["suffix_array", "bwt", "rank_support"]);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prg.fm");
        let mut fm = build(&ONE_SITE, 4);
        fm.set_meta(IndexMeta { prg_file: Some("prg".into()), build_args: None, build_timestamp: None });
        fm.save_to_file(&path).unwrap();

        let loaded = FmIndex::load_from_file(&path).unwrap();
        assert_eq!(loaded.sa, fm.sa);
        assert_eq!(loaded.bwt, fm.bwt);
        assert_eq!(loaded.c, fm.c);
        assert_eq!(loaded.meta, fm.meta);
        assert_eq!(loaded.backward_extend(loaded.full_interval(), 6), Some(SaInterval::new(17, 18)));
    }

    #[test]
    fn load_rejects_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.fm");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();
        assert!(FmIndex::load_from_file(&path).is_err());
    }
}
