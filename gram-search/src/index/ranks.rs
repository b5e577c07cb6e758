use crate::index::fm::{FmIndex, SaInterval};
use crate::util::dna::{Base, BASES, NUM_BASES};

/// 四个碱基在 BWT 上的完整前缀计数表。
///
/// `counts[b - 1][i]` = BWT[0..i) 中碱基 b 的出现次数，每张表长度为 n + 1。
/// 搜索时每步都要对碱基做 rank，整表预计算后每次查询只是两次数组访问。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnaRank {
    counts: [Vec<u64>; NUM_BASES],
}

impl DnaRank {
    pub fn calculate(fm: &FmIndex) -> Self {
        let n = fm.bwt.len();
        let mut counts: [Vec<u64>; NUM_BASES] = Default::default();
        for table in counts.iter_mut() {
            table.reserve_exact(n + 1);
            table.push(0);
        }
        let mut running = [0u64; NUM_BASES];
        for &s in &fm.bwt {
            if (1..=NUM_BASES as u64).contains(&s) {
                running[s as usize - 1] += 1;
            }
            for (table, &count) in counts.iter_mut().zip(running.iter()) {
                table.push(count);
            }
        }
        Self { counts }
    }

    /// BWT[0..pos) 中碱基 `base` 的出现次数
    #[inline]
    pub fn rank(&self, base: Base, pos: usize) -> u64 {
        self.counts[base as usize - 1][pos]
    }

    /// 与 `FmIndex::backward_extend` 等价，但只适用于碱基
    pub fn backward_extend(&self, fm: &FmIndex, interval: SaInterval, base: Base) -> Option<SaInterval> {
        debug_assert!(BASES.contains(&base));
        let c0 = fm.c_of(u64::from(base))?;
        let lo = self.rank(base, interval.left as usize);
        let hi = self.rank(base, interval.right as usize + 1);
        if hi <= lo {
            return None;
        }
        Some(SaInterval::new(c0 + lo, c0 + hi - 1))
    }

    pub fn bytes(&self) -> usize {
        self.counts.iter().map(|t| t.len() * std::mem::size_of::<u64>()).sum()
    }
}
