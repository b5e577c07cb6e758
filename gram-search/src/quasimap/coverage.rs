use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::prg::{AlleleId, PositionMask, SiteId};
use crate::search::SearchState;

/// 每个位点、每个等位基因被多少条读段覆盖。
/// 只为 PRG 中出现的位点留位置，按标记升序排列；标记编号不必连续。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlleleSumCoverage {
    /// sites[i] 对应的位点标记，升序
    pub markers: Vec<SiteId>,
    pub sites: Vec<Vec<u64>>,
}

impl AlleleSumCoverage {
    /// 由位置 mask 得到每个位点的等位基因数
    pub fn from_mask(mask: &PositionMask) -> Self {
        let mut alleles: BTreeMap<SiteId, AlleleId> = BTreeMap::new();
        for (&site, &allele) in mask.sites.iter().zip(&mask.alleles) {
            if site == 0 {
                continue;
            }
            let most = alleles.entry(site).or_insert(0);
            *most = (*most).max(allele);
        }
        let (markers, sites) = alleles.into_iter().map(|(marker, n)| (marker, vec![0; n as usize])).unzip();
        Self { markers, sites }
    }

    /// 结构相同、计数清零的副本
    pub fn zeroed(&self) -> Self {
        Self { markers: self.markers.clone(), sites: self.sites.iter().map(|s| vec![0; s.len()]).collect() }
    }

    #[inline]
    fn site_index(&self, marker: SiteId) -> Option<usize> {
        self.markers.binary_search(&marker).ok()
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn get(&self, marker: SiteId, allele: AlleleId) -> Option<u64> {
        let i = self.site_index(marker)?;
        self.sites.get(i)?.get((allele as usize).checked_sub(1)?).copied()
    }

    fn bump(&mut self, marker: SiteId, allele: AlleleId) {
        if let Some(count) = self
            .site_index(marker)
            .and_then(|i| self.sites.get_mut(i))
            .and_then(|site| site.get_mut((allele as usize).checked_sub(1)?))
        {
            *count += 1;
        }
    }

    /// 一条读段：路径上出现的每个 (位点, 等位基因) 只计一次
    pub fn record_read<'a>(&mut self, states: impl IntoIterator<Item = &'a SearchState>) {
        let mut seen: BTreeSet<(SiteId, AlleleId)> = BTreeSet::new();
        for state in states {
            for site in &state.variant_site_path {
                for &allele in &site.allele {
                    seen.insert((site.marker, allele));
                }
            }
        }
        for (marker, allele) in seen {
            self.bump(marker, allele);
        }
    }

    /// 逐项相加；两边位点结构必须一致
    pub fn merge(&mut self, other: &AlleleSumCoverage) {
        for (mine, theirs) in self.sites.iter_mut().zip(&other.sites) {
            for (a, b) in mine.iter_mut().zip(theirs) {
                *a += *b;
            }
        }
    }

    /// 每行一个位点：`marker<TAB>count count ...`
    pub fn write_to<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        for (marker, counts) in self.markers.iter().zip(&self.sites) {
            let counts: Vec<String> = counts.iter().map(|c| c.to_string()).collect();
            writeln!(w, "{}\t{}", marker, counts.join(" "))?;
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()?;
        Ok(())
    }
}
