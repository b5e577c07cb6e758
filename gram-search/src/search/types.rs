use serde::{Deserialize, Serialize};

pub use crate::index::SaInterval;
pub use crate::prg::{AlleleId, SiteId};

/// 在某个位点上与当前路径相容的等位基因 id（升序、去重）
pub type Allele = Vec<AlleleId>;

/// 路径经过的一个位点，以及在该位点上选中的等位基因
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantSite {
    /// 位点的起止标记（奇数）；0 表示尚未经过任何位点
    pub marker: SiteId,
    pub allele: Allele,
}

impl VariantSite {
    pub fn new(marker: SiteId, allele: Allele) -> Self {
        Self { marker, allele }
    }

    pub fn is_set(&self) -> bool {
        self.marker != 0
    }

    /// 合并另一条路径在同一位点上的等位基因
    pub fn merge_alleles(&mut self, other: &[AlleleId]) {
        self.allele.extend_from_slice(other);
        self.allele.sort_unstable();
        self.allele.dedup();
    }
}

/// 按经过的先后顺序排列的位点（最早经过的在前）
pub type VariantSitePath = Vec<VariantSite>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteCrossingStatus {
    #[default]
    OutsideVariantSite,
    WithinVariantSite,
}

/// 一条候选比对：当前 SA 区间以及它在图中走过的位点。
///
/// `last_variant_site` 是最近一次越过的位点；它在下一次于位点外扩展、
/// 进入下一个位点或搜索结束时才被追加到 `variant_site_path`，
/// `site_already_recorded` 标记这一步是否已经做过。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchState {
    pub sa_interval: SaInterval,
    pub variant_site_path: VariantSitePath,
    pub site_crossing_status: SiteCrossingStatus,
    pub site_already_recorded: bool,
    pub last_variant_site: VariantSite,
}

impl SearchState {
    /// 位点外的新状态，路径为空
    pub fn new(sa_interval: SaInterval) -> Self {
        Self { sa_interval, ..Self::default() }
    }

    pub fn with_path(sa_interval: SaInterval, variant_site_path: VariantSitePath) -> Self {
        Self { sa_interval, variant_site_path, ..Self::default() }
    }

    pub fn is_within_site(&self) -> bool {
        self.site_crossing_status == SiteCrossingStatus::WithinVariantSite
    }

    /// 把尚未记录的 `last_variant_site` 追加到路径末尾
    pub fn record_last_variant_site(&mut self) {
        if !self.site_already_recorded && self.last_variant_site.is_set() {
            self.variant_site_path.push(self.last_variant_site.clone());
            self.site_already_recorded = true;
        }
    }

    /// 搜索结束时调用：所有越过的位点都进入路径
    pub fn finalize(mut self) -> Self {
        self.record_last_variant_site();
        self
    }

    /// 路径上从未出现过位点
    pub fn is_non_variant(&self) -> bool {
        self.variant_site_path.is_empty() && !self.last_variant_site.is_set()
    }
}

/// 一个部分匹配模式的所有存活比对。
/// 顺序即插入顺序：第一个是原区间的主扩展，后面是分叉出的备选路径。
pub type SearchStates = Vec<SearchState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_deferred_and_idempotent() {
        let mut state = SearchState::new(SaInterval::singleton(16));
        state.last_variant_site = VariantSite::new(5, vec![2]);
        assert!(state.variant_site_path.is_empty());

        state.record_last_variant_site();
        state.record_last_variant_site();
        assert_eq!(state.variant_site_path, vec![VariantSite::new(5, vec![2])]);
        assert!(state.site_already_recorded);
    }

    #[test]
    fn finalize_without_site_changes_nothing() {
        let state = SearchState::new(SaInterval::new(5, 11));
        assert_eq!(state.clone().finalize(), state);
        assert!(state.is_non_variant());
    }

    #[test]
    fn merge_alleles_sorts_and_dedups() {
        let mut site = VariantSite::new(7, vec![3]);
        site.merge_alleles(&[1, 3, 2]);
        assert_eq!(site.allele, vec![1, 2, 3]);
    }
}
