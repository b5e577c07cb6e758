//! 标记命中到 (位点, 等位基因) 的解析，以及越过标记后区间的跳转。
//!
//! 索引里一个标记命中 `(row, m)` 表示：第 `row` 行的后缀从文本位置 `p = SA[row]`
//! 开始，而 `p - 1` 处是标记 `m`。按照当前的消费方向，越过这个标记有三种情形：
//!
//! - `m` 是奇数且 `p - 2` 属于位点 `m`：这是位点的结束边界，状态从末尾**进入**位点，
//!   接下来可以进入任何一个等位基因的末尾；
//! - `m` 是偶数：状态刚匹配完某个非首等位基因的开头，**离开**位点，跳到位点起点之前；
//! - `m` 是奇数的其它情况：状态刚匹配完首个等位基因的开头，同样离开位点。

use crate::index::{MarkerHit, SaInterval, FIRST_MARKER};
use crate::prg::{AlleleId, PrgInfo, SiteId};

/// 命中的标记是否是位点的结束边界
pub fn is_site_end(hit: MarkerHit, prg_info: &PrgInfo) -> bool {
    if hit.marker % 2 == 0 {
        return false;
    }
    let p = prg_info.fm_index.locate(hit.sa_index);
    p >= 2 && prg_info.mask.site(p - 2) == hit.marker
}

/// 标记所属位点的边界标记（奇数）
#[inline]
pub fn site_of(marker: u64) -> SiteId {
    if marker % 2 == 0 {
        marker - 1
    } else {
        marker
    }
}

/// 越过命中的标记：把 `interval` 替换为越过之后的单行区间。
///
/// 返回 `true` 表示越过的是位点结束边界，`interval` 落在最后一个等位基因的末尾，
/// 调用方还需为其余等位基因分叉；返回 `false` 表示状态离开了位点，
/// `interval` 落在位点起始边界上。
/// 索引中找不到目标行（索引与 mask 不一致）时返回 `None`。
pub fn skip(interval: &mut SaInterval, hit: MarkerHit, prg_info: &PrgInfo) -> Option<bool> {
    let row = SaInterval::singleton(hit.sa_index);
    if hit.marker % 2 == 0 {
        *interval = site_start_interval(site_of(hit.marker), prg_info)?;
        return Some(false);
    }
    *interval = prg_info.fm_index.backward_extend(row, hit.marker)?;
    Some(is_site_end(hit, prg_info))
}

/// 命中对应的 (位点, 等位基因)。
///
/// `is_last_allele` 为真时，命中是结束边界，等位基因取边界之前的那一段；
/// 否则取标记之后、状态已经匹配的那一段。
pub fn resolve_location(hit: MarkerHit, is_last_allele: bool, prg_info: &PrgInfo) -> (SiteId, AlleleId) {
    let p = prg_info.fm_index.locate(hit.sa_index);
    let text_index = if is_last_allele { p.saturating_sub(2) } else { p };
    (site_of(hit.marker), prg_info.mask.allele(text_index))
}

/// 位点所有等位基因分隔符所在的 SA 区间（每一行对应一个非末尾等位基因的结尾）。
/// 只有一个等位基因的位点没有分隔符，返回 `None`。
pub fn allele_marker_interval(site_marker: SiteId, prg_info: &PrgInfo) -> Option<SaInterval> {
    prg_info.fm_index.symbol_interval(site_marker + 1)
}

/// 分隔符所在行对应的等位基因编号（从 1 开始）
pub fn allele_id(sa_index: u64, prg_info: &PrgInfo) -> AlleleId {
    let p = prg_info.fm_index.locate(sa_index);
    prg_info.mask.allele(p.saturating_sub(1))
}

/// 位点起始边界标记所在的行：边界标记出现两次，取文本位置较小的那一次
pub fn site_start_interval(site_marker: SiteId, prg_info: &PrgInfo) -> Option<SaInterval> {
    let bounds = prg_info.fm_index.symbol_interval(site_marker)?;
    bounds
        .rows()
        .min_by_key(|&row| prg_info.fm_index.locate(row))
        .map(SaInterval::singleton)
}

/// 区间内所有标记命中，按 (标记, 行号) 排序
pub fn marker_hits(interval: SaInterval, prg_info: &PrgInfo) -> Vec<MarkerHit> {
    if !prg_info.has_variant_sites() {
        return Vec::new();
    }
    prg_info.fm_index.range_query_markers(interval, FIRST_MARKER, prg_info.max_alphabet_num)
}
