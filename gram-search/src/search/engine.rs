use log::trace;

use crate::index::SaInterval;
use crate::prg::{AlleleId, PrgInfo, SiteId};
use crate::search::markers::{self, marker_hits};
use crate::search::types::{SearchState, SearchStates, SiteCrossingStatus, VariantSite};

/// `extend` 的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extension {
    pub states: SearchStates,
    /// 本步开始时排在第一位的状态（主路径）在符号扩展中被淘汰
    pub primary_lost: bool,
}

/// 整条模式的搜索结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// 已经 finalize 的存活状态；无匹配时为空
    pub states: SearchStates,
    /// 匹配中断时，第一个无法匹配的符号在模式中的下标
    pub stopped_at: Option<usize>,
    /// 任意一步中主路径被淘汰过
    pub primary_lost: bool,
}

impl SearchOutcome {
    pub fn is_match(&self) -> bool {
        self.stopped_at.is_none() && !self.states.is_empty()
    }
}

/// 单个符号的扩展：位点外的状态先补记上一个位点，区间变空的状态被丢弃
pub fn search_char(symbol: u64, states: SearchStates, prg_info: &PrgInfo) -> SearchStates {
    search_char_tracked(symbol, states, prg_info).0
}

fn search_char_tracked(symbol: u64, states: SearchStates, prg_info: &PrgInfo) -> (SearchStates, bool) {
    let mut primary_lost = false;
    let mut out = Vec::with_capacity(states.len());
    for (i, mut state) in states.into_iter().enumerate() {
        if state.site_crossing_status == SiteCrossingStatus::OutsideVariantSite {
            state.record_last_variant_site();
        }
        match prg_info.next_sa_interval(symbol, state.sa_interval) {
            Some(interval) => {
                state.sa_interval = interval;
                out.push(state);
            }
            None => primary_lost |= i == 0,
        }
    }
    (out, primary_lost)
}

/// 一个状态区间内的全部标记越过，返回分叉出的新状态（不含原状态）。
///
/// 进入位点（结束边界）时，每个等位基因分叉出一个状态，按等位基因编号排序；
/// 离开位点时，落在同一起始边界行上的状态合并，等位基因取并集。
pub fn process_markers_search_state(state: &SearchState, prg_info: &PrgInfo) -> SearchStates {
    let mut entering = SearchStates::new();
    let mut exiting = SearchStates::new();
    for hit in marker_hits(state.sa_interval, prg_info) {
        let mut interval = state.sa_interval;
        match markers::skip(&mut interval, hit, prg_info) {
            Some(true) => {
                let site = markers::site_of(hit.marker);
                let (_, last_allele) = markers::resolve_location(hit, true, prg_info);
                let mut forks = vec![(last_allele, interval)];
                if let Some(separators) = markers::allele_marker_interval(site, prg_info) {
                    forks.extend(
                        separators
                            .rows()
                            .map(|row| (markers::allele_id(row, prg_info), SaInterval::singleton(row))),
                    );
                }
                forks.sort_unstable();
                for (allele, interval) in forks {
                    entering.push(enter_site(state, site, allele, interval));
                }
            }
            Some(false) => {
                let (site, allele) = markers::resolve_location(hit, false, prg_info);
                merge_exit(&mut exiting, exit_site(state, site, allele, interval));
            }
            None => trace!("marker {} at row {} has no successor row", hit.marker, hit.sa_index),
        }
    }
    entering.extend(exiting);
    entering
}

fn enter_site(state: &SearchState, site: SiteId, allele: AlleleId, interval: SaInterval) -> SearchState {
    let mut fork = state.clone();
    fork.record_last_variant_site();
    fork.sa_interval = interval;
    fork.site_crossing_status = SiteCrossingStatus::WithinVariantSite;
    fork.site_already_recorded = false;
    fork.last_variant_site = VariantSite::new(site, vec![allele]);
    fork
}

fn exit_site(state: &SearchState, site: SiteId, allele: AlleleId, interval: SaInterval) -> SearchState {
    let mut fork = state.clone();
    if fork.last_variant_site.marker == site {
        // 从缓存恢复的位点内状态已经把当前位点记入路径；撤回，由下一次扩展统一记录
        if fork.site_already_recorded && fork.variant_site_path.last().is_some_and(|s| s.marker == site) {
            fork.variant_site_path.pop();
        }
    } else {
        fork.record_last_variant_site();
    }
    fork.sa_interval = interval;
    fork.site_crossing_status = SiteCrossingStatus::OutsideVariantSite;
    fork.site_already_recorded = false;
    fork.last_variant_site = VariantSite::new(site, vec![allele]);
    fork
}

fn merge_exit(exiting: &mut SearchStates, fork: SearchState) {
    let same = exiting.iter_mut().find(|s| {
        s.sa_interval == fork.sa_interval
            && s.variant_site_path == fork.variant_site_path
            && s.last_variant_site.marker == fork.last_variant_site.marker
    });
    match same {
        Some(existing) => existing.last_variant_site.merge_alleles(&fork.last_variant_site.allele),
        None => exiting.push(fork),
    }
}

/// 所有状态的标记阶段：原状态在前，随后依次是各状态的分叉。
/// 不同状态离开同一位点、落到同一行且历史相同时同样合并。
pub fn process_markers_search_states(states: SearchStates, prg_info: &PrgInfo) -> SearchStates {
    let mut forks = SearchStates::new();
    for state in &states {
        for fork in process_markers_search_state(state, prg_info) {
            if fork.site_crossing_status == SiteCrossingStatus::OutsideVariantSite {
                merge_exit(&mut forks, fork);
            } else {
                forks.push(fork);
            }
        }
    }
    let mut all = states;
    all.extend(forks);
    all
}

/// 用一个符号扩展全部状态。
///
/// `states` 为空时视为新的搜索：从整个索引区间开始，跳过标记阶段。
pub fn extend(symbol: u64, states: SearchStates, prg_info: &PrgInfo) -> Extension {
    let states = if states.is_empty() {
        vec![SearchState::new(prg_info.full_interval())]
    } else {
        process_markers_search_states(states, prg_info)
    };
    let (states, primary_lost) = search_char_tracked(symbol, states, prg_info);
    Extension { states, primary_lost }
}

/// 从 `states` 出发，按 `prg_info.direction` 的顺序消费整个模式。
/// 状态全部消失时立即停止，并报告停在哪个符号上；否则 finalize 所有存活状态。
pub fn search_pattern(pattern: &[u64], states: SearchStates, prg_info: &PrgInfo) -> SearchOutcome {
    let mut outcome = SearchOutcome { states, ..SearchOutcome::default() };
    for (pos, symbol) in prg_info.direction.consume_order(pattern) {
        let step = extend(symbol, std::mem::take(&mut outcome.states), prg_info);
        outcome.primary_lost |= step.primary_lost;
        outcome.states = step.states;
        if outcome.states.is_empty() {
            outcome.stopped_at = Some(pos);
            return outcome;
        }
    }
    outcome.states = outcome.states.into_iter().map(SearchState::finalize).collect();
    outcome
}

/// 判断状态是否满足区间不变量（测试与调试用）
pub fn states_within_bounds(states: &[SearchState], prg_info: &PrgInfo) -> bool {
    let size = prg_info.fm_index.size();
    states.iter().all(|s| s.sa_interval.left <= s.sa_interval.right && s.sa_interval.right < size)
}
