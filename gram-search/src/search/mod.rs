//! 在 PRG 索引上的变异感知搜索。
//!
//! 一条模式的所有候选比对以 `SearchStates` 表示；每消费一个符号，先处理
//! 区间内的标记越过（进入或离开位点），再对所有状态做一步 FM 扩展。

pub mod direction;
pub mod engine;
pub mod markers;
pub mod types;

pub use direction::Direction;
pub use engine::{
    extend, process_markers_search_state, process_markers_search_states, search_char, search_pattern, Extension,
    SearchOutcome,
};
pub use types::{
    Allele, SearchState, SearchStates, SiteCrossingStatus, VariantSite, VariantSitePath,
};
