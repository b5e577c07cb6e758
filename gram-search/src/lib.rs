//! # gram-search
//!
//! 在群体参考图（PRG）上做变异感知的 FM 索引搜索。
//!
//! PRG 是把参考序列与变异位点线性化后的整数文本：碱基编码为 1..=4，
//! 每个位点用一对奇数边界标记包围，等位基因之间用偶数分隔符隔开。
//! 本 crate 提供：
//!
//! - **PRG 编码**：解析 PRG 文本，生成整数序列与位置 mask
//! - **索引构建**：整数字母表上的后缀数组、BWT 与 FM 索引，支持标记的区间枚举
//! - **变异感知搜索**：逐符号扩展 SA 区间，遇到标记时分叉进入 / 离开位点，
//!   记录每条候选比对经过的 (位点, 等位基因)
//! - **k-mer 缓存**：预先搜索 k-mer，读段搜索从缓存状态继续
//! - **quasimap**：读段比对与等位基因覆盖度统计
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use gram_search::prg::PrgInfo;
//! use gram_search::search::{search_pattern, Direction, SearchStates};
//! use gram_search::util::dna;
//!
//! let prg = PrgInfo::from_raw("gcgct5c6g6a5agtcct", Direction::Backward)?;
//! let pattern: Vec<u64> = dna::encode_seq(b"GCTGAGT")
//!     .unwrap_or_default()
//!     .into_iter()
//!     .map(u64::from)
//!     .collect();
//! let outcome = search_pattern(&pattern, SearchStates::new(), &prg);
//! for state in &outcome.states {
//!     println!("{:?} via {:?}", state.sa_interval, state.variant_site_path);
//! }
//! # Ok::<(), gram_search::error::GramError>(())
//! ```
//!
//! ## 模块说明
//!
//! - [`prg`]：PRG 编码、位置 mask、`PrgInfo`
//! - [`index`]：后缀数组、BWT、FM 索引、碱基 rank 表、构建日志
//! - [`search`]：搜索状态、标记解析、搜索引擎
//! - [`kmers`]：k-mer 缓存的构建、读写与统计
//! - [`quasimap`]：读段搜索与覆盖度
//! - [`io`]：FASTA / FASTQ 读段输入
//! - [`util`]：DNA 编码 / 反向互补等工具函数

pub mod build;
pub mod config;
pub mod error;
pub mod index;
pub mod io;
pub mod kmers;
pub mod prg;
pub mod quasimap;
pub mod search;
pub mod util;
