//! PRG 的编码、位置 mask，以及搜索所需的全部只读数据（`PrgInfo`）。

pub mod encode;
pub mod mask;

pub use encode::{encode_prg, load_encoded_prg, read_prg_file, EncodedPrg};
pub use mask::{parse_masks, AlleleId, PositionMask, SiteId};

use crate::error::{GramError, Result};
use crate::index::{ConstructionMonitor, DnaRank, FmIndex, NullMonitor, SaInterval, DEFAULT_OCC_BLOCK};
use crate::search::Direction;

/// 构建一次、之后所有搜索只读共享的数据。
#[derive(Debug)]
pub struct PrgInfo {
    pub fm_index: FmIndex,
    pub dna_rank: DnaRank,
    /// 与 `fm_index` 的文本同朝向
    pub mask: PositionMask,
    pub max_alphabet_num: u64,
    pub direction: Direction,
}

impl PrgInfo {
    /// 按方向决定文本朝向，追加 $ 后建索引
    pub fn build(prg: &EncodedPrg, direction: Direction, monitor: &mut dyn ConstructionMonitor) -> Result<Self> {
        let mut text = direction.orient_text(&prg.symbols);
        text.push(0);
        let fm_index = FmIndex::build(text, DEFAULT_OCC_BLOCK, monitor)?;
        let mask = match direction {
            Direction::Backward => prg.mask.clone(),
            Direction::Forward => prg.mask.reversed(),
        };
        Self::from_parts(fm_index, mask, direction)
    }

    /// 直接从 PRG 文本构建（测试与小规模使用）
    pub fn from_raw(raw: &str, direction: Direction) -> Result<Self> {
        let prg = encode_prg(raw.as_bytes())?;
        Self::build(&prg, direction, &mut NullMonitor)
    }

    /// 由已加载的索引与 mask 组装，检查两者长度一致
    pub fn from_parts(fm_index: FmIndex, mask: PositionMask, direction: Direction) -> Result<Self> {
        if mask.len() as u64 + 1 != fm_index.size() {
            return Err(GramError::IndexCorrupt(format!(
                "mask covers {} positions but the index text has {}",
                mask.len(),
                fm_index.size() - 1
            )));
        }
        let dna_rank = DnaRank::calculate(&fm_index);
        let max_alphabet_num = fm_index.max_symbol;
        Ok(Self { fm_index, dna_rank, mask, max_alphabet_num, direction })
    }

    /// 对一个符号做一步扩展；碱基走预计算的 rank 表
    #[inline]
    pub fn next_sa_interval(&self, symbol: u64, interval: SaInterval) -> Option<SaInterval> {
        if (1..=4).contains(&symbol) {
            self.dna_rank.backward_extend(&self.fm_index, interval, symbol as u8)
        } else {
            self.fm_index.backward_extend(interval, symbol)
        }
    }

    #[inline]
    pub fn full_interval(&self) -> SaInterval {
        self.fm_index.full_interval()
    }

    pub fn has_variant_sites(&self) -> bool {
        self.max_alphabet_num >= crate::index::FIRST_MARKER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_info_indexes_reversed_text() {
        let bwd = PrgInfo::from_raw("ac5g6tt5c", Direction::Backward).unwrap();
        let fwd = PrgInfo::from_raw("ac5g6tt5c", Direction::Forward).unwrap();
        assert_eq!(bwd.fm_index.text, vec![1, 2, 5, 3, 6, 4, 4, 5, 2, 0]);
        assert_eq!(fwd.fm_index.text, vec![2, 5, 4, 4, 6, 3, 5, 2, 1, 0]);
        assert_eq!(fwd.mask.alleles, vec![0, 0, 2, 2, 0, 1, 0, 0, 0]);
        assert_eq!(fwd.max_alphabet_num, 6);
    }

    #[test]
    fn rank_table_and_index_agree_on_extension() {
        let info = PrgInfo::from_raw("gcgct5c6g6a5agtcct", Direction::Backward).unwrap();
        let full = info.full_interval();
        for symbol in 1..=6u64 {
            assert_eq!(info.next_sa_interval(symbol, full), info.fm_index.backward_extend(full, symbol));
        }
    }

    #[test]
    fn mismatched_mask_is_rejected() {
        let prg = encode_prg(b"ac5g6t5").unwrap();
        let mut text = prg.symbols.clone();
        text.push(0);
        let fm = FmIndex::build(text, 8, &mut NullMonitor).unwrap();
        let short = PositionMask { sites: vec![0; 3], alleles: vec![0; 3] };
        assert!(matches!(PrgInfo::from_parts(fm, short, Direction::Backward), Err(GramError::IndexCorrupt(_))));
    }
}
