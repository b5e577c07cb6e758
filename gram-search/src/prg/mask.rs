use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::{GramError, Result};

/// 位点 id（起止标记，奇数）；0 表示不在任何位点内
pub type SiteId = u64;
/// 等位基因 id，从 1 开始；0 表示不在任何位点内
pub type AlleleId = u32;

/// 每个 PRG 位置所属的 (位点, 等位基因)。
///
/// 只有等位基因内部的碱基带非零值，标记自身与位点外的碱基都是 0。
/// 长度与编码后的 PRG 相同（不含末尾 $）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMask {
    pub sites: Vec<SiteId>,
    pub alleles: Vec<AlleleId>,
}

impl PositionMask {
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// 越界（例如末尾 $）视为位点外
    #[inline]
    pub fn site(&self, text_index: u64) -> SiteId {
        self.sites.get(text_index as usize).copied().unwrap_or(0)
    }

    #[inline]
    pub fn allele(&self, text_index: u64) -> AlleleId {
        self.alleles.get(text_index as usize).copied().unwrap_or(0)
    }

    /// 反向文本上的 mask：位置倒序，等位基因编号保持不变
    pub fn reversed(&self) -> Self {
        Self {
            sites: self.sites.iter().rev().copied().collect(),
            alleles: self.alleles.iter().rev().copied().collect(),
        }
    }

    /// 两个 mask 各写一个文件，空格分隔的整数
    pub fn save(&self, sites_path: &Path, alleles_path: &Path) -> Result<()> {
        write_numbers(sites_path, &self.sites)?;
        write_numbers(alleles_path, &self.alleles)?;
        Ok(())
    }
}

/// 读回 `PositionMask::save` 写出的两个文件
pub fn parse_masks(sites_path: &Path, alleles_path: &Path) -> Result<PositionMask> {
    let sites: Vec<SiteId> = read_numbers(sites_path)?;
    let alleles: Vec<AlleleId> = read_numbers(alleles_path)?;
    if sites.len() != alleles.len() {
        return Err(GramError::IndexCorrupt(format!(
            "site mask has {} entries but allele mask has {}",
            sites.len(),
            alleles.len()
        )));
    }
    Ok(PositionMask { sites, alleles })
}

fn write_numbers<T: std::fmt::Display>(path: &Path, values: &[T]) -> Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.write_all(b" ")?;
        }
        write!(out, "{}", v)?;
    }
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn read_numbers<T: std::str::FromStr>(path: &Path) -> Result<Vec<T>> {
    let reader = std::io::BufReader::new(std::fs::File::open(path)?);
    let mut values = Vec::new();
    for line in reader.lines() {
        let line = line?;
        for tok in line.split_ascii_whitespace() {
            let v = tok.parse::<T>().map_err(|_| {
                GramError::IndexCorrupt(format!("invalid mask entry '{}' in {}", tok, path.display()))
            })?;
            values.push(v);
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PositionMask {
        PositionMask { sites: vec![0, 0, 5, 0, 5, 0], alleles: vec![0, 0, 1, 0, 2, 0] }
    }

    #[test]
    fn out_of_range_positions_are_outside_sites() {
        let mask = sample();
        assert_eq!(mask.site(2), 5);
        assert_eq!(mask.allele(4), 2);
        assert_eq!(mask.site(6), 0);
        assert_eq!(mask.allele(100), 0);
    }

    #[test]
    fn reversed_keeps_allele_ids() {
        let rev = sample().reversed();
        assert_eq!(rev.sites, vec![0, 5, 0, 5, 0, 0]);
        assert_eq!(rev.alleles, vec![0, 2, 0, 1, 0, 0]);
    }

    #[test]
    fn masks_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let sites = dir.path().join("sites_mask");
        let alleles = dir.path().join("allele_mask");
        let mask = sample();
        mask.save(&sites, &alleles).unwrap();
        assert_eq!(parse_masks(&sites, &alleles).unwrap(), mask);
    }

    #[test]
    fn mismatched_mask_lengths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sites = dir.path().join("sites_mask");
        let alleles = dir.path().join("allele_mask");
        std::fs::write(&sites, "0 5 0\n").unwrap();
        std::fs::write(&alleles, "0 1\n").unwrap();
        assert!(matches!(parse_masks(&sites, &alleles), Err(GramError::IndexCorrupt(_))));
    }
}
