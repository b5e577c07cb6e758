use std::collections::HashSet;
use std::path::Path;

use crate::error::{GramError, Result};
use crate::index::FIRST_MARKER;
use crate::prg::mask::{AlleleId, PositionMask, SiteId};
use crate::util::dna;

/// PRG 文本的整数编码结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPrg {
    /// 碱基 1..=4，标记 >=5；不含末尾 $
    pub symbols: Vec<u64>,
    pub mask: PositionMask,
    /// 字母表中的最大符号（没有位点时 <= 4），即标记区间查询的上界
    pub max_alphabet_num: u64,
}

impl EncodedPrg {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn num_sites(&self) -> usize {
        self.symbols.iter().filter(|&&s| s >= FIRST_MARKER && s % 2 == 1).count() / 2
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let f = std::fs::File::create(path)?;
        bincode::serialize_into(std::io::BufWriter::new(f), &self.symbols)?;
        Ok(())
    }
}

/// 当前打开的位点
struct OpenSite {
    marker: SiteId,
    allele: AlleleId,
}

/// 自左向右解析 PRG：连续数字为一个标记，A/C/G/T（大小写均可）为一个碱基。
/// 同时生成位置 mask，并检查位点结构：
/// 奇数标记成对出现（开/闭），偶数标记只能出现在对应位点内部，位点不能嵌套。
/// 相邻的两个标记会被读成同一个数字，所以等位基因不可能为空。
/// 文件末尾的空白字符会被忽略。
pub fn encode_prg(raw: &[u8]) -> Result<EncodedPrg> {
    let end = raw.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(0, |p| p + 1);

    let mut symbols: Vec<u64> = Vec::with_capacity(end);
    let mut sites: Vec<SiteId> = Vec::with_capacity(end);
    let mut alleles: Vec<AlleleId> = Vec::with_capacity(end);
    let mut open: Option<OpenSite> = None;
    let mut closed: HashSet<SiteId> = HashSet::new();

    let mut i = 0usize;
    while i < end {
        let b = raw[i];
        if b.is_ascii_digit() {
            let start = i;
            while i < end && raw[i].is_ascii_digit() {
                i += 1;
            }
            let digits = std::str::from_utf8(&raw[start..i]).map_err(|_| GramError::prg_parse(start, "invalid digits"))?;
            let marker: u64 = digits
                .parse()
                .map_err(|_| GramError::prg_parse(start, format!("marker '{}' is out of range", digits)))?;
            if marker < FIRST_MARKER {
                return Err(GramError::prg_parse(start, format!("marker {} collides with the base alphabet", marker)));
            }

            if marker % 2 == 1 {
                match open.take() {
                    None => {
                        if closed.contains(&marker) {
                            return Err(GramError::prg_parse(start, format!("site {} appears more than once", marker)));
                        }
                        if marker == u64::MAX {
                            return Err(GramError::prg_parse(start, "site marker leaves no room for its allele separator"));
                        }
                        open = Some(OpenSite { marker, allele: 1 });
                    }
                    Some(site) if site.marker == marker => {
                        closed.insert(marker);
                    }
                    Some(site) => {
                        return Err(GramError::prg_parse(
                            start,
                            format!("site {} opens inside site {}; nested sites are not supported", marker, site.marker),
                        ));
                    }
                }
            } else {
                match open.as_mut() {
                    Some(site) if site.marker.checked_add(1) == Some(marker) => site.allele += 1,
                    _ => {
                        return Err(GramError::prg_parse(start, format!("allele separator {} outside its site", marker)));
                    }
                }
            }

            symbols.push(marker);
            sites.push(0);
            alleles.push(0);
            continue;
        }

        let base = dna::to_alphabet(b)
            .ok_or_else(|| GramError::prg_parse(i, format!("unexpected character '{}'", b.escape_ascii())))?;
        symbols.push(u64::from(base));
        match &open {
            Some(site) => {
                sites.push(site.marker);
                alleles.push(site.allele);
            }
            None => {
                sites.push(0);
                alleles.push(0);
            }
        }
        i += 1;
    }

    if let Some(site) = open {
        return Err(GramError::InvalidPrg(format!("site {} is never closed", site.marker)));
    }
    if symbols.is_empty() {
        return Err(GramError::InvalidPrg("PRG is empty".into()));
    }

    let max_alphabet_num = symbols.iter().copied().max().unwrap_or(0);
    Ok(EncodedPrg { symbols, mask: PositionMask { sites, alleles }, max_alphabet_num })
}

pub fn read_prg_file(path: &Path) -> Result<EncodedPrg> {
    let raw = std::fs::read(path)?;
    encode_prg(&raw)
}

pub fn load_encoded_prg(path: &Path) -> Result<Vec<u64>> {
    let f = std::fs::File::open(path)?;
    Ok(bincode::deserialize_from(std::io::BufReader::new(f))?)
}
