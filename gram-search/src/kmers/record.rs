//! k-mer 索引的文本格式，一行一个 k-mer：
//!
//! ```text
//! 4 3 1|14,14|0|5:2|o
//! ```
//!
//! 五个字段以 `|` 分隔：k-mer 符号；各状态的 SA 区间 `l,r`；非变异标记；
//! 各状态的位点路径（状态之间 `;`，位点之间空格，位点为 `marker:allele,allele`，
//! 非变异 k-mer 留空）；各状态是否仍在位点内（`o` / `w`）。

use std::fmt::Write as _;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use log::info;

use crate::error::{GramError, Result};
use crate::index::SaInterval;
use crate::kmers::{Kmer, KmerEntry, KmerIndex};
use crate::search::{SearchState, SiteCrossingStatus, VariantSite, VariantSitePath};

const FIELD_SEP: char = '|';
const PATH_SEP: char = ';';

fn join<T: std::fmt::Display>(items: impl IntoIterator<Item = T>, sep: &str) -> String {
    let mut out = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        let _ = write!(out, "{}", item);
    }
    out
}

fn dump_site(site: &VariantSite) -> String {
    format!("{}:{}", site.marker, join(&site.allele, ","))
}

fn dump_path(path: &VariantSitePath) -> String {
    join(path.iter().map(dump_site), " ")
}

/// 一条记录（不含换行）
pub fn write_kmer_record(kmer: &[u8], entry: &KmerEntry) -> String {
    let states = &entry.search_states;
    let intervals = join(states.iter().map(|s| format!("{},{}", s.sa_interval.left, s.sa_interval.right)), " ");
    let paths = if entry.is_non_variant {
        String::new()
    } else {
        join(states.iter().map(|s| dump_path(&s.variant_site_path)), &PATH_SEP.to_string())
    };
    let statuses = join(
        states.iter().map(|s| match s.site_crossing_status {
            SiteCrossingStatus::OutsideVariantSite => 'o',
            SiteCrossingStatus::WithinVariantSite => 'w',
        }),
        " ",
    );
    format!(
        "{}{sep}{}{sep}{}{sep}{}{sep}{}",
        join(kmer, " "),
        intervals,
        u8::from(entry.is_non_variant),
        paths,
        statuses,
        sep = FIELD_SEP
    )
}

fn parse_num<T: FromStr>(text: &str, line: usize, what: &str) -> Result<T> {
    text.parse().map_err(|_| GramError::kmer_record(line, format!("invalid {} '{}'", what, text)))
}

fn parse_kmer(field: &str, line: usize) -> Result<Kmer> {
    let kmer: Kmer = field.split_whitespace().map(|s| parse_num(s, line, "k-mer symbol")).collect::<Result<_>>()?;
    if kmer.is_empty() || kmer.iter().any(|&b| !(1..=4).contains(&b)) {
        return Err(GramError::kmer_record(line, format!("invalid k-mer '{}'", field)));
    }
    Ok(kmer)
}

fn parse_intervals(field: &str, line: usize) -> Result<Vec<SaInterval>> {
    field
        .split_whitespace()
        .map(|pair| {
            let (l, r) = pair
                .split_once(',')
                .ok_or_else(|| GramError::kmer_record(line, format!("invalid SA interval '{}'", pair)))?;
            let (left, right): (u64, u64) = (parse_num(l, line, "SA index")?, parse_num(r, line, "SA index")?);
            if left > right {
                return Err(GramError::kmer_record(line, format!("SA interval {} has left > right", pair)));
            }
            Ok(SaInterval::new(left, right))
        })
        .collect()
}

fn parse_flag(field: &str, line: usize) -> Result<bool> {
    match field {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(GramError::kmer_record(line, format!("invalid non-variant flag '{}'", other))),
    }
}

fn parse_site(text: &str, line: usize) -> Result<VariantSite> {
    let (marker, alleles) = text
        .split_once(':')
        .ok_or_else(|| GramError::kmer_record(line, format!("invalid site '{}'", text)))?;
    let marker = parse_num(marker, line, "site marker")?;
    let allele = alleles.split(',').map(|a| parse_num(a, line, "allele id")).collect::<Result<Vec<_>>>()?;
    Ok(VariantSite::new(marker, allele))
}

fn parse_paths(field: &str, num_states: usize, non_variant: bool, line: usize) -> Result<Vec<VariantSitePath>> {
    if non_variant || num_states == 0 {
        if !field.is_empty() {
            return Err(GramError::kmer_record(line, "site paths given for a k-mer without sites"));
        }
        return Ok(vec![VariantSitePath::new(); num_states]);
    }
    let paths: Vec<VariantSitePath> = field
        .split(PATH_SEP)
        .map(|path| path.split_whitespace().map(|site| parse_site(site, line)).collect())
        .collect::<Result<_>>()?;
    if paths.len() != num_states {
        return Err(GramError::kmer_record(
            line,
            format!("{} site paths for {} SA intervals", paths.len(), num_states),
        ));
    }
    Ok(paths)
}

fn parse_statuses(field: &str, num_states: usize, line: usize) -> Result<Vec<SiteCrossingStatus>> {
    let statuses: Vec<SiteCrossingStatus> = field
        .split_whitespace()
        .map(|s| match s {
            "o" => Ok(SiteCrossingStatus::OutsideVariantSite),
            "w" => Ok(SiteCrossingStatus::WithinVariantSite),
            other => Err(GramError::kmer_record(line, format!("invalid crossing status '{}'", other))),
        })
        .collect::<Result<_>>()?;
    if statuses.len() != num_states {
        return Err(GramError::kmer_record(line, "crossing statuses do not match SA intervals"));
    }
    Ok(statuses)
}

/// 解析一条记录。恢复出的状态与搜索结束时 finalize 过的状态一致：
/// 路径非空即视为已记录，最后一个位点即路径末尾。
pub fn parse_kmer_record(text: &str, line: usize) -> Result<(Kmer, KmerEntry)> {
    let fields: Vec<&str> = text.split(FIELD_SEP).collect();
    let [kmer, intervals, flag, paths, statuses] = fields[..] else {
        return Err(GramError::kmer_record(line, format!("expected 5 fields, found {}", fields.len())));
    };
    let kmer = parse_kmer(kmer, line)?;
    let intervals = parse_intervals(intervals, line)?;
    let is_non_variant = parse_flag(flag, line)?;
    let paths = parse_paths(paths, intervals.len(), is_non_variant, line)?;
    let statuses = parse_statuses(statuses, intervals.len(), line)?;

    let search_states = intervals
        .into_iter()
        .zip(paths)
        .zip(statuses)
        .map(|((sa_interval, variant_site_path), site_crossing_status)| SearchState {
            sa_interval,
            site_already_recorded: !variant_site_path.is_empty(),
            last_variant_site: variant_site_path.last().cloned().unwrap_or_default(),
            variant_site_path,
            site_crossing_status,
        })
        .collect();
    Ok((kmer, KmerEntry { search_states, is_non_variant }))
}

/// 按 k-mer 排序写出整个索引
pub fn dump_kmer_index(index: &KmerIndex, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(std::fs::File::create(path)?);
    for (kmer, entry) in index.sorted_entries() {
        writeln!(out, "{}", write_kmer_record(kmer, entry))?;
    }
    out.flush()?;
    info!("wrote {} k-mer records to {}", index.len(), path.display());
    Ok(())
}

/// 加载索引；任何一条记录无法解析都使整个加载失败
pub fn load_kmer_index(path: &Path) -> Result<KmerIndex> {
    let reader = std::io::BufReader::new(std::fs::File::open(path)?);
    let mut index = KmerIndex::default();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (kmer, entry) = parse_kmer_record(line.trim_end(), i + 1)?;
        if index.is_empty() {
            index.kmer_size = kmer.len();
        } else if kmer.len() != index.kmer_size {
            return Err(GramError::kmer_record(
                i + 1,
                format!("k-mer length {} differs from {}", kmer.len(), index.kmer_size),
            ));
        }
        index.insert(kmer, entry);
    }
    Ok(index)
}
