use std::path::{Path, PathBuf};

use crate::error::{GramError, Result};

/// 默认的读段最大长度；超过的读段在 quasimap 中被跳过
pub const DEFAULT_MAX_READ_SIZE: usize = 150;

/// build 没有指定任何 k-mer 来源时的提示
pub const NO_KMER_SOURCE: &str = "choose a k-mer source: --all-kmers, --kmers or --reads";

/// 一次运行需要的全部参数。所有中间文件都放在同一个 gram 目录下。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    pub gram_dir: PathBuf,
    pub prg: PathBuf,
    pub encoded_prg: PathBuf,
    pub fm_index: PathBuf,
    pub sites_mask: PathBuf,
    pub allele_mask: PathBuf,
    pub memory_log: PathBuf,
    pub kmer_index: PathBuf,
    pub kmers_stats: PathBuf,
    pub allele_sum_coverage: PathBuf,

    pub kmer_size: usize,
    pub max_read_size: usize,
    pub all_kmers: bool,
    /// 显式给出的 k-mer 列表文件
    pub kmers_file: Option<PathBuf>,
    pub reads: Vec<PathBuf>,
    pub threads: usize,
}

impl Parameters {
    /// 按 gram 目录生成所有文件路径；`prg` 为 None 时使用目录中的 `prg`
    pub fn new(gram_dir: impl Into<PathBuf>, prg: Option<PathBuf>) -> Self {
        let gram_dir = gram_dir.into();
        let at = |name: &str| gram_dir.join(name);
        Self {
            prg: prg.unwrap_or_else(|| at("prg")),
            encoded_prg: at("encoded_prg"),
            fm_index: at("fm_index"),
            sites_mask: at("variant_site_mask"),
            allele_mask: at("allele_mask"),
            memory_log: at("memory_log"),
            kmer_index: at("kmers"),
            kmers_stats: at("kmers_stats"),
            allele_sum_coverage: at("allele_sum_coverage"),
            gram_dir,
            kmer_size: 15,
            max_read_size: DEFAULT_MAX_READ_SIZE,
            all_kmers: false,
            kmers_file: None,
            reads: Vec::new(),
            threads: 1,
        }
    }

    pub fn gram_dir(&self) -> &Path {
        &self.gram_dir
    }

    fn check_common(&self) -> Result<()> {
        if self.kmer_size == 0 {
            return Err(GramError::Config("k-mer size must be at least 1".into()));
        }
        if self.threads == 0 {
            return Err(GramError::Config("thread count must be at least 1".into()));
        }
        if self.max_read_size < self.kmer_size {
            return Err(GramError::Config(format!(
                "maximum read size {} is shorter than the k-mer size {}",
                self.max_read_size, self.kmer_size
            )));
        }
        Ok(())
    }

    pub fn validate_build(&self) -> Result<()> {
        self.check_common()?;
        let sources = usize::from(self.all_kmers) + usize::from(self.kmers_file.is_some()) + usize::from(!self.reads.is_empty());
        if sources == 0 {
            return Err(GramError::Config(NO_KMER_SOURCE.into()));
        }
        if sources > 1 {
            return Err(GramError::Config("choose only one of --all-kmers, --kmers and --reads".into()));
        }
        Ok(())
    }

    pub fn validate_quasimap(&self) -> Result<()> {
        self.check_common()?;
        if self.reads.is_empty() {
            return Err(GramError::Config("quasimap needs at least one reads file".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_gram_dir() {
        let p = Parameters::new("/tmp/gram", None);
        assert_eq!(p.prg, PathBuf::from("/tmp/gram/prg"));
        assert_eq!(p.fm_index, PathBuf::from("/tmp/gram/fm_index"));
        assert_eq!(p.kmer_index, PathBuf::from("/tmp/gram/kmers"));

        let p = Parameters::new("/tmp/gram", Some(PathBuf::from("/data/prg.txt")));
        assert_eq!(p.prg, PathBuf::from("/data/prg.txt"));
    }

    #[test]
    fn validation() {
        let mut p = Parameters::new("g", None);
        assert!(matches!(p.validate_build(), Err(GramError::Config(_))));
        assert!(matches!(p.validate_quasimap(), Err(GramError::Config(_))));

        p.reads.push(PathBuf::from("reads.fq"));
        assert!(p.validate_quasimap().is_ok());
        assert!(p.validate_build().is_ok());
        p.all_kmers = true;
        assert!(p.validate_build().is_err());

        p.all_kmers = false;
        p.kmer_size = 0;
        assert!(p.validate_build().is_err());
        p.kmer_size = 200;
        assert!(p.validate_build().is_err());
        p.kmer_size = 5;
        p.threads = 0;
        assert!(p.validate_quasimap().is_err());
    }
}
