//! build 子命令：编码 PRG，建索引与 mask，生成 k-mer 缓存，全部写入 gram 目录。

use std::time::Instant;

use log::info;

use crate::config::{Parameters, NO_KMER_SOURCE};
use crate::error::{GramError, Result};
use crate::index::{IndexMeta, MemoryLog};
use crate::kmers::{get_kmer_index, KmerSource, KmerStats};
use crate::prg::{read_prg_file, PrgInfo};
use crate::search::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub prg_length: usize,
    pub num_sites: usize,
    pub max_alphabet_num: u64,
    pub kmers: KmerStats,
}

/// 由参数决定 k-mer 来源；全量枚举必须显式打开
pub fn kmer_source(params: &Parameters) -> Result<KmerSource> {
    if params.all_kmers {
        Ok(KmerSource::All)
    } else if let Some(path) = &params.kmers_file {
        Ok(KmerSource::List(path.clone()))
    } else if !params.reads.is_empty() {
        Ok(KmerSource::Reads { paths: params.reads.clone(), max_read_size: params.max_read_size })
    } else {
        Err(GramError::Config(NO_KMER_SOURCE.into()))
    }
}

pub fn run(params: &Parameters) -> Result<BuildSummary> {
    params.validate_build()?;
    std::fs::create_dir_all(params.gram_dir())?;
    let t0 = Instant::now();

    let encoded = read_prg_file(&params.prg)?;
    info!(
        "encoded PRG {}: {} symbols, {} variant sites, max marker {}",
        params.prg.display(),
        encoded.len(),
        encoded.num_sites(),
        encoded.max_alphabet_num
    );
    encoded.save(&params.encoded_prg)?;
    encoded.mask.save(&params.sites_mask, &params.allele_mask)?;

    let mut memory_log = MemoryLog::new();
    let mut prg_info = PrgInfo::build(&encoded, Direction::Backward, &mut memory_log)?;
    prg_info.fm_index.set_meta(IndexMeta {
        prg_file: Some(params.prg.display().to_string()),
        build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
        build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
    });
    prg_info.fm_index.save_to_file(&params.fm_index)?;
    memory_log.save_to_file(&params.memory_log)?;
    info!(
        "FM index saved to {} ({:.2?}, peak stage {} bytes)",
        params.fm_index.display(),
        memory_log.total_elapsed(),
        memory_log.peak_bytes()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.threads)
        .build()
        .map_err(|e| GramError::Config(format!("cannot start {} worker threads: {}", params.threads, e)))?;
    let source = kmer_source(params)?;
    let kmer_index = pool.install(|| {
        get_kmer_index(&params.kmer_index, &params.kmers_stats, params.kmer_size, &source, &prg_info)
    })?;
    let kmers = kmer_index.stats();
    info!(
        "k-mer index: {} k-mers ({} variant, {} non-variant, {} unmatched); build finished in {:.2?}",
        kmers.total_kmers,
        kmers.variant_kmers,
        kmers.non_variant_kmers,
        kmers.unmatched_kmers,
        t0.elapsed()
    );

    Ok(BuildSummary {
        prg_length: encoded.len(),
        num_sites: encoded.num_sites(),
        max_alphabet_num: encoded.max_alphabet_num,
        kmers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn source_selection() {
        let mut p = Parameters::new("g", None);
        assert!(matches!(kmer_source(&p), Err(GramError::Config(_))));
        p.reads = vec![PathBuf::from("r.fq")];
        assert!(matches!(kmer_source(&p), Ok(KmerSource::Reads { .. })));
        p.kmers_file = Some(PathBuf::from("k.txt"));
        assert_eq!(kmer_source(&p).unwrap(), KmerSource::List(PathBuf::from("k.txt")));
        p.all_kmers = true;
        assert_eq!(kmer_source(&p).unwrap(), KmerSource::All);
    }

    #[test]
    fn build_without_kmer_source_fails_early() {
        let dir = tempfile::tempdir().unwrap();
        let prg_path = dir.path().join("prg.txt");
        std::fs::write(&prg_path, "gcgct5c6g6a5agtcct\n").unwrap();
        let params = Parameters::new(dir.path().join("gram"), Some(prg_path));
        assert!(matches!(run(&params), Err(GramError::Config(_))));
        assert!(!params.gram_dir().exists());
    }

    #[test]
    fn writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let prg_path = dir.path().join("prg.txt");
        std::fs::write(&prg_path, "gcgct5c6g6a5agtcct\n").unwrap();
        let mut params = Parameters::new(dir.path().join("gram"), Some(prg_path));
        params.kmer_size = 3;
        params.all_kmers = true;

        let summary = run(&params).unwrap();
        assert_eq!(summary.prg_length, 18);
        assert_eq!(summary.num_sites, 1);
        assert_eq!(summary.kmers.total_kmers, 64);
        for path in [
            &params.encoded_prg,
            &params.fm_index,
            &params.sites_mask,
            &params.allele_mask,
            &params.memory_log,
            &params.kmer_index,
            &params.kmers_stats,
        ] {
            assert!(path.exists(), "{}", path.display());
        }
    }
}
