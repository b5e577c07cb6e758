use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::kmers::KmerIndex;

/// k-mer 索引的汇总，只用于报告
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KmerStats {
    pub kmer_size: usize,
    pub total_kmers: usize,
    pub variant_kmers: usize,
    pub non_variant_kmers: usize,
    pub unmatched_kmers: usize,
    pub total_sa_intervals: usize,
}

impl KmerStats {
    pub fn collect(index: &KmerIndex) -> Self {
        let mut stats = KmerStats { kmer_size: index.kmer_size, total_kmers: index.len(), ..Self::default() };
        for entry in index.entries.values() {
            stats.total_sa_intervals += entry.search_states.len();
            if entry.is_unmatched() {
                stats.unmatched_kmers += 1;
            } else if entry.is_non_variant {
                stats.non_variant_kmers += 1;
            } else {
                stats.variant_kmers += 1;
            }
        }
        stats
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "kmer_size\t{}", self.kmer_size)?;
        writeln!(w, "total_kmers\t{}", self.total_kmers)?;
        writeln!(w, "variant_kmers\t{}", self.variant_kmers)?;
        writeln!(w, "non_variant_kmers\t{}", self.non_variant_kmers)?;
        writeln!(w, "unmatched_kmers\t{}", self.unmatched_kmers)?;
        writeln!(w, "total_sa_intervals\t{}", self.total_sa_intervals)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()?;
        Ok(())
    }
}
