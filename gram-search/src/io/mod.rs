//! 读段输入：FASTA / FASTQ，按文件首字符自动识别。

pub mod fasta;
pub mod fastq;
pub mod reads;

pub use reads::{open_reads, ReadBatches};

/// 一条读段；序列保持文件中的原始字节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRecord {
    pub id: String,
    pub seq: Vec<u8>,
}
