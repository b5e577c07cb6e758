use thiserror::Error;

/// 库内统一错误类型。
///
/// 只有构建期 / 文件级的失败会落到这里；搜索过程中的“无匹配”
/// 永远以空的 `SearchStates` 表示，不是错误。
#[derive(Debug, Error)]
pub enum GramError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PRG 文本中出现了非法字符或非法的标记结构
    #[error("PRG parse error at byte {position}: {message}")]
    PrgParse { position: usize, message: String },

    /// PRG 结构不合法（位点嵌套、未闭合……）
    #[error("invalid PRG: {0}")]
    InvalidPrg(String),

    /// 索引或 mask 之间不一致
    #[error("corrupt index: {0}")]
    IndexCorrupt(String),

    /// k-mer 索引文件中的某条记录无法解析
    #[error("k-mer index line {line}: {message}")]
    KmerRecord { line: usize, message: String },

    /// FASTA / FASTQ 读段文件格式错误
    #[error("reads file {path}: {message}")]
    ReadFormat { path: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, GramError>;

impl GramError {
    pub fn prg_parse(position: usize, message: impl Into<String>) -> Self {
        Self::PrgParse { position, message: message.into() }
    }

    pub fn read_format(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReadFormat { path: path.into(), message: message.into() }
    }

    pub fn kmer_record(line: usize, message: impl Into<String>) -> Self {
        Self::KmerRecord { line, message: message.into() }
    }
}
