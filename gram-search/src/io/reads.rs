use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{GramError, Result};
use crate::io::fasta::FastaReader;
use crate::io::fastq::FastqReader;
use crate::io::ReadRecord;

pub type ReadIter = Box<dyn Iterator<Item = Result<ReadRecord>> + Send>;

/// 打开一个读段文件：首个非空白字符为 '>' 按 FASTA 解析，'@' 按 FASTQ 解析
pub fn open_reads(path: &Path) -> Result<ReadIter> {
    let mut reader = BufReader::new(File::open(path)?);
    let first = loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(i) => break buf[i],
            None => {
                let n = buf.len();
                reader.consume(n);
            }
        }
    };
    match first {
        b'>' => Ok(Box::new(FastaReader::new(reader))),
        b'@' => Ok(Box::new(FastqReader::new(reader, path.display().to_string()))),
        other => Err(GramError::read_format(
            path.display().to_string(),
            format!("unrecognised reads format (first character '{}')", other.escape_ascii()),
        )),
    }
}

/// 依次读取多个文件，每次产出至多 `batch_size` 条读段
pub struct ReadBatches<'a> {
    paths: std::slice::Iter<'a, std::path::PathBuf>,
    current: Option<ReadIter>,
    batch_size: usize,
}

impl<'a> ReadBatches<'a> {
    pub fn new(paths: &'a [std::path::PathBuf], batch_size: usize) -> Self {
        Self { paths: paths.iter(), current: None, batch_size: batch_size.max(1) }
    }

    pub fn next_batch(&mut self) -> Result<Option<Vec<ReadRecord>>> {
        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            if self.current.is_none() {
                match self.paths.next() {
                    Some(path) => {
                        log::debug!("reading {}", path.display());
                        self.current = Some(open_reads(path)?);
                    }
                    None => break,
                }
            }
            match self.current.as_mut().and_then(|reads| reads.next()) {
                Some(read) => batch.push(read?),
                None => self.current = None,
            }
        }
        Ok(if batch.is_empty() { None } else { Some(batch) })
    }
}
