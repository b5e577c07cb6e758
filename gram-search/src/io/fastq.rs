use std::io::BufRead;

use crate::error::{GramError, Result};
use crate::io::ReadRecord;

/// 四行一条的 FASTQ 读取器；质量行只检查长度，不保留
pub struct FastqReader<R: BufRead> {
    reader: R,
    source: String,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R, source: impl Into<String>) -> Self {
        Self { reader, source: source.into(), buf: String::new(), line_no: 0 }
    }

    fn read_line(&mut self) -> Result<bool> {
        self.buf.clear();
        let n = self.reader.read_line(&mut self.buf)?;
        self.line_no += 1;
        Ok(n > 0)
    }

    fn error(&self, message: &str) -> GramError {
        GramError::read_format(self.source.clone(), format!("line {}: {}", self.line_no, message))
    }

    pub fn next_record(&mut self) -> Result<Option<ReadRecord>> {
        // 跳过记录之间的空行
        loop {
            if !self.read_line()? {
                return Ok(None);
            }
            if !self.buf.trim().is_empty() {
                break;
            }
        }
        let id = match self.buf.strip_prefix('@') {
            Some(header) => header.split_whitespace().next().unwrap_or("").to_string(),
            None => return Err(self.error("FASTQ header does not start with '@'")),
        };

        if !self.read_line()? {
            return Err(self.error("unexpected end of file after header"));
        }
        let seq = self.buf.trim_end().as_bytes().to_vec();

        if !self.read_line()? || !self.buf.starts_with('+') {
            return Err(self.error("missing '+' separator line"));
        }

        if !self.read_line()? {
            return Err(self.error("missing quality line"));
        }
        if self.buf.trim_end().len() != seq.len() {
            return Err(self.error("sequence and quality lengths differ"));
        }

        Ok(Some(ReadRecord { id, seq }))
    }
}

impl<R: BufRead> Iterator for FastqReader<R> {
    type Item = Result<ReadRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
