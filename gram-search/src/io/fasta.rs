use std::io::BufRead;

use crate::error::Result;
use crate::io::ReadRecord;

/// 多行 FASTA 读取器：序列行中的空白被去掉，大小写保持原样
pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    peek_id: Option<String>,
}

fn header_id(line: &str) -> String {
    line[1..].split_whitespace().next().unwrap_or("").to_string()
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: String::new(), done: false, peek_id: None }
    }

    pub fn next_record(&mut self) -> Result<Option<ReadRecord>> {
        if self.done {
            return Ok(None);
        }

        let id = match self.peek_id.take() {
            Some(id) => id,
            None => loop {
                self.buf.clear();
                if self.reader.read_line(&mut self.buf)? == 0 {
                    self.done = true;
                    return Ok(None);
                }
                if self.buf.starts_with('>') {
                    break header_id(&self.buf);
                }
            },
        };

        let mut seq: Vec<u8> = Vec::new();
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                self.done = true;
                break;
            }
            if self.buf.starts_with('>') {
                self.peek_id = Some(header_id(&self.buf));
                break;
            }
            seq.extend(self.buf.bytes().filter(|b| !b.is_ascii_whitespace()));
        }

        Ok(Some(ReadRecord { id, seq }))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<ReadRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
