use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// 索引构建过程的观察者：每完成一个阶段回调一次。
///
/// 构建函数显式接收它，而不是去改写进程级的输出流。
pub trait ConstructionMonitor {
    fn stage(&mut self, name: &str, elapsed: Duration, bytes: usize);
}

/// 什么都不记录
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMonitor;

impl ConstructionMonitor for NullMonitor {
    fn stage(&mut self, _name: &str, _elapsed: Duration, _bytes: usize) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub name: String,
    pub elapsed: Duration,
    pub bytes: usize,
}

/// 记录每个阶段的耗时与结构体占用，构建结束后写到 memory log 文件。
#[derive(Debug, Default, Clone)]
pub struct MemoryLog {
    pub records: Vec<StageRecord>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peak_bytes(&self) -> usize {
        self.records.iter().map(|r| r.bytes).max().unwrap_or(0)
    }

    pub fn total_elapsed(&self) -> Duration {
        self.records.iter().map(|r| r.elapsed).sum()
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(out, "stage\telapsed_ms\tbytes")?;
        for r in &self.records {
            writeln!(out, "{}\t{}\t{}", r.name, r.elapsed.as_millis(), r.bytes)?;
        }
        writeln!(out, "total\t{}\t{}", self.total_elapsed().as_millis(), self.peak_bytes())?;
        Ok(())
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let f = std::fs::File::create(path)?;
        self.write_to(std::io::BufWriter::new(f))
    }
}

impl ConstructionMonitor for MemoryLog {
    fn stage(&mut self, name: &str, elapsed: Duration, bytes: usize) {
        log::debug!("index stage {}: {:?}, {} bytes", name, elapsed, bytes);
        self.records.push(StageRecord { name: name.to_string(), elapsed, bytes });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_log_renders_stages_and_total() {
        let mut log = MemoryLog::new();
        log.stage("sa", Duration::from_millis(3), 64);
        log.stage("bwt", Duration::from_millis(2), 32);
        assert_eq!(log.peak_bytes(), 64);
        assert_eq!(log.total_elapsed(), Duration::from_millis(5));

        let mut buf = Vec::new();
        log.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["stage\telapsed_ms\tbytes", "sa\t3\t64", "bwt\t2\t32", "total\t5\t64"]);
    }
}
