//! 演示如何在 library 模式下使用 gram-search 在 PRG 上搜索读段。
//!
//! 运行方式：
//! ```bash
//! cargo run --example search_prg
//! ```

use gram_search::kmers::index_kmers;
use gram_search::prg::PrgInfo;
use gram_search::quasimap::{search_read, AlleleSumCoverage};
use gram_search::search::{search_pattern, Direction, SearchStates};
use gram_search::util::dna;

fn encode(seq: &[u8]) -> Vec<u64> {
    dna::encode_seq(seq).unwrap_or_default().into_iter().map(u64::from).collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 构建 PRG：两个位点，第一个 3 个等位基因，第二个 2 个
    let raw = "ac5gt6cc6a5tg7c8g7ttgca";
    let prg = PrgInfo::from_raw(raw, Direction::Backward)?;
    println!("PRG: {}", raw);
    println!("索引文本长度: {}（含末尾 $），最大标记: {}", prg.fm_index.size(), prg.max_alphabet_num);

    // 2. 完整搜索：跨越两个位点
    let pattern = b"ACGTTGCTT";
    let outcome = search_pattern(&encode(pattern), SearchStates::new(), &prg);
    println!("\n完整搜索 '{}': {} 条路径", String::from_utf8_lossy(pattern), outcome.states.len());
    for state in &outcome.states {
        println!("  SA {:?} 经过 {:?}", state.sa_interval, state.variant_site_path);
    }

    // 3. 预先搜索所有 4-mer，再从缓存出发
    let kmers = index_kmers(&dna::all_kmers(4), 4, &prg);
    let stats = kmers.stats();
    println!(
        "\nk-mer 缓存: {} 个 4-mer（{} 个跨越位点，{} 个无匹配）",
        stats.total_kmers, stats.variant_kmers, stats.unmatched_kmers
    );
    let cached = search_read(&encode(pattern), &kmers, &prg);
    println!("缓存搜索结果与完整搜索一致: {}", cached.states == outcome.states);

    // 4. 覆盖度
    let mut coverage = AlleleSumCoverage::from_mask(&prg.mask);
    for read in [&b"ACGTTGCTT"[..], b"ACCCTGGTT", b"CATGCTT", b"TTTTTTT"] {
        let outcome = search_read(&encode(read), &kmers, &prg);
        if outcome.is_match() {
            coverage.record_read(&outcome.states);
        }
        println!("读段 {:<10} 匹配: {}", String::from_utf8_lossy(read), outcome.is_match());
    }
    let mut out = Vec::new();
    coverage.write_to(&mut out)?;
    print!("\n等位基因覆盖度:\n{}", String::from_utf8_lossy(&out));
    Ok(())
}
