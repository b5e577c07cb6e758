/// 编码后的碱基：A=1, C=2, G=3, T=4（0 预留给文本末尾的 $）。
pub type Base = u8;

/// 碱基字母表大小（不含 $）
pub const NUM_BASES: usize = 4;

pub const BASES: [Base; NUM_BASES] = [1, 2, 3, 4];

#[inline]
pub fn to_alphabet(b: u8) -> Option<Base> {
    match b.to_ascii_uppercase() {
        b'A' => Some(1),
        b'C' => Some(2),
        b'G' => Some(3),
        b'T' => Some(4),
        _ => None,
    }
}

#[inline]
pub fn from_alphabet(a: Base) -> u8 {
    match a {
        1 => b'A',
        2 => b'C',
        3 => b'G',
        4 => b'T',
        _ => b'N',
    }
}

/// 编码整条序列；只要出现一个非 ACGT 字符就返回 None。
pub fn encode_seq(seq: &[u8]) -> Option<Vec<Base>> {
    seq.iter().map(|&b| to_alphabet(b)).collect()
}

pub fn decode_seq(bases: &[Base]) -> String {
    bases.iter().map(|&b| from_alphabet(b) as char).collect()
}

/// 编码字母表上的互补：A<->T, C<->G
#[inline]
pub fn complement(base: Base) -> Base {
    match base {
        1..=4 => 5 - base,
        _ => base,
    }
}

pub fn revcomp(bases: &[Base]) -> Vec<Base> {
    bases.iter().rev().map(|&b| complement(b)).collect()
}

/// 按字典序枚举字母表上全部长度为 k 的序列（4^k 个）。
pub fn all_kmers(k: usize) -> Vec<Vec<Base>> {
    let mut out: Vec<Vec<Base>> = vec![Vec::with_capacity(k)];
    for _ in 0..k {
        let mut next = Vec::with_capacity(out.len() * NUM_BASES);
        for prefix in &out {
            for &b in &BASES {
                let mut kmer = prefix.clone();
                kmer.push(b);
                next.push(kmer);
            }
        }
        out = next;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_case_insensitive() {
        assert_eq!(encode_seq(b"acgtACGT"), Some(vec![1, 2, 3, 4, 1, 2, 3, 4]));
    }

    #[test]
    fn encode_rejects_non_acgt() {
        assert_eq!(encode_seq(b"ACNT"), None);
        assert_eq!(to_alphabet(b'5'), None);
    }

    #[test]
    fn revcomp_on_encoded_bases() {
        // AACG -> CGTT
        assert_eq!(revcomp(&[1, 1, 2, 3]), vec![2, 3, 4, 4]);
        assert_eq!(decode_seq(&revcomp(&[1, 1, 2, 3])), "CGTT");
    }

    #[test]
    fn all_kmers_are_sorted_and_complete() {
        let kmers = all_kmers(2);
        assert_eq!(kmers.len(), 16);
        assert_eq!(kmers[0], vec![1, 1]);
        assert_eq!(kmers[15], vec![4, 4]);
        let mut sorted = kmers.clone();
        sorted.sort();
        assert_eq!(kmers, sorted);
        assert_eq!(all_kmers(0), vec![Vec::<Base>::new()]);
    }
}
