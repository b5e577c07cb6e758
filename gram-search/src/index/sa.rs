/// 构建后缀数组（基于倍增法，O(n log² n)）。
/// 输入为整数字母表上的文本：0 为末尾的 $，1..=4 为碱基，>=5 为位点标记。
/// 文本末尾必须恰好有一个 0，这样任意两个后缀都能在 $ 之前区分开。
/// 初始 rank 是符号在文本字母表中的名次，与标记的数值大小无关。
pub fn build_sa(text: &[u64]) -> Vec<u64> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    let mut alphabet = text.to_vec();
    alphabet.sort_unstable();
    alphabet.dedup();
    let mut sa: Vec<usize> = (0..n).collect();
    let mut rank: Vec<i64> = text.iter().map(|s| alphabet.partition_point(|a| a < s) as i64).collect();
    let mut tmp: Vec<i64> = vec![0; n];

    let mut k = 1usize;
    loop {
        let key = |i: usize, rank: &[i64]| (rank[i], if i + k < n { rank[i + k] } else { -1 });
        sa.sort_unstable_by(|&i, &j| key(i, &rank).cmp(&key(j, &rank)));

        tmp[sa[0]] = 0;
        for i in 1..n {
            let prev = key(sa[i - 1], &rank);
            let curr = key(sa[i], &rank);
            tmp[sa[i]] = tmp[sa[i - 1]] + i64::from(curr != prev);
        }

        rank.copy_from_slice(&tmp);
        if rank[sa[n - 1]] as usize == n - 1 || k >= n {
            break;
        }
        k <<= 1;
    }

    sa.into_iter().map(|x| x as u64).collect()
}
