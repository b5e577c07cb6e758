/// 根据后缀数组构建 BWT：BWT[i] 为后缀 SA[i] 之前的那个符号（循环意义下）。
pub fn build_bwt(text: &[u64], sa: &[u64]) -> Vec<u64> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    sa.iter()
        .map(|&p| {
            let i = p as usize;
            if i == 0 { text[n - 1] } else { text[i - 1] }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::sa::build_sa;

    #[test]
    fn bwt_of_plain_prg() {
        // gcgctggagtgctgt$
        let text = [3u64, 2, 3, 2, 4, 3, 3, 1, 3, 4, 3, 2, 4, 3, 4, 0];
        let sa = build_sa(&text);
        let bwt = build_bwt(&text, &sa);
        assert_eq!(bwt, vec![4, 3, 3, 3, 3, 3, 0, 2, 4, 4, 4, 1, 3, 3, 2, 2]);
    }
}
