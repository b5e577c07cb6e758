use serde::{Deserialize, Serialize};

/// 搜索方向。
///
/// 两个方向共用同一套搜索逻辑：反向搜索在原文本的索引上从模式末尾开始消费，
/// 正向搜索在反转文本的索引上从模式开头开始消费。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Backward,
    Forward,
}

impl Direction {
    /// 第 `step` 个被消费的符号在模式中的下标
    #[inline]
    pub fn position(self, pattern_len: usize, step: usize) -> usize {
        match self {
            Direction::Backward => pattern_len - 1 - step,
            Direction::Forward => step,
        }
    }

    /// 按消费顺序排列的模式符号
    pub fn consume_order(self, pattern: &[u64]) -> Box<dyn Iterator<Item = (usize, u64)> + '_> {
        match self {
            Direction::Backward => Box::new(pattern.iter().copied().enumerate().rev()),
            Direction::Forward => Box::new(pattern.iter().copied().enumerate()),
        }
    }

    /// 索引要建在哪种朝向的文本上
    pub fn orient_text(self, symbols: &[u64]) -> Vec<u64> {
        match self {
            Direction::Backward => symbols.to_vec(),
            Direction::Forward => symbols.iter().rev().copied().collect(),
        }
    }

    /// 把模式切成 (最先被消费的 k 个符号, 其余符号)
    pub fn split_seed(self, pattern: &[u64], k: usize) -> Option<(&[u64], &[u64])> {
        if k > pattern.len() {
            return None;
        }
        Some(match self {
            Direction::Backward => {
                let (rest, seed) = pattern.split_at(pattern.len() - k);
                (seed, rest)
            }
            Direction::Forward => pattern.split_at(k),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_order_by_direction() {
        let pattern = [1u64, 2, 3];
        let bwd: Vec<(usize, u64)> = Direction::Backward.consume_order(&pattern).collect();
        assert_eq!(bwd, vec![(2, 3), (1, 2), (0, 1)]);
        let fwd: Vec<(usize, u64)> = Direction::Forward.consume_order(&pattern).collect();
        assert_eq!(fwd, vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(Direction::Backward.position(3, 0), 2);
        assert_eq!(Direction::Forward.position(3, 0), 0);
    }

    #[test]
    fn split_seed_takes_the_first_consumed_end() {
        let pattern = [1u64, 2, 3, 4, 1];
        assert_eq!(Direction::Backward.split_seed(&pattern, 2), Some((&[4u64, 1][..], &[1u64, 2, 3][..])));
        assert_eq!(Direction::Forward.split_seed(&pattern, 2), Some((&[1u64, 2][..], &[3u64, 4, 1][..])));
        assert_eq!(Direction::Forward.split_seed(&pattern, 6), None);
    }
}
