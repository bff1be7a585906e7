/// メンバーシップ度に掛ける修飾子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hedge {
    /// 強調（度の二乗）
    Very,
    /// 緩和（度の平方根）
    Fairly,
}

impl Hedge {
    pub fn apply(self, degree: f64) -> f64 {
        match self {
            Hedge::Very => degree * degree,
            Hedge::Fairly => degree.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_very_squares() {
        assert_eq!(Hedge::Very.apply(1.0), 1.0);
        assert_eq!(Hedge::Very.apply(0.5), 0.25);
        assert_eq!(Hedge::Very.apply(0.0), 0.0);
    }

    #[test]
    fn test_fairly_takes_root() {
        assert_eq!(Hedge::Fairly.apply(0.25), 0.5);
        assert_eq!(Hedge::Fairly.apply(1.0), 1.0);
    }
}
