use crate::fuzzy::error::FuzzyError;

/// メンバーシップ関数の形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetShape {
    /// 左肩（左側が平坦で右へ下がる）
    LeftShoulder,
    /// 右肩（左から上がり右側が平坦）
    RightShoulder,
    /// 三角形
    Triangular,
}

/// ファジィ集合
///
/// 3つのブレークポイント `(left, peak, right)` で形状を定義します。
/// 代表値はブレークポイントの平均で、生成時に固定され非ファジィ化でのみ使用されます。
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzySet {
    name: String,
    shape: SetShape,
    left: f64,
    peak: f64,
    right: f64,
    representative_value: f64,
}

impl FuzzySet {
    /// 新しいファジィ集合を作成します
    ///
    /// # 引数
    ///
    /// * `name` - 集合名（変数内で一意）
    /// * `shape` - 形状
    /// * `left`, `peak`, `right` - ブレークポイント（非減少であること）
    ///
    /// # 戻り値
    ///
    /// ブレークポイントが有限かつ非減少なら集合、そうでなければ `InvalidBreakpoints`
    pub fn new(
        name: impl Into<String>,
        shape: SetShape,
        left: f64,
        peak: f64,
        right: f64,
    ) -> Result<Self, FuzzyError> {
        let name = name.into();
        let finite = left.is_finite() && peak.is_finite() && right.is_finite();
        if !finite || left > peak || peak > right {
            return Err(FuzzyError::InvalidBreakpoints {
                set: name,
                left,
                peak,
                right,
            });
        }

        Ok(Self {
            name,
            shape,
            left,
            peak,
            right,
            representative_value: (left + peak + right) / 3.0,
        })
    }

    pub fn left_shoulder(
        name: impl Into<String>,
        left: f64,
        peak: f64,
        right: f64,
    ) -> Result<Self, FuzzyError> {
        Self::new(name, SetShape::LeftShoulder, left, peak, right)
    }

    pub fn right_shoulder(
        name: impl Into<String>,
        left: f64,
        peak: f64,
        right: f64,
    ) -> Result<Self, FuzzyError> {
        Self::new(name, SetShape::RightShoulder, left, peak, right)
    }

    pub fn triangular(
        name: impl Into<String>,
        left: f64,
        peak: f64,
        right: f64,
    ) -> Result<Self, FuzzyError> {
        Self::new(name, SetShape::Triangular, left, peak, right)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> SetShape {
        self.shape
    }

    /// ブレークポイント `(left, peak, right)`
    pub fn breakpoints(&self) -> (f64, f64, f64) {
        (self.left, self.peak, self.right)
    }

    /// 非ファジィ化で使う代表値（ブレークポイントの平均）
    pub fn representative_value(&self) -> f64 {
        self.representative_value
    }

    /// 入力値 `x` に対するメンバーシップ度を計算します
    ///
    /// 戻り値は常に [0, 1]。NaN 入力は 0 とします。
    pub fn degree_of_membership(&self, x: f64) -> f64 {
        if x.is_nan() {
            return 0.0;
        }

        let (a, b, c) = (self.left, self.peak, self.right);
        match self.shape {
            SetShape::LeftShoulder => {
                if x <= b {
                    1.0
                } else if x >= c {
                    0.0
                } else {
                    (c - x) / (c - b)
                }
            }
            SetShape::RightShoulder => {
                // c は代表値の計算にのみ使う
                if x >= b {
                    1.0
                } else if x <= a {
                    0.0
                } else {
                    (x - a) / (b - a)
                }
            }
            SetShape::Triangular => {
                // 頂点は退化した辺（a == b や b == c）より優先
                if x == b {
                    1.0
                } else if x <= a || x >= c {
                    0.0
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (c - x) / (c - b)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_left_shoulder_boundaries() {
        let set = FuzzySet::left_shoulder("Close", 0.0, 15.0, 30.0).unwrap();
        assert_eq!(set.degree_of_membership(-100.0), 1.0);
        assert_eq!(set.degree_of_membership(0.0), 1.0);
        assert_eq!(set.degree_of_membership(15.0), 1.0);
        assert!(approx_eq(set.degree_of_membership(22.5), 0.5));
        assert_eq!(set.degree_of_membership(30.0), 0.0);
        assert_eq!(set.degree_of_membership(1000.0), 0.0);
    }

    #[test]
    fn test_right_shoulder_boundaries() {
        let set = FuzzySet::right_shoulder("Far", 150.0, 300.0, 1000.0).unwrap();
        assert_eq!(set.degree_of_membership(0.0), 0.0);
        assert_eq!(set.degree_of_membership(150.0), 0.0);
        assert!(approx_eq(set.degree_of_membership(225.0), 0.5));
        assert_eq!(set.degree_of_membership(300.0), 1.0);
        // 第3ブレークポイントより先も1のまま
        assert_eq!(set.degree_of_membership(5000.0), 1.0);
    }

    #[test]
    fn test_triangular_apex_and_feet() {
        let set = FuzzySet::triangular("Medium", 15.0, 150.0, 300.0).unwrap();
        assert_eq!(set.degree_of_membership(15.0), 0.0);
        assert_eq!(set.degree_of_membership(150.0), 1.0);
        assert_eq!(set.degree_of_membership(300.0), 0.0);
        assert!(approx_eq(set.degree_of_membership(225.0), 0.5));
        assert_eq!(set.degree_of_membership(-1.0), 0.0);
        assert_eq!(set.degree_of_membership(301.0), 0.0);
    }

    #[test]
    fn test_degenerate_triangle_keeps_apex() {
        let forget_it = FuzzySet::triangular("ForgetIt", 0.0, 0.0, 10.0).unwrap();
        assert_eq!(forget_it.degree_of_membership(0.0), 1.0);
        assert!(approx_eq(forget_it.degree_of_membership(5.0), 0.5));
        assert_eq!(forget_it.degree_of_membership(10.0), 0.0);
    }

    #[test]
    fn test_degree_stays_in_unit_interval() {
        let sets = [
            FuzzySet::left_shoulder("l", 0.0, 25.0, 150.0).unwrap(),
            FuzzySet::right_shoulder("r", 75.0, 150.0, 300.0).unwrap(),
            FuzzySet::triangular("t", 10.0, 30.0, 60.0).unwrap(),
            FuzzySet::triangular("p", 5.0, 5.0, 5.0).unwrap(),
        ];
        let mut x = -50.0;
        while x <= 400.0 {
            for set in &sets {
                let d = set.degree_of_membership(x);
                assert!((0.0..=1.0).contains(&d), "{} at {} = {}", set.name(), x, d);
            }
            x += 0.25;
        }
        assert_eq!(sets[0].degree_of_membership(f64::NAN), 0.0);
    }

    #[test]
    fn test_representative_value_is_mean_of_breakpoints() {
        let set = FuzzySet::right_shoulder("VeryDesirable", 50.0, 75.0, 100.0).unwrap();
        assert!(approx_eq(set.representative_value(), 75.0));
        let set = FuzzySet::left_shoulder("Undesirable", 0.0, 25.0, 50.0).unwrap();
        assert!(approx_eq(set.representative_value(), 25.0));
    }

    #[test]
    fn test_rejects_decreasing_breakpoints() {
        let err = FuzzySet::triangular("bad", 10.0, 5.0, 20.0).unwrap_err();
        assert!(matches!(err, FuzzyError::InvalidBreakpoints { .. }));
        assert!(FuzzySet::left_shoulder("nan", 0.0, f64::NAN, 1.0).is_err());
    }
}
