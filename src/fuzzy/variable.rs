use std::collections::HashMap;

use crate::fuzzy::{error::FuzzyError, set::FuzzySet};

/// 言語変数
///
/// 1つの意味軸（例: 目標までの距離）上のファジィ集合を名前で保持します。
/// 最後の入力値に対する度は保持せず、`fuzzify` の戻り値として返します。
#[derive(Debug, Clone)]
pub struct LinguisticVariable {
    name: String,
    sets: Vec<FuzzySet>,
    index: HashMap<String, usize>,
}

impl LinguisticVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sets: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 集合を追加し、その添字を返します
    ///
    /// 同名の集合が既にある場合は `DuplicateSet` を返します。
    pub fn add_set(&mut self, set: FuzzySet) -> Result<usize, FuzzyError> {
        if self.index.contains_key(set.name()) {
            return Err(FuzzyError::DuplicateSet {
                variable: self.name.clone(),
                set: set.name().to_string(),
            });
        }

        let id = self.sets.len();
        self.index.insert(set.name().to_string(), id);
        self.sets.push(set);
        Ok(id)
    }

    pub fn set_id(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn set(&self, id: usize) -> Option<&FuzzySet> {
        self.sets.get(id)
    }

    pub fn sets(&self) -> &[FuzzySet] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// 全集合の `x` に対するメンバーシップ度を集合の添字順で返します
    pub fn fuzzify(&self, x: f64) -> Vec<f64> {
        self.sets.iter().map(|s| s.degree_of_membership(x)).collect()
    }

    /// 変数の定義域（全集合の左端の最小値、右端の最大値）
    pub fn range(&self) -> Option<(f64, f64)> {
        self.sets.iter().fold(None, |acc, set| {
            let (l, _, r) = set.breakpoints();
            Some(match acc {
                None => (l, r),
                Some((min, max)) => (f64::min(min, l), f64::max(max, r)),
            })
        })
    }
}
