//! 推論1回分の明示的なコンテキスト
//!
//! ファジィ化の結果（`Memberships`）とルール評価の結果（`Activations`）を
//! モジュール内部に保持せず値として受け渡すことで、
//! ファジィ化 → 評価 → 非ファジィ化の各段を純粋関数として扱えるようにします。

/// モジュール内の集合を指す解決済み参照（変数の添字, 集合の添字）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetRef {
    pub variable: usize,
    pub set: usize,
}

impl SetRef {
    pub fn new(variable: usize, set: usize) -> Self {
        Self { variable, set }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DegreeTable {
    degrees: Vec<Vec<f64>>,
}

impl DegreeTable {
    fn zeroed(shape: impl IntoIterator<Item = usize>) -> Self {
        Self {
            degrees: shape.into_iter().map(|n| vec![0.0; n]).collect(),
        }
    }

    fn get(&self, r: SetRef) -> f64 {
        self.degrees
            .get(r.variable)
            .and_then(|sets| sets.get(r.set))
            .copied()
            .unwrap_or(0.0)
    }

    fn variable(&self, variable: usize) -> &[f64] {
        self.degrees.get(variable).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// 各入力集合のメンバーシップ度（ファジィ化の出力）
///
/// ファジィ化されていない変数の度はすべて 0 です。
#[derive(Debug, Clone, PartialEq)]
pub struct Memberships {
    table: DegreeTable,
}

impl Memberships {
    pub(crate) fn zeroed(shape: impl IntoIterator<Item = usize>) -> Self {
        Self {
            table: DegreeTable::zeroed(shape),
        }
    }

    pub fn get(&self, r: SetRef) -> f64 {
        self.table.get(r)
    }

    pub fn variable(&self, variable: usize) -> &[f64] {
        self.table.variable(variable)
    }

    /// 変数1つ分の度を上書きします
    pub(crate) fn replace_variable(&mut self, variable: usize, degrees: Vec<f64>) {
        if let Some(slot) = self.table.degrees.get_mut(variable) {
            *slot = degrees;
        }
    }
}

/// 各後件集合の累積活性度（ルール評価の出力）
#[derive(Debug, Clone, PartialEq)]
pub struct Activations {
    table: DegreeTable,
}

impl Activations {
    pub(crate) fn zeroed(shape: impl IntoIterator<Item = usize>) -> Self {
        Self {
            table: DegreeTable::zeroed(shape),
        }
    }

    pub fn get(&self, r: SetRef) -> f64 {
        self.table.get(r)
    }

    pub fn variable(&self, variable: usize) -> &[f64] {
        self.table.variable(variable)
    }

    /// 最大値で累積（ファジィOR）
    pub(crate) fn accumulate(&mut self, r: SetRef, degree: f64) {
        if let Some(slot) = self
            .table
            .degrees
            .get_mut(r.variable)
            .and_then(|sets| sets.get_mut(r.set))
        {
            *slot = slot.max(degree);
        }
    }
}
