//! # ファジィ推論モジュール
//!
//! 言語変数とルールを所有し、ファジィ化・ルール評価・非ファジィ化を提供します。
//!
//! ## 処理の流れ
//!
//! 1. **ファジィ化** (`fuzzify`): 観測値を各集合のメンバーシップ度に変換し [`Memberships`] を返す
//! 2. **評価** (`evaluate`): 各ルールの前件を評価し、後件集合ごとに最大値で累積した [`Activations`] を返す
//! 3. **非ファジィ化** (`defuzzify`): 出力変数の累積度を1つのスカラー値にまとめる
//!
//! モジュール自体は推論ごとの状態を持たないため、同じ入力には常に同じ結果を返します。
//!
//! ## 使用例
//!
//! ```rust
//! use fuzzsim::fuzzy::{Consequent, DefuzzifyMethod, FuzzyModule, Term};
//!
//! let module = FuzzyModule::builder()
//!     .variable("DistToTarget")
//!     .left_shoulder("Target_Close", 0.0, 15.0, 30.0)
//!     .right_shoulder("Target_Far", 15.0, 30.0, 100.0)
//!     .variable("Desirability")
//!     .right_shoulder("VeryDesirable", 50.0, 75.0, 100.0)
//!     .left_shoulder("Undesirable", 0.0, 25.0, 50.0)
//!     .rule(Term::set("DistToTarget", "Target_Close"), Consequent::set("Desirability", "VeryDesirable"))
//!     .rule(Term::set("DistToTarget", "Target_Far"), Consequent::very("Desirability", "Undesirable"))
//!     .build()?;
//!
//! let score = module.infer(&[("DistToTarget", 0.0)], "Desirability", DefuzzifyMethod::MaxAv)?;
//! assert_eq!(score, 75.0);
//! # Ok::<(), fuzzsim::fuzzy::FuzzyError>(())
//! ```

use std::collections::HashMap;

use crate::fuzzy::{
    context::{Activations, Memberships, SetRef},
    error::FuzzyError,
    rule::{Consequent, Rule},
    set::FuzzySet,
    term::Term,
    variable::LinguisticVariable,
};

/// 非ファジィ化の方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefuzzifyMethod {
    /// 活性集合の代表値を活性度で加重平均（mean of maxima）
    #[default]
    MaxAv,
    /// 出力変数の定義域を `samples` 点でサンプリングした重心
    Centroid { samples: usize },
}

/// ファジィ推論エンジン（ルールベース）
#[derive(Debug, Clone)]
pub struct FuzzyModule {
    variables: Vec<LinguisticVariable>,
    index: HashMap<String, usize>,
    rules: Vec<Rule>,
}

impl FuzzyModule {
    pub fn builder() -> FuzzyModuleBuilder {
        FuzzyModuleBuilder::default()
    }

    pub fn variable_id(&self, name: &str) -> Result<usize, FuzzyError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| FuzzyError::UnknownVariable(name.to_string()))
    }

    pub fn variable(&self, name: &str) -> Result<&LinguisticVariable, FuzzyError> {
        let id = self.variable_id(name)?;
        Ok(&self.variables[id])
    }

    /// 名前参照を [`SetRef`] に解決します
    pub fn set_ref(&self, variable: &str, set: &str) -> Result<SetRef, FuzzyError> {
        let var_id = self.variable_id(variable)?;
        let set_id = self.variables[var_id]
            .set_id(set)
            .ok_or_else(|| FuzzyError::UnknownSet {
                variable: variable.to_string(),
                set: set.to_string(),
            })?;
        Ok(SetRef::new(var_id, set_id))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// 全度が 0 の空のコンテキスト
    pub fn memberships(&self) -> Memberships {
        Memberships::zeroed(self.variables.iter().map(LinguisticVariable::len))
    }

    /// 変数1つをファジィ化し、その変数の度をコンテキストに上書きします
    pub fn fuzzify_into(
        &self,
        memberships: &mut Memberships,
        variable: &str,
        value: f64,
    ) -> Result<(), FuzzyError> {
        let id = self.variable_id(variable)?;
        memberships.replace_variable(id, self.variables[id].fuzzify(value));
        Ok(())
    }

    /// 複数の観測値をファジィ化します
    ///
    /// # 引数
    ///
    /// * `inputs` - (変数名, 観測値) の組。指定されない変数の度は 0 のまま
    ///
    /// # 戻り値
    ///
    /// ルール評価に渡すメンバーシップ度のコンテキスト
    pub fn fuzzify(&self, inputs: &[(&str, f64)]) -> Result<Memberships, FuzzyError> {
        let mut memberships = self.memberships();
        for (variable, value) in inputs {
            self.fuzzify_into(&mut memberships, variable, *value)?;
        }
        Ok(memberships)
    }

    /// 全ルールを評価し、後件集合ごとの累積度（最大値）を返します
    ///
    /// 発火するルールがない集合の累積度は 0 です。
    pub fn evaluate(&self, memberships: &Memberships) -> Activations {
        let mut activations =
            Activations::zeroed(self.variables.iter().map(LinguisticVariable::len));
        for rule in &self.rules {
            activations.accumulate(rule.consequent(), rule.activation(memberships));
        }
        activations
    }

    /// 出力変数の累積度を1つの値にまとめます
    ///
    /// 活性化した集合が1つもない場合は 0 を返します（NaN にはならない）。
    pub fn defuzzify(
        &self,
        output: &str,
        activations: &Activations,
        method: DefuzzifyMethod,
    ) -> Result<f64, FuzzyError> {
        let id = self.variable_id(output)?;
        let variable = &self.variables[id];
        let degrees = activations.variable(id);

        let value = match method {
            DefuzzifyMethod::MaxAv => {
                let (weighted, total) = variable
                    .sets()
                    .iter()
                    .zip(degrees)
                    .filter(|(_, d)| **d > 0.0)
                    .fold((0.0, 0.0), |(w, t), (set, d)| {
                        (w + set.representative_value() * d, t + d)
                    });

                if total > 0.0 { weighted / total } else { 0.0 }
            }
            DefuzzifyMethod::Centroid { samples } => centroid(variable, degrees, samples),
        };

        Ok(value)
    }

    /// ファジィ化 → 評価 → 非ファジィ化をまとめて実行します
    pub fn infer(
        &self,
        inputs: &[(&str, f64)],
        output: &str,
        method: DefuzzifyMethod,
    ) -> Result<f64, FuzzyError> {
        let memberships = self.fuzzify(inputs)?;
        let activations = self.evaluate(&memberships);
        self.defuzzify(output, &activations, method)
    }

    /// 名前で入力集合の度を読み出します（デバッグ表示用）
    pub fn membership(&self, memberships: &Memberships, variable: &str, set: &str) -> Option<f64> {
        self.set_ref(variable, set).ok().map(|r| memberships.get(r))
    }

    /// 名前で後件集合の累積度を読み出します（デバッグ表示用）
    pub fn activation(&self, activations: &Activations, variable: &str, set: &str) -> Option<f64> {
        self.set_ref(variable, set).ok().map(|r| activations.get(r))
    }
}

fn centroid(variable: &LinguisticVariable, degrees: &[f64], samples: usize) -> f64 {
    let Some((min, max)) = variable.range() else {
        return 0.0;
    };
    if samples == 0 {
        return 0.0;
    }

    let step = (max - min) / samples as f64;
    let mut total_area = 0.0;
    let mut moment = 0.0;

    for i in 1..=samples {
        let x = min + step * i as f64;
        for (set, activation) in variable.sets().iter().zip(degrees) {
            let contribution = set.degree_of_membership(x).min(*activation);
            total_area += contribution;
            moment += x * contribution;
        }
    }

    if total_area > 0.0 { moment / total_area } else { 0.0 }
}

/// [`FuzzyModule`] のビルダー
///
/// `variable` で宣言した直近の変数に集合を追加していきます。
/// 途中で起きた最初のエラーを保持し、`build` で返します。
#[derive(Debug, Default)]
pub struct FuzzyModuleBuilder {
    variables: Vec<LinguisticVariable>,
    index: HashMap<String, usize>,
    rules: Vec<(Term, Consequent)>,
    error: Option<FuzzyError>,
}

impl FuzzyModuleBuilder {
    pub fn variable(mut self, name: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        if self.index.contains_key(name) {
            self.error = Some(FuzzyError::DuplicateVariable(name.to_string()));
            return self;
        }
        self.index.insert(name.to_string(), self.variables.len());
        self.variables.push(LinguisticVariable::new(name));
        self
    }

    pub fn left_shoulder(self, name: &str, left: f64, peak: f64, right: f64) -> Self {
        self.add_set(name, FuzzySet::left_shoulder(name, left, peak, right))
    }

    pub fn right_shoulder(self, name: &str, left: f64, peak: f64, right: f64) -> Self {
        self.add_set(name, FuzzySet::right_shoulder(name, left, peak, right))
    }

    pub fn triangular(self, name: &str, left: f64, peak: f64, right: f64) -> Self {
        self.add_set(name, FuzzySet::triangular(name, left, peak, right))
    }

    pub fn rule(mut self, antecedent: Term, consequent: Consequent) -> Self {
        self.rules.push((antecedent, consequent));
        self
    }

    fn add_set(mut self, name: &str, set: Result<FuzzySet, FuzzyError>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let result = match (self.variables.last_mut(), set) {
            (None, _) => Err(FuzzyError::SetWithoutVariable(name.to_string())),
            (Some(_), Err(e)) => Err(e),
            (Some(variable), Ok(set)) => variable.add_set(set).map(|_| ()),
        };
        if let Err(e) = result {
            self.error = Some(e);
        }
        self
    }

    /// 全ルールの名前参照を解決してモジュールを構築します
    pub fn build(self) -> Result<FuzzyModule, FuzzyError> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let mut module = FuzzyModule {
            variables: self.variables,
            index: self.index,
            rules: Vec::with_capacity(self.rules.len()),
        };

        let mut rules = Vec::with_capacity(self.rules.len());
        for (term, consequent) in &self.rules {
            let antecedent = term.resolve(&|v: &str, s: &str| module.set_ref(v, s))?;
            let target = module.set_ref(&consequent.variable, &consequent.set)?;
            rules.push(Rule::new(antecedent, target, consequent.hedge));
        }
        module.rules = rules;

        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn knife_table() -> FuzzyModule {
        FuzzyModule::builder()
            .variable("DistToTarget")
            .left_shoulder("Target_Close", 0.0, 15.0, 30.0)
            .triangular("Target_Medium", 15.0, 150.0, 300.0)
            .right_shoulder("Target_Far", 150.0, 300.0, 1000.0)
            .variable("Desirability")
            .right_shoulder("VeryDesirable", 50.0, 75.0, 100.0)
            .triangular("Desirable", 25.0, 50.0, 75.0)
            .left_shoulder("Undesirable", 0.0, 25.0, 50.0)
            .rule(
                Term::set("DistToTarget", "Target_Close"),
                Consequent::set("Desirability", "VeryDesirable"),
            )
            .rule(
                Term::set("DistToTarget", "Target_Medium"),
                Consequent::very("Desirability", "Undesirable"),
            )
            .rule(
                Term::set("DistToTarget", "Target_Far"),
                Consequent::very("Desirability", "Undesirable"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_single_full_rule_yields_representative_value() {
        let module = knife_table();
        let score = module
            .infer(&[("DistToTarget", 0.0)], "Desirability", DefuzzifyMethod::MaxAv)
            .unwrap();
        assert!(approx_eq(score, 75.0));
    }

    #[test]
    fn test_hedged_rule_at_triangle_apex() {
        let module = knife_table();
        let m = module.fuzzify(&[("DistToTarget", 150.0)]).unwrap();
        assert_eq!(module.membership(&m, "DistToTarget", "Target_Medium"), Some(1.0));
        assert_eq!(module.membership(&m, "DistToTarget", "Target_Far"), Some(0.0));

        let a = module.evaluate(&m);
        assert_eq!(module.activation(&a, "Desirability", "Undesirable"), Some(1.0));
        let score = module.defuzzify("Desirability", &a, DefuzzifyMethod::MaxAv).unwrap();
        assert!(approx_eq(score, 25.0));
    }

    #[test]
    fn test_blend_between_two_consequents() {
        let module = knife_table();
        // Close = 0.5, Medium = 7.5/135
        let m = module.fuzzify(&[("DistToTarget", 22.5)]).unwrap();
        let a = module.evaluate(&m);
        let close = 0.5;
        let medium = (7.5_f64 / 135.0).powi(2);
        let expected = (75.0 * close + 25.0 * medium) / (close + medium);
        let score = module.defuzzify("Desirability", &a, DefuzzifyMethod::MaxAv).unwrap();
        assert!(approx_eq(score, expected));
    }

    #[test]
    fn test_no_activation_defuzzifies_to_zero() {
        let module = knife_table();
        // 入力を与えなければどのルールも発火しない
        let a = module.evaluate(&module.memberships());
        assert_eq!(module.defuzzify("Desirability", &a, DefuzzifyMethod::MaxAv).unwrap(), 0.0);
        assert_eq!(
            module
                .defuzzify("Desirability", &a, DefuzzifyMethod::Centroid { samples: 20 })
                .unwrap(),
            0.0
        );
    }

    #[test]
    fn test_evaluate_takes_max_over_rules_with_same_consequent() {
        let module = FuzzyModule::builder()
            .variable("x")
            .left_shoulder("low", 0.0, 0.0, 10.0)
            .right_shoulder("high", 0.0, 10.0, 10.0)
            .variable("out")
            .triangular("only", 0.0, 5.0, 10.0)
            .rule(Term::set("x", "low"), Consequent::set("out", "only"))
            .rule(Term::set("x", "high"), Consequent::set("out", "only"))
            .build()
            .unwrap();
        let a = module.evaluate(&module.fuzzify(&[("x", 3.0)]).unwrap());
        assert!(approx_eq(module.activation(&a, "out", "only").unwrap(), 0.7));
    }

    #[test]
    fn test_centroid_of_symmetric_set() {
        let module = FuzzyModule::builder()
            .variable("x")
            .left_shoulder("any", 0.0, 100.0, 100.0)
            .variable("out")
            .triangular("mid", 0.0, 50.0, 100.0)
            .rule(Term::set("x", "any"), Consequent::set("out", "mid"))
            .build()
            .unwrap();
        let score = module
            .infer(&[("x", 1.0)], "out", DefuzzifyMethod::Centroid { samples: 100 })
            .unwrap();
        assert!((score - 50.0).abs() < 1.0);
    }

    #[test]
    fn test_unknown_names_fail_at_build() {
        let err = FuzzyModule::builder()
            .variable("x")
            .left_shoulder("a", 0.0, 1.0, 2.0)
            .variable("out")
            .left_shoulder("b", 0.0, 1.0, 2.0)
            .rule(Term::set("x", "missing"), Consequent::set("out", "b"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            FuzzyError::UnknownSet {
                variable: "x".to_string(),
                set: "missing".to_string()
            }
        );

        let err = FuzzyModule::builder()
            .variable("x")
            .left_shoulder("a", 0.0, 1.0, 2.0)
            .rule(Term::set("x", "a"), Consequent::set("nowhere", "b"))
            .build()
            .unwrap_err();
        assert_eq!(err, FuzzyError::UnknownVariable("nowhere".to_string()));
    }

    #[test]
    fn test_builder_reports_first_structural_error() {
        let err = FuzzyModule::builder()
            .left_shoulder("orphan", 0.0, 1.0, 2.0)
            .variable("x")
            .build()
            .unwrap_err();
        assert_eq!(err, FuzzyError::SetWithoutVariable("orphan".to_string()));

        let err = FuzzyModule::builder()
            .variable("x")
            .variable("x")
            .build()
            .unwrap_err();
        assert_eq!(err, FuzzyError::DuplicateVariable("x".to_string()));

        let err = FuzzyModule::builder()
            .variable("x")
            .triangular("bad", 3.0, 2.0, 1.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, FuzzyError::InvalidBreakpoints { .. }));
    }

    #[test]
    fn test_fuzzify_unknown_variable_is_error() {
        let module = knife_table();
        assert_eq!(
            module.fuzzify(&[("Speed", 1.0)]).unwrap_err(),
            FuzzyError::UnknownVariable("Speed".to_string())
        );
        let empty = module.evaluate(&module.memberships());
        assert!(module.defuzzify("Nope", &empty, DefuzzifyMethod::MaxAv).is_err());
    }
}
