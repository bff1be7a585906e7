use crate::fuzzy::{
    context::{Memberships, SetRef},
    error::FuzzyError,
    hedge::Hedge,
};

/// ルール記述用の前件式（名前で集合を参照）
///
/// ルールテーブルはこの形で記述し、モジュール構築時に [`Antecedent`] へ解決されます。
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Set { variable: String, set: String },
    And(Vec<Term>),
    Or(Vec<Term>),
    Hedged(Hedge, Box<Term>),
}

impl Term {
    pub fn set(variable: impl Into<String>, set: impl Into<String>) -> Self {
        Term::Set {
            variable: variable.into(),
            set: set.into(),
        }
    }

    pub fn and(terms: impl IntoIterator<Item = Term>) -> Self {
        Term::And(terms.into_iter().collect())
    }

    pub fn or(terms: impl IntoIterator<Item = Term>) -> Self {
        Term::Or(terms.into_iter().collect())
    }

    pub fn very(term: Term) -> Self {
        Term::Hedged(Hedge::Very, Box::new(term))
    }

    pub fn fairly(term: Term) -> Self {
        Term::Hedged(Hedge::Fairly, Box::new(term))
    }

    /// 名前参照を添字参照に解決します
    ///
    /// # 引数
    ///
    /// * `lookup` - (変数名, 集合名) から [`SetRef`] を引く関数
    pub fn resolve<F>(&self, lookup: &F) -> Result<Antecedent, FuzzyError>
    where
        F: Fn(&str, &str) -> Result<SetRef, FuzzyError>,
    {
        match self {
            Term::Set { variable, set } => lookup(variable, set).map(Antecedent::Set),
            Term::And(children) => {
                if children.is_empty() {
                    return Err(FuzzyError::EmptyOperator("AND"));
                }
                children
                    .iter()
                    .map(|c| c.resolve(lookup))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Antecedent::And)
            }
            Term::Or(children) => {
                if children.is_empty() {
                    return Err(FuzzyError::EmptyOperator("OR"));
                }
                children
                    .iter()
                    .map(|c| c.resolve(lookup))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Antecedent::Or)
            }
            Term::Hedged(hedge, child) => {
                Ok(Antecedent::Hedged(*hedge, Box::new(child.resolve(lookup)?)))
            }
        }
    }
}

/// 解決済みの前件式
///
/// 状態を持たない式木で、与えられた [`Memberships`] から下から上へ評価されます。
#[derive(Debug, Clone, PartialEq)]
pub enum Antecedent {
    Set(SetRef),
    /// 子の最小値
    And(Vec<Antecedent>),
    /// 子の最大値
    Or(Vec<Antecedent>),
    Hedged(Hedge, Box<Antecedent>),
}

impl Antecedent {
    pub fn evaluate(&self, memberships: &Memberships) -> f64 {
        match self {
            Antecedent::Set(r) => memberships.get(*r),
            Antecedent::And(children) => children
                .iter()
                .map(|c| c.evaluate(memberships))
                .fold(f64::INFINITY, f64::min),
            Antecedent::Or(children) => children
                .iter()
                .map(|c| c.evaluate(memberships))
                .fold(0.0, f64::max),
            Antecedent::Hedged(hedge, child) => hedge.apply(child.evaluate(memberships)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 変数0: 集合 a, b / 変数1: 集合 c
    fn lookup(variable: &str, set: &str) -> Result<SetRef, FuzzyError> {
        match (variable, set) {
            ("x", "a") => Ok(SetRef::new(0, 0)),
            ("x", "b") => Ok(SetRef::new(0, 1)),
            ("y", "c") => Ok(SetRef::new(1, 0)),
            ("x", _) | ("y", _) => Err(FuzzyError::UnknownSet {
                variable: variable.to_string(),
                set: set.to_string(),
            }),
            _ => Err(FuzzyError::UnknownVariable(variable.to_string())),
        }
    }

    fn memberships(a: f64, b: f64, c: f64) -> Memberships {
        let mut m = Memberships::zeroed([2, 1]);
        m.replace_variable(0, vec![a, b]);
        m.replace_variable(1, vec![c]);
        m
    }

    #[test]
    fn test_and_is_min_or_is_max() {
        let and = Term::and([Term::set("x", "a"), Term::set("y", "c")]).resolve(&lookup).unwrap();
        let or = Term::or([Term::set("x", "a"), Term::set("y", "c")]).resolve(&lookup).unwrap();
        let m = memberships(0.3, 0.0, 0.8);
        assert_eq!(and.evaluate(&m), 0.3);
        assert_eq!(or.evaluate(&m), 0.8);
    }

    #[test]
    fn test_nested_hedged_expression() {
        let term = Term::or([
            Term::very(Term::set("x", "a")),
            Term::and([Term::set("x", "b"), Term::fairly(Term::set("y", "c"))]),
        ]);
        let ant = term.resolve(&lookup).unwrap();
        // max(0.5², min(0.2, √0.64)) = max(0.25, 0.2)
        assert!((ant.evaluate(&memberships(0.5, 0.2, 0.64)) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_and_monotone_in_weakest_child() {
        let ant = Term::and([Term::set("x", "a"), Term::set("x", "b"), Term::set("y", "c")])
            .resolve(&lookup)
            .unwrap();
        let mut previous = 0.0;
        let mut weakest = 0.0;
        while weakest <= 1.0 {
            let value = ant.evaluate(&memberships(weakest, 0.7, 0.9));
            assert!(value >= previous);
            previous = value;
            weakest += 0.05;
        }
    }

    #[test]
    fn test_resolve_reports_unknown_names() {
        assert_eq!(
            Term::set("z", "a").resolve(&lookup).unwrap_err(),
            FuzzyError::UnknownVariable("z".to_string())
        );
        assert!(matches!(
            Term::and([Term::set("x", "a"), Term::set("x", "nope")]).resolve(&lookup),
            Err(FuzzyError::UnknownSet { .. })
        ));
    }

    #[test]
    fn test_empty_operator_rejected() {
        assert_eq!(Term::and([]).resolve(&lookup).unwrap_err(), FuzzyError::EmptyOperator("AND"));
        assert_eq!(Term::or([]).resolve(&lookup).unwrap_err(), FuzzyError::EmptyOperator("OR"));
    }
}
