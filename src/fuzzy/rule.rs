use crate::fuzzy::{
    context::{Memberships, SetRef},
    hedge::Hedge,
    term::Antecedent,
};

/// ルール記述用の後件（名前で集合を参照、ヘッジは任意）
#[derive(Debug, Clone, PartialEq)]
pub struct Consequent {
    pub variable: String,
    pub set: String,
    pub hedge: Option<Hedge>,
}

impl Consequent {
    pub fn set(variable: impl Into<String>, set: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            set: set.into(),
            hedge: None,
        }
    }

    pub fn very(variable: impl Into<String>, set: impl Into<String>) -> Self {
        Self {
            hedge: Some(Hedge::Very),
            ..Self::set(variable, set)
        }
    }

    pub fn fairly(variable: impl Into<String>, set: impl Into<String>) -> Self {
        Self {
            hedge: Some(Hedge::Fairly),
            ..Self::set(variable, set)
        }
    }
}

/// 解決済みルール（構築後は不変）
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    antecedent: Antecedent,
    consequent: SetRef,
    hedge: Option<Hedge>,
}

impl Rule {
    pub fn new(antecedent: Antecedent, consequent: SetRef, hedge: Option<Hedge>) -> Self {
        Self {
            antecedent,
            consequent,
            hedge,
        }
    }

    pub fn consequent(&self) -> SetRef {
        self.consequent
    }

    /// ルールの活性度（後件にヘッジがあれば適用済み）
    pub fn activation(&self, memberships: &Memberships) -> f64 {
        let degree = self.antecedent.evaluate(memberships);
        match self.hedge {
            Some(hedge) => hedge.apply(degree),
            None => degree,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consequent_hedge_applied_to_activation() {
        let mut m = Memberships::zeroed([1, 1]);
        m.replace_variable(0, vec![0.6]);

        let plain = Rule::new(Antecedent::Set(SetRef::new(0, 0)), SetRef::new(1, 0), None);
        let very = Rule::new(
            Antecedent::Set(SetRef::new(0, 0)),
            SetRef::new(1, 0),
            Some(Hedge::Very),
        );

        assert_eq!(plain.activation(&m), 0.6);
        assert!((very.activation(&m) - 0.36).abs() < 1e-12);
        assert_eq!(very.consequent(), SetRef::new(1, 0));
    }
}
