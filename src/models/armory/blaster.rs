use crate::fuzzy::{Consequent, FuzzyError, FuzzyModule, Term};
use crate::models::common::Vector2D;

use super::{v, DESIRABILITY, DIST_TO_TARGET};

pub(super) const OUTLINE: [Vector2D; 4] = [v(0.0, -1.0), v(10.0, -1.0), v(10.0, 1.0), v(0.0, 1.0)];

/// ブラスター: 弾数無制限なので距離のみで評価する
pub(super) fn desirability_module() -> Result<FuzzyModule, FuzzyError> {
    FuzzyModule::builder()
        .variable(DIST_TO_TARGET)
        .left_shoulder("Target_Close", 0.0, 25.0, 150.0)
        .triangular("Target_Medium", 25.0, 150.0, 300.0)
        .right_shoulder("Target_Far", 150.0, 300.0, 1000.0)
        .variable(DESIRABILITY)
        .right_shoulder("VeryDesirable", 50.0, 75.0, 100.0)
        .triangular("Desirable", 25.0, 50.0, 75.0)
        .left_shoulder("Undesirable", 0.0, 25.0, 50.0)
        .rule(Term::set(DIST_TO_TARGET, "Target_Close"), Consequent::set(DESIRABILITY, "Desirable"))
        .rule(
            Term::set(DIST_TO_TARGET, "Target_Medium"),
            Consequent::very(DESIRABILITY, "Undesirable"),
        )
        .rule(
            Term::set(DIST_TO_TARGET, "Target_Far"),
            Consequent::very(DESIRABILITY, "Undesirable"),
        )
        .build()
}
