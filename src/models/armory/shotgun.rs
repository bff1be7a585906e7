use crate::fuzzy::{Consequent, FuzzyError, FuzzyModule, Term};
use crate::models::common::Vector2D;

use super::{v, AMMO_STATUS, DESIRABILITY, DIST_TO_TARGET};

pub(super) const OUTLINE: [Vector2D; 8] = [
    v(0.0, 0.0),
    v(0.0, -2.0),
    v(10.0, -2.0),
    v(10.0, 0.0),
    v(0.0, 0.0),
    v(0.0, 2.0),
    v(10.0, 2.0),
    v(10.0, 0.0),
];

pub(super) fn desirability_module() -> Result<FuzzyModule, FuzzyError> {
    let rule = |dist: &str, ammo: &str| {
        Term::and([Term::set(DIST_TO_TARGET, dist), Term::set(AMMO_STATUS, ammo)])
    };

    FuzzyModule::builder()
        .variable(DIST_TO_TARGET)
        .left_shoulder("Target_Close", 0.0, 25.0, 150.0)
        .triangular("Target_Medium", 25.0, 150.0, 300.0)
        .right_shoulder("Target_Far", 150.0, 300.0, 1000.0)
        .variable(DESIRABILITY)
        .right_shoulder("VeryDesirable", 50.0, 75.0, 100.0)
        .triangular("Desirable", 25.0, 50.0, 75.0)
        .left_shoulder("Undesirable", 0.0, 25.0, 50.0)
        .variable(AMMO_STATUS)
        .right_shoulder("Ammo_Loads", 30.0, 60.0, 100.0)
        .triangular("Ammo_Okay", 0.0, 30.0, 60.0)
        .triangular("Ammo_Low", 0.0, 0.0, 30.0)
        // 近距離では弾数に関わらず最有力
        .rule(rule("Target_Close", "Ammo_Loads"), Consequent::set(DESIRABILITY, "VeryDesirable"))
        .rule(rule("Target_Close", "Ammo_Okay"), Consequent::set(DESIRABILITY, "VeryDesirable"))
        .rule(rule("Target_Close", "Ammo_Low"), Consequent::set(DESIRABILITY, "VeryDesirable"))
        .rule(rule("Target_Medium", "Ammo_Loads"), Consequent::set(DESIRABILITY, "VeryDesirable"))
        .rule(rule("Target_Medium", "Ammo_Okay"), Consequent::set(DESIRABILITY, "Desirable"))
        .rule(rule("Target_Medium", "Ammo_Low"), Consequent::set(DESIRABILITY, "Undesirable"))
        .rule(rule("Target_Far", "Ammo_Loads"), Consequent::set(DESIRABILITY, "Desirable"))
        .rule(rule("Target_Far", "Ammo_Okay"), Consequent::set(DESIRABILITY, "Undesirable"))
        .rule(rule("Target_Far", "Ammo_Low"), Consequent::set(DESIRABILITY, "Undesirable"))
        .build()
}
