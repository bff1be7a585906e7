use crate::fuzzy::{Consequent, FuzzyError, FuzzyModule, Term};
use crate::models::common::Vector2D;

use super::{v, AMMO_STATUS, DESIRABILITY, DIST_TO_TARGET};

pub(super) const OUTLINE: [Vector2D; 8] = [
    v(0.0, -3.0),
    v(6.0, -3.0),
    v(6.0, -1.0),
    v(15.0, -1.0),
    v(15.0, 1.0),
    v(6.0, 1.0),
    v(6.0, 3.0),
    v(0.0, 3.0),
];

/// ロケットランチャー: 距離5段階 × 残弾5段階の全組み合わせ
///
/// 至近距離は自爆の危険があるため弾数に関わらず ForgetIt。
pub(super) fn desirability_module() -> Result<FuzzyModule, FuzzyError> {
    // (距離集合, [Loads, AlmostFull, Okay, Low, AlmostOut] に対する後件)
    const TABLE: [(&str, [&str; 5]); 5] = [
        ("Target_Close", ["ForgetIt", "ForgetIt", "ForgetIt", "ForgetIt", "ForgetIt"]),
        ("Target_Medium", ["Desirable", "Desirable", "Undesirable", "ForgetIt", "ForgetIt"]),
        ("Target_Far", ["IChooseYou", "VeryDesirable", "Desirable", "Desirable", "Undesirable"]),
        (
            "Target_VeryFar",
            ["IChooseYou", "IChooseYou", "VeryDesirable", "Desirable", "Undesirable"],
        ),
        ("Target_InUniverse", ["Desirable", "Undesirable", "Undesirable", "ForgetIt", "ForgetIt"]),
    ];
    const AMMO: [&str; 5] = [
        "Ammo_Loads",
        "Ammo_AlmostFull",
        "Ammo_Okay",
        "Ammo_Low",
        "Ammo_AlmostOut",
    ];

    let mut builder = FuzzyModule::builder()
        .variable(DIST_TO_TARGET)
        .left_shoulder("Target_Close", 0.0, 15.0, 75.0)
        .triangular("Target_Medium", 15.0, 75.0, 150.0)
        .triangular("Target_Far", 75.0, 150.0, 300.0)
        .triangular("Target_VeryFar", 150.0, 300.0, 600.0)
        .right_shoulder("Target_InUniverse", 300.0, 600.0, 1000.0)
        .variable(DESIRABILITY)
        .right_shoulder("IChooseYou", 70.0, 90.0, 100.0)
        .triangular("VeryDesirable", 50.0, 70.0, 90.0)
        .triangular("Desirable", 30.0, 50.0, 70.0)
        .triangular("Undesirable", 0.0, 10.0, 30.0)
        .triangular("ForgetIt", 0.0, 0.0, 10.0)
        .variable(AMMO_STATUS)
        .right_shoulder("Ammo_Loads", 50.0, 80.0, 100.0)
        .triangular("Ammo_AlmostFull", 30.0, 50.0, 70.0)
        .triangular("Ammo_Okay", 10.0, 30.0, 60.0)
        .triangular("Ammo_Low", 0.0, 10.0, 30.0)
        .triangular("Ammo_AlmostOut", 0.0, 0.0, 10.0);

    for (dist, row) in TABLE {
        for (ammo, desirability) in AMMO.iter().zip(row) {
            builder = builder.rule(
                Term::and([Term::set(DIST_TO_TARGET, dist), Term::set(AMMO_STATUS, *ammo)]),
                Consequent::set(DESIRABILITY, desirability),
            );
        }
    }

    builder.build()
}
