//! 武器種類ごとの望ましさルールテーブルと外形データ
//!
//! ルールテーブルはコンパイル時に固定された静的な記述で、
//! 武器の生成時に一度だけ [`FuzzyModule`] として構築されます。

use crate::fuzzy::{FuzzyError, FuzzyModule};
use crate::models::{common::Vector2D, weapon::WeaponKind};

mod blaster;
mod knife;
mod railgun;
mod rocket_launcher;
mod shotgun;

/// 目標までの距離
pub const DIST_TO_TARGET: &str = "DistToTarget";
/// 残弾数
pub const AMMO_STATUS: &str = "AmmoStatus";
/// 出力: 望ましさ
pub const DESIRABILITY: &str = "Desirability";

/// 武器種類に対応する望ましさ推論モジュールを構築します
pub fn desirability_module(kind: WeaponKind) -> Result<FuzzyModule, FuzzyError> {
    match kind {
        WeaponKind::Blaster => blaster::desirability_module(),
        WeaponKind::ShotGun => shotgun::desirability_module(),
        WeaponKind::RailGun => railgun::desirability_module(),
        WeaponKind::RocketLauncher => rocket_launcher::desirability_module(),
        WeaponKind::Knife => knife::desirability_module(),
    }
}

/// 武器種類ごとの外形（ローカル座標の頂点列）
pub fn outline(kind: WeaponKind) -> &'static [Vector2D] {
    match kind {
        WeaponKind::Blaster => &blaster::OUTLINE,
        WeaponKind::ShotGun => &shotgun::OUTLINE,
        WeaponKind::RailGun => &railgun::OUTLINE,
        WeaponKind::RocketLauncher => &rocket_launcher::OUTLINE,
        WeaponKind::Knife => &knife::OUTLINE,
    }
}

const fn v(x: f64, y: f64) -> Vector2D {
    Vector2D { x, y }
}
