//! # Params モジュール
//!
//! 武器とボットの数値パラメータを名前で引くテーブルを提供します。
//!
//! 組み込みの既定値を持ち、シナリオファイルの `params` セクションで
//! 個別に上書きできます。名前は `<種類>_<項目>` の形式です（例: `RocketLauncher_FiringFreq`）。

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

/// パラメータ参照エラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("パラメータが見つかりません: {0}")]
    MissingParam(String),

    #[error("パラメータ {name} の値が不正です: {value}")]
    InvalidParam { name: String, value: f64 },
}

/// 組み込みの既定パラメータ
const DEFAULT_PARAMS: &[(&str, f64)] = &[
    // ボット
    ("Bot_ReactionTime", 0.2),
    ("Bot_AimPersistance", 1.0),
    ("Bot_MaxTurnRate", 4.0),
    ("Bot_SensorRange", 500.0),
    // ブラスター（弾数無制限）
    ("Blaster_DefaultRounds", 0.0),
    ("Blaster_MaxRoundsCarried", 0.0),
    ("Blaster_FiringFreq", 3.0),
    ("Blaster_IdealRange", 50.0),
    ("Blaster_ProjectileSpeed", 300.0),
    ("Blaster_Damage", 1.0),
    // ショットガン
    ("ShotGun_DefaultRounds", 15.0),
    ("ShotGun_MaxRoundsCarried", 50.0),
    ("ShotGun_FiringFreq", 1.0),
    ("ShotGun_IdealRange", 100.0),
    ("ShotGun_ProjectileSpeed", 2000.0),
    ("ShotGun_Damage", 1.0),
    ("ShotGun_NumBallsInShell", 10.0),
    ("ShotGun_Spread", 0.05),
    // レールガン
    ("RailGun_DefaultRounds", 15.0),
    ("RailGun_MaxRoundsCarried", 50.0),
    ("RailGun_FiringFreq", 1.0),
    ("RailGun_IdealRange", 200.0),
    ("RailGun_ProjectileSpeed", 5000.0),
    ("RailGun_Damage", 10.0),
    // ロケットランチャー
    ("RocketLauncher_DefaultRounds", 15.0),
    ("RocketLauncher_MaxRoundsCarried", 50.0),
    ("RocketLauncher_FiringFreq", 1.5),
    ("RocketLauncher_IdealRange", 150.0),
    ("RocketLauncher_ProjectileSpeed", 180.0),
    ("RocketLauncher_Damage", 10.0),
    // ナイフ（弾数無制限）
    ("Knife_DefaultRounds", 0.0),
    ("Knife_MaxRoundsCarried", 0.0),
    ("Knife_FiringFreq", 2.0),
    ("Knife_IdealRange", 15.0),
    ("Knife_ProjectileSpeed", 400.0),
    ("Knife_Damage", 3.0),
];

/// 名前→数値のパラメータテーブル
#[derive(Debug, Clone, PartialEq)]
pub struct ParamTable {
    values: HashMap<String, f64>,
}

impl Default for ParamTable {
    fn default() -> Self {
        Self {
            values: DEFAULT_PARAMS
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        }
    }
}

impl ParamTable {
    /// 既定値を持たない空のテーブル
    pub fn empty() -> Self {
        Self { values: HashMap::new() }
    }

    /// 既定値にシナリオの上書き値を適用したテーブル
    pub fn with_overrides(overrides: &BTreeMap<String, f64>) -> Self {
        let mut table = Self::default();
        for (name, value) in overrides {
            table.set(name, *value);
        }
        table
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// 実数パラメータの取得
    pub fn get(&self, name: &str) -> Result<f64, ConfigError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::MissingParam(name.to_string()))
    }

    /// 正の実数パラメータの取得（頻度・速度など）
    pub fn get_positive(&self, name: &str) -> Result<f64, ConfigError> {
        let value = self.get(name)?;
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(ConfigError::InvalidParam {
                name: name.to_string(),
                value,
            })
        }
    }

    /// 非負の整数パラメータの取得（弾数など）
    pub fn get_count(&self, name: &str) -> Result<u32, ConfigError> {
        let value = self.get(name)?;
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
            Ok(value as u32)
        } else {
            Err(ConfigError::InvalidParam {
                name: name.to_string(),
                value,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_present() {
        let params = ParamTable::default();
        assert_eq!(params.get("RocketLauncher_FiringFreq"), Ok(1.5));
        assert_eq!(params.get_count("ShotGun_NumBallsInShell"), Ok(10));
        assert_eq!(
            params.get("Nope_Param"),
            Err(ConfigError::MissingParam("Nope_Param".to_string()))
        );
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let mut overrides = BTreeMap::new();
        overrides.insert("RailGun_DefaultRounds".to_string(), 3.0);
        overrides.insert("Custom_Value".to_string(), 42.0);
        let params = ParamTable::with_overrides(&overrides);
        assert_eq!(params.get_count("RailGun_DefaultRounds"), Ok(3));
        assert_eq!(params.get("Custom_Value"), Ok(42.0));
        assert_eq!(params.get("Blaster_FiringFreq"), Ok(3.0));
    }

    #[test]
    fn test_typed_getters_validate() {
        let mut params = ParamTable::empty();
        params.set("Rounds", 2.5);
        params.set("Freq", 0.0);
        assert!(matches!(params.get_count("Rounds"), Err(ConfigError::InvalidParam { .. })));
        assert!(matches!(params.get_positive("Freq"), Err(ConfigError::InvalidParam { .. })));
        assert!(!params.contains("Missing"));
    }
}
