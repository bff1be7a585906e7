use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{trace, warn};

use crate::fuzzy::{DefuzzifyMethod, FuzzyError, FuzzyModule};
use crate::models::{
    armory::{self, AMMO_STATUS, DESIRABILITY, DIST_TO_TARGET},
    common::Vector2D,
    traits::{IProjectileSink, IWeapon},
};
use crate::params::{ConfigError, ParamTable};

/// 武器の種類
///
/// 宣言順がインベントリの順序（武器選択の走査順）になります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Blaster,
    ShotGun,
    RailGun,
    RocketLauncher,
    Knife,
}

impl WeaponKind {
    pub const COUNT: usize = 5;

    pub const ALL: [WeaponKind; WeaponKind::COUNT] = [
        WeaponKind::Blaster,
        WeaponKind::ShotGun,
        WeaponKind::RailGun,
        WeaponKind::RocketLauncher,
        WeaponKind::Knife,
    ];

    /// インベントリ配列の添字
    pub fn index(self) -> usize {
        self as usize
    }

    /// 表示名（パラメータ名の接頭辞を兼ねる）
    pub fn name(self) -> &'static str {
        match self {
            WeaponKind::Blaster => "Blaster",
            WeaponKind::ShotGun => "ShotGun",
            WeaponKind::RailGun => "RailGun",
            WeaponKind::RocketLauncher => "RocketLauncher",
            WeaponKind::Knife => "Knife",
        }
    }

    /// 弾数に制限があるか（ブラスターとナイフは無制限）
    pub fn is_ammo_limited(self) -> bool {
        !matches!(self, WeaponKind::Blaster | WeaponKind::Knife)
    }

    /// 着弾が即時とみなせる武器か（偏差予測が不要）
    pub fn is_instant_hit(self) -> bool {
        matches!(self, WeaponKind::ShotGun | WeaponKind::RailGun)
    }
}

/// 武器・照準システムの生成エラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArmoryError {
    #[error("ルールベースの構築に失敗しました: {0}")]
    Fuzzy(#[from] FuzzyError),

    #[error("パラメータの読み込みに失敗しました: {0}")]
    Config(#[from] ConfigError),
}

/// 散弾の発射パターン（ショットガンのみ）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotPattern {
    /// 1発あたりの弾数
    pub pellets: u32,
    /// 散布角の半幅（ラジアン）
    pub spread: f64,
}

/// 武器インスタンス
///
/// 武器種類ごとに自分専用の望ましさ推論モジュールを所有します。
#[derive(Debug, Clone)]
pub struct Weapon {
    kind: WeaponKind,
    /// 残弾数（弾数無制限の武器では未使用）
    rounds_left: u32,
    /// 最大携行弾数
    max_rounds_carried: u32,
    /// 発射頻度[回/s]
    firing_freq: f64,
    /// 次に発射可能になる時刻[s]
    time_next_available: f64,
    /// 理想交戦距離
    ideal_range: f64,
    /// 弾速
    projectile_speed: f64,
    shot_pattern: Option<ShotPattern>,
    desirability_module: FuzzyModule,
    /// 最後に計算した望ましさ（表示用）
    last_desirability_score: f64,
}

impl Weapon {
    /// パラメータテーブルから武器を生成します
    ///
    /// # 引数
    ///
    /// * `kind` - 武器の種類
    /// * `params` - `<種類>_DefaultRounds` などを含むパラメータテーブル
    ///
    /// # 戻り値
    ///
    /// 生成された武器。ルールテーブルまたはパラメータに不備があればエラー
    pub fn new(kind: WeaponKind, params: &ParamTable) -> Result<Self, ArmoryError> {
        let key = |item: &str| format!("{}_{}", kind.name(), item);

        let desirability_module = armory::desirability_module(kind)?;
        desirability_module.variable_id(DIST_TO_TARGET)?;
        desirability_module.variable_id(DESIRABILITY)?;
        if kind.is_ammo_limited() {
            desirability_module.variable_id(AMMO_STATUS)?;
        }

        let shot_pattern = match kind {
            WeaponKind::ShotGun => Some(ShotPattern {
                pellets: params.get_count(&key("NumBallsInShell"))?,
                spread: params.get(&key("Spread"))?.abs(),
            }),
            _ => None,
        };

        let max_rounds_carried = params.get_count(&key("MaxRoundsCarried"))?;
        let rounds_left = params.get_count(&key("DefaultRounds"))?.min(max_rounds_carried);

        Ok(Self {
            kind,
            rounds_left,
            max_rounds_carried,
            firing_freq: params.get_positive(&key("FiringFreq"))?,
            time_next_available: 0.0,
            ideal_range: params.get(&key("IdealRange"))?,
            projectile_speed: params.get_positive(&key("ProjectileSpeed"))?,
            shot_pattern,
            desirability_module,
            last_desirability_score: 0.0,
        })
    }

    pub fn ideal_range(&self) -> f64 {
        self.ideal_range
    }

    pub fn projectile_speed(&self) -> f64 {
        self.projectile_speed
    }

    pub fn max_rounds_carried(&self) -> u32 {
        self.max_rounds_carried
    }

    pub fn shot_pattern(&self) -> Option<ShotPattern> {
        self.shot_pattern
    }

    fn update_time_next_available(&mut self, now: f64) {
        self.time_next_available = now + 1.0 / self.firing_freq;
    }
}

impl IWeapon for Weapon {
    fn kind(&self) -> WeaponKind {
        self.kind
    }

    fn shoot_at(
        &mut self,
        origin: Vector2D,
        aim: Vector2D,
        now: f64,
        rng: &mut dyn RngCore,
        sink: &mut dyn IProjectileSink,
    ) -> bool {
        if !self.is_ready_for_next_shot(now) {
            return false;
        }
        if self.kind.is_ammo_limited() && self.rounds_left == 0 {
            return false;
        }

        match self.shot_pattern {
            Some(pattern) => {
                let to_aim = aim - origin;
                for _ in 0..pattern.pellets {
                    let angle = rng.gen_range(-pattern.spread..=pattern.spread);
                    sink.fire_projectile(self.kind, origin, origin + to_aim.rotated(angle));
                }
            }
            None => sink.fire_projectile(self.kind, origin, aim),
        }

        if self.kind.is_ammo_limited() {
            self.rounds_left -= 1;
        }
        self.update_time_next_available(now);

        trace!(weapon = self.kind.name(), rounds_left = self.rounds_left, "発射");
        true
    }

    fn desirability(&mut self, distance: f64) -> f64 {
        let score = if self.kind.is_ammo_limited() && self.rounds_left == 0 {
            0.0
        } else {
            let mut inputs = vec![(DIST_TO_TARGET, distance)];
            if self.kind.is_ammo_limited() {
                inputs.push((AMMO_STATUS, self.rounds_left as f64));
            }
            self.desirability_module
                .infer(&inputs, DESIRABILITY, DefuzzifyMethod::MaxAv)
                .unwrap_or_else(|e| {
                    // 変数は生成時に検証済み
                    warn!(weapon = self.kind.name(), error = %e, "望ましさの推論に失敗");
                    0.0
                })
        };

        self.last_desirability_score = score;
        score
    }

    fn last_desirability_score(&self) -> f64 {
        self.last_desirability_score
    }

    fn rounds_remaining(&self) -> u32 {
        self.rounds_left
    }

    fn increment_rounds(&mut self, count: u32) {
        self.rounds_left = self
            .rounds_left
            .saturating_add(count)
            .min(self.max_rounds_carried);
    }

    fn is_ready_for_next_shot(&self, now: f64) -> bool {
        now >= self.time_next_available
    }

    fn outline(&self) -> &'static [Vector2D] {
        armory::outline(self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[derive(Default)]
    struct Recorder {
        shots: Vec<(WeaponKind, Vector2D, Vector2D)>,
    }

    impl IProjectileSink for Recorder {
        fn fire_projectile(&mut self, kind: WeaponKind, origin: Vector2D, aim: Vector2D) {
            self.shots.push((kind, origin, aim));
        }
    }

    fn weapon(kind: WeaponKind) -> Weapon {
        Weapon::new(kind, &ParamTable::default()).unwrap()
    }

    #[test]
    fn test_knife_desirability_scenarios() {
        let mut knife = weapon(WeaponKind::Knife);
        assert!((knife.desirability(0.0) - 75.0).abs() < 1e-9);
        assert!((knife.last_desirability_score() - 75.0).abs() < 1e-9);
        assert!((knife.desirability(150.0) - 25.0).abs() < 1e-9);
        assert!((knife.last_desirability_score() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_ammo_short_circuits_to_zero() {
        let mut params = ParamTable::default();
        params.set("RocketLauncher_DefaultRounds", 0.0);
        let mut rocket = Weapon::new(WeaponKind::RocketLauncher, &params).unwrap();
        assert_eq!(rocket.rounds_remaining(), 0);
        assert_eq!(rocket.desirability(150.0), 0.0);
        assert_eq!(rocket.last_desirability_score(), 0.0);
    }

    #[test]
    fn test_firing_consumes_round_and_respects_cooldown() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sink = Recorder::default();
        let mut rail = weapon(WeaponKind::RailGun);
        let origin = Vector2D::ZERO;
        let aim = Vector2D::new(100.0, 0.0);

        assert!(rail.shoot_at(origin, aim, 0.0, &mut rng, &mut sink));
        assert_eq!(rail.rounds_remaining(), 14);
        // 発射頻度 1 回/s
        assert!(!rail.shoot_at(origin, aim, 0.5, &mut rng, &mut sink));
        assert!(rail.shoot_at(origin, aim, 1.0, &mut rng, &mut sink));
        assert_eq!(sink.shots.len(), 2);
        assert_eq!(rail.rounds_remaining(), 13);
    }

    #[test]
    fn test_unlimited_weapons_never_run_dry() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut sink = Recorder::default();
        let mut blaster = weapon(WeaponKind::Blaster);
        for i in 0..10 {
            let aim = Vector2D::new(1.0, 0.0);
            assert!(blaster.shoot_at(Vector2D::ZERO, aim, i as f64, &mut rng, &mut sink));
        }
        assert_eq!(blaster.rounds_remaining(), 0);
        assert!(blaster.desirability(10.0) > 0.0);
    }

    #[test]
    fn test_shotgun_spreads_pellets_within_cone() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut sink = Recorder::default();
        let mut shotgun = weapon(WeaponKind::ShotGun);
        let aim = Vector2D::new(100.0, 0.0);
        assert!(shotgun.shoot_at(Vector2D::ZERO, aim, 0.0, &mut rng, &mut sink));
        assert_eq!(sink.shots.len(), 10);
        for (kind, _, pellet_aim) in &sink.shots {
            assert_eq!(*kind, WeaponKind::ShotGun);
            assert!(pellet_aim.angle().abs() <= 0.05 + 1e-12);
            assert!((pellet_aim.length() - 100.0).abs() < 1e-9);
        }
        assert_eq!(shotgun.rounds_remaining(), 14);
    }

    #[test]
    fn test_increment_rounds_is_capped() {
        let mut rocket = weapon(WeaponKind::RocketLauncher);
        rocket.increment_rounds(100);
        assert_eq!(rocket.rounds_remaining(), rocket.max_rounds_carried());
    }

    #[test]
    fn test_missing_param_rejects_weapon() {
        let mut params = ParamTable::empty();
        params.set("Knife_MaxRoundsCarried", 0.0);
        let err = Weapon::new(WeaponKind::Knife, &params).unwrap_err();
        assert_eq!(
            err,
            ArmoryError::Config(ConfigError::MissingParam("Knife_DefaultRounds".to_string()))
        );
    }
}
