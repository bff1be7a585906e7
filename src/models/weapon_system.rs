use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::models::{
    aim::AimErrorEstimator,
    common::Vector2D,
    traits::{IProjectileSink, ITargetingContext, IWeapon},
    weapon::{ArmoryError, Weapon, WeaponKind},
};
use crate::params::ParamTable;

/// 目標がいないときに持つ武器
pub const FALLBACK_WEAPON: WeaponKind = WeaponKind::Blaster;

/// 照準動作の設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimConfig {
    /// 目標を視認してから発射できるまでの反応時間[s]
    pub reaction_time: f64,
    /// 目標が視界から外れても照準を維持する時間[s]
    pub aim_persistance: f64,
    /// 弾速の遅い武器で目標の未来位置を狙うか
    pub lead_target: bool,
    /// 照準ノイズ用乱数のシード
    pub seed: u64,
}

impl AimConfig {
    pub fn from_params(
        params: &ParamTable,
        lead_target: bool,
        seed: u64,
    ) -> Result<Self, ArmoryError> {
        Ok(Self {
            reaction_time: params.get("Bot_ReactionTime")?,
            aim_persistance: params.get("Bot_AimPersistance")?,
            lead_target,
            seed,
        })
    }
}

/// インベントリの中から最も望ましい武器を選びます
///
/// 存在する武器をインベントリ順に走査し、それまでの最高値を**厳密に上回った**
/// 武器だけを採用します（同点の場合は先に見つかった武器が残る）。
///
/// # 戻り値
///
/// 選ばれた武器の添字。候補がなければ None
pub fn select_best<W: IWeapon>(inventory: &mut [Option<W>], distance: f64) -> Option<usize> {
    let mut best_so_far = f64::NEG_INFINITY;
    let mut best = None;

    for (index, slot) in inventory.iter_mut().enumerate() {
        if let Some(weapon) = slot {
            let score = weapon.desirability(distance);
            if score > best_so_far {
                best_so_far = score;
                best = Some(index);
            }
        }
    }

    best
}

/// ボットの武器システム
///
/// 武器の所持・選択と、照準誤差推定器を使った照準・発射を担当します。
#[derive(Debug)]
pub struct WeaponSystem {
    inventory: [Option<Weapon>; WeaponKind::COUNT],
    current: WeaponKind,
    aim_estimator: AimErrorEstimator,
    config: AimConfig,
    params: ParamTable,
    rng: ChaCha8Rng,
    /// 最後に使った照準誤差（表示用）
    last_deviation: f64,
}

impl WeaponSystem {
    /// 武器システムを生成します
    ///
    /// 初期状態ではブラスターとナイフを所持し、ブラスターを構えます。
    pub fn new(params: ParamTable, config: AimConfig) -> Result<Self, ArmoryError> {
        let mut system = Self {
            inventory: Default::default(),
            current: FALLBACK_WEAPON,
            aim_estimator: AimErrorEstimator::new()?,
            config,
            params,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            last_deviation: 0.0,
        };
        system.initialize()?;
        Ok(system)
    }

    /// インベントリを初期状態に戻します
    pub fn initialize(&mut self) -> Result<(), ArmoryError> {
        self.inventory = Default::default();
        self.inventory[FALLBACK_WEAPON.index()] = Some(Weapon::new(FALLBACK_WEAPON, &self.params)?);
        self.current = FALLBACK_WEAPON;
        self.add_weapon(WeaponKind::Knife)?;
        Ok(())
    }

    /// 武器を追加します
    ///
    /// 既に同じ種類を持っている場合は、新しい武器の初期弾数だけ弾を補充します。
    pub fn add_weapon(&mut self, kind: WeaponKind) -> Result<(), ArmoryError> {
        let weapon = Weapon::new(kind, &self.params)?;

        match self.inventory[kind.index()].as_mut() {
            Some(present) => {
                present.increment_rounds(weapon.rounds_remaining());
                debug!(weapon = kind.name(), rounds = present.rounds_remaining(), "弾薬を補充");
            }
            None => {
                self.inventory[kind.index()] = Some(weapon);
                info!(weapon = kind.name(), "武器を取得");
            }
        }

        Ok(())
    }

    pub fn weapon(&self, kind: WeaponKind) -> Option<&Weapon> {
        self.inventory[kind.index()].as_ref()
    }

    pub fn has_weapon(&self, kind: WeaponKind) -> bool {
        self.inventory[kind.index()].is_some()
    }

    /// 指定の武器に持ち替えます（所持していなければ何もしない）
    pub fn change_weapon(&mut self, kind: WeaponKind) -> bool {
        if self.has_weapon(kind) {
            self.current = kind;
            true
        } else {
            false
        }
    }

    pub fn current_kind(&self) -> WeaponKind {
        self.current
    }

    pub fn current_weapon(&self) -> Option<&Weapon> {
        self.weapon(self.current)
    }

    /// 指定武器の残弾数（所持していなければ 0）
    pub fn rounds_remaining(&self, kind: WeaponKind) -> u32 {
        self.weapon(kind).map_or(0, |w| w.rounds_remaining())
    }

    /// 指定武器の望ましさ（所持していなければ 0）
    pub fn desirability(&mut self, kind: WeaponKind, distance: f64) -> f64 {
        self.inventory[kind.index()]
            .as_mut()
            .map_or(0.0, |w| w.desirability(distance))
    }

    /// 照準誤差を推定します
    pub fn estimated_deviation(
        &mut self,
        distance: f64,
        velocity: Vector2D,
        visible_time: f64,
    ) -> f64 {
        self.aim_estimator.estimate_deviation(distance, velocity, visible_time)
    }

    pub fn last_deviation(&self) -> f64 {
        self.last_deviation
    }

    /// 状況に応じて最も望ましい武器を選びます
    ///
    /// 目標がいればファジィ推論で選択し、いなければブラスターに持ち替えます。
    pub fn select_weapon(&mut self, ctx: &impl ITargetingContext) {
        let previous = self.current;

        if ctx.is_target_present() {
            let distance = ctx.distance_to_target();
            if let Some(index) = select_best(&mut self.inventory, distance) {
                self.current = WeaponKind::ALL[index];
            }
        } else if self.has_weapon(FALLBACK_WEAPON) {
            self.current = FALLBACK_WEAPON;
        }

        if previous != self.current {
            debug!(
                from = previous.name(),
                to = self.current.name(),
                time = ctx.current_time(),
                "武器を持ち替え"
            );
        }
    }

    /// 現在の武器で目標を狙い、条件が揃えば発射します
    ///
    /// # 戻り値
    ///
    /// 発射した場合は true
    pub fn take_aim_and_shoot(
        &mut self,
        ctx: &mut impl ITargetingContext,
        sink: &mut impl IProjectileSink,
    ) -> bool {
        let target_position = ctx.target_position().filter(|_| {
            ctx.is_target_shootable() || ctx.time_target_out_of_view() < self.config.aim_persistance
        });

        let Some(target_position) = target_position else {
            // 目標がいなければ進行方向を向く
            let ahead = ctx.owner_position() + ctx.owner_heading();
            ctx.rotate_facing_toward(ahead);
            return false;
        };

        let kind = self.current;
        let Some(weapon) = self.inventory[kind.index()].as_mut() else {
            return false;
        };

        let origin = ctx.owner_position();
        let now = ctx.current_time();
        let visible_long_enough = ctx.time_target_visible() > self.config.reaction_time;

        if kind == WeaponKind::Knife {
            return weapon.shoot_at(origin, target_position, now, &mut self.rng, sink);
        }

        // 誤差は射手から見た相対速度で決まる
        let relative_velocity = ctx.target_velocity() - ctx.owner_velocity();
        let deviation = self.aim_estimator.estimate_deviation(
            ctx.distance_to_target(),
            relative_velocity,
            ctx.time_target_visible(),
        );
        self.last_deviation = deviation;

        let mut aim = target_position;
        if !kind.is_instant_hit() && self.config.lead_target {
            aim = predict_future_position(ctx, target_position, weapon.projectile_speed());
        }

        let aligned = ctx.rotate_facing_toward(aim);
        let clear_shot = kind.is_instant_hit() || ctx.has_line_of_sight(aim);
        let ready = aligned && visible_long_enough && clear_shot;
        if !ready {
            return false;
        }

        let noisy_aim = add_noise_to_aim(&mut self.rng, origin, aim, deviation);
        weapon.shoot_at(origin, noisy_aim, now, &mut self.rng, sink)
    }

    /// 1ティック分の意思決定（武器選択 → 照準・発射）
    pub fn select_and_fire(
        &mut self,
        ctx: &mut impl ITargetingContext,
        sink: &mut impl IProjectileSink,
    ) -> bool {
        self.select_weapon(ctx);
        self.take_aim_and_shoot(ctx, sink)
    }

    /// 所持武器ごとの最後の望ましさを表示用の行にします
    pub fn render_desirabilities(&self) -> Vec<String> {
        self.inventory
            .iter()
            .flatten()
            .map(|w| format!("{:.1} {}", w.last_desirability_score(), w.kind().name()))
            .collect()
    }
}

/// 射手から目標へのベクトルを [-deviation, +deviation] の一様乱数角で回転させます
pub fn add_noise_to_aim(
    rng: &mut dyn RngCore,
    origin: Vector2D,
    aim: Vector2D,
    deviation: f64,
) -> Vector2D {
    let deviation = deviation.abs();
    let angle = rng.gen_range(-deviation..=deviation);
    origin + (aim - origin).rotated(angle)
}

/// 弾が届くまでの間に目標が移動する位置を予測します
fn predict_future_position(
    ctx: &impl ITargetingContext,
    target_position: Vector2D,
    projectile_speed: f64,
) -> Vector2D {
    let to_target = target_position - ctx.owner_position();
    let closing = projectile_speed + ctx.target_max_speed();
    if closing <= 0.0 {
        return target_position;
    }
    let look_ahead_time = to_target.length() / closing;
    target_position + ctx.target_velocity() * look_ahead_time
}
