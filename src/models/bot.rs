use crate::models::{
    common::{math_utils, AgentStatus, Arena, Vector2D},
    sensor::TargetingSensor,
    target::Target,
    traits::{IAgent, IProjectileSink, ITargetingContext},
    weapon_system::WeaponSystem,
};

/// 照準が合ったとみなす残り角度[rad]
const ALIGNMENT_TOLERANCE: f64 = 1e-3;

/// ボットの運動状態
#[derive(Debug, Clone, PartialEq)]
pub struct BotBody {
    pub position: Vector2D,
    pub velocity: Vector2D,
    /// 進行方向（単位ベクトル）
    pub heading: Vector2D,
    /// 照準方向（単位ベクトル）
    pub facing: Vector2D,
    /// 最大旋回レート[rad/s]
    pub max_turn_rate: f64,
}

impl BotBody {
    pub fn new(position: Vector2D, heading: Vector2D, max_turn_rate: f64) -> Self {
        let heading = match heading.normalize() {
            h if h == Vector2D::ZERO => Vector2D::new(1.0, 0.0),
            h => h,
        };
        Self {
            position,
            velocity: Vector2D::ZERO,
            heading,
            facing: heading,
            max_turn_rate,
        }
    }

    /// 照準方向を `point` に向けて最大 `max_turn_rate * dt` だけ回転します
    ///
    /// # 戻り値
    ///
    /// 回転後に `point` を向いていれば true
    pub fn rotate_facing_toward(&mut self, point: Vector2D, dt: f64) -> bool {
        let to_point = point - self.position;
        if to_point == Vector2D::ZERO {
            return true;
        }

        let angle = math_utils::angle_between(self.facing, to_point);
        let max_step = self.max_turn_rate * dt;
        let step = angle.clamp(-max_step, max_step);
        self.facing = self.facing.rotated(step).normalize();

        (angle - step).abs() < ALIGNMENT_TOLERANCE
    }
}

/// 武器システムに渡すボット視点の照準コンテキスト
pub struct BotView<'a> {
    pub body: &'a mut BotBody,
    pub sensor: &'a TargetingSensor,
    pub arena: &'a Arena,
    pub dt: f64,
}

impl ITargetingContext for BotView<'_> {
    fn owner_position(&self) -> Vector2D {
        self.body.position
    }

    fn owner_heading(&self) -> Vector2D {
        self.body.heading
    }

    fn owner_velocity(&self) -> Vector2D {
        self.body.velocity
    }

    fn current_time(&self) -> f64 {
        self.sensor.current_time()
    }

    fn is_target_present(&self) -> bool {
        self.sensor.is_target_present()
    }

    fn is_target_shootable(&self) -> bool {
        self.sensor.is_target_shootable()
    }

    fn target_position(&self) -> Option<Vector2D> {
        self.sensor.last_position()
    }

    fn target_velocity(&self) -> Vector2D {
        self.sensor.last_velocity()
    }

    fn target_max_speed(&self) -> f64 {
        self.sensor.target_max_speed()
    }

    fn distance_to_target(&self) -> f64 {
        self.sensor
            .last_position()
            .map_or(f64::INFINITY, |p| self.body.position.distance(&p))
    }

    fn time_target_visible(&self) -> f64 {
        self.sensor.time_target_visible()
    }

    fn time_target_out_of_view(&self) -> f64 {
        self.sensor.time_target_out_of_view()
    }

    fn has_line_of_sight(&self, point: Vector2D) -> bool {
        self.arena.is_path_clear(self.body.position, point)
    }

    fn rotate_facing_toward(&mut self, point: Vector2D) -> bool {
        self.body.rotate_facing_toward(point, self.dt)
    }
}

/// ボットエージェント
///
/// センサーで目標を認識し、武器システムで武器選択と射撃を行います。
#[derive(Debug)]
pub struct Bot {
    pub id: String,
    pub body: BotBody,
    pub sensor: TargetingSensor,
    pub weapons: WeaponSystem,
    pub status: AgentStatus,
}

impl Bot {
    pub fn new(id: String, body: BotBody, sensor: TargetingSensor, weapons: WeaponSystem) -> Self {
        Self {
            id,
            body,
            sensor,
            weapons,
            status: AgentStatus::Active,
        }
    }

    /// センサーを更新します
    pub fn perceive(&mut self, target: &Target, arena: &Arena, current_time: f64) {
        self.sensor.update(self.body.position, target, arena, current_time);
    }

    /// 武器を選択し、可能なら発射します
    ///
    /// # 戻り値
    ///
    /// 発射した場合は true
    pub fn decide(&mut self, arena: &Arena, dt: f64, sink: &mut impl IProjectileSink) -> bool {
        if !self.is_active() {
            return false;
        }

        let Bot { body, sensor, weapons, .. } = self;
        let mut view = BotView {
            body,
            sensor,
            arena,
            dt,
        };
        weapons.select_and_fire(&mut view, sink)
    }
}

impl IAgent for Bot {
    fn tick(&mut self, dt: f64) {
        if self.is_active() {
            self.body.position = self.body.position + self.body.velocity * dt;
        }
    }

    fn get_id(&self) -> String {
        self.id.clone()
    }

    fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        aim::AimErrorEstimator,
        weapon::WeaponKind,
        weapon_system::AimConfig,
    };
    use crate::params::ParamTable;
    use std::f64::consts::FRAC_PI_2;

    #[derive(Default)]
    struct Recorder {
        shots: Vec<(WeaponKind, Vector2D, Vector2D)>,
    }

    impl IProjectileSink for Recorder {
        fn fire_projectile(&mut self, kind: WeaponKind, origin: Vector2D, aim: Vector2D) {
            self.shots.push((kind, origin, aim));
        }
    }

    fn open_arena() -> Arena {
        Arena {
            xmin: 0.0,
            xmax: 1000.0,
            ymin: 0.0,
            ymax: 1000.0,
            obstacles: Vec::new(),
        }
    }

    fn bot() -> Bot {
        let params = ParamTable::default();
        let config = AimConfig::from_params(&params, true, 11).unwrap();
        Bot::new(
            "B1".to_string(),
            BotBody::new(Vector2D::new(100.0, 100.0), Vector2D::new(1.0, 0.0), 4.0),
            TargetingSensor::new("B1".to_string(), 500.0),
            WeaponSystem::new(params, config).unwrap(),
        )
    }

    #[test]
    fn test_turn_rate_limits_rotation() {
        let mut body = BotBody::new(Vector2D::ZERO, Vector2D::new(1.0, 0.0), 1.0);
        let above = Vector2D::new(0.0, 10.0);
        // 90度の旋回に 1rad/s × 0.5s では足りない
        assert!(!body.rotate_facing_toward(above, 0.5));
        assert!((body.facing.angle() - 0.5).abs() < 1e-9);
        assert!(!body.rotate_facing_toward(above, 0.5));
        assert!(body.rotate_facing_toward(above, 1.0));
        assert!((body.facing.angle() - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_bot_turns_then_fires_at_visible_target() {
        let mut bot = bot();
        let arena = open_arena();
        let target =
            Target::new("T".to_string(), Vector2D::new(100.0, 400.0), Vector2D::ZERO, 10, 5.0);
        let mut sink = Recorder::default();

        let mut fired_at = None;
        for step in 0..20 {
            let now = step as f64 * 0.1;
            bot.perceive(&target, &arena, now);
            if bot.decide(&arena, 0.1, &mut sink) {
                fired_at = Some(now);
                break;
            }
        }

        // 反応時間 0.2s と旋回（π/2 を 4rad/s）の後に発射する
        let fired_at = fired_at.unwrap();
        assert!(fired_at > 0.2);
        assert_eq!(sink.shots.len(), 1);
        assert_eq!(sink.shots[0].0, bot.weapons.current_kind());
    }

    #[test]
    fn test_bot_without_target_holds_fire() {
        let mut bot = bot();
        let arena = open_arena();
        let mut target =
            Target::new("T".to_string(), Vector2D::new(120.0, 100.0), Vector2D::ZERO, 1, 5.0);
        target.take_damage(1);
        let mut sink = Recorder::default();

        bot.perceive(&target, &arena, 0.0);
        assert!(!bot.decide(&arena, 0.1, &mut sink));
        assert_eq!(bot.weapons.current_kind(), WeaponKind::Blaster);
        assert!(sink.shots.is_empty());
    }

    #[test]
    fn test_tick_moves_along_velocity() {
        let mut bot = bot();
        bot.body.velocity = Vector2D::new(0.0, 20.0);
        bot.tick(0.5);
        assert_eq!(bot.body.position, Vector2D::new(100.0, 110.0));
    }

    #[test]
    fn test_deviation_uses_velocity_relative_to_bot() {
        let mut bot = bot();
        let arena = open_arena();
        // 並走する標的は静止標的と同じ誤差になる
        let velocity = Vector2D::new(120.0, 0.0);
        bot.body.velocity = velocity;
        let target = Target::new("T".to_string(), Vector2D::new(200.0, 100.0), velocity, 10, 5.0);
        bot.perceive(&target, &arena, 0.0);
        bot.perceive(&target, &arena, 10.0);
        assert_eq!(bot.weapons.current_kind(), WeaponKind::Blaster);

        let mut sink = Recorder::default();
        let visible = bot.sensor.time_target_visible();
        let Bot { body, sensor, weapons, .. } = &mut bot;
        let mut view = BotView {
            body,
            sensor,
            arena: &arena,
            dt: 0.1,
        };
        weapons.take_aim_and_shoot(&mut view, &mut sink);

        let expected = AimErrorEstimator::new()
            .unwrap()
            .estimate_deviation(100.0, Vector2D::ZERO, visible);
        assert!((bot.weapons.last_deviation() - expected).abs() < 1e-12);
    }
}
