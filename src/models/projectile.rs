use tracing::trace;

use crate::models::{
    common::{math_utils, AgentStatus, Arena, Vector2D},
    target::Target,
    traits::IAgent,
    weapon::WeaponKind,
};

/// 飛翔時間の上限[s]
const MAX_FLIGHT_TIME: f64 = 10.0;

/// 弾の終了理由
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileEndReason {
    /// ターゲットに命中した
    Hit,
    /// 障害物に遮られた
    Blocked,
    /// アリーナの外に出た
    OutOfBounds,
    /// 飛翔時間の上限に達した
    Expired,
}

/// 飛翔中の弾
///
/// 発射点から照準点の方向へ等速直線運動します。
/// 1ティックの移動線分でターゲットとの交差を判定するため、高速弾でもすり抜けません。
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: String,
    pub kind: WeaponKind,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub damage: u32,
    pub status: AgentStatus,
    /// 飛翔時間（秒）
    pub flight_time: f64,
    pub end_reason: Option<ProjectileEndReason>,
}

impl Projectile {
    /// 新しい弾を生成します
    ///
    /// # 引数
    ///
    /// * `id` - 弾の識別子
    /// * `kind` - 発射した武器の種類
    /// * `origin` - 発射位置
    /// * `aim` - 照準点（方向のみ使用）
    /// * `speed` - 弾速
    /// * `damage` - 命中時のダメージ
    pub fn new(
        id: String,
        kind: WeaponKind,
        origin: Vector2D,
        aim: Vector2D,
        speed: f64,
        damage: u32,
    ) -> Self {
        Self {
            id,
            kind,
            position: origin,
            velocity: (aim - origin).normalize() * speed,
            damage,
            status: AgentStatus::Active,
            flight_time: 0.0,
            end_reason: None,
        }
    }

    /// 1ティック進めて命中・遮蔽・領域外を判定します
    ///
    /// # 戻り値
    ///
    /// このティックで弾が消滅した場合はその理由
    pub fn update(
        &mut self,
        dt: f64,
        target: &mut Target,
        arena: &Arena,
    ) -> Option<ProjectileEndReason> {
        if !self.is_active() {
            return None;
        }

        let previous = self.position;
        self.tick(dt);

        let current = self.position;
        let hit_at = if target.is_active() {
            math_utils::segment_circle_entry(previous, current, target.position, target.radius)
        } else {
            None
        };
        let blocked_at = arena.first_obstacle_entry(previous, current);

        // 同じティック内では先に触れた方が優先（同時なら障害物）
        let first_hit = hit_at.filter(|&hit| blocked_at.is_none_or(|block| hit < block));
        let reason = if let Some(hit) = first_hit {
            trace!(projectile = %self.id, at = hit, "命中判定");
            target.take_damage(self.damage);
            Some(ProjectileEndReason::Hit)
        } else if blocked_at.is_some() {
            Some(ProjectileEndReason::Blocked)
        } else if !arena.contains(self.position) {
            Some(ProjectileEndReason::OutOfBounds)
        } else if self.flight_time >= MAX_FLIGHT_TIME {
            Some(ProjectileEndReason::Expired)
        } else {
            None
        };

        if let Some(reason) = reason {
            self.status = AgentStatus::Inactive;
            self.end_reason = Some(reason);
            trace!(projectile = %self.id, weapon = self.kind.name(), ?reason, "弾が消滅");
        }

        reason
    }
}

impl IAgent for Projectile {
    fn tick(&mut self, dt: f64) {
        if self.status == AgentStatus::Active {
            self.position = self.position + self.velocity * dt;
            self.flight_time += dt;
        }
    }

    fn get_id(&self) -> String {
        self.id.clone()
    }

    fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }
}
